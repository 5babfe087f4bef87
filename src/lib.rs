//! Oscilloscope signal engine
//!
//! Turns vector geometry into a stereo signal (x on the left channel, y on
//! the right) and runs it through a real-time chain of user-ordered and
//! fixed effects. Projects save and restore the whole configuration.

pub mod consumer;
pub mod effect;
pub mod effects;
pub mod envelope;
pub mod error;
pub mod lfo;
pub mod parameter;
pub mod persistence;
pub mod pipeline;
pub mod script;
pub mod source;
pub mod utils;
pub mod vector;

// Platform abstraction layer
pub mod platform;

// Offline render to WAV
#[cfg(feature = "bounce")]
pub mod bounce;

pub use consumer::{BufferConsumer, ConsumerHandle};
pub use effect::Effect;
pub use error::{PipelineError, ProjectError, ScriptError};
pub use parameter::{BooleanParameter, EffectParameter, FloatParameter, HostParameter, IntParameter, LfoType};
pub use pipeline::{EffectSet, Pipeline, PipelineConfig};
pub use vector::Vector2;
