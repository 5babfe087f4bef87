//! Permanent effects that publish their value to shared render controls
//!
//! Volume, threshold, drawing frequency and the object camera
//! are ordinary effect parameters (so they get LFOs, host automation and
//! persistence) but their consumers sit outside the effect chain: the
//! orchestrator's gain stage and the geometry sources.

use std::sync::Arc;

use crate::effect::EffectApplication;
use crate::parameter::{AtomicF64, BooleanParameter};
use crate::vector::Vector2;

/// Values read by the render loop and geometry sources each sample
#[derive(Debug)]
pub struct RenderControls {
    volume: AtomicF64,
    threshold: AtomicF64,
    frequency: AtomicF64,
    trace_min: AtomicF64,
    trace_max: AtomicF64,
    focal_length: AtomicF64,
    obj_rotate_speed: AtomicF64,
    obj_rotate: [AtomicF64; 3],
    obj_fixed_rotate: [Arc<BooleanParameter>; 3],
}

impl RenderControls {
    pub fn new() -> Self {
        Self {
            volume: AtomicF64::new(1.0),
            threshold: AtomicF64::new(1.0),
            frequency: AtomicF64::new(440.0),
            trace_min: AtomicF64::new(0.0),
            trace_max: AtomicF64::new(1.0),
            focal_length: AtomicF64::new(1.0),
            obj_rotate_speed: AtomicF64::new(0.0),
            obj_rotate: [AtomicF64::new(1.0), AtomicF64::new(1.0), AtomicF64::new(0.0)],
            obj_fixed_rotate: [
                Arc::new(BooleanParameter::new("Object Fixed Rotate X", "objFixedRotateX", false)),
                Arc::new(BooleanParameter::new("Object Fixed Rotate Y", "objFixedRotateY", false)),
                Arc::new(BooleanParameter::new("Object Fixed Rotate Z", "objFixedRotateZ", false)),
            ],
        }
    }

    pub fn volume(&self) -> f64 {
        self.volume.load()
    }

    pub fn set_volume(&self, volume: f64) {
        self.volume.store(volume);
    }

    pub fn threshold(&self) -> f64 {
        self.threshold.load()
    }

    pub fn set_threshold(&self, threshold: f64) {
        self.threshold.store(threshold);
    }

    /// Drawing frequency in Hz: how many times per second a frame is traced
    pub fn frequency(&self) -> f64 {
        self.frequency.load()
    }

    pub fn set_frequency(&self, frequency: f64) {
        self.frequency.store(frequency);
    }

    /// Portion of each frame to draw, as `(start, end)` fractions of its length
    pub fn trace_range(&self) -> (f64, f64) {
        (self.trace_min.load(), self.trace_max.load())
    }

    pub fn set_trace_min(&self, value: f64) {
        self.trace_min.store(value);
    }

    pub fn set_trace_max(&self, value: f64) {
        self.trace_max.store(value);
    }

    pub fn focal_length(&self) -> f64 {
        self.focal_length.load()
    }

    pub fn obj_rotate_speed(&self) -> f64 {
        self.obj_rotate_speed.load()
    }

    /// Base object rotation per axis, in [-1, 1] turns of half a circle
    pub fn obj_rotate(&self) -> [f64; 3] {
        [self.obj_rotate[0].load(), self.obj_rotate[1].load(), self.obj_rotate[2].load()]
    }

    pub fn obj_fixed_rotate(&self) -> [bool; 3] {
        [
            self.obj_fixed_rotate[0].get(),
            self.obj_fixed_rotate[1].get(),
            self.obj_fixed_rotate[2].get(),
        ]
    }

    /// Boolean parameters owned by the controls, in host exposure order
    pub fn obj_fixed_rotate_parameters(&self) -> &[Arc<BooleanParameter>; 3] {
        &self.obj_fixed_rotate
    }

    fn publish(&self, target: ControlTarget, value: f64) {
        match target {
            ControlTarget::Frequency => self.frequency.store(value),
            ControlTarget::Volume => self.volume.store(value),
            ControlTarget::Threshold => self.threshold.store(value),
            ControlTarget::ObjRotateSpeed => self.obj_rotate_speed.store(value),
            ControlTarget::ObjRotateX => self.obj_rotate[0].store(value),
            ControlTarget::ObjRotateY => self.obj_rotate[1].store(value),
            ControlTarget::ObjRotateZ => self.obj_rotate[2].store(value),
            ControlTarget::ObjFocalLength => self.focal_length.store(value),
        }
    }
}

impl Default for RenderControls {
    fn default() -> Self {
        Self::new()
    }
}

/// Which control a [`ControlEffect`] drives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlTarget {
    Frequency,
    Volume,
    Threshold,
    ObjRotateSpeed,
    ObjRotateX,
    ObjRotateY,
    ObjRotateZ,
    ObjFocalLength,
}

/// Publishes its first value to [`RenderControls`] and passes the point through
pub struct ControlEffect {
    controls: Arc<RenderControls>,
    target: ControlTarget,
}

impl ControlEffect {
    pub fn new(controls: Arc<RenderControls>, target: ControlTarget) -> Self {
        Self { controls, target }
    }
}

impl EffectApplication for ControlEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], _sample_rate: f64) -> Vector2 {
        self.controls.publish(self.target, values[0]);
        input
    }
}
