use std::sync::Arc;

use crate::effect::EffectApplication;
use crate::effects::RenderControls;
use crate::vector::Vector2;

/// End of the drawn portion of each frame that a [`TraceEffect`] moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceBound {
    Min,
    Max,
}

impl TraceBound {
    /// Bound in effect while the trace effect is disabled
    pub fn untraced(self) -> f64 {
        match self {
            TraceBound::Min => 0.0,
            TraceBound::Max => 1.0,
        }
    }
}

/// Limits how much of each frame the geometry source draws. The point
/// stream passes through; the bound is read by the source on its next sample.
pub struct TraceEffect {
    controls: Arc<RenderControls>,
    bound: TraceBound,
}

impl TraceEffect {
    pub fn new(controls: Arc<RenderControls>, bound: TraceBound) -> Self {
        Self { controls, bound }
    }
}

/// Publish `value` as the given bound
pub fn publish_bound(controls: &RenderControls, bound: TraceBound, value: f64) {
    match bound {
        TraceBound::Min => controls.set_trace_min(value),
        TraceBound::Max => controls.set_trace_max(value),
    }
}

impl EffectApplication for TraceEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], _sample_rate: f64) -> Vector2 {
        publish_bound(&self.controls, self.bound, values[0]);
        input
    }
}
