use std::f64::consts::TAU;
use std::sync::Arc;

use crate::effect::EffectApplication;
use crate::effects::RenderControls;
use crate::vector::Vector2;

/// Adds a sine offset to both axes at the current drawing frequency
pub struct WobbleEffect {
    controls: Arc<RenderControls>,
    phase: f64,
}

impl WobbleEffect {
    pub fn new(controls: Arc<RenderControls>) -> Self {
        Self { controls, phase: 0.0 }
    }
}

impl EffectApplication for WobbleEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], sample_rate: f64) -> Vector2 {
        if sample_rate > 0.0 {
            self.phase += TAU * self.controls.frequency() / sample_rate;
            if self.phase >= TAU {
                self.phase %= TAU;
            }
        }
        let wobble = 0.5 * values[0] * self.phase.sin();
        input.translate(wobble, wobble)
    }
}
