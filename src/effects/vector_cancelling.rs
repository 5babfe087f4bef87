use crate::effect::EffectApplication;
use crate::vector::Vector2;

/// Inverts every Nth point, where N shrinks from 10 to 1 as the amount falls
#[derive(Debug, Default)]
pub struct VectorCancellingEffect {
    last_index: usize,
    next_invert: f64,
}

impl VectorCancellingEffect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EffectApplication for VectorCancellingEffect {
    fn apply(&mut self, index: usize, input: Vector2, values: &[f64], _sample_rate: f64) -> Vector2 {
        let value = values[0];
        if value < 0.001 {
            return input;
        }
        let period = 1.0 + 9.0 * value;
        // Sample indices restart every block
        if index < self.last_index {
            self.next_invert = self.next_invert - self.last_index as f64 + period;
        }
        self.last_index = index;
        if index as f64 >= self.next_invert {
            self.next_invert += period;
            -input
        } else {
            input
        }
    }
}
