use std::f64::consts::TAU;

use crate::effect::EffectApplication;
use crate::vector::Vector2;

/// Spins the whole image around the origin. The speed is in turns per second.
#[derive(Debug, Default)]
pub struct RotateEffect {
    phase: f64,
}

impl RotateEffect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rotation angle in radians
    pub fn angle(&self) -> f64 {
        self.phase * TAU
    }
}

impl EffectApplication for RotateEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], sample_rate: f64) -> Vector2 {
        if sample_rate > 0.0 {
            self.phase += values[0] / sample_rate;
            self.phase -= self.phase.floor();
        }
        input.rotate(self.angle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_accumulates() {
        let mut effect = RotateEffect::new();
        let input = Vector2::new(1.0, 0.0);
        // Quarter turn per sample at 4 turns/s and 16 Hz
        let first = effect.apply(0, input, &[4.0], 16.0);
        assert!(first.x.abs() < 1e-12 && (first.y - 1.0).abs() < 1e-12);
        let second = effect.apply(1, input, &[4.0], 16.0);
        assert!((second.x + 1.0).abs() < 1e-12, "second call continues from the first");
    }

    #[test]
    fn test_zero_speed_is_identity() {
        let mut effect = RotateEffect::new();
        let input = Vector2::new(0.2, -0.7);
        for i in 0..10 {
            assert_eq!(effect.apply(i, input, &[0.0], 48000.0), input);
        }
    }
}
