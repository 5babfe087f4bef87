use crate::effect::EffectApplication;
use crate::vector::Vector2;

/// One-pole smoothing of the point stream. Higher amounts keep more of the
/// running average, rounding off corners.
#[derive(Debug, Default)]
pub struct SmoothEffect {
    average: Vector2,
}

impl SmoothEffect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EffectApplication for SmoothEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], _sample_rate: f64) -> Vector2 {
        let mut weight = values[0].max(0.00001) * 0.95;
        let strength = 10.0;
        weight = (strength * weight + 1.0).ln() / (strength + 1.0).ln();
        self.average = self.average * weight + input * (1.0 - weight);
        self.average
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_to_constant_input() {
        let mut effect = SmoothEffect::new();
        let target = Vector2::new(0.4, -0.2);
        let mut out = Vector2::default();
        for i in 0..2000 {
            out = effect.apply(i, target, &[0.8], 48000.0);
        }
        assert!((out - target).magnitude() < 1e-6);
    }

    #[test]
    fn test_smoothing_lags_step() {
        let mut effect = SmoothEffect::new();
        let out = effect.apply(0, Vector2::new(1.0, 0.0), &[1.0], 48000.0);
        assert!(out.x > 0.0 && out.x < 0.5, "heavy smoothing should hold back a step, got {}", out.x);
    }
}
