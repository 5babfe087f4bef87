use crate::effect::EffectApplication;
use crate::vector::Vector2;

/// Axis pushed back and forth by [`DistortEffect`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistortAxis {
    X,
    Y,
}

/// Offsets one axis by +amount on even samples and -amount on odd ones,
/// splitting every line into two parallel copies
#[derive(Debug)]
pub struct DistortEffect {
    axis: DistortAxis,
}

impl DistortEffect {
    pub fn new(axis: DistortAxis) -> Self {
        Self { axis }
    }
}

impl EffectApplication for DistortEffect {
    fn apply(&mut self, index: usize, input: Vector2, values: &[f64], _sample_rate: f64) -> Vector2 {
        let amount = if index % 2 == 0 { values[0] } else { -values[0] };
        match self.axis {
            DistortAxis::X => input.translate(amount, 0.0),
            DistortAxis::Y => input.translate(0.0, amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternates_sign() {
        let mut effect = DistortEffect::new(DistortAxis::Y);
        let even = effect.apply(0, Vector2::default(), &[0.1], 48000.0);
        let odd = effect.apply(1, Vector2::default(), &[0.1], 48000.0);
        assert_eq!(even, Vector2::new(0.0, 0.1));
        assert_eq!(odd, Vector2::new(0.0, -0.1));
    }
}
