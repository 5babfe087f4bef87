use crate::effect::EffectApplication;
use crate::vector::Vector2;

/// Pushes points away from the centre by raising the radius to `1 - amount`
#[derive(Debug, Default)]
pub struct BulgeEffect;

impl BulgeEffect {
    pub fn new() -> Self {
        Self
    }
}

impl EffectApplication for BulgeEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], _sample_rate: f64) -> Vector2 {
        let exponent = 1.0 - values[0];
        let r = input.magnitude();
        let theta = input.y.atan2(input.x);
        let rn = r.powf(exponent);
        Vector2::new(rn * theta.cos(), rn * theta.sin())
    }
}
