use crate::effect::EffectApplication;
use crate::vector::Vector2;

/// Quantizes each axis to fewer decimal places as the amount rises
#[derive(Debug, Default)]
pub struct BitCrushEffect;

impl BitCrushEffect {
    pub fn new() -> Self {
        Self
    }
}

fn crush(value: f64, places: f64) -> f64 {
    let scale = 10f64.powf(places);
    (value * scale).round() / scale
}

impl EffectApplication for BitCrushEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], _sample_rate: f64) -> Vector2 {
        // Amount 0..1 maps onto 0..0.78 so the top of the range stays audible
        let ranged = values[0] * 0.78;
        let places = (2f64.powf(1.0 - ranged) - 1.0) * 12.0;
        Vector2::new(crush(input.x, places), crush(input.y, places))
    }
}
