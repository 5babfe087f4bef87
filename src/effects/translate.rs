use crate::effect::EffectApplication;
use crate::vector::Vector2;

/// Moves the image by `(x, y)`. Stateless.
#[derive(Debug, Default)]
pub struct TranslateEffect;

impl TranslateEffect {
    pub fn new() -> Self {
        Self
    }
}

impl EffectApplication for TranslateEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], _sample_rate: f64) -> Vector2 {
        input.translate(values[0], values[1])
    }
}
