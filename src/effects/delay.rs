//! Echo of the point stream
//!
//! The line holds one second at the highest supported sample rate so the
//! audio thread never reallocates when the length parameter moves.

use crate::effect::EffectApplication;
use crate::vector::Vector2;

/// Highest sample rate the delay line is sized for
const MAX_SAMPLE_RATE: usize = 192_000;

/// Longest echo in seconds
const MAX_DELAY_TIME: f64 = 1.0;

/// Delay with feedback. Parameters:
/// - decay: level of each echo (0.0 to 1.0)
/// - length: echo spacing in seconds (0.0 to 1.0)
pub struct DelayEffect {
    buffer: Vec<Vector2>,
    head: usize,
    position: usize,
    samples_since_last_delay: usize,
}

impl DelayEffect {
    pub fn new() -> Self {
        Self {
            buffer: vec![Vector2::default(); (MAX_SAMPLE_RATE as f64 * MAX_DELAY_TIME) as usize],
            head: 0,
            position: 0,
            samples_since_last_delay: 0,
        }
    }

    /// Clear the line
    pub fn reset(&mut self) {
        self.buffer.fill(Vector2::default());
        self.head = 0;
        self.position = 0;
        self.samples_since_last_delay = 0;
    }
}

impl Default for DelayEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectApplication for DelayEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], sample_rate: f64) -> Vector2 {
        let decay = values[0];
        let length = values[1].clamp(0.0, MAX_DELAY_TIME);
        let len = self.buffer.len();
        let delay_samples = ((sample_rate * length) as usize).min(len - 1);

        if self.head >= len {
            self.head = 0;
        }
        if self.position >= len {
            self.position = 0;
        }
        if self.samples_since_last_delay >= delay_samples {
            self.samples_since_last_delay = 0;
            self.position = (self.head + len - delay_samples) % len;
        }

        let echo = self.buffer[self.position];
        let output = input + echo * decay;

        // Keep runaway feedback out of the line
        self.buffer[self.head] = if output.is_finite() { output } else { Vector2::default() };
        self.head += 1;
        self.position += 1;
        self.samples_since_last_delay += 1;

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_decay_is_identity() {
        let mut delay = DelayEffect::new();
        for i in 0..500 {
            let input = Vector2::new((i as f64 * 0.01).sin(), 0.2);
            assert_eq!(delay.apply(i, input, &[0.0, 0.5], 1000.0), input);
        }
    }

    #[test]
    fn test_impulse_echoes_after_length() {
        let mut delay = DelayEffect::new();
        let impulse = Vector2::new(1.0, 0.0);
        // 100 Hz with a 0.1 s length: echo every 10 samples
        let mut outputs = Vec::new();
        for i in 0..25 {
            let input = if i == 0 { impulse } else { Vector2::default() };
            outputs.push(delay.apply(i, input, &[0.5, 0.1], 100.0));
        }
        assert_eq!(outputs[0], impulse);
        assert!((outputs[10].x - 0.5).abs() < 1e-12, "first echo at half level");
        assert!((outputs[20].x - 0.25).abs() < 1e-12, "echo of the echo decays again");
        assert_eq!(outputs[5].x, 0.0);
    }

    #[test]
    fn test_feedback_stability() {
        let mut delay = DelayEffect::new();
        for i in 0..48000 {
            let input = if i < 100 { Vector2::new(1.0, 1.0) } else { Vector2::default() };
            let out = delay.apply(i, input, &[0.95, 0.01], 48000.0);
            assert!(out.is_finite() && out.magnitude() < 100.0, "delay should remain stable with high decay");
        }
    }

    #[test]
    fn test_reset_clears_echo() {
        let mut delay = DelayEffect::new();
        delay.apply(0, Vector2::new(1.0, 1.0), &[1.0, 0.01], 100.0);
        delay.reset();
        let out = delay.apply(0, Vector2::default(), &[1.0, 0.01], 100.0);
        assert_eq!(out, Vector2::default());
    }
}
