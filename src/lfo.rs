use crate::parameter::LfoType;

/// Low Frequency Oscillator state for modulating one effect parameter
///
/// The waveform and rate live in host-automatable parameters; only the phase
/// (and the noise generator seed) is owned here, by the audio thread.
#[derive(Clone, Copy, Debug)]
pub struct LfoState {
    phase: f64,
    noise: u32,
}

impl LfoState {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            noise: 0x9E37_79B9,
        }
    }

    /// Generate one sample and advance the phase
    /// Returns a value from 0.0 to 1.0
    pub fn tick(&mut self, kind: LfoType, frequency: f64, sample_rate: f64) -> f64 {
        let value = self.value_at(kind);

        if sample_rate > 0.0 {
            self.phase += frequency / sample_rate;
            // Wrap phase to 0.0-1.0
            self.phase -= self.phase.floor();
        }

        value
    }

    /// Reset the phase to 0
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Get the current phase (0.0 to 1.0)
    pub fn phase(&self) -> f64 {
        self.phase
    }

    fn value_at(&mut self, kind: LfoType) -> f64 {
        let phase = self.phase;
        match kind {
            LfoType::Static => 0.0,
            LfoType::Sine => 0.5 + 0.5 * (phase * std::f64::consts::TAU).sin(),
            LfoType::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            LfoType::Seesaw => {
                let t = triangle(phase);
                t * t * (3.0 - 2.0 * t)
            }
            LfoType::Triangle => triangle(phase),
            LfoType::Sawtooth => phase,
            LfoType::ReverseSawtooth => 1.0 - phase,
            LfoType::Noise => {
                // xorshift32
                let mut x = self.noise;
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                self.noise = x;
                x as f64 / u32::MAX as f64
            }
        }
    }
}

impl Default for LfoState {
    fn default() -> Self {
        Self::new()
    }
}

fn triangle(phase: f64) -> f64 {
    1.0 - (2.0 * phase - 1.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfo_output_stays_in_unit_range() {
        let kinds = [
            LfoType::Sine,
            LfoType::Square,
            LfoType::Seesaw,
            LfoType::Triangle,
            LfoType::Sawtooth,
            LfoType::ReverseSawtooth,
            LfoType::Noise,
        ];
        for kind in kinds {
            let mut lfo = LfoState::new();
            for _ in 0..2000 {
                let v = lfo.tick(kind, 7.0, 1000.0);
                assert!((0.0..=1.0).contains(&v), "{:?} produced {}", kind, v);
            }
        }
    }

    #[test]
    fn test_phase_wraps() {
        let mut lfo = LfoState::new();
        for _ in 0..1500 {
            lfo.tick(LfoType::Sawtooth, 1.0, 1000.0);
        }
        assert!((lfo.phase() - 0.5).abs() < 1e-9);
    }
}
