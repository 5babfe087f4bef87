use std::sync::Arc;

use crate::parameter::{FloatParameter, HostParameter, DEFAULT_STEP};

/// Curves with a smaller magnitude are treated as straight lines
const LINEAR_CURVE: f64 = 0.001;

/// Attack/decay/sustain/release shape applied to the geometry amplitude.
/// Each segment has a curve: 0 is linear, positive values start slowly,
/// negative values start quickly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adsr {
    pub attack_time: f64,  // seconds
    pub attack_level: f64, // 0.0 to 1.0
    pub attack_shape: f64,
    pub decay_time: f64, // seconds
    pub decay_shape: f64,
    pub sustain_level: f64, // 0.0 to 1.0
    pub release_time: f64,  // seconds
    pub release_shape: f64,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack_time: 0.005,
            attack_level: 1.0,
            attack_shape: 5.0,
            decay_time: 0.095,
            decay_shape: -20.0,
            sustain_level: 0.6,
            release_time: 0.4,
            release_shape: -5.0,
        }
    }
}

/// Interpolate from `from` to `to` at `progress` in [0, 1] along `curve`
fn segment(from: f64, to: f64, progress: f64, curve: f64) -> f64 {
    let progress = progress.clamp(0.0, 1.0);
    if curve.abs() < LINEAR_CURVE {
        from + (to - from) * progress
    } else {
        from + (to - from) * (1.0 - (curve * progress).exp()) / (1.0 - curve.exp())
    }
}

impl Adsr {
    /// Level `elapsed` seconds after note on, while the note is held
    pub fn held_level(&self, elapsed: f64) -> f64 {
        if elapsed < self.attack_time {
            return segment(0.0, self.attack_level, elapsed / self.attack_time, self.attack_shape);
        }
        let elapsed = elapsed - self.attack_time;
        if elapsed < self.decay_time {
            return segment(self.attack_level, self.sustain_level, elapsed / self.decay_time, self.decay_shape);
        }
        self.sustain_level
    }

    /// Level `elapsed` seconds after note off, starting from `start_level`.
    /// Returns `None` once the release has finished.
    pub fn release_level(&self, start_level: f64, elapsed: f64) -> Option<f64> {
        if elapsed >= self.release_time {
            return None;
        }
        Some(segment(start_level, 0.0, elapsed / self.release_time, self.release_shape))
    }
}

/// Envelope values mirrored as host-automatable parameters
pub struct EnvelopeParameters {
    pub attack_time: Arc<FloatParameter>,
    pub attack_level: Arc<FloatParameter>,
    pub attack_shape: Arc<FloatParameter>,
    pub decay_time: Arc<FloatParameter>,
    pub decay_shape: Arc<FloatParameter>,
    pub sustain_level: Arc<FloatParameter>,
    pub release_time: Arc<FloatParameter>,
    pub release_shape: Arc<FloatParameter>,
}

impl EnvelopeParameters {
    pub fn new() -> Self {
        let defaults = Adsr::default();
        let p = |name: &str, id: &str, default: f64, min: f64, max: f64| {
            Arc::new(FloatParameter::new(name, id, default, min, max, DEFAULT_STEP))
        };
        Self {
            attack_time: p("Attack Time", "attackTime", defaults.attack_time, 0.0, 1.0),
            attack_level: p("Attack Level", "attackLevel", defaults.attack_level, 0.0, 1.0),
            attack_shape: p("Attack Shape", "attackShape", defaults.attack_shape, -50.0, 50.0),
            decay_time: p("Decay Time", "decayTime", defaults.decay_time, 0.0, 1.0),
            decay_shape: p("Decay Shape", "decayShape", defaults.decay_shape, -50.0, 50.0),
            sustain_level: p("Sustain Level", "sustainLevel", defaults.sustain_level, 0.0, 1.0),
            release_time: p("Release Time", "releaseTime", defaults.release_time, 0.0, 1.0),
            release_shape: p("Release Shape", "releaseShape", defaults.release_shape, -50.0, 50.0),
        }
    }

    /// Build the envelope from the current parameter values
    pub fn to_adsr(&self) -> Adsr {
        Adsr {
            attack_time: self.attack_time.value(),
            attack_level: self.attack_level.value(),
            attack_shape: self.attack_shape.value(),
            decay_time: self.decay_time.value(),
            decay_shape: self.decay_shape.value(),
            sustain_level: self.sustain_level.value(),
            release_time: self.release_time.value(),
            release_shape: self.release_shape.value(),
        }
    }

    /// Push an envelope edited elsewhere into the parameters, skipping values
    /// within `epsilon` of the current one so automation and UI do not chase
    /// each other. Returns whether any parameter changed.
    pub fn update_from(&self, adsr: &Adsr, epsilon: f64) -> bool {
        let mut changed = false;
        changed |= self.attack_time.set_value_if_changed(adsr.attack_time, epsilon);
        changed |= self.attack_level.set_value_if_changed(adsr.attack_level, epsilon);
        changed |= self.attack_shape.set_value_if_changed(adsr.attack_shape, epsilon);
        changed |= self.decay_time.set_value_if_changed(adsr.decay_time, epsilon);
        changed |= self.sustain_level.set_value_if_changed(adsr.sustain_level, epsilon);
        changed |= self.decay_shape.set_value_if_changed(adsr.decay_shape, epsilon);
        changed |= self.release_time.set_value_if_changed(adsr.release_time, epsilon);
        changed |= self.release_shape.set_value_if_changed(adsr.release_shape, epsilon);
        changed
    }

    /// All envelope parameters in host exposure order
    pub fn parameters(&self) -> [&Arc<FloatParameter>; 8] {
        [
            &self.attack_time,
            &self.attack_level,
            &self.attack_shape,
            &self.decay_time,
            &self.decay_shape,
            &self.sustain_level,
            &self.release_time,
            &self.release_shape,
        ]
    }

    pub fn parameter(&self, id: &str) -> Option<&Arc<FloatParameter>> {
        self.parameters().into_iter().find(|p| p.id() == id)
    }

    pub fn host_parameters(&self) -> Vec<HostParameter> {
        self.parameters()
            .into_iter()
            .map(|p| HostParameter::Float(p.clone()))
            .collect()
    }
}

impl Default for EnvelopeParameters {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback position within the envelope for the sounding note
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeVoice {
    active: bool,
    elapsed: f64,
    released: Option<(f64, f64)>, // (level at note off, seconds since note off)
    level: f64,
}

impl EnvelopeVoice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_on(&mut self) {
        self.active = true;
        self.elapsed = 0.0;
        self.released = None;
    }

    pub fn note_off(&mut self) {
        if self.active && self.released.is_none() {
            self.released = Some((self.level, 0.0));
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_held(&self) -> bool {
        self.active && self.released.is_none()
    }

    /// Amplitude for the next sample
    pub fn next_level(&mut self, adsr: &Adsr, sample_rate: f64) -> f64 {
        if !self.active {
            return 0.0;
        }
        let dt = if sample_rate > 0.0 { 1.0 / sample_rate } else { 0.0 };
        self.level = match &mut self.released {
            None => {
                let level = adsr.held_level(self.elapsed);
                self.elapsed += dt;
                level
            }
            Some((start, since)) => match adsr.release_level(*start, *since) {
                Some(level) => {
                    *since += dt;
                    level
                }
                None => {
                    self.active = false;
                    0.0
                }
            },
        };
        self.level
    }
}
