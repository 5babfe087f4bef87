//! Host-automatable parameters
//!
//! Every parameter keeps its value in atomics so the UI/automation thread can
//! write it while the audio thread reads it, without taking the effect lock.
//! Float parameters store the *normalized* value in [0, 1]; the real value is
//! always derived from it and the current range.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;

/// Default step for continuous effect parameters
pub const DEFAULT_STEP: f64 = 0.0001;

/// Upper bound of the LFO rate parameter in Hz
pub const MAX_LFO_RATE: f64 = 100.0;

/// f64 stored as its bit pattern for lock-free updates
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// A continuous parameter with a real-world range
#[derive(Debug)]
pub struct FloatParameter {
    id: String,
    name: String,
    min: AtomicF64,
    max: AtomicF64,
    step: AtomicF64,
    normalized: AtomicF64,
    default_value: f64,
}

impl FloatParameter {
    pub fn new(name: impl Into<String>, id: impl Into<String>, default_value: f64, min: f64, max: f64, step: f64) -> Self {
        let parameter = Self {
            id: id.into(),
            name: name.into(),
            min: AtomicF64::new(min),
            max: AtomicF64::new(max),
            step: AtomicF64::new(step),
            normalized: AtomicF64::new(0.0),
            default_value,
        };
        parameter.set_value(default_value);
        parameter
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> f64 {
        self.min.load()
    }

    pub fn max(&self) -> f64 {
        self.max.load()
    }

    pub fn step(&self) -> f64 {
        self.step.load()
    }

    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// Change the real-world range, keeping the real value where possible
    pub fn set_range(&self, min: f64, max: f64) {
        if !(max - min).is_finite() || max < min {
            return;
        }
        let value = self.value();
        self.min.store(min);
        self.max.store(max);
        self.set_value(value.clamp(min, max));
    }

    pub fn set_step(&self, step: f64) {
        if step.is_finite() && step > 0.0 {
            self.step.store(step);
        }
    }

    /// Normalized value in [0, 1]
    #[inline]
    pub fn normalized(&self) -> f64 {
        self.normalized.load()
    }

    /// Set the normalized value, clamped to [0, 1]. NaN is ignored.
    pub fn set_normalized(&self, normalized: f64) {
        if normalized.is_nan() {
            return;
        }
        self.normalized.store(normalized.clamp(0.0, 1.0));
    }

    /// Real value: `min + normalized * (max - min)`
    #[inline]
    pub fn value(&self) -> f64 {
        let min = self.min();
        min + self.normalized() * (self.max() - min)
    }

    /// Set the real value through the inverse range mapping
    pub fn set_value(&self, value: f64) {
        self.set_normalized(self.normalize(value));
    }

    /// Only write `value` if it differs from the current real value by more
    /// than `epsilon`. Returns whether the parameter changed.
    pub fn set_value_if_changed(&self, value: f64, epsilon: f64) -> bool {
        if (self.value() - value).abs() > epsilon {
            self.set_value(value);
            true
        } else {
            false
        }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        let min = self.min();
        let span = self.max() - min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - min) / span).clamp(0.0, 1.0)
    }
}

/// A discrete parameter, exposed to the host as a normalized float
#[derive(Debug)]
pub struct IntParameter {
    id: String,
    name: String,
    min: i32,
    max: i32,
    value: AtomicI32,
}

impl IntParameter {
    pub fn new(name: impl Into<String>, id: impl Into<String>, default_value: i32, min: i32, max: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            min,
            max,
            value: AtomicI32::new(default_value.clamp(min, max)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i32 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn set_value(&self, value: i32) {
        self.value.store(value.clamp(self.min, self.max), Ordering::Relaxed);
    }

    pub fn normalized(&self) -> f64 {
        if self.max == self.min {
            return 0.0;
        }
        (self.value() - self.min) as f64 / (self.max - self.min) as f64
    }

    pub fn set_normalized(&self, normalized: f64) {
        if normalized.is_nan() {
            return;
        }
        let span = (self.max - self.min) as f64;
        let value = self.min + (normalized.clamp(0.0, 1.0) * span).round() as i32;
        self.set_value(value);
    }
}

/// An on/off flag, exposed to the host as 0.0 or 1.0
#[derive(Debug)]
pub struct BooleanParameter {
    id: String,
    name: String,
    value: AtomicBool,
}

impl BooleanParameter {
    pub fn new(name: impl Into<String>, id: impl Into<String>, default_value: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: AtomicBool::new(default_value),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Relaxed)
    }

    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn normalized(&self) -> f64 {
        if self.get() {
            1.0
        } else {
            0.0
        }
    }

    pub fn set_normalized(&self, normalized: f64) {
        self.set(normalized >= 0.5);
    }
}

/// Waveform used to modulate an effect parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LfoType {
    Static = 1,
    Sine = 2,
    Square = 3,
    Seesaw = 4,
    Triangle = 5,
    Sawtooth = 6,
    ReverseSawtooth = 7,
    Noise = 8,
}

impl LfoType {
    pub const MIN: i32 = LfoType::Static as i32;
    pub const MAX: i32 = LfoType::Noise as i32;

    pub fn from_i32(value: i32) -> Self {
        match value {
            2 => LfoType::Sine,
            3 => LfoType::Square,
            4 => LfoType::Seesaw,
            5 => LfoType::Triangle,
            6 => LfoType::Sawtooth,
            7 => LfoType::ReverseSawtooth,
            8 => LfoType::Noise,
            _ => LfoType::Static,
        }
    }
}

/// LFO controls attached to an effect parameter
#[derive(Clone, Debug)]
pub struct LfoParameters {
    pub kind: Arc<IntParameter>,
    pub rate: Arc<FloatParameter>,
}

/// One positional argument of an effect: the value itself plus its
/// optional LFO controls.
#[derive(Clone, Debug)]
pub struct EffectParameter {
    value: Arc<FloatParameter>,
    lfo: Option<LfoParameters>,
}

impl EffectParameter {
    pub fn new(name: &str, id: &str, default_value: f64, min: f64, max: f64) -> Self {
        Self::with_step(name, id, default_value, min, max, DEFAULT_STEP)
    }

    pub fn with_step(name: &str, id: &str, default_value: f64, min: f64, max: f64, step: f64) -> Self {
        let lfo = LfoParameters {
            kind: Arc::new(IntParameter::new(
                format!("{name} LFO"),
                format!("{id}Lfo"),
                LfoType::Static as i32,
                LfoType::MIN,
                LfoType::MAX,
            )),
            rate: Arc::new(FloatParameter::new(
                format!("{name} LFO Rate"),
                format!("{id}LfoRate"),
                1.0,
                0.0,
                MAX_LFO_RATE,
                0.01,
            )),
        };
        Self {
            value: Arc::new(FloatParameter::new(name, id, default_value, min, max, step)),
            lfo: Some(lfo),
        }
    }

    /// Drop the LFO controls; the parameter is then only set by the host/UI
    pub fn without_lfo(mut self) -> Self {
        self.lfo = None;
        self
    }

    pub fn id(&self) -> &str {
        self.value.id()
    }

    pub fn value(&self) -> &Arc<FloatParameter> {
        &self.value
    }

    pub fn lfo(&self) -> Option<&LfoParameters> {
        self.lfo.as_ref()
    }

    pub fn lfo_type(&self) -> LfoType {
        self.lfo
            .as_ref()
            .map(|lfo| LfoType::from_i32(lfo.kind.value()))
            .unwrap_or(LfoType::Static)
    }

    pub fn lfo_rate(&self) -> f64 {
        self.lfo.as_ref().map(|lfo| lfo.rate.value()).unwrap_or(0.0)
    }

    /// Host-facing handles in exposure order: value, LFO type, LFO rate
    pub fn host_parameters(&self) -> Vec<HostParameter> {
        let mut parameters = vec![HostParameter::Float(self.value.clone())];
        if let Some(lfo) = &self.lfo {
            parameters.push(HostParameter::Int(lfo.kind.clone()));
            parameters.push(HostParameter::Float(lfo.rate.clone()));
        }
        parameters
    }
}

/// Type-erased host automation handle
#[derive(Clone, Debug)]
pub enum HostParameter {
    Float(Arc<FloatParameter>),
    Int(Arc<IntParameter>),
    Bool(Arc<BooleanParameter>),
}

impl HostParameter {
    pub fn id(&self) -> &str {
        match self {
            HostParameter::Float(p) => p.id(),
            HostParameter::Int(p) => p.id(),
            HostParameter::Bool(p) => p.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            HostParameter::Float(p) => p.name(),
            HostParameter::Int(p) => p.name(),
            HostParameter::Bool(p) => p.name(),
        }
    }

    pub fn normalized(&self) -> f64 {
        match self {
            HostParameter::Float(p) => p.normalized(),
            HostParameter::Int(p) => p.normalized(),
            HostParameter::Bool(p) => p.normalized(),
        }
    }

    pub fn set_normalized(&self, normalized: f64) {
        match self {
            HostParameter::Float(p) => p.set_normalized(normalized),
            HostParameter::Int(p) => p.set_normalized(normalized),
            HostParameter::Bool(p) => p.set_normalized(normalized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_value_follows_normalized() {
        let p = FloatParameter::new("Volume", "volume", 1.0, 0.0, 3.0, DEFAULT_STEP);
        for x in [0.0, 0.1, 0.25, 0.5, 0.9, 1.0] {
            p.set_normalized(x);
            assert!((p.value() - x * 3.0).abs() < 1e-12, "normalized {} gave {}", x, p.value());
        }
    }

    #[test]
    fn test_normalized_is_clamped() {
        let p = FloatParameter::new("Translate X", "translateX", 0.0, -1.0, 1.0, DEFAULT_STEP);
        p.set_normalized(1.7);
        assert_eq!(p.normalized(), 1.0);
        p.set_normalized(-3.0);
        assert_eq!(p.normalized(), 0.0);
        p.set_normalized(f64::NAN);
        assert_eq!(p.normalized(), 0.0);
    }

    #[test]
    fn test_set_value_inverse_mapping() {
        let p = FloatParameter::new("Translate X", "translateX", 0.0, -1.0, 1.0, DEFAULT_STEP);
        assert_eq!(p.normalized(), 0.5);
        p.set_value(0.5);
        assert!((p.normalized() - 0.75).abs() < 1e-12);
        p.set_value(12.0);
        assert_eq!(p.normalized(), 1.0);
    }

    #[test]
    fn test_set_value_if_changed_ignores_small_deltas() {
        let p = FloatParameter::new("Sustain", "sustainLevel", 0.6, 0.0, 1.0, DEFAULT_STEP);
        assert!(!p.set_value_if_changed(0.60005, 0.0001));
        assert!((p.value() - 0.6).abs() < 1e-12);
        assert!(p.set_value_if_changed(0.7, 0.0001));
        assert!((p.value() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_set_range_keeps_real_value() {
        let p = FloatParameter::new("Frequency", "frequency", 440.0, 0.0, 12000.0, 0.1);
        p.set_range(100.0, 1000.0);
        assert!((p.value() - 440.0).abs() < 1e-9);
        p.set_range(500.0, 1000.0);
        assert!((p.value() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_range_rejects_unusable_spans() {
        let p = FloatParameter::new("Threshold", "threshold", 1.0, 0.0, 1.0, DEFAULT_STEP);
        p.set_range(-1e308, 1e308);
        p.set_range(1.0, -1.0);
        p.set_range(f64::NAN, 1.0);
        assert_eq!((p.min(), p.max()), (0.0, 1.0));
        assert_eq!(p.value(), 1.0);
    }

    #[test]
    fn test_int_parameter_normalized() {
        let p = IntParameter::new("LFO", "lfo", 1, 1, 8);
        assert_eq!(p.normalized(), 0.0);
        p.set_normalized(1.0);
        assert_eq!(p.value(), 8);
        p.set_normalized(0.5);
        assert_eq!(p.value(), 5);
    }

    #[test]
    fn test_effect_parameter_host_exposure() {
        let with_lfo = EffectParameter::new("Bulge", "bulge", 0.0, 0.0, 1.0);
        let ids: Vec<String> = with_lfo.host_parameters().iter().map(|p| p.id().to_string()).collect();
        assert_eq!(ids, vec!["bulge", "bulgeLfo", "bulgeLfoRate"]);

        let without = EffectParameter::new("Lua A", "luaA", 0.0, 0.0, 1.0).without_lfo();
        assert_eq!(without.host_parameters().len(), 1);
        assert_eq!(without.lfo_type(), LfoType::Static);
    }
}
