//! Effects: a named, ordered set of parameters driving one transform

use std::sync::Arc;

use crate::effects::ScriptedTransform;
use crate::lfo::LfoState;
use crate::parameter::{BooleanParameter, EffectParameter, LfoType};
use crate::persistence::document::Element;
use crate::script::ScriptedFunction;
use crate::vector::Vector2;

/// Most positional arguments any transform takes
pub const MAX_EFFECT_PARAMETERS: usize = 8;

/// Trait that all native transforms must implement
/// Send is required because effects are applied on the audio thread
pub trait EffectApplication: Send {
    /// Transform one point. `values` holds the real value of each parameter
    /// in positional order.
    fn apply(&mut self, index: usize, input: Vector2, values: &[f64], sample_rate: f64) -> Vector2;

    /// User-authored code carried by this transform, if any
    fn script(&self) -> Option<&ScriptedFunction> {
        None
    }

    fn script_mut(&mut self) -> Option<&mut ScriptedFunction> {
        None
    }
}

/// Transform body of an effect
pub enum Transform {
    Native(Box<dyn EffectApplication>),
    Scripted(ScriptedTransform),
}

impl Transform {
    fn apply(&mut self, index: usize, input: Vector2, values: &[f64], sample_rate: f64) -> Vector2 {
        match self {
            Transform::Native(transform) => transform.apply(index, input, values, sample_rate),
            Transform::Scripted(transform) => transform.apply(input, values),
        }
    }
}

pub struct Effect {
    id: String,
    transform: Transform,
    parameters: Vec<EffectParameter>,
    enabled: Arc<BooleanParameter>,
    precedence: i32,
    enableable: bool,
    values: [f64; MAX_EFFECT_PARAMETERS],
    lfo_states: [LfoState; MAX_EFFECT_PARAMETERS],
    sample_rate: f64,
}

impl Effect {
    pub fn new(transform: impl EffectApplication + 'static, parameters: Vec<EffectParameter>, id: &str) -> Self {
        Self::with_transform(Transform::Native(Box::new(transform)), parameters, id)
    }

    pub fn scripted(transform: ScriptedTransform, parameter: EffectParameter, id: &str) -> Self {
        Self::with_transform(Transform::Scripted(transform), vec![parameter], id)
    }

    pub fn with_transform(transform: Transform, mut parameters: Vec<EffectParameter>, id: &str) -> Self {
        if parameters.len() > MAX_EFFECT_PARAMETERS {
            log::warn!(
                "effect '{}' declares {} parameters, keeping the first {}",
                id,
                parameters.len(),
                MAX_EFFECT_PARAMETERS
            );
            parameters.truncate(MAX_EFFECT_PARAMETERS);
        }
        let name = parameters
            .first()
            .map(|p| p.value().name().to_string())
            .unwrap_or_else(|| id.to_string());

        let mut effect = Self {
            id: id.to_string(),
            transform,
            parameters,
            enabled: Arc::new(BooleanParameter::new(format!("{name} Enabled"), format!("{id}Enabled"), false)),
            precedence: -1,
            enableable: true,
            values: [0.0; MAX_EFFECT_PARAMETERS],
            lfo_states: [LfoState::new(); MAX_EFFECT_PARAMETERS],
            sample_rate: 44100.0,
        };
        effect.load_values();
        effect
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Apply the transform to one sample, advancing any LFO modulation.
    /// A non-finite result is discarded in favour of the input.
    pub fn apply(&mut self, index: usize, input: Vector2) -> Vector2 {
        self.animate_values();
        let n = self.parameters.len();
        let output = self.transform.apply(index, input, &self.values[..n], self.sample_rate);
        if output.is_finite() {
            output
        } else {
            input
        }
    }

    /// Re-evaluate the transform with the current parameter values without
    /// advancing modulation. Used to publish values from effects that feed
    /// shared state (scripted sliders, render controls).
    pub fn refresh(&mut self) {
        self.load_values();
        let n = self.parameters.len();
        self.transform.apply(0, Vector2::default(), &self.values[..n], self.sample_rate);
    }

    fn load_values(&mut self) {
        for (slot, parameter) in self.values.iter_mut().zip(&self.parameters) {
            *slot = parameter.value().value();
        }
    }

    fn animate_values(&mut self) {
        let sample_rate = self.sample_rate;
        for ((slot, parameter), lfo) in self
            .values
            .iter_mut()
            .zip(&self.parameters)
            .zip(self.lfo_states.iter_mut())
        {
            let value = parameter.value();
            match parameter.lfo_type() {
                LfoType::Static => *slot = value.value(),
                kind => {
                    let (min, max) = (value.min(), value.max());
                    *slot = min + lfo.tick(kind, parameter.lfo_rate(), sample_rate) * (max - min);
                }
            }
        }
    }

    /// Real values used by the most recent application
    pub fn current_values(&self) -> &[f64] {
        &self.values[..self.parameters.len()]
    }

    /// Current real value of the parameter at `index`
    pub fn value(&self, index: usize) -> Option<f64> {
        self.parameters.get(index).map(|p| p.value().value())
    }

    pub fn set_value(&self, index: usize, value: f64) {
        if let Some(p) = self.parameters.get(index) {
            p.value().set_value(value);
        }
    }

    pub fn parameters(&self) -> &[EffectParameter] {
        &self.parameters
    }

    pub fn parameter(&self, id: &str) -> Option<&EffectParameter> {
        self.parameters.iter().find(|p| p.id() == id)
    }

    pub fn enabled(&self) -> &Arc<BooleanParameter> {
        &self.enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn set_precedence(&mut self, precedence: i32) {
        self.precedence = precedence;
    }

    /// Whether the host-facing enable toggle is exposed
    pub fn is_enableable(&self) -> bool {
        self.enableable
    }

    pub fn mark_enableable(&mut self, enableable: bool) {
        self.enableable = enableable;
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn script(&self) -> Option<&ScriptedFunction> {
        match &self.transform {
            Transform::Native(t) => t.script(),
            Transform::Scripted(_) => None,
        }
    }

    pub fn script_mut(&mut self) -> Option<&mut ScriptedFunction> {
        match &mut self.transform {
            Transform::Native(t) => t.script_mut(),
            Transform::Scripted(_) => None,
        }
    }

    /// Write enabled flag, precedence and every parameter into `xml`
    pub fn save(&self, xml: &mut Element) {
        xml.set_attribute("id", &self.id);
        xml.set_bool_attribute("enabled", self.is_enabled());
        xml.set_attribute("precedence", self.precedence);
        for parameter in &self.parameters {
            let value = parameter.value();
            let parameter_xml = xml.create_child("parameter");
            parameter_xml.set_attribute("id", value.id());
            parameter_xml.set_attribute("value", value.value());
            parameter_xml.set_attribute("min", value.min());
            parameter_xml.set_attribute("max", value.max());
            parameter_xml.set_attribute("step", value.step());
            if let Some(lfo) = parameter.lfo() {
                let lfo_xml = parameter_xml.create_child("lfo");
                lfo_xml.set_attribute("type", lfo.kind.value());
                lfo_xml.set_attribute("rate", lfo.rate.value());
            }
        }
    }

    /// Restore from `xml`. Attributes and parameters that are missing or
    /// unknown are left as they are.
    pub fn load(&mut self, xml: &Element) {
        if let Some(enabled) = xml.bool_attribute("enabled") {
            self.set_enabled(enabled);
        }
        if xml.has_attribute("precedence") {
            self.precedence = xml.int_attribute("precedence", self.precedence as i64) as i32;
        }
        for parameter_xml in xml.children_named("parameter") {
            let id = parameter_xml.string_attribute("id");
            let Some(parameter) = self.parameter(&id) else {
                log::debug!("effect '{}': skipping unknown parameter '{}'", self.id, id);
                continue;
            };
            let value = parameter.value();
            if let (Some(min), Some(max)) = (parameter_xml.double_attribute("min"), parameter_xml.double_attribute("max")) {
                value.set_range(min, max);
            }
            if let Some(step) = parameter_xml.double_attribute("step") {
                value.set_step(step);
            }
            if let Some(v) = parameter_xml.double_attribute("value") {
                value.set_value(v);
            }
            if let (Some(lfo), Some(lfo_xml)) = (parameter.lfo(), parameter_xml.child("lfo")) {
                lfo.kind.set_value(lfo_xml.int_attribute("type", lfo.kind.value() as i64) as i32);
                if let Some(rate) = lfo_xml.double_attribute("rate") {
                    lfo.rate.set_value(rate);
                }
            }
        }
        self.load_values();
    }
}
