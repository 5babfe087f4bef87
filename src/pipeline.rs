//! The effect pipeline: effect collections, locking, per-block rendering,
//! the host parameter registry and consumer fan-out.
//!
//! Lock order is fixed for the whole crate: sources, then effects, then
//! font. The consumer list has its own lock which is never held while
//! taking any other.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::consumer::{BufferConsumer, ConsumerHandle};
use crate::effect::Effect;
use crate::effects::{
    permanent_effects, publish_bound, scripted_effect, toggleable_effects, RenderControls, TraceBound,
    PERSPECTIVE_ID, TRACE_MAX_ID, TRACE_MIN_ID,
};
use crate::envelope::{Adsr, EnvelopeParameters, EnvelopeVoice};
use crate::error::{PipelineError, ProjectError, ScriptError};
use crate::parameter::{AtomicF64, BooleanParameter, HostParameter};
use crate::persistence::{self, legacy, ProjectState};
use crate::script::{PassthroughScriptEngine, ScriptEngine, ScriptVariables};
use crate::source::{FontDescriptor, ShapeParser, SourceParser, SourceSet};
use crate::vector::Vector2;

/// Engine configuration
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub sample_rate: f64,
    /// Volume at or below this skips the source and toggleable effects
    pub silence_epsilon: f64,
    /// UI edits closer than this to the automated value are ignored
    pub approx_equal_epsilon: f64,
    /// Number of scripted slider slots
    pub scripted_slots: usize,
    /// Values (not pairs) per consumer read
    pub consumer_buffer_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            silence_epsilon: 0.00001,
            approx_equal_epsilon: 0.0001,
            scripted_slots: 26,
            consumer_buffer_len: 2048,
        }
    }
}

/// Symmetric hard clip; non-finite input is silenced
#[inline]
fn clip(sample: f64, threshold: f64) -> f32 {
    if sample.is_finite() {
        sample.clamp(-threshold, threshold) as f32
    } else {
        0.0
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The three effect collections plus envelope state, guarded together
pub struct EffectSet {
    toggleable: Vec<Effect>,
    permanent: Vec<Effect>,
    scripted: Vec<Effect>,
    adsr: Adsr,
    voice: EnvelopeVoice,
}

impl EffectSet {
    /// Toggleable effects in execution order
    pub fn toggleable(&self) -> &[Effect] {
        &self.toggleable
    }

    pub fn permanent(&self) -> &[Effect] {
        &self.permanent
    }

    pub fn scripted(&self) -> &[Effect] {
        &self.scripted
    }

    /// Every effect: toggleable, permanent, then scripted
    pub fn all(&self) -> impl Iterator<Item = &Effect> {
        self.toggleable
            .iter()
            .chain(self.permanent.iter())
            .chain(self.scripted.iter())
    }

    fn all_mut(&mut self) -> impl Iterator<Item = &mut Effect> {
        self.toggleable
            .iter_mut()
            .chain(self.permanent.iter_mut())
            .chain(self.scripted.iter_mut())
    }

    pub fn get_effect(&self, id: &str) -> Option<&Effect> {
        self.all().find(|e| e.id() == id)
    }

    pub fn get_effect_mut(&mut self, id: &str) -> Option<&mut Effect> {
        self.all_mut().find(|e| e.id() == id)
    }

    /// Re-sort toggleable effects by precedence. Stable, so equal
    /// precedences keep their current relative order.
    pub fn update_effect_precedence(&mut self) {
        self.toggleable.sort_by_key(Effect::precedence);
    }

    /// Re-evaluate every scripted slot so its value reaches the scripts
    pub fn apply_scripted(&mut self) {
        for effect in &mut self.scripted {
            effect.refresh();
        }
    }

    /// Publish permanent effect values and the trace bounds to the controls
    fn sync_controls(&mut self, controls: &RenderControls) {
        for effect in &mut self.permanent {
            effect.refresh();
        }
        for effect in &mut self.toggleable {
            let bound = match effect.id() {
                TRACE_MIN_ID => TraceBound::Min,
                TRACE_MAX_ID => TraceBound::Max,
                _ => continue,
            };
            if effect.is_enabled() {
                effect.refresh();
            } else {
                publish_bound(controls, bound, bound.untraced());
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        for effect in self.all_mut() {
            effect.set_sample_rate(sample_rate);
        }
    }

    /// Toggleable then permanent effects for one sample
    fn apply(&mut self, index: usize, mut point: Vector2, audible: bool) -> Vector2 {
        if audible {
            for effect in &mut self.toggleable {
                if effect.is_enabled() {
                    point = effect.apply(index, point);
                }
            }
        }
        for effect in &mut self.permanent {
            point = effect.apply(index, point);
        }
        point
    }

    pub fn adsr(&self) -> Adsr {
        self.adsr
    }
}

/// Real-time effect pipeline shared between the audio callback and the
/// control side
pub struct Pipeline {
    config: PipelineConfig,
    sources: Mutex<SourceSet>,
    effects: Mutex<EffectSet>,
    font: Mutex<FontDescriptor>,
    consumers: Mutex<Vec<ConsumerHandle>>,
    controls: Arc<RenderControls>,
    script_engine: Arc<dyn ScriptEngine>,
    script_variables: Arc<ScriptVariables>,
    parameters: Vec<HostParameter>,
    /// Host index of each scripted slot's value, by slot
    scripted_parameter_indices: Vec<usize>,
    boolean_parameters: Vec<Arc<BooleanParameter>>,
    midi_enabled: Arc<BooleanParameter>,
    envelope: EnvelopeParameters,
    sample_rate: AtomicF64,
}

impl Pipeline {
    /// Pipeline with the built-in shape parser and no script sandbox
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_collaborators(config, Arc::new(ShapeParser), Arc::new(PassthroughScriptEngine))
    }

    pub fn with_collaborators(
        config: PipelineConfig,
        parser: Arc<dyn SourceParser>,
        script_engine: Arc<dyn ScriptEngine>,
    ) -> Self {
        let controls = Arc::new(RenderControls::new());
        let script_variables = Arc::new(ScriptVariables::new(config.scripted_slots));

        let (mut toggleable, perspective_fixed) =
            toggleable_effects(&controls, script_engine.as_ref(), &script_variables);
        for (i, effect) in toggleable.iter_mut().enumerate() {
            effect.set_precedence(i as i32);
        }
        let permanent = permanent_effects(&controls);
        let scripted: Vec<Effect> = (1..=config.scripted_slots)
            .map(|n| scripted_effect(n, &script_variables))
            .collect();

        let midi_enabled = Arc::new(BooleanParameter::new("MIDI Enabled", "midiEnabled", false));
        let boolean_parameters: Vec<Arc<BooleanParameter>> = controls
            .obj_fixed_rotate_parameters()
            .iter()
            .chain(perspective_fixed.iter())
            .cloned()
            .chain(std::iter::once(midi_enabled.clone()))
            .collect();
        let envelope = EnvelopeParameters::new();

        // Host exposure order is part of the saved-project contract
        let mut parameters: Vec<HostParameter> = toggleable
            .iter()
            .map(|e| HostParameter::Bool(e.enabled().clone()))
            .collect();
        let mut scripted_parameter_indices = Vec::with_capacity(scripted.len());
        for effect in toggleable.iter().chain(permanent.iter()) {
            for parameter in effect.parameters() {
                parameters.extend(parameter.host_parameters());
            }
        }
        for effect in &scripted {
            scripted_parameter_indices.push(parameters.len());
            for parameter in effect.parameters() {
                parameters.extend(parameter.host_parameters());
            }
        }
        parameters.extend(boolean_parameters.iter().cloned().map(HostParameter::Bool));
        parameters.extend(envelope.host_parameters());

        let mut effects = EffectSet {
            toggleable,
            permanent,
            scripted,
            adsr: envelope.to_adsr(),
            voice: EnvelopeVoice::new(),
        };
        effects.set_sample_rate(config.sample_rate);
        effects.sync_controls(&controls);

        let mut sources = SourceSet::new(parser);
        sources.set_sample_rate(config.sample_rate);

        log::debug!(
            "pipeline ready: {} host parameters, {} scripted slots",
            parameters.len(),
            config.scripted_slots
        );

        Self {
            sample_rate: AtomicF64::new(config.sample_rate),
            config,
            sources: Mutex::new(sources),
            effects: Mutex::new(effects),
            font: Mutex::new(FontDescriptor::default()),
            consumers: Mutex::new(Vec::new()),
            controls,
            script_engine,
            script_variables,
            parameters,
            scripted_parameter_indices,
            boolean_parameters,
            midi_enabled,
            envelope,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn controls(&self) -> &Arc<RenderControls> {
        &self.controls
    }

    pub fn script_variables(&self) -> &Arc<ScriptVariables> {
        &self.script_variables
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate.load()
    }

    /// Configure for a new sample rate before rendering
    pub fn prepare(&self, sample_rate: f64) {
        self.sample_rate.store(sample_rate);
        let mut sources = lock(&self.sources);
        let mut effects = lock(&self.effects);
        sources.set_sample_rate(sample_rate);
        effects.set_sample_rate(sample_rate);
    }

    /// Render one block of interleaved output. Channel 0 carries x and
    /// channel 1 carries y; any further channels are silent.
    pub fn process_block(&self, output: &mut [f32], channels: usize) {
        output.fill(0.0);
        if channels == 0 {
            return;
        }
        let sample_rate = self.sample_rate();
        let epsilon = self.config.silence_epsilon;
        let midi = self.midi_enabled.get();

        let mut sources = lock(&self.sources);
        let mut effects = lock(&self.effects);

        effects.adsr = self.envelope.to_adsr();
        effects.apply_scripted();
        effects.sync_controls(&self.controls);

        // Trailing samples of a partial frame stay silent
        for (index, frame) in output.chunks_exact_mut(channels).enumerate() {
            let audible = self.controls.volume() > epsilon;
            let mut point = Vector2::default();
            if audible {
                let gain = if midi {
                    let adsr = effects.adsr;
                    effects.voice.next_level(&adsr, sample_rate)
                } else {
                    1.0
                };
                point = sources.next_vector(&self.controls) * gain;
            }

            point = effects.apply(index, point, audible);

            let volume = self.controls.volume();
            // NaN.max(0.0) is 0.0
            let threshold = self.controls.threshold().max(0.0);
            let x = clip(point.x * volume, threshold);
            let y = clip(point.y * volume, threshold);

            frame[0] = x;
            if channels >= 2 {
                frame[1] = y;
            }

            self.fan_out(x, y);
        }
    }

    /// Push one output pair to every consumer. The list lock is only tried,
    /// so a register or unregister in progress drops this pair alone.
    fn fan_out(&self, x: f32, y: f32) {
        if let Ok(consumers) = self.consumers.try_lock() {
            for consumer in consumers.iter() {
                consumer.write_pair(x, y);
            }
        }
    }

    // ---- host parameters ----

    /// Every automatable value in host exposure order
    pub fn parameters(&self) -> &[HostParameter] {
        &self.parameters
    }

    pub fn parameter(&self, id: &str) -> Option<&HostParameter> {
        self.parameters.iter().find(|p| p.id() == id)
    }

    pub fn parameter_index(&self, id: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.id() == id)
    }

    /// Host automation entry point: set a normalized value and notify
    pub fn set_parameter_normalized(&self, index: usize, normalized: f64) {
        if let Some(parameter) = self.parameters.get(index) {
            parameter.set_normalized(normalized);
            self.parameter_value_changed(index);
        }
    }

    /// Change notification for the parameter at `index`. Scripted slot
    /// values are pushed to the script variables straight away.
    pub fn parameter_value_changed(&self, index: usize) {
        if let Some(slot) = self.scripted_parameter_indices.iter().position(|&i| i == index) {
            let mut effects = lock(&self.effects);
            if let Some(effect) = effects.scripted.get_mut(slot) {
                effect.refresh();
            }
        }
    }

    pub fn boolean_parameters(&self) -> &[Arc<BooleanParameter>] {
        &self.boolean_parameters
    }

    pub fn get_boolean_parameter(&self, id: &str) -> Option<&Arc<BooleanParameter>> {
        self.boolean_parameters.iter().find(|p| p.id() == id)
    }

    pub fn envelope_parameters(&self) -> &EnvelopeParameters {
        &self.envelope
    }

    // ---- effects ----

    /// Run `f` with the effect lock held
    pub fn with_effects<R>(&self, f: impl FnOnce(&mut EffectSet) -> R) -> R {
        let mut effects = lock(&self.effects);
        f(&mut effects)
    }

    pub fn set_effect_enabled(&self, id: &str, enabled: bool) -> Result<(), PipelineError> {
        let effects = lock(&self.effects);
        let effect = effects
            .get_effect(id)
            .ok_or_else(|| PipelineError::UnknownEffect(id.to_string()))?;
        effect.set_enabled(enabled);
        Ok(())
    }

    /// Set one effect's precedence and re-sort the toggleable effects
    pub fn set_effect_precedence(&self, id: &str, precedence: i32) -> Result<(), PipelineError> {
        let mut effects = lock(&self.effects);
        let effect = effects
            .get_effect_mut(id)
            .ok_or_else(|| PipelineError::UnknownEffect(id.to_string()))?;
        effect.set_precedence(precedence);
        effects.update_effect_precedence();
        Ok(())
    }

    /// Set an effect parameter by its real value
    pub fn set_effect_value(&self, id: &str, value: f64) -> Result<(), PipelineError> {
        let index = self
            .parameter_index(id)
            .ok_or_else(|| PipelineError::UnknownParameter(id.to_string()))?;
        match &self.parameters[index] {
            HostParameter::Float(p) => p.set_value(value),
            HostParameter::Int(p) => p.set_value(value.round() as i32),
            HostParameter::Bool(p) => p.set(value >= 0.5),
        }
        self.parameter_value_changed(index);
        Ok(())
    }

    /// Ids of the toggleable effects in current execution order
    pub fn toggleable_order(&self) -> Vec<String> {
        lock(&self.effects)
            .toggleable
            .iter()
            .map(|e| e.id().to_string())
            .collect()
    }

    /// Compile and install new perspective code. The code is kept even if
    /// it fails to compile; the effect then leaves points untransformed.
    pub fn update_perspective_code(&self, code: &str) -> Result<(), PipelineError> {
        let compiled = self.script_engine.compile(code);
        let mut effects = lock(&self.effects);
        let script = effects
            .get_effect_mut(PERSPECTIVE_ID)
            .and_then(Effect::script_mut)
            .ok_or_else(|| PipelineError::UnknownEffect(PERSPECTIVE_ID.to_string()))?;
        script.install(code, compiled).map_err(PipelineError::from)
    }

    pub fn perspective_code(&self) -> String {
        lock(&self.effects)
            .get_effect(PERSPECTIVE_ID)
            .and_then(Effect::script)
            .map(|s| s.code().to_string())
            .unwrap_or_default()
    }

    // ---- envelope ----

    /// An envelope edited in the UI. Parameters only follow when they
    /// differ by more than the approx-equal epsilon.
    pub fn envelope_changed(&self, adsr: Adsr) {
        if self.envelope.update_from(&adsr, self.config.approx_equal_epsilon) {
            log::debug!("envelope parameters updated from edit");
        }
    }

    pub fn note_on(&self) {
        lock(&self.effects).voice.note_on();
    }

    pub fn note_off(&self) {
        lock(&self.effects).voice.note_off();
    }

    // ---- files ----

    fn after_source_change(&self, effects: &mut EffectSet) {
        effects.apply_scripted();
        effects.sync_controls(&self.controls);
    }

    /// Add a file, parse it and make it current
    pub fn add_file(&self, name: &str, data: Vec<u8>) {
        let mut sources = lock(&self.sources);
        let mut effects = lock(&self.effects);
        let font = lock(&self.font);
        sources.add_file(name, Arc::new(data), &font);
        self.after_source_change(&mut effects);
    }

    pub fn remove_file(&self, index: usize) {
        let mut sources = lock(&self.sources);
        let mut effects = lock(&self.effects);
        sources.remove_file(index);
        self.after_source_change(&mut effects);
    }

    pub fn update_file_block(&self, index: usize, data: Vec<u8>) {
        let mut sources = lock(&self.sources);
        let mut effects = lock(&self.effects);
        let font = lock(&self.font);
        sources.update_file_block(index, Arc::new(data), &font);
        self.after_source_change(&mut effects);
    }

    /// Reparse a loaded file and make it current
    pub fn open_file(&self, index: usize) {
        let mut sources = lock(&self.sources);
        let mut effects = lock(&self.effects);
        let font = lock(&self.font);
        sources.open_file(index, &font);
        self.after_source_change(&mut effects);
    }

    /// Switch to an already parsed file; `None` draws the default shape.
    /// Out-of-range indices are ignored.
    pub fn change_current_file(&self, index: Option<usize>) {
        let mut sources = lock(&self.sources);
        let mut effects = lock(&self.effects);
        if sources.change_current_file(index) {
            self.after_source_change(&mut effects);
        }
    }

    pub fn num_files(&self) -> usize {
        lock(&self.sources).num_files()
    }

    pub fn current_file_index(&self) -> Option<usize> {
        lock(&self.sources).current_file_index()
    }

    pub fn current_file_name(&self) -> String {
        lock(&self.sources).current_file_name().to_string()
    }

    pub fn file_name(&self, index: usize) -> Option<String> {
        lock(&self.sources).file_name(index).map(str::to_string)
    }

    pub fn file_block(&self, index: usize) -> Option<Arc<Vec<u8>>> {
        lock(&self.sources).file_block(index)
    }

    pub fn font(&self) -> FontDescriptor {
        lock(&self.font).clone()
    }

    /// Takes effect the next time a file is parsed
    pub fn set_font(&self, font: FontDescriptor) {
        *lock(&self.font) = font;
    }

    // ---- persistence ----

    /// Save the whole configuration in the binary project encoding
    pub fn get_state_information(&self) -> Result<Vec<u8>, ProjectError> {
        let document = {
            let sources = lock(&self.sources);
            let effects = lock(&self.effects);
            let font = lock(&self.font);
            persistence::project_document(&effects, &self.boolean_parameters, &self.envelope, &font, &sources)
        };
        persistence::encode_binary(&document)
    }

    /// Restore a saved project. Errors are logged and the current
    /// configuration is left as it was.
    pub fn set_state_information(&self, data: &[u8]) {
        if let Err(e) = self.load_project(data) {
            log::warn!("ignoring project state: {}", e);
        }
    }

    /// Restore a saved project in either encoding, migrating v1 projects
    pub fn load_project(&self, data: &[u8]) -> Result<(), ProjectError> {
        let root = persistence::decode(data)?;
        let state = if legacy::is_legacy(&root) {
            log::info!("opening v1 project");
            ProjectState::from_document(&legacy::migrate(&root)?)?
        } else {
            ProjectState::from_document(&root)?
        };
        self.apply_project_state(state);
        Ok(())
    }

    /// Apply a decoded project under the source and effect locks
    pub fn apply_project_state(&self, state: ProjectState) {
        let compiled = state
            .perspective_code
            .map(|code| {
                let compiled = self.script_engine.compile(&code);
                (code, compiled)
            });

        let mut sources = lock(&self.sources);
        let mut effects = lock(&self.effects);

        for effect_xml in &state.effects {
            let id = effect_xml.string_attribute("id");
            match effects.get_effect_mut(&id) {
                Some(effect) => effect.load(effect_xml),
                None => log::debug!("skipping unknown effect '{}'", id),
            }
        }
        effects.update_effect_precedence();

        for (id, value) in &state.boolean_parameters {
            if let Some(parameter) = self.get_boolean_parameter(id) {
                parameter.set(*value);
            }
        }

        for (id, value) in &state.envelope {
            if let Some(parameter) = self.envelope.parameter(id) {
                parameter.set_value(*value);
            }
        }
        effects.adsr = self.envelope.to_adsr();

        if let Some((code, compiled)) = compiled {
            let result: Result<(), ScriptError> = effects
                .get_effect_mut(PERSPECTIVE_ID)
                .and_then(Effect::script_mut)
                .map(|script| script.install(&code, compiled))
                .unwrap_or(Ok(()));
            if let Err(e) = result {
                log::warn!("saved perspective code does not compile: {}", e);
            }
        }

        let mut font = lock(&self.font);
        if let Some(saved) = state.font {
            *font = saved;
        }

        sources.clear();
        for (name, data) in state.files {
            sources.add_file(&name, Arc::new(data), &font);
        }
        sources.change_current_file(state.current_file);
        self.after_source_change(&mut effects);

        log::info!(
            "project loaded: {} files, current {:?}",
            sources.num_files(),
            sources.current_file_index()
        );
    }

    // ---- consumers ----

    /// Start collecting output for a visualiser, `consumer_buffer_len`
    /// values per read
    pub fn consumer_register(&self) -> ConsumerHandle {
        self.consumer_register_with_len(self.config.consumer_buffer_len)
    }

    pub fn consumer_register_with_len(&self, len: usize) -> ConsumerHandle {
        let consumer = Arc::new(BufferConsumer::new(len));
        lock(&self.consumers).push(consumer.clone());
        consumer
    }

    /// Block until the consumer's buffer fills or it is stopped, then
    /// detach it and return what it collected
    pub fn consumer_read(&self, consumer: &ConsumerHandle) -> Vec<f32> {
        let data = consumer.wait_until_full();
        self.consumer_unregister(consumer);
        data
    }

    /// Release a reader blocked in [`consumer_read`](Self::consumer_read)
    pub fn consumer_stop(&self, consumer: &ConsumerHandle) {
        consumer.force_notify();
    }

    pub fn consumer_unregister(&self, consumer: &ConsumerHandle) {
        lock(&self.consumers).retain(|c| !Arc::ptr_eq(c, consumer));
    }

    pub fn consumer_count(&self) -> usize {
        lock(&self.consumers).len()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_registry_order() {
        let pipeline = Pipeline::default();
        let ids: Vec<&str> = pipeline.parameters().iter().map(|p| p.id()).collect();
        assert_eq!(ids[0], "bitCrushEnabled");
        assert_eq!(ids[12], "traceMinEnabled");
        assert_eq!(ids[13], "bitCrush");
        assert_eq!(ids[14], "bitCrushLfo");
        assert_eq!(ids[15], "bitCrushLfoRate");

        let lua_a = pipeline.parameter_index("luaA").unwrap();
        let frequency = pipeline.parameter_index("frequency").unwrap();
        let trace_min = pipeline.parameter_index("traceMin").unwrap();
        assert!(trace_min < frequency && frequency < lua_a);
        assert_eq!(ids[lua_a + 1], "luaB", "scripted slots carry no LFO parameters");

        let n = ids.len();
        assert_eq!(&ids[n - 15..n - 8], &[
            "objFixedRotateX",
            "objFixedRotateY",
            "objFixedRotateZ",
            "perspectiveFixedRotateX",
            "perspectiveFixedRotateY",
            "perspectiveFixedRotateZ",
            "midiEnabled",
        ]);
        assert_eq!(ids[n - 8], "attackTime");
        assert_eq!(ids[n - 1], "releaseShape");
    }

    #[test]
    fn test_host_ids_unique() {
        let pipeline = Pipeline::default();
        let mut ids: Vec<&str> = pipeline.parameters().iter().map(|p| p.id()).collect();
        let n = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn test_scripted_slot_change_reaches_variables() {
        let pipeline = Pipeline::default();
        let index = pipeline.parameter_index("luaC").unwrap();
        pipeline.set_parameter_normalized(index, 0.5);
        assert!((pipeline.script_variables().get(2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_effect_errors() {
        let pipeline = Pipeline::default();
        assert_eq!(
            pipeline.set_effect_precedence("nope", 1),
            Err(PipelineError::UnknownEffect("nope".to_string()))
        );
        assert!(pipeline.set_effect_value("nope", 1.0).is_err());
    }

    #[test]
    fn test_consumer_list_contention_drops_one_pair() {
        let pipeline = Pipeline::default();
        let consumer = pipeline.consumer_register_with_len(2);

        let guard = lock(&pipeline.consumers);
        pipeline.fan_out(1.0, 1.0);
        drop(guard);
        pipeline.fan_out(0.5, -0.5);

        assert_eq!(pipeline.consumer_read(&consumer), vec![0.5, -0.5]);
    }

    #[test]
    fn test_clip_silences_non_finite() {
        assert_eq!(clip(f64::NAN, 1.0), 0.0);
        assert_eq!(clip(f64::INFINITY, 1.0), 0.0);
        assert_eq!(clip(2.0, 0.5), 0.5);
        assert_eq!(clip(-0.25, 0.0), 0.0);
    }

    #[test]
    fn test_mono_output() {
        let pipeline = Pipeline::default();
        let mut output = vec![0.0f32; 64];
        pipeline.process_block(&mut output, 1);
        assert!(output.iter().any(|&s| s != 0.0));
    }
}
