// Integration tests for transforms running inside a pipeline

use std::f64::consts::PI;
use std::sync::Arc;

use oscirender::effect::EffectApplication;
use oscirender::effects::{PerspectiveEffect, RotateEffect, TranslateEffect};
use oscirender::script::{PassthroughScriptEngine, ScriptEngine, ScriptEvaluator, ScriptVariables};
use oscirender::source::ShapeParser;
use oscirender::{Effect, EffectParameter, Pipeline, PipelineConfig, PipelineError, ScriptError, Vector2};

/// Scripts return `(x, y, slider_a)`; code containing "syntax error" fails
struct SliderDepthEngine;

#[derive(Default)]
struct SliderDepth {
    x: f64,
    y: f64,
    a: f64,
}

impl ScriptEvaluator for SliderDepth {
    fn set_variable(&mut self, name: &str, value: f64) {
        match name {
            "x" => self.x = value,
            "y" => self.y = value,
            "slider_a" => self.a = value,
            _ => {}
        }
    }

    fn run(&mut self, output: &mut [f64]) -> Result<usize, ScriptError> {
        output[..3].copy_from_slice(&[self.x, self.y, self.a]);
        Ok(3)
    }
}

impl ScriptEngine for SliderDepthEngine {
    fn compile(&self, code: &str) -> Result<Box<dyn ScriptEvaluator>, ScriptError> {
        if code.contains("syntax error") {
            return Err(ScriptError::Compile("unexpected symbol".to_string()));
        }
        Ok(Box::new(SliderDepth::default()))
    }
}

fn scripted_pipeline() -> Pipeline {
    let pipeline = Pipeline::with_collaborators(
        PipelineConfig::default(),
        Arc::new(ShapeParser),
        Arc::new(SliderDepthEngine),
    );
    pipeline.set_effect_enabled("perspective", true).unwrap();
    pipeline.set_effect_value("perspectiveStrength", 1.0).unwrap();
    pipeline.set_effect_value("perspectiveRotateX", 0.0).unwrap();
    pipeline.set_effect_value("perspectiveRotateY", 0.0).unwrap();
    pipeline
}

fn render(pipeline: &Pipeline, frames: usize) -> Vec<f32> {
    let mut output = vec![0.0f32; frames * 2];
    pipeline.process_block(&mut output, 2);
    output
}

#[test]
fn test_zero_strength_perspective_is_identity() {
    let reference = Pipeline::default();
    let pipeline = Pipeline::default();
    pipeline.set_effect_enabled("perspective", true).unwrap();
    pipeline.set_effect_value("perspectiveStrength", 0.0).unwrap();
    pipeline.set_effect_value("perspectiveRotateSpeed", 1.0).unwrap();

    assert_eq!(render(&pipeline, 512), render(&reference, 512));
}

#[test]
fn test_scripted_slot_drives_perspective_script() {
    let flat = scripted_pipeline();
    let deep = scripted_pipeline();
    deep.set_effect_value("luaA", 0.5).unwrap();

    // z = 0 projects with factor -1, z = 0.5 with factor -2
    let flat_out = render(&flat, 256);
    let deep_out = render(&deep, 256);
    for (f, d) in flat_out.iter().zip(&deep_out) {
        assert!((d - 2.0 * f).abs() < 1e-6, "slider_a should move the point in depth");
    }
}

#[test]
fn test_failed_compile_keeps_code_and_renders() {
    let pipeline = scripted_pipeline();
    let code = "return { x, y, syntax error";

    let result = pipeline.update_perspective_code(code);
    assert!(matches!(
        result,
        Err(PipelineError::Script(ScriptError::Compile(_)))
    ));
    assert_eq!(pipeline.perspective_code(), code, "Code is kept for the editor");

    let output = render(&pipeline, 256);
    assert!(output.iter().all(|s| s.is_finite()));
    assert!(output.iter().any(|s| *s != 0.0), "Shape still drawn without the script");
}

#[test]
fn test_rotate_effect_completes_turn() {
    let mut effect = Effect::new(
        RotateEffect::new(),
        vec![EffectParameter::new("2D Rotate", "2DRotateSpeed", 1.0, 0.0, 1.0)],
        "2DRotate",
    );
    effect.set_sample_rate(4.0);

    let input = Vector2::new(1.0, 0.0);
    let quarter = effect.apply(0, input);
    assert!((quarter.x - (PI / 2.0).cos()).abs() < 1e-9);
    assert!((quarter.y - 1.0).abs() < 1e-9, "one quarter turn per sample");

    for i in 1..4 {
        effect.apply(i, input);
    }
    let out = effect.apply(4, input);
    assert!((out - quarter).magnitude() < 1e-9, "Rotation wraps after a full turn");
}

#[test]
fn test_more_scripted_slots() {
    let pipeline = Pipeline::new(PipelineConfig {
        scripted_slots: 30,
        ..PipelineConfig::default()
    });
    assert!(pipeline.parameter("luaZ").is_some());
    assert!(pipeline.parameter("luaAD").is_some());
    assert!(pipeline.parameter("luaAE").is_none());
}

#[test]
fn test_lfo_sweeps_without_touching_host_value() {
    let pipeline = Pipeline::default();
    pipeline.set_effect_enabled("translate", true).unwrap();
    // Square LFO over translateX's full range
    pipeline.set_effect_value("translateXLfo", 3.0).unwrap();
    pipeline.set_effect_value("translateXLfoRate", 100.0).unwrap();

    let output = render(&pipeline, 4410);
    let host = pipeline.parameter("translateX").unwrap();
    assert!((host.normalized() - 0.5).abs() < 1e-9, "host value stays at its default");

    let reference = render(&Pipeline::default(), 4410);
    assert!(
        output.iter().zip(&reference).any(|(a, b)| (a - b).abs() > 0.1),
        "modulation should move the image"
    );
}

#[test]
fn test_stateless_transforms_repeat_and_rotations_advance() {
    let input = Vector2::new(0.5, 0.25);

    let mut translate = TranslateEffect::new();
    let first = translate.apply(0, input, &[0.3, -0.2], 44100.0);
    for i in 1..16 {
        assert_eq!(
            translate.apply(i, input, &[0.3, -0.2], 44100.0),
            first,
            "translate depends only on its input and values"
        );
    }

    let mut rotate = RotateEffect::new();
    let a = rotate.apply(0, input, &[1.0], 44100.0);
    let b = rotate.apply(0, input, &[1.0], 44100.0);
    assert!((a - b).magnitude() > 1e-9, "rotation phase advances per call");

    let mut perspective = PerspectiveEffect::new(&PassthroughScriptEngine, Arc::new(ScriptVariables::new(26)));
    let values = [1.0, 0.1, 1.0, 1.0, 1.0, 0.0];
    let a = perspective.apply(0, input, &values, 44100.0);
    let b = perspective.apply(0, input, &values, 44100.0);
    assert!((a - b).magnitude() > 1e-9, "perspective rotation accumulates per call");
}
