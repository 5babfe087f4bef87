// Integration tests for block rendering, effect ordering and the host registry

use oscirender::{Pipeline, PipelineConfig};

fn render(pipeline: &Pipeline, frames: usize) -> Vec<f32> {
    let mut output = vec![0.0f32; frames * 2];
    pipeline.process_block(&mut output, 2);
    output
}

fn set_normalized(pipeline: &Pipeline, id: &str, normalized: f64) {
    let index = pipeline.parameter_index(id).unwrap();
    pipeline.set_parameter_normalized(index, normalized);
}

#[test]
fn test_default_pipeline_draws_square() {
    let pipeline = Pipeline::default();
    let output = render(&pipeline, 512);

    assert!(output.iter().any(|s| *s != 0.0), "Default shape should be audible");
    assert!(
        output.iter().all(|s| s.abs() <= 0.5 + 1e-6),
        "Square corners sit at +-0.5"
    );
}

#[test]
fn test_volume_at_silence_epsilon_skips_source_and_effects() {
    let pipeline = Pipeline::new(PipelineConfig {
        silence_epsilon: 0.75,
        ..PipelineConfig::default()
    });
    pipeline.set_effect_enabled("translate", true).unwrap();
    pipeline.set_effect_value("translateX", 0.5).unwrap();

    // Volume range is [0, 3], so 0.25 normalized is exactly the epsilon
    set_normalized(&pipeline, "volume", 0.25);
    let output = render(&pipeline, 128);
    assert!(
        output.iter().all(|s| *s == 0.0),
        "At the epsilon neither the source nor translate may run"
    );

    set_normalized(&pipeline, "volume", 0.26);
    let output = render(&pipeline, 128);
    assert!(
        output.iter().any(|s| *s != 0.0),
        "Just above the epsilon the shape is rendered"
    );
}

#[test]
fn test_output_clipped_to_threshold() {
    let pipeline = Pipeline::default();
    pipeline.set_effect_value("volume", 3.0).unwrap();
    pipeline.set_effect_value("threshold", 0.2).unwrap();

    let output = render(&pipeline, 1024);
    assert!(output.iter().all(|s| s.abs() <= 0.2f32), "Every sample within threshold");
    assert!(
        output.iter().any(|s| s.abs() == 0.2f32),
        "Loud corners should hit the threshold"
    );
}

#[test]
fn test_precedence_sorts_toggleable_effects() {
    let pipeline = Pipeline::default();
    let order = pipeline.toggleable_order();
    for (i, id) in order.iter().enumerate() {
        pipeline.set_effect_precedence(id, 10 + i as i32).unwrap();
    }

    pipeline.set_effect_precedence("bitCrush", 2).unwrap();
    pipeline.set_effect_precedence("bulge", 0).unwrap();
    pipeline.set_effect_precedence("2DRotate", 1).unwrap();

    let order = pipeline.toggleable_order();
    assert_eq!(&order[..3], &["bulge", "2DRotate", "bitCrush"]);
    assert_eq!(order[3], "vectorCancelling", "Untouched effects keep their order");
}

#[test]
fn test_equal_precedence_keeps_order() {
    let pipeline = Pipeline::default();
    let before = pipeline.toggleable_order();
    pipeline.with_effects(|effects| {
        for id in &before {
            effects.get_effect_mut(id).unwrap().set_precedence(0);
        }
        effects.update_effect_precedence();
    });
    assert_eq!(pipeline.toggleable_order(), before);
}

#[test]
fn test_disabled_effect_is_bypassed() {
    let reference = Pipeline::default();
    let pipeline = Pipeline::default();
    pipeline.set_effect_value("bulge", 0.8).unwrap();
    pipeline.set_effect_value("bitCrush", 0.9).unwrap();

    assert_eq!(render(&pipeline, 256), render(&reference, 256));
}

#[test]
fn test_translate_offsets_output() {
    let reference = Pipeline::default();
    let pipeline = Pipeline::default();
    pipeline.set_effect_enabled("translate", true).unwrap();
    pipeline.set_effect_value("translateX", 0.25).unwrap();

    let expected = render(&reference, 256);
    let output = render(&pipeline, 256);
    for (frame, reference) in output.chunks(2).zip(expected.chunks(2)) {
        assert!((frame[0] - reference[0] - 0.25).abs() < 1e-6, "x moves by 0.25");
        assert!((frame[1] - reference[1]).abs() < 1e-6, "y is untouched");
    }
}

#[test]
fn test_extra_channels_are_silent() {
    let pipeline = Pipeline::default();
    let mut output = vec![1.0f32; 4 * 64];
    pipeline.process_block(&mut output, 4);
    for frame in output.chunks(4) {
        assert_eq!(frame[2], 0.0);
        assert_eq!(frame[3], 0.0);
    }
}

#[test]
fn test_midi_enabled_gates_on_notes() {
    let pipeline = Pipeline::default();
    pipeline.get_boolean_parameter("midiEnabled").unwrap().set(true);

    let output = render(&pipeline, 256);
    assert!(output.iter().all(|s| *s == 0.0), "No note held, no output");

    pipeline.note_on();
    let output = render(&pipeline, 2048);
    assert!(output.iter().any(|s| *s != 0.0), "A held note is audible");
}

#[test]
fn test_envelope_edit_within_epsilon_is_ignored() {
    let pipeline = Pipeline::default();
    let envelope = pipeline.envelope_parameters();
    let mut adsr = envelope.to_adsr();

    adsr.sustain_level += 0.00001;
    pipeline.envelope_changed(adsr);
    assert!((envelope.sustain_level.value() - 0.6).abs() < 1e-9);

    adsr.sustain_level = 0.3;
    pipeline.envelope_changed(adsr);
    assert!((envelope.sustain_level.value() - 0.3).abs() < 1e-9);
}

#[test]
fn test_file_index_guards() {
    let pipeline = Pipeline::default();
    pipeline.add_file("a.txt", b"a".to_vec());
    pipeline.add_file("b.txt", b"b".to_vec());
    assert_eq!(pipeline.current_file_index(), Some(1));

    pipeline.change_current_file(Some(5));
    assert_eq!(pipeline.current_file_index(), Some(1), "Out of range is a no-op");
    pipeline.remove_file(9);
    assert_eq!(pipeline.num_files(), 2);

    pipeline.change_current_file(None);
    assert_eq!(pipeline.current_file_name(), "");

    pipeline.remove_file(0);
    assert_eq!(pipeline.file_name(0).as_deref(), Some("b.txt"));
    assert_eq!(pipeline.current_file_index(), Some(0));
}

#[test]
fn test_loaded_negative_threshold_range_renders() {
    let document = br#"<project version="2.0.0">
  <effects>
    <effect id="threshold">
      <parameter id="threshold" value="-0.5" min="-1" max="1"/>
    </effect>
  </effects>
</project>"#;

    let pipeline = Pipeline::default();
    pipeline.load_project(document).unwrap();

    let output = render(&pipeline, 32);
    assert!(
        output.iter().all(|s| *s == 0.0),
        "a negative threshold clips everything to silence"
    );
}

#[test]
fn test_overflowing_range_is_ignored() {
    let document = br#"<project version="2.0.0">
  <effects>
    <effect id="threshold">
      <parameter id="threshold" value="1" min="-1e308" max="1e308"/>
    </effect>
  </effects>
</project>"#;

    let pipeline = Pipeline::default();
    pipeline.load_project(document).unwrap();

    let output = render(&pipeline, 32);
    assert!(output.iter().all(|s| s.is_finite()));
    assert!(output.iter().any(|s| *s != 0.0), "threshold keeps its old range");
}

#[test]
fn test_partial_frame_stays_silent() {
    let pipeline = Pipeline::default();
    let mut output = vec![1.0f32; 65];
    pipeline.process_block(&mut output, 2);

    assert!(output[..64].iter().any(|s| *s != 0.0));
    assert_eq!(output[64], 0.0, "Trailing sample without a full frame is zeroed");
}
