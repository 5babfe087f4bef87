// Integration tests for saving and restoring whole projects

use oscirender::persistence::{decode, to_xml_string};
use oscirender::source::FontDescriptor;
use oscirender::{Pipeline, ProjectError};

const TRIANGLE_OBJ: &[u8] = b"v -1 -1 0\nv 1 -1 0\nv 0 1 0\nf 1 2 3\n";

fn configured() -> Pipeline {
    let pipeline = Pipeline::default();
    pipeline.set_effect_enabled("bulge", true).unwrap();
    pipeline.set_effect_value("bulge", 0.4).unwrap();
    pipeline.set_effect_enabled("translate", true).unwrap();
    pipeline.set_effect_value("translateY", -0.3).unwrap();
    pipeline.set_effect_precedence("translate", -5).unwrap();
    pipeline.set_effect_value("luaB", 0.7).unwrap();
    pipeline.set_effect_value("frequency", 220.0).unwrap();
    pipeline.set_effect_value("wobbleLfo", 2.0).unwrap();
    pipeline.set_effect_value("attackTime", 0.2).unwrap();
    pipeline.get_boolean_parameter("objFixedRotateY").unwrap().set(true);
    pipeline.update_perspective_code("return { x * 2, y, z }").unwrap();
    pipeline.set_font(FontDescriptor {
        family: "Fira Mono".to_string(),
        bold: true,
        italic: false,
    });
    pipeline.add_file("triangle.obj", TRIANGLE_OBJ.to_vec());
    pipeline.add_file("notes.txt", b"hello".to_vec());
    pipeline.change_current_file(Some(0));
    pipeline
}

fn assert_same_configuration(a: &Pipeline, b: &Pipeline) {
    for (pa, pb) in a.parameters().iter().zip(b.parameters()) {
        assert_eq!(pa.id(), pb.id());
        assert!(
            (pa.normalized() - pb.normalized()).abs() < 1e-9,
            "parameter {} differs: {} vs {}",
            pa.id(),
            pa.normalized(),
            pb.normalized()
        );
    }
    assert_eq!(a.toggleable_order(), b.toggleable_order());
    assert_eq!(a.perspective_code(), b.perspective_code());
    assert_eq!(a.font(), b.font());
    assert_eq!(a.num_files(), b.num_files());
    for i in 0..a.num_files() {
        assert_eq!(a.file_name(i), b.file_name(i));
        assert_eq!(a.file_block(i), b.file_block(i));
    }
    assert_eq!(a.current_file_index(), b.current_file_index());
}

#[test]
fn test_binary_round_trip_through_file() {
    let original = configured();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.osci");
    std::fs::write(&path, original.get_state_information().unwrap()).unwrap();

    let restored = Pipeline::default();
    restored.load_project(&std::fs::read(&path).unwrap()).unwrap();

    assert_same_configuration(&original, &restored);
    assert_eq!(restored.toggleable_order()[0], "translate");
    assert_eq!(restored.current_file_name(), "triangle.obj");
}

#[test]
fn test_text_encoding_loads_the_same() {
    let original = configured();
    let root = decode(&original.get_state_information().unwrap()).unwrap();
    let text = to_xml_string(&root).unwrap();
    assert!(text.contains("<project"), "text form is plain XML");

    let restored = Pipeline::default();
    restored.load_project(text.as_bytes()).unwrap();
    assert_same_configuration(&original, &restored);
}

#[test]
fn test_restored_pipeline_renders_identically() {
    let original = configured();
    let restored = Pipeline::default();
    restored.load_project(&original.get_state_information().unwrap()).unwrap();

    let mut a = vec![0.0f32; 512];
    let mut b = vec![0.0f32; 512];
    original.process_block(&mut a, 2);
    restored.process_block(&mut b, 2);
    for (x, y) in a.iter().zip(&b) {
        assert!((x - y).abs() < 1e-6, "restored output should match");
    }
}

#[test]
fn test_truncated_project_leaves_state_untouched() {
    let original = configured();
    let mut data = original.get_state_information().unwrap();
    data.truncate(data.len() / 2);

    let pipeline = Pipeline::default();
    pipeline.add_file("keep.txt", b"keep".to_vec());
    assert!(matches!(
        pipeline.load_project(&data),
        Err(ProjectError::Truncated { .. })
    ));
    pipeline.set_state_information(&data);
    pipeline.set_state_information(b"not a project at all");

    assert_eq!(pipeline.num_files(), 1);
    assert_eq!(pipeline.current_file_name(), "keep.txt");
}

#[test]
fn test_partial_document_replaces_files_only() {
    let pipeline = Pipeline::default();
    pipeline.set_effect_value("bulge", 0.5).unwrap();
    pipeline.add_file("a.txt", b"a".to_vec());

    pipeline.load_project(b"<project version=\"2.0.0\"/>").unwrap();

    assert_eq!(pipeline.num_files(), 0, "loading always closes open files");
    assert_eq!(pipeline.current_file_index(), None);
    let bulge = pipeline.parameter("bulge").unwrap();
    assert!((bulge.normalized() - 0.5).abs() < 1e-9, "missing sections leave values alone");
}

#[test]
fn test_unknown_ids_are_skipped() {
    let document = br#"<project version="2.0.0" currentFile="-1">
  <effects>
    <effect id="fromTheFuture" enabled="1" precedence="0"/>
    <effect id="bulge" enabled="1" precedence="3">
      <parameter id="bulge" value="0.25"/>
      <parameter id="bulgeWarp" value="0.9"/>
    </effect>
  </effects>
  <booleanParameters>
    <parameter id="someNewFlag" value="1"/>
    <parameter id="midiEnabled" value="true"/>
  </booleanParameters>
</project>"#;

    let pipeline = Pipeline::default();
    pipeline.load_project(document).unwrap();

    let bulge = pipeline.parameter("bulge").unwrap();
    assert!((bulge.normalized() - 0.25).abs() < 1e-9);
    assert!(pipeline.get_boolean_parameter("midiEnabled").unwrap().get());
}

#[test]
fn test_wrong_root_is_rejected() {
    let pipeline = Pipeline::default();
    assert!(matches!(
        pipeline.load_project(b"<preset/>"),
        Err(ProjectError::NotAProject(_))
    ));
}
