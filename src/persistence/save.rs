use std::sync::Arc;

use crate::effects::PERSPECTIVE_ID;
use crate::envelope::EnvelopeParameters;
use crate::parameter::BooleanParameter;
use crate::persistence::document::Element;
use crate::persistence::encode_base64;
use crate::pipeline::EffectSet;
use crate::source::{FontDescriptor, SourceSet};

/// Written to the `version` attribute of every saved project
pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the project document. Callers hold the source and effect locks.
pub fn project_document(
    effects: &EffectSet,
    boolean_parameters: &[Arc<BooleanParameter>],
    envelope: &EnvelopeParameters,
    font: &FontDescriptor,
    sources: &SourceSet,
) -> Element {
    let mut root = Element::new("project");
    root.set_attribute("version", PROJECT_VERSION);

    let effects_xml = root.create_child("effects");
    for effect in effects.all() {
        effect.save(effects_xml.create_child("effect"));
    }

    let booleans_xml = root.create_child("booleanParameters");
    for parameter in boolean_parameters {
        let parameter_xml = booleans_xml.create_child("parameter");
        parameter_xml.set_attribute("id", parameter.id());
        parameter_xml.set_bool_attribute("value", parameter.get());
    }

    let envelope_xml = root.create_child("envelope");
    for parameter in envelope.parameters() {
        let parameter_xml = envelope_xml.create_child("parameter");
        parameter_xml.set_attribute("id", parameter.id());
        parameter_xml.set_attribute("value", parameter.value());
    }

    let code = effects
        .get_effect(PERSPECTIVE_ID)
        .and_then(|effect| effect.script())
        .map(|script| script.code())
        .unwrap_or_default();
    root.create_child("perspectiveFunction")
        .add_text(&encode_base64(code.as_bytes()));

    let font_xml = root.create_child("font");
    font_xml.set_attribute("family", &font.family);
    font_xml.set_bool_attribute("bold", font.bold);
    font_xml.set_bool_attribute("italic", font.italic);

    let files_xml = root.create_child("files");
    for index in 0..sources.num_files() {
        let file_xml = files_xml.create_child("file");
        file_xml.set_attribute("name", sources.file_name(index).unwrap_or_default());
        if let Some(block) = sources.file_block(index) {
            file_xml.add_text(&encode_base64(&block));
        }
    }

    let current = sources.current_file_index().map(|i| i as i64).unwrap_or(-1);
    root.set_attribute("currentFile", current);
    root
}
