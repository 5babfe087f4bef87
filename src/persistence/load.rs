use crate::error::ProjectError;
use crate::persistence::decode_base64;
use crate::persistence::document::{parse_bool, Element};
use crate::source::FontDescriptor;

/// Everything a current-format project document asks to restore.
///
/// Decoding is done up front so that a bad section fails the load before
/// any pipeline state is touched. Sections missing from the document stay
/// `None`/empty and leave the matching state alone, except the file list,
/// which is always replaced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectState {
    /// `<effect>` elements, applied by id
    pub effects: Vec<Element>,
    pub boolean_parameters: Vec<(String, bool)>,
    /// Envelope values by parameter id
    pub envelope: Vec<(String, f64)>,
    pub perspective_code: Option<String>,
    pub font: Option<FontDescriptor>,
    pub files: Vec<(String, Vec<u8>)>,
    /// `None` selects the default shape
    pub current_file: Option<usize>,
}

impl ProjectState {
    pub fn from_document(root: &Element) -> Result<Self, ProjectError> {
        if !root.has_tag_name("project") {
            return Err(ProjectError::NotAProject(root.name().to_string()));
        }

        let mut state = ProjectState::default();

        if let Some(effects) = root.child("effects") {
            state.effects = effects.children_named("effect").cloned().collect();
        }

        if let Some(booleans) = root.child("booleanParameters") {
            for parameter in booleans.children() {
                let value = parameter
                    .attribute("value")
                    .and_then(|v| parse_bool(v).or_else(|| v.trim().parse::<f64>().ok().map(|f| f >= 0.5)));
                if let Some(value) = value {
                    state
                        .boolean_parameters
                        .push((parameter.string_attribute("id"), value));
                }
            }
        }

        if let Some(envelope) = root.child("envelope") {
            for parameter in envelope.children_named("parameter") {
                if let Some(value) = parameter.double_attribute("value") {
                    state.envelope.push((parameter.string_attribute("id"), value));
                }
            }
        }

        if let Some(function) = root.child("perspectiveFunction") {
            let code = decode_base64("perspectiveFunction", &function.all_sub_text())?;
            state.perspective_code = Some(String::from_utf8(code)?);
        }

        if let Some(font) = root.child("font") {
            state.font = Some(FontDescriptor {
                family: font.string_attribute("family"),
                bold: font.bool_attribute("bold").unwrap_or(false),
                italic: font.bool_attribute("italic").unwrap_or(false),
            });
        }

        if let Some(files) = root.child("files") {
            for file in files.children_named("file") {
                let data = decode_base64("files", &file.all_sub_text())?;
                state.files.push((file.string_attribute("name"), data));
            }
        }

        let current = root.int_attribute("currentFile", -1);
        state.current_file = usize::try_from(current).ok();
        Ok(state)
    }
}
