//! Migration of v1 projects
//!
//! v1 projects store slider values as elements named after the slider,
//! effect toggles as elements named after the effect, a separate
//! translation section and files as `name`/`data` child pairs. Migration
//! rewrites such a document into the current layout so it can go through
//! the normal loader. Anything without a current counterpart is dropped.

use crate::error::ProjectError;
use crate::persistence::document::{parse_bool, Element};

/// Highest frequency of the v1 logarithmic frequency slider
const LEGACY_MAX_FREQUENCY: f64 = 12000.0;

/// How a v1 slider value becomes a current parameter value
#[derive(Clone, Copy)]
enum Conversion {
    Same,
    /// Slider position `p` meant `max^p` Hz
    Exponential(f64),
}

impl Conversion {
    fn convert(self, value: f64) -> f64 {
        match self {
            Conversion::Same => value,
            Conversion::Exponential(max) => max.powf(value),
        }
    }
}

/// (v1 slider label, effect id, parameter id, conversion)
const SLIDERS: &[(&str, &str, &str, Conversion)] = &[
    ("vectorCancelling", "vectorCancelling", "vectorCancelling", Conversion::Same),
    ("bitCrush", "bitCrush", "bitCrush", Conversion::Same),
    ("verticalDistort", "distortY", "distortY", Conversion::Same),
    ("horizontalDistort", "distortX", "distortX", Conversion::Same),
    ("wobble", "wobble", "wobble", Conversion::Same),
    ("smoothing", "smoothing", "smoothing", Conversion::Same),
    ("traceMin", "traceMin", "traceMin", Conversion::Same),
    ("traceMax", "traceMax", "traceMax", Conversion::Same),
    ("delayDecay", "delay", "delayDecay", Conversion::Same),
    ("delayEchoLength", "delay", "delayLength", Conversion::Same),
    ("bulge", "bulge", "bulge", Conversion::Same),
    ("rotateSpeed", "2DRotate", "2DRotateSpeed", Conversion::Same),
    ("volume", "volume", "volume", Conversion::Same),
    ("frequency", "frequency", "frequency", Conversion::Exponential(LEGACY_MAX_FREQUENCY)),
    ("objectRotateSpeed", "objRotateSpeed", "objRotateSpeed", Conversion::Same),
    ("focalLength", "objFocalLength", "objFocalLength", Conversion::Same),
];

/// (v1 effect label, effect id)
const EFFECTS: &[(&str, &str)] = &[
    ("vectorCancelling", "vectorCancelling"),
    ("bitCrush", "bitCrush"),
    ("verticalDistort", "distortY"),
    ("horizontalDistort", "distortX"),
    ("wobble", "wobble"),
    ("smoothing", "smoothing"),
    ("traceMin", "traceMin"),
    ("traceMax", "traceMax"),
    ("delayEcho", "delay"),
    ("bulge", "bulge"),
    ("rotate", "2DRotate"),
];

/// Whether `root` is a v1 project: a `<version>` child, or a `version`
/// attribute, starting with `v1.`
pub fn is_legacy(root: &Element) -> bool {
    if !root.has_tag_name("project") {
        return false;
    }
    let child = root
        .child("version")
        .map(|v| v.all_sub_text().trim().starts_with("v1."))
        .unwrap_or(false);
    let attribute = root
        .attribute("version")
        .map(|v| v.trim().starts_with("v1."))
        .unwrap_or(false);
    child || attribute
}

/// Find or create the `<effect id=...>` element for `id`
fn effect_element<'a>(effects: &'a mut Element, id: &str) -> &'a mut Element {
    let existing = effects
        .children()
        .iter()
        .position(|e| e.attribute("id") == Some(id));
    match existing {
        Some(index) => effects.child_at_mut(index),
        None => {
            let effect = effects.create_child("effect");
            effect.set_attribute("id", id);
            effect
        }
    }
}

fn legacy_number(element: &Element) -> Option<f64> {
    element.all_sub_text().trim().parse().ok()
}

/// Enabled flag of a v1 effect element: its own text, or a `selected` child
fn legacy_enabled(element: &Element) -> Option<bool> {
    parse_bool(element.text()).or_else(|| element.child("selected").and_then(|s| parse_bool(&s.all_sub_text())))
}

/// Rewrite a v1 project into the current document layout
pub fn migrate(root: &Element) -> Result<Element, ProjectError> {
    if !root.has_tag_name("project") {
        return Err(ProjectError::NotAProject(root.name().to_string()));
    }

    let mut project = Element::new("project");
    let mut effects = Element::new("effects");

    if let Some(sliders) = root.child("sliders") {
        for &(label, effect_id, parameter_id, conversion) in SLIDERS {
            let Some(value) = sliders.child(label).and_then(legacy_number) else {
                continue;
            };
            let parameter = effect_element(&mut effects, effect_id).create_child("parameter");
            parameter.set_attribute("id", parameter_id);
            parameter.set_attribute("value", conversion.convert(value));
        }
    }

    if let Some(legacy_effects) = root.child("effects") {
        for &(label, effect_id) in EFFECTS {
            if let Some(enabled) = legacy_effects.child(label).and_then(legacy_enabled) {
                effect_element(&mut effects, effect_id).set_bool_attribute("enabled", enabled);
            }
        }
    }

    if let Some(translation) = root.child("translation") {
        let x = translation.child("x").and_then(legacy_number).unwrap_or(0.0);
        let y = translation.child("y").and_then(legacy_number).unwrap_or(0.0);
        let translate = effect_element(&mut effects, "translate");
        translate.set_bool_attribute("enabled", x != 0.0 || y != 0.0);
        for (id, value) in [("translateX", x), ("translateY", y)] {
            let parameter = translate.create_child("parameter");
            parameter.set_attribute("id", id);
            parameter.set_attribute("value", value);
        }
    }

    project.add_child(effects);

    let mut files = Element::new("files");
    if let Some(legacy_files) = root.child("files") {
        for file in legacy_files.children_named("file") {
            let name = file.child("name").map(Element::all_sub_text).unwrap_or_default();
            let data = file.child("data").map(Element::all_sub_text).unwrap_or_default();
            let file_xml = files.create_child("file");
            file_xml.set_attribute("name", name.trim());
            file_xml.add_text(data.trim());
        }
    }
    let current = if files.children().is_empty() { -1 } else { 0 };
    project.add_child(files);
    project.set_attribute("currentFile", current);

    log::info!("migrated v1 project");
    Ok(project)
}
