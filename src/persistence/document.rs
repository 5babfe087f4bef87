//! In-memory element tree for project documents
//!
//! Both on-disk encodings (plain XML text and the magic-prefixed binary
//! packing) decode to this tree, so everything above the codec works on a
//! single logical document.

/// One element: tag name, ordered attributes, child elements and text
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_tag_name(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Set an attribute, replacing any previous value with the same key
    pub fn set_attribute(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        if let Some(existing) = self.attributes.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value;
        } else {
            self.attributes.push((key.to_string(), value));
        }
    }

    pub fn set_bool_attribute(&mut self, key: &str, value: bool) {
        self.set_attribute(key, if value { "1" } else { "0" });
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    pub fn string_attribute(&self, key: &str) -> String {
        self.attribute(key).unwrap_or_default().to_string()
    }

    pub fn int_attribute(&self, key: &str, default: i64) -> i64 {
        self.attribute(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn double_attribute(&self, key: &str) -> Option<f64> {
        self.attribute(key).and_then(|v| v.trim().parse().ok())
    }

    /// Accepts `1`/`0` and `true`/`false`
    pub fn bool_attribute(&self, key: &str) -> Option<bool> {
        self.attribute(key).and_then(parse_bool)
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn add_child(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn create_child(&mut self, name: &str) -> &mut Element {
        self.add_child(Element::new(name))
    }

    /// Panics if `index` is out of bounds, like slice indexing
    pub fn child_at_mut(&mut self, index: usize) -> &mut Element {
        &mut self.children[index]
    }

    /// First direct child with the given tag
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text directly inside this element
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn add_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// All text in this element and its descendants, in document order
    pub fn all_sub_text(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.all_sub_text());
        }
        out
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "True" | "TRUE" => Some(true),
        "0" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}
