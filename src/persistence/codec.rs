//! Text and binary encodings of a project document
//!
//! The binary form is the XML text prefixed by a little-endian magic number
//! and byte length, followed by a NUL terminator. Both forms decode to the
//! same [`Element`] tree.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::ProjectError;
use crate::persistence::document::Element;

/// Marks the binary encoding
pub const MAGIC_XML_NUMBER: u32 = 0x2132_4356;

const HEADER_LEN: usize = 8;

fn encode_err(e: impl std::fmt::Display) -> ProjectError {
    ProjectError::Encode(e.to_string())
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), ProjectError> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children().is_empty() && element.text().is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(encode_err);
    }

    writer.write_event(Event::Start(start)).map_err(encode_err)?;
    if !element.text().is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(element.text())))
            .map_err(encode_err)?;
    }
    for child in element.children() {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name())))
        .map_err(encode_err)
}

/// Serialise `root` as an XML document
pub fn to_xml_string(root: &Element) -> Result<String, ProjectError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(encode_err)?;
    write_element(&mut writer, root)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn element_from_start(start: &BytesStart) -> Result<Element, ProjectError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ProjectError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| ProjectError::Malformed(e.to_string()))?;
        element.set_attribute(&key, value);
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => {
            parent.add_child(element);
        }
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Parse XML text into an element tree, returning the root element
pub fn parse_xml(text: &str) -> Result<Element, ProjectError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(element_from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ProjectError::Malformed("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(text)) => {
                if let Some(top) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| ProjectError::Malformed(e.to_string()))?;
                    top.add_text(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(top) = stack.last_mut() {
                    top.add_text(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ProjectError::Malformed(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if !stack.is_empty() {
        return Err(ProjectError::Malformed("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| ProjectError::Malformed("no root element".to_string()))
}

/// Binary encoding: magic, text length, XML text, NUL
pub fn encode_binary(root: &Element) -> Result<Vec<u8>, ProjectError> {
    let text = to_xml_string(root)?;
    let length = u32::try_from(text.len()).map_err(encode_err)?;
    let mut data = Vec::with_capacity(HEADER_LEN + text.len() + 1);
    data.extend_from_slice(&MAGIC_XML_NUMBER.to_le_bytes());
    data.extend_from_slice(&length.to_le_bytes());
    data.extend_from_slice(text.as_bytes());
    data.push(0);
    Ok(data)
}

fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Whether `data` carries the binary encoding
pub fn is_binary(data: &[u8]) -> bool {
    data.len() > HEADER_LEN && read_u32_le(data, 0) == Some(MAGIC_XML_NUMBER)
}

/// Decode either encoding
pub fn decode(data: &[u8]) -> Result<Element, ProjectError> {
    if !is_binary(data) {
        return parse_xml(&String::from_utf8(data.to_vec())?);
    }

    let declared = read_u32_le(data, 4).unwrap_or(0) as usize;
    let body = &data[HEADER_LEN..];
    if declared > body.len() {
        return Err(ProjectError::Truncated {
            declared,
            found: body.len(),
        });
    }
    parse_xml(&String::from_utf8(body[..declared].to_vec())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        let mut root = Element::new("project");
        root.set_attribute("version", "2.0.0");
        root.set_attribute("currentFile", 0);
        let effects = root.create_child("effects");
        let effect = effects.create_child("effect");
        effect.set_attribute("id", "translate");
        effect.set_bool_attribute("enabled", true);
        root.create_child("perspectiveFunction").add_text("cmV0dXJuIHsgeCwgeSwgeiB9");
        root.create_child("font").set_attribute("family", "Fira <Mono> & \"Co\"");
        root
    }

    #[test]
    fn test_both_encodings_decode_to_same_tree() {
        let root = sample();
        let text = to_xml_string(&root).unwrap();
        let binary = encode_binary(&root).unwrap();
        assert!(is_binary(&binary));
        assert!(!is_binary(text.as_bytes()));
        assert_eq!(decode(text.as_bytes()).unwrap(), root);
        assert_eq!(decode(&binary).unwrap(), root);
    }

    #[test]
    fn test_binary_layout() {
        let binary = encode_binary(&sample()).unwrap();
        assert_eq!(&binary[..4], &[0x56, 0x43, 0x32, 0x21]);
        let declared = u32::from_le_bytes(binary[4..8].try_into().unwrap()) as usize;
        assert_eq!(declared + 9, binary.len());
        assert_eq!(binary.last(), Some(&0));
    }

    #[test]
    fn test_truncated_binary_is_rejected() {
        let mut binary = encode_binary(&sample()).unwrap();
        binary.truncate(40);
        assert!(matches!(decode(&binary), Err(ProjectError::Truncated { .. })));
    }

    #[test]
    fn test_malformed_text_is_an_error() {
        assert!(decode(b"<project><effects></project>").is_err());
        assert!(decode(b"<project>").is_err());
        assert!(decode(b"").is_err());
        assert!(decode(&[0xff, 0xfe, 0x00]).is_err());
    }
}
