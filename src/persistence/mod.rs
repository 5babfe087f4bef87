//! Saving and restoring projects
//!
//! Layout mirrors the on-disk format: an element tree, its two encodings,
//! the current-format writer and reader, and migration of v1 projects.

pub mod codec;
pub mod document;
pub mod legacy;
pub mod load;
pub mod save;

pub use self::codec::{decode, encode_binary, to_xml_string};
pub use self::document::Element;
pub use self::load::ProjectState;
pub use self::save::{project_document, PROJECT_VERSION};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::ProjectError;

pub(crate) fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode base64 text, ignoring any whitespace the writer wrapped it with
pub(crate) fn decode_base64(section: &'static str, text: &str) -> Result<Vec<u8>, ProjectError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|source| ProjectError::Base64 { section, source })
}
