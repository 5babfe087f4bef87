//! Geometry sources: what the pipeline draws before any effect runs
//!
//! File parsing proper lives behind [`SourceParser`]. The pipeline keeps the
//! raw bytes and display name of every loaded file so projects can be saved
//! and files reparsed, plus the index of the file currently being drawn.

pub mod frame;
pub mod obj;

pub use self::frame::*;
pub use self::obj::*;

use std::sync::Arc;

use crate::effects::RenderControls;
use crate::vector::Vector2;

/// Produces the next point of the selected drawing, once per sample
pub trait GeometrySource: Send {
    fn next_vector(&mut self, controls: &RenderControls) -> Vector2;

    fn set_sample_rate(&mut self, sample_rate: f64);

    /// Restart drawing from the beginning of the frame
    fn reset(&mut self) {}
}

/// Font used by parsers that render text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontDescriptor {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "SansSerif".to_string(),
            bold: false,
            italic: false,
        }
    }
}

/// Turns file contents into a drawable source. Must not fail: input it
/// cannot understand yields some fallback drawing.
pub trait SourceParser: Send + Sync {
    fn parse(&self, extension: &str, data: &[u8], font: &FontDescriptor) -> Box<dyn GeometrySource>;
}

/// Built-in parser: Wavefront `.obj` wireframes, anything else draws the
/// default square
#[derive(Debug, Default)]
pub struct ShapeParser;

impl SourceParser for ShapeParser {
    fn parse(&self, extension: &str, data: &[u8], _font: &FontDescriptor) -> Box<dyn GeometrySource> {
        if extension.eq_ignore_ascii_case(".obj") {
            match std::str::from_utf8(data).ok().and_then(ObjSource::parse) {
                Some(source) => return Box::new(source),
                None => log::warn!("could not read .obj data, drawing the default shape"),
            }
        } else {
            log::warn!("no parser for '{}' files, drawing the default shape", extension);
        }
        Box::new(default_shape())
    }
}

/// Extension including the dot (`"model.obj"` gives `".obj"`), or `""`
pub fn extension_of(name: &str) -> &str {
    name.rfind('.').map(|i| &name[i..]).unwrap_or("")
}

struct LoadedFile {
    name: String,
    block: Arc<Vec<u8>>,
    source: Box<dyn GeometrySource>,
}

/// Loaded files and the current selection. Guarded by the pipeline's
/// source lock, which is always taken before the effect lock.
pub struct SourceSet {
    files: Vec<LoadedFile>,
    default_source: Box<dyn GeometrySource>,
    current: Option<usize>,
    parser: Arc<dyn SourceParser>,
    sample_rate: f64,
}

impl SourceSet {
    pub fn new(parser: Arc<dyn SourceParser>) -> Self {
        Self {
            files: Vec::new(),
            default_source: Box::new(default_shape()),
            current: None,
            parser,
            sample_rate: 44100.0,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.default_source.set_sample_rate(sample_rate);
        for file in &mut self.files {
            file.source.set_sample_rate(sample_rate);
        }
    }

    /// Add a file and make it current
    pub fn add_file(&mut self, name: &str, data: Arc<Vec<u8>>, font: &FontDescriptor) {
        let source = self.parse(name, &data, font);
        self.files.push(LoadedFile {
            name: name.to_string(),
            block: data,
            source,
        });
        self.current = Some(self.files.len() - 1);
    }

    /// Remove a file; the selection moves to the file now at that index, or
    /// the last file, or the default shape when none are left
    pub fn remove_file(&mut self, index: usize) {
        if index >= self.files.len() {
            return;
        }
        self.files.remove(index);
        let next = if self.files.is_empty() {
            None
        } else {
            Some(index.min(self.files.len() - 1))
        };
        self.change_current_file(next);
    }

    /// Close every file and fall back to the default shape
    pub fn clear(&mut self) {
        self.files.clear();
        self.current = None;
    }

    /// Replace a file's contents and reparse it
    pub fn update_file_block(&mut self, index: usize, data: Arc<Vec<u8>>, font: &FontDescriptor) {
        if let Some(file) = self.files.get_mut(index) {
            file.block = data;
            self.open_file(index, font);
        }
    }

    /// Reparse a file and make it current
    pub fn open_file(&mut self, index: usize, font: &FontDescriptor) {
        let Some(file) = self.files.get(index) else {
            return;
        };
        let source = self.parse(&file.name, &file.block, font);
        self.files[index].source = source;
        self.current = Some(index);
    }

    /// Switch to an already parsed file, or to the default shape with `None`.
    /// Returns false for an out-of-range index, leaving the selection alone.
    pub fn change_current_file(&mut self, index: Option<usize>) -> bool {
        match index {
            None => {
                self.current = None;
                true
            }
            Some(i) if i < self.files.len() => {
                self.current = Some(i);
                true
            }
            Some(_) => false,
        }
    }

    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    pub fn current_file_index(&self) -> Option<usize> {
        self.current
    }

    /// Name of the current file, empty when drawing the default shape
    pub fn current_file_name(&self) -> &str {
        self.current
            .and_then(|i| self.files.get(i))
            .map(|f| f.name.as_str())
            .unwrap_or("")
    }

    pub fn file_name(&self, index: usize) -> Option<&str> {
        self.files.get(index).map(|f| f.name.as_str())
    }

    pub fn file_block(&self, index: usize) -> Option<Arc<Vec<u8>>> {
        self.files.get(index).map(|f| f.block.clone())
    }

    /// Next point of the current drawing
    pub fn next_vector(&mut self, controls: &RenderControls) -> Vector2 {
        match self.current.and_then(|i| self.files.get_mut(i)) {
            Some(file) => file.source.next_vector(controls),
            None => self.default_source.next_vector(controls),
        }
    }

    fn parse(&self, name: &str, data: &[u8], font: &FontDescriptor) -> Box<dyn GeometrySource> {
        let mut source = self.parser.parse(extension_of(name), data, font);
        source.set_sample_rate(self.sample_rate);
        source
    }
}
