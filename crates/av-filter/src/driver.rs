//! Driver: parse, walk, emit, re-indent

use tracing::info;

use crate::document::Document;
use crate::error::FilterError;
use crate::format::{apply_indent, capture_indent, Emitter, EmitterConfig};
use crate::gateway::{Gateway, VaultBackend};
use crate::walker::Walker;

/// Toggle every value of a raw YAML document
///
/// Nothing is returned unless the whole document transformed cleanly.
pub fn run<B: VaultBackend>(input: &str, gateway: &Gateway<B>) -> Result<String, FilterError> {
    let indent = capture_indent(input);
    let mut document = Document::parse(input)?;
    info!(indent, root = document.root.kind(), "Parsed document");

    Walker::new(gateway).walk(&mut document)?;

    let body = Emitter::new(EmitterConfig::default()).emit(&document)?;
    Ok(apply_indent(&body, indent))
}
