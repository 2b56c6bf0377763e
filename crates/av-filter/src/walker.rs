//! Tree walker
//!
//! Depth-first, pre-order walk that toggles every leaf in place: vaulted
//! values are decrypted, plain strings are encrypted, containers are
//! descended into. One vault invocation per leaf, strictly in document order.

use serde_yaml::Value;
use tracing::{debug, debug_span, trace};

use crate::classify::{classify, Classified, Container};
use crate::document::{Document, Mapping, Node};
use crate::error::FilterError;
use crate::gateway::{Gateway, VaultBackend};

/// Walks a document, transforming leaves through a gateway
pub struct Walker<'g, B> {
    gateway: &'g Gateway<B>,
}

impl<'g, B: VaultBackend> Walker<'g, B> {
    pub fn new(gateway: &'g Gateway<B>) -> Self {
        Self { gateway }
    }

    /// Transform every leaf of the document
    pub fn walk(&self, document: &mut Document) -> Result<(), FilterError> {
        self.visit(&mut document.root, "", 0)
    }

    fn walk_mapping(
        &self,
        entries: &mut Mapping,
        path: &str,
        depth: usize,
    ) -> Result<(), FilterError> {
        let _span = debug_span!("mapping", depth, path).entered();
        for (key, value) in entries.iter_mut() {
            let child = join_key(path, key);
            self.visit(value, &child, depth + 1)?;
        }
        Ok(())
    }

    fn walk_sequence(
        &self,
        items: &mut [Node],
        path: &str,
        depth: usize,
    ) -> Result<(), FilterError> {
        let _span = debug_span!("sequence", depth, path).entered();
        for (index, item) in items.iter_mut().enumerate() {
            let child = format!("{}[{}]", path, index);
            self.visit(item, &child, depth + 1)?;
        }
        Ok(())
    }

    fn visit(&self, node: &mut Node, path: &str, depth: usize) -> Result<(), FilterError> {
        let classified = classify(node);
        trace!(depth, path, class = ?classified.class(), "Visiting node");
        let replacement = match classified {
            Classified::Vaulted(vaulted) => {
                debug!(depth, path, "Decrypting vaulted value");
                Node::Plain(self.gateway.decrypt(vaulted)?)
            }
            Classified::Plain(plain) => {
                debug!(depth, path, "Encrypting plain value");
                Node::Vaulted(self.gateway.encrypt(plain, None)?)
            }
            Classified::Container(Container::Mapping(entries)) => {
                return self.walk_mapping(entries, path, depth);
            }
            Classified::Container(Container::Sequence(items)) => {
                return self.walk_sequence(items, path, depth);
            }
            Classified::Unsupported(node) => {
                return Err(FilterError::UnsupportedLeafType {
                    path: display_path(path),
                    value: node.describe(),
                });
            }
        };
        *node = replacement;
        Ok(())
    }
}

fn join_key(path: &str, key: &Value) -> String {
    let key = match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => "null".to_string(),
    };
    if path.is_empty() {
        key
    } else {
        format!("{}.{}", path, key)
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "the document root".to_string()
    } else {
        format!("'{}'", path)
    }
}
