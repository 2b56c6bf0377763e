//! Document model
//!
//! The parsed YAML tree is converted into a closed set of node kinds so the
//! walker can match on them exhaustively. A document owns its tree; containers
//! own their children and replace them in place during the walk.

use serde_yaml::value::TaggedValue;
use serde_yaml::{Number, Value};

use crate::error::FilterError;

/// Tag marking an encrypted scalar
pub const VAULT_TAG: &str = "!vault";

/// Trailing newline handling of a literal block scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chomping {
    /// `|` - exactly one trailing newline
    Clip,
    /// `|+` - all trailing newlines preserved
    Keep,
    /// `|-` - no trailing newline
    Strip,
}

impl Chomping {
    /// Pick the chomping indicator that reproduces `text` exactly
    pub fn for_text(text: &str) -> Self {
        if text.ends_with("\n\n") || (!text.is_empty() && text.bytes().all(|b| b == b'\n')) {
            Chomping::Keep
        } else if text.ends_with('\n') {
            Chomping::Clip
        } else {
            Chomping::Strip
        }
    }

    /// The block header indicator character, if any
    pub fn indicator(self) -> &'static str {
        match self {
            Chomping::Clip => "",
            Chomping::Keep => "+",
            Chomping::Strip => "-",
        }
    }
}

/// How a plain string is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    /// On the same line as its key or dash
    Inline,
    /// Literal block scalar
    Literal(Chomping),
}

/// An unencrypted string value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainScalar {
    pub text: String,
    pub style: ScalarStyle,
}

impl PlainScalar {
    /// A string rendered on one line
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ScalarStyle::Inline,
        }
    }

    /// A string rendered as a literal block, chomping chosen from its text
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        let chomping = Chomping::for_text(&text);
        Self {
            text,
            style: ScalarStyle::Literal(chomping),
        }
    }

    /// Style as parsed: multi-line strings become literal blocks
    fn from_parsed(text: String) -> Self {
        if text.contains('\n') {
            Self::literal(text)
        } else {
            Self::inline(text)
        }
    }
}

/// An encrypted value, always rendered as a `!vault` literal block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultedScalar {
    /// Raw ciphertext, one envelope line per text line
    pub ciphertext: String,
    pub chomping: Chomping,
}

impl VaultedScalar {
    pub fn new(ciphertext: impl Into<String>) -> Self {
        let ciphertext = ciphertext.into();
        let chomping = Chomping::for_text(&ciphertext);
        Self {
            ciphertext,
            chomping,
        }
    }

    pub fn tag(&self) -> &'static str {
        VAULT_TAG
    }
}

/// Ordered mapping entries; keys are always scalars
pub type Mapping = Vec<(Value, Node)>;

/// A node of the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Mapping(Mapping),
    Sequence(Vec<Node>),
    Plain(PlainScalar),
    Vaulted(VaultedScalar),
    Number(Number),
    Bool(bool),
    Null,
    /// A tagged value whose tag is not `!vault`, or `!vault` on a non-string
    Tagged(Box<TaggedValue>),
}

impl Node {
    /// Convert a parsed YAML value into a node tree
    pub fn from_value(value: Value) -> Result<Self, FilterError> {
        Ok(match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::Plain(PlainScalar::from_parsed(s)),
            Value::Sequence(items) => Node::Sequence(
                items
                    .into_iter()
                    .map(Node::from_value)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    entries.push((check_key(key)?, Node::from_value(value)?));
                }
                Node::Mapping(entries)
            }
            Value::Tagged(tagged) => {
                let tagged = *tagged;
                match tagged.value {
                    Value::String(s) if tagged.tag.to_string() == VAULT_TAG => {
                        Node::Vaulted(VaultedScalar::new(s))
                    }
                    value => Node::Tagged(Box::new(TaggedValue {
                        tag: tagged.tag,
                        value,
                    })),
                }
            }
        })
    }

    /// Short name of the node kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Plain(_) => "string",
            Node::Vaulted(_) => "vaulted string",
            Node::Number(_) => "number",
            Node::Bool(_) => "boolean",
            Node::Null => "null",
            Node::Tagged(_) => "tagged value",
        }
    }

    /// One-line description of a scalar for error messages
    ///
    /// Secrets are never echoed: string and vault values show only their kind.
    pub fn describe(&self) -> String {
        match self {
            Node::Number(n) => format!("number {}", n),
            Node::Bool(b) => format!("boolean {}", b),
            Node::Null => "null".to_string(),
            Node::Tagged(tagged) => format!("value tagged {}", tagged.tag),
            other => other.kind().to_string(),
        }
    }
}

fn check_key(key: Value) -> Result<Value, FilterError> {
    match key {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(key),
        Value::Sequence(_) => Err(FilterError::UnsupportedKey {
            kind: "sequence".to_string(),
        }),
        Value::Mapping(_) => Err(FilterError::UnsupportedKey {
            kind: "mapping".to_string(),
        }),
        Value::Tagged(tagged) => Err(FilterError::UnsupportedKey {
            kind: format!("value tagged {}", tagged.tag),
        }),
    }
}

/// A parsed YAML document whose root is a mapping or sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Node,
}

impl Document {
    /// Parse a single YAML document
    pub fn parse(input: &str) -> Result<Self, FilterError> {
        let value: Value = serde_yaml::from_str(input)?;
        let root = Node::from_value(value)?;
        match root {
            Node::Mapping(_) | Node::Sequence(_) => Ok(Self { root }),
            other => Err(FilterError::UnsupportedRootType {
                kind: other.kind().to_string(),
            }),
        }
    }
}
