//! Scalar classification
//!
//! Every node falls into exactly one class. The match is exhaustive over
//! [`Node`], so a new node kind has to be classified explicitly.

use crate::document::{Mapping, Node, PlainScalar, VaultedScalar};

/// Classification of a node, without borrowing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// Already encrypted, needs decryption
    Vaulted,
    /// Plain string, needs encryption
    Plain,
    /// Mapping or sequence, needs recursion
    Container,
    /// Anything else: fatal
    Unsupported,
}

/// A container borrowed for recursion
#[derive(Debug)]
pub enum Container<'a> {
    Mapping(&'a mut Mapping),
    Sequence(&'a mut Vec<Node>),
}

/// A classified node, borrowing the part each transform needs
#[derive(Debug)]
pub enum Classified<'a> {
    Vaulted(&'a VaultedScalar),
    Plain(&'a PlainScalar),
    Container(Container<'a>),
    Unsupported(&'a Node),
}

impl Classified<'_> {
    pub fn class(&self) -> Class {
        match self {
            Classified::Vaulted(_) => Class::Vaulted,
            Classified::Plain(_) => Class::Plain,
            Classified::Container(_) => Class::Container,
            Classified::Unsupported(_) => Class::Unsupported,
        }
    }
}

/// Classify a node
pub fn classify(node: &mut Node) -> Classified<'_> {
    match node {
        Node::Vaulted(vaulted) => Classified::Vaulted(vaulted),
        Node::Plain(plain) => Classified::Plain(plain),
        Node::Mapping(entries) => Classified::Container(Container::Mapping(entries)),
        Node::Sequence(items) => Classified::Container(Container::Sequence(items)),
        Node::Number(_) | Node::Bool(_) | Node::Null | Node::Tagged(_) => {
            Classified::Unsupported(node)
        }
    }
}
