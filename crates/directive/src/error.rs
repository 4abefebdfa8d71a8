use crate::model::{Namespace, TargetKind};
use thiserror::Error;

/// Result type for directive operations
pub type Result<T> = std::result::Result<T, DirectiveError>;

/// Errors raised while reading, writing or streaming directives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// The directive file is structurally invalid (bad header, version or token)
    #[error("Malformed directive file (line {line}): {message}")]
    Malformed { line: usize, message: String },

    /// The header namespace is not the one the consumer expects
    #[error("Namespace mismatch: expected {expected}, found {found}")]
    NamespaceMismatch {
        expected: Namespace,
        found: Namespace,
    },

    /// A remapping lookup missed
    #[error(
        "Unresolved {kind} symbol {owner}{} from {origin}",
        member_suffix(.name, .descriptor)
    )]
    UnresolvedSymbol {
        origin: String,
        kind: TargetKind,
        owner: String,
        name: Option<String>,
        descriptor: Option<String>,
    },

    /// The writer was asked to emit something its format version cannot express
    #[error("Cannot write directive: {0}")]
    Unwritable(String),
}

impl DirectiveError {
    /// Create a malformed-file error for a 1-based line number
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }

    /// Create an unwritable error
    pub fn unwritable(message: impl Into<String>) -> Self {
        Self::Unwritable(message.into())
    }
}

fn member_suffix(name: &Option<String>, descriptor: &Option<String>) -> String {
    match (name, descriptor) {
        (Some(name), Some(descriptor)) => format!(".{name}{descriptor}"),
        (Some(name), None) => format!(".{name}"),
        _ => String::new(),
    }
}
