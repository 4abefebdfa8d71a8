//! # Widen Directive
//!
//! Model and text format for access widener directives.
//!
//! ## Format
//!
//! ```text
//! accessWidener v2 intermediary
//! accessible            class   net/minecraft/class_1234
//! transitive-extendable method  net/minecraft/class_1234 method_5 (I)V
//! transitive-mutable    field   net/minecraft/class_1234 field_6 I
//! ```
//!
//! ## Streaming
//!
//! ```text
//! bytes ──> DirectiveReader ──> [TransitiveOnly] ──> [remapper] ──> DirectiveSet
//!                                 (decorators)                      (accumulator)
//! ```
//!
//! Every stage is a [`DirectiveVisitor`]; decorators own the next stage and forward the events
//! they accept.
//!
//! ## Example
//!
//! ```rust
//! use widen_directive::{DirectiveReader, DirectiveSet, TransitiveOnly};
//!
//! let content = b"accessWidener v2 named\n\
//!     accessible class com/example/Private\n\
//!     transitive-accessible class com/example/Shared\n";
//!
//! let mut reader = DirectiveReader::new(TransitiveOnly::new(DirectiveSet::new()));
//! reader.read(content).unwrap();
//! let set = reader.into_inner().into_inner();
//! assert_eq!(set.len(), 1);
//! ```

mod error;
mod filter;
mod model;
mod reader;
mod set;
mod visitor;
mod writer;

pub use error::{DirectiveError, Result};
pub use filter::TransitiveOnly;
pub use model::{
    Access, AccessSet, Directive, DirectiveFile, MemberRef, Namespace, Target, TargetKind,
};
pub use reader::{read_header, read_version, DirectiveReader, Header, MAX_VERSION, MIN_VERSION};
pub use set::{DirectiveSet, Grant};
pub use visitor::{DirectiveVisitor, Recorder, TransitiveDetector};
pub use writer::DirectiveWriter;

/// Whether `content` declares at least one transitive directive.
///
/// Files older than v2 cannot express transitivity and are rejected from the header alone.
pub fn contains_transitive(content: &[u8]) -> Result<bool> {
    if read_version(content)? < 2 {
        return Ok(false);
    }

    let mut reader = DirectiveReader::new(TransitiveDetector::default());
    reader.read(content)?;
    Ok(reader.into_inner().found())
}

#[cfg(test)]
mod tests {
    use super::contains_transitive;

    #[test]
    fn v1_files_never_report_transitive() {
        // A transitive token in a v1 body is malformed, but the header short-circuits first.
        let content = b"accessWidener v1 named\ntransitive-accessible method X y ()I\n";
        assert_eq!(contains_transitive(content), Ok(false));
    }

    #[test]
    fn detects_transitive_entries() {
        assert_eq!(
            contains_transitive(b"accessWidener v2 named\naccessible class a/B\n"),
            Ok(false)
        );
        assert_eq!(
            contains_transitive(
                b"accessWidener v2 named\naccessible class a/B\ntransitive-accessible class a/C\n"
            ),
            Ok(true)
        );
    }

    #[test]
    fn malformed_body_is_an_error_for_v2() {
        assert!(contains_transitive(b"accessWidener v2 named\nbogus class a/B\n").is_err());
    }
}
