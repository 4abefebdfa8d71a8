//! # Widen Classfile
//!
//! Just enough of the JVM class-file format to find every `access_flags` word (class,
//! fields, methods, `InnerClasses` entries) and rewrite it in place. Everything else in the
//! file is skipped byte-for-byte, so a patched class differs from the original only in the
//! flag words that were changed.

pub mod access;
mod error;
mod layout;
mod reader;
#[cfg(any(test, feature = "test-support"))]
pub mod synth;

pub use error::{ClassFileError, Result};
pub use layout::{write_flags, ClassLayout, FlagSite, InnerClassLayout, MemberLayout};

/// Jar entry suffix of compiled classes
pub const CLASS_SUFFIX: &str = ".class";

const VERSIONED_PREFIX: &str = "META-INF/versions/";

/// Internal class name for a jar entry path, if the entry is a class file.
/// Multi-release entries map to the class they shadow.
#[must_use]
pub fn class_name_for_entry(entry: &str) -> Option<&str> {
    let entry = match entry.strip_prefix(VERSIONED_PREFIX) {
        Some(rest) => rest.split_once('/').map_or(rest, |(_, path)| path),
        None => entry,
    };
    entry
        .strip_suffix(CLASS_SUFFIX)
        .filter(|name| !name.is_empty() && !name.ends_with("module-info"))
}
