use crate::error::Result;
use std::path::PathBuf;
use widen_directive::Namespace;

/// Target-namespace name and descriptor of a resolved member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMember {
    pub name: String,
    pub descriptor: String,
}

impl ResolvedMember {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// Symbol lookups from one namespace into another.
///
/// `None` means the symbol is unknown to the source environment.
pub trait SymbolResolver {
    fn resolve_class(&self, owner: &str) -> Option<String>;

    fn resolve_method(&self, owner: &str, name: &str, descriptor: &str)
        -> Option<ResolvedMember>;

    fn resolve_field(&self, owner: &str, name: &str, descriptor: &str) -> Option<ResolvedMember>;

    /// Release any state built for the lookups
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Builds resolvers from a source namespace's classpath
pub trait RemappingEngine {
    fn build(
        &self,
        source: Namespace,
        target: Namespace,
        classpath: &[PathBuf],
    ) -> Result<Box<dyn SymbolResolver>>;
}
