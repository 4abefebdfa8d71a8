use crate::classpath::ClassPathIndex;
use crate::error::Result;
use crate::mappings::MappingTable;
use crate::resolver::{RemappingEngine, ResolvedMember, SymbolResolver};
use std::path::{Path, PathBuf};
use widen_directive::{Namespace, TargetKind};

/// Remapping engine backed by Tiny v2 mappings and a classpath index
#[derive(Debug, Clone)]
pub struct MappingsEngine {
    tiny: String,
}

impl MappingsEngine {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            tiny: std::fs::read_to_string(path)?,
        })
    }

    pub fn from_tiny(tiny: impl Into<String>) -> Self {
        Self { tiny: tiny.into() }
    }
}

impl RemappingEngine for MappingsEngine {
    fn build(
        &self,
        source: Namespace,
        target: Namespace,
        classpath: &[PathBuf],
    ) -> Result<Box<dyn SymbolResolver>> {
        let table = MappingTable::from_tiny_str(&self.tiny, source, target)?;
        let index = ClassPathIndex::from_jars(classpath)?;
        Ok(Box::new(ClassPathResolver::new(table, index)))
    }
}

/// Resolves symbols against mappings first and the classpath hierarchy second.
///
/// A class resolves when it is mapped or present on the classpath. A member resolves when some
/// class in its owner's hierarchy maps it, or declares it without a mapping (kept as-is).
#[derive(Debug)]
pub struct ClassPathResolver {
    table: MappingTable,
    index: ClassPathIndex,
}

impl ClassPathResolver {
    #[must_use]
    pub fn new(table: MappingTable, index: ClassPathIndex) -> Self {
        Self { table, index }
    }

    fn mapped_member(
        &self,
        kind: TargetKind,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Option<&str> {
        match kind {
            TargetKind::Method => self.table.map_method(owner, name, descriptor),
            _ => self.table.map_field(owner, name, descriptor),
        }
    }

    fn resolve_member(
        &self,
        kind: TargetKind,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Option<ResolvedMember> {
        let resolved =
            |mapped: &str| ResolvedMember::new(mapped, self.table.remap_descriptor(descriptor));

        if let Some(mapped) = self.mapped_member(kind, owner, name, descriptor) {
            return Some(resolved(mapped));
        }
        if !self.index.contains(owner) {
            return None;
        }

        let mut declared = false;
        for class in self.index.hierarchy(owner) {
            if let Some(mapped) = self.mapped_member(kind, class, name, descriptor) {
                return Some(resolved(mapped));
            }
            declared |= self.index.get(class).is_some_and(|info| match kind {
                TargetKind::Method => info.declares_method(name, descriptor),
                _ => info.declares_field(name, descriptor),
            });
        }

        declared.then(|| resolved(name))
    }
}

impl SymbolResolver for ClassPathResolver {
    fn resolve_class(&self, owner: &str) -> Option<String> {
        match self.table.map_class(owner) {
            Some(mapped) => Some(mapped.to_string()),
            None if self.index.contains(owner) => Some(owner.to_string()),
            None => None,
        }
    }

    fn resolve_method(&self, owner: &str, name: &str, descriptor: &str) -> Option<ResolvedMember> {
        self.resolve_member(TargetKind::Method, owner, name, descriptor)
    }

    fn resolve_field(&self, owner: &str, name: &str, descriptor: &str) -> Option<ResolvedMember> {
        self.resolve_member(TargetKind::Field, owner, name, descriptor)
    }

    fn finish(&mut self) -> Result<()> {
        log::debug!("Releasing classpath index of {} classes", self.index.len());
        self.index.clear();
        Ok(())
    }
}
