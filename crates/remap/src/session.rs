use crate::error::Result;
use crate::resolver::{RemappingEngine, SymbolResolver};
use std::path::PathBuf;
use widen_directive::Namespace;

/// Scoped ownership of a resolver.
///
/// The resolver is finished exactly once: explicitly through [`ResolverSession::finish`], or
/// on drop when the session is abandoned by an early return or an error.
pub struct ResolverSession {
    resolver: Box<dyn SymbolResolver>,
    source: Namespace,
    target: Namespace,
    finished: bool,
}

impl ResolverSession {
    pub fn open(
        engine: &dyn RemappingEngine,
        source: Namespace,
        target: Namespace,
        classpath: &[PathBuf],
    ) -> Result<Self> {
        log::debug!(
            "Building {source}->{target} resolver from {} classpath entries",
            classpath.len()
        );
        let resolver = engine.build(source, target, classpath)?;
        Ok(Self {
            resolver,
            source,
            target,
            finished: false,
        })
    }

    #[must_use]
    pub fn resolver(&self) -> &dyn SymbolResolver {
        self.resolver.as_ref()
    }

    #[must_use]
    pub const fn source(&self) -> Namespace {
        self.source
    }

    #[must_use]
    pub const fn target(&self) -> Namespace {
        self.target
    }

    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.resolver.finish()
    }
}

impl Drop for ResolverSession {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Err(err) = self.resolver.finish() {
            log::warn!(
                "Failed to finish {}->{} resolver: {err}",
                self.source,
                self.target
            );
        }
    }
}
