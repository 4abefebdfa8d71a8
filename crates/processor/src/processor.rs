use crate::cache_key::CacheKey;
use crate::config::ProcessorConfig;
use crate::discovery::discover_transitive_files;
use crate::environment::BuildEnvironment;
use crate::error::{ProcessorError, Result};
use crate::merge::merge_directives;
use crate::transform::JarTransformer;
use std::path::Path;
use widen_directive::{DirectiveFile, DirectiveSet};
use widen_remap::{RemappingEngine, ResolverSession};

/// Applies the transitive access wideners of compile-visible dependencies to an archive.
///
/// Discovery runs once at construction; the result is fixed for the processor's lifetime and
/// drives both [`Self::cache_identity`] and [`Self::process`].
pub struct TransitiveWidenerProcessor<E, M> {
    config: ProcessorConfig,
    env: E,
    engine: M,
    files: Vec<DirectiveFile>,
    local: DirectiveSet,
}

impl<E: BuildEnvironment, M: RemappingEngine> TransitiveWidenerProcessor<E, M> {
    pub fn new(config: ProcessorConfig, env: E, engine: M) -> Result<Self> {
        config.validate()?;
        let files = discover_transitive_files(env.compile_visible_artifacts(), &config)?;
        for file in &files {
            log::debug!(
                "Transitive access widener from {} ({})",
                file.origin_id,
                file.source.display()
            );
        }

        Ok(Self {
            config,
            env,
            engine,
            files,
            local: DirectiveSet::new(),
        })
    }

    /// Directives of the project itself, already in the target namespace
    #[must_use]
    pub fn with_local(mut self, local: DirectiveSet) -> Self {
        self.local = local;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// The retained transitive directive files, sorted by origin id
    #[must_use]
    pub fn transitive_files(&self) -> &[DirectiveFile] {
        &self.files
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn cache_key(&self) -> Option<CacheKey> {
        CacheKey::compute(&self.files)
    }

    pub fn cache_identity(&self) -> Result<String> {
        self.cache_key()
            .map(|key| key.identity())
            .ok_or(ProcessorError::Precondition(
                "cache identity requested without transitive access wideners",
            ))
    }

    /// Local directives plus every discovered transitive directive, remapped to the target
    /// namespace. The resolver lives only for the duration of this call.
    pub fn merged_directives(&self) -> Result<DirectiveSet> {
        let source = self.config.source_namespace;
        let target = self.config.target_namespace;
        let classpath = self.env.namespace_jars(source)?;

        let session = ResolverSession::open(&self.engine, source, target, &classpath)?;
        let merged = merge_directives(
            self.local.clone(),
            &self.files,
            session.resolver(),
            source,
            target,
        )?;
        session.finish()?;
        Ok(merged)
    }

    /// Widen the archive at `archive` in place. Returns whether it changed.
    pub fn process(&self, archive: &Path) -> Result<bool> {
        if self.is_empty() {
            return Err(ProcessorError::Precondition(
                "process called without transitive access wideners",
            ));
        }

        let merged = self.merged_directives()?;
        log::info!(
            "Applying {} merged access widener entries to {}",
            merged.len(),
            archive.display()
        );
        JarTransformer::new(&merged)?.apply(archive)
    }
}
