use crate::error::{ProcessorError, Result};
use crate::platform::ModPlatform;
use std::collections::HashMap;
use std::path::PathBuf;
use widen_directive::Namespace;

/// What the surrounding build provides to the processor
pub trait BuildEnvironment {
    /// Every artifact resolvable on the compile classpath
    fn compile_visible_artifacts(&self) -> Vec<PathBuf>;

    /// Platform and runtime jars compiled against `namespace`
    fn namespace_jars(&self, namespace: Namespace) -> Result<Vec<PathBuf>>;
}

/// A build environment backed by explicit path lists
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    platforms: Vec<ModPlatform>,
    artifacts: Vec<PathBuf>,
    namespace_jars: HashMap<Namespace, Vec<PathBuf>>,
}

impl StaticEnvironment {
    #[must_use]
    pub fn new(platforms: Vec<ModPlatform>) -> Self {
        Self {
            platforms,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_artifacts(mut self, artifacts: impl IntoIterator<Item = PathBuf>) -> Self {
        self.artifacts.extend(artifacts);
        self
    }

    #[must_use]
    pub fn with_namespace_jars(
        mut self,
        namespace: Namespace,
        jars: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        self.namespace_jars.entry(namespace).or_default().extend(jars);
        self
    }

    pub fn add_artifact(&mut self, path: impl Into<PathBuf>) {
        self.artifacts.push(path.into());
    }

    pub fn add_namespace_jar(&mut self, namespace: Namespace, path: impl Into<PathBuf>) {
        self.namespace_jars
            .entry(namespace)
            .or_default()
            .push(path.into());
    }
}

impl BuildEnvironment for StaticEnvironment {
    fn compile_visible_artifacts(&self) -> Vec<PathBuf> {
        self.artifacts.clone()
    }

    fn namespace_jars(&self, namespace: Namespace) -> Result<Vec<PathBuf>> {
        if namespace == Namespace::Srg && !self.platforms.contains(&ModPlatform::Forge) {
            return Err(ProcessorError::environment(
                "srg jars are only available on Forge",
            ));
        }
        Ok(self
            .namespace_jars
            .get(&namespace)
            .cloned()
            .unwrap_or_default())
    }
}
