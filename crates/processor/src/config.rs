use crate::error::{ProcessorError, Result};
use crate::platform::ModPlatform;
use serde::{Deserialize, Serialize};
use std::path::Path;
use widen_directive::Namespace;

/// Configuration for transitive access widener processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Namespace dependency artifacts are published in
    pub source_namespace: Namespace,

    /// Namespace the processed archive is compiled against
    pub target_namespace: Namespace,

    /// Mod platforms whose metadata is consulted
    pub platforms: Vec<ModPlatform>,

    /// Scan candidate artifacts on the rayon pool
    pub parallel_discovery: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            source_namespace: Namespace::Intermediary,
            target_namespace: Namespace::Named,
            platforms: vec![ModPlatform::Fabric],
            parallel_discovery: true,
        }
    }
}

impl ProcessorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    #[must_use]
    pub fn has_platform(&self, platform: ModPlatform) -> bool {
        self.platforms.contains(&platform)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.source_namespace == self.target_namespace {
            return Err(ProcessorError::invalid_config(format!(
                "source_namespace and target_namespace are both {}",
                self.source_namespace
            )));
        }

        if self.platforms.is_empty() {
            return Err(ProcessorError::invalid_config(
                "at least one mod platform is required",
            ));
        }

        let uses_srg = [self.source_namespace, self.target_namespace].contains(&Namespace::Srg);
        if uses_srg && !self.has_platform(ModPlatform::Forge) {
            return Err(ProcessorError::invalid_config(
                "the srg namespace is only available on Forge",
            ));
        }

        for platform in &self.platforms {
            if platform.is_experimental() {
                log::warn!("Mod platform {platform} is experimental");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ProcessorConfig::from_toml_str("").unwrap();
        assert_eq!(config, ProcessorConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = ProcessorConfig::from_toml_str(
            r#"
            source_namespace = "srg"
            target_namespace = "named"
            platforms = ["forge"]
            parallel_discovery = false
            "#,
        )
        .unwrap();

        assert_eq!(config.source_namespace, Namespace::Srg);
        assert_eq!(config.platforms, vec![ModPlatform::Forge]);
        assert!(!config.parallel_discovery);
    }

    #[test]
    fn rejects_identical_namespaces() {
        let config = ProcessorConfig {
            target_namespace: Namespace::Intermediary,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProcessorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn srg_requires_forge() {
        let err = ProcessorConfig::from_toml_str("source_namespace = \"srg\"\n").unwrap_err();
        assert!(err.to_string().contains("only available on Forge"));
    }

    #[test]
    fn unknown_namespace_is_a_parse_error() {
        let err = ProcessorConfig::from_toml_str("target_namespace = \"mojang\"\n").unwrap_err();
        assert!(matches!(err, ProcessorError::ConfigParse(_)));
    }
}
