use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mod loader a project builds for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModPlatform {
    Fabric,
    Forge,
    Quilt,
}

impl ModPlatform {
    pub const ALL: [ModPlatform; 3] = [ModPlatform::Fabric, ModPlatform::Forge, ModPlatform::Quilt];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fabric => "fabric",
            Self::Forge => "forge",
            Self::Quilt => "quilt",
        }
    }

    /// Platforms whose support may change without notice
    #[must_use]
    pub const fn is_experimental(self) -> bool {
        matches!(self, Self::Quilt)
    }
}

impl fmt::Display for ModPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mod platform '{s}'"))
    }
}
