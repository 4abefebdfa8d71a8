use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Symbol-naming scheme an artifact is compiled against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Official,
    Intermediary,
    Named,
    Srg,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Official,
        Namespace::Intermediary,
        Namespace::Named,
        Namespace::Srg,
    ];

    /// Token used in directive headers and mapping files
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::Intermediary => "intermediary",
            Self::Named => "named",
            Self::Srg => "srg",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ns| ns.as_str() == s)
            .ok_or_else(|| format!("unknown namespace '{s}'"))
    }
}

/// Kind of declaration a directive targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Class,
    Method,
    Field,
}

impl TargetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Method => "method",
            Self::Field => "field",
        }
    }

    pub(crate) fn from_token(token: &str) -> Option<Self> {
        match token {
            "class" => Some(Self::Class),
            "method" => Some(Self::Method),
            "field" => Some(Self::Field),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested access level, ordered from least to most permissive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Accessible,
    Extendable,
    Mutable,
}

impl Access {
    pub const ALL: [Access; 3] = [Access::Accessible, Access::Extendable, Access::Mutable];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accessible => "accessible",
            Self::Extendable => "extendable",
            Self::Mutable => "mutable",
        }
    }

    pub(crate) fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|access| access.as_str() == token)
    }

    /// Whether this access level may be requested for the given target kind
    #[must_use]
    pub const fn applies_to(self, kind: TargetKind) -> bool {
        match self {
            Self::Accessible => true,
            Self::Extendable => !matches!(kind, TargetKind::Field),
            Self::Mutable => matches!(kind, TargetKind::Field),
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Accessible => 0b001,
            Self::Extendable => 0b010,
            Self::Mutable => 0b100,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Union of granted access levels. Merging only ever adds levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessSet(u8);

impl AccessSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn of(access: Access) -> Self {
        Self(access.bit())
    }

    #[must_use]
    pub const fn with(self, access: Access) -> Self {
        Self(self.0 | access.bit())
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn contains(self, access: Access) -> bool {
        self.0 & access.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Every granted level, least permissive first
    pub fn iter(self) -> impl Iterator<Item = Access> {
        Access::ALL
            .into_iter()
            .filter(move |access| self.contains(*access))
    }

    /// The most permissive granted level
    #[must_use]
    pub fn widest(self) -> Option<Access> {
        self.iter().last()
    }
}

impl From<Access> for AccessSet {
    fn from(access: Access) -> Self {
        Self::of(access)
    }
}

/// Method or field reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl MemberRef {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// The declaration a directive widens. Class targets carry no name or descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Target {
    Class { owner: String },
    Method(MemberRef),
    Field(MemberRef),
}

impl Target {
    pub fn class(owner: impl Into<String>) -> Self {
        Self::Class {
            owner: owner.into(),
        }
    }

    pub fn method(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self::Method(MemberRef::new(owner, name, descriptor))
    }

    pub fn field(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self::Field(MemberRef::new(owner, name, descriptor))
    }

    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::Class { .. } => TargetKind::Class,
            Self::Method(_) => TargetKind::Method,
            Self::Field(_) => TargetKind::Field,
        }
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        match self {
            Self::Class { owner } => owner,
            Self::Method(member) | Self::Field(member) => &member.owner,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Class { .. } => None,
            Self::Method(member) | Self::Field(member) => Some(&member.name),
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> Option<&str> {
        match self {
            Self::Class { .. } => None,
            Self::Method(member) | Self::Field(member) => Some(&member.descriptor),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { owner } => write!(f, "class {owner}"),
            Self::Method(m) => write!(f, "method {} {} {}", m.owner, m.name, m.descriptor),
            Self::Field(m) => write!(f, "field {} {} {}", m.owner, m.name, m.descriptor),
        }
    }
}

/// A single visibility-widening instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Directive {
    pub target: Target,
    pub access: Access,
    pub transitive: bool,
}

impl Directive {
    #[must_use]
    pub const fn new(target: Target, access: Access, transitive: bool) -> Self {
        Self {
            target,
            access,
            transitive,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        self.target.kind()
    }
}

/// A directive file extracted from an artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectiveFile {
    /// Identifies the owning artifact (usually its mod id)
    pub origin_id: String,
    /// Artifact the file was read from
    pub source: PathBuf,
    pub content: Arc<[u8]>,
    pub version: u32,
}

impl DirectiveFile {
    pub fn new(
        origin_id: impl Into<String>,
        source: impl Into<PathBuf>,
        content: impl Into<Arc<[u8]>>,
        version: u32,
    ) -> Self {
        Self {
            origin_id: origin_id.into(),
            source: source.into(),
            content: content.into(),
            version,
        }
    }

    /// Transitive directives are only defined from format v2 onwards
    #[must_use]
    pub const fn supports_transitive(&self) -> bool {
        self.version >= 2
    }
}
