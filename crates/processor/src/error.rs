use std::path::PathBuf;
use thiserror::Error;
use widen_classfile::ClassFileError;
use widen_directive::DirectiveError;
use widen_remap::RemapError;

/// Result type for processor operations
pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Errors raised while discovering, merging or applying access wideners
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// A directive file failed to parse or remap
    #[error(transparent)]
    Directive(#[from] DirectiveError),

    /// The remapping engine could not be built or torn down
    #[error(transparent)]
    Remap(#[from] RemapError),

    /// A class file inside an archive could not be read or patched
    #[error("Class file error in {entry}: {source}")]
    ClassFile {
        entry: String,
        #[source]
        source: ClassFileError,
    },

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Archive error in {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Mod metadata inside an artifact is not valid JSON for its schema
    #[error("Invalid mod metadata {entry} in {path}: {source}")]
    Metadata {
        path: PathBuf,
        entry: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The build environment cannot provide what was asked of it
    #[error("Build environment error: {0}")]
    Environment(String),

    /// The caller broke the processor's contract (e.g. processing with nothing to apply)
    #[error("Precondition violated: {0}")]
    Precondition(&'static str),
}

impl ProcessorError {
    pub fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }

    pub fn class_file(entry: impl Into<String>, source: ClassFileError) -> Self {
        Self::ClassFile {
            entry: entry.into(),
            source,
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }
}
