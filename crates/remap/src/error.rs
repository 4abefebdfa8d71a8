use std::path::PathBuf;
use thiserror::Error;
use widen_directive::Namespace;

pub type Result<T> = std::result::Result<T, RemapError>;

#[derive(Error, Debug)]
pub enum RemapError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Archive error in {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Invalid mappings (line {line}): {message}")]
    Mappings { line: usize, message: String },

    #[error("Mappings do not declare namespace {0}")]
    MissingNamespace(Namespace),
}

impl RemapError {
    pub fn mappings(line: usize, message: impl Into<String>) -> Self {
        Self::Mappings {
            line,
            message: message.into(),
        }
    }

    pub fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }
}
