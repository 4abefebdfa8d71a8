use serde::Serialize;
use std::path::PathBuf;
use widen_directive::{DirectiveFile, Namespace};

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub version: u32,
    pub namespace: Namespace,
    pub directives: usize,
    pub transitive: usize,
    pub targets: usize,
}

#[derive(Debug, Serialize)]
pub struct DiscoveredFile {
    pub origin_id: String,
    pub source: PathBuf,
    pub version: u32,
    pub bytes: usize,
}

impl From<&DirectiveFile> for DiscoveredFile {
    fn from(file: &DirectiveFile) -> Self {
        Self {
            origin_id: file.origin_id.clone(),
            source: file.source.clone(),
            version: file.version,
            bytes: file.content.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub archive: PathBuf,
    pub transitive_files: usize,
    pub cache_identity: Option<String>,
    pub changed: bool,
}
