//! Mod metadata lookup and extraction of the directive file it declares.

use crate::error::{ProcessorError, Result};
use crate::platform::ModPlatform;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use widen_directive::{read_version, DirectiveFile};
use zip::result::ZipError;
use zip::ZipArchive;

pub const FABRIC_METADATA: &str = "fabric.mod.json";
pub const QUILT_METADATA: &str = "quilt.mod.json";

/// The parts of a mod's metadata that locate its access widener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModMetadata {
    pub id: String,
    pub access_widener: Option<String>,
}

#[derive(Deserialize)]
struct FabricModJson {
    id: String,
    #[serde(rename = "accessWidener")]
    access_widener: Option<String>,
}

#[derive(Deserialize)]
struct QuiltModJson {
    quilt_loader: QuiltLoader,
    access_widener: Option<OneOrMany>,
}

#[derive(Deserialize)]
struct QuiltLoader {
    id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl ModMetadata {
    pub fn from_fabric_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let json: FabricModJson = serde_json::from_slice(bytes)?;
        Ok(Self {
            id: json.id,
            access_widener: json.access_widener,
        })
    }

    /// Quilt allows several access wideners; only the first is used
    pub fn from_quilt_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let json: QuiltModJson = serde_json::from_slice(bytes)?;
        let access_widener = match json.access_widener {
            Some(OneOrMany::One(path)) => Some(path),
            Some(OneOrMany::Many(paths)) => paths.into_iter().next(),
            None => None,
        };
        Ok(Self {
            id: json.quilt_loader.id,
            access_widener,
        })
    }
}

/// Open `path` as a zip archive, or `None` when it is not one
pub fn open_archive(path: &Path) -> Result<Option<ZipArchive<BufReader<File>>>> {
    if !path.is_file() {
        log::debug!("Skipping {} as it is not a file", path.display());
        return Ok(None);
    }

    let file = File::open(path)?;
    match ZipArchive::new(BufReader::new(file)) {
        Ok(archive) => Ok(Some(archive)),
        Err(err) => {
            log::debug!("Skipping {} as it is not an archive: {err}", path.display());
            Ok(None)
        }
    }
}

/// Read an entry in full, `None` when the archive has no such entry
pub fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(ProcessorError::archive(path, err)),
    };
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

/// Locate the mod metadata of an archive. Quilt metadata wins when the platform is enabled.
pub fn read_mod_metadata<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    platforms: &[ModPlatform],
) -> Result<Option<ModMetadata>> {
    if platforms.contains(&ModPlatform::Quilt) {
        if let Some(bytes) = read_entry(archive, path, QUILT_METADATA)? {
            return ModMetadata::from_quilt_json(&bytes)
                .map(Some)
                .map_err(|source| metadata_error(path, QUILT_METADATA, source));
        }
    }

    match read_entry(archive, path, FABRIC_METADATA)? {
        Some(bytes) => ModMetadata::from_fabric_json(&bytes)
            .map(Some)
            .map_err(|source| metadata_error(path, FABRIC_METADATA, source)),
        None => Ok(None),
    }
}

/// Extract the access widener a mod jar declares in its metadata
pub fn directive_file_from_mod_jar(
    path: &Path,
    platforms: &[ModPlatform],
) -> Result<Option<DirectiveFile>> {
    let Some(mut archive) = open_archive(path)? else {
        return Ok(None);
    };
    let Some(metadata) = read_mod_metadata(&mut archive, path, platforms)? else {
        log::debug!("No mod metadata in {}", path.display());
        return Ok(None);
    };
    let Some(location) = metadata.access_widener else {
        return Ok(None);
    };
    let Some(content) = read_entry(&mut archive, path, &location)? else {
        log::debug!(
            "Mod {} declares access widener {location} but {} does not contain it",
            metadata.id,
            path.display()
        );
        return Ok(None);
    };

    let version = read_version(&content)?;
    Ok(Some(DirectiveFile::new(metadata.id, path, content, version)))
}

fn metadata_error(path: &Path, entry: &'static str, source: serde_json::Error) -> ProcessorError {
    ProcessorError::Metadata {
        path: path.to_path_buf(),
        entry,
        source,
    }
}
