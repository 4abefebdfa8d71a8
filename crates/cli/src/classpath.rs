use anyhow::{Context, Result};
use std::path::PathBuf;
use walkdir::WalkDir;

const ARCHIVE_EXTENSIONS: [&str; 2] = ["jar", "zip"];

/// Expand classpath arguments: directories contribute every archive beneath them (sorted),
/// anything else is passed through untouched.
pub fn expand(entries: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::new();
    for entry in entries {
        if !entry.is_dir() {
            expanded.push(entry.clone());
            continue;
        }

        let mut archives = Vec::new();
        for item in WalkDir::new(entry).follow_links(true) {
            let item = item.with_context(|| format!("Failed to walk {}", entry.display()))?;
            let is_archive = item.file_type().is_file()
                && item
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ARCHIVE_EXTENSIONS.contains(&ext));
            if is_archive {
                archives.push(item.into_path());
            }
        }
        archives.sort();
        log::debug!("{} archives under {}", archives.len(), entry.display());
        expanded.extend(archives);
    }
    Ok(expanded)
}
