use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::metadata::directive_file_from_mod_jar;
use crate::platform::ModPlatform;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use widen_directive::{contains_transitive, DirectiveFile};

/// Find every artifact whose access widener declares transitive directives.
///
/// Candidates are de-duplicated first. The result is sorted by origin id then artifact path,
/// independent of candidate order and of scan parallelism.
pub fn discover_transitive_files(
    candidates: impl IntoIterator<Item = PathBuf>,
    config: &ProcessorConfig,
) -> Result<Vec<DirectiveFile>> {
    let candidates: Vec<PathBuf> = candidates
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let platforms = config.platforms.as_slice();

    let scanned: Vec<Option<DirectiveFile>> = if config.parallel_discovery {
        candidates
            .par_iter()
            .map(|path| scan_candidate(path, platforms))
            .collect::<Result<_>>()?
    } else {
        candidates
            .iter()
            .map(|path| scan_candidate(path, platforms))
            .collect::<Result<_>>()?
    };

    let mut files: Vec<DirectiveFile> = scanned.into_iter().flatten().collect();
    files.sort_by(|a, b| {
        a.origin_id
            .cmp(&b.origin_id)
            .then_with(|| a.source.cmp(&b.source))
    });

    log::debug!(
        "Found {} transitive access wideners in {} candidates",
        files.len(),
        candidates.len()
    );
    Ok(files)
}

/// Retain a candidate's directive file only if it can and does declare transitive directives
pub fn scan_candidate(path: &Path, platforms: &[ModPlatform]) -> Result<Option<DirectiveFile>> {
    if !path.exists() {
        log::debug!(
            "Could not find transitive access widener in {} as it does not exist",
            path.display()
        );
        return Ok(None);
    }

    let Some(file) = directive_file_from_mod_jar(path, platforms)? else {
        return Ok(None);
    };

    if !file.supports_transitive() {
        log::debug!(
            "Access widener of {} is v{} and cannot be transitive",
            file.origin_id,
            file.version
        );
        return Ok(None);
    }

    if !contains_transitive(&file.content)? {
        log::debug!(
            "Access widener of {} declares nothing transitive",
            file.origin_id
        );
        return Ok(None);
    }

    Ok(Some(file))
}
