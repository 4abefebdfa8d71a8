use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use widen_directive::DirectiveFile;

/// Prefix of the identity string handed to the surrounding build's cache
pub const IDENTITY_PREFIX: &str = "widen:transitive_access_wideners:";

/// Stable identity of a set of contributing transitive access wideners.
///
/// Only exists for a non-empty contributor set; "nothing transitive" is `None` at the call site,
/// never the hash of an empty set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hash the sorted, de-duplicated `(origin id, content digest)` pairs of `files`
    #[must_use]
    pub fn compute(files: &[DirectiveFile]) -> Option<Self> {
        let contributors: BTreeSet<(&str, Vec<u8>)> = files
            .iter()
            .map(|file| (file.origin_id.as_str(), Sha256::digest(&file.content).to_vec()))
            .collect();
        if contributors.is_empty() {
            return None;
        }

        let mut hasher = Sha256::new();
        for (origin, digest) in &contributors {
            hasher.update(origin.as_bytes());
            hasher.update([0u8]);
            hasher.update(digest);
        }
        Some(Self(to_hex(&hasher.finalize())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn identity(&self) -> String {
        format!("{IDENTITY_PREFIX}{}", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_hex(bytes: &[u8]) -> String {
    use fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::{assert_eq, assert_ne};

    fn file(origin: &str, body: &str) -> DirectiveFile {
        let content = format!("accessWidener v2 named\n{body}\n");
        DirectiveFile::new(origin, format!("/mods/{origin}.jar"), content.into_bytes(), 2)
    }

    #[test]
    fn empty_contributors_have_no_key() {
        assert_eq!(CacheKey::compute(&[]), None);
    }

    #[test]
    fn discovery_order_does_not_matter() {
        let a = file("alpha", "transitive-accessible class a/A");
        let b = file("beta", "transitive-accessible class b/B");
        let c = file("gamma", "transitive-mutable field c/C x I");

        let forward = CacheKey::compute(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let shuffled = CacheKey::compute(&[c.clone(), a.clone(), b.clone()]).unwrap();
        let duplicated = CacheKey::compute(&[b.clone(), a.clone(), c.clone(), a]).unwrap();
        assert_eq!(forward, shuffled);
        assert_eq!(forward, duplicated);

        let without_gamma =
            CacheKey::compute(&[b, file("alpha", "transitive-accessible class a/A")]);
        assert_ne!(Some(forward), without_gamma);
    }

    #[test]
    fn content_changes_change_the_key() {
        let before = CacheKey::compute(&[file("alpha", "transitive-accessible class a/A")]);
        let after = CacheKey::compute(&[file("alpha", "transitive-extendable class a/A")]);
        assert_ne!(before, after);
    }

    #[test]
    fn identity_is_prefixed_hex() {
        let key = CacheKey::compute(&[file("alpha", "transitive-accessible class a/A")]).unwrap();
        let identity = key.identity();
        let hex = identity.strip_prefix(IDENTITY_PREFIX).unwrap();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
