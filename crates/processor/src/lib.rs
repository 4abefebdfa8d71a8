//! # Widen Processor
//!
//! Propagates access wideners marked `transitive-` from dependency mods to the archive a
//! project compiles against.
//!
//! ## Pipeline
//!
//! ```text
//! BuildEnvironment::compile_visible_artifacts()
//!         │
//!         ▼
//! discover_transitive_files ──> [DirectiveFile] ──> CacheKey (identity for build caches)
//!         │
//!         ▼
//! merge_directives: TransitiveOnly ─> RemappingVisitor ─> DirectiveSet ∪ local
//!         │                               ▲
//!         │                 ResolverSession (namespace_jars(source))
//!         ▼
//! JarTransformer::apply(archive)
//! ```
//!
//! [`TransitiveWidenerProcessor`] ties the stages together behind the jar-processing contract
//! the surrounding build uses: `is_empty`, `cache_identity` and `process`.

mod cache_key;
mod config;
mod discovery;
mod environment;
mod error;
mod merge;
pub mod metadata;
mod platform;
mod processor;
mod transform;

pub use cache_key::{CacheKey, IDENTITY_PREFIX};
pub use config::ProcessorConfig;
pub use discovery::{discover_transitive_files, scan_candidate};
pub use environment::{BuildEnvironment, StaticEnvironment};
pub use error::{ProcessorError, Result};
pub use merge::merge_directives;
pub use platform::ModPlatform;
pub use processor::TransitiveWidenerProcessor;
pub use transform::JarTransformer;
