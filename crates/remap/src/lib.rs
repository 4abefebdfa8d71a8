//! # Widen Remap
//!
//! Translation of access widener directives between mapping namespaces.
//!
//! ## Architecture
//!
//! ```text
//! RemappingEngine ──build──> SymbolResolver ──owned by──> ResolverSession
//!  (MappingsEngine)          (ClassPathResolver)           (finish on drop)
//!                                   │
//!                                   ▼
//!                           RemappingVisitor ──> next DirectiveVisitor
//! ```
//!
//! A resolver answers class and member lookups against Tiny v2 mappings, falling back to the
//! class hierarchy found on the source-namespace classpath for inherited members.

mod adapter;
mod classpath;
mod engine;
mod error;
mod mappings;
mod resolver;
mod session;

pub use adapter::RemappingVisitor;
pub use classpath::{ClassInfo, ClassPathIndex};
pub use engine::{ClassPathResolver, MappingsEngine};
pub use error::{RemapError, Result};
pub use mappings::{remap_descriptor, MappingTable};
pub use resolver::{RemappingEngine, ResolvedMember, SymbolResolver};
pub use session::ResolverSession;
