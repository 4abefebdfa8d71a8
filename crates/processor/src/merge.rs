use crate::error::Result;
use widen_directive::{DirectiveFile, DirectiveReader, DirectiveSet, Namespace, TransitiveOnly};
use widen_remap::{RemappingVisitor, SymbolResolver};

/// Fold the transitive directives of `files` into `local`.
///
/// Each file streams through the transitivity filter and the remapper into one accumulator, so
/// duplicate targets widen across files as well as against `local`.
pub fn merge_directives(
    local: DirectiveSet,
    files: &[DirectiveFile],
    resolver: &dyn SymbolResolver,
    from: Namespace,
    to: Namespace,
) -> Result<DirectiveSet> {
    let mut merged = DirectiveSet::in_namespace(to);

    for file in files {
        log::info!("Reading transitive access widener from {}", file.origin_id);
        let remapper =
            RemappingVisitor::new(&mut merged, resolver, from, to).with_origin(&file.origin_id);
        let mut reader = DirectiveReader::new(TransitiveOnly::new(remapper));
        reader.read(&file.content)?;
    }

    merged.union(local)?;
    Ok(merged)
}
