use crate::resolver::SymbolResolver;
use widen_directive::{
    Directive, DirectiveError, DirectiveVisitor, MemberRef, Namespace, Result, Target, TargetKind,
};

/// Rewrites owner, name and descriptor of every directive from `from` into `to` before
/// forwarding it. A lookup miss aborts the stream with [`DirectiveError::UnresolvedSymbol`].
pub struct RemappingVisitor<'r, V> {
    resolver: &'r dyn SymbolResolver,
    from: Namespace,
    to: Namespace,
    origin: String,
    delegate: V,
}

impl<'r, V> RemappingVisitor<'r, V> {
    pub fn new(
        delegate: V,
        resolver: &'r dyn SymbolResolver,
        from: Namespace,
        to: Namespace,
    ) -> Self {
        Self {
            resolver,
            from,
            to,
            origin: String::new(),
            delegate,
        }
    }

    /// Name the artifact the streamed file belongs to, for error reports
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn set_origin(&mut self, origin: impl Into<String>) {
        self.origin = origin.into();
    }

    pub fn into_inner(self) -> V {
        self.delegate
    }

    fn unresolved(&self, target: &Target) -> DirectiveError {
        DirectiveError::UnresolvedSymbol {
            origin: self.origin.clone(),
            kind: target.kind(),
            owner: target.owner().to_string(),
            name: target.name().map(str::to_string),
            descriptor: target.descriptor().map(str::to_string),
        }
    }

    fn remap_member(&self, kind: TargetKind, member: &MemberRef) -> Option<MemberRef> {
        let owner = self.resolver.resolve_class(&member.owner)?;
        let resolved = match kind {
            TargetKind::Method => {
                self.resolver
                    .resolve_method(&member.owner, &member.name, &member.descriptor)
            }
            _ => self
                .resolver
                .resolve_field(&member.owner, &member.name, &member.descriptor),
        }?;
        Some(MemberRef {
            owner,
            name: resolved.name,
            descriptor: resolved.descriptor,
        })
    }

    fn remap(&self, target: &Target) -> Option<Target> {
        match target {
            Target::Class { owner } => self
                .resolver
                .resolve_class(owner)
                .map(|owner| Target::Class { owner }),
            Target::Method(member) => self
                .remap_member(TargetKind::Method, member)
                .map(Target::Method),
            Target::Field(member) => self
                .remap_member(TargetKind::Field, member)
                .map(Target::Field),
        }
    }
}

impl<V: DirectiveVisitor> DirectiveVisitor for RemappingVisitor<'_, V> {
    fn visit_header(&mut self, namespace: Namespace) -> Result<()> {
        if namespace != self.from {
            return Err(DirectiveError::NamespaceMismatch {
                expected: self.from,
                found: namespace,
            });
        }
        self.delegate.visit_header(self.to)
    }

    fn visit_directive(&mut self, directive: Directive) -> Result<()> {
        let target = self
            .remap(&directive.target)
            .ok_or_else(|| self.unresolved(&directive.target))?;
        self.delegate.visit_directive(Directive {
            target,
            ..directive
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappings::MappingTable;
    use pretty_assertions::assert_eq;
    use widen_directive::{Access, DirectiveReader, Recorder};

    fn table() -> MappingTable {
        let mut table = MappingTable::new(Namespace::Intermediary, Namespace::Named);
        table.add_class("net/minecraft/class_1", "net/minecraft/Foo");
        table.add_class("net/minecraft/class_2", "net/minecraft/Bar");
        table.add_method(
            "net/minecraft/class_1",
            "method_1",
            "(Lnet/minecraft/class_2;)V",
            "accept",
        );
        table.add_field("net/minecraft/class_1", "field_1", "I", "count");
        table
    }

    fn remap(content: &str) -> Result<Recorder> {
        let table = table();
        let visitor = RemappingVisitor::new(
            Recorder::default(),
            &table,
            Namespace::Intermediary,
            Namespace::Named,
        )
        .with_origin("examplemod");
        let mut reader = DirectiveReader::new(visitor);
        reader.read(content.as_bytes())?;
        Ok(reader.into_inner().into_inner())
    }

    #[test]
    fn rewrites_every_symbol() {
        let recorder = remap(
            "accessWidener v2 intermediary\n\
             accessible class net/minecraft/class_1\n\
             transitive-accessible method net/minecraft/class_1 method_1 (Lnet/minecraft/class_2;)V\n\
             mutable field net/minecraft/class_1 field_1 I\n",
        )
        .unwrap();

        assert_eq!(recorder.namespace, Some(Namespace::Named));
        assert_eq!(
            recorder.directives,
            vec![
                Directive::new(Target::class("net/minecraft/Foo"), Access::Accessible, false),
                Directive::new(
                    Target::method("net/minecraft/Foo", "accept", "(Lnet/minecraft/Bar;)V"),
                    Access::Accessible,
                    true
                ),
                Directive::new(
                    Target::field("net/minecraft/Foo", "count", "I"),
                    Access::Mutable,
                    false
                ),
            ]
        );
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let err = remap(
            "accessWidener v2 intermediary\n\
             accessible method net/minecraft/class_1 method_9 ()V\n",
        )
        .unwrap_err();

        assert_eq!(
            err,
            DirectiveError::UnresolvedSymbol {
                origin: "examplemod".to_string(),
                kind: TargetKind::Method,
                owner: "net/minecraft/class_1".to_string(),
                name: Some("method_9".to_string()),
                descriptor: Some("()V".to_string()),
            }
        );
    }

    #[test]
    fn header_must_match_source_namespace() {
        let err = remap("accessWidener v2 named\n").unwrap_err();
        assert!(matches!(err, DirectiveError::NamespaceMismatch { .. }));
    }
}
