use crate::error::{DirectiveError, Result};
use crate::model::{Access, AccessSet, Directive, Namespace, Target};
use crate::visitor::DirectiveVisitor;
use std::collections::{BTreeMap, BTreeSet};

/// Merged access granted to one target.
///
/// `transitive` is always a subset of `access`: it holds the levels some contributor exported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grant {
    pub access: AccessSet,
    pub transitive: AccessSet,
}

impl Grant {
    #[must_use]
    pub const fn of(access: Access, transitive: bool) -> Self {
        Self {
            access: AccessSet::of(access),
            transitive: if transitive {
                AccessSet::of(access)
            } else {
                AccessSet::empty()
            },
        }
    }

    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            access: self.access.union(other.access),
            transitive: self.transitive.union(other.transitive),
        }
    }

    #[must_use]
    pub const fn is_transitive(&self, access: Access) -> bool {
        self.transitive.contains(access)
    }

    #[must_use]
    pub fn widest(&self) -> Option<Access> {
        self.access.widest()
    }
}

/// De-duplicated directives keyed by target.
///
/// Duplicate targets are resolved widen-only: the merged grant holds every access level any
/// contributor requested, so a later, narrower request never removes an earlier, wider one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    namespace: Option<Namespace>,
    entries: BTreeMap<Target, Grant>,
}

impl DirectiveSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn in_namespace(namespace: Namespace) -> Self {
        Self {
            namespace: Some(namespace),
            entries: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn namespace(&self) -> Option<Namespace> {
        self.namespace
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn get(&self, target: &Target) -> Option<Grant> {
        self.entries.get(target).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Target, &Grant)> {
        self.entries.iter()
    }

    /// Every class name referenced as an owner
    #[must_use]
    pub fn owners(&self) -> BTreeSet<&str> {
        self.entries.keys().map(Target::owner).collect()
    }

    pub fn insert(&mut self, directive: Directive) {
        let grant = Grant::of(directive.access, directive.transitive);
        self.insert_grant(directive.target, grant);
    }

    fn insert_grant(&mut self, target: Target, grant: Grant) {
        self.entries
            .entry(target)
            .and_modify(|existing| *existing = existing.merge(grant))
            .or_insert(grant);
    }

    /// Fold `other` into this set. Both sets must agree on their namespace when both declare one.
    pub fn union(&mut self, other: DirectiveSet) -> Result<()> {
        self.adopt_namespace(other.namespace)?;
        for (target, grant) in other.entries {
            self.insert_grant(target, grant);
        }
        Ok(())
    }

    /// Replay the set as a directive stream: one event per granted access level
    pub fn accept<V: DirectiveVisitor>(&self, visitor: &mut V) -> Result<()> {
        if let Some(namespace) = self.namespace {
            visitor.visit_header(namespace)?;
        }
        for (target, grant) in &self.entries {
            for access in grant.access.iter() {
                let transitive = grant.is_transitive(access);
                visitor.visit_directive(Directive::new(target.clone(), access, transitive))?;
            }
        }
        Ok(())
    }

    fn adopt_namespace(&mut self, namespace: Option<Namespace>) -> Result<()> {
        match (self.namespace, namespace) {
            (Some(expected), Some(found)) if expected != found => {
                Err(DirectiveError::NamespaceMismatch { expected, found })
            }
            (None, Some(found)) => {
                self.namespace = Some(found);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl DirectiveVisitor for DirectiveSet {
    fn visit_header(&mut self, namespace: Namespace) -> Result<()> {
        self.adopt_namespace(Some(namespace))
    }

    fn visit_directive(&mut self, directive: Directive) -> Result<()> {
        self.insert(directive);
        Ok(())
    }
}

impl FromIterator<Directive> for DirectiveSet {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        let mut set = Self::new();
        for directive in iter {
            set.insert(directive);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TransitiveOnly;
    use crate::reader::DirectiveReader;
    use crate::visitor::Recorder;
    use crate::writer::DirectiveWriter;
    use pretty_assertions::assert_eq;

    fn method() -> Target {
        Target::method("com/example/Foo", "bar", "()V")
    }

    #[test]
    fn duplicates_keep_the_widest_access() {
        let mut local = DirectiveSet::new();
        local.insert(Directive::new(method(), Access::Extendable, false));

        let mut transitive = DirectiveSet::new();
        transitive.insert(Directive::new(method(), Access::Accessible, true));

        local.union(transitive).unwrap();

        let grant = local.get(&method()).unwrap();
        assert_eq!(grant.widest(), Some(Access::Extendable));
        assert!(grant.access.contains(Access::Accessible));
        assert!(grant.is_transitive(Access::Accessible));
        assert!(!grant.is_transitive(Access::Extendable));
        assert_eq!(local.len(), 1);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = Directive::new(method(), Access::Accessible, false);
        let b = Directive::new(method(), Access::Extendable, true);

        let forward: DirectiveSet = [a.clone(), b.clone()].into_iter().collect();
        let backward: DirectiveSet = [b, a].into_iter().collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn union_rejects_foreign_namespace() {
        let mut named = DirectiveSet::in_namespace(Namespace::Named);
        let intermediary = DirectiveSet::in_namespace(Namespace::Intermediary);
        assert!(matches!(
            named.union(intermediary),
            Err(DirectiveError::NamespaceMismatch { .. })
        ));
    }

    #[test]
    fn accumulates_from_reader_and_replays() {
        let content = b"accessWidener v2 named\n\
            accessible class com/example/Foo\n\
            accessible class com/example/Foo\n\
            transitive-accessible field com/example/Foo count I\n\
            mutable field com/example/Foo count I\n";

        let mut reader = DirectiveReader::new(DirectiveSet::new());
        reader.read(content).unwrap();
        let set = reader.into_inner();

        assert_eq!(set.namespace(), Some(Namespace::Named));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.owners().into_iter().collect::<Vec<_>>(),
            vec!["com/example/Foo"]
        );

        let mut writer = DirectiveWriter::new(2).unwrap();
        set.accept(&mut writer).unwrap();
        assert_eq!(
            writer.as_str(),
            "accessWidener\tv2\tnamed\n\
             accessible\tclass\tcom/example/Foo\n\
             transitive-accessible\tfield\tcom/example/Foo\tcount\tI\n\
             mutable\tfield\tcom/example/Foo\tcount\tI\n"
        );
    }

    #[test]
    fn replay_keeps_private_levels_private() {
        let content = b"accessWidener v2 named\n\
            transitive-accessible field a/Foo count I\n\
            mutable field a/Foo count I\n";

        let mut reader = DirectiveReader::new(DirectiveSet::new());
        reader.read(content).unwrap();
        let set = reader.into_inner();

        let mut filter = TransitiveOnly::new(Recorder::default());
        set.accept(&mut filter).unwrap();
        assert_eq!(
            filter.into_inner().directives,
            vec![Directive::new(
                Target::field("a/Foo", "count", "I"),
                Access::Accessible,
                true
            )]
        );
    }
}
