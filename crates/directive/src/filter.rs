use crate::error::Result;
use crate::model::{Directive, Namespace};
use crate::visitor::DirectiveVisitor;

/// Forwards only transitive directives to the wrapped visitor.
///
/// Non-transitive directives are scoped to the declaring artifact's own build and are dropped.
#[derive(Debug)]
pub struct TransitiveOnly<V> {
    delegate: V,
}

impl<V> TransitiveOnly<V> {
    pub const fn new(delegate: V) -> Self {
        Self { delegate }
    }

    pub fn into_inner(self) -> V {
        self.delegate
    }
}

impl<V: DirectiveVisitor> DirectiveVisitor for TransitiveOnly<V> {
    fn visit_header(&mut self, namespace: Namespace) -> Result<()> {
        self.delegate.visit_header(namespace)
    }

    fn visit_directive(&mut self, directive: Directive) -> Result<()> {
        if directive.transitive {
            self.delegate.visit_directive(directive)
        } else {
            Ok(())
        }
    }
}
