use crate::error::Result;
use crate::model::{Directive, Namespace};

/// Receives directive events in file order.
///
/// Decorators (filters, remappers) wrap another visitor and forward the events they accept;
/// a terminal visitor such as [`crate::DirectiveSet`] accumulates them.
pub trait DirectiveVisitor {
    /// Called once with the header namespace before any directive
    fn visit_header(&mut self, _namespace: Namespace) -> Result<()> {
        Ok(())
    }

    fn visit_directive(&mut self, directive: Directive) -> Result<()>;
}

impl<V: DirectiveVisitor + ?Sized> DirectiveVisitor for &mut V {
    fn visit_header(&mut self, namespace: Namespace) -> Result<()> {
        (**self).visit_header(namespace)
    }

    fn visit_directive(&mut self, directive: Directive) -> Result<()> {
        (**self).visit_directive(directive)
    }
}

impl<V: DirectiveVisitor + ?Sized> DirectiveVisitor for Box<V> {
    fn visit_header(&mut self, namespace: Namespace) -> Result<()> {
        (**self).visit_header(namespace)
    }

    fn visit_directive(&mut self, directive: Directive) -> Result<()> {
        (**self).visit_directive(directive)
    }
}

/// Collects every visited directive in order
#[derive(Debug, Default)]
pub struct Recorder {
    pub namespace: Option<Namespace>,
    pub directives: Vec<Directive>,
}

impl DirectiveVisitor for Recorder {
    fn visit_header(&mut self, namespace: Namespace) -> Result<()> {
        self.namespace = Some(namespace);
        Ok(())
    }

    fn visit_directive(&mut self, directive: Directive) -> Result<()> {
        self.directives.push(directive);
        Ok(())
    }
}

/// Latches once any visited directive is transitive
#[derive(Debug, Default)]
pub struct TransitiveDetector {
    transitive: bool,
}

impl TransitiveDetector {
    #[must_use]
    pub const fn found(&self) -> bool {
        self.transitive
    }
}

impl DirectiveVisitor for TransitiveDetector {
    fn visit_directive(&mut self, directive: Directive) -> Result<()> {
        if directive.transitive {
            self.transitive = true;
        }
        Ok(())
    }
}
