use crate::error::{DirectiveError, Result};
use crate::model::{Directive, Namespace, Target};
use crate::reader::{MAX_VERSION, MIN_VERSION};
use crate::visitor::DirectiveVisitor;
use std::fmt::Write as _;

/// Serializes visited directives back into the text format
#[derive(Debug)]
pub struct DirectiveWriter {
    version: u32,
    header_written: bool,
    out: String,
}

impl DirectiveWriter {
    pub fn new(version: u32) -> Result<Self> {
        if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
            return Err(DirectiveError::unwritable(format!(
                "unsupported version v{version}"
            )));
        }
        Ok(Self {
            version,
            header_written: false,
            out: String::new(),
        })
    }

    #[must_use]
    pub fn write(self) -> Vec<u8> {
        self.out.into_bytes()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }
}

impl DirectiveVisitor for DirectiveWriter {
    fn visit_header(&mut self, namespace: Namespace) -> Result<()> {
        if self.header_written {
            return Err(DirectiveError::unwritable("header already written"));
        }
        let _ = writeln!(self.out, "accessWidener\tv{}\t{namespace}", self.version);
        self.header_written = true;
        Ok(())
    }

    fn visit_directive(&mut self, directive: Directive) -> Result<()> {
        if !self.header_written {
            return Err(DirectiveError::unwritable("directive before header"));
        }
        if directive.transitive && self.version < 2 {
            return Err(DirectiveError::unwritable(format!(
                "transitive {} needs v2",
                directive.target
            )));
        }

        let prefix = if directive.transitive {
            "transitive-"
        } else {
            ""
        };
        let _ = match &directive.target {
            Target::Class { owner } => {
                writeln!(self.out, "{prefix}{}\tclass\t{owner}", directive.access)
            }
            Target::Method(m) => writeln!(
                self.out,
                "{prefix}{}\tmethod\t{}\t{}\t{}",
                directive.access, m.owner, m.name, m.descriptor
            ),
            Target::Field(m) => writeln!(
                self.out,
                "{prefix}{}\tfield\t{}\t{}\t{}",
                directive.access, m.owner, m.name, m.descriptor
            ),
        };
        Ok(())
    }
}
