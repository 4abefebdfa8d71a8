use crate::error::{DirectiveError, Result};
use crate::model::{Access, Directive, Namespace, Target, TargetKind};
use crate::visitor::DirectiveVisitor;

const HEADER_MAGIC: &str = "accessWidener";
const TRANSITIVE_PREFIX: &str = "transitive-";

/// Oldest and newest format versions this reader understands
pub const MIN_VERSION: u32 = 1;
pub const MAX_VERSION: u32 = 2;

/// Parsed header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub namespace: Namespace,
}

/// Streams the directives of a file into a visitor
pub struct DirectiveReader<V> {
    visitor: V,
}

impl<V: DirectiveVisitor> DirectiveReader<V> {
    pub const fn new(visitor: V) -> Self {
        Self { visitor }
    }

    /// Parse `content`, visiting the header and then every directive in file order
    pub fn read(&mut self, content: &[u8]) -> Result<()> {
        self.read_inner(content, None)
    }

    /// Like [`Self::read`], but the header must declare `namespace`
    pub fn read_expecting(&mut self, content: &[u8], namespace: Namespace) -> Result<()> {
        self.read_inner(content, Some(namespace))
    }

    pub fn into_inner(self) -> V {
        self.visitor
    }

    fn read_inner(&mut self, content: &[u8], expected: Option<Namespace>) -> Result<()> {
        let text = decode(content)?;
        let mut lines = significant_lines(text);

        let (line_no, header_tokens) = lines.next().ok_or_else(missing_header)?;
        let header = parse_header(line_no, &header_tokens)?;

        if let Some(expected) = expected {
            if expected != header.namespace {
                return Err(DirectiveError::NamespaceMismatch {
                    expected,
                    found: header.namespace,
                });
            }
        }

        self.visitor.visit_header(header.namespace)?;

        let mut count = 0usize;
        for (line_no, tokens) in lines {
            let directive = parse_directive(line_no, &tokens, header.version)?;
            self.visitor.visit_directive(directive)?;
            count += 1;
        }

        log::debug!(
            "Read {count} directives (v{}, {})",
            header.version,
            header.namespace
        );
        Ok(())
    }
}

/// Read only the header of a directive file
pub fn read_header(content: &[u8]) -> Result<Header> {
    let text = decode(content)?;
    let (line_no, tokens) = first_line(text)?;
    parse_header(line_no, &tokens)
}

/// Read the declared format version without parsing the namespace or the body
pub fn read_version(content: &[u8]) -> Result<u32> {
    let text = decode(content)?;
    let (line_no, tokens) = first_line(text)?;
    parse_version(line_no, &tokens)
}

fn decode(content: &[u8]) -> Result<&str> {
    std::str::from_utf8(content)
        .map_err(|err| DirectiveError::malformed(0, format!("not valid UTF-8: {err}")))
}

/// Non-empty lines with comments stripped, paired with their 1-based line number
fn significant_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(idx, raw)| {
        let line = raw.split_once('#').map_or(raw, |(before, _)| before);
        let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
        (!tokens.is_empty()).then_some((idx + 1, tokens))
    })
}

fn first_line(text: &str) -> Result<(usize, Vec<&str>)> {
    significant_lines(text).next().ok_or_else(missing_header)
}

fn missing_header() -> DirectiveError {
    DirectiveError::malformed(0, "missing header")
}

fn parse_header(line: usize, tokens: &[&str]) -> Result<Header> {
    let version = parse_version(line, tokens)?;
    if tokens.len() != 3 {
        return Err(DirectiveError::malformed(
            line,
            format!("expected '{HEADER_MAGIC} v<N> <namespace>' header"),
        ));
    }

    let namespace = tokens[2]
        .parse::<Namespace>()
        .map_err(|err| DirectiveError::malformed(line, err))?;

    Ok(Header { version, namespace })
}

/// Checks the magic and version tokens only
fn parse_version(line: usize, tokens: &[&str]) -> Result<u32> {
    if tokens.len() < 2 || tokens[0] != HEADER_MAGIC {
        return Err(DirectiveError::malformed(
            line,
            format!("expected '{HEADER_MAGIC} v<N> <namespace>' header"),
        ));
    }

    let version = tokens[1]
        .strip_prefix('v')
        .and_then(|digits| digits.parse::<u32>().ok())
        .ok_or_else(|| {
            DirectiveError::malformed(line, format!("invalid version token '{}'", tokens[1]))
        })?;
    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return Err(DirectiveError::malformed(
            line,
            format!("unsupported version v{version}"),
        ));
    }

    Ok(version)
}

fn parse_directive(line: usize, tokens: &[&str], version: u32) -> Result<Directive> {
    let (access_token, transitive) = match tokens[0].strip_prefix(TRANSITIVE_PREFIX) {
        Some(_) if version < 2 => {
            return Err(DirectiveError::malformed(
                line,
                format!("transitive access requires v2, file declares v{version}"),
            ));
        }
        Some(rest) => (rest, true),
        None => (tokens[0], false),
    };

    let access = Access::from_token(access_token).ok_or_else(|| {
        DirectiveError::malformed(line, format!("unknown access '{}'", tokens[0]))
    })?;

    let kind_token = tokens
        .get(1)
        .ok_or_else(|| DirectiveError::malformed(line, "missing target kind"))?;
    let kind = TargetKind::from_token(kind_token)
        .ok_or_else(|| DirectiveError::malformed(line, format!("unknown target '{kind_token}'")))?;

    if !access.applies_to(kind) {
        return Err(DirectiveError::malformed(
            line,
            format!("{access} cannot be applied to a {kind}"),
        ));
    }

    let operands = &tokens[2..];
    let target = match (kind, operands) {
        (TargetKind::Class, [owner]) => Target::class(*owner),
        (TargetKind::Method, [owner, name, descriptor]) => {
            Target::method(*owner, *name, *descriptor)
        }
        (TargetKind::Field, [owner, name, descriptor]) => {
            Target::field(*owner, *name, *descriptor)
        }
        (TargetKind::Class, _) => {
            return Err(DirectiveError::malformed(
                line,
                format!("class expects 1 operand, got {}", operands.len()),
            ));
        }
        (_, _) => {
            return Err(DirectiveError::malformed(
                line,
                format!("{kind} expects 3 operands, got {}", operands.len()),
            ));
        }
    };

    Ok(Directive::new(target, access, transitive))
}
