use crate::error::{RemapError, Result};
use crate::resolver::{ResolvedMember, SymbolResolver};
use std::collections::HashMap;
use std::path::Path;
use widen_directive::{MemberRef, Namespace};

/// Rewrite every `L<class>;` reference in a field or method descriptor
pub fn remap_descriptor<'a>(
    descriptor: &str,
    mut map_class: impl FnMut(&str) -> Option<&'a str>,
) -> String {
    let mut out = String::with_capacity(descriptor.len());
    let mut rest = descriptor;
    while let Some(start) = rest.find('L') {
        out.push_str(&rest[..=start]);
        let tail = &rest[start + 1..];
        match tail.find(';') {
            Some(end) => {
                let class = &tail[..end];
                out.push_str(map_class(class).unwrap_or(class));
                out.push(';');
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Class and member names from a source namespace to a target namespace.
///
/// Member keys use source-namespace owner, name and descriptor.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    source: Option<Namespace>,
    target: Option<Namespace>,
    classes: HashMap<String, String>,
    methods: HashMap<MemberRef, String>,
    fields: HashMap<MemberRef, String>,
}

impl MappingTable {
    #[must_use]
    pub fn new(source: Namespace, target: Namespace) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn source(&self) -> Option<Namespace> {
        self.source
    }

    #[must_use]
    pub const fn target(&self) -> Option<Namespace> {
        self.target
    }

    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn add_class(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.classes.insert(from.into(), to.into());
    }

    pub fn add_method(&mut self, owner: &str, name: &str, descriptor: &str, to: impl Into<String>) {
        self.methods
            .insert(MemberRef::new(owner, name, descriptor), to.into());
    }

    pub fn add_field(&mut self, owner: &str, name: &str, descriptor: &str, to: impl Into<String>) {
        self.fields
            .insert(MemberRef::new(owner, name, descriptor), to.into());
    }

    #[must_use]
    pub fn map_class(&self, name: &str) -> Option<&str> {
        self.classes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn map_method(&self, owner: &str, name: &str, descriptor: &str) -> Option<&str> {
        self.methods
            .get(&MemberRef::new(owner, name, descriptor))
            .map(String::as_str)
    }

    #[must_use]
    pub fn map_field(&self, owner: &str, name: &str, descriptor: &str) -> Option<&str> {
        self.fields
            .get(&MemberRef::new(owner, name, descriptor))
            .map(String::as_str)
    }

    #[must_use]
    pub fn remap_descriptor(&self, descriptor: &str) -> String {
        remap_descriptor(descriptor, |class| self.map_class(class))
    }

    pub fn load_tiny(path: &Path, source: Namespace, target: Namespace) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_tiny_str(&text, source, target)
    }

    /// Parse Tiny v2 mappings, selecting the `source` and `target` columns.
    ///
    /// Descriptors in the file are written in the first namespace column and are translated to
    /// `source` for the lookup keys. An empty name cell falls back to the first column.
    pub fn from_tiny_str(text: &str, source: Namespace, target: Namespace) -> Result<Self> {
        let mut lines = text.lines().enumerate();
        let (_, header) = lines
            .next()
            .ok_or_else(|| RemapError::mappings(1, "empty mappings"))?;
        let columns: Vec<&str> = header.split('\t').collect();
        if columns.len() < 5 || columns[0] != "tiny" || columns[1] != "2" {
            return Err(RemapError::mappings(1, "expected a tiny v2 header"));
        }
        let namespaces = &columns[3..];
        let column_of = |ns: Namespace| {
            namespaces
                .iter()
                .position(|name| *name == ns.as_str())
                .ok_or(RemapError::MissingNamespace(ns))
        };
        let source_col = column_of(source)?;
        let target_col = column_of(target)?;

        let mut rows = Vec::new();
        let mut current_class: Option<Vec<String>> = None;
        for (idx, line) in lines {
            let line_no = idx + 1;
            let depth = line.chars().take_while(|c| *c == '\t').count();
            let cells: Vec<&str> = line[depth..].split('\t').collect();
            match (depth, cells.first().copied()) {
                (0, Some("c")) => {
                    let names = expand_names(&cells[1..], namespaces.len(), line_no)?;
                    rows.push(Row::Class(names.clone()));
                    current_class = Some(names);
                }
                (1, Some(kind @ ("m" | "f"))) => {
                    let owner = current_class
                        .as_ref()
                        .ok_or_else(|| RemapError::mappings(line_no, "member outside a class"))?;
                    let descriptor = cells
                        .get(1)
                        .ok_or_else(|| RemapError::mappings(line_no, "missing descriptor"))?;
                    let names = expand_names(&cells[2..], namespaces.len(), line_no)?;
                    let member = MemberRow {
                        owner: owner[0].clone(),
                        descriptor: (*descriptor).to_string(),
                        names,
                    };
                    rows.push(if kind == "m" {
                        Row::Method(member)
                    } else {
                        Row::Field(member)
                    });
                }
                (0, Some("")) | (0, None) => {}
                (0, Some(other)) => {
                    return Err(RemapError::mappings(
                        line_no,
                        format!("unknown section '{other}'"),
                    ));
                }
                // Comments, parameters, locals and header properties
                _ => {}
            }
        }

        let mut first_to_source = HashMap::new();
        let mut table = Self::new(source, target);
        for row in &rows {
            if let Row::Class(names) = row {
                first_to_source.insert(names[0].clone(), names[source_col].clone());
                table.add_class(names[source_col].clone(), names[target_col].clone());
            }
        }

        let owner_in_source =
            |owner: &str| first_to_source.get(owner).cloned().unwrap_or_else(|| owner.to_string());
        for row in rows {
            match row {
                Row::Class(_) => {}
                Row::Method(member) => {
                    let descriptor = remap_descriptor(&member.descriptor, |class| {
                        first_to_source.get(class).map(String::as_str)
                    });
                    table.add_method(
                        &owner_in_source(&member.owner),
                        &member.names[source_col],
                        &descriptor,
                        member.names[target_col].clone(),
                    );
                }
                Row::Field(member) => {
                    let descriptor = remap_descriptor(&member.descriptor, |class| {
                        first_to_source.get(class).map(String::as_str)
                    });
                    table.add_field(
                        &owner_in_source(&member.owner),
                        &member.names[source_col],
                        &descriptor,
                        member.names[target_col].clone(),
                    );
                }
            }
        }

        log::debug!(
            "Loaded {} classes, {} methods, {} fields for {source}->{target}",
            table.classes.len(),
            table.methods.len(),
            table.fields.len()
        );
        Ok(table)
    }
}

/// A table on its own resolves exactly the symbols it maps
impl SymbolResolver for MappingTable {
    fn resolve_class(&self, owner: &str) -> Option<String> {
        self.map_class(owner).map(str::to_string)
    }

    fn resolve_method(&self, owner: &str, name: &str, descriptor: &str) -> Option<ResolvedMember> {
        self.map_method(owner, name, descriptor)
            .map(|mapped| ResolvedMember::new(mapped, self.remap_descriptor(descriptor)))
    }

    fn resolve_field(&self, owner: &str, name: &str, descriptor: &str) -> Option<ResolvedMember> {
        self.map_field(owner, name, descriptor)
            .map(|mapped| ResolvedMember::new(mapped, self.remap_descriptor(descriptor)))
    }
}

enum Row {
    Class(Vec<String>),
    Method(MemberRow),
    Field(MemberRow),
}

struct MemberRow {
    owner: String,
    descriptor: String,
    names: Vec<String>,
}

fn expand_names(cells: &[&str], expected: usize, line: usize) -> Result<Vec<String>> {
    if cells.len() != expected || cells[0].is_empty() {
        return Err(RemapError::mappings(
            line,
            format!("expected {expected} names, got {}", cells.len()),
        ));
    }
    Ok(cells
        .iter()
        .map(|name| {
            if name.is_empty() {
                cells[0].to_string()
            } else {
                (*name).to_string()
            }
        })
        .collect())
}
