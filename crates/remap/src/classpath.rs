use crate::error::{RemapError, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use widen_classfile::{class_name_for_entry, ClassLayout};
use zip::ZipArchive;

/// Declared members and supertypes of one class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassInfo {
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: HashSet<(String, String)>,
    pub fields: HashSet<(String, String)>,
}

impl ClassInfo {
    #[must_use]
    pub fn declares_method(&self, name: &str, descriptor: &str) -> bool {
        self.methods
            .iter()
            .any(|(n, d)| n == name && d == descriptor)
    }

    #[must_use]
    pub fn declares_field(&self, name: &str, descriptor: &str) -> bool {
        self.fields.iter().any(|(n, d)| n == name && d == descriptor)
    }
}

impl From<ClassLayout> for ClassInfo {
    fn from(layout: ClassLayout) -> Self {
        Self {
            super_name: layout.super_name,
            interfaces: layout.interfaces,
            methods: layout
                .methods
                .into_iter()
                .map(|m| (m.name, m.descriptor))
                .collect(),
            fields: layout
                .fields
                .into_iter()
                .map(|f| (f.name, f.descriptor))
                .collect(),
        }
    }
}

/// Type hierarchy of every class on a classpath
#[derive(Debug, Clone, Default)]
pub struct ClassPathIndex {
    classes: HashMap<String, ClassInfo>,
}

impl ClassPathIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_jars(paths: &[PathBuf]) -> Result<Self> {
        let mut index = Self::new();
        for path in paths {
            index.add_jar(path)?;
        }
        log::debug!(
            "Indexed {} classes from {} jars",
            index.len(),
            paths.len()
        );
        Ok(index)
    }

    /// Index every class in a jar. Missing paths and directories are skipped.
    pub fn add_jar(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            log::debug!("Skipping classpath entry {} (not a file)", path.display());
            return Ok(());
        }

        let file = File::open(path)?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|err| RemapError::archive(path, err))?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|err| RemapError::archive(path, err))?;
            if entry.is_dir() || class_name_for_entry(entry.name()).is_none() {
                continue;
            }

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            match ClassLayout::parse(&bytes) {
                Ok(layout) => self.insert(layout),
                Err(err) => log::warn!(
                    "Skipping unreadable class {} in {}: {err}",
                    entry.name(),
                    path.display()
                ),
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, layout: ClassLayout) {
        let name = layout.name.clone();
        self.classes.entry(name).or_insert_with(|| layout.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
    }

    /// `name` followed by its supertypes, breadth first, each listed once.
    /// Supertypes missing from the index end their branch.
    #[must_use]
    pub fn hierarchy<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([name]);

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            if let Some(info) = self.classes.get(current) {
                queue.extend(info.super_name.as_deref());
                queue.extend(info.interfaces.iter().map(String::as_str));
            }
        }
        order
    }
}
