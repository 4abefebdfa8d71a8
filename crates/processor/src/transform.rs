//! Application of a merged directive set to the class files of an archive.

use crate::error::{ProcessorError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use widen_classfile::access::{
    make_final_if_private, make_protected, make_public, remove_final, ACC_INTERFACE,
};
use widen_classfile::{class_name_for_entry, write_flags, ClassLayout};
use widen_directive::{Access, AccessSet, DirectiveSet, Target};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Accesses requested for one class and its members
#[derive(Debug, Clone, Default)]
struct ClassPlan {
    access: AccessSet,
    methods: HashMap<(String, String), AccessSet>,
    fields: HashMap<(String, String), AccessSet>,
}

/// Rewrites access flags of the classes a directive set names.
///
/// Widening only adds access, so applying the same transformer twice leaves the second pass
/// with nothing to change.
#[derive(Debug, Clone)]
pub struct JarTransformer {
    classes: HashMap<String, ClassPlan>,
    /// Target classes plus every enclosing class whose `InnerClasses` entry may need patching
    touched: HashSet<String>,
}

impl JarTransformer {
    pub fn new(directives: &DirectiveSet) -> Result<Self> {
        if directives.is_empty() {
            return Err(ProcessorError::Precondition(
                "cannot transform with an empty directive set",
            ));
        }

        let mut classes: HashMap<String, ClassPlan> = HashMap::new();
        for (target, grant) in directives.iter() {
            let plan = classes.entry(target.owner().to_string()).or_default();
            match target {
                Target::Class { .. } => {
                    plan.access = plan.access.union(grant.access);
                }
                Target::Method(member) => {
                    let implied = if grant.access.contains(Access::Extendable) {
                        Access::Extendable
                    } else {
                        Access::Accessible
                    };
                    plan.access = plan.access.with(implied);
                    let key = (member.name.clone(), member.descriptor.clone());
                    let methods = plan.methods.entry(key).or_default();
                    *methods = methods.union(grant.access);
                }
                Target::Field(member) => {
                    plan.access = plan.access.with(Access::Accessible);
                    let key = (member.name.clone(), member.descriptor.clone());
                    let fields = plan.fields.entry(key).or_default();
                    *fields = fields.union(grant.access);
                }
            }
        }

        let mut touched = HashSet::new();
        for owner in classes.keys() {
            touched.insert(owner.clone());
            for (idx, _) in owner.match_indices('$') {
                touched.insert(owner[..idx].to_string());
            }
        }

        Ok(Self { classes, touched })
    }

    /// Whether the class file for `class_name` may need rewriting
    #[must_use]
    pub fn touches(&self, class_name: &str) -> bool {
        self.touched.contains(class_name)
    }

    /// Widen the flags of one class file in place. Returns whether any byte changed.
    pub fn transform_class(&self, bytes: &mut [u8]) -> widen_classfile::Result<bool> {
        let layout = ClassLayout::parse(bytes)?;
        let mut changed = false;

        if let Some(plan) = self.classes.get(&layout.name) {
            let flags = widen_class_flags(layout.access.flags, plan.access);
            changed |= write_flags(bytes, layout.access, flags)?;

            let interface = layout.access.flags & ACC_INTERFACE != 0;
            for ((name, descriptor), access) in &plan.methods {
                match layout.method(name, descriptor) {
                    Some(method) => {
                        let flags =
                            widen_method_flags(method.access.flags, name, *access, interface);
                        changed |= write_flags(bytes, method.access, flags)?;
                    }
                    None => log::debug!("Method {}.{name}{descriptor} not found", layout.name),
                }
            }
            for ((name, descriptor), access) in &plan.fields {
                match layout.field(name, descriptor) {
                    Some(field) => {
                        let flags = widen_field_flags(field.access.flags, *access);
                        changed |= write_flags(bytes, field.access, flags)?;
                    }
                    None => log::debug!("Field {}.{name}:{descriptor} not found", layout.name),
                }
            }
        }

        for inner in &layout.inner_classes {
            if let Some(plan) = self.classes.get(&inner.inner_name) {
                let flags = widen_class_flags(inner.access.flags, plan.access);
                changed |= write_flags(bytes, inner.access, flags)?;
            }
        }

        Ok(changed)
    }

    /// Rewrite `archive` in place. Returns whether it changed.
    ///
    /// The new archive is written to a temporary file in the same directory and moved over the
    /// original only once complete; untouched entries are copied without recompression.
    pub fn apply(&self, archive: &Path) -> Result<bool> {
        let file = File::open(archive)?;
        let mut zip = ZipArchive::new(BufReader::new(file))
            .map_err(|err| ProcessorError::archive(archive, err))?;

        let mut patched: BTreeMap<usize, Vec<u8>> = BTreeMap::new();
        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|err| ProcessorError::archive(archive, err))?;
            if entry.is_dir() {
                continue;
            }
            let Some(class_name) = class_name_for_entry(entry.name()) else {
                continue;
            };
            if !self.touches(class_name) {
                continue;
            }

            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            if self
                .transform_class(&mut bytes)
                .map_err(|err| ProcessorError::class_file(&name, err))?
            {
                log::debug!("Widened access in {name}");
                patched.insert(i, bytes);
            }
        }

        if patched.is_empty() {
            log::info!("No access changes needed in {}", archive.display());
            return Ok(false);
        }
        let changed_entries = patched.len();

        let dir = archive
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = ZipWriter::new(temp.as_file_mut());
            for i in 0..zip.len() {
                let entry = zip
                    .by_index_raw(i)
                    .map_err(|err| ProcessorError::archive(archive, err))?;
                match patched.remove(&i) {
                    Some(bytes) => {
                        let mut options =
                            SimpleFileOptions::default().compression_method(entry.compression());
                        if let Some(mode) = entry.unix_mode() {
                            options = options.unix_permissions(mode);
                        }
                        if let Some(modified) = entry.last_modified() {
                            options = options.last_modified_time(modified);
                        }
                        let name = entry.name().to_string();
                        drop(entry);
                        writer
                            .start_file(name, options)
                            .map_err(|err| ProcessorError::archive(archive, err))?;
                        writer.write_all(&bytes)?;
                    }
                    None => writer
                        .raw_copy_file(entry)
                        .map_err(|err| ProcessorError::archive(archive, err))?,
                }
            }
            writer
                .finish()
                .map_err(|err| ProcessorError::archive(archive, err))?;
        }
        temp.persist(archive).map_err(|err| err.error)?;

        log::info!(
            "Widened access in {changed_entries} classes of {}",
            archive.display()
        );
        Ok(true)
    }
}

/// Accessible: public. Extendable: public and non-final.
fn widen_class_flags(flags: u16, access: AccessSet) -> u16 {
    if access.is_empty() {
        return flags;
    }
    let flags = make_public(flags);
    if access.contains(Access::Extendable) {
        remove_final(flags)
    } else {
        flags
    }
}

fn widen_method_flags(flags: u16, name: &str, access: AccessSet, interface: bool) -> u16 {
    let mut flags = flags;
    if access.contains(Access::Accessible) {
        if !interface {
            flags = make_final_if_private(flags, name);
        }
        flags = make_public(flags);
    }
    if access.contains(Access::Extendable) {
        flags = remove_final(make_protected(flags));
    }
    flags
}

fn widen_field_flags(flags: u16, access: AccessSet) -> u16 {
    let mut flags = flags;
    if access.contains(Access::Accessible) {
        flags = make_public(flags);
    }
    if access.contains(Access::Mutable) {
        flags = remove_final(flags);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use widen_classfile::access::{ACC_FINAL, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC};
    use widen_classfile::synth::ClassFileBuilder;
    use widen_directive::Directive;
    use zip::DateTime;

    fn transformer(directives: Vec<Directive>) -> JarTransformer {
        JarTransformer::new(&directives.into_iter().collect()).unwrap()
    }

    fn method(name: &str, access: Access) -> Directive {
        Directive::new(Target::method("com/example/Foo", name, "()V"), access, true)
    }

    fn field(name: &str, descriptor: &str, access: Access) -> Directive {
        Directive::new(Target::field("com/example/Foo", name, descriptor), access, true)
    }

    fn transform(transformer: &JarTransformer, bytes: &[u8]) -> (bool, ClassLayout) {
        let mut bytes = bytes.to_vec();
        let changed = transformer.transform_class(&mut bytes).unwrap();
        (changed, ClassLayout::parse(&bytes).unwrap())
    }

    #[test]
    fn empty_set_is_a_precondition_violation() {
        let err = JarTransformer::new(&DirectiveSet::new()).unwrap_err();
        assert!(matches!(err, ProcessorError::Precondition(_)));
    }

    #[test]
    fn class_rules() {
        let extendable = transformer(vec![Directive::new(
            Target::class("com/example/Foo"),
            Access::Extendable,
            true,
        )]);
        let class = ClassFileBuilder::new("com/example/Foo", ACC_FINAL).build();
        let (changed, layout) = transform(&extendable, &class);
        assert!(changed);
        assert_eq!(layout.access.flags, ACC_PUBLIC);

        let accessible = transformer(vec![Directive::new(
            Target::class("com/example/Foo"),
            Access::Accessible,
            true,
        )]);
        let (_, layout) = transform(&accessible, &class);
        assert_eq!(layout.access.flags, ACC_PUBLIC | ACC_FINAL);
    }

    #[test]
    fn method_rules() {
        let class = ClassFileBuilder::new("com/example/Foo", ACC_PUBLIC)
            .method("secret", "()V", ACC_PRIVATE)
            .method("helper", "()V", ACC_PRIVATE | ACC_STATIC)
            .method("bar", "()V", ACC_FINAL)
            .method("<init>", "()V", ACC_PRIVATE)
            .build();
        let t = transformer(vec![
            method("secret", Access::Accessible),
            method("helper", Access::Accessible),
            method("bar", Access::Extendable),
            method("<init>", Access::Accessible),
        ]);

        let (_, layout) = transform(&t, &class);
        let flags = |name: &str| layout.method(name, "()V").unwrap().access.flags;
        assert_eq!(flags("secret"), ACC_PUBLIC | ACC_FINAL);
        assert_eq!(flags("helper"), ACC_PUBLIC | ACC_STATIC);
        assert_eq!(flags("bar"), ACC_PROTECTED);
        assert_eq!(flags("<init>"), ACC_PUBLIC);
    }

    #[test]
    fn field_rules_and_implied_owner_access() {
        let class = ClassFileBuilder::new("com/example/Foo", 0)
            .field("count", "I", ACC_PRIVATE | ACC_FINAL)
            .field("limit", "J", ACC_PRIVATE | ACC_FINAL)
            .build();
        let t = transformer(vec![
            field("count", "I", Access::Accessible),
            field("count", "I", Access::Mutable),
            field("limit", "J", Access::Mutable),
        ]);

        let (_, layout) = transform(&t, &class);
        assert_eq!(layout.access.flags, ACC_PUBLIC);
        assert_eq!(layout.field("count", "I").unwrap().access.flags, ACC_PUBLIC);
        assert_eq!(layout.field("limit", "J").unwrap().access.flags, ACC_PRIVATE);
    }

    #[test]
    fn inner_class_entries_follow_the_inner_class() {
        let t = transformer(vec![Directive::new(
            Target::class("com/example/Outer$Inner"),
            Access::Extendable,
            true,
        )]);
        assert!(t.touches("com/example/Outer"));
        assert!(t.touches("com/example/Outer$Inner"));
        assert!(!t.touches("com/example/Other"));

        let outer = ClassFileBuilder::new("com/example/Outer", ACC_PUBLIC)
            .inner_class("com/example/Outer$Inner", ACC_PRIVATE | ACC_STATIC | ACC_FINAL)
            .build();
        let (changed, layout) = transform(&t, &outer);
        assert!(changed);
        assert_eq!(layout.access.flags, ACC_PUBLIC);
        assert_eq!(layout.inner_classes[0].access.flags, ACC_PUBLIC | ACC_STATIC);
    }

    #[test]
    fn second_pass_changes_nothing() {
        let class = ClassFileBuilder::new("com/example/Foo", 0)
            .method("secret", "()V", ACC_PRIVATE)
            .build();
        let t = transformer(vec![Directive::new(
            Target::method("com/example/Foo", "secret", "()V"),
            Access::Accessible,
            true,
        )]);

        let mut bytes = class;
        assert!(t.transform_class(&mut bytes).unwrap());
        let once = bytes.clone();
        assert!(!t.transform_class(&mut bytes).unwrap());
        assert_eq!(bytes, once);
    }

    #[test]
    fn missing_members_are_ignored() {
        let class = ClassFileBuilder::new("com/example/Foo", ACC_PUBLIC).build();
        let t = transformer(vec![Directive::new(
            Target::method("com/example/Foo", "gone", "()V"),
            Access::Accessible,
            true,
        )]);
        let (changed, _) = transform(&t, &class);
        assert!(!changed);
    }

    #[test]
    fn patched_entries_keep_their_timestamp() {
        let dir = TempDir::new().unwrap();
        let jar = dir.path().join("game.jar");
        let built = DateTime::from_date_and_time(2021, 7, 14, 9, 30, 0).unwrap();
        {
            let mut zip = ZipWriter::new(File::create(&jar).unwrap());
            let options = SimpleFileOptions::default().last_modified_time(built);
            zip.start_file("com/example/Foo.class", options).unwrap();
            let class = ClassFileBuilder::new("com/example/Foo", 0)
                .method("secret", "()V", ACC_PRIVATE)
                .build();
            zip.write_all(&class).unwrap();
            zip.finish().unwrap();
        }

        let t = transformer(vec![method("secret", Access::Accessible)]);
        assert!(t.apply(&jar).unwrap());

        let mut zip = ZipArchive::new(File::open(&jar).unwrap()).unwrap();
        let entry = zip.by_name("com/example/Foo.class").unwrap();
        assert_eq!(entry.last_modified(), Some(built));
    }
}
