use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use widen_classfile::access::{ACC_PRIVATE, ACC_PUBLIC};
use widen_classfile::synth::ClassFileBuilder;
use widen_directive::{Access, DirectiveReader, DirectiveSet, Namespace, Target};
use widen_remap::{MappingsEngine, RemapError, RemappingVisitor, ResolverSession};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const TINY: &str = "tiny\t2\t0\tofficial\tintermediary\tnamed\n\
c\ta\tnet/minecraft/class_1\tnet/minecraft/entity/Entity\n\
\tm\t()V\tb\tmethod_1\ttick\n\
\tf\tI\tc\tfield_1\tage\n\
c\td\tnet/minecraft/class_2\tnet/minecraft/entity/Zombie\n";

fn write_jar(dir: &Path, name: &str, classes: Vec<(&str, Vec<u8>)>) -> PathBuf {
    let path = dir.join(name);
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    for (entry, bytes) in classes {
        zip.start_file(entry, SimpleFileOptions::default()).unwrap();
        zip.write_all(&bytes).unwrap();
    }
    zip.finish().unwrap();
    path
}

fn minecraft_jar(dir: &Path) -> PathBuf {
    write_jar(
        dir,
        "minecraft-intermediary.jar",
        vec![
            (
                "net/minecraft/class_1.class",
                ClassFileBuilder::new("net/minecraft/class_1", ACC_PUBLIC)
                    .method("method_1", "()V", ACC_PUBLIC)
                    .field("field_1", "I", ACC_PRIVATE)
                    .build(),
            ),
            (
                "net/minecraft/class_2.class",
                ClassFileBuilder::new("net/minecraft/class_2", ACC_PUBLIC)
                    .super_class("net/minecraft/class_1")
                    .method("helper", "(Lnet/minecraft/class_1;)V", ACC_PRIVATE)
                    .build(),
            ),
        ],
    )
}

fn remap(
    engine: &MappingsEngine,
    classpath: &[PathBuf],
    content: &str,
) -> widen_directive::Result<DirectiveSet> {
    let session = ResolverSession::open(
        engine,
        Namespace::Intermediary,
        Namespace::Named,
        classpath,
    )
    .unwrap();
    let visitor = RemappingVisitor::new(
        DirectiveSet::new(),
        session.resolver(),
        Namespace::Intermediary,
        Namespace::Named,
    )
    .with_origin("zombiemod");
    let mut reader = DirectiveReader::new(visitor);
    reader.read(content.as_bytes())?;
    let set = reader.into_inner().into_inner();
    session.finish().unwrap();
    Ok(set)
}

#[test]
fn remaps_directives_against_a_classpath_jar() {
    let dir = TempDir::new().unwrap();
    let jar = minecraft_jar(dir.path());
    let engine = MappingsEngine::from_tiny(TINY);

    let set = remap(
        &engine,
        &[jar],
        "accessWidener v2 intermediary\n\
         transitive-accessible method net/minecraft/class_2 method_1 ()V\n\
         transitive-mutable field net/minecraft/class_1 field_1 I\n\
         accessible method net/minecraft/class_2 helper (Lnet/minecraft/class_1;)V\n",
    )
    .unwrap();

    assert_eq!(set.namespace(), Some(Namespace::Named));
    let tick = Target::method("net/minecraft/entity/Zombie", "tick", "()V");
    assert!(set.get(&tick).unwrap().access.contains(Access::Accessible));
    let age = Target::field("net/minecraft/entity/Entity", "age", "I");
    assert!(set.get(&age).unwrap().access.contains(Access::Mutable));
    let helper = Target::method(
        "net/minecraft/entity/Zombie",
        "helper",
        "(Lnet/minecraft/entity/Entity;)V",
    );
    assert!(set.get(&helper).unwrap().transitive.is_empty());
}

#[test]
fn members_missing_from_the_classpath_are_unresolved() {
    let dir = TempDir::new().unwrap();
    let jar = minecraft_jar(dir.path());
    let engine = MappingsEngine::from_tiny(TINY);

    let err = remap(
        &engine,
        &[jar],
        "accessWidener v2 intermediary\n\
         accessible method net/minecraft/class_2 method_404 ()V\n",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        widen_directive::DirectiveError::UnresolvedSymbol { .. }
    ));
}

#[test]
fn engine_reports_missing_namespaces() {
    let engine = MappingsEngine::from_tiny("tiny\t2\t0\tofficial\tnamed\n");
    let err = ResolverSession::open(&engine, Namespace::Intermediary, Namespace::Named, &[])
        .err()
        .unwrap();
    assert!(matches!(err, RemapError::MissingNamespace(Namespace::Intermediary)));
}
