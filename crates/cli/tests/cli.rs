use assert_cmd::Command;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use widen_classfile::access::{ACC_FINAL, ACC_PRIVATE, ACC_PUBLIC};
use widen_classfile::synth::ClassFileBuilder;
use widen_classfile::ClassLayout;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

#[allow(deprecated)]
fn widen(args: &[&str]) -> (bool, Vec<u8>, String) {
    let output = Command::cargo_bin("widen")
        .expect("binary")
        .arg("--quiet")
        .args(args)
        .output()
        .expect("command run");
    (
        output.status.success(),
        output.stdout,
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

fn json(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).expect("valid json")
}

fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

fn gear_class() -> Vec<u8> {
    ClassFileBuilder::new("net/minecraft/Gear", ACC_PUBLIC | ACC_FINAL)
        .field("teeth", "I", ACC_PRIVATE | ACC_FINAL)
        .build()
}

/// A dependency mod with a transitive widener, plus the intermediary platform jar
fn setup(root: &Path) -> (PathBuf, PathBuf) {
    let mods = root.join("mods");
    fs::create_dir_all(&mods).unwrap();
    write_jar(
        &mods.join("gears.jar"),
        &[
            (
                "fabric.mod.json",
                br#"{"id": "gears", "accessWidener": "gears.accesswidener"}"#.to_vec(),
            ),
            (
                "gears.accesswidener",
                b"accessWidener v2 intermediary\n\
                  transitive-mutable field net/minecraft/Gear teeth I\n\
                  accessible class net/minecraft/Hidden\n"
                    .to_vec(),
            ),
        ],
    );

    let platform = root.join("minecraft-intermediary.jar");
    write_jar(&platform, &[("net/minecraft/Gear.class", gear_class())]);
    (mods, platform)
}

#[test]
fn check_summarises_a_widener() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("example.accesswidener");
    fs::write(
        &file,
        "accessWidener v2 named\n\
         # comment\n\
         accessible class com/example/Foo\n\
         transitive-extendable class com/example/Foo\n\
         transitive-mutable field com/example/Foo count I\n",
    )
    .unwrap();

    let (ok, stdout, _) = widen(&["check", file.to_str().unwrap()]);
    assert!(ok);
    let report = json(&stdout);
    assert_eq!(report["version"], 2);
    assert_eq!(report["namespace"], "named");
    assert_eq!(report["directives"], 3);
    assert_eq!(report["transitive"], 2);
    assert_eq!(report["targets"], 2);
}

#[test]
fn check_rejects_malformed_files() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("broken.accesswidener");
    fs::write(&file, "accessWidener v1 named\ntransitive-accessible class a/B\n").unwrap();

    let (ok, _, stderr) = widen(&["check", file.to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("Malformed"), "stderr: {stderr}");
}

#[test]
fn key_is_null_without_transitive_wideners() {
    let temp = tempdir().unwrap();
    let (ok, stdout, _) = widen(&["key", "--classpath", temp.path().to_str().unwrap()]);
    assert!(ok);
    assert_eq!(json(&stdout), Value::Null);
}

#[test]
fn discover_key_and_apply() {
    let temp = tempdir().unwrap();
    let (mods, platform) = setup(temp.path());
    let mods = mods.to_str().unwrap();
    let platform = platform.to_str().unwrap();

    let (ok, stdout, stderr) = widen(&["discover", "--classpath", mods]);
    assert!(ok, "stderr: {stderr}");
    let files = json(&stdout);
    assert_eq!(files.as_array().unwrap().len(), 1);
    assert_eq!(files[0]["origin_id"], "gears");
    assert_eq!(files[0]["version"], 2);

    let (ok, stdout, _) = widen(&["key", "--classpath", mods]);
    assert!(ok);
    let key = json(&stdout);
    assert!(key
        .as_str()
        .unwrap()
        .starts_with("widen:transitive_access_wideners:"));

    let target = temp.path().join("named.jar");
    write_jar(&target, &[("net/minecraft/Gear.class", gear_class())]);
    let (ok, stdout, stderr) = widen(&[
        "apply",
        target.to_str().unwrap(),
        "--classpath",
        mods,
        "--namespace-jar",
        platform,
    ]);
    assert!(ok, "stderr: {stderr}");
    let report = json(&stdout);
    assert_eq!(report["changed"], true);
    assert_eq!(report["cache_identity"], key);

    let mut bytes = Vec::new();
    ZipArchive::new(File::open(&target).unwrap())
        .unwrap()
        .by_name("net/minecraft/Gear.class")
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    let gear = ClassLayout::parse(&bytes).unwrap();
    assert_eq!(gear.access.flags, ACC_PUBLIC | ACC_FINAL);
    assert_eq!(gear.field("teeth", "I").unwrap().access.flags, ACC_PRIVATE);
}

#[test]
fn apply_fails_on_unresolvable_symbols() {
    let temp = tempdir().unwrap();
    let (mods, _) = setup(temp.path());
    let target = temp.path().join("named.jar");
    write_jar(&target, &[("net/minecraft/Gear.class", gear_class())]);

    // No namespace jars: nothing on the source classpath resolves.
    let (ok, _, stderr) = widen(&[
        "apply",
        target.to_str().unwrap(),
        "--classpath",
        mods.to_str().unwrap(),
    ]);
    assert!(!ok);
    assert!(stderr.contains("Unresolved"), "stderr: {stderr}");
}

#[test]
fn srg_without_forge_is_rejected() {
    let (ok, _, stderr) = widen(&["discover", "--from", "srg"]);
    assert!(!ok);
    assert!(stderr.contains("Forge"), "stderr: {stderr}");
}
