use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

const MANIFEST_JSON: &str = r#"{ "entries": [
    { "source": "popup", "target": "popup", "kind": "dir" },
    { "source": "manifest.json", "target": "manifest.json", "kind": "file" }
] }"#;

#[test]
fn test_cli_pack_and_reopen_cycle() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup: a small package root plus a manifest describing it
    let root = tempdir()?;
    write_file(&root.path().join("popup/popup.html"), "<html></html>\n");
    write_file(&root.path().join("popup/popup.js"), "console.log('hi');\n");
    write_file(&root.path().join("manifest.json"), "{\"manifest_version\": 2}\n");
    let manifest_path = root.path().join("include.json");
    write_file(&manifest_path, MANIFEST_JSON);

    let out_dir = tempdir()?;
    let archive_path = out_dir.path().join("extension.xpi");

    // 2. Pack
    let mut cmd = Command::cargo_bin("xpipack")?;
    cmd.arg("pack")
        .arg("--root")
        .arg(root.path())
        .arg("--manifest")
        .arg(&manifest_path)
        .arg("--output")
        .arg(&archive_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[pack] wrote"));

    assert!(archive_path.exists());

    // 3. Reopen the archive and verify layout and contents
    let mut archive = zip::ZipArchive::new(fs::File::open(&archive_path)?)?;
    let names: Vec<String> = archive.file_names().map(str::to_owned).collect();
    assert!(names.contains(&"popup/popup.html".to_string()));
    assert!(names.contains(&"popup/popup.js".to_string()));
    assert!(names.contains(&"manifest.json".to_string()));
    assert_eq!(names.len(), 3);

    let mut entry = archive.by_name("popup/popup.js")?;
    let mut data = String::new();
    std::io::Read::read_to_string(&mut entry, &mut data)?;
    assert_eq!(data, "console.log('hi');\n");

    Ok(())
}

#[test]
fn test_cli_pack_missing_source_aborts() -> Result<(), Box<dyn std::error::Error>> {
    // Empty root: the built-in manifest's first entry is already missing
    let root = tempdir()?;
    let archive_path = root.path().join("build/extension.xpi");

    let mut cmd = Command::cargo_bin("xpipack")?;
    cmd.arg("pack").arg("--root").arg(root.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Source path not found"));

    assert!(!archive_path.exists());
    Ok(())
}

#[test]
fn test_cli_pack_duplicate_target_fails() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    write_file(&root.path().join("a.css"), "body {}\n");
    write_file(&root.path().join("b.css"), "html {}\n");
    let manifest_path = root.path().join("include.json");
    write_file(
        &manifest_path,
        r#"{ "entries": [
            { "source": "a.css", "target": "style.css", "kind": "file" },
            { "source": "b.css", "target": "style.css", "kind": "file" }
        ] }"#,
    );

    let mut cmd = Command::cargo_bin("xpipack")?;
    cmd.arg("pack")
        .arg("--root")
        .arg(root.path())
        .arg("--manifest")
        .arg(&manifest_path)
        .arg("--quiet");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate archive entry 'style.css'"));

    assert!(!root.path().join("build/extension.xpi").exists());
    Ok(())
}

#[test]
fn test_cli_plan_lists_without_writing() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    write_file(&root.path().join("popup/popup.html"), "<html></html>\n");
    write_file(&root.path().join("manifest.json"), "{}\n");
    let manifest_path = root.path().join("include.json");
    write_file(&manifest_path, MANIFEST_JSON);

    let mut cmd = Command::cargo_bin("xpipack")?;
    cmd.arg("plan")
        .arg("--root")
        .arg(root.path())
        .arg("--manifest")
        .arg(&manifest_path);
    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("dir  popup -> popup")
                .and(predicate::str::contains("file manifest.json -> manifest.json")),
        );

    assert!(!root.path().join("build").exists());
    Ok(())
}

#[test]
fn test_cli_quiet_suppresses_progress() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    write_file(&root.path().join("manifest.json"), "{}\n");
    let manifest_path = root.path().join("include.json");
    write_file(
        &manifest_path,
        r#"{ "entries": [ { "source": "manifest.json", "target": "manifest.json", "kind": "file" } ] }"#,
    );

    let mut cmd = Command::cargo_bin("xpipack")?;
    cmd.arg("pack")
        .arg("--root")
        .arg(root.path())
        .arg("--manifest")
        .arg(&manifest_path)
        .arg("--quiet");
    cmd.assert().success().stdout(predicate::str::is_empty());

    Ok(())
}

#[test]
fn test_cli_rejects_escaping_manifest_path() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let manifest_path = root.path().join("include.json");
    write_file(
        &manifest_path,
        r#"{ "entries": [ { "source": "../outside", "target": "outside", "kind": "file" } ] }"#,
    );

    let mut cmd = Command::cargo_bin("xpipack")?;
    cmd.arg("pack")
        .arg("--root")
        .arg(root.path())
        .arg("--manifest")
        .arg(&manifest_path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must be relative"));

    Ok(())
}
