//! End-to-end tests for the favsync binary.
//!
//! Stdout is a pipe here, so every command runs in JSON mode.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use plist::{Dictionary, Value};
use predicates::prelude::*;
use tempfile::TempDir;

const EDGE_DOC: &str = r#"{
    "checksum": "",
    "roots": {
        "bookmark_bar": {
            "id": "1", "name": "Bookmarks Bar", "type": "folder",
            "children": [
                {"id": "5", "name": "Work", "type": "folder", "children": [
                    {"id": "6", "name": "Tracker", "type": "url", "url": "https://tracker.example.com"}
                ]},
                {"id": "7", "name": "Docs", "type": "url", "url": "https://example.com/docs"}
            ]
        },
        "other": {"id": "2", "name": "Other Bookmarks", "type": "folder", "children": []},
        "synced": {"id": "3", "name": "Mobile Bookmarks", "type": "folder", "children": []}
    },
    "version": 1
}"#;

struct Rig {
    temp: TempDir,
    edge: PathBuf,
    safari: PathBuf,
}

impl Rig {
    fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let edge = temp.path().join("Bookmarks");
        let safari = temp.path().join("Bookmarks.plist");
        fs::write(&edge, EDGE_DOC).expect("write edge");
        write_safari(
            &safari,
            vec![
                folder("BookmarksBar", vec![leaf("News", "https://news.example.com")]),
                folder("com.apple.ReadingList", vec![]),
            ],
        );
        Self { temp, edge, safari }
    }

    fn cmd(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("favsync");
        cmd.env("HOME", self.temp.path())
            .env("FAVSYNC_ASSUME_CLOSED", "1")
            .env_remove("FAVSYNC_EDGE_BOOKMARKS")
            .env_remove("FAVSYNC_SAFARI_BOOKMARKS")
            .env_remove("RUST_LOG")
            .arg("--edge")
            .arg(&self.edge)
            .arg("--safari")
            .arg(&self.safari);
        cmd
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(args).output().expect("run favsync");
        assert!(
            output.status.success(),
            "favsync {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("json stdout")
    }
}

fn folder(title: &str, children: Vec<Value>) -> Value {
    let mut dict = Dictionary::new();
    dict.insert("WebBookmarkUUID".into(), Value::String(uuid::Uuid::new_v4().to_string().to_uppercase()));
    dict.insert("Title".into(), Value::String(title.into()));
    dict.insert("WebBookmarkType".into(), Value::String("WebBookmarkTypeList".into()));
    dict.insert("Children".into(), Value::Array(children));
    Value::Dictionary(dict)
}

fn leaf(title: &str, url: &str) -> Value {
    let mut uri = Dictionary::new();
    uri.insert("title".into(), Value::String(title.into()));
    let mut dict = Dictionary::new();
    dict.insert("WebBookmarkUUID".into(), Value::String(uuid::Uuid::new_v4().to_string().to_uppercase()));
    dict.insert("WebBookmarkType".into(), Value::String("WebBookmarkTypeLeaf".into()));
    dict.insert("URLString".into(), Value::String(url.into()));
    dict.insert("URIDictionary".into(), Value::Dictionary(uri));
    Value::Dictionary(dict)
}

fn write_safari(path: &Path, children: Vec<Value>) {
    let mut root = Dictionary::new();
    root.insert("Title".into(), Value::String(String::new()));
    root.insert("WebBookmarkFileVersion".into(), Value::Integer(1_u64.into()));
    root.insert("Children".into(), Value::Array(children));
    Value::Dictionary(root).to_file_binary(path).expect("write safari");
}

fn safari_titles(path: &Path) -> Vec<String> {
    let doc = Value::from_file(path).expect("read safari");
    doc.as_dictionary()
        .and_then(|d| d.get("Children"))
        .and_then(Value::as_array)
        .expect("children")
        .iter()
        .filter_map(|c| c.as_dictionary()?.get("Title")?.as_string().map(str::to_string))
        .collect()
}

#[test]
fn sync_edge_to_safari_inserts_bar_after_toolbar() {
    let rig = Rig::new();

    let report = rig.run_json(&["sync"]);
    assert_eq!(report["direction"], "edge-to-safari");
    assert_eq!(report["written"], true);
    assert_eq!(report["changed"], true);
    assert_eq!(report["placement"]["action"], "inserted");
    assert_eq!(report["placement"]["index"], 1);
    assert_eq!(report["bar"]["title"], "收藏夹栏");
    assert_eq!(report["bar"]["origin"]["title"], "Bookmarks Bar");
    assert_eq!(report["bar"]["links"], 2);
    assert!(report["backup_path"].as_str().unwrap().ends_with("Bookmarks.plist.bak"));

    assert_eq!(
        safari_titles(&rig.safari),
        ["BookmarksBar", "收藏夹栏", "com.apple.ReadingList"]
    );

    // A second run finds the synced bar and has nothing new to write
    let synced = fs::read(&rig.safari).unwrap();
    let report = rig.run_json(&["sync"]);
    assert_eq!(report["placement"]["action"], "replaced");
    assert_eq!(report["placement"]["index"], 1);
    assert_eq!(report["changed"], false);
    assert_eq!(report["written"], false);
    assert_eq!(fs::read(&rig.safari).unwrap(), synced);
    assert_eq!(
        safari_titles(&rig.safari),
        ["BookmarksBar", "收藏夹栏", "com.apple.ReadingList"]
    );
}

#[test]
fn sync_dry_run_writes_nothing() {
    let rig = Rig::new();
    let before = fs::read(&rig.safari).unwrap();

    let report = rig.run_json(&["sync", "--dry-run"]);
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["written"], false);
    assert!(report["backup_path"].is_null());

    assert_eq!(fs::read(&rig.safari).unwrap(), before);
    assert!(!rig.temp.path().join("Bookmarks.plist.bak").exists());
}

#[test]
fn sync_safari_to_edge_replaces_bookmark_bar() {
    let rig = Rig::new();

    let report = rig.run_json(&["sync", "-d", "safari-to-edge"]);
    assert_eq!(report["placement"]["action"], "replaced");

    let doc: serde_json::Value = serde_json::from_slice(&fs::read(&rig.edge).unwrap()).unwrap();
    let bar = &doc["roots"]["bookmark_bar"];
    assert_eq!(bar["id"], "1");
    assert_eq!(bar["children"].as_array().unwrap().len(), 1);
    assert_eq!(bar["children"][0]["url"], "https://news.example.com");
    assert_eq!(bar["children"][0]["name"], "News");
}

#[test]
fn sync_missing_store_fails_with_not_found() {
    let rig = Rig::new();
    fs::remove_file(&rig.edge).unwrap();

    rig.cmd()
        .arg("sync")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("STORE_NOT_FOUND"));
}

#[test]
fn sync_malformed_destination_is_restored() {
    let rig = Rig::new();
    fs::write(&rig.safari, b"not a plist").unwrap();

    let output = rig.cmd().arg("sync").output().unwrap();
    assert_eq!(output.status.code(), Some(6));

    // Log lines come first; the structured error is the last line
    let stderr = String::from_utf8(output.stderr).unwrap();
    let err: serde_json::Value = serde_json::from_str(stderr.lines().last().unwrap()).unwrap();
    assert_eq!(err["error"]["code"], "PARSING_FAILED");
    assert_eq!(err["error"]["restored"], true);
    assert_eq!(fs::read(&rig.safari).unwrap(), b"not a plist");
}

#[test]
fn sync_strict_bar_rejects_source_without_bar() {
    let rig = Rig::new();
    fs::write(
        &rig.edge,
        r#"{"roots": {"other": {"id": "2", "name": "Other Bookmarks", "type": "folder", "children": []}}}"#,
    )
    .unwrap();

    rig.cmd()
        .args(["sync", "--strict-bar"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("BAR_NOT_FOUND"));
}

#[test]
fn inspect_bar_reports_origin_and_tally() {
    let rig = Rig::new();

    let out = rig.run_json(&["inspect", "edge", "--bar"]);
    assert_eq!(out["store"], "edge");
    assert_eq!(out["origin"]["kind"], "matched");
    assert_eq!(out["origin"]["title"], "Bookmarks Bar");
    assert_eq!(out["tally"]["links"], 2);
    assert_eq!(out["roots"].as_array().unwrap().len(), 1);

    let out = rig.run_json(&["inspect", "safari"]);
    assert!(out.get("origin").is_none());
    assert_eq!(out["roots"].as_array().unwrap().len(), 2);
}

#[test]
fn backups_and_restore_after_sync() {
    let rig = Rig::new();
    let original = fs::read(&rig.safari).unwrap();

    let listed = rig.run_json(&["backups", "safari"]);
    assert_eq!(listed["count"], 0);

    rig.run_json(&["sync"]);
    assert_ne!(fs::read(&rig.safari).unwrap(), original);

    let listed = rig.run_json(&["backups", "safari"]);
    assert_eq!(listed["count"], 1);

    let restored = rig.run_json(&["restore", "safari"]);
    assert!(restored["restored_from"].as_str().unwrap().ends_with(".bak"));
    assert!(restored["previous_backup"].is_string());
    assert_eq!(fs::read(&rig.safari).unwrap(), original);

    // The pre-restore copy shows up as a second backup
    let listed = rig.run_json(&["backups", "safari"]);
    assert_eq!(listed["count"], 2);
}

#[test]
fn restore_without_backups_fails() {
    let rig = Rig::new();

    rig.cmd()
        .args(["restore", "edge"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("BACKUP_NOT_FOUND"));
}

#[test]
fn version_reports_package_version() {
    let rig = Rig::new();

    rig.cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));

    let out = rig.run_json(&["version"]);
    assert_eq!(out["config_present"], false);
    assert!(out["config_path"].as_str().unwrap().ends_with("config.json"));
}

#[test]
fn config_file_supplies_strict_bar() {
    let rig = Rig::new();
    fs::write(
        &rig.edge,
        r#"{"roots": {"other": {"id": "2", "name": "Other Bookmarks", "type": "folder", "children": []}}}"#,
    )
    .unwrap();

    // Without config the bar-less source is wrapped
    let report = rig.run_json(&["sync", "--dry-run"]);
    assert_eq!(report["bar"]["origin"]["kind"], "wrapped");

    let config_dir = rig.temp.path().join(".favsync");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.json"), r#"{"strict_bar": true}"#).unwrap();

    rig.cmd()
        .args(["sync", "--dry-run"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("BAR_NOT_FOUND"));
}
