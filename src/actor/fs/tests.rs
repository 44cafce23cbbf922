use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tempfile::TempDir;

use super::classifier::EventClassifier;
use super::debouncer::{Debouncer, is_temp_file};
use super::types::ChangeKind;
use crate::config::test_config_at;
use crate::freshness::Caches;
use crate::pipeline::StageContext;
use crate::utils::path::normalize_path;

const WINDOW: Duration = Duration::from_millis(200);

fn make_ctx() -> (TempDir, PathBuf, Arc<StageContext>) {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    fs::create_dir_all(root.join("docs/sub")).unwrap();

    let config = test_config_at(&root);
    let ctx = StageContext::from_config(&config, Caches::new()).unwrap();
    (temp, root, ctx)
}

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

// ============================================================================
// debouncer
// ============================================================================

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new(WINDOW);
    assert!(!debouncer.is_ready());
    assert_eq!(debouncer.sleep_duration(), Duration::from_secs(86400));
}

#[test]
fn test_event_kinds() {
    let mut debouncer = Debouncer::new(WINDOW);

    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/b.md"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/c.md"], remove_kind()));

    assert_eq!(debouncer.changes.len(), 3);
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/a.md")], ChangeKind::Added);
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/b.md")], ChangeKind::Changed);
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/c.md")], ChangeKind::Removed);
}

#[test]
fn test_metadata_only_ignored() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], metadata_kind()));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_remove_then_create_is_added() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/a.md")], ChangeKind::Added);
}

#[test]
fn test_create_then_remove_is_dropped() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], remove_kind()));
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_change_then_remove_is_removed() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], remove_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/a.md")], ChangeKind::Removed);
}

#[test]
fn test_first_event_wins() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()));
    assert_eq!(debouncer.changes.len(), 1);
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/a.md")], ChangeKind::Added);
}

#[test]
fn test_temp_files_ignored() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(
        vec!["/tmp/.a.md.swp", "/tmp/a.md~", "/tmp/a.md.tmp", "/tmp/.hidden.md"],
        modify_kind(),
    ));
    assert!(debouncer.changes.is_empty());

    assert!(is_temp_file(std::path::Path::new("notes.bak")));
    assert!(!is_temp_file(std::path::Path::new("notes.md")));
}

#[test]
fn test_take_waits_for_window() {
    let mut debouncer = Debouncer::new(Duration::from_millis(20));
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()));

    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() <= Duration::from_millis(20));

    std::thread::sleep(Duration::from_millis(30));
    let taken = debouncer.take_if_ready().unwrap();
    assert_eq!(taken.len(), 1);
    assert!(debouncer.changes.is_empty());
    assert!(!debouncer.is_ready());
}

// ============================================================================
// classifier
// ============================================================================

#[test]
fn test_classify_keeps_only_sources() {
    let (_temp, root, ctx) = make_ctx();
    let md = root.join("docs/a.md");
    let apib = root.join("docs/sub/b.apib");
    let txt = root.join("docs/notes.txt");
    let outside = root.join("index.html");
    for path in [&md, &apib, &txt, &outside] {
        fs::write(path, "x").unwrap();
    }

    let mut raw = FxHashMap::default();
    raw.insert(md.clone(), ChangeKind::Changed);
    raw.insert(apib.clone(), ChangeKind::Added);
    raw.insert(txt, ChangeKind::Changed);
    raw.insert(outside, ChangeKind::Changed);

    let events = EventClassifier::classify(raw, &ctx).unwrap();
    assert_eq!(
        events.0,
        vec![(md, ChangeKind::Changed), (apib, ChangeKind::Added)]
    );
}

#[test]
fn test_classify_corrects_by_existence() {
    let (_temp, root, ctx) = make_ctx();
    let present = root.join("docs/present.md");
    fs::write(&present, "x").unwrap();
    let gone = root.join("docs/gone.md");
    let vanished = root.join("docs/vanished.md");

    let mut raw = FxHashMap::default();
    raw.insert(present.clone(), ChangeKind::Removed);
    raw.insert(gone.clone(), ChangeKind::Changed);
    raw.insert(vanished, ChangeKind::Added);

    let events = EventClassifier::classify(raw, &ctx).unwrap();
    assert_eq!(
        events.0,
        vec![(gone, ChangeKind::Removed), (present, ChangeKind::Changed)]
    );
}

#[test]
fn test_classify_skips_directories() {
    let (_temp, root, ctx) = make_ctx();
    let dir = root.join("docs/folder.md");
    fs::create_dir_all(&dir).unwrap();

    let mut raw = FxHashMap::default();
    raw.insert(dir, ChangeKind::Added);
    assert!(EventClassifier::classify(raw, &ctx).is_none());
}
