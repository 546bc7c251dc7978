//! Tests for store persistence and preset management.

use settings_tree::{
    ChangeOrigin, Configurator, EngineConfig, ErrorCode, FieldId, FieldSpec, LifecycleEvent,
    PresetSeed, RichText, Value,
};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

fn open(dir: &Path) -> Configurator {
    Configurator::with_dir(dir, "game", "Game").expect("Failed to open configurator")
}

/// `a`: bool, priority 1. `b`: int, default priority. `b` is registered first.
fn build(cfg: &mut Configurator) -> (FieldId, FieldId) {
    let root = cfg.root();
    let b = cfg.add_field(root, FieldSpec::int("b", "B", 0)).unwrap();
    let a = cfg
        .add_field(root, FieldSpec::bool("a", "A", false).priority(1))
        .unwrap();
    (a, b)
}

#[test]
fn switch_reloads_by_priority() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let (a, b) = build(&mut cfg);
    cfg.set_value(b, 5i64).unwrap();

    let p1 = cfg.add_preset("P1", PresetSeed::Empty).unwrap();
    std::fs::write(cfg.layout().preset_store(&p1), "a\ntrue\n").unwrap();

    let log: Rc<RefCell<Vec<(&'static str, ChangeOrigin)>>> = Rc::new(RefCell::new(Vec::new()));
    let seen = log.clone();
    cfg.on_change(a, move |_, event| {
        seen.borrow_mut().push(("a", event.origin));
        Ok(())
    })
    .unwrap();
    let seen = log.clone();
    cfg.on_change(b, move |_, event| {
        seen.borrow_mut().push(("b", event.origin));
        Ok(())
    })
    .unwrap();

    cfg.switch_preset(Some(&p1)).unwrap();

    assert_eq!(cfg.value(a).unwrap(), &Value::Bool(true));
    assert_eq!(cfg.value(b).unwrap(), &Value::Int(0));
    assert_eq!(
        *log.borrow(),
        vec![("a", ChangeOrigin::Reload), ("b", ChangeOrigin::Reload)]
    );
    assert_eq!(cfg.active_preset(), Some(p1.as_str()));
    assert!(!cfg.is_dirty());

    // the previous store was flushed before switching
    let default = std::fs::read_to_string(cfg.layout().default_store()).unwrap();
    assert!(default.contains("b\n5\n"));
    // the new store has every persisted field
    let stored = std::fs::read_to_string(cfg.layout().preset_store(&p1)).unwrap();
    assert!(stored.contains("a\ntrue\n"));
    assert!(stored.contains("b\n0\n"));

    cfg.switch_preset(None).unwrap();
    assert_eq!(cfg.value(a).unwrap(), &Value::Bool(false));
    assert_eq!(cfg.value(b).unwrap(), &Value::Int(5));
}

#[test]
fn switch_contains_handler_failures() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let (a, b) = build(&mut cfg);
    let p1 = cfg.add_preset("P1", PresetSeed::Empty).unwrap();
    std::fs::write(cfg.layout().preset_store(&p1), "a\ntrue\nb\n3\n").unwrap();
    cfg.on_change(a, |_, _| anyhow::bail!("refuse")).unwrap();

    cfg.switch_preset(Some(&p1)).unwrap();
    assert_eq!(cfg.value(a).unwrap(), &Value::Bool(false));
    assert_eq!(cfg.value(b).unwrap(), &Value::Int(3));
    // the preset keeps its own entry
    assert_eq!(cfg.store().get("a"), Some("true"));
    let stored = std::fs::read_to_string(cfg.layout().preset_store(&p1)).unwrap();
    assert!(stored.contains("a\ntrue\n"));
}

#[test]
fn switch_repairs_malformed_entries() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let (a, _) = build(&mut cfg);
    let p1 = cfg.add_preset("P1", PresetSeed::Empty).unwrap();
    std::fs::write(cfg.layout().preset_store(&p1), "a\nbanana\n").unwrap();

    cfg.switch_preset(Some(&p1)).unwrap();
    assert_eq!(cfg.value(a).unwrap(), &Value::Bool(false));
    let stored = std::fs::read_to_string(cfg.layout().preset_store(&p1)).unwrap();
    assert!(stored.contains("a\nfalse\n"));
}

#[test]
fn renamed_enum_member_falls_back_to_default() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("game.config"),
        "mode\nRenamed\nnote\n<b>x</b>\n",
    )
    .unwrap();
    let mut cfg = open(temp.path());
    let root = cfg.root();
    let mode = cfg
        .add_field(
            root,
            FieldSpec::enumeration("mode", "Mode", ["Low", "High"], "Low"),
        )
        .unwrap();
    let note = cfg
        .add_field(root, FieldSpec::formatted("note", "Note", RichText::plain("hi")))
        .unwrap();
    assert_eq!(cfg.value(mode).unwrap(), &Value::Enum("Low".into()));
    assert_eq!(cfg.store().get("mode"), Some("Low"));
    assert_eq!(
        cfg.value(note).unwrap(),
        &Value::Formatted(RichText::parse("<b>x</b>").unwrap())
    );
    assert_eq!(cfg.store().get("note"), Some("<b>x</b>"));

    cfg.set_value(mode, Value::Enum("High".into())).unwrap();
    let p1 = cfg.add_preset("P1", PresetSeed::Empty).unwrap();
    std::fs::write(cfg.layout().preset_store(&p1), "mode\nAlsoGone\n").unwrap();
    cfg.switch_preset(Some(&p1)).unwrap();
    assert_eq!(cfg.value(mode).unwrap(), &Value::Enum("Low".into()));
    let stored = std::fs::read_to_string(cfg.layout().preset_store(&p1)).unwrap();
    assert!(stored.contains("mode\nLow\n"));
}

#[test]
fn switch_to_unknown_preset_fails() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let err = cfg.switch_preset(Some("nobody")).unwrap_err();
    assert_eq!(err.code, ErrorCode::PresetNotFound);
}

#[test]
fn unsaved_fields_survive_switches() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let root = cfg.root();
    let scratch = cfg
        .add_field(root, FieldSpec::text("scratch", "Scratch", "").not_saved())
        .unwrap();
    cfg.set_value(scratch, Value::Text("kept".into())).unwrap();
    let p1 = cfg.add_preset("P1", PresetSeed::Empty).unwrap();
    cfg.switch_preset(Some(&p1)).unwrap();
    assert_eq!(cfg.value(scratch).unwrap(), &Value::Text("kept".into()));
    assert!(!cfg.store().contains("scratch"));
}

#[test]
fn delete_active_preset_returns_to_default() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let (a, _) = build(&mut cfg);
    let p1 = cfg.add_preset("P1", PresetSeed::Empty).unwrap();
    cfg.switch_preset(Some(&p1)).unwrap();
    cfg.set_value(a, true).unwrap();
    let path = cfg.layout().preset_store(&p1);
    assert!(path.exists());

    cfg.delete_preset(&p1).unwrap();
    assert_eq!(cfg.active_preset(), None);
    assert!(!path.exists());
    assert!(!cfg.preset_exists(&p1));
    assert_eq!(cfg.value(a).unwrap(), &Value::Bool(false));

    let err = cfg.delete_preset(&p1).unwrap_err();
    assert_eq!(err.code, ErrorCode::PresetNotFound);

    // the index on disk agrees
    let reopened = open(temp.path());
    assert_eq!(reopened.active_preset(), None);
    assert!(reopened.presets().is_empty());
}

#[test]
fn flush_writes_only_when_dirty() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    build(&mut cfg);
    assert!(cfg.is_dirty());
    assert!(cfg.flush().unwrap());
    let path = cfg.layout().default_store();
    assert!(path.exists());

    std::fs::remove_file(&path).unwrap();
    assert!(!cfg.flush().unwrap());
    assert!(!path.exists());
}

#[test]
fn values_persist_across_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let mut cfg = open(temp.path());
        let (a, b) = build(&mut cfg);
        cfg.set_value(a, true).unwrap();
        cfg.set_value(b, -4i64).unwrap();
        cfg.handle_lifecycle(LifecycleEvent::Quit).unwrap();
    }
    let mut cfg = open(temp.path());
    let (a, b) = build(&mut cfg);
    assert_eq!(cfg.value(a).unwrap(), &Value::Bool(true));
    assert_eq!(cfg.value(b).unwrap(), &Value::Int(-4));
    assert!(!cfg.is_dirty());
}

#[test]
fn reset_preset_restores_defaults() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let (a, b) = build(&mut cfg);
    cfg.set_value(b, 2i64).unwrap();
    let p1 = cfg.add_preset("P1", PresetSeed::CopyActive).unwrap();
    cfg.switch_preset(Some(&p1)).unwrap();
    assert_eq!(cfg.value(b).unwrap(), &Value::Int(2));
    cfg.set_value(a, true).unwrap();
    cfg.switch_preset(None).unwrap();

    // resetting an inactive preset leaves the active one in place
    cfg.reset_preset(Some(&p1)).unwrap();
    assert_eq!(cfg.active_preset(), None);
    assert_eq!(cfg.value(b).unwrap(), &Value::Int(2));
    let stored = std::fs::read_to_string(cfg.layout().preset_store(&p1)).unwrap();
    assert!(stored.contains("a\nfalse\n"));
    assert!(stored.contains("b\n0\n"));

    // resetting the active preset is observable immediately
    cfg.switch_preset(Some(&p1)).unwrap();
    cfg.set_value(b, 8i64).unwrap();
    cfg.reset_preset(Some(&p1)).unwrap();
    assert_eq!(cfg.active_preset(), Some(p1.as_str()));
    assert_eq!(cfg.value(b).unwrap(), &Value::Int(0));
    assert_eq!(cfg.value(a).unwrap(), &Value::Bool(false));
}

#[test]
fn add_rename_and_move_presets() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let first = cfg.add_preset("First", PresetSeed::Empty).unwrap();
    let second = cfg.add_preset("Second", PresetSeed::Empty).unwrap();
    assert_ne!(first, second);

    let names: Vec<String> = cfg.presets().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["First", "Second"]);

    cfg.rename_preset(&first, "Renamed").unwrap();
    cfg.move_preset(&second, 0).unwrap();
    let reopened = open(temp.path());
    let listed: Vec<(String, String, i64)> = reopened
        .presets()
        .into_iter()
        .map(|p| (p.file_id, p.name, p.order_index))
        .collect();
    assert_eq!(
        listed,
        vec![
            (second.clone(), "Second".to_string(), 0),
            (first.clone(), "Renamed".to_string(), 1),
        ]
    );

    let err = cfg.rename_preset("missing", "X").unwrap_err();
    assert_eq!(err.code, ErrorCode::PresetNotFound);
}

#[test]
fn discovery_adopts_unindexed_files() {
    let temp = TempDir::new().unwrap();
    let presets = temp.path().join("game_presets");
    std::fs::create_dir_all(&presets).unwrap();
    std::fs::write(presets.join("found.config"), "a\ntrue\n").unwrap();
    std::fs::write(presets.join("notes.txt"), "ignored").unwrap();

    let mut config = EngineConfig::with_config_dir(temp.path());
    config.presets.discover_on_open = false;
    let mut cfg = Configurator::open("game", "Game", &config).unwrap();
    assert!(!cfg.preset_exists("found"));

    assert_eq!(cfg.discover_presets().unwrap(), vec!["found".to_string()]);
    let preset = cfg.preset("found").expect("adopted");
    assert_eq!(preset.name, "found");
    assert!(cfg.discover_presets().unwrap().is_empty());

    // discovery on open is the default
    std::fs::write(presets.join("later.config"), "").unwrap();
    let cfg = open(temp.path());
    assert!(cfg.preset_exists("found"));
    assert!(cfg.preset_exists("later"));
}

#[test]
fn unknown_active_id_falls_back_to_default() {
    let temp = TempDir::new().unwrap();
    let presets = temp.path().join("game_presets");
    std::fs::create_dir_all(&presets).unwrap();
    std::fs::write(presets.join("config.txt"), "ghost\n").unwrap();
    std::fs::write(temp.path().join("game.config"), "a\ntrue\n").unwrap();

    let mut cfg = open(temp.path());
    assert_eq!(cfg.active_preset(), None);
    assert!(cfg.is_preset_index_dirty());
    let (a, _) = build(&mut cfg);
    assert_eq!(cfg.value(a).unwrap(), &Value::Bool(true));
}

#[test]
fn export_deduplicates_names() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let (a, _) = build(&mut cfg);
    cfg.set_value(a, true).unwrap();

    let first = cfg.export_active("Night Mode").unwrap();
    let second = cfg.export_active("Night Mode").unwrap();
    let exports = cfg.layout().exports_dir();
    assert_eq!(first, exports.join("night-mode.config"));
    assert_eq!(second, exports.join("night-mode-1.config"));

    let content = std::fs::read_to_string(&first).unwrap();
    assert_eq!(content, cfg.store().to_text());
    // exporting does not flush the live store
    assert!(cfg.is_dirty());
}

#[test]
fn import_creates_preset_from_file() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("shared.config");
    std::fs::write(&source, "b\n3\n").unwrap();

    let mut cfg = open(temp.path());
    let (_, b) = build(&mut cfg);
    let file_id = cfg.import_preset(&source).unwrap();
    assert_eq!(cfg.preset(&file_id).unwrap().name, "shared");

    cfg.switch_preset(Some(&file_id)).unwrap();
    assert_eq!(cfg.value(b).unwrap(), &Value::Int(3));

    let err = cfg.import_preset(&temp.path().join("missing.config")).unwrap_err();
    assert_eq!(err.code, ErrorCode::IoError);
}

#[test]
fn menu_close_commits_pending_deletes() {
    let temp = TempDir::new().unwrap();
    let mut cfg = open(temp.path());
    let keep = cfg.add_preset("Keep", PresetSeed::Empty).unwrap();
    let drop = cfg.add_preset("Drop", PresetSeed::Empty).unwrap();
    cfg.mark_preset_for_delete(&drop, true).unwrap();

    cfg.handle_lifecycle(LifecycleEvent::FocusLost).unwrap();
    assert!(cfg.preset_exists(&drop));

    cfg.handle_lifecycle(LifecycleEvent::MenuClosed).unwrap();
    assert!(!cfg.preset_exists(&drop));
    assert!(cfg.preset_exists(&keep));
    assert!(!cfg.layout().preset_store(&drop).exists());
}
