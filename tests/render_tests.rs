//! Tests for visibility propagation, widget materialization and bridges.

use settings_tree::{
    Configurator, Effective, ErrorCode, FieldId, FieldSpec, UiHost, Value, WidgetHandle,
    WidgetKind, WidgetRequest,
};
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create {
        field: FieldId,
        widget: WidgetHandle,
        parent: Option<WidgetHandle>,
        kind: &'static str,
        value: Option<String>,
        state: Effective,
    },
    Destroy(WidgetHandle),
    Value(WidgetHandle, String),
    State(WidgetHandle, Effective),
    Layout(FieldId),
}

/// Host that hands out sequential handles and records every call.
struct RecordingHost {
    next: u64,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl UiHost for RecordingHost {
    fn create_ui(&mut self, request: &WidgetRequest<'_>) -> WidgetHandle {
        self.next += 1;
        let widget = WidgetHandle(self.next);
        let kind = match request.kind {
            WidgetKind::Screen => "screen",
            WidgetKind::PanelEntry => "entry",
            WidgetKind::Division => "division",
            WidgetKind::Header => "header",
            WidgetKind::Button => "button",
            WidgetKind::Value(_) => "value",
        };
        self.calls.borrow_mut().push(Call::Create {
            field: request.field,
            widget,
            parent: request.parent,
            kind,
            value: request.value.clone(),
            state: request.state,
        });
        widget
    }

    fn destroy_ui(&mut self, widget: WidgetHandle) {
        self.calls.borrow_mut().push(Call::Destroy(widget));
    }

    fn push_value(&mut self, widget: WidgetHandle, display: &str) {
        self.calls
            .borrow_mut()
            .push(Call::Value(widget, display.to_string()));
    }

    fn push_state(&mut self, widget: WidgetHandle, state: Effective) {
        self.calls.borrow_mut().push(Call::State(widget, state));
    }

    fn invalidate_layout(&mut self, panel: FieldId) {
        self.calls.borrow_mut().push(Call::Layout(panel));
    }
}

fn attach(cfg: &mut Configurator) -> Rc<RefCell<Vec<Call>>> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    cfg.attach_host(Box::new(RecordingHost {
        next: 0,
        calls: calls.clone(),
    }));
    calls
}

fn setup(temp: &TempDir) -> Configurator {
    Configurator::with_dir(temp.path(), "game", "Game").expect("Failed to open configurator")
}

const VISIBLE: Effective = Effective {
    hidden: false,
    interactable: true,
};

#[test]
fn hide_and_unhide_restores_descendants() {
    let temp = TempDir::new().unwrap();
    let mut cfg = setup(&temp);
    let root = cfg.root();
    let panel = cfg.add_panel(root, "audio", "Audio").unwrap();
    let a = cfg.add_field(panel, FieldSpec::bool("a", "A", true)).unwrap();
    let div = cfg.add_division(panel, "mix", "Mix").unwrap();
    let b = cfg.add_field(div, FieldSpec::int("b", "B", 3)).unwrap();
    let sub = cfg.add_panel(panel, "adv", "Advanced").unwrap();
    let c = cfg
        .add_field(sub, FieldSpec::float("c", "C", 0.5).hidden())
        .unwrap();

    cfg.set_hidden(panel, true).unwrap();
    for id in [panel, a, div, b, sub, c] {
        assert!(cfg.is_hidden(id).unwrap(), "{} should be hidden", id);
    }
    assert!(!cfg.is_hidden(root).unwrap());

    cfg.set_hidden(panel, false).unwrap();
    for id in [panel, a, div, b, sub] {
        assert!(!cfg.is_hidden(id).unwrap(), "{} should be visible", id);
    }
    // own flag survives the round trip
    assert!(cfg.is_hidden(c).unwrap());

    cfg.set_interactable(div, false).unwrap();
    assert!(!cfg.is_interactable(b).unwrap());
    assert!(cfg.is_interactable(a).unwrap());
    cfg.set_interactable(div, true).unwrap();
    assert!(cfg.is_interactable(b).unwrap());
}

#[test]
fn division_changes_signal_nearest_concrete_panel_once() {
    let temp = TempDir::new().unwrap();
    let mut cfg = setup(&temp);
    let root = cfg.root();
    let panel = cfg.add_panel(root, "video", "Video").unwrap();
    let outer = cfg.add_division(panel, "outer", "Outer").unwrap();
    let inner = cfg.add_division(outer, "inner", "Inner").unwrap();
    let x = cfg.add_field(inner, FieldSpec::bool("x", "X", true)).unwrap();
    let y = cfg.add_field(inner, FieldSpec::bool("y", "Y", true)).unwrap();
    let plain = cfg.add_field(panel, FieldSpec::bool("z", "Z", true)).unwrap();
    let calls = attach(&mut cfg);

    cfg.set_hidden(outer, true).unwrap();
    let layouts: Vec<Call> = calls
        .borrow()
        .iter()
        .filter(|c| matches!(c, Call::Layout(_)))
        .cloned()
        .collect();
    assert_eq!(layouts, vec![Call::Layout(panel)]);
    assert!(cfg.is_hidden(x).unwrap() && cfg.is_hidden(y).unwrap());

    calls.borrow_mut().clear();
    cfg.set_hidden(plain, true).unwrap();
    assert!(
        !calls.borrow().iter().any(|c| matches!(c, Call::Layout(_))),
        "non-division changes do not invalidate layout"
    );
}

#[test]
fn open_panel_materializes_children_in_order() {
    let temp = TempDir::new().unwrap();
    let mut cfg = setup(&temp);
    let root = cfg.root();
    let header = cfg.add_header(root, "General").unwrap();
    let a = cfg.add_field(root, FieldSpec::int("a", "A", 4)).unwrap();
    let div = cfg.add_division(root, "div", "Div").unwrap();
    let b = cfg.add_field(div, FieldSpec::bool("b", "B", false)).unwrap();
    let sub = cfg.add_panel(root, "sub", "Sub").unwrap();
    let c = cfg.add_field(sub, FieldSpec::bool("c", "C", false)).unwrap();
    let calls = attach(&mut cfg);

    let screen = cfg.open_panel(root).unwrap().expect("host attached");
    let created: Vec<(FieldId, &'static str, Option<WidgetHandle>)> = calls
        .borrow()
        .iter()
        .filter_map(|c| match c {
            Call::Create {
                field, kind, parent, ..
            } => Some((*field, *kind, *parent)),
            _ => None,
        })
        .collect();
    let div_widget = cfg.widget(div).unwrap().expect("division widget");
    assert_eq!(
        created,
        vec![
            (root, "screen", None),
            (header, "header", Some(screen)),
            (a, "value", Some(screen)),
            (div, "division", Some(screen)),
            (b, "value", Some(div_widget)),
            (sub, "entry", Some(screen)),
        ]
    );
    assert_eq!(cfg.widget(c).unwrap(), None);
    assert!(calls.borrow().iter().any(|call| matches!(
        call,
        Call::Create { field, value: Some(v), state, .. }
            if *field == a && v == "4" && *state == VISIBLE
    )));

    // opening twice does not rebuild
    let count = calls.borrow().len();
    assert_eq!(cfg.open_panel(root).unwrap(), Some(screen));
    assert_eq!(calls.borrow().len(), count);

    cfg.close_panel(root).unwrap();
    let destroyed = calls
        .borrow()
        .iter()
        .filter(|c| matches!(c, Call::Destroy(_)))
        .count();
    assert_eq!(destroyed, 6);
    assert_eq!(cfg.widget(a).unwrap(), None);
    assert_eq!(cfg.screen(root).unwrap(), None);

    let err = cfg.open_panel(div).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidSchema);
}

#[test]
fn state_changes_reach_materialized_widgets() {
    let temp = TempDir::new().unwrap();
    let mut cfg = setup(&temp);
    let root = cfg.root();
    let a = cfg.add_field(root, FieldSpec::bool("a", "A", true)).unwrap();
    let calls = attach(&mut cfg);
    cfg.open_panel(root).unwrap();
    let widget = cfg.widget(a).unwrap().expect("value widget");

    cfg.set_interactable(a, false).unwrap();
    assert_eq!(
        calls.borrow().last(),
        Some(&Call::State(
            widget,
            Effective {
                hidden: false,
                interactable: false
            }
        ))
    );

    // no change, no push
    let count = calls.borrow().len();
    cfg.set_interactable(a, false).unwrap();
    assert_eq!(calls.borrow().len(), count);
}

#[test]
fn bridge_moves_widget_but_not_storage() {
    let temp = TempDir::new().unwrap();
    let mut cfg = setup(&temp);
    let root = cfg.root();
    let home = cfg.add_panel(root, "home", "Home").unwrap();
    let x = cfg.add_field(home, FieldSpec::int("x", "X", 1)).unwrap();
    let away = cfg.add_panel(root, "away", "Away").unwrap();
    let calls = attach(&mut cfg);

    cfg.open_panel(home).unwrap();
    let old_widget = cfg.widget(x).unwrap().expect("x rendered at home");

    let bridge = cfg.add_bridge(away, x).unwrap();
    assert!(calls.borrow().contains(&Call::Destroy(old_widget)));
    assert_eq!(cfg.widget(x).unwrap(), None);
    assert!(cfg.is_bridged(x).unwrap());
    assert_eq!(cfg.bridged_by(x).unwrap(), Some(bridge));
    assert_eq!(cfg.bridge_target(bridge).unwrap(), Some(x));
    assert_eq!(cfg.parent(x).unwrap(), Some(home));

    // reopening home skips the bridged field
    cfg.close_panel(home).unwrap();
    cfg.open_panel(home).unwrap();
    assert_eq!(cfg.widget(x).unwrap(), None);

    let away_screen = cfg.open_panel(away).unwrap().expect("host attached");
    let widget = cfg.widget(x).unwrap().expect("x rendered at the bridge");
    assert!(calls.borrow().iter().any(|c| matches!(
        c,
        Call::Create { field, parent, .. } if *field == x && *parent == Some(away_screen)
    )));

    cfg.submit_value(x, 9i64).unwrap();
    assert_eq!(cfg.value(x).unwrap(), &Value::Int(9));
    assert_eq!(cfg.store().get("x"), Some("9"));
    assert_eq!(calls.borrow().last(), Some(&Call::Value(widget, "9".to_string())));

    // the bridge's own state shows on the target's widget
    cfg.set_hidden(bridge, true).unwrap();
    assert!(!cfg.is_hidden(x).unwrap());
    assert!(calls.borrow().contains(&Call::State(
        widget,
        Effective {
            hidden: true,
            interactable: true
        }
    )));
}

#[test]
fn bridge_rejects_invalid_targets() {
    let temp = TempDir::new().unwrap();
    let mut cfg = setup(&temp);
    let root = cfg.root();
    let panel = cfg.add_panel(root, "p", "P").unwrap();
    let other = cfg.add_panel(root, "q", "Q").unwrap();
    let field = cfg.add_field(panel, FieldSpec::bool("f", "F", true)).unwrap();

    let err = cfg.add_bridge(panel, root).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidBridgeTarget);

    let err = cfg.add_bridge(panel, panel).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidBridgeTarget);

    let inner = cfg.add_division(panel, "inner", "Inner").unwrap();
    let err = cfg.add_bridge(inner, panel).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidBridgeTarget);

    let err = cfg.add_bridge(field, other).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotAPanel);

    cfg.add_bridge(other, field).unwrap();
    let err = cfg.add_bridge(root, field).unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyBridged);
}

#[test]
fn canceled_change_resyncs_widget() {
    let temp = TempDir::new().unwrap();
    let mut cfg = setup(&temp);
    let root = cfg.root();
    let level = cfg
        .add_field(root, FieldSpec::int("level", "Level", 1).int_range(0, 10))
        .unwrap();
    cfg.flush().unwrap();
    cfg.on_change(level, |_, event| {
        event.cancel();
        Ok(())
    })
    .unwrap();
    let calls = attach(&mut cfg);
    cfg.open_panel(root).unwrap();
    let widget = cfg.widget(level).unwrap().expect("value widget");

    let outcome = cfg.submit_input(level, "7").unwrap();
    assert_eq!(outcome, settings_tree::ChangeOutcome::Canceled);
    assert_eq!(cfg.value(level).unwrap(), &Value::Int(1));
    assert_eq!(cfg.store().get("level"), Some("1"));
    assert!(!cfg.is_dirty());
    assert_eq!(calls.borrow().last(), Some(&Call::Value(widget, "1".to_string())));

    let outcome = cfg.submit_input(level, "seven").unwrap();
    assert!(matches!(outcome, settings_tree::ChangeOutcome::Rejected(_)));
    assert_eq!(calls.borrow().last(), Some(&Call::Value(widget, "1".to_string())));
}
