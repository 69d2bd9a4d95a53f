use super::*;
use crate::{
    dialog::{ChainState, FOO_FIELD, PORT_FIELD},
    dispatcher::ActionSet,
    host::RecordingHost,
};
use serde_json::json;
use shared::{
    domain::{ElementId, PortSummary},
    error::{ApiError, ErrorCode},
    protocol::{Highlights, LinkHighlight, OverlayRequest},
};

fn active_overlay() -> TopoOverlay<RecordingHost> {
    let mut overlay = TopoOverlay::new(RecordingHost::new());
    overlay.activate();
    overlay.host_mut().clear();
    overlay
}

fn device_ports(id: &str, seq: Option<u64>, ports: &[&str]) -> OverlayEvent {
    OverlayEvent::DevicePorts {
        id: ElementId::new(id),
        seq,
        ports: ports.iter().map(|p| PortSummary::new(*p)).collect(),
    }
}

#[test]
fn chain_scenario_from_selection_to_apply() {
    let mut overlay = active_overlay();

    overlay.selection_changed(SelectionContext::new(["dev:1"]));
    assert!(overlay.button_pressed(DetailButton::ChainDialog));
    assert!(overlay.dialog_action(ActionKind::Confirm));
    assert_eq!(
        overlay.host().sent().last().copied(),
        Some(&OverlayRequest::DevicePortsRequest {
            id: ElementId::new("dev:1"),
            seq: 1,
        })
    );

    overlay.handle_event(device_ports("dev:1", Some(1), &["p1", "p2"]));
    let step = overlay.host().presented().last().cloned().expect("second step");
    assert_eq!(step.title, "Select Port");
    assert_eq!(step.controls.len(), 3);

    assert!(overlay.set_choice(PORT_FIELD, Some("p2".to_string())));
    assert!(overlay.set_flag(FOO_FIELD, true));
    assert!(overlay.dialog_action(ActionKind::Confirm));

    let apply = overlay.host().sent().last().copied().cloned().expect("apply");
    assert_eq!(
        serde_json::to_value(apply).expect("json"),
        json!({
            "type": "device_port_apply",
            "payload": { "device": "dev:1", "port": "p2", "foo": true, "bar": false }
        })
    );
    assert!(!overlay.has_open_dialog());
}

#[test]
fn selection_notifications_reassert_available_actions() {
    let mut overlay = active_overlay();

    overlay.selection_changed(SelectionContext::empty());
    assert_eq!(overlay.host().last_exposed(), Some(ActionSet::default()));
    assert!(!overlay.button_pressed(DetailButton::SimpleDialog));
    assert!(!overlay.button_pressed(DetailButton::ChainDialog));

    overlay.selection_changed(SelectionContext::new(["dev:1"]));
    assert_eq!(
        overlay.host().last_exposed(),
        Some(ActionSet {
            simple_dialog: true,
            chain_dialog: true,
        })
    );

    overlay.selection_changed(SelectionContext::new(["dev:1", "dev:2"]));
    assert_eq!(
        overlay.host().last_exposed(),
        Some(ActionSet {
            simple_dialog: true,
            chain_dialog: false,
        })
    );
    assert!(!overlay.button_pressed(DetailButton::ChainDialog));
    assert!(overlay.button_pressed(DetailButton::SimpleDialog));
    assert_eq!(
        overlay.host().presented().last().map(|d| d.title.as_str()),
        Some("Process Devices")
    );
}

#[test]
fn simple_dialog_confirm_is_local_only() {
    let mut overlay = active_overlay();
    overlay.selection_changed(SelectionContext::new(["dev:1", "dev:2"]));
    overlay.button_pressed(DetailButton::SimpleDialog);
    overlay.host_mut().clear();

    assert!(overlay.dialog_action(ActionKind::Confirm));
    assert!(overlay.host().sent().is_empty());
    assert_eq!(
        overlay.host().effects,
        vec![Effect::Flash("Processed 2 device(s)".to_string())]
    );
    assert!(!overlay.dialog_action(ActionKind::Confirm));
}

#[test]
fn key_bindings_drive_the_display_mode() {
    let mut overlay = active_overlay();

    assert!(overlay.key_pressed(Key::Char('v')));
    assert!(overlay.key_pressed(Key::Char('V')));
    assert!(overlay.key_pressed(Key::Char('F')));
    assert_eq!(overlay.mode().current(), Some(&DisplayMode::link()));
    assert!(overlay.key_pressed(Key::Char('0')));
    assert!(!overlay.key_pressed(Key::Char('Q')));

    assert_eq!(
        overlay.host().sent(),
        vec![
            &OverlayRequest::DisplayStart {
                mode: DisplayMode::mouse()
            },
            &OverlayRequest::DisplayStart {
                mode: DisplayMode::link()
            },
            &OverlayRequest::DisplayStop,
        ]
    );
}

#[test]
fn escape_closes_dialogs_before_stopping_the_mode() {
    let mut overlay = active_overlay();
    assert!(!overlay.escape());

    overlay.key_pressed(Key::Char('V'));
    overlay.key_pressed(Key::Char('G'));
    assert!(overlay.has_open_dialog());

    assert!(overlay.key_pressed(Key::Escape));
    assert!(!overlay.has_open_dialog());
    assert!(overlay.mode().is_active());

    assert!(overlay.key_pressed(Key::Escape));
    assert!(!overlay.mode().is_active());
    assert!(!overlay.key_pressed(Key::Escape));
}

#[test]
fn escape_is_not_consumed_while_awaiting_remote_data() {
    let mut overlay = active_overlay();
    overlay.selection_changed(SelectionContext::new(["dev:1"]));
    overlay.button_pressed(DetailButton::ChainDialog);
    overlay.dialog_action(ActionKind::Confirm);

    assert!(!overlay.escape());
    overlay.handle_event(device_ports("dev:1", Some(1), &["p1"]));
    assert!(overlay.chain().is_presenting());
}

#[test]
fn port_failure_releases_the_chain_for_escape_and_retrigger() {
    let mut overlay = active_overlay();
    overlay.key_pressed(Key::Char('V'));
    overlay.selection_changed(SelectionContext::new(["dev:missing"]));
    overlay.button_pressed(DetailButton::ChainDialog);
    overlay.dialog_action(ActionKind::Confirm);
    overlay.host_mut().clear();

    overlay.handle_event(OverlayEvent::DevicePortsFailed {
        id: ElementId::new("dev:missing"),
        seq: Some(1),
        error: ApiError::new(ErrorCode::NotFound, "unknown device dev:missing"),
    });
    assert_eq!(overlay.chain().state(), &ChainState::Idle);
    assert_eq!(
        overlay.host().effects,
        vec![Effect::Flash("unknown device dev:missing".to_string())]
    );

    assert!(overlay.escape());
    assert!(!overlay.mode().is_active());
    assert!(overlay.button_pressed(DetailButton::ChainDialog));
    assert!(overlay.chain().is_presenting());
    assert!(overlay.dialog_action(ActionKind::Cancel));
}

#[test]
fn hover_updates_only_flow_while_a_mode_is_active() {
    let mut overlay = active_overlay();
    let target = HoverTarget::new("host:a");

    overlay.mouse_over(target.clone());
    assert!(overlay.host().sent().is_empty());

    overlay.key_pressed(Key::Char('V'));
    overlay.host_mut().clear();
    overlay.mouse_over(target);
    overlay.mouse_out();
    assert_eq!(
        overlay.host().sent(),
        vec![
            &OverlayRequest::DisplayUpdate {
                id: ElementId::new("host:a")
            },
            &OverlayRequest::DisplayUpdate {
                id: ElementId::default()
            },
        ]
    );
}

#[test]
fn deactivation_stops_mode_and_unregisters_handlers() {
    let mut overlay = active_overlay();
    overlay.selection_changed(SelectionContext::new(["dev:1"]));
    overlay.key_pressed(Key::Char('F'));
    overlay.button_pressed(DetailButton::ChainDialog);
    overlay.dialog_action(ActionKind::Confirm);

    overlay.deactivate();
    assert!(!overlay.mode().is_active());
    assert_eq!(
        overlay.host().sent().last().copied(),
        Some(&OverlayRequest::DisplayStop)
    );

    overlay.host_mut().clear();
    overlay.handle_event(device_ports("dev:1", Some(1), &["p1"]));
    assert!(!overlay.key_pressed(Key::Char('V')));
    assert!(overlay.host().effects.is_empty());

    overlay.activate();
    overlay.handle_event(device_ports("dev:1", Some(1), &["p1"]));
    assert!(!overlay.chain().is_presenting());
}

#[test]
fn chain_response_replaces_an_open_simple_dialog() {
    let mut overlay = active_overlay();
    overlay.selection_changed(SelectionContext::new(["dev:1"]));
    overlay.button_pressed(DetailButton::ChainDialog);
    overlay.dialog_action(ActionKind::Confirm);
    overlay.button_pressed(DetailButton::SimpleDialog);

    overlay.handle_event(device_ports("dev:1", Some(1), &["p1"]));
    assert!(overlay.chain().is_presenting());

    overlay.dialog_action(ActionKind::Cancel);
    assert!(!overlay.has_open_dialog());
}

#[test]
fn highlights_and_errors_are_forwarded_to_the_host() {
    let mut overlay = active_overlay();
    let highlights = Highlights {
        devices: Vec::new(),
        links: vec![LinkHighlight {
            id: ElementId::new("a/1-b/1"),
            important: true,
            label: Some("Yo!".to_string()),
        }],
    };

    overlay.handle_event(OverlayEvent::Highlights(highlights.clone()));
    overlay.handle_event(OverlayEvent::Error(ApiError::new(
        ErrorCode::NotFound,
        "unknown device dev:9",
    )));
    assert_eq!(
        overlay.host().effects,
        vec![
            Effect::ShowHighlights(highlights),
            Effect::Flash("unknown device dev:9".to_string()),
        ]
    );
}
