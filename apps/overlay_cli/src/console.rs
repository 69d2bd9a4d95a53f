use overlay_core::{
    dialog::{Control, DialogView},
    ActionSet, OverlayHost, PeerLink,
};
use shared::protocol::{Highlights, OverlayRequest};
use tracing::warn;

/// Renders overlay output as plain text and forwards requests to the peer.
pub struct ConsoleHost {
    link: PeerLink,
}

impl ConsoleHost {
    pub fn new(link: PeerLink) -> Self {
        Self { link }
    }
}

impl OverlayHost for ConsoleHost {
    fn send(&mut self, request: OverlayRequest) {
        if let Err(err) = self.link.send(&request) {
            warn!(%err, event = request.name(), "console: request not sent");
        }
    }

    fn present(&mut self, dialog: &DialogView) {
        println!("{}", render_dialog(dialog));
    }

    fn flash(&mut self, message: &str) {
        println!("** {message}");
    }

    fn expose_actions(&mut self, actions: ActionSet) {
        let buttons: Vec<&str> = actions.buttons().into_iter().map(|b| b.id()).collect();
        if buttons.is_empty() {
            println!("[details] no overlay buttons");
        } else {
            println!("[details] buttons: {}", buttons.join(", "));
        }
    }

    fn show_highlights(&mut self, highlights: &Highlights) {
        println!("{}", render_highlights(highlights));
    }
}

pub fn render_dialog(dialog: &DialogView) -> String {
    let mut out = format!("+-- {} --", dialog.title);
    for line in &dialog.lines {
        out.push_str(&format!("\n| {line}"));
    }
    for control in &dialog.controls {
        match control {
            Control::Choice {
                field,
                options,
                selected,
            } => out.push_str(&format!(
                "\n| {field}: [{}] (selected: {})",
                options.join(", "),
                selected.as_deref().unwrap_or("none")
            )),
            Control::Checkbox {
                field,
                label,
                checked,
            } => out.push_str(&format!(
                "\n| [{}] {label} ({field})",
                if *checked { "x" } else { " " }
            )),
        }
    }
    let actions: Vec<String> = dialog
        .actions
        .iter()
        .map(|a| format!("{} ({:?})", a.label, a.kind))
        .collect();
    out.push_str(&format!("\n+-- {}", actions.join(" | ")));
    out
}

pub fn render_highlights(highlights: &Highlights) -> String {
    if highlights.is_empty() {
        return "[canvas] highlights cleared".to_string();
    }

    let mut out = String::from("[canvas]");
    for device in &highlights.devices {
        match &device.badge {
            Some(badge) => out.push_str(&format!(
                "\n  device {} badge {:?} {}: {}",
                device.id, badge.status, badge.count, badge.message
            )),
            None => out.push_str(&format!("\n  device {}", device.id)),
        }
    }
    for link in &highlights.links {
        out.push_str(&format!(
            "\n  link {}{}{}",
            link.id,
            if link.important { " *" } else { "" },
            link.label
                .as_deref()
                .map(|label| format!(" \"{label}\""))
                .unwrap_or_default()
        ));
    }
    out
}
