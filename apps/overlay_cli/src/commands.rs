//! Line commands typed at the console, mapped onto overlay inputs.

use overlay_core::{
    overlay::KEY_BINDINGS, ActionKind, DetailButton, HoverTarget, Key, SelectionContext,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Activate,
    Deactivate,
    Key(Key),
    Select(SelectionContext),
    Hover(HoverTarget),
    Unhover,
    Button(DetailButton),
    Dialog(ActionKind),
    Choose { field: String, value: Option<String> },
    Toggle { field: String, value: bool },
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },
}

const COMMANDS: &str = "\
  esc                      escape
  select [id ...]          replace the selection
  hover <id> | unhover
  button simple|chain      press a details panel button
  ok | cancel              press a dialog button
  choose <field> <value|none>
  toggle <field> on|off
  help | quit";

pub fn help() -> String {
    let mut text = String::from("commands:\n  activate | deactivate\n");
    for binding in &KEY_BINDINGS {
        text.push_str(&format!("  key {:<21}{}\n", binding.key, binding.tooltip));
    }
    text.push_str(COMMANDS);
    text
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(ParseError::Empty);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("activate", []) => Command::Activate,
        ("deactivate", []) => Command::Deactivate,
        ("key", [key]) => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Command::Key(Key::Char(c)),
                _ => return Err(usage("key", "a single character")),
            }
        }
        ("esc" | "escape", []) => Command::Key(Key::Escape),
        ("select", ids) => Command::Select(SelectionContext::new(ids.iter().copied())),
        ("hover", [id]) => Command::Hover(HoverTarget::new(*id)),
        ("unhover", []) => Command::Unhover,
        ("button", [name]) => match *name {
            "simple" => Command::Button(DetailButton::SimpleDialog),
            "chain" => Command::Button(DetailButton::ChainDialog),
            other => match DetailButton::from_id(other) {
                Some(button) => Command::Button(button),
                None => return Err(usage("button", "simple|chain")),
            },
        },
        ("ok", []) => Command::Dialog(ActionKind::Confirm),
        ("cancel", []) => Command::Dialog(ActionKind::Cancel),
        ("choose", [field, value]) => Command::Choose {
            field: field.to_string(),
            value: (*value != "none").then(|| value.to_string()),
        },
        ("toggle", [field, value]) => {
            let value = match *value {
                "on" | "true" => true,
                "off" | "false" => false,
                _ => return Err(usage("toggle", "<field> on|off")),
            };
            Command::Toggle {
                field: field.to_string(),
                value,
            }
        }
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        ("key", _) => return Err(usage("key", "a single character")),
        ("hover", _) => return Err(usage("hover", "<id>")),
        ("button", _) => return Err(usage("button", "simple|chain")),
        ("choose", _) => return Err(usage("choose", "<field> <value|none>")),
        ("toggle", _) => return Err(usage("toggle", "<field> on|off")),
        (
            "activate" | "deactivate" | "esc" | "escape" | "unhover" | "ok" | "cancel",
            _,
        ) => return Err(usage("this command", "no arguments")),
        _ => return Err(ParseError::Unknown(head.to_string())),
    };
    Ok(command)
}

fn usage(command: &'static str, expected: &'static str) -> ParseError {
    ParseError::Usage { command, expected }
}
