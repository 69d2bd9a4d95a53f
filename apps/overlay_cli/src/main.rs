use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use overlay_core::{PeerLink, TopoOverlay};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod console;

use commands::Command;
use config::load_settings;
use console::ConsoleHost;

#[derive(Parser, Debug)]
struct Args {
    /// Peer base URL; http(s) is mapped onto ws(s) and `/ws` is appended to a bare host.
    #[arg(long)]
    peer_url: Option<String>,
    #[arg(long, default_value = "overlay.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config);
    if let Some(url) = args.peer_url {
        settings.peer_url = url;
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let (link, mut events) = PeerLink::connect(&settings.peer_url)
        .await
        .with_context(|| format!("connecting to peer at {}", settings.peer_url))?;
    let mut overlay = TopoOverlay::new(ConsoleHost::new(link));
    println!("{}", commands::help());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match commands::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => run(&mut overlay, command),
                    Err(err) => println!("? {err}"),
                }
            }
            event = events.recv() => match event {
                Some(event) => overlay.handle_event(event),
                None => {
                    info!("peer link closed");
                    break;
                }
            },
        }
    }

    overlay.deactivate();
    Ok(())
}

fn run(overlay: &mut TopoOverlay<ConsoleHost>, command: Command) {
    let consumed = match command {
        Command::Activate => {
            overlay.activate();
            true
        }
        Command::Deactivate => {
            overlay.deactivate();
            true
        }
        Command::Key(key) => overlay.key_pressed(key),
        Command::Select(selection) => {
            overlay.selection_changed(selection);
            true
        }
        Command::Hover(target) => {
            overlay.mouse_over(target);
            true
        }
        Command::Unhover => {
            overlay.mouse_out();
            true
        }
        Command::Button(button) => overlay.button_pressed(button),
        Command::Dialog(kind) => overlay.dialog_action(kind),
        Command::Choose { field, value } => overlay.set_choice(&field, value),
        Command::Toggle { field, value } => overlay.set_flag(&field, value),
        Command::Help => {
            println!("{}", commands::help());
            true
        }
        Command::Quit => true,
    };
    if !consumed {
        debug!("input not consumed");
        println!("(ignored)");
    }
}
