#![deny(unsafe_code)]

use std::io::{BufRead, Write as _};

use sypha::chat::message::ChatMessage;
use sypha::chat::pane::RenderedResponse;
use sypha::chat::view_state::ViewState;
use sypha::viewport::ViewPort;
use sypha::{ConfigStore, bootstrap};
use sypha_content::{Document, render_html};
use sypha_gateway::{ExportFormat, ModelDescriptor};

/// Line-oriented surface: renders the chat pane to stdout and mirrors
/// the affordance toggles a graphical shell would expose.
struct TerminalViewPort;

impl ViewPort for TerminalViewPort {
    fn message_appended(&mut self, message: &ChatMessage, rendered: &Document) {
        let label = match message.role {
            sypha_content::Role::User => "you",
            sypha_content::Role::Assistant => "sypha",
            sypha_content::Role::System => "system",
        };
        println!("[{label}] {}", render_html(rendered));
    }

    fn response_replaced(&mut self, response: &RenderedResponse) {
        println!("--- response ---");
        println!("{}", render_html(&response.document));
    }

    fn view_changed(&mut self, state: ViewState) {
        if state.is_split() {
            println!("(split view)");
        } else {
            println!("(unified view)");
        }
    }

    fn sending_changed(&mut self, sending: bool) {
        if sending {
            println!("(sending...)");
        }
    }

    fn input_text_changed(&mut self, text: &str) {
        if !text.is_empty() {
            println!("(composer restored: {text})");
        }
    }

    fn attachment_cleared(&mut self) {}

    fn transcript_cleared(&mut self) {
        println!("(chat cleared)");
    }

    fn focus_input(&mut self) {}

    fn model_options_changed(&mut self, models: &[ModelDescriptor], selected: &str) {
        let names: Vec<&str> = models.iter().map(|model| model.name.as_str()).collect();
        println!("models: {} (selected: {selected})", names.join(", "));
    }

    fn export_enabled_changed(&mut self, enabled: bool) {
        if enabled {
            println!("(export available)");
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  /models              list models");
    println!("  /model <name>        select a model");
    println!("  /unlock <name>       mark a gated model's credentials configured");
    println!("  /attach <path>       attach a file to the next message");
    println!("  /detach              remove the pending attachment");
    println!("  /new                 start a new session");
    println!("  /clear               clear the current chat");
    println!("  /sessions            list stored sessions");
    println!("  /load <id>           load a stored session");
    println!("  /delete              delete the current session");
    println!("  /export <md|html|pdf>  export the current session");
    println!("  /quit                exit");
    println!("anything else is sent as a chat message");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let store = ConfigStore::load();
    let config = store.config();
    tracing::info!(base_url = %config.base_url, "starting sypha");

    let mut orchestrator = bootstrap(&config, TerminalViewPort).await;
    print_help();

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        if std::io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/help", _) => print_help(),
            ("/models", _) => {
                for model in &orchestrator.catalog().models {
                    let marker = if model.gated { " (gated)" } else { "" };
                    println!("  {}{marker}", model.name);
                }
            }
            ("/model", name) => {
                if let Err(rejection) = orchestrator.select_model(name.trim()) {
                    println!("cannot select: {rejection}");
                }
            }
            ("/unlock", name) => {
                if let Err(error) = orchestrator.unlock_model(name.trim()).await {
                    println!("unlock failed: {error}");
                }
            }
            ("/attach", path) => match std::fs::read(path.trim()) {
                Ok(bytes) => {
                    let name = path
                        .trim()
                        .rsplit_once('/')
                        .map_or(path.trim(), |(_, name)| name);
                    match orchestrator.attach_file(name, bytes) {
                        Ok(()) => println!("attached {name}"),
                        Err(error) => println!("cannot attach: {error}"),
                    }
                }
                Err(error) => println!("cannot read {path}: {error}"),
            },
            ("/detach", _) => orchestrator.remove_attachment(),
            ("/new", _) => {
                if let Err(error) = orchestrator.new_session().await {
                    println!("new session failed: {error}");
                }
            }
            ("/clear", _) => {
                orchestrator.clear_chat();
                orchestrator.finish_view_reset();
            }
            ("/sessions", _) => match orchestrator.list_sessions().await {
                Ok(sessions) => {
                    for session in sessions {
                        println!(
                            "  {}  {} ({} messages)",
                            session.session_id, session.title, session.message_count
                        );
                    }
                }
                Err(error) => println!("cannot list sessions: {error}"),
            },
            ("/load", id) => {
                if let Err(error) = orchestrator.load_session(id.trim()).await {
                    println!("load failed: {error}");
                }
            }
            ("/delete", _) => {
                if let Err(error) = orchestrator.delete_session().await {
                    println!("delete failed: {error}");
                }
            }
            ("/export", format) => {
                let format = match format.trim() {
                    "md" | "markdown" => ExportFormat::Markdown,
                    "html" => ExportFormat::Html,
                    "pdf" => ExportFormat::Pdf,
                    other => {
                        println!("unknown export format: {other}");
                        continue;
                    }
                };
                match orchestrator.export_transcript(format).await {
                    Ok(bytes) => println!("exported {} bytes", bytes.len()),
                    Err(error) => println!("export failed: {error}"),
                }
            }
            _ => {
                orchestrator.set_input_text(line);
                if let Err(error) = orchestrator.submit().await {
                    println!("not sent: {error}");
                }
            }
        }
    }
}
