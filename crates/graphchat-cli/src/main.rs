use std::borrow::Cow::{self, Borrowed, Owned};
use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use graphchat_application::{ChatEvent, ChatUseCase, PollerConfig};
use graphchat_client::{BackendClient, ClientConfig};
use graphchat_core::job::{AttachedMessage, JobStatus, STOP_PAYLOAD};
use graphchat_core::knowledge::KnowledgebaseApi;
use graphchat_core::graphdb::GraphDbApi;
use graphchat_core::view::{MessageRole, MessageView};
use graphchat_infrastructure::FileStateRepository;

const COMMANDS: &[&str] = &[
    "/sessions",
    "/open",
    "/new",
    "/rename",
    "/delete",
    "/stop",
    "/attach",
    "/kb",
    "/graphdbs",
];

#[derive(Parser)]
#[command(name = "graphchat")]
#[command(about = "Terminal client for a graph-reasoning assistant backend", long_about = None)]
struct Cli {
    /// Backend base URL (overrides GRAPHCHAT_BASE_URL)
    #[arg(long)]
    backend_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Prints chat events as they arrive from the poll loop.
///
/// Tracks which thinking sub-tasks have been announced so progress lines are
/// printed once each instead of on every poll tick.
async fn render_events(mut events: mpsc::UnboundedReceiver<ChatEvent>) {
    let mut announced: HashSet<String> = HashSet::new();
    let mut completed: HashSet<String> = HashSet::new();

    while let Some(event) = events.recv().await {
        match event {
            ChatEvent::Question(view) => {
                println!("{}", format!("> {}", view.payload).green());
                announced.clear();
                completed.clear();
            }
            ChatEvent::AnswerUpdate(update) => {
                render_thinking(&update.view, &mut announced, &mut completed);
            }
            ChatEvent::AnswerFinal(update) => {
                render_thinking(&update.view, &mut announced, &mut completed);
                render_final(&update.view);
            }
        }
    }
}

fn render_thinking(
    view: &MessageView,
    announced: &mut HashSet<String>,
    completed: &mut HashSet<String>,
) {
    for entry in &view.thinking {
        if announced.insert(entry.task_id.clone()) {
            let expert = entry
                .assigned_expert_name
                .as_deref()
                .unwrap_or("unassigned");
            let goal = entry.goal.as_deref().unwrap_or("(no goal yet)");
            println!("{}", format!("  [thinking] {goal} ({expert})").bright_black());
        }

        if entry.status == Some(JobStatus::Finished) && completed.insert(entry.task_id.clone()) {
            if let Some(goal) = entry.goal.as_deref() {
                println!("{}", format!("  [thinking] {goal} ✓").bright_black());
            }
        }
    }
}

fn render_final(view: &MessageView) {
    match view.status {
        JobStatus::Stopped if view.payload == STOP_PAYLOAD => {
            println!("{}", "Answer stopped. Submit again to continue.".yellow());
        }
        JobStatus::Failed => {
            println!("{}", format!("Job failed: {}", view.payload).red());
        }
        _ => {
            for line in view.payload.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }
    println!();
}

fn render_history(views: &[MessageView]) {
    for view in views {
        match view.role {
            MessageRole::User => println!("{}", format!("> {}", view.payload).green()),
            MessageRole::Assistant => render_final(view),
        }
    }
    if ChatUseCase::can_continue(views) {
        println!(
            "{}",
            "The last answer was stopped; submit a message to continue.".yellow()
        );
    }
}

async fn handle_command(
    line: &str,
    usecase: &ChatUseCase,
    backend: &BackendClient,
    pending_attachments: &mut Vec<AttachedMessage>,
) -> Result<()> {
    let mut parts = line.splitn(3, ' ');
    let command = parts.next().unwrap_or_default();

    match command {
        "/sessions" => {
            let items = usecase.list_sessions().await?;
            if items.is_empty() {
                println!("{}", "No sessions yet.".bright_black());
            }
            for item in items {
                println!("  {}  {}", item.id.bright_black(), item.name);
            }
        }
        "/open" => {
            let Some(session_id) = parts.next() else {
                println!("{}", "Usage: /open <session-id>".bright_black());
                return Ok(());
            };
            let views = usecase.select_session(session_id).await?;
            render_history(&views);
        }
        "/new" => {
            usecase.new_conversation().await?;
            println!("{}", "Started a new conversation.".bright_black());
        }
        "/rename" => {
            let (Some(session_id), Some(name)) = (parts.next(), parts.next()) else {
                println!("{}", "Usage: /rename <session-id> <name>".bright_black());
                return Ok(());
            };
            usecase.rename_session(session_id, name).await?;
            println!("{}", "Renamed.".bright_black());
        }
        "/delete" => {
            let Some(session_id) = parts.next() else {
                println!("{}", "Usage: /delete <session-id>".bright_black());
                return Ok(());
            };
            usecase.delete_session(session_id).await?;
            println!("{}", "Deleted.".bright_black());
        }
        "/stop" => {
            usecase.stop().await?;
        }
        "/attach" => {
            let Some(path) = parts.next() else {
                println!("{}", "Usage: /attach <file>".bright_black());
                return Ok(());
            };
            let content = tokio::fs::read(path).await?;
            let file_name = std::path::Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
            let file_id = backend.upload_file(&file_name, content).await?;
            println!(
                "{}",
                format!("Attached {file_name} ({file_id}); it will ride along with your next message.")
                    .bright_black()
            );
            pending_attachments.push(AttachedMessage {
                file_id,
                message_type: "FILE".to_string(),
            });
        }
        "/kb" => {
            let catalog = backend.list_knowledgebases().await?;
            if let Some(global) = catalog.global_knowledge_base {
                println!(
                    "  {} {}",
                    "[global]".bright_black(),
                    global.name.unwrap_or_default()
                );
            }
            for kb in catalog.local_knowledge_base.unwrap_or_default() {
                println!(
                    "  {}  {} ({} files)",
                    kb.id.unwrap_or_default().bright_black(),
                    kb.name.unwrap_or_default(),
                    kb.file_count.unwrap_or(0)
                );
            }
        }
        "/graphdbs" => {
            for db in backend.list_graphdbs().await? {
                let default_marker = if db.is_default_db.unwrap_or(false) {
                    " (default)"
                } else {
                    ""
                };
                println!(
                    "  {}  {}{}",
                    db.id.unwrap_or_default().bright_black(),
                    db.name.unwrap_or_default(),
                    default_marker
                );
            }
        }
        _ => {
            println!("{}", "Unknown command".bright_black());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ===== Backend wiring =====
    let config = match cli.backend_url {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env(),
    };
    let backend = BackendClient::new(config);
    let state = Arc::new(FileStateRepository::new()?);

    let (usecase, events) = ChatUseCase::new(
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
        state,
        PollerConfig::default(),
    );
    let usecase = Arc::new(usecase);

    // Spawn the event renderer so answers stream in while readline blocks.
    let renderer = tokio::spawn(render_events(events));

    // ===== REPL setup =====
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== graphchat ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message to chat, '/sessions' to browse history, or 'quit' to exit."
            .bright_black()
    );
    println!();

    // Restore the last selected session for continuity across launches.
    match usecase.restore_session().await {
        Ok(Some((session_id, views))) => {
            println!(
                "{}",
                format!("Resuming session {session_id}").bright_black()
            );
            render_history(&views);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("could not restore previous session: {}", e);
        }
    }

    let mut pending_attachments: Vec<AttachedMessage> = Vec::new();

    // ===== Main REPL loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if trimmed.starts_with('/') {
                    if let Err(e) =
                        handle_command(trimmed, &usecase, &backend, &mut pending_attachments).await
                    {
                        eprintln!("{}", format!("Error: {e}").red());
                    }
                    continue;
                }

                let attachments = std::mem::take(&mut pending_attachments);
                match usecase.submit(trimmed, attachments).await {
                    Ok(job_id) => {
                        tracing::debug!("submitted job {}", job_id);
                    }
                    Err(e) => {
                        eprintln!("{}", format!("Error: {e}").red());
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    drop(usecase);
    renderer.abort();

    Ok(())
}
