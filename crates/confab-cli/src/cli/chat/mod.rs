//! Interactive chat loop.
//!
//! Coordinates the conversation lifecycle: initial cache refresh, session
//! selection, input loop with slash commands, attachment staging, send
//! sequencing through [`SendFlow`], and display of replies and generated
//! titles.

mod commands;

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use confab_core::llm::box_provider::BoxLlmProvider;
use confab_core::send::{SendFlow, SendGate};
use confab_infra::attachments::read_attachment;
use confab_infra::llm::openai::OpenAiCompatProvider;
use confab_types::attachment::Attachment;
use confab_types::error::SendError;
use confab_types::message::MessageRole;
use secrecy::SecretString;

use crate::state::AppState;

use commands::ChatCommand;

/// Confirmation gate backed by an interactive prompt. The spinner is
/// suspended while the prompt is on screen.
struct PromptGate {
    spinner: ProgressBar,
}

impl SendGate for PromptGate {
    async fn confirm_large_send(&self, chars: usize) -> bool {
        let spinner = self.spinner.clone();
        tokio::task::spawn_blocking(move || {
            spinner.suspend(|| {
                dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "This message is {chars} characters and may not fit the model's context. Send anyway?"
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false)
            })
        })
        .await
        .unwrap_or(false)
    }
}

fn make_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Read one line of input. `None` means EOF or a closed terminal.
async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        dialoguer::Input::<String>::new()
            .with_prompt(format!("{}", style("You").green().bold()))
            .allow_empty(true)
            .interact_text()
            .ok()
    })
    .await
    .ok()
    .flatten()
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(
    state: &AppState,
    session: Option<String>,
    api_key: String,
    llm_base_url: &str,
) -> anyhow::Result<()> {
    let provider = BoxLlmProvider::new(OpenAiCompatProvider::new(
        SecretString::from(api_key),
        llm_base_url,
    ));

    state.sync.refresh_all().await;

    if let Some(id) = session {
        if state.sync.chat(&id).await.is_some() {
            state.sync.set_active(&id).await;
        } else {
            println!(
                "\n  {} No session with id {}; a new one starts on your first message.",
                style("!").yellow().bold(),
                style(&id).dim()
            );
        }
    }

    print_banner(state).await;

    let flow = SendFlow::new(&state.sync, &provider, &state.config);
    let mut pending: Vec<Attachment> = Vec::new();

    loop {
        let Some(line) = read_line().await else {
            println!("\n  {}", style("Session ended.").dim());
            break;
        };
        let text = line.trim().to_string();
        if text.is_empty() && pending.is_empty() {
            continue;
        }

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Exit => {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }
                ChatCommand::Attach(path) => attach_file(&mut pending, &path).await,
                ChatCommand::History => show_history(state).await,
                ChatCommand::Sessions => show_sessions(state).await,
                ChatCommand::Switch(id) => switch_session(state, &id).await,
                ChatCommand::New => {
                    match state.sync.create_chat(None).await {
                        Some(chat) => println!(
                            "\n  {} Started session {}\n",
                            style("✓").green(),
                            style(&chat.id).dim()
                        ),
                        None => println!(
                            "\n  {} Could not create a session. Is the server up?\n",
                            style("!").red().bold()
                        ),
                    }
                }
                ChatCommand::Delete => delete_active(state).await,
                ChatCommand::Unknown(name) => println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                ),
            }
            continue;
        }

        // A real message: send it with whatever is staged.
        let spinner = make_spinner();
        let gate = PromptGate {
            spinner: spinner.clone(),
        };
        let result = flow.send(&gate, &text, &pending).await;
        spinner.finish_and_clear();

        match result {
            Ok(outcome) => {
                pending.clear();
                match outcome.reply.role {
                    MessageRole::System => println!(
                        "\n  {} {}\n",
                        style("!").red().bold(),
                        outcome.reply.content.trim()
                    ),
                    _ => println!("\n  {}\n", outcome.reply.content.trim()),
                }
                if let Some(title) = outcome.title {
                    println!("  {}\n", style(format!("Session titled: {title}")).dim());
                }
            }
            Err(SendError::EmptyMessage) => {}
            Err(SendError::Declined) => {
                println!("\n  {}\n", style("Send cancelled.").dim());
            }
            Err(SendError::SessionCreationFailed) => {
                println!(
                    "\n  {} Could not create a chat session. Is the server up?\n",
                    style("!").red().bold()
                );
            }
        }
    }

    Ok(())
}

async fn print_banner(state: &AppState) {
    let chats = state.sync.chats().await;
    println!();
    println!(
        "  {} Confab -- {} on {}",
        style("⚡").bold(),
        style(&state.config.model).cyan(),
        style(&state.config.server_url).dim()
    );
    match state.sync.active_chat_id().await {
        Some(id) => {
            if let Some(chat) = state.sync.chat(&id).await {
                println!("  Resuming {}", style(&chat.title).cyan());
            }
        }
        None => println!(
            "  {} sessions on the server; a new one starts with your first message.",
            chats.len()
        ),
    }
    println!("  {}", style("Type /help for commands.").dim());
    println!();
}

async fn attach_file(pending: &mut Vec<Attachment>, path: &str) {
    if path.is_empty() {
        println!("\n  {} Usage: /attach <path>\n", style("?").yellow().bold());
        return;
    }
    match read_attachment(path).await {
        Ok(att) => {
            println!(
                "\n  {} Attached {} ({}, {} chars)\n",
                style("+").cyan().bold(),
                style(&att.name).cyan(),
                att.media_type,
                att.content.chars().count()
            );
            pending.push(att);
        }
        Err(e) => {
            warn!(path, error = %e, "Attachment rejected");
            println!("\n  {} {e}\n", style("!").red().bold());
        }
    }
}

async fn show_history(state: &AppState) {
    let Some(id) = state.sync.active_chat_id().await else {
        println!("\n  {}\n", style("No active session yet.").dim());
        return;
    };
    let Some(chat) = state.sync.chat(&id).await else {
        println!("\n  {}\n", style("No active session yet.").dim());
        return;
    };

    println!("\n  {}", style(&chat.title).cyan().bold());
    for msg in &chat.messages {
        let label = match msg.role {
            MessageRole::User => format!("{}", style("You").green()),
            MessageRole::Assistant => format!("{}", style("Assistant").cyan()),
            MessageRole::System => format!("{}", style("System").red()),
        };
        let preview: String = if msg.content.chars().count() > 100 {
            let cut: String = msg.content.chars().take(97).collect();
            format!("{cut}...")
        } else {
            msg.content.clone()
        };
        println!("  {} {}", style(label).bold(), preview);
    }
    println!();
}

async fn show_sessions(state: &AppState) {
    let chats = state.sync.chats().await;
    if chats.is_empty() {
        println!("\n  {}\n", style("No chat sessions.").dim());
        return;
    }
    let active = state.sync.active_chat_id().await;
    println!();
    for chat in &chats {
        let marker = if active.as_deref() == Some(&chat.id) {
            format!("{}", style("*").green().bold())
        } else {
            " ".to_string()
        };
        println!(
            "  {marker} {}  {} {}",
            style(&chat.id).dim(),
            style(&chat.title).cyan(),
            style(format!("({} messages)", chat.messages.len())).dim()
        );
    }
    println!();
}

async fn switch_session(state: &AppState, id: &str) {
    if id.is_empty() {
        println!("\n  {} Usage: /switch <id>\n", style("?").yellow().bold());
        return;
    }
    match state.sync.chat(id).await {
        Some(chat) => {
            state.sync.set_active(id).await;
            println!("\n  Switched to {}\n", style(&chat.title).cyan());
        }
        None => println!(
            "\n  {} No session with id {}\n",
            style("!").yellow().bold(),
            style(id).dim()
        ),
    }
}

async fn delete_active(state: &AppState) {
    let Some(id) = state.sync.active_chat_id().await else {
        println!("\n  {}\n", style("No active session to delete.").dim());
        return;
    };
    let title = state
        .sync
        .chat(&id)
        .await
        .map(|c| c.title)
        .unwrap_or_else(|| id.clone());

    let prompt = format!("Delete session '{title}'?");
    let confirmed = tokio::task::spawn_blocking(move || {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    })
    .await
    .unwrap_or(false);
    if !confirmed {
        println!("\n  {}\n", style("Nothing deleted.").dim());
        return;
    }

    state.sync.delete_chat(&id).await;
    if state.sync.chat(&id).await.is_some() {
        println!(
            "\n  {} Could not delete '{title}'. The session is unchanged.\n",
            style("!").red().bold()
        );
        return;
    }
    match state.sync.active_chat_id().await {
        Some(next) => {
            let next_title = state
                .sync
                .chat(&next)
                .await
                .map(|c| c.title)
                .unwrap_or(next);
            println!(
                "\n  {} Deleted '{title}'. Now on {}\n",
                style("✓").green(),
                style(next_title).cyan()
            );
        }
        None => println!(
            "\n  {} Deleted '{title}'. A new session starts with your next message.\n",
            style("✓").green()
        ),
    }
}
