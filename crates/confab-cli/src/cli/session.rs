//! Session listing and deletion commands.

use chrono::{DateTime, Utc};
use console::style;

use crate::state::AppState;

/// Render an epoch-millisecond timestamp for display.
fn format_ts(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `confab sessions`: list all sessions, most recently updated first.
pub async fn list_sessions(state: &AppState) -> anyhow::Result<()> {
    state.sync.refresh_all().await;
    let chats = state.sync.chats().await;

    if chats.is_empty() {
        println!("\n  {}\n", style("No chat sessions.").dim());
        return Ok(());
    }

    println!();
    for chat in &chats {
        println!(
            "  {}  {}  {} {}",
            style(&chat.id).dim(),
            style(&chat.title).cyan(),
            format_ts(chat.updated_at),
            style(format!("({} messages)", chat.messages.len())).dim(),
        );
    }
    println!();
    Ok(())
}

/// `confab delete <id>`: delete one session, with confirmation.
pub async fn delete_session(state: &AppState, chat_id: &str, force: bool) -> anyhow::Result<()> {
    state.sync.refresh_all().await;

    let Some(chat) = state.sync.chat(chat_id).await else {
        println!(
            "\n  {} No session with id {}\n",
            style("!").yellow().bold(),
            style(chat_id).dim()
        );
        return Ok(());
    };

    if !force {
        let prompt = format!("Delete session '{}'?", chat.title);
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("\n  {}\n", style("Nothing deleted.").dim());
            return Ok(());
        }
    }

    state.sync.delete_chat(chat_id).await;

    // The engine rolls the cache back if the server refuses the delete.
    if state.sync.chat(chat_id).await.is_some() {
        println!(
            "\n  {} Could not delete '{}'. The session is unchanged.\n",
            style("!").red().bold(),
            chat.title
        );
    } else {
        println!("\n  {} Deleted '{}'.\n", style("✓").green(), chat.title);
    }
    Ok(())
}
