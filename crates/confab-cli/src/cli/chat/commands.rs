//! Slash command parsing for the interactive chat loop.

use console::style;

/// Commands the user can issue instead of a chat message.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Help,
    Attach(String),
    History,
    Sessions,
    Switch(String),
    New,
    Delete,
    Exit,
    Unknown(String),
}

/// Parse a line as a slash command. Returns `None` for plain messages.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or_default();
    let arg = parts.next().unwrap_or("").trim();

    Some(match cmd {
        "/help" => ChatCommand::Help,
        "/attach" => ChatCommand::Attach(arg.to_string()),
        "/history" => ChatCommand::History,
        "/sessions" => ChatCommand::Sessions,
        "/switch" => ChatCommand::Switch(arg.to_string()),
        "/new" => ChatCommand::New,
        "/delete" => ChatCommand::Delete,
        "/exit" | "/quit" => ChatCommand::Exit,
        other => ChatCommand::Unknown(other.to_string()),
    })
}

/// Print the command reference.
pub fn print_help() {
    println!();
    println!("  {}", style("Commands").bold());
    println!("  /attach <path>   Attach a text file to the next message");
    println!("  /history         Show the active session's transcript");
    println!("  /sessions        List all sessions");
    println!("  /switch <id>     Switch to another session");
    println!("  /new             Start a new session");
    println!("  /delete          Delete the active session");
    println!("  /exit            Leave the chat");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message_is_not_a_command() {
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("  what about /this mid-line"), None);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            parse("/attach notes.txt"),
            Some(ChatCommand::Attach("notes.txt".to_string()))
        );
        assert_eq!(
            parse("/switch chat-42"),
            Some(ChatCommand::Switch("chat-42".to_string()))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("/frobnicate"),
            Some(ChatCommand::Unknown("/frobnicate".to_string()))
        );
    }

    #[test]
    fn test_exit_aliases() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
    }
}
