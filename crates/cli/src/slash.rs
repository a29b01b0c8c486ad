use socratic_agent::InputMode;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    /// Plain text, sent to the tutor
    Message(String),
    Command(SlashCommand),
    /// A slash command that did not parse; carries a usage hint
    Invalid(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Save,
    DeleteAll,
    Saved,
    Load { topic: String },
    Delete { topic: String },
    Learn,
    Start { topic: String },
    Show,
    Input { mode: InputMode },
    Voice,
    Retry,
    End,
    Explain { query: String },
    Lessons,
    Back,
    Help,
    Quit,
}

/// Names offered for tab completion
pub const COMMAND_NAMES: &[&str] = &[
    "/save",
    "/delete-all",
    "/saved",
    "/load",
    "/delete",
    "/learn",
    "/start",
    "/show",
    "/input",
    "/voice",
    "/retry",
    "/end",
    "/explain",
    "/lessons",
    "/back",
    "/help",
    "/quit",
];

pub fn parse_input(line: &str) -> ReplInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplInput::Empty;
    }

    match trimmed.strip_prefix('/') {
        Some(cmd) => match parse_slash_command(cmd) {
            Ok(command) => ReplInput::Command(command),
            Err(hint) => ReplInput::Invalid(hint),
        },
        None => ReplInput::Message(trimmed.to_string()),
    }
}

/// Parse a slash command (without the leading `/`). Topic arguments keep inner spaces.
pub fn parse_slash_command(cmd: &str) -> Result<SlashCommand, String> {
    let (name, rest) = match cmd.trim().split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (cmd.trim(), ""),
    };

    let required = |usage: &str| {
        if rest.is_empty() { Err(format!("Usage: {}", usage)) } else { Ok(rest.to_string()) }
    };

    match name {
        "save" => Ok(SlashCommand::Save),
        "delete-all" => Ok(SlashCommand::DeleteAll),
        "saved" => Ok(SlashCommand::Saved),
        "load" => required("/load <topic>").map(|topic| SlashCommand::Load { topic }),
        "delete" => required("/delete <topic>").map(|topic| SlashCommand::Delete { topic }),
        "learn" => Ok(SlashCommand::Learn),
        "start" => required("/start <topic>").map(|topic| SlashCommand::Start { topic }),
        "show" => Ok(SlashCommand::Show),
        "input" => match InputMode::parse_str(rest) {
            Some(mode) => Ok(SlashCommand::Input { mode }),
            None => Err("Usage: /input type|voice".to_string()),
        },
        "voice" => Ok(SlashCommand::Voice),
        "retry" => Ok(SlashCommand::Retry),
        "end" => Ok(SlashCommand::End),
        "explain" => required("/explain <topic|number>").map(|query| SlashCommand::Explain { query }),
        "lessons" => Ok(SlashCommand::Lessons),
        "back" => Ok(SlashCommand::Back),
        "help" | "?" => Ok(SlashCommand::Help),
        "quit" | "exit" => Ok(SlashCommand::Quit),
        other => Err(format!("Unknown command '/{}'. Type /help for the list.", other)),
    }
}

pub fn help_text() -> &'static str {
    "Sidebar
  /save                 Save the current chat under its topic
  /saved                List saved chats
  /load <topic>         Resume a saved chat
  /delete <topic>       Delete a saved chat
  /delete-all           Delete every saved chat
  /learn                Open the learn page

Chat
  <text>                Send a message to the tutor
  /start <topic>        Start a new chat
  /show                 Show the current transcript
  /input type|voice     Choose how messages are entered
  /voice                Capture one spoken message
  /retry                Re-send a message that got no reply
  /end                  End the chat without saving

Learn
  /lessons              List the sorting lessons
  /explain <topic|n>    Watch link, image and explanation for a lesson
  /back                 Return to the chat

  /help                 Show this help
  /quit                 Exit"
}
