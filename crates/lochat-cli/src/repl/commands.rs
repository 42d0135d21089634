//! Slash command parsing

/// A parsed `/command`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    New(Option<String>),
    Sessions,
    Switch(String),
    Delete(String),
    Rename(String),
    Clear,
    Model(Option<String>),
    Models,
    Mode(Option<String>),
    Modes,
    Research(String),
    Analyze { kind: String, content: String },
    Help,
    Quit,
    /// Unknown command or missing argument; holds the message to show
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  /new [title]            start a new chat
  /sessions               list chats
  /switch <n|id>          switch to a chat
  /delete <n|id>          delete a chat
  /rename <title>         rename the current chat
  /clear                  clear messages of the current chat
  /model [name]           show or set the model
  /models                 list installed models
  /mode [mode]            show or set the prompt mode
  /modes                  list prompt modes
  /research <query>       ask for an in-depth research answer
  /analyze <kind> <text>  ask for a structured analysis
  /help                   show this help
  /quit                   exit
Ctrl-C stops a running reply.";

fn required(name: &str, usage: &str, arg: &str) -> Result<String, SlashCommand> {
    if arg.is_empty() {
        Err(SlashCommand::Invalid(format!("Usage: /{} {}", name, usage)))
    } else {
        Ok(arg.to_string())
    }
}

fn optional(arg: &str) -> Option<String> {
    (!arg.is_empty()).then(|| arg.to_string())
}

impl SlashCommand {
    /// Parse a line; `None` when it is not a command
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "new" => SlashCommand::New(optional(arg)),
            "sessions" | "ls" => SlashCommand::Sessions,
            "switch" => match required("switch", "<n|id>", arg) {
                Ok(target) => SlashCommand::Switch(target),
                Err(invalid) => invalid,
            },
            "delete" => match required("delete", "<n|id>", arg) {
                Ok(target) => SlashCommand::Delete(target),
                Err(invalid) => invalid,
            },
            "rename" => match required("rename", "<title>", arg) {
                Ok(title) => SlashCommand::Rename(title),
                Err(invalid) => invalid,
            },
            "clear" => SlashCommand::Clear,
            "model" => SlashCommand::Model(optional(arg)),
            "models" => SlashCommand::Models,
            "mode" => SlashCommand::Mode(optional(arg)),
            "modes" => SlashCommand::Modes,
            "research" => match required("research", "<query>", arg) {
                Ok(query) => SlashCommand::Research(query),
                Err(invalid) => invalid,
            },
            "analyze" => match arg.split_once(char::is_whitespace) {
                Some((kind, content)) if !content.trim().is_empty() => SlashCommand::Analyze {
                    kind: kind.to_string(),
                    content: content.trim().to_string(),
                },
                _ => SlashCommand::Invalid("Usage: /analyze <kind> <text>".to_string()),
            },
            "help" | "?" => SlashCommand::Help,
            "quit" | "exit" | "q" => SlashCommand::Quit,
            other => SlashCommand::Invalid(format!("Unknown command: /{} (try /help)", other)),
        };
        Some(command)
    }
}
