use std::path::PathBuf;

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stage a file for the next message.
    Attach(PathBuf),
    /// Print the conversation so far.
    History,
    Quit,
    Help,
    /// Send a chat message.
    Message(String),
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match name {
            "file" if !arg.is_empty() => Self::Attach(PathBuf::from(arg)),
            "history" => Self::History,
            "quit" | "exit" => Self::Quit,
            "help" => Self::Help,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
commands:
  /file <path>   attach a file to the next message
  /history       print the conversation so far
  /quit          exit (Ctrl-D works too)
Ctrl-C aborts the running turn.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_messages() {
        assert_eq!(
            Command::parse("  what's the weather?  "),
            Command::Message("what's the weather?".into())
        );
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn file_command_keeps_path_with_spaces() {
        assert_eq!(
            Command::parse("/file  scans/my invoice.png"),
            Command::Attach(PathBuf::from("scans/my invoice.png"))
        );
    }

    #[test]
    fn file_without_path_is_unknown() {
        assert_eq!(Command::parse("/file"), Command::Unknown("/file".into()));
    }

    #[test]
    fn builtin_commands() {
        assert_eq!(Command::parse("/history"), Command::History);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/nope"), Command::Unknown("/nope".into()));
    }
}
