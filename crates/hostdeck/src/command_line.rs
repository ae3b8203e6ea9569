use thiserror::Error;

/// First character of every command line.
pub const COMMAND_SENTINEL: char = ':';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Not an editor command: {0}")]
    Unknown(String),

    #[error("Empty command")]
    Empty,
}

/// Colon commands understood by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExCommand {
    Write,
    Quit,
    WriteQuit,
    ForceQuit,
}

impl ExCommand {
    /// Parse a command with the sentinel already stripped. Matching is exact.
    pub fn parse(command: &str) -> Result<Self, CommandError> {
        match command {
            "w" | "write" => Ok(Self::Write),
            "q" | "quit" => Ok(Self::Quit),
            "wq" | "x" => Ok(Self::WriteQuit),
            "q!" => Ok(Self::ForceQuit),
            "" => Err(CommandError::Empty),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Text typed after `:`.
///
/// While open the line always starts with [`COMMAND_SENTINEL`]; backspace
/// cannot remove it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    text: String,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.text.clear();
        self.text.push(COMMAND_SENTINEL);
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_open(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn push(&mut self, c: char) {
        if self.is_open() {
            self.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.text.chars().count() > 1 {
            self.text.pop();
        }
    }

    /// Full line including the sentinel, for display.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Command text without the sentinel.
    pub fn command(&self) -> &str {
        self.text
            .strip_prefix(COMMAND_SENTINEL)
            .unwrap_or(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_write() {
        assert_eq!(ExCommand::parse("w"), Ok(ExCommand::Write));
        assert_eq!(ExCommand::parse("write"), Ok(ExCommand::Write));
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(ExCommand::parse("q"), Ok(ExCommand::Quit));
        assert_eq!(ExCommand::parse("quit"), Ok(ExCommand::Quit));
        assert_eq!(ExCommand::parse("q!"), Ok(ExCommand::ForceQuit));
    }

    #[test]
    fn test_parse_write_quit() {
        assert_eq!(ExCommand::parse("wq"), Ok(ExCommand::WriteQuit));
        assert_eq!(ExCommand::parse("x"), Ok(ExCommand::WriteQuit));
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(
            ExCommand::parse(" w"),
            Err(CommandError::Unknown(" w".to_string()))
        );
        assert_eq!(
            ExCommand::parse("bogus"),
            Err(CommandError::Unknown("bogus".to_string()))
        );
        assert_eq!(ExCommand::parse(""), Err(CommandError::Empty));
    }

    #[test]
    fn test_backspace_keeps_sentinel() {
        let mut line = CommandLine::new();
        line.open();
        line.push('w');
        line.push('q');
        assert_eq!(line.as_str(), ":wq");
        assert_eq!(line.command(), "wq");

        line.backspace();
        line.backspace();
        line.backspace();
        line.backspace();
        assert_eq!(line.as_str(), ":");
        assert!(line.is_open());
    }

    #[test]
    fn test_push_requires_open_line() {
        let mut line = CommandLine::new();
        line.push('w');
        assert_eq!(line.as_str(), "");

        line.open();
        line.push('w');
        line.clear();
        assert!(!line.is_open());
    }
}
