/// One submitted line split into a command and its arguments.
///
/// There is no grammar beyond whitespace splitting: no quoting, piping or
/// redirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// First token, lower-cased.
    pub command: String,
    pub arguments: Vec<String>,
}

impl CommandLine {
    /// Parse a raw line. Returns `None` for empty or whitespace-only input.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next()?.to_lowercase();
        let arguments = tokens.map(str::to_string).collect();
        Some(Self { command, arguments })
    }

    /// Arguments joined by single spaces.
    pub fn joined_arguments(&self) -> String {
        self.arguments.join(" ")
    }

    pub fn first_argument(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }
}
