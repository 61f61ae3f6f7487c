//! Command gateway abstraction
//!
//! Every cloud query goes through a [`CommandGateway`]. The gateway runs one
//! provider CLI command and hands back parsed JSON, raw text, or nothing.
//! It never returns an error: a failed command is logged by the
//! implementation and surfaces here as [`CommandOutput::Empty`].

use serde_json::Value;
use std::fmt;

/// A provider CLI invocation, kept as an argument vector
///
/// The argument vector is what gets executed; the rendered command line is
/// only used for logging and for matching in scripted gateways.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AzCommand {
    args: Vec<String>,
}

impl AzCommand {
    /// Start a command from its subcommand words, e.g. `["role", "assignment", "list"]`
    pub fn new<I, S>(subcommand: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: subcommand.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a `--name value` pair
    pub fn flag(mut self, name: &str, value: impl Into<String>) -> Self {
        self.args.push(name.to_string());
        self.args.push(value.into());
        self
    }

    /// Arguments passed to the CLI binary
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Shell-like rendering, `az` prefixed
    pub fn command_line(&self) -> String {
        let mut line = String::from("az");
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push('"');
                line.push_str(&arg.replace('"', "\\\""));
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl fmt::Display for AzCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Result of one gateway invocation
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Output parsed as JSON
    Json(Value),
    /// Output that was not valid JSON (e.g. `--output tsv`)
    Text(String),
    /// The command failed or printed nothing
    Empty,
}

impl CommandOutput {
    /// Classify raw stdout: JSON when it parses, text otherwise
    pub fn from_stdout(stdout: &str) -> Self {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return CommandOutput::Empty;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => CommandOutput::Json(value),
            Err(_) => CommandOutput::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CommandOutput::Empty)
    }

    /// Parsed JSON, if any
    pub fn json(&self) -> Option<&Value> {
        match self {
            CommandOutput::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Elements of a top-level JSON array; empty for anything else
    pub fn into_records(self) -> Vec<Value> {
        match self {
            CommandOutput::Json(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }

    /// Single scalar answer, as returned by `--query <field> --output tsv`
    ///
    /// TSV output that happens to look like JSON (a bare number, a quoted
    /// string) is parsed as JSON by [`CommandOutput::from_stdout`]; those
    /// scalars are folded back into text here.
    pub fn scalar_text(&self) -> Option<String> {
        let text = match self {
            CommandOutput::Text(text) => text.trim().to_string(),
            CommandOutput::Json(Value::String(s)) => s.trim().to_string(),
            CommandOutput::Json(Value::Number(n)) => n.to_string(),
            CommandOutput::Json(Value::Bool(b)) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Executes provider CLI commands
///
/// Implementations must be shareable across pipeline worker threads.
pub trait CommandGateway: Send + Sync {
    /// Run one command; failures degrade to [`CommandOutput::Empty`]
    fn execute(&self, command: &AzCommand) -> CommandOutput;
}
