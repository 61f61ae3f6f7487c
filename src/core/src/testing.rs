//! Scripted in-memory gateway for tests
//!
//! Responses are registered against the exact rendered command line.
//! Unregistered commands answer [`CommandOutput::Empty`], the same thing a
//! failed CLI call produces. Every call is recorded so tests can assert how
//! often a query was issued.

use crate::traits::{AzCommand, CommandGateway, CommandOutput};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Default)]
pub struct ScriptedGateway {
    responses: Mutex<HashMap<String, CommandOutput>>,
    calls: Mutex<Vec<String>>,
    /// Simulated latency per call
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` inside every call
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Register a response for a command
    pub fn on(&self, command: &AzCommand, output: CommandOutput) -> &Self {
        self.responses.lock().insert(command.command_line(), output);
        self
    }

    /// Register a JSON response for a command
    pub fn on_json(&self, command: &AzCommand, value: Value) -> &Self {
        self.on(command, CommandOutput::Json(value))
    }

    /// Register a text response for a command
    pub fn on_text(&self, command: &AzCommand, text: impl Into<String>) -> &Self {
        self.on(command, CommandOutput::Text(text.into()))
    }

    /// Every command line executed so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of times this exact command was executed
    pub fn call_count(&self, command: &AzCommand) -> usize {
        let line = command.command_line();
        self.calls.lock().iter().filter(|c| **c == line).count()
    }

    /// Number of executed commands whose line contains `needle`
    pub fn calls_containing(&self, needle: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.contains(needle)).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

impl CommandGateway for ScriptedGateway {
    fn execute(&self, command: &AzCommand) -> CommandOutput {
        let line = command.command_line();
        self.calls.lock().push(line.clone());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.responses
            .lock()
            .get(&line)
            .cloned()
            .unwrap_or(CommandOutput::Empty)
    }
}
