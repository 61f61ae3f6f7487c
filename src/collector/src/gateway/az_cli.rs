//! Azure CLI gateway
//!
//! Runs `az` as a child process, without a shell, and classifies its stdout.
//! There is no retry: a spawn failure or non-zero exit is logged once and
//! surfaces as an empty result.

use azgraph_core::{AzCommand, CommandGateway, CommandOutput};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a CLI invocation produced no usable output
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The binary could not be started
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited unsuccessfully
    #[error("command failed ({code:?}): {command}\n{stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Gateway backed by the locally installed Azure CLI
///
/// Uses whatever session `az login` established; no credentials pass
/// through here.
#[derive(Debug, Clone)]
pub struct AzCliGateway {
    binary: String,
}

impl AzCliGateway {
    /// Create a gateway that invokes `binary` (usually `az`)
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    /// Run a command and return its stdout
    pub fn run(&self, command: &AzCommand) -> Result<String, GatewayError> {
        debug!("Running: {}", command);

        let output = Command::new(&self.binary)
            .args(command.args())
            .output()
            .map_err(|source| GatewayError::Spawn {
                command: command.command_line(),
                source,
            })?;

        if !output.status.success() {
            return Err(GatewayError::Failed {
                command: command.command_line(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for AzCliGateway {
    fn default() -> Self {
        Self::new("az")
    }
}

impl CommandGateway for AzCliGateway {
    fn execute(&self, command: &AzCommand) -> CommandOutput {
        match self.run(command) {
            Ok(stdout) => CommandOutput::from_stdout(&stdout),
            Err(err) => {
                warn!("{}", err);
                CommandOutput::Empty
            }
        }
    }
}
