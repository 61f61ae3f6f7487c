//! Command gateway implementations and the command catalog
//!
//! [`AzCliGateway`] runs the real Azure CLI. [`commands`] builds every
//! query the collector issues, so tests can script responses for exactly the
//! same command lines.

pub mod az_cli;
pub mod commands;

pub use az_cli::{AzCliGateway, GatewayError};
