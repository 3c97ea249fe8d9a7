//! Library surface of the Settle CLI
//!
//! The binary is a thin argument-parsing wrapper; the watch loop, the action
//! runner, and the status rendering live here so integration tests can drive
//! them directly with fake actions and synthetic event streams.

pub mod action;
pub mod status;
pub mod watch;
