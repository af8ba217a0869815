//! Subcommand implementations.

pub mod count;
pub mod create;
pub mod delete;
pub mod events;
pub mod get;
pub mod ingest;
pub mod init;
pub mod list;
pub mod update;
