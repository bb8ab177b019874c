// ABOUTME: Command module aggregator for the ferry CLI.
// ABOUTME: Re-exports build, deploy, rollback, and list command handlers.

mod build;
mod connection;
mod deploy;
mod list;
mod rollback;

pub use build::build;
pub use deploy::deploy;
pub use list::list;
pub use rollback::rollback;
