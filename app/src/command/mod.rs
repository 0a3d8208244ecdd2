//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is a separate strategy with its own input type, dispatched
//! statically from `main`. No trait objects, no boxing.

mod bot;
mod init;
mod version;

pub use bot::{BotInput, BotStrategy};
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
