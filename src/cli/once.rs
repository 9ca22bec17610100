//! Single-cycle command implementation

use super::build_poller;
use crate::config::Config;
use crate::scheduler::CycleOutcome;
use chrono::Utc;
use clap::Args;

#[derive(Args, Debug)]
pub struct OnceArgs {
    /// Send a notice even when nothing qualifies
    #[arg(long)]
    pub notify_empty: bool,

    /// Print alerts instead of storing and posting them
    #[arg(long)]
    pub dry_run: bool,
}

impl OnceArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut options = config.poller_options();
        options.notify_empty |= self.notify_empty;

        let mut poller = build_poller(config, options, self.dry_run)?;
        match poller.run_cycle(Utc::now()).await {
            CycleOutcome::Aborted(reason) => anyhow::bail!("cycle aborted: {}", reason),
            outcome => {
                tracing::info!(outcome = ?outcome, "Cycle finished");
                Ok(())
            }
        }
    }
}
