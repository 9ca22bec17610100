//! Run command implementation

use super::build_poller;
use crate::config::Config;
use crate::scheduler::run_forever;
use clap::Args;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Print alerts instead of storing and posting them
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let cadence = config.cadence();
        tracing::info!(
            interval_secs = cadence.interval.as_secs(),
            sunday_interval_secs = cadence.sunday_interval.as_secs(),
            dry_run = self.dry_run,
            "Starting poller"
        );
        let mut poller = build_poller(config, config.poller_options(), self.dry_run)?;
        run_forever(&mut poller, cadence).await
    }
}
