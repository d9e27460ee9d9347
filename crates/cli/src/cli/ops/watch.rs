use std::time::Duration;

use clap::Args;

use pods::{Cluster, ConfigError, Resource, StoreError};

const CLUSTER_URL: &str = "http://cluster.local";
const POD_URL: &str = "http://watch.local";

/// Long-poll a page while a writer task changes it
#[derive(Args, Debug, Clone)]
pub struct Watch {
    /// Number of writes the writer task makes
    #[arg(long, default_value_t = 5)]
    pub changes: u64,

    /// Pause between writes
    #[arg(long, default_value_t = 100)]
    pub interval_ms: u64,

    /// Give up if a single wait sees no change for this long
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("no change observed within {0:?}")]
    TimedOut(Duration),

    #[error("writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Watch {
    type Error = WatchError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let cluster = Cluster::with_config(CLUSTER_URL, ctx.config.clone())?;
        let (pod, _) = cluster.new_pod(POD_URL);
        let page = pod.new_page();
        let timeout = Duration::from_millis(self.timeout_ms);

        let start = page.version();
        let target = start + self.changes;

        let writer = {
            let page = page.clone();
            let changes = self.changes;
            let interval = Duration::from_millis(self.interval_ms);
            tokio::spawn(async move {
                for i in 1..=changes {
                    tokio::time::sleep(interval).await;
                    let etag = page.set_content("text/plain", format!("change {i}"), None);
                    tracing::debug!(etag = %etag.etag(), "writer changed page");
                }
            })
        };

        let mut lines = vec![format!("watching {}", page.url().unwrap_or_default())];
        let mut etag = page.etag();
        let mut wakeups = 0u64;
        // writes that land between two waits coalesce into one wake-up
        while page.version() < target {
            let Some(next) = page.wait_for_change_timeout(&etag, timeout).await? else {
                writer.abort();
                return Err(WatchError::TimedOut(timeout));
            };
            lines.push(format!(
                "  etag {} -> {} ({:?})",
                etag,
                next,
                page.content().content
            ));
            etag = next;
            wakeups += 1;
        }
        writer.await?;

        lines.push(format!(
            "woke {wakeups} times for {} changes",
            page.version() - start
        ));
        Ok(lines.join("\n"))
    }
}
