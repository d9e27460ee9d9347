use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use futures::future::join_all;

use pods::{Cluster, ConfigError, Page, Resource, StoreError, WriteOutcome};

const CLUSTER_URL: &str = "http://cluster.local";
const POD_URL: &str = "http://stress.local";
const START_VALUE: u64 = 1000;

/// Race compare-and-swap increments against a single page
#[derive(Args, Debug, Clone)]
pub struct Stress {
    /// Number of concurrent writer tasks
    #[arg(long, default_value_t = 10)]
    pub writers: u64,

    /// Successful increments each writer must land
    #[arg(long, default_value_t = 10)]
    pub increments: u64,

    /// Pause between reading the value and writing it back
    #[arg(long, default_value_t = 1)]
    pub delay_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum StressError {
    #[error("page holds a non-numeric value: {0:?}")]
    NotANumber(String),

    #[error("writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug)]
pub struct StressReport {
    pub url: String,
    pub final_value: u64,
    pub expected_value: u64,
    pub version: u64,
    pub conflicts: u64,
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "page:      {}", self.url)?;
        writeln!(f, "final:     {}", self.final_value)?;
        writeln!(f, "expected:  {}", self.expected_value)?;
        writeln!(f, "version:   {}", self.version)?;
        write!(f, "conflicts: {}", self.conflicts)
    }
}

async fn increment(
    page: Arc<Page>,
    times: u64,
    pause: Duration,
    conflicts: Arc<AtomicU64>,
) -> Result<(), StressError> {
    let mut done = 0;
    while done < times {
        let snapshot = page.content();
        let n: u64 = snapshot
            .content
            .parse()
            .map_err(|_| StressError::NotANumber(snapshot.content.clone()))?;
        tokio::time::sleep(pause).await;

        match page.set_content("text/plain", (n + 1).to_string(), Some(&snapshot.etag)) {
            WriteOutcome::Written(_) => done += 1,
            WriteOutcome::Conflict { .. } => {
                conflicts.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Stress {
    type Error = StressError;
    type Output = StressReport;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let cluster = Cluster::with_config(CLUSTER_URL, ctx.config.clone())?;
        let (pod, _) = cluster.new_pod(POD_URL);
        let page = pod.new_page();
        page.set_content("text/plain", START_VALUE.to_string(), None)
            .into_result()?;

        let conflicts = Arc::new(AtomicU64::new(0));
        let pause = Duration::from_millis(self.delay_ms);
        tracing::info!(
            writers = self.writers,
            increments = self.increments,
            "starting stress run"
        );

        let handles = (0..self.writers).map(|_| {
            tokio::spawn(increment(
                page.clone(),
                self.increments,
                pause,
                conflicts.clone(),
            ))
        });
        for joined in join_all(handles).await {
            joined??;
        }

        let snapshot = page.content();
        let final_value = snapshot
            .content
            .parse()
            .map_err(|_| StressError::NotANumber(snapshot.content.clone()))?;

        Ok(StressReport {
            url: page.url().unwrap_or_default(),
            final_value,
            expected_value: START_VALUE + self.writers * self.increments,
            version: page.version(),
            conflicts: conflicts.load(Ordering::Relaxed),
        })
    }
}
