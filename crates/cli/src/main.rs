// CLI modules
mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Dump, Stress, Version, Watch};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

command_enum! {
    (Dump, Dump),
    (Stress, Stress),
    (Version, Version),
    (Watch, Watch),
}

/// Install a compact stdout layer filtered at `level` unless `RUST_LOG`
///  says otherwise. The guard must outlive every log call.
fn init_logging(level: tracing::Level) -> tracing_appender::non_blocking::WorkerGuard {
    let (stdout_writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stdout_layer).init();
    guard
}

fn build_context(args: &Args) -> anyhow::Result<(cli::op::OpContext, tracing::Level)> {
    let config = cli::op::load_config(args.config.as_deref())
        .context("failed to load config file")?;
    let level = cli::op::resolve_log_level(args.log_level.as_deref(), &config)
        .context("invalid --log-level")?;
    Ok((cli::op::OpContext::new(config), level))
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let (ctx, level) = match build_context(&args) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let guard = init_logging(level);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            tracing::error!("command failed: {}", e);
            eprintln!("Error: {}", e);
            drop(guard);
            std::process::exit(1);
        }
    }
}
