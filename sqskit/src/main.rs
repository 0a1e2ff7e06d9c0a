//! sqskit - command line client for Amazon SQS
//!
//! Drives the queue manager against the 2011-10-01 query API. Credentials and
//! region come from flags, `AWS_*`/`SQSKIT_*` environment variables or an
//! optional `sqskit.toml` file.

mod commands;

use clap::Parser;
use sqskit_sqs::{Config, Manager, Region};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "sqskit")]
#[command(about = "Amazon SQS query API client", long_about = None)]
struct Args {
    /// Region the endpoint is built for
    #[arg(long, env = "SQSKIT_REGION")]
    region: Option<Region>,

    /// Endpoint template, `%s` is replaced by the region
    #[arg(long, env = "SQSKIT_ENDPOINT")]
    endpoint: Option<String>,

    /// AWS access key id
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SQSKIT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "SQSKIT_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    /// File and environment configuration with flags applied on top
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load()?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(access_key) = &self.access_key {
            config.access_key = access_key.clone();
        }
        if let Some(secret_key) = &self.secret_key {
            config.secret_key = secret_key.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "sqskit={0},sqskit_sqs={0},sqskit_auth={0}",
                    args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = args.config()?;
    if !config.region.is_known() {
        info!(region = %config.region, "Using a region without a built-in constant");
    }

    let manager = Manager::from_config(&config)?;
    commands::run(&manager, args.command).await
}
