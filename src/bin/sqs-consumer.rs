//! # SQS Consumer Binary
//!
//! Resolves configuration, bootstraps the search index, then polls the queue
//! until interrupted (exit 0), a queue operation fails (exit 1) or the
//! configuration is invalid (exit 2).

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use sqs_consumer::config::{ConfigOverrides, ConsumerConfig};
use sqs_consumer::consumer::{ConsumerLoop, LoopExit, PollingConsumer, ShutdownSignal};
use sqs_consumer::indexing::indexer_from_config;
use sqs_consumer::logging::init_structured_logging;
use sqs_consumer::messaging::SqsQueueClient;
use sqs_consumer::Result;

#[derive(Parser, Debug)]
#[command(name = "sqs-consumer")]
#[command(about = "Receive, log and delete messages from an SQS queue")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Queue service region (default: us-east-1)
    #[arg(short, long)]
    region: Option<String>,

    /// Name of the queue to consume
    #[arg(short, long)]
    queue: Option<String>,

    /// Seconds a received message stays hidden from other consumers, clamped to [0, 43200] (default: 5)
    #[arg(short, long, allow_negative_numbers = true)]
    timeout: Option<i64>,

    /// Service endpoint override; pass an empty value to use the AWS endpoint (default: http://localhost:4566)
    #[arg(short = 'u', long)]
    endpoint_url: Option<String>,

    /// Long-poll wait time in seconds, clamped to [0, 20] (default: 0)
    #[arg(long)]
    wait_time: Option<i64>,

    /// Pause in milliseconds after an empty poll (default: 0, busy polling)
    #[arg(long)]
    idle_delay_ms: Option<i64>,

    /// Network timeout in seconds for each queue and search request (default: 30)
    #[arg(long)]
    request_timeout: Option<i64>,

    /// Search service base URL; index bootstrap is skipped when unset
    #[arg(long)]
    search_url: Option<String>,

    /// Search index to ensure at startup (default: messages)
    #[arg(long)]
    search_index: Option<String>,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            region: self.region.clone(),
            queue: self.queue.clone(),
            timeout: self.timeout,
            endpoint_url: self.endpoint_url.clone(),
            wait_time_seconds: self.wait_time,
            idle_delay_ms: self.idle_delay_ms,
            request_timeout_seconds: self.request_timeout,
            search_url: self.search_url.clone(),
            search_index: self.search_index.clone(),
        }
    }
}

async fn run(cli: Cli) -> Result<LoopExit> {
    let config = ConsumerConfig::load(cli.config.as_deref(), &cli.overrides())?;

    info!(
        queue = %config.queue.queue_name,
        region = %config.queue.region,
        visibility_timeout = config.queue.visibility_timeout_seconds,
        endpoint = config.queue.endpoint_url.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    // Indexer failures are the collaborator's concern; consumption still starts
    match indexer_from_config(&config.search) {
        Ok(indexer) => {
            if let Err(e) = indexer.init().await {
                warn!(indexer = indexer.indexer_type(), error = %e, "Search index bootstrap failed");
            }
        }
        Err(e) => warn!(error = %e, "Search indexer could not be created"),
    }

    let client = Arc::new(SqsQueueClient::from_config(&config.queue).await);
    let shutdown = ShutdownSignal::new();
    let _interrupt_listener = shutdown.listen_for_interrupt();

    let consumer = PollingConsumer::new(config.queue, client);
    let consumer_loop = ConsumerLoop::new(consumer, shutdown).with_idle_delay(config.idle_delay);

    Ok(consumer_loop.run().await)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_structured_logging();

    let code = match run(cli).await {
        Ok(exit) => {
            match &exit {
                LoopExit::Interrupted => info!("App stopped"),
                LoopExit::Failed(e) => error!(error = %e, "Consumer stopped after queue error"),
            }
            exit.exit_code()
        }
        Err(e) => {
            eprintln!("{e}");
            error!(error = %e, "Startup failed");
            e.exit_code()
        }
    };

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
