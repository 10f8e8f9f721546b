use anyhow::bail;
use clap::Parser;
use logspout_kafka::kafka::StreamOutcome;
use logspout_kafka::router::{LogRecord, Route, RouteCloser};
use logspout_kafka::{Config, Error, KafkaAdapter, ADAPTER_NAME};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "logspout-kafka")]
#[command(about = "Ships JSON log records from stdin to a Kafka topic", long_about = None)]
struct Args {
    #[arg(
        short,
        long,
        value_name = "URI",
        help = "Route such as kafka://broker1:9092,broker2:9092/topic"
    )]
    route: String,

    #[arg(long, default_value_t = 1024, help = "Records buffered between stdin and the producer")]
    buffer: usize,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

/// Closes the stdin route by telling the reader task to stop.
struct StdinRoute {
    closed: watch::Sender<bool>,
}

impl RouteCloser for StdinRoute {
    fn close(&self) {
        self.closed.send_replace(true);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env().map_err(Error::Settings)?;

    init_logging(args.json_logs, args.verbose || config.debug);

    info!("Starting logspout-kafka");

    let route = Route::from_uri(&args.route)?;
    if route.adapter != ADAPTER_NAME {
        bail!("Route adapter {:?} is not {:?}", route.adapter, ADAPTER_NAME);
    }

    let (closed_tx, closed_rx) = watch::channel(false);
    let closer = Arc::new(StdinRoute { closed: closed_tx });

    let adapter = match KafkaAdapter::connect(&route, closer, &config).await {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("Failed to start Kafka adapter: {}", e);
            return Err(e.into());
        }
    };

    let (tx, rx) = mpsc::channel(args.buffer.max(1));
    let reader = tokio::spawn(read_stdin(tx, closed_rx));

    let outcome = adapter.stream(rx).await;
    reader.abort();

    match outcome {
        StreamOutcome::Drained => {
            info!("Input exhausted, shutting down");
            Ok(())
        }
        StreamOutcome::RouteClosed => bail!("Route closed after a formatting failure"),
    }
}

async fn read_stdin(tx: mpsc::Sender<LogRecord>, mut closed: watch::Receiver<bool>) {
    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());

    loop {
        let line = tokio::select! {
            _ = closed.changed() => {
                debug!("Route closed, no longer reading stdin");
                return;
            }
            line = lines.next() => line,
        };

        let line = match line {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                warn!("Failed to read stdin: {}", e);
                return;
            }
            None => return,
        };

        if line.is_empty() {
            continue;
        }

        let record = serde_json::from_str::<LogRecord>(&line)
            .unwrap_or_else(|_| LogRecord::new(line).with_source("stdin"));

        if tx.send(record).await.is_err() {
            return;
        }
    }
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("logspout_kafka=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("logspout_kafka=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
