use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use saveq::core::{Clock, ManualClock, QuantaClock, SystemClock};
use saveq::{CallQueue, ConsoleSink, JsonExporterSink, QueueConfig, Sink, Timestamp};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ClockKind {
    System,
    Quanta,
    /// Fixed start instant, one second per reading
    Manual,
}

#[derive(Parser, Debug)]
#[command(name = "saveq-demo")]
#[command(about = "Buffer a few save calls and run them in order")]
struct Args {
    /// Write the JSON export to this file instead of stdout
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Timestamp source for the buffered records
    #[arg(long, value_enum, default_value_t = ClockKind::System)]
    clock: ClockKind,

    /// Stop at the first failed save instead of draining the rest
    #[arg(long)]
    abort_on_error: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let clock: Box<dyn Clock> = match args.clock {
        ClockKind::System => Box::new(SystemClock),
        ClockKind::Quanta => Box::new(QuantaClock::new()),
        ClockKind::Manual => Box::new(ManualClock::new(
            Timestamp::from_secs(1_416_096_000),
            Duration::from_secs(1),
        )),
    };

    let console1: Arc<dyn Sink> = Arc::new(ConsoleSink::new(1));
    let console2: Arc<dyn Sink> = Arc::new(ConsoleSink::new(2));
    let json: Arc<dyn Sink> = match &args.json_out {
        Some(path) => {
            info!("JSON export: {}", path.display());
            Arc::new(
                JsonExporterSink::create(path)
                    .with_context(|| format!("create {}", path.display()))?,
            )
        }
        None => Arc::new(JsonExporterSink::new()),
    };

    let config = if args.abort_on_error {
        QueueConfig::abort_on_error()
    } else {
        QueueConfig::default()
    };
    let mut queue = CallQueue::with_config(config);

    queue.enqueue(&console1, clock.now(), "Test Message", "SwiftCrunch");
    queue.enqueue(&console2, clock.now(), "Another Message", "Antonio Bello");
    queue.enqueue(&console1, clock.now(), "Hope it's useful", "Swift Tuples");
    queue.enqueue(&json, clock.now(), "Json exporter", "Me");

    let report = queue.process().context("process deferred saves")?;
    for failure in &report.failures {
        warn!(
            "entry {} ({}) failed: {}",
            failure.position,
            failure.record.author(),
            failure.error
        );
    }

    for sink in [&console1, &console2, &json] {
        sink.flush().context("flush sink")?;
    }

    if !report.is_clean() {
        anyhow::bail!("{} of {} saves failed", report.failures.len(), report.executed);
    }
    Ok(())
}
