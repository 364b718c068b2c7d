//! Streaming host loop: newline-delimited JSON in, one batch per cadence tick.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::chart::{Event, RenderingSurface, TelemetryChart};

pub const DEFAULT_CADENCE_MS: u64 = 100;

/// What the reader task saw besides the events it forwarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ReadStats {
    bad_lines: usize,
    bad_events: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub batches: usize,
    pub events: usize,
    /// Events dropped: undecodable elements plus events the chart rejected or skipped.
    pub skipped: usize,
    /// Lines that were not JSON, or JSON that is neither an object nor an array.
    pub bad_lines: usize,
}

/// Drives `chart` from `reader` until EOF (after draining) or cancellation.
pub async fn run<R, S>(
    reader: R,
    chart: &mut TelemetryChart<S>,
    cadence: Duration,
    token: CancellationToken,
) -> anyhow::Result<DriverStats>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    S: RenderingSurface,
{
    let (tx, mut rx) = mpsc::channel::<Event>(1024);
    let reader_task = tokio::spawn(read_lines(reader, tx));

    let mut stats = DriverStats::default();
    let mut ticker = interval(cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(cadence_ms = cadence.as_millis() as u64, "driver started");

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("driver cancelled");
                break;
            }
            _ = ticker.tick() => {}
        }

        // Drain everything that arrived since the last tick
        let mut batch = Vec::new();
        let mut closed = false;
        loop {
            match rx.try_recv() {
                Ok(event) => batch.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }

        if !batch.is_empty() {
            match chart.push_data(&batch) {
                Ok(report) => {
                    if report.rendered {
                        stats.batches += 1;
                    }
                    stats.events += report.ingested;
                    stats.skipped += report.skipped;
                }
                Err(e) => {
                    warn!("batch dropped: {}", e);
                    stats.skipped += batch.len();
                }
            }
        }

        if closed {
            break;
        }
    }

    reader_task.abort();
    if let Ok(read) = reader_task.await {
        stats.bad_lines = read.bad_lines;
        stats.skipped += read.bad_events;
    }

    info!(
        batches = stats.batches,
        events = stats.events,
        skipped = stats.skipped,
        "driver stopped"
    );
    Ok(stats)
}

/// A line holds one event object or an array of them. Each element is decoded on
/// its own so one bad element never takes its neighbours down with it.
async fn read_lines<R>(reader: R, tx: mpsc::Sender<Event>) -> ReadStats
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut read = ReadStats::default();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("input read failed: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let elements = match serde_json::from_str::<Value>(line) {
            Ok(Value::Array(elements)) => elements,
            Ok(element @ Value::Object(_)) => vec![element],
            Ok(other) => {
                warn!("ignoring line that is not an event or array: {}", other);
                read.bad_lines += 1;
                continue;
            }
            Err(e) => {
                warn!("ignoring line that is not JSON: {}", e);
                read.bad_lines += 1;
                continue;
            }
        };

        for element in elements {
            let event = match serde_json::from_value::<Event>(element) {
                Ok(event) => event,
                Err(e) => {
                    warn!("dropping undecodable event: {}", e);
                    read.bad_events += 1;
                    continue;
                }
            };
            if tx.send(event).await.is_err() {
                return read;
            }
        }
    }

    read
}
