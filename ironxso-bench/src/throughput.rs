//! Wall-clock stream parsing throughput, outside of criterion.

use ironxso_schema::XsoType;
use ironxso_stream::{QueueHandler, StreamError, XsoParserBuilder};
use std::time::{Duration, Instant};

/// Outcome of one stream parsing run.
#[derive(Debug, Clone)]
pub struct ThroughputResult {
    /// Top-level elements delivered to the handler.
    pub elements: u64,
    /// Input bytes fed to the parser.
    pub bytes: u64,
    /// Time spent feeding.
    pub duration: Duration,
}

impl ThroughputResult {
    /// Returns elements per second.
    #[must_use]
    pub fn elements_per_second(&self) -> f64 {
        self.elements as f64 / self.duration.as_secs_f64()
    }

    /// Returns bytes per second.
    #[must_use]
    pub fn bytes_per_second(&self) -> f64 {
        self.bytes as f64 / self.duration.as_secs_f64()
    }

    /// Returns megabytes per second.
    #[must_use]
    pub fn mb_per_second(&self) -> f64 {
        self.bytes_per_second() / (1024.0 * 1024.0)
    }
}

/// Feeds `input` to a fresh parser `rounds` times and counts the parsed
/// elements of type `ty`.
///
/// # Errors
/// Returns the first stream error.
pub fn measure_stream(
    ty: &XsoType,
    input: &str,
    rounds: u64,
) -> Result<ThroughputResult, StreamError> {
    let queue = QueueHandler::new();
    let mut parser = XsoParserBuilder::new().handle(ty, queue.clone()).build()?;

    let start = Instant::now();
    let mut elements = 0u64;
    for _ in 0..rounds {
        parser.feed_str(input)?;
        elements += queue.drain().len() as u64;
    }
    let duration = start.elapsed();

    Ok(ThroughputResult {
        elements,
        bytes: rounds * input.len() as u64,
        duration,
    })
}
