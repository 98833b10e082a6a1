//! Acquisition loop
//!
//! One cycle = write the poll request, collect the response within the read
//! timeout, and classify it as a frame or as nothing. Short reads are never
//! fatal; they simply produce [`CycleResult::Empty`].

use std::time::Duration;

use ecu_conv::ChannelTable;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::config::EcuLinkConfig;
use crate::transport::{LinkAdapter, LinkError};

/// Outcome of one request/response cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleResult {
    /// A response long enough to decode every channel
    Data(Vec<u8>),
    /// No response, or one too short to use
    Empty,
}

impl CycleResult {
    /// Frame bytes, if any
    pub fn frame(&self) -> Option<&[u8]> {
        match self {
            CycleResult::Data(frame) => Some(frame),
            CycleResult::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CycleResult::Empty)
    }
}

/// Drives request/response cycles against the ECU link
pub struct Acquisition<L> {
    link: L,
    request: Vec<u8>,
    max_read: usize,
    read_timeout: Duration,
    min_frame_len: usize,
    cycles: u64,
}

impl<L: LinkAdapter> Acquisition<L> {
    /// Create an acquisition loop owning `link`
    ///
    /// The minimum frame length comes from the config override when set,
    /// otherwise from the channel table.
    pub fn new(link: L, config: &EcuLinkConfig, table: &ChannelTable) -> Self {
        Self {
            link,
            request: config.request_bytes(),
            max_read: config.max_read,
            read_timeout: config.read_timeout(),
            min_frame_len: config.min_frame_len.unwrap_or_else(|| table.min_frame_len()),
            cycles: 0,
        }
    }

    /// Shortest response accepted as data
    pub fn min_frame_len(&self) -> usize {
        self.min_frame_len
    }

    /// Number of cycles run so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// The owned link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Run one request/response cycle
    pub async fn run_cycle(&mut self) -> CycleResult {
        self.cycles += 1;

        if let Err(e) = self.link.send(&self.request).await {
            warn!(link = %self.link.describe(), error = %e, "Poll request failed");
            return CycleResult::Empty;
        }

        let frame = self.collect().await;

        if frame.len() >= self.min_frame_len {
            debug!(bytes = frame.len(), "Received {} bytes from ECU", frame.len());
            CycleResult::Data(frame)
        } else {
            warn!(
                bytes = frame.len(),
                min = self.min_frame_len,
                "No valid ECU data received"
            );
            CycleResult::Empty
        }
    }

    /// Accumulate response bytes until `max_read`, end of stream, or timeout
    async fn collect(&mut self) -> Vec<u8> {
        let deadline = Instant::now() + self.read_timeout;
        let mut frame = vec![0u8; self.max_read];
        let mut len = 0;

        while len < self.max_read {
            match tokio::time::timeout_at(deadline, self.link.receive(&mut frame[len..])).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => len += n,
                Ok(Err(LinkError::Timeout(_))) | Err(_) => break,
                Ok(Err(e)) => {
                    warn!(link = %self.link.describe(), error = %e, "Read from ECU failed");
                    break;
                }
            }
        }

        frame.truncate(len);
        frame
    }
}

/// Ticker for a fixed loop cadence
///
/// Slow cycles push the next tick back instead of bursting to catch up.
pub fn cadence(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
