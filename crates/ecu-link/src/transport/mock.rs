//! Mock link adapter for testing and hardware-free runs

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ecu_conv::{encode_physical, ChannelTable};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{LinkAdapter, LinkError};

/// Mock link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    /// Simulated response latency in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
    /// Length of synthetic frames
    #[serde(default = "default_frame_len")]
    pub frame_len: usize,
}

/// Most recent requests kept for inspection
pub const SENT_LOG_CAPACITY: usize = 64;

fn default_frame_len() -> usize {
    32
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            frame_len: default_frame_len(),
        }
    }
}

#[derive(Default)]
struct MockState {
    connected: bool,
    /// Scripted responses, one consumed per request
    responses: VecDeque<Vec<u8>>,
    /// Bytes of the current response not yet read
    pending: VecDeque<u8>,
    /// Most recent requests, oldest first, capped at [`SENT_LOG_CAPACITY`]
    sent: VecDeque<Vec<u8>>,
    /// Requests seen over the link's lifetime
    polls: u64,
    synthetic: Option<SyntheticEcu>,
}

/// Mock link adapter
///
/// Answers each request with the next scripted response. When the script is
/// exhausted it answers with a synthetic frame (if configured) or silence.
pub struct MockLink {
    config: MockConfig,
    state: Arc<Mutex<MockState>>,
}

/// Shared handle for scripting and inspecting a [`MockLink`] after it has
/// been moved into an acquisition loop
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockLink {
    /// Mock that only answers with scripted responses
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockState {
                connected: true,
                ..Default::default()
            })),
        }
    }

    /// Mock that simulates an ECU producing frames for `table`
    pub fn synthetic(config: MockConfig, table: ChannelTable) -> Self {
        let frame_len = config.frame_len.max(table.min_frame_len());
        let link = Self::new(config);
        link.state.lock().synthetic = Some(SyntheticEcu::new(table, frame_len));
        link
    }

    /// Handle sharing this mock's state
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: self.state.clone(),
        }
    }
}

impl MockHandle {
    /// Queue a response for a future request (empty = no answer)
    pub fn push_response(&self, response: Vec<u8>) {
        self.state.lock().responses.push_back(response);
    }

    /// Most recent requests, oldest first
    pub fn sent_requests(&self) -> Vec<Vec<u8>> {
        self.state.lock().sent.iter().cloned().collect()
    }

    /// Total requests written since creation
    pub fn poll_count(&self) -> u64 {
        self.state.lock().polls
    }

    /// Set connection state
    pub fn set_connected(&self, connected: bool) {
        self.state.lock().connected = connected;
    }
}

#[async_trait]
impl LinkAdapter for MockLink {
    async fn send(&mut self, request: &[u8]) -> Result<(), LinkError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(LinkError::Closed);
        }

        if state.sent.len() == SENT_LOG_CAPACITY {
            state.sent.pop_front();
        }
        state.sent.push_back(request.to_vec());
        state.polls += 1;
        let poll = state.polls;

        let response = match state.responses.pop_front() {
            Some(response) => response,
            None => state
                .synthetic
                .as_ref()
                .map(|ecu| ecu.frame(poll))
                .unwrap_or_default(),
        };
        state.pending = response.into();

        tracing::trace!(?request, "Mock link: request sent");
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        let mut state = self.state.lock();
        if !state.connected {
            return Err(LinkError::Closed);
        }

        let n = buf.len().min(state.pending.len());
        for (slot, byte) in buf.iter_mut().zip(state.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// Generates plausible frames with values drifting between polls
struct SyntheticEcu {
    table: ChannelTable,
    frame_len: usize,
}

impl SyntheticEcu {
    fn new(table: ChannelTable, frame_len: usize) -> Self {
        Self { table, frame_len }
    }

    fn frame(&self, poll: u64) -> Vec<u8> {
        let mut frame = vec![0u8; self.frame_len];
        let phase = poll as f64 * 0.1;

        for channel in &self.table {
            let nominal = nominal_value(&channel.name)
                .unwrap_or(channel.additive_offset + channel.scale * 1000.0);
            let value = nominal * (1.0 + 0.05 * phase.sin());
            let bytes = encode_physical(channel, value);
            frame[channel.byte_offset..channel.byte_offset + bytes.len()].copy_from_slice(&bytes);
        }

        frame
    }
}

fn nominal_value(name: &str) -> Option<f64> {
    match name {
        "coolant" => Some(85.0),
        "mat" => Some(30.0),
        "afr1" => Some(14.7),
        "map" => Some(100.0),
        _ => None,
    }
}
