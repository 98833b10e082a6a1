//! Relay consumer
//!
//! Turns each frame into one comma-separated text record and forwards it to
//! the downstream display. Cycles without data write nothing, so the sink
//! never sees partial records.

use std::io;

use ecu_conv::{decode, ChannelTable, ConvResult, DecodedChannel};
use ecu_link::CycleResult;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Forwards decoded records to a downstream sink
pub struct RelayConsumer<W> {
    table: ChannelTable,
    /// Table indices in record order
    fields: Vec<usize>,
    sink: W,
    records_sent: u64,
}

impl<W> RelayConsumer<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Create a consumer emitting `channels` in the given order
    pub fn new(table: ChannelTable, channels: &[String], sink: W) -> ConvResult<Self> {
        let fields = channels
            .iter()
            .map(|name| table.index_of(name))
            .collect::<ConvResult<Vec<_>>>()?;

        Ok(Self {
            table,
            fields,
            sink,
            records_sent: 0,
        })
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn records_sent(&self) -> u64 {
        self.records_sent
    }

    /// Decode the relay channels and build the record line
    pub fn record_for(&self, frame: &[u8]) -> ConvResult<String> {
        let values = self
            .fields
            .iter()
            .filter_map(|&i| self.table.get(i))
            .map(|channel| decode(frame, channel))
            .collect::<ConvResult<Vec<_>>>()?;

        let summary = values
            .iter()
            .map(|v| format!("{}={}", v.name(), v.formatted()))
            .collect::<Vec<_>>()
            .join(", ");
        info!("{}", summary);

        Ok(format_record(&values))
    }

    /// Handle one cycle; returns true when a record was written
    pub async fn on_cycle(&mut self, result: &CycleResult) -> io::Result<bool> {
        let Some(frame) = result.frame() else {
            return Ok(false);
        };

        let record = match self.record_for(frame) {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "Skipping relay record");
                return Ok(false);
            }
        };

        info!("Sending to display: {}", record.trim_end());
        self.sink.write_all(record.as_bytes()).await?;
        self.sink.flush().await?;
        self.records_sent += 1;
        Ok(true)
    }
}

/// Format values as one comma-separated line with per-channel precision
pub fn format_record(values: &[DecodedChannel<'_>]) -> String {
    let mut line = values
        .iter()
        .map(DecodedChannel::formatted)
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}
