//! Mode runners
//!
//! Relay mode is a single loop: acquire, decode, forward. Interactive mode
//! adds an input task that samples the button on its own fast tick and
//! publishes the selected index for the acquisition loop to read.

use std::time::Duration;

use ecu_link::{cadence, Acquisition, LinkAdapter};
use tokio::io::AsyncWrite;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::display::DisplayConsumer;
use crate::input::InputPin;
use crate::relay::RelayConsumer;
use crate::render::Renderer;
use crate::selection::{SelectionStateMachine, SharedSelection};

// =============================================================================
// Relay mode
// =============================================================================

pub struct RelayMode<L, W> {
    acquisition: Acquisition<L>,
    relay: RelayConsumer<W>,
    interval: Duration,
}

impl<L, W> RelayMode<L, W>
where
    L: LinkAdapter,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(acquisition: Acquisition<L>, relay: RelayConsumer<W>, interval: Duration) -> Self {
        Self {
            acquisition,
            relay,
            interval,
        }
    }

    pub fn relay(&self) -> &RelayConsumer<W> {
        &self.relay
    }

    pub fn acquisition(&self) -> &Acquisition<L> {
        &self.acquisition
    }

    /// One acquisition cycle; returns true when a record was forwarded
    pub async fn step(&mut self) -> bool {
        let result = self.acquisition.run_cycle().await;
        match self.relay.on_cycle(&result).await {
            Ok(written) => written,
            Err(e) => {
                warn!(error = %e, "Relay write failed");
                false
            }
        }
    }

    /// Run cycles at the relay cadence until the future is dropped
    pub async fn run(mut self) {
        info!(
            link = %self.acquisition.link().describe(),
            interval_ms = self.interval.as_millis() as u64,
            "Relay mode started"
        );

        let mut ticker = cadence(self.interval);
        loop {
            ticker.tick().await;
            self.step().await;
        }
    }
}

// =============================================================================
// Interactive mode
// =============================================================================

pub struct InteractiveMode<L, R> {
    acquisition: Acquisition<L>,
    display: DisplayConsumer<R>,
    selection: SharedSelection,
    interval: Duration,
}

impl<L, R> InteractiveMode<L, R>
where
    L: LinkAdapter,
    R: Renderer,
{
    pub fn new(
        acquisition: Acquisition<L>,
        display: DisplayConsumer<R>,
        selection: SharedSelection,
        interval: Duration,
    ) -> Self {
        Self {
            acquisition,
            display,
            selection,
            interval,
        }
    }

    pub fn display(&self) -> &DisplayConsumer<R> {
        &self.display
    }

    /// One acquisition cycle; returns true when the renderer was called
    pub async fn step(&mut self) -> bool {
        let result = self.acquisition.run_cycle().await;
        self.display.on_cycle(&result, self.selection.current())
    }

    /// Sample the button on its own task and run display cycles until the
    /// future is dropped
    pub async fn run<P>(mut self, pin: P, debounce: Duration, sample_interval: Duration)
    where
        P: InputPin + 'static,
    {
        let machine = SelectionStateMachine::new(self.display.table().len(), debounce);
        let _input = InputTask::spawn(pin, machine, self.selection.clone(), sample_interval);

        info!(
            link = %self.acquisition.link().describe(),
            interval_ms = self.interval.as_millis() as u64,
            channels = self.display.table().len(),
            "Interactive mode started"
        );

        let mut ticker = cadence(self.interval);
        loop {
            ticker.tick().await;
            self.step().await;
        }
    }
}

/// Background button sampler; aborted when dropped
pub struct InputTask {
    handle: JoinHandle<()>,
}

impl InputTask {
    pub fn spawn<P>(
        mut pin: P,
        mut machine: SelectionStateMachine,
        selection: SharedSelection,
        sample_interval: Duration,
    ) -> Self
    where
        P: InputPin + 'static,
    {
        selection.publish(machine.current_index());

        let handle = tokio::spawn(async move {
            let mut ticker = cadence(sample_interval);
            let mut failing = false;

            loop {
                ticker.tick().await;

                let active = match pin.is_active() {
                    Ok(active) => {
                        if failing {
                            info!("Button input recovered");
                            failing = false;
                        }
                        active
                    }
                    Err(e) => {
                        if !failing {
                            warn!(error = %e, "Button read failed");
                            failing = true;
                        }
                        false
                    }
                };

                if machine.on_sample(active, Instant::now()) {
                    selection.publish(machine.current_index());
                }
            }
        });

        debug!(
            sample_ms = sample_interval.as_millis() as u64,
            "Input task started"
        );
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for InputTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use ecu_conv::ChannelTable;
    use ecu_link::{EcuLinkConfig, MockConfig, MockLink};

    #[derive(Clone, Default)]
    struct TestPin(Arc<AtomicBool>);

    impl InputPin for TestPin {
        fn is_active(&mut self) -> io::Result<bool> {
            Ok(self.0.load(Ordering::SeqCst))
        }
    }

    struct FailingPin;

    impl InputPin for FailingPin {
        fn is_active(&mut self) -> io::Result<bool> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no gpio"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_task_debounces_press() {
        let pin = TestPin::default();
        let selection = SharedSelection::new();
        let machine = SelectionStateMachine::new(4, Duration::from_millis(300));
        let task = InputTask::spawn(
            pin.clone(),
            machine,
            selection.clone(),
            Duration::from_millis(20),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(selection.current(), 0);

        // Press with contact bounce lasting 100 ms, then release
        pin.0.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        pin.0.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(selection.current(), 1);

        // Second press after the debounce window
        pin.0.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        pin.0.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(selection.current(), 2);

        assert!(!task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_task_survives_read_errors() {
        let selection = SharedSelection::new();
        let machine = SelectionStateMachine::new(4, Duration::from_millis(300));
        let task = InputTask::spawn(
            FailingPin,
            machine,
            selection.clone(),
            Duration::from_millis(20),
        );

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(selection.current(), 0);
        assert!(!task.is_finished());
    }

    #[tokio::test]
    async fn test_relay_step() {
        let table = ChannelTable::reference();
        let link = MockLink::new(MockConfig::default());
        let handle = link.handle();
        handle.push_response(vec![0u8; 32]);
        handle.push_response(vec![]);

        let acquisition = Acquisition::new(link, &EcuLinkConfig::default(), &table);
        let channels: Vec<String> = vec!["afr1".into(), "map".into()];
        let relay = RelayConsumer::new(table, &channels, Vec::<u8>::new()).unwrap();
        let mut mode = RelayMode::new(acquisition, relay, Duration::from_millis(200));

        assert!(mode.step().await);
        assert!(!mode.step().await);
        assert_eq!(mode.relay().sink().as_slice(), b"0.0,0.00\n");
        assert_eq!(mode.acquisition().cycles(), 2);
    }
}
