//! ecu-dashd - ECU telemetry dashboard daemon
//!
//! # Usage
//!
//! Relay mode with the reference setup:
//! ```bash
//! ./ecu-dashd
//! ```
//!
//! Interactive mode from a config file:
//! ```bash
//! ./ecu-dashd --config config/ecu-dash.toml --mode interactive
//! ```
//!
//! Without hardware (synthetic ECU, relay records on stdout):
//! ```bash
//! ./ecu-dashd --mock
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ecu_conv::ChannelTable;
use ecu_dashd::{
    DashConfig, DisplayConsumer, InputPin, InteractiveMode, LogRenderer, Mode, NeverPressed,
    RelayConsumer, RelayMode, Renderer, RendererKind, SharedSelection, SysfsPin, TextRenderer,
};
use ecu_link::{
    create_link, open_serial, wait_for_path, Acquisition, LinkAdapter, LinkKind, MockConfig,
};
use tokio::io::AsyncWrite;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ecu-dashd")]
#[command(about = "Poll an ECU over serial and relay or display its telemetry")]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Operating mode, overrides the config file
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Use a synthetic ECU and write relay records to stdout
    #[arg(long)]
    mock: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "ecu_dashd=debug,ecu_link=debug,ecu_conv=debug"
    } else {
        "ecu_dashd=info,ecu_link=info,ecu_conv=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => DashConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DashConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let table = config.channel_table().context("Failed to build channel table")?;
    config.validate(&table).context("Invalid configuration")?;
    if let Some(meta) = table.meta() {
        info!(
            name = meta.name.as_deref().unwrap_or("-"),
            version = meta.version.as_deref().unwrap_or("-"),
            "Channel table loaded"
        );
    }

    info!(
        mode = ?config.mode,
        channels = table.len(),
        mock = args.mock,
        "Starting ecu-dashd"
    );

    let link: Box<dyn LinkAdapter> = if args.mock {
        create_link(&LinkKind::Mock(MockConfig::default()), &table)?
    } else {
        if config.startup.wait_for_devices {
            wait_for_path(&config.ecu.port, config.startup.device_poll()).await;
        }
        create_link(&LinkKind::Serial(config.ecu.serial()), &table)
            .with_context(|| format!("Failed to open ECU port {}", config.ecu.port))?
    };
    info!(link = %link.describe(), "ECU link ready");

    let acquisition = Acquisition::new(link, &config.ecu, &table);

    let run = async {
        match config.mode {
            Mode::Relay => run_relay(&config, table, acquisition, args.mock).await,
            Mode::Interactive => {
                run_interactive(&config, table, acquisition).await;
                Ok(())
            }
        }
    };

    tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    }
}

async fn run_relay(
    config: &DashConfig,
    table: ChannelTable,
    acquisition: Acquisition<Box<dyn LinkAdapter>>,
    mock: bool,
) -> Result<()> {
    let sink: Box<dyn AsyncWrite + Unpin + Send> = if mock {
        Box::new(tokio::io::stdout())
    } else {
        if config.startup.wait_for_devices {
            wait_for_path(&config.relay.port, config.startup.device_poll()).await;
        }
        let port = open_serial(&config.relay.serial())
            .with_context(|| format!("Failed to open relay port {}", config.relay.port))?;
        Box::new(port)
    };

    let relay = RelayConsumer::new(table, &config.relay.channels, sink)?;
    RelayMode::new(acquisition, relay, config.relay.interval())
        .run()
        .await;
    Ok(())
}

async fn run_interactive(
    config: &DashConfig,
    table: ChannelTable,
    acquisition: Acquisition<Box<dyn LinkAdapter>>,
) {
    let interactive = &config.interactive;

    let renderer: Box<dyn Renderer> = match interactive.renderer {
        RendererKind::Text => Box::new(TextRenderer::new(std::io::stdout(), &table)),
        RendererKind::Log => Box::new(LogRenderer),
    };

    let pin: Box<dyn InputPin> = match &interactive.button.path {
        Some(path) => {
            info!(path = %path.display(), "Using button input");
            Box::new(SysfsPin::new(path, interactive.button.active_low))
        }
        None => {
            info!("No button configured, showing the first channel only");
            Box::new(NeverPressed)
        }
    };

    let display = DisplayConsumer::new(table, renderer);
    InteractiveMode::new(
        acquisition,
        display,
        SharedSelection::new(),
        interactive.interval(),
    )
    .run(pin, interactive.debounce(), interactive.sample_interval())
    .await;
}
