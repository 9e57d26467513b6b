//! nfckit: drive a polling session against the mock NFC adapter.
//!
//! Polls for a scripted tag, prints its record as JSON, then optionally
//! exchanges APDUs or reads a Type B special UID before finishing.
//!
//! ```text
//! nfckit --scenario iso-dep-a --command 00A4040007A0000002471001
//! nfckit --scenario type-b --special-uid
//! RUST_LOG=nfckit_session=debug nfckit --scenario empty --timeout-ms 500
//! ```

mod scenario;

use anyhow::{Context, anyhow};
use clap::Parser;
use nfckit_core::TagError;
use nfckit_hardware::mock::{MockAdapter, MockAdapterHandle};
use nfckit_session::{PollConfig, PollController};
use scenario::Scenario;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nfckit")]
#[command(about = "Poll a contactless tag and talk to it over the mock adapter")]
struct Cli {
    /// Poll window in milliseconds (defaults to the configured window)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Tag brought into the field
    #[arg(long, value_enum, default_value = "iso-dep-a")]
    scenario: Scenario,

    /// Command APDU in hex; repeat to send several
    #[arg(long = "command", value_name = "HEX")]
    commands: Vec<String>,

    /// Read the special UID of a bare Type B card
    #[arg(long)]
    special_uid: bool,

    /// Delay before the tag enters the field, in milliseconds
    #[arg(long, default_value_t = 200)]
    delay_ms: u64,

    /// JSON file with a poll configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PollConfig> {
    let Some(path) = path else {
        return Ok(PollConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
}

fn tag_failure(operation: &str, error: TagError) -> anyhow::Error {
    anyhow!("{operation} failed [{}]: {error}", error.code())
}

/// Bring the scenario's tag into the field once reader mode is on.
fn present_when_listening(handle: MockAdapterHandle, cli: &Cli) {
    let Some(tag) = cli.scenario.tag(cli.commands.len()) else {
        debug!("Empty scenario, no tag will be presented");
        return;
    };
    let delay = Duration::from_millis(cli.delay_ms);

    tokio::spawn(async move {
        while !handle.is_discovery_enabled() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(delay).await;
        debug!(id = ?tag.id, "Presenting tag");
        handle.present_tag(tag);
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let (adapter, handle) = MockAdapter::new();
    let controller = PollController::spawn(adapter, config);
    info!(availability = ?controller.availability(), "NFC adapter ready");

    present_when_listening(handle, &cli);

    let timeout = cli.timeout_ms.map(Duration::from_millis);
    let identity = controller
        .poll(timeout)
        .await
        .map_err(|e| tag_failure("Poll", e))?;

    let record = identity.to_record();
    println!("{}", serde_json::to_string_pretty(&record)?);

    for command in &cli.commands {
        let response = controller
            .transceive_hex(command)
            .await
            .map_err(|e| tag_failure("Transceive", e))?;
        println!(">> {command}");
        println!("<< {response}");
    }

    if cli.special_uid {
        let uid = controller
            .read_special_uid_hex()
            .await
            .map_err(|e| tag_failure("Special UID read", e))?;
        println!("special UID: {uid}");
    }

    controller.finish().await;
    controller.detach().await;
    Ok(())
}
