//! Arena console client.
//!
//! Composition root: loads configuration and the encounter, starts the
//! runtime, and hands one player-controlled actor to the stdin console.
//!
//! ```bash
//! ARENA_SEED=7 ARENA_ROSTER=encounter.ron cargo run -p arena-client
//! ```
mod config;
mod console;
mod logging;

use anyhow::{Context, Result, bail};
use combat_content::{EncounterLoader, default_encounter};
use runtime::{Runtime, RuntimeConfig};

use config::ClientConfig;
use console::{Console, resolve_player};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let log_file = logging::setup_logging(&config)?;

    let encounter = match &config.roster_path {
        Some(path) => EncounterLoader::load(path)?,
        None => default_encounter().context("bundled encounter is invalid")?,
    };
    tracing::info!(actors = encounter.roster.len(), "Encounter loaded");

    let runtime_config = RuntimeConfig {
        seed: config.seed,
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder()
        .config(runtime_config)
        .encounter(encounter)
        .build()
        .await?;
    let handle = runtime.handle();

    let actors = handle.query_actors().await?;
    let Some(player) = resolve_player(&actors, config.player.as_deref()) else {
        match &config.player {
            Some(name) => bail!("no actor named '{name}' in the encounter"),
            None => bail!("the encounter has no player-controlled actor"),
        }
    };

    println!("logging to {}", log_file.display());
    Console::new(handle, player, config.show_ambient).run().await?;

    runtime.shutdown().await?;
    tracing::info!("Arena client exited");
    Ok(())
}
