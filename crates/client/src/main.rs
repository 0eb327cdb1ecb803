//! Demonbane headless simulator.
//!
//! Composition root: loads content and rules, opens the meta-progression
//! store, and plays runs with the built-in autopilot against the pattern AI.
//!
//! # Examples
//!
//! ```bash
//! # Three runs from seed 42, persisted under the default save directory
//! DEMONBANE_SEED=42 DEMONBANE_RUNS=3 cargo run -p demonbane
//!
//! # Throwaway run with debug logging
//! ENABLE_PERSISTENCE=false RUST_LOG=debug cargo run -p demonbane
//! ```

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use demonbane_content::{ConfigLoader, bundled_catalog, bundled_config};
use demonbane_core::{GameConfig, RunSummary};
use demonbane_runtime::{
    AutoPilot, FileMetaRepository, InMemoryMetaRepository, MetaProgressionManager, MetaRepository,
    PatternAi, RuntimeConfig, Session,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = RuntimeConfig::from_env();
    let rules = load_rules(&config)?;
    let content = Arc::new(bundled_catalog().context("failed to load bundled content")?);
    let repository = open_repository(&config)?;

    let manager = MetaProgressionManager::load(repository, content.clone(), rules)?;
    let max_heat = manager.state().max_selectable_heat();
    let heat = if config.heat > max_heat {
        tracing::warn!(requested = config.heat, max = max_heat, "heat not unlocked yet; clamping");
        max_heat
    } else {
        config.heat
    };

    let seed = config.seed.unwrap_or_else(time_seed);
    tracing::info!(seed, runs = config.runs, class = %config.class, heat, "starting session");

    let mut session = Session::new(manager, AutoPilot::new(), Arc::new(PatternAi::new(content)))
        .with_max_reprompts(config.max_input_reprompts);
    let summaries = session
        .play_runs(seed, config.runs, &config.class, heat)
        .await?;

    for summary in &summaries {
        report(summary);
    }

    let meta = session.manager().state();
    println!(
        "meta: {} currency, {} unlocks, {} runs ({} victories), max heat {}",
        meta.currency,
        meta.unlocks.len(),
        meta.runs_finished,
        meta.victories,
        meta.max_selectable_heat()
    );
    Ok(())
}

fn setup_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rules(config: &RuntimeConfig) -> Result<GameConfig> {
    match &config.game_config_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading game config");
            ConfigLoader::load(path)
        }
        None => bundled_config(),
    }
}

fn open_repository(config: &RuntimeConfig) -> Result<Arc<dyn MetaRepository>> {
    if !config.enable_persistence {
        tracing::info!("persistence disabled; meta progression lives in memory");
        return Ok(Arc::new(InMemoryMetaRepository::new()));
    }

    let dir = config
        .save_dir()
        .context("no save directory available; set SAVE_DATA_DIR")?;
    tracing::info!(dir = %dir.display(), "persisting meta progression");
    Ok(Arc::new(FileMetaRepository::new(&dir)?))
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn report(summary: &RunSummary) {
    println!(
        "seed {:>20}  {:<9} {:<8} heat {:>2}  layers {}  level {:>2}  +{} currency  {} rooms  {} kills",
        summary.seed,
        summary.outcome,
        summary.class,
        summary.heat,
        summary.layers_cleared,
        summary.level,
        summary.currency_earned,
        summary.stats.rooms_visited,
        summary.stats.enemies_defeated,
    );
}
