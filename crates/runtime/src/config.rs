//! Runtime configuration structures and loaders.
use std::env;
use std::path::PathBuf;

/// Configuration required to drive sessions from a host process.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Seed of the first run; later runs derive theirs from it.
    pub seed: Option<u64>,
    pub heat: u32,
    pub class: String,
    /// Number of consecutive runs to play.
    pub runs: u32,
    pub enable_persistence: bool,
    pub save_data_dir: Option<PathBuf>,
    /// Overrides the bundled `config.toml`.
    pub game_config_path: Option<PathBuf>,
    /// Rejected player selections tolerated in a row before the run is abandoned.
    pub max_input_reprompts: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            heat: 0,
            class: Self::DEFAULT_CLASS.to_owned(),
            runs: 1,
            enable_persistence: false,
            save_data_dir: None,
            game_config_path: None,
            max_input_reprompts: Self::DEFAULT_MAX_REPROMPTS,
        }
    }
}

impl RuntimeConfig {
    pub const DEFAULT_CLASS: &'static str = "crusader";
    pub const DEFAULT_MAX_REPROMPTS: u32 = 3;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DEMONBANE_SEED` - Seed of the first run (default: time based)
    /// - `DEMONBANE_HEAT` - Heat level for every run (default: 0)
    /// - `DEMONBANE_CLASS` - Player class id (default: crusader)
    /// - `DEMONBANE_RUNS` - Number of runs to play (default: 1)
    /// - `ENABLE_PERSISTENCE` - Persist meta-progression to disk (default: false)
    /// - `SAVE_DATA_DIR` - Directory for save data (default: platform-specific)
    /// - `GAME_CONFIG_PATH` - TOML file overriding the bundled game config
    /// - `MAX_INPUT_REPROMPTS` - Rejected selections tolerated in a row (default: 3)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.seed = read_env::<u64>("DEMONBANE_SEED");

        if let Some(heat) = read_env::<u32>("DEMONBANE_HEAT") {
            config.heat = heat;
        }

        if let Ok(class) = env::var("DEMONBANE_CLASS")
            && !class.trim().is_empty()
        {
            config.class = class.trim().to_owned();
        }

        if let Some(runs) = read_env::<u32>("DEMONBANE_RUNS") {
            config.runs = runs.max(1);
        }

        // Accept a bare `ENABLE_PERSISTENCE=` as "true" as well
        if let Some(enable) = read_env::<bool>("ENABLE_PERSISTENCE") {
            config.enable_persistence = enable;
        } else if env::var("ENABLE_PERSISTENCE").is_ok() {
            config.enable_persistence = true;
        }

        config.save_data_dir = env::var("SAVE_DATA_DIR").ok().map(PathBuf::from);
        config.game_config_path = env::var("GAME_CONFIG_PATH").ok().map(PathBuf::from);

        if let Some(reprompts) = read_env::<u32>("MAX_INPUT_REPROMPTS") {
            config.max_input_reprompts = reprompts;
        }

        config
    }

    /// Directory for save data: `SAVE_DATA_DIR` or the platform data dir.
    pub fn save_dir(&self) -> Option<PathBuf> {
        self.save_data_dir.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "demonbane")
                .map(|dirs| dirs.data_dir().join("saves"))
        })
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}
