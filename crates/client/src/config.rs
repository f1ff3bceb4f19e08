//! Client configuration structures and loaders.
use std::env;
use std::path::PathBuf;

/// Configuration required to bootstrap the runtime and console.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    /// Encounter file; the bundled encounter is used when unset.
    pub roster_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
    /// Name of the actor the console controls; defaults to the first player.
    pub player: Option<String>,
    pub show_ambient: bool,
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_ROSTER` - Encounter RON file (default: bundled encounter)
    /// - `ARENA_SEED` - RNG seed for reproducible encounters (default: entropy)
    /// - `ARENA_SESSION_ID` - Session identifier for log files (default: auto-generated)
    /// - `ARENA_LOG_DIR` - Directory for log files (default: platform-specific)
    /// - `ARENA_PLAYER` - Name of the controlled actor (default: first player)
    /// - `ARENA_AMBIENT` - Print flavor lines (default: true)
    pub fn from_env() -> Self {
        let mut config = Self {
            show_ambient: true,
            ..Self::default()
        };

        config.roster_path = env::var("ARENA_ROSTER").ok().map(PathBuf::from);
        config.seed = read_env::<u64>("ARENA_SEED");
        config.session_id = env::var("ARENA_SESSION_ID").ok();
        config.log_dir = env::var("ARENA_LOG_DIR").ok().map(PathBuf::from);
        config.player = env::var("ARENA_PLAYER").ok();

        if let Some(show) = read_env::<bool>("ARENA_AMBIENT") {
            config.show_ambient = show;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
