use crate::driver::DelayRange;
use crate::uci::{Opts, Val};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

pub const MAX_DEPTH: u32 = 20;

/// User-facing settings, read anew on every tick.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub depth: u32,
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
    pub auto_queue: bool,
    pub auto_move: bool,
    pub marking: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            depth: 15,
            min_delay_secs: 1,
            max_delay_secs: 5,
            auto_queue: false,
            auto_move: false,
            marking: false,
        }
    }
}

impl Settings {
    pub fn delay(&self) -> DelayRange {
        DelayRange::new(self.min_delay_secs, self.max_delay_secs)
    }

    /// Search depth clamped to the supported range.
    pub fn depth(&self) -> u32 {
        self.depth.clamp(1, MAX_DEPTH)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    pub hash_mb: u32,
    pub multipv: u32,
    pub ponder: bool,
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            path: PathBuf::from("stockfish"),
            args: Vec::new(),
            hash_mb: 256,
            multipv: 1,
            ponder: true,
            timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    pub fn opts(&self) -> Opts {
        let mut opts = Opts::new();
        opts.set("MultiPV", Val::Int(self.multipv.into()));
        opts.set("Hash", Val::Int(self.hash_mb.into()));
        opts.set("Ponder", Val::Bool(self.ponder));
        opts
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub tick_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig { tick_ms: 20 }
    }
}

impl DriverConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub engine: EngineConfig,
    pub driver: DriverConfig,
    pub settings: Settings,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::parse(&text).with_context(|| format!("in config {:?}", path))
    }

    pub fn parse(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text).context("parsing config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let depth = self.settings.depth;
        ensure!(
            (1..=MAX_DEPTH).contains(&depth),
            "depth {} not in 1..={}",
            depth,
            MAX_DEPTH
        );
        ensure!(self.engine.multipv >= 1, "multipv must be positive");
        ensure!(self.engine.timeout_secs >= 1, "timeout must be positive");
        ensure!(self.driver.tick_ms >= 1, "tick period must be positive");
        Ok(())
    }
}
