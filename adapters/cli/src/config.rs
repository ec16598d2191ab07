//! Simulation settings loaded from TOML and overridden by command-line flags.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use gridsnake_world::EngineConfig;
use serde::Deserialize;

/// Settings that drive a headless simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    pub(crate) rows: u32,
    pub(crate) cols: u32,
    pub(crate) seed: Option<u64>,
    /// Tick budget for each round.
    pub(crate) max_ticks: u64,
    pub(crate) tick_interval_ms: u64,
    pub(crate) resume_delay_ms: u64,
    /// Pause the session every N resolved ticks to exercise resuming.
    pub(crate) pause_every_ticks: Option<u64>,
    /// Number of rounds; a round after the first starts once the previous
    /// one ends in a collision.
    pub(crate) rounds: u32,
}

/// Values supplied on the command line that replace file settings.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) rows: Option<u32>,
    pub(crate) cols: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) max_ticks: Option<u64>,
    pub(crate) tick_interval_ms: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            rows: engine.rows,
            cols: engine.cols,
            seed: None,
            max_ticks: 10_000,
            tick_interval_ms: 250,
            resume_delay_ms: 500,
            pause_every_ticks: None,
            rounds: 1,
        }
    }
}

impl SimulationConfig {
    /// Reads and validates the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid simulation config at {}", path.display()))
    }

    /// Parses and validates TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse simulation config toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces file settings with any values given on the command line.
    pub(crate) fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        let Overrides {
            rows,
            cols,
            seed,
            max_ticks,
            tick_interval_ms,
        } = overrides;
        self.rows = rows.unwrap_or(self.rows);
        self.cols = cols.unwrap_or(self.cols);
        self.seed = seed.or(self.seed);
        self.max_ticks = max_ticks.unwrap_or(self.max_ticks);
        self.tick_interval_ms = tick_interval_ms.unwrap_or(self.tick_interval_ms);
        self.validate()?;
        Ok(self)
    }

    pub(crate) fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub(crate) fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    /// Engine parameters for the given zero-based round.
    ///
    /// Seeded runs derive one seed per round so restarts differ but replay.
    pub(crate) fn engine_config(&self, round: u32) -> EngineConfig {
        let config = EngineConfig::new(self.rows, self.cols);
        match self.seed {
            Some(seed) => config.with_seed(seed.wrapping_add(u64::from(round))),
            None => config,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_ticks == 0 {
            bail!("max_ticks must be at least 1");
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be at least 1");
        }
        if self.rounds == 0 {
            bail!("rounds must be at least 1");
        }
        if self.pause_every_ticks == Some(0) {
            bail!("pause_every_ticks must be at least 1 when set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_host() {
        let config = SimulationConfig::default();
        assert_eq!((config.rows, config.cols), (32, 32));
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.resume_delay(), Duration::from_millis(500));
        assert_eq!(config.max_ticks, 10_000);
        assert_eq!(config.rounds, 1);
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config = SimulationConfig::parse("rows = 12\nseed = 7\nrounds = 3\n")
            .expect("valid config");
        assert_eq!(config.rows, 12);
        assert_eq!(config.cols, 32);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.rounds, 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = SimulationConfig::parse("colour = \"green\"\n").expect_err("unknown key");
        assert!(format!("{error:#}").contains("colour"));
    }

    #[test]
    fn zero_budgets_are_rejected() {
        assert!(SimulationConfig::parse("max_ticks = 0\n").is_err());
        assert!(SimulationConfig::parse("pause_every_ticks = 0\n").is_err());
        assert!(SimulationConfig::parse("rounds = 0\n").is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let config = SimulationConfig::parse("rows = 12\ncols = 14\nseed = 7\n")
            .expect("valid config")
            .with_overrides(Overrides {
                cols: Some(20),
                seed: Some(99),
                ..Overrides::default()
            })
            .expect("valid overrides");
        assert_eq!((config.rows, config.cols), (12, 20));
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn seeded_rounds_derive_distinct_seeds() {
        let config = SimulationConfig {
            seed: Some(u64::MAX),
            ..SimulationConfig::default()
        };
        assert_eq!(config.engine_config(0).seed, Some(u64::MAX));
        assert_eq!(config.engine_config(1).seed, Some(0));
        assert_eq!(SimulationConfig::default().engine_config(4).seed, None);
    }
}
