//! Dashboard configuration.
//!
//! Defaults reproduce the reference cadences. A TOML file (path in
//! `MIFTAH_CONFIG`) can override any subset, and a handful of environment
//! variables override the file.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MiftahError, Result};
use crate::kernel::Cadence;

pub const ENV_CONFIG: &str = "MIFTAH_CONFIG";
pub const ENV_USERNAME: &str = "MIFTAH_USERNAME";
pub const ENV_PASSWORD: &str = "MIFTAH_PASSWORD";
pub const ENV_STATE_DIR: &str = "MIFTAH_STATE_DIR";
pub const ENV_SEED: &str = "MIFTAH_SEED";

// Development pair. Only ever used when nothing else is configured.
const DEV_USERNAME: &str = "admin";
const DEV_PASSWORD: &str = "sparta2025";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub feed: FeedConfig,
    pub metrics: SamplerConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Steady cadence between records.
    pub interval_ms: u64,
    /// Buffer capacity; the oldest records are evicted past it.
    pub capacity: usize,
    /// Records produced in the start-up burst.
    pub warmup_count: u32,
    pub warmup_spacing_ms: u64,
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            capacity: 50,
            warmup_count: 20,
            warmup_spacing_ms: 100,
            seed: None,
        }
    }
}

impl FeedConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn warmup_spacing(&self) -> Duration {
        Duration::from_millis(self.warmup_spacing_ms)
    }

    /// Full timeline: warm-up burst then steady period.
    pub fn cadence(&self) -> Cadence {
        Cadence::new(self.interval()).with_warmup(self.warmup_count, self.warmup_spacing())
    }

    /// Steady period only, used when resuming a paused feed.
    pub fn steady_cadence(&self) -> Cadence {
        Cadence::new(self.interval())
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(MiftahError::InvalidConfig("feed.interval_ms must be > 0".into()));
        }
        if self.capacity == 0 {
            return Err(MiftahError::InvalidConfig("feed.capacity must be > 0".into()));
        }
        if self.warmup_count > 0 && self.warmup_spacing_ms == 0 {
            return Err(MiftahError::InvalidConfig(
                "feed.warmup_spacing_ms must be > 0 when warmup_count > 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub interval_ms: u64,
    /// Take a sample as soon as the sampler starts instead of one period later.
    pub sample_on_start: bool,
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            sample_on_start: true,
            seed: None,
        }
    }
}

impl SamplerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn cadence(&self) -> Cadence {
        let cadence = Cadence::new(self.interval());
        if self.sample_on_start {
            // A one-tick burst at offset zero.
            cadence.with_warmup(1, self.interval())
        } else {
            cadence
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(MiftahError::InvalidConfig("metrics.interval_ms must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub username: String,
    pub password: String,
    /// Directory holding the persisted session flag.
    pub state_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            username: DEV_USERNAME.to_string(),
            password: DEV_PASSWORD.to_string(),
            state_dir: PathBuf::from(".miftah"),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("state_dir", &self.state_dir)
            .finish()
    }
}

impl SessionConfig {
    pub fn uses_dev_credentials(&self) -> bool {
        self.username == DEV_USERNAME && self.password == DEV_PASSWORD
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(MiftahError::InvalidConfig("session.username must not be empty".into()));
        }
        Ok(())
    }
}

impl DashboardConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| MiftahError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Defaults, then the file named by `MIFTAH_CONFIG`, then env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(ENV_CONFIG) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `MIFTAH_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(username) = lookup(ENV_USERNAME) {
            self.session.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.session.password = password;
        }
        if let Some(dir) = lookup(ENV_STATE_DIR) {
            self.session.state_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_SEED) {
            let seed: u64 = raw
                .trim()
                .parse()
                .map_err(|_| MiftahError::InvalidConfig(format!("{ENV_SEED} is not a u64: {raw}")))?;
            self.feed.seed = Some(seed);
            self.metrics.seed = Some(seed.wrapping_add(1));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.feed.validate()?;
        self.metrics.validate()?;
        self.session.validate()
    }
}
