use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How much real work seal verification does
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowMode {
    /// Full proof-of-work verification
    #[default]
    Normal,
    /// Full verification against a small test dataset
    Test,
    /// Seals accepted without hashing (test hooks honoured)
    Fake,
    /// Every header and uncle accepted without any check
    FullFake,
}

impl PowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowMode::Normal => "normal",
            PowMode::Test => "test",
            PowMode::Fake => "fake",
            PowMode::FullFake => "full_fake",
        }
    }

    /// Fake and FullFake skip the hash primitive entirely
    pub fn is_fake(&self) -> bool {
        matches!(self, PowMode::Fake | PowMode::FullFake)
    }
}

impl fmt::Display for PowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "normal" => Ok(PowMode::Normal),
            "test" => Ok(PowMode::Test),
            "fake" => Ok(PowMode::Fake),
            "full_fake" | "fullfake" => Ok(PowMode::FullFake),
            other => Err(format!("unknown pow mode: {other}")),
        }
    }
}

/// Engine configuration (process-wide, immutable after construction)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub pow_mode: PowMode,

    /// Artificial seal-verification latency (Fake/FullFake only)
    #[serde(default)]
    pub fake_delay_ms: u64,

    /// Block number whose seal is always rejected (Fake/FullFake only)
    #[serde(default)]
    pub fake_fail: Option<u64>,
}

impl EngineConfig {
    pub fn normal() -> Self {
        Self::default()
    }

    pub fn test() -> Self {
        Self {
            pow_mode: PowMode::Test,
            ..Self::default()
        }
    }

    pub fn fake() -> Self {
        Self {
            pow_mode: PowMode::Fake,
            ..Self::default()
        }
    }

    /// Fake engine that rejects the seal of block `fail`
    pub fn fake_failer(fail: u64) -> Self {
        Self {
            pow_mode: PowMode::Fake,
            fake_fail: Some(fail),
            ..Self::default()
        }
    }

    /// Fake engine that sleeps `delay` before accepting each seal
    pub fn fake_delayer(delay: Duration) -> Self {
        Self {
            pow_mode: PowMode::Fake,
            fake_delay_ms: delay.as_millis() as u64,
            ..Self::default()
        }
    }

    pub fn full_fake() -> Self {
        Self {
            pow_mode: PowMode::FullFake,
            ..Self::default()
        }
    }

    /// Effective artificial delay (zero outside fake modes)
    pub fn fake_delay(&self) -> Duration {
        if self.pow_mode.is_fake() {
            Duration::from_millis(self.fake_delay_ms)
        } else {
            Duration::ZERO
        }
    }

    /// Effective forced-failure number (None outside fake modes)
    pub fn fake_fail(&self) -> Option<u64> {
        if self.pow_mode.is_fake() {
            self.fake_fail
        } else {
            None
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // VISION_POW_MODE: normal | test | fake | full_fake
        if let Ok(val) = env::var("VISION_POW_MODE") {
            match val.parse::<PowMode>() {
                Ok(mode) => config.pow_mode = mode,
                Err(e) => tracing::warn!("[POW-CONFIG] ignoring VISION_POW_MODE: {}", e),
            }
        }

        // VISION_POW_FAKE_DELAY_MS
        if let Ok(val) = env::var("VISION_POW_FAKE_DELAY_MS") {
            if let Ok(ms) = val.trim().parse::<u64>() {
                config.fake_delay_ms = ms;
            }
        }

        // VISION_POW_FAKE_FAIL
        if let Ok(val) = env::var("VISION_POW_FAKE_FAIL") {
            if let Ok(number) = val.trim().parse::<u64>() {
                config.fake_fail = Some(number);
            }
        }

        config
    }
}
