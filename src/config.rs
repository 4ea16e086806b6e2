/// Buffer, pool and framing configuration
///
/// Sources, in the order they are usually layered:
///   - `BufferConfig::default()`
///   - TOML via `from_toml()` / `from_file()`
///   - `WIRE_BUFFER_*` environment overrides via `from_env()`

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BufferError, BufferResult};

/// Default fragment size, also the default initial buffer capacity
pub const DEFAULT_FRAGMENT_SIZE: usize = 6144;

/// Largest frame expressible by the 2-byte length header
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BufferConfig {
    /// Capacity of buffers created without an explicit size
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    #[serde(default)]
    pub pool: PoolConfig,

    #[serde(default)]
    pub frame: FrameConfig,
}

fn default_initial_capacity() -> usize {
    DEFAULT_FRAGMENT_SIZE
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            initial_capacity: default_initial_capacity(),
            pool: PoolConfig::default(),
            frame: FrameConfig::default(),
        }
    }
}

impl BufferConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> BufferResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| BufferError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> BufferResult<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| BufferError::Config(format!("failed to parse TOML: {e}")))
    }

    /// Defaults overridden by `WIRE_BUFFER_*` environment variables.
    ///
    /// Unparsable values are reported instead of being ignored.
    pub fn from_env() -> BufferResult<Self> {
        let mut config = Self::default();

        if let Some(val) = env_usize("WIRE_BUFFER_INITIAL_CAPACITY")? {
            config.initial_capacity = val;
        }
        if let Some(val) = env_usize("WIRE_BUFFER_FRAGMENT_SIZE")? {
            config.pool.fragment_size = val;
        }
        if let Some(val) = env_usize("WIRE_BUFFER_MAX_TIERS")? {
            config.pool.max_tiers = val;
        }
        if let Some(val) = env_usize("WIRE_BUFFER_MAX_BUFFERS_PER_TIER")? {
            config.pool.max_buffers_per_tier = val;
        }
        if let Some(val) = env_usize("WIRE_BUFFER_MAX_BUFFER_SIZE")? {
            config.pool.max_buffer_size = val;
        }
        if let Some(val) = env_usize("WIRE_BUFFER_MAX_FRAME_SIZE")? {
            config.frame.max_frame_size = val;
        }

        Ok(config)
    }

    /// Example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# failed to generate example config"))
    }

    /// Returns every problem found; an empty list means the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.initial_capacity == 0 {
            errors.push("initial_capacity must be greater than 0".to_string());
        }
        errors.extend(self.pool.validate());
        errors.extend(self.frame.validate());

        errors
    }

    pub fn validate_strict(&self) -> BufferResult<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(BufferError::Config(format!(
                "validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

fn env_usize(key: &str) -> BufferResult<Option<usize>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| BufferError::Config(format!("{key}={raw:?}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Size-tiered pool settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Tier `i` holds buffers of `fragment_size * 2 << i` bytes
    pub fragment_size: usize,

    /// Number of tiers
    pub max_tiers: usize,

    /// Released buffers kept per tier; extra ones are dropped
    pub max_buffers_per_tier: usize,

    /// Buffers larger than this are never pooled
    pub max_buffer_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            fragment_size: DEFAULT_FRAGMENT_SIZE,
            max_tiers: 6,
            max_buffers_per_tier: 64,
            max_buffer_size: 1024 * 1024,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.fragment_size == 0 {
            errors.push("pool.fragment_size must be greater than 0".to_string());
        }
        if self.max_tiers == 0 {
            errors.push("pool.max_tiers must be greater than 0".to_string());
        } else if self.max_tiers > 32 {
            errors.push(format!("pool.max_tiers too large: {} (max: 32)", self.max_tiers));
        }
        if self.max_buffer_size < self.fragment_size.saturating_mul(2) {
            errors.push(format!(
                "pool.max_buffer_size ({}) is smaller than the first tier ({})",
                self.max_buffer_size,
                self.fragment_size.saturating_mul(2)
            ));
        }

        errors
    }
}

/// Length-prefixed framing settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Largest frame, header included
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig {
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}

impl FrameConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_frame_size <= crate::frame::FRAME_HEADER_SIZE {
            errors.push(format!(
                "frame.max_frame_size must exceed the {}-byte header",
                crate::frame::FRAME_HEADER_SIZE
            ));
        } else if self.max_frame_size > MAX_FRAME_SIZE {
            errors.push(format!(
                "frame.max_frame_size too large: {} (max: {MAX_FRAME_SIZE})",
                self.max_frame_size
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = BufferConfig::default();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = BufferConfig::from_toml(
            r#"
            initial_capacity = 512

            [frame]
            max_frame_size = 1024
            "#,
        )
        .unwrap();
        assert_eq!(config.initial_capacity, 512);
        assert_eq!(config.frame.max_frame_size, 1024);
        assert_eq!(config.pool, PoolConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = BufferConfig::from_toml("initial_capacity = \"big\"").unwrap_err();
        assert!(matches!(err, BufferError::Config(_)));
    }

    #[test]
    fn test_example_config_round_trips() {
        let text = BufferConfig::example_config();
        assert_eq!(BufferConfig::from_toml(&text).unwrap(), BufferConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("WIRE_BUFFER_MAX_FRAME_SIZE", " 4096 ");
        let config = BufferConfig::from_env().unwrap();
        assert_eq!(config.frame.max_frame_size, 4096);
        assert_eq!(config.initial_capacity, DEFAULT_FRAGMENT_SIZE);

        std::env::set_var("WIRE_BUFFER_MAX_FRAME_SIZE", "lots");
        assert!(matches!(BufferConfig::from_env(), Err(BufferError::Config(_))));
        std::env::remove_var("WIRE_BUFFER_MAX_FRAME_SIZE");
    }

    #[test]
    fn test_validation_errors() {
        let mut config = BufferConfig::default();
        config.initial_capacity = 0;
        config.pool.max_tiers = 0;
        config.frame.max_frame_size = 100_000;

        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(config.validate_strict().is_err());
    }
}
