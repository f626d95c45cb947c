//! Driver configuration.
//!
//! Built once per process or session (usually with [`DriverConfig::from_env`])
//! and passed by reference to the components that need a tunable.

use crate::error::{Error, Result};

/// Environment variable selecting the constrained resource limits (`"1"`).
pub const ENV_EMERGENCY_MODE: &str = "CLICKHOUSE_ODBC_EMERGENCY_MODE";
/// Environment variable enabling the trailing-NUL trim workaround (`"1"`).
pub const ENV_TRIM_TRAILING_NULL: &str = "CLICKHOUSE_ODBC_TRIM_TRAILING_NULL";
/// Environment variable choosing the default text width (`narrow` / `wide`).
pub const ENV_TEXT_WIDTH: &str = "CLICKHOUSE_ODBC_TEXT_WIDTH";

/// Resource tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Capacity of pooled allocators.
    pub memory_pool_size: usize,
    /// Rows fetched ahead of the application.
    pub prefetch_rows: usize,
    /// Growth step of output buffers, in bytes.
    pub buffer_increment: usize,
    /// Largest buffer kept for reuse, in bytes.
    pub max_buffer_size: usize,
    /// Largest accepted input, in bytes.
    pub max_input_size: usize,
    /// Cap on retry/iteration loops.
    pub max_iterations: usize,
}

impl ResourceLimits {
    /// Limits for a normal environment.
    pub const fn normal() -> Self {
        Self {
            memory_pool_size: 1000,
            prefetch_rows: 1,
            buffer_increment: 64,
            max_buffer_size: 32768,
            max_input_size: 16384,
            max_iterations: 50,
        }
    }

    /// Reduced limits for memory-constrained client processes.
    pub const fn constrained() -> Self {
        Self {
            memory_pool_size: 500,
            prefetch_rows: 1,
            buffer_increment: 32,
            max_buffer_size: 8192,
            max_input_size: 4096,
            max_iterations: 20,
        }
    }

    /// Pick the limits for the given mode.
    pub const fn for_mode(constrained: bool) -> Self {
        if constrained {
            Self::constrained()
        } else {
            Self::normal()
        }
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self::normal()
    }
}

/// Character width of textual columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextWidth {
    /// Single-byte oriented (`SQL_VARCHAR` family).
    Narrow,
    /// Unicode (`SQL_WVARCHAR` family).
    Wide,
}

/// What the column metadata mutator writes into `TYPE_NAME`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeNameMode {
    /// Keep the backend type string. Re-applying the mutator is a no-op.
    #[default]
    Passthrough,
    /// Write the normalized backend spelling (`Decimal64(2)` becomes
    /// `Decimal(18, 2)`). It resolves to the same column description, so
    /// re-applying the mutator is a no-op here too.
    Canonical,
}

/// Column metadata compatibility policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataPolicy {
    /// Width of textual columns whose type carries no Unicode marker.
    ///
    /// Defaults to `Wide`: the backend stores UTF-8, and reporting it as
    /// narrow text lets clients truncate multi-byte content.
    pub default_text_width: TextWidth,
    /// `TYPE_NAME` handling.
    pub type_name_mode: TypeNameMode,
}

impl Default for MetadataPolicy {
    fn default() -> Self {
        Self {
            default_text_width: TextWidth::Wide,
            type_name_mode: TypeNameMode::Passthrough,
        }
    }
}

/// Driver-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DriverConfig {
    /// Resource tunables.
    pub limits: ResourceLimits,
    /// Drop one trailing NUL from explicitly sized narrow strings.
    ///
    /// Works around driver managers that count the terminator in the length
    /// of strings passed from Unicode clients to ANSI entry points.
    pub trim_trailing_null: bool,
    /// Column metadata policy.
    pub metadata: MetadataPolicy,
}

impl DriverConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the configuration from the process environment.
    ///
    /// Unset variables keep their defaults; an unparsable text width is an
    /// error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).is_some_and(|v| v == "1");

        let mut config = Self::new()
            .with_limits(ResourceLimits::for_mode(flag(ENV_EMERGENCY_MODE)))
            .with_trim_trailing_null(flag(ENV_TRIM_TRAILING_NULL));

        if let Some(width) = lookup(ENV_TEXT_WIDTH) {
            config.metadata.default_text_width = match width.trim().to_ascii_lowercase().as_str() {
                "narrow" => TextWidth::Narrow,
                "wide" => TextWidth::Wide,
                _ => return Err(Error::invalid_config(ENV_TEXT_WIDTH, width)),
            };
        }

        Ok(config)
    }

    /// Set the resource limits.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Enable or disable the trailing-NUL trim workaround.
    pub fn with_trim_trailing_null(mut self, enabled: bool) -> Self {
        self.trim_trailing_null = enabled;
        self
    }

    /// Set the column metadata policy.
    ///
    /// # Example
    ///
    /// ```
    /// use clickhouse_odbc_core::config::{DriverConfig, MetadataPolicy, TextWidth, TypeNameMode};
    ///
    /// let config = DriverConfig::new().with_metadata_policy(MetadataPolicy {
    ///     default_text_width: TextWidth::Narrow,
    ///     type_name_mode: TypeNameMode::Canonical,
    /// });
    /// assert_eq!(config.metadata.default_text_width, TextWidth::Narrow);
    /// ```
    pub fn with_metadata_policy(mut self, policy: MetadataPolicy) -> Self {
        self.metadata = policy;
        self
    }
}
