//! Process-wide sandbox configuration
//!
//! A single [`SandboxConfig`] is initialized once, either explicitly via
//! [`install`] or with defaults on the first call to [`global`], and is
//! read-only afterwards.

use once_cell::sync::OnceCell;

use crate::error::{Result, SandboxError};

static GLOBAL: OnceCell<SandboxConfig> = OnceCell::new();

/// Configuration shared by every sandbox in the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Maximum transcript lines kept; older lines are dropped first
    pub transcript_capacity: usize,

    /// Emit transcript lines at INFO instead of DEBUG
    pub trace: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            transcript_capacity: 1024,
            trace: false,
        }
    }
}

impl SandboxConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with a custom transcript capacity.
    pub fn with_transcript_capacity(capacity: usize) -> Self {
        Self {
            transcript_capacity: capacity,
            ..Default::default()
        }
    }

    /// Enable or disable tracing of transcript lines (builder pattern)
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// Install the global configuration.
///
/// Fails if a configuration is already in place, including the default
/// one set up by an earlier call to [`global`].
pub fn install(config: SandboxConfig) -> Result<&'static SandboxConfig> {
    GLOBAL
        .set(config)
        .map_err(|_| SandboxError::ConfigInstalled)?;
    Ok(global())
}

/// The global configuration, initialized with defaults on first use.
pub fn global() -> &'static SandboxConfig {
    GLOBAL.get_or_init(SandboxConfig::default)
}
