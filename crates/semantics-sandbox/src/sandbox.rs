//! The semantics sandbox: operations plus a transcript of what they did
//!
//! Each operation behaves exactly like the underlying entity method and
//! additionally appends one human-readable line to the transcript, which
//! takes the place of console output for comparisons in tests.

use std::collections::VecDeque;
use std::fmt;

use crate::config::{self, SandboxConfig};
use crate::error::AbsentValueError;
use crate::optional::{self, OptionalValue};
use crate::value::{
    self, CaptureMode, CaptureSource, CapturingClosure, ReferenceHandle, ValueRecord,
};

/// Outcome of releasing one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// The released binding was the last; the teardown hook has run
    Destroyed,

    /// Other bindings keep the instance alive
    Shared {
        /// Bindings still live after the release
        remaining: usize,
    },
}

/// Runs sandbox operations and keeps a bounded transcript of outcomes.
///
/// # Example
///
/// ```
/// use semantics_sandbox::{Release, ReferenceHandle, Sandbox};
///
/// let mut sandbox = Sandbox::new();
/// let a = ReferenceHandle::builder("Counter").with_field("count", 0).build();
/// let b = sandbox.share_handle(&a);
///
/// assert_eq!(sandbox.release_handle(a), Release::Shared { remaining: 1 });
/// assert_eq!(sandbox.release_handle(b), Release::Destroyed);
/// ```
#[derive(Debug)]
pub struct Sandbox {
    config: SandboxConfig,
    transcript: VecDeque<String>,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Create a sandbox using the global configuration.
    pub fn new() -> Self {
        Self::with_config(config::global().clone())
    }

    /// Create a sandbox with an explicit configuration.
    pub fn with_config(config: SandboxConfig) -> Self {
        Self {
            config,
            transcript: VecDeque::new(),
        }
    }

    /// The configuration in use
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Transcript lines, oldest first
    pub fn transcript(&self) -> Vec<&str> {
        self.transcript.iter().map(String::as_str).collect()
    }

    /// The most recent transcript line
    pub fn last_line(&self) -> Option<&str> {
        self.transcript.back().map(String::as_str)
    }

    /// Record `label: <rendering>` for any entity.
    pub fn observe(&mut self, label: &str, entity: &impl fmt::Display) {
        self.record(format!("{}: {}", label, entity));
    }

    // ═══════════════════════════════════════════════════════════════════
    // Operations
    // ═══════════════════════════════════════════════════════════════════

    /// An independent duplicate of `record`.
    ///
    /// The copy compares equal to the source but shares no storage with it.
    pub fn copy_value(&mut self, record: &ValueRecord) -> ValueRecord {
        let copy = record.clone();
        self.record(format!("copy {}: {}", record.type_name, copy));
        copy
    }

    /// A new binding to the instance behind `handle`.
    pub fn share_handle(&mut self, handle: &ReferenceHandle) -> ReferenceHandle {
        let shared = handle.share();
        self.record(format!(
            "share {}#{}: {} bindings",
            handle.type_name(),
            handle.id(),
            shared.binding_count()
        ));
        shared
    }

    /// Drop one binding.
    ///
    /// When it is the last one, the teardown hook has run by the time this
    /// returns.
    pub fn release_handle(&mut self, handle: ReferenceHandle) -> Release {
        let label = format!("{}#{}", handle.type_name(), handle.id());
        let remaining = handle.binding_count() - 1;
        drop(handle);

        if remaining == 0 {
            self.record(format!("release {}: destroyed", label));
            Release::Destroyed
        } else {
            self.record(format!("release {}: {} bindings remain", label, remaining));
            Release::Shared { remaining }
        }
    }

    /// The contained value, or `default` when absent.
    ///
    /// Only presence is recorded; use [`Sandbox::observe`] to render the result.
    pub fn unwrap_or<T>(&mut self, optional: OptionalValue<T>, default: T) -> T {
        if optional.is_some() {
            self.record("unwrap_or: present".to_string());
        } else {
            self.record("unwrap_or: absent, default used".to_string());
        }
        optional::unwrap_or(optional, default)
    }

    /// The contained value, or [`AbsentValueError`] when absent.
    pub fn force_unwrap<T>(&mut self, optional: OptionalValue<T>) -> Result<T, AbsentValueError> {
        match optional::force_unwrap(optional) {
            Ok(value) => {
                self.record("force_unwrap: present".to_string());
                Ok(value)
            }
            Err(err) => {
                self.record(format!("force_unwrap: {}", err));
                Err(err)
            }
        }
    }

    /// A closure over `source` using the given capture mode.
    pub fn make_capturing_closure(
        &mut self,
        mode: CaptureMode,
        source: &impl CaptureSource,
    ) -> CapturingClosure {
        let closure = value::make_capturing_closure(mode, source);
        self.record(format!("closure {:?} over {}", mode, source.read()));
        closure
    }

    fn record(&mut self, line: String) {
        if self.config.trace {
            tracing::info!(target: "semantics_sandbox::transcript", "{}", line);
        } else {
            tracing::debug!(target: "semantics_sandbox::transcript", "{}", line);
        }

        if self.config.transcript_capacity == 0 {
            return;
        }
        while self.transcript.len() >= self.config.transcript_capacity {
            self.transcript.pop_front();
        }
        self.transcript.push_back(line);
    }
}
