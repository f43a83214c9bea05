//! # Semantics Sandbox
//!
//! A small set of in-memory entities for observing how data is copied,
//! shared and captured.
//!
//! ## Entities
//!
//! - **[`ValueRecord`]**: value semantics. Cloning is copying.
//! - **[`ReferenceHandle`]**: reference semantics. Bindings share one
//!   instance, and a teardown hook runs when the last binding is released.
//! - **[`OptionalValue`]**: presence is always checked explicitly; forcing
//!   an absent value yields [`AbsentValueError`].
//! - **[`CapturingClosure`]**: captures a [`Variable`] or a handle field by
//!   value or by reference, as chosen at construction.
//!
//! [`Sandbox`] runs the operations and keeps a transcript of their
//! rendered outcomes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;
pub mod optional;
pub mod sandbox;
pub mod value;

// Re-export main types
pub use config::SandboxConfig;
pub use error::{AbsentValueError, Result, SandboxError};
pub use optional::{ForceUnwrap, OptionalValue};
pub use sandbox::{Release, Sandbox};
pub use value::{
    make_capturing_closure, make_incrementer, CaptureMode, CaptureSource, CapturingClosure,
    HandleBuilder, HandleField, HandleState, Incrementer, InstanceId, PropertyObserver,
    ReferenceHandle, TeardownHook, Value, ValueRecord, Variable, WeakHandle,
};

/// Sandbox version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
