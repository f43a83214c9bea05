//! Entities of the sandbox: field values, records, handles and closures

mod closure;
mod display;
mod handle;
mod impls;
mod record;

pub use closure::{
    make_capturing_closure, make_incrementer, CaptureMode, CaptureSource, CapturingClosure,
    Incrementer, Variable,
};
pub use handle::{
    HandleBuilder, HandleField, HandleState, InstanceId, PropertyObserver, ReferenceHandle,
    TeardownHook, WeakHandle,
};
pub use record::ValueRecord;

use serde::Serialize;

/// A primitive field value.
///
/// Records and handles are aggregates of these. Every variant owns its
/// data, so cloning a `Value` never shares anything.
#[derive(Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The unit value `()`
    Unit,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// Owned string
    Str(String),
}
