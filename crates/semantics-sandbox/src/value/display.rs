//! Display and Debug implementations for sandbox entities
//!
//! `Display` is the human-readable `field=value, …` line; `Debug` also
//! carries the type name (and, for handles, the instance identity).

use std::fmt;

use indexmap::IndexMap;

use super::{ReferenceHandle, Value, ValueRecord};

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s), // No quotes for Display
            _ => fmt::Debug::fmt(self, f),
        }
    }
}

/// Write `name=value` pairs separated by `, `.
pub(crate) fn write_fields(
    f: &mut fmt::Formatter<'_>,
    fields: &IndexMap<String, Value>,
) -> fmt::Result {
    for (i, (k, v)) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}={}", k, v)?;
    }
    Ok(())
}

fn write_debug_fields(
    f: &mut fmt::Formatter<'_>,
    fields: &IndexMap<String, Value>,
) -> fmt::Result {
    write!(f, " {{ ")?;
    for (i, (k, v)) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {:?}", k, v)?;
    }
    write!(f, " }}")
}

impl fmt::Display for ValueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fields(f, &self.fields)
    }
}

impl fmt::Debug for ValueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        write_debug_fields(f, &self.fields)
    }
}

impl fmt::Display for ReferenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_fields(|fields| write_fields(f, fields))
    }
}

impl fmt::Debug for ReferenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name(), self.id())?;
        self.with_fields(|fields| write_debug_fields(f, fields))
    }
}
