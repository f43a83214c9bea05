//! Capturing closures and the variables they capture

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::{HandleField, Value};

/// How a closure binds to the variable it captures.
///
/// Chosen explicitly when the closure is built, never inferred from use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Snapshot the value at construction time
    ByValue,

    /// Alias the variable's storage; later mutation is visible
    ByReference,
}

/// A mutable local variable that closures can capture.
///
/// # Example
///
/// ```
/// use semantics_sandbox::{make_capturing_closure, CaptureMode, Value, Variable};
///
/// let n = Variable::new(5);
/// let snapshot = make_capturing_closure(CaptureMode::ByValue, &n);
/// let alias = make_capturing_closure(CaptureMode::ByReference, &n);
///
/// n.set(9);
/// assert_eq!(snapshot.call(), Value::Int(5));
/// assert_eq!(alias.call(), Value::Int(9));
/// ```
pub struct Variable {
    cell: Rc<RefCell<Value>>,
}

impl Variable {
    /// Create a variable holding `value`
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value.into())),
        }
    }

    /// Current value
    pub fn get(&self) -> Value {
        self.cell.borrow().clone()
    }

    /// Assign a new value, returning the previous one
    pub fn set(&self, value: impl Into<Value>) -> Value {
        self.cell.replace(value.into())
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variable({:?})", self.cell.borrow())
    }
}

/// Something a closure can capture.
pub trait CaptureSource {
    /// The current value, copied out
    fn read(&self) -> Value;

    /// A reader that shares the source's storage
    fn alias(&self) -> Box<dyn Fn() -> Value>;
}

impl CaptureSource for Variable {
    fn read(&self) -> Value {
        self.get()
    }

    fn alias(&self) -> Box<dyn Fn() -> Value> {
        let cell = Rc::clone(&self.cell);
        Box::new(move || cell.borrow().clone())
    }
}

impl CaptureSource for HandleField {
    fn read(&self) -> Value {
        HandleField::read(self)
    }

    fn alias(&self) -> Box<dyn Fn() -> Value> {
        let field = self.clone();
        Box::new(move || field.read())
    }
}

/// A deferred computation bound to a captured variable.
pub struct CapturingClosure {
    mode: CaptureMode,
    body: Box<dyn Fn() -> Value>,
}

impl CapturingClosure {
    /// The capture mode fixed at construction
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Evaluate the closure
    pub fn call(&self) -> Value {
        (self.body)()
    }
}

impl fmt::Debug for CapturingClosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<closure {:?}>", self.mode)
    }
}

/// Build a closure over `source` with the given capture mode.
pub fn make_capturing_closure(mode: CaptureMode, source: &impl CaptureSource) -> CapturingClosure {
    let body: Box<dyn Fn() -> Value> = match mode {
        CaptureMode::ByValue => {
            let snapshot = source.read();
            Box::new(move || snapshot.clone())
        }
        CaptureMode::ByReference => source.alias(),
    };
    CapturingClosure { mode, body }
}

/// A closure carrying its own running total.
///
/// Closures are reference types: clones share the same total.
#[derive(Clone)]
pub struct Incrementer {
    amount: i64,
    step: Rc<dyn Fn() -> i64>,
}

impl Incrementer {
    /// Add the amount to the running total and return it
    pub fn call(&self) -> i64 {
        (self.step)()
    }
}

impl fmt::Debug for Incrementer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<incrementer +{}>", self.amount)
    }
}

/// Build an incrementer starting from zero.
pub fn make_incrementer(amount: i64) -> Incrementer {
    let total = Cell::new(0i64);
    Incrementer {
        amount,
        step: Rc::new(move || {
            let next = total.get().saturating_add(amount);
            total.set(next);
            next
        }),
    }
}
