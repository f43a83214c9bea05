//! Reference handles: shared mutable instances with a teardown hook
//!
//! A [`ReferenceHandle`] is one binding to a reference-counted instance.
//! Cloning (or [`ReferenceHandle::share`]) adds a binding; dropping one
//! removes it. When the last binding goes away the instance's teardown
//! hook runs inside that drop, before control returns to the caller.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::{Value, ValueRecord};
use crate::error::{Result, SandboxError};

/// One-time cleanup run with the instance's final field values.
pub type TeardownHook = Box<dyn FnOnce(&ValueRecord)>;

type WillSetFn = Box<dyn Fn(&Value)>;
type DidSetFn = Box<dyn Fn(&Value, &Value)>;

/// Process-unique identity of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        InstanceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an instance as seen from a [`WeakHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// At least one binding is live
    Alive,

    /// The last binding was released and the teardown hook has run
    Destroyed,
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleState::Alive => write!(f, "alive"),
            HandleState::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Callbacks fired around every assignment to one field.
///
/// Observers do not run for the values a handle is constructed with.
#[derive(Default)]
pub struct PropertyObserver {
    will_set: Option<WillSetFn>,
    did_set: Option<DidSetFn>,
}

impl PropertyObserver {
    /// Create an observer with no callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f(new)` before the field changes.
    pub fn will_set(mut self, f: impl Fn(&Value) + 'static) -> Self {
        self.will_set = Some(Box::new(f));
        self
    }

    /// Run `f(old, new)` after the field changed.
    pub fn did_set(mut self, f: impl Fn(&Value, &Value) + 'static) -> Self {
        self.did_set = Some(Box::new(f));
        self
    }
}

struct Instance {
    id: InstanceId,
    type_name: String,
    fields: RefCell<IndexMap<String, Value>>,
    observers: RefCell<Vec<(String, Rc<PropertyObserver>)>>,
    teardown: RefCell<Option<TeardownHook>>,
}

impl Drop for Instance {
    fn drop(&mut self) {
        tracing::debug!(instance = %self.id, type_name = %self.type_name, "instance destroyed");
        if let Some(hook) = self.teardown.get_mut().take() {
            let last = ValueRecord {
                type_name: std::mem::take(&mut self.type_name),
                fields: std::mem::take(self.fields.get_mut()),
            };
            hook(&last);
        }
    }
}

/// A binding to a shared, mutable instance.
///
/// Equality is identity: two handles are equal when they denote the same
/// instance, regardless of field contents.
///
/// # Example
///
/// ```
/// use semantics_sandbox::{ReferenceHandle, Value};
///
/// let a = ReferenceHandle::builder("Counter").with_field("count", 0).build();
/// let b = a.share();
///
/// b.set("count", 1).unwrap();
/// assert_eq!(a.get("count"), Some(Value::Int(1)));
/// assert!(ReferenceHandle::same_instance(&a, &b));
/// ```
pub struct ReferenceHandle {
    inner: Rc<Instance>,
}

/// Construction of a new instance.
///
/// Fields and the teardown hook can only be set here, before the first
/// binding exists. Once built, an instance keeps its shape and its hook.
///
/// ```compile_fail
/// use semantics_sandbox::ReferenceHandle;
///
/// let a = ReferenceHandle::builder("Counter").with_field("count", 0).build();
/// let b = a.share().with_field("extra", 1);
/// ```
///
/// ```compile_fail
/// use semantics_sandbox::ReferenceHandle;
///
/// let a = ReferenceHandle::builder("Counter").with_teardown(|_| {}).build();
/// let b = a.share().with_teardown(|_| {});
/// ```
pub struct HandleBuilder {
    type_name: String,
    fields: IndexMap<String, Value>,
    teardown: Option<TeardownHook>,
}

impl HandleBuilder {
    /// Add a field (builder pattern)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set the teardown hook, replacing one set earlier on this builder.
    pub fn with_teardown(mut self, hook: impl FnOnce(&ValueRecord) + 'static) -> Self {
        self.teardown = Some(Box::new(hook));
        self
    }

    /// Create the instance and its first binding.
    pub fn build(self) -> ReferenceHandle {
        ReferenceHandle {
            inner: Rc::new(Instance {
                id: InstanceId::next(),
                type_name: self.type_name,
                fields: RefCell::new(self.fields),
                observers: RefCell::new(Vec::new()),
                teardown: RefCell::new(self.teardown),
            }),
        }
    }
}

impl ReferenceHandle {
    /// Start building a new instance.
    pub fn builder(type_name: impl Into<String>) -> HandleBuilder {
        HandleBuilder {
            type_name: type_name.into(),
            fields: IndexMap::new(),
            teardown: None,
        }
    }

    /// Create a new instance holding a copy of the record's fields.
    pub fn from_record(record: ValueRecord) -> Self {
        HandleBuilder {
            type_name: record.type_name,
            fields: record.fields,
            teardown: None,
        }
        .build()
    }

    /// A new binding to the same instance.
    pub fn share(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Identity of the underlying instance
    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    /// The instance's type name
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// Number of live bindings to the instance
    pub fn binding_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Whether two bindings denote the same instance.
    pub fn same_instance(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Read a field
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.fields.borrow().get(name).cloned()
    }

    /// Whether the instance has a field with this name
    pub fn has_field(&self, name: &str) -> bool {
        self.inner.fields.borrow().contains_key(name)
    }

    /// Assign a field through this binding, returning the previous value.
    ///
    /// Mutation goes through `&self`: every binding may mutate, and every
    /// other binding observes the change. Observers registered for the
    /// field run around the assignment.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<Value> {
        let value = value.into();
        if !self.has_field(name) {
            return Err(self.unknown_field(name));
        }

        let observers = self.observers_for(name);
        for observer in &observers {
            if let Some(will_set) = &observer.will_set {
                will_set(&value);
            }
        }

        let old = {
            let mut fields = self.inner.fields.borrow_mut();
            let slot = fields
                .get_mut(name)
                .ok_or_else(|| SandboxError::unknown_field(&self.inner.type_name, name))?;
            std::mem::replace(slot, value.clone())
        };
        tracing::trace!(instance = %self.id(), field = name, old = %old, new = %value, "field set");

        for observer in &observers {
            if let Some(did_set) = &observer.did_set {
                did_set(&old, &value);
            }
        }
        Ok(old)
    }

    /// Replace a field with `f(current)`, returning the new value.
    pub fn update(&self, name: &str, f: impl FnOnce(&Value) -> Value) -> Result<Value> {
        let current = self.get(name).ok_or_else(|| self.unknown_field(name))?;
        let new = f(&current);
        self.set(name, new.clone())?;
        Ok(new)
    }

    /// Register an observer for an existing field.
    pub fn observe(&self, name: &str, observer: PropertyObserver) -> Result<()> {
        if !self.has_field(name) {
            return Err(self.unknown_field(name));
        }
        self.inner
            .observers
            .borrow_mut()
            .push((name.to_string(), Rc::new(observer)));
        Ok(())
    }

    /// Copy the current field values into an independent record.
    pub fn snapshot(&self) -> ValueRecord {
        ValueRecord {
            type_name: self.inner.type_name.clone(),
            fields: self.inner.fields.borrow().clone(),
        }
    }

    /// Explicit deep copy into a new instance with its own identity.
    ///
    /// The copy starts without a teardown hook or observers.
    pub fn clone_instance(&self) -> Self {
        Self::from_record(self.snapshot())
    }

    /// A non-owning reference that can report whether the instance is alive.
    pub fn downgrade(&self) -> WeakHandle {
        WeakHandle {
            id: self.id(),
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// A capturable reference to one field of this instance.
    ///
    /// The returned value holds a binding, keeping the instance alive.
    pub fn field(&self, name: &str) -> Result<HandleField> {
        if !self.has_field(name) {
            return Err(self.unknown_field(name));
        }
        Ok(HandleField {
            handle: self.share(),
            name: name.to_string(),
        })
    }

    pub(crate) fn with_fields<R>(&self, f: impl FnOnce(&IndexMap<String, Value>) -> R) -> R {
        f(&self.inner.fields.borrow())
    }

    fn observers_for(&self, name: &str) -> Vec<Rc<PropertyObserver>> {
        self.inner
            .observers
            .borrow()
            .iter()
            .filter(|(field, _)| field == name)
            .map(|(_, observer)| Rc::clone(observer))
            .collect()
    }

    fn unknown_field(&self, name: &str) -> SandboxError {
        SandboxError::unknown_field(&self.inner.type_name, name)
    }
}

impl Clone for ReferenceHandle {
    fn clone(&self) -> Self {
        self.share()
    }
}

impl PartialEq for ReferenceHandle {
    fn eq(&self, other: &Self) -> bool {
        Self::same_instance(self, other)
    }
}

impl Eq for ReferenceHandle {}

/// A non-owning reference to an instance.
#[derive(Clone)]
pub struct WeakHandle {
    id: InstanceId,
    inner: Weak<Instance>,
}

impl WeakHandle {
    /// Identity of the instance this refers to
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Whether the instance is still alive
    pub fn state(&self) -> HandleState {
        if self.inner.strong_count() > 0 {
            HandleState::Alive
        } else {
            HandleState::Destroyed
        }
    }

    /// A new binding, if the instance is still alive.
    pub fn upgrade(&self) -> Option<ReferenceHandle> {
        self.inner.upgrade().map(|inner| ReferenceHandle { inner })
    }
}

impl fmt::Debug for WeakHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakHandle(#{}, {})", self.id, self.state())
    }
}

/// One field of a shared instance, usable as a capture source.
#[derive(Clone, Debug)]
pub struct HandleField {
    handle: ReferenceHandle,
    name: String,
}

impl HandleField {
    /// Current value of the field
    pub fn read(&self) -> Value {
        // Fields are never removed, so the name validated at construction stays valid.
        self.handle.get(&self.name).unwrap_or(Value::Unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> ReferenceHandle {
        ReferenceHandle::builder("Counter")
            .with_field("count", 0)
            .build()
    }

    #[test]
    fn test_share_aliases_instance() {
        let a = counter();
        let b = a.share();
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
        assert_eq!(a.binding_count(), 2);

        b.set("count", 5).unwrap();
        assert_eq!(a.get("count"), Some(Value::Int(5)));
    }

    #[test]
    fn test_distinct_instances_are_not_equal() {
        let a = counter();
        let b = counter();
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_set_unknown_field() {
        let a = counter();
        let err = a.set("total", 1).unwrap_err();
        assert_eq!(err, SandboxError::unknown_field("Counter", "total"));
        assert!(!a.has_field("total"));
    }

    #[test]
    fn test_update() {
        let a = counter();
        let new = a
            .update("count", |v| Value::Int(v.as_i64().unwrap_or(0) + 1))
            .unwrap();
        assert_eq!(new, Value::Int(1));
        assert_eq!(a.get("count"), Some(Value::Int(1)));
    }

    #[test]
    fn test_teardown_runs_on_last_drop() {
        let fired = Rc::new(Cell::new(0));
        let seen = fired.clone();
        let a = ReferenceHandle::builder("Counter")
            .with_field("count", 0)
            .with_teardown(move |_| seen.set(seen.get() + 1))
            .build();
        let b = a.share();

        drop(a);
        assert_eq!(fired.get(), 0);
        drop(b);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_teardown_sees_final_fields() {
        let last = Rc::new(RefCell::new(None));
        let slot = last.clone();
        let a = ReferenceHandle::builder("Counter")
            .with_field("count", 0)
            .with_teardown(move |r| *slot.borrow_mut() = Some(r.to_string()))
            .build();
        a.set("count", 3).unwrap();
        drop(a);
        assert_eq!(last.borrow().as_deref(), Some("count=3"));
    }

    #[test]
    fn test_weak_handle_state() {
        let a = counter();
        let weak = a.downgrade();
        assert_eq!(weak.state(), HandleState::Alive);
        assert!(weak.upgrade().is_some());

        drop(a);
        assert_eq!(weak.state(), HandleState::Destroyed);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_clone_instance_is_independent() {
        let fired = Rc::new(Cell::new(false));
        let seen = fired.clone();
        let a = ReferenceHandle::builder("Counter")
            .with_field("count", 0)
            .with_teardown(move |_| seen.set(true))
            .build();
        let copy = a.clone_instance();

        assert_ne!(a, copy);
        copy.set("count", 7).unwrap();
        assert_eq!(a.get("count"), Some(Value::Int(0)));

        drop(copy);
        assert!(!fired.get());
        drop(a);
        assert!(fired.get());
    }

    #[test]
    fn test_observers_fire_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = counter();

        let will = log.clone();
        let did = log.clone();
        a.observe(
            "count",
            PropertyObserver::new()
                .will_set(move |new| will.borrow_mut().push(format!("will {}", new)))
                .did_set(move |old, new| did.borrow_mut().push(format!("did {}->{}", old, new))),
        )
        .unwrap();

        a.set("count", 1).unwrap();
        a.set("count", 1).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["will 1", "did 0->1", "will 1", "did 1->1"]
        );
    }

    #[test]
    fn test_observer_on_unknown_field() {
        let a = counter();
        assert!(a.observe("total", PropertyObserver::new()).is_err());
    }

    #[test]
    fn test_observer_may_read_handle() {
        let a = counter();
        let reader = a.downgrade();
        let seen = Rc::new(Cell::new(-1));
        let slot = seen.clone();
        a.observe(
            "count",
            PropertyObserver::new().did_set(move |_, _| {
                if let Some(h) = reader.upgrade() {
                    slot.set(h.get("count").and_then(|v| v.as_i64()).unwrap_or(-1));
                }
            }),
        )
        .unwrap();

        a.set("count", 4).unwrap();
        assert_eq!(seen.get(), 4);
    }

    #[test]
    fn test_field_reference_keeps_instance_alive() {
        let a = counter();
        let weak = a.downgrade();
        let field = a.field("count").unwrap();
        drop(a);

        assert_eq!(weak.state(), HandleState::Alive);
        assert_eq!(field.read(), Value::Int(0));
        drop(field);
        assert_eq!(weak.state(), HandleState::Destroyed);
    }
}
