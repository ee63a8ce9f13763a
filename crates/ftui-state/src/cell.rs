#![forbid(unsafe_code)]

//! Observable single-value cell with a change callback.
//!
//! # Design
//!
//! [`ValueCell<T>`] wraps one value of type `T` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). A write that passes the runtime type guard
//! and differs from the current value (by [`CellValue::same_value`]) is
//! committed, and then the optional change callback runs synchronously with
//! the new value.
//!
//! ```text
//! set(v)
//!   type_name(v) != type_name(current) ──> Err(ValidationError), no change
//!   same_value(v, current)             ──> Ok, no change, no callback
//!   otherwise                          ──> commit, version += 1, callback(&v)
//! ```
//!
//! # Re-entrancy
//!
//! The interior borrow is released before the callback runs, so a callback
//! may call [`get`](ValueCell::get) (observing the committed value) or
//! [`set`](ValueCell::set) on the same cell. Nested writes run to completion
//! before the outer `set` returns. Nothing detects cycles: a callback that
//! keeps producing new values recurses until the stack runs out.
//!
//! # Failure Modes
//!
//! - **Type mismatch**: `set` / `update` return [`ValidationError`]; value,
//!   version and callback are untouched.
//! - **Borrow inside closures**: the closures given to
//!   [`with`](ValueCell::with) and [`update`](ValueCell::update) run while the
//!   interior is borrowed. Writing to the same cell from inside them panics
//!   (RefCell borrow rules).
//! - **Reference cycle**: a callback that captures a strong clone of its own
//!   cell keeps the cell alive forever. Capture a [`WeakValueCell`] instead.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::config::CellConfig;
use crate::error::ValidationError;
use crate::value::CellValue;

/// Change callback, shared so it can be invoked outside the interior borrow.
type Callback<T> = Rc<dyn Fn(&T)>;

/// Shared interior for [`ValueCell<T>`].
struct CellInner<T> {
    value: T,
    version: u64,
    on_change: Option<Callback<T>>,
    config: CellConfig,
}

/// A shared, observable holder of exactly one value.
///
/// Cloning a `ValueCell` creates a new handle to the **same** interior; use
/// [`ValueCell::ptr_eq`] to compare handles.
///
/// # Invariants
///
/// 1. The runtime type of the stored value never changes after construction.
/// 2. `version` increments by exactly 1 on each committed change.
/// 3. `set(v)` where `v` is the same value as the current one is a no-op.
/// 4. The change callback runs at most once per committed change, after the
///    new value is visible through `get()`.
pub struct ValueCell<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

impl<T> Clone for ValueCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Mutably borrowed while an `update` closure runs.
        let Ok(inner) = self.inner.try_borrow() else {
            return f
                .debug_struct("ValueCell")
                .field("value", &format_args!("<borrowed>"))
                .finish_non_exhaustive();
        };
        let mut s = f.debug_struct("ValueCell");
        if let Some(label) = &inner.config.label {
            s.field("label", label);
        }
        s.field("value", &inner.value)
            .field("version", &inner.version)
            .field("has_on_change", &inner.on_change.is_some())
            .finish()
    }
}

impl<T: CellValue> ValueCell<T> {
    /// Create a cell holding `value`, with no callback.
    ///
    /// The runtime type of `value` is the type every later write must match.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::with_config(value, CellConfig::default())
    }

    /// Create a cell holding `value` that calls `on_change` after every
    /// committed change.
    #[must_use]
    pub fn with_on_change(value: T, on_change: impl Fn(&T) + 'static) -> Self {
        let cell = Self::new(value);
        cell.set_on_change(on_change);
        cell
    }

    /// Create a cell with explicit configuration.
    #[must_use]
    pub fn with_config(value: T, config: CellConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                value,
                version: 0,
                on_change: None,
                config,
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Write a new value.
    ///
    /// Fails with [`ValidationError`] if the runtime type of `value` differs
    /// from the stored value's. Otherwise, if `value` is not the same as the
    /// current value, it is committed, the version is incremented, and the
    /// change callback (if any) runs with the new value.
    pub fn set(&self, value: T) -> Result<(), ValidationError> {
        let notify = {
            let mut inner = self.inner.borrow_mut();
            let expected = inner.value.type_name();
            let received = value.type_name();
            if expected != received {
                debug!(
                    target: "ftui_state",
                    label = inner.config.label.as_deref(),
                    expected,
                    received,
                    "rejected write: type mismatch"
                );
                return Err(ValidationError::new(expected, received));
            }
            if inner.value.same_value(&value) {
                trace!(
                    target: "ftui_state",
                    label = inner.config.label.as_deref(),
                    "write skipped: value unchanged"
                );
                return Ok(());
            }
            inner.value = value;
            inner.version += 1;
            inner.log_commit();
            inner
                .on_change
                .clone()
                .map(|callback| (callback, inner.value.clone()))
        };

        // Borrow released: the callback may read or write this cell.
        if let Some((callback, value)) = notify {
            callback(&value);
        }
        Ok(())
    }

    /// Modify the value in place via a closure.
    ///
    /// The result goes through the same checks as [`set`](Self::set),
    /// against a snapshot taken before `f` runs. A closure that changes the
    /// runtime type is rolled back and [`ValidationError`] is returned.
    ///
    /// # Panics
    ///
    /// Panics if `f` reads or writes this cell. Formatting it with `Debug`
    /// is fine and shows the value as `<borrowed>`.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<(), ValidationError> {
        let notify = {
            let mut inner = self.inner.borrow_mut();
            let old = inner.value.clone();
            f(&mut inner.value);
            let expected = old.type_name();
            let received = inner.value.type_name();
            if expected != received {
                debug!(
                    target: "ftui_state",
                    label = inner.config.label.as_deref(),
                    expected,
                    received,
                    "rolled back update: type mismatch"
                );
                inner.value = old;
                return Err(ValidationError::new(expected, received));
            }
            if inner.value.same_value(&old) {
                return Ok(());
            }
            inner.version += 1;
            inner.log_commit();
            inner
                .on_change
                .clone()
                .map(|callback| (callback, inner.value.clone()))
        };

        if let Some((callback, value)) = notify {
            callback(&value);
        }
        Ok(())
    }

    /// Install the change callback, replacing any previous one.
    pub fn set_on_change(&self, on_change: impl Fn(&T) + 'static) {
        self.inner.borrow_mut().on_change = Some(Rc::new(on_change));
    }

    /// Remove the change callback. Returns whether one was installed.
    pub fn clear_on_change(&self) -> bool {
        self.inner.borrow_mut().on_change.take().is_some()
    }

    #[must_use]
    pub fn has_on_change(&self) -> bool {
        self.inner.borrow().on_change.is_some()
    }

    /// Number of committed changes since construction.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.inner.borrow().config.label.clone()
    }

    /// Create a weak handle that does not keep the cell alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakValueCell<T> {
        WeakValueCell {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same cell.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<T: CellValue> CellInner<T> {
    fn log_commit(&self) {
        if self.config.log_values {
            debug!(
                target: "ftui_state",
                label = self.config.label.as_deref(),
                version = self.version,
                value = ?self.value,
                "value changed"
            );
        } else {
            debug!(
                target: "ftui_state",
                label = self.config.label.as_deref(),
                version = self.version,
                "value changed"
            );
        }
    }
}

/// Non-owning handle to a [`ValueCell`].
///
/// Meant for change callbacks that need to reach their own cell.
pub struct WeakValueCell<T> {
    inner: Weak<RefCell<CellInner<T>>>,
}

impl<T> Clone for WeakValueCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for WeakValueCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakValueCell")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<T> WeakValueCell<T> {
    /// Get a strong handle if the cell is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ValueCell<T>> {
        self.inner.upgrade().map(|inner| ValueCell { inner })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::cell::Cell;

    #[test]
    fn get_set_basic() {
        let cell = ValueCell::new(42);
        assert_eq!(cell.get(), 42);
        assert_eq!(cell.version(), 0);

        cell.set(99).unwrap();
        assert_eq!(cell.get(), 99);
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn same_value_is_noop() {
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        let cell = ValueCell::with_on_change(5, move |_| calls_clone.set(calls_clone.get() + 1));

        cell.set(5).unwrap();
        assert_eq!(cell.get(), 5);
        assert_eq!(cell.version(), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn change_fires_callback_once_with_new_value() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let cell = ValueCell::with_on_change(5, move |v: &i32| seen_clone.borrow_mut().push(*v));

        cell.set(6).unwrap();
        assert_eq!(*seen.borrow(), vec![6]);
        assert_eq!(cell.get(), 6);
    }

    #[test]
    fn type_mismatch_leaves_state_untouched() {
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        let cell = ValueCell::with_on_change(Value::from(5), move |_| {
            calls_clone.set(calls_clone.get() + 1);
        });

        let err = cell.set(Value::from("x")).unwrap_err();
        assert_eq!(err, ValidationError::new("number", "string"));
        assert_eq!(
            err.to_string(),
            "Expected type of number but received string"
        );
        assert_eq!(cell.get().as_f64(), Some(5.0));
        assert_eq!(cell.version(), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn callback_observes_committed_value() {
        let cell = ValueCell::new(String::from("a"));
        let weak = cell.downgrade();
        let observed = Rc::new(RefCell::new(None));
        let observed_clone = Rc::clone(&observed);
        cell.set_on_change(move |_| {
            let strong = weak.upgrade().expect("cell alive");
            *observed_clone.borrow_mut() = Some(strong.get());
        });

        cell.set("b".to_string()).unwrap();
        assert_eq!(observed.borrow().as_deref(), Some("b"));
    }

    #[test]
    fn reentrant_set_runs_to_completion() {
        // Callback clamps the value down to 10 by writing again.
        let cell = ValueCell::new(0i64);
        let weak = cell.downgrade();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        cell.set_on_change(move |v: &i64| {
            seen_clone.borrow_mut().push(*v);
            if *v > 10 {
                weak.upgrade().unwrap().set(10).unwrap();
            }
        });

        cell.set(25).unwrap();
        assert_eq!(cell.get(), 10);
        assert_eq!(*seen.borrow(), vec![25, 10]);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn callback_can_chain_across_cells() {
        let celsius = ValueCell::new(0.0f64);
        let fahrenheit = ValueCell::new(32.0f64);
        let target = fahrenheit.clone();
        celsius.set_on_change(move |c| target.set(c * 9.0 / 5.0 + 32.0).unwrap());

        celsius.set(100.0).unwrap();
        assert_eq!(fahrenheit.get(), 212.0);
    }

    #[test]
    fn shallow_equality_for_shared_values() {
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        let first = Rc::new(vec![1, 2, 3]);
        let cell = ValueCell::with_on_change(Rc::clone(&first), move |_| {
            calls_clone.set(calls_clone.get() + 1);
        });

        cell.set(Rc::clone(&first)).unwrap();
        assert_eq!(calls.get(), 0);

        // Structurally equal, different allocation: a change.
        cell.set(Rc::new(vec![1, 2, 3])).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(!Rc::ptr_eq(&cell.get(), &first));
    }

    #[test]
    fn update_mutates_in_place() {
        let cell = ValueCell::new(Value::from(1));
        cell.update(|v| *v = Value::from(2)).unwrap();
        assert_eq!(cell.get().as_f64(), Some(2.0));
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn update_no_change_no_bump() {
        let cell = ValueCell::new(10);
        cell.update(|v| *v = 10).unwrap();
        assert_eq!(cell.version(), 0);
    }

    #[test]
    fn update_type_change_rolls_back() {
        let cell = ValueCell::new(Value::from("keep"));
        let err = cell.update(|v| *v = Value::Null).unwrap_err();
        assert_eq!(err.expected, "string");
        assert_eq!(err.received, "null");
        assert_eq!(cell.get().as_str(), Some("keep"));
        assert_eq!(cell.version(), 0);
    }

    #[test]
    fn option_inner_type_is_guarded() {
        let cell = ValueCell::new(Some(Value::from(5)));
        let err = cell.set(Some(Value::from("x"))).unwrap_err();
        assert_eq!(err, ValidationError::new("number", "string"));
        assert_eq!(cell.get().and_then(|v| v.as_f64()), Some(5.0));

        let err = cell.set(None).unwrap_err();
        assert_eq!(err, ValidationError::new("number", "null"));
        cell.set(Some(Value::from(6))).unwrap();
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn debug_inside_update_does_not_panic() {
        let cell = ValueCell::new(1);
        let handle = cell.clone();
        let mut rendered = String::new();
        cell.update(|v| {
            rendered = format!("{handle:?}");
            *v = 2;
        })
        .unwrap();
        assert!(rendered.contains("<borrowed>"));
        assert!(format!("{cell:?}").contains("value: 2"));
    }

    #[test]
    fn update_notifies() {
        let last = Rc::new(Cell::new(0usize));
        let last_clone = Rc::clone(&last);
        let cell = ValueCell::with_on_change(String::from("ab"), move |s: &String| {
            last_clone.set(s.len());
        });
        cell.update(|s| s.push('c')).unwrap();
        assert_eq!(last.get(), 3);
    }

    #[test]
    fn with_access() {
        let cell = ValueCell::new(String::from("hello"));
        assert_eq!(cell.with(String::len), 5);
    }

    #[test]
    fn callback_can_be_replaced_and_cleared() {
        let a = Rc::new(Cell::new(0u32));
        let b = Rc::new(Cell::new(0u32));
        let a_clone = Rc::clone(&a);
        let b_clone = Rc::clone(&b);

        let cell = ValueCell::with_on_change(0, move |_| a_clone.set(a_clone.get() + 1));
        cell.set(1).unwrap();
        cell.set_on_change(move |_| b_clone.set(b_clone.get() + 1));
        cell.set(2).unwrap();
        assert_eq!((a.get(), b.get()), (1, 1));

        assert!(cell.clear_on_change());
        assert!(!cell.has_on_change());
        assert!(!cell.clear_on_change());
        cell.set(3).unwrap();
        assert_eq!((a.get(), b.get()), (1, 1));
    }

    #[test]
    fn clone_shares_state() {
        let a = ValueCell::new(0u8);
        let b = a.clone();
        a.set(42).unwrap();
        assert_eq!(b.get(), 42);
        assert_eq!(b.version(), 1);
        assert!(ValueCell::ptr_eq(&a, &b));
        assert!(!ValueCell::ptr_eq(&a, &ValueCell::new(42)));
    }

    #[test]
    fn weak_handle_does_not_keep_cell_alive() {
        let cell = ValueCell::new(1);
        let weak = cell.downgrade();
        assert!(weak.upgrade().is_some());
        drop(cell);
        assert!(weak.upgrade().is_none());
        assert!(format!("{weak:?}").contains("alive: false"));
    }

    #[test]
    fn many_set_calls_version_monotonic() {
        let cell = ValueCell::new(0);
        for i in 1..=100 {
            cell.set(i).unwrap();
        }
        assert_eq!(cell.version(), 100);
        assert_eq!(cell.get(), 100);
    }

    #[test]
    fn debug_format() {
        let cell = ValueCell::with_config(42, CellConfig::new().with_label("answer"));
        let dbg = format!("{cell:?}");
        assert!(dbg.contains("ValueCell"));
        assert!(dbg.contains("answer"));
        assert!(dbg.contains("42"));
        assert!(dbg.contains("version"));
        assert_eq!(cell.label().as_deref(), Some("answer"));
    }

    #[test]
    fn logged_values_do_not_change_semantics() {
        let cell = ValueCell::with_config(1, CellConfig::new().with_log_values(true));
        cell.set(2).unwrap();
        cell.set(2).unwrap();
        assert_eq!(cell.version(), 1);
    }
}
