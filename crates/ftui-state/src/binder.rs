#![forbid(unsafe_code)]

//! Binding of caller-constructed state cells.
//!
//! # Design
//!
//! Callers sometimes want a specialised cell (extra validation, extra
//! methods) instead of a plain [`ValueCell`]. They construct it themselves
//! and hand it to [`bind`] / [`bind_with`], which check that it is backed by
//! a genuine `ValueCell`, optionally run a one-shot initial effect with the
//! current value, and give the same instance back.
//!
//! The genuineness check is nominal. [`State::value_cell`] must return a
//! `&ValueCell`, and the only way to get one is to construct a cell. A type
//! that merely has `get`/`set` (and leaves `value_cell` at its default)
//! is rejected with [`InstanceError`].
//!
//! # Invariants
//!
//! 1. The binder never constructs a cell and never writes to one. Only the
//!    initial effect may write, through the instance it was given.
//! 2. On success the returned instance is the argument itself.
//! 3. On failure the initial effect is not run.

use std::fmt;

use tracing::{debug, trace};

use crate::cell::ValueCell;
use crate::error::{InstanceError, ValidationError};
use crate::value::CellValue;

/// The get/set capability of a state holder.
///
/// Implemented by [`ValueCell`] and by wrapper types that specialise one.
///
/// ```
/// use ftui_state::{State, ValidationError, ValueCell};
///
/// /// A percentage that saturates at 100.
/// #[derive(Debug, Clone)]
/// struct Percent(ValueCell<u8>);
///
/// impl State for Percent {
///     type Value = u8;
///
///     fn get(&self) -> u8 {
///         self.0.get()
///     }
///
///     fn set(&self, value: u8) -> Result<(), ValidationError> {
///         self.0.set(value.min(100))
///     }
///
///     fn value_cell(&self) -> Option<&ValueCell<u8>> {
///         Some(&self.0)
///     }
/// }
///
/// let percent = ftui_state::bind(Percent(ValueCell::new(0))).unwrap();
/// percent.set(250).unwrap();
/// assert_eq!(percent.get(), 100);
/// ```
pub trait State {
    /// Type of the held value.
    type Value: CellValue;

    /// Current value.
    fn get(&self) -> Self::Value;

    /// Write a new value.
    fn set(&self, value: Self::Value) -> Result<(), ValidationError>;

    /// The genuine cell backing this state, if any.
    fn value_cell(&self) -> Option<&ValueCell<Self::Value>> {
        None
    }
}

impl<T: CellValue> State for ValueCell<T> {
    type Value = T;

    fn get(&self) -> T {
        ValueCell::get(self)
    }

    fn set(&self, value: T) -> Result<(), ValidationError> {
        ValueCell::set(self, value)
    }

    fn value_cell(&self) -> Option<&ValueCell<T>> {
        Some(self)
    }
}

/// Check that `instance` is backed by a genuine [`ValueCell`] and return it.
pub fn bind<S>(instance: S) -> Result<S, InstanceError>
where
    S: State + fmt::Debug,
{
    bind_impl(instance, None::<fn(&S::Value)>)
}

/// Like [`bind`], then run `initial_effect` once with the current value.
///
/// The effect's side effects are the caller's business; it may write to the
/// instance (through a handle it captured), which goes through the normal
/// `set` path including the change callback.
pub fn bind_with<S, F>(instance: S, initial_effect: F) -> Result<S, InstanceError>
where
    S: State + fmt::Debug,
    F: FnOnce(&S::Value),
{
    bind_impl(instance, Some(initial_effect))
}

fn bind_impl<S, F>(instance: S, initial_effect: Option<F>) -> Result<S, InstanceError>
where
    S: State + fmt::Debug,
    F: FnOnce(&S::Value),
{
    let label = match instance.value_cell() {
        Some(cell) => cell.label(),
        None => {
            let err = InstanceError::new(format!("{instance:?}"));
            debug!(target: "ftui_state", instance = %err.instance, "rejected bind: not a value cell");
            return Err(err);
        }
    };

    if let Some(effect) = initial_effect {
        let value = instance.get();
        effect(&value);
    }
    trace!(target: "ftui_state", label = label.as_deref(), "bound state");
    Ok(instance)
}
