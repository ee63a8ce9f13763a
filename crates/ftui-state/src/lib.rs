#![forbid(unsafe_code)]

//! Observable single-value state for FrankenTUI.
//!
//! This crate provides one mutable-state primitive and the helper that lets
//! callers plug in their own specialisation of it:
//!
//! - [`ValueCell`]: a shared holder of exactly one value with an optional
//!   change callback, a runtime type guard and shallow change detection.
//! - [`bind`] / [`bind_with`]: accept a caller-constructed [`State`], verify
//!   it is backed by a genuine `ValueCell`, optionally run a one-shot initial
//!   effect with the current value, and return the same instance.
//!
//! # Architecture
//!
//! `ValueCell<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Everything is synchronous: the change callback runs inside
//! `set` after the write is committed, with the interior borrow released so
//! the callback may read or write cells (including its own).
//!
//! # Invariants
//!
//! 1. A cell's runtime value type is fixed at construction; mismatched writes
//!    fail with [`ValidationError`] and change nothing.
//! 2. Writing a value that is the same as the current one is a no-op (no
//!    version bump, no callback).
//! 3. A committed change invokes the callback exactly once, with the new
//!    value, after `get()` already returns it.
//! 4. Binding never creates or writes a cell, and returns its argument.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use ftui_state::{ValueCell, bind_with};
//!
//! let renders = Rc::new(Cell::new(0));
//! let renders_clone = Rc::clone(&renders);
//! let count = ValueCell::with_on_change(0, move |_| renders_clone.set(renders_clone.get() + 1));
//!
//! let count = bind_with(count, |initial| assert_eq!(*initial, 0)).unwrap();
//! count.set(1).unwrap();
//! count.set(1).unwrap(); // Same value: no callback.
//! assert_eq!(renders.get(), 1);
//! ```

pub mod binder;
pub mod cell;
pub mod config;
pub mod error;
pub mod value;

#[cfg(feature = "json")]
pub mod json;
#[cfg(feature = "tracing-json")]
pub mod logging;

pub use binder::{State, bind, bind_with};
pub use cell::{ValueCell, WeakValueCell};
pub use config::CellConfig;
pub use error::{ConfigError, InstanceError, StateError, ValidationError};
pub use value::{CellValue, Value, ValueKind};
