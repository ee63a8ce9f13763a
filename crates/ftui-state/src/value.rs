#![forbid(unsafe_code)]

//! Runtime type contract for values stored in a [`ValueCell`](crate::ValueCell).
//!
//! # Design
//!
//! A cell's element type is fixed statically by its generic parameter, but a
//! cell still guards every write at runtime through [`CellValue::type_name`].
//! For ordinary Rust types the name is constant, so the guard never fires.
//! For the dynamic [`Value`] it is the variant's kind, which is what keeps a
//! `ValueCell<Value>` fed from an untyped boundary (JSON, scripting, config)
//! from silently changing shape.
//!
//! Change detection uses [`CellValue::same_value`], which is shallow:
//!
//! | Type | Equality |
//! |------|----------|
//! | primitives, `String` | by value (`==`) |
//! | `f32` / `f64` | IEEE (`NaN != NaN`) |
//! | `Rc<T>` | by identity (`Rc::ptr_eq`) |
//! | `Value::List` / `Value::Map` | by identity of the shared payload |
//! | `Option<T>` | `None == None`, otherwise by `T` |
//!
//! Two structurally equal but separately allocated composites therefore count
//! as a change.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A value that can live in a [`ValueCell`](crate::ValueCell).
///
/// Only [`same_value`](Self::same_value) is required. The default
/// [`type_name`](Self::type_name) is the static type name, which makes the
/// runtime type guard a no-op for that type.
///
/// ```
/// use ftui_state::CellValue;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Cursor { row: u16, col: u16 }
///
/// impl CellValue for Cursor {
///     fn same_value(&self, other: &Self) -> bool {
///         self == other
///     }
/// }
/// ```
pub trait CellValue: Clone + fmt::Debug + 'static {
    /// Runtime type of this value. Writes whose type name differs from the
    /// stored value's are rejected.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Native equality used to decide whether a write is a change.
    fn same_value(&self, other: &Self) -> bool;
}

macro_rules! impl_cell_value {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl CellValue for $ty {
                #[inline]
                fn type_name(&self) -> &'static str {
                    $name
                }

                #[inline]
                fn same_value(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_cell_value! {
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    String => "String",
    &'static str => "&str",
}

impl<T: ?Sized + fmt::Debug + 'static> CellValue for Rc<T> {
    #[inline]
    fn same_value(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

/// `Some(v)` has the runtime type of `v`; `None` is `"null"`, like
/// [`Value::Null`]. A cell holding `Some` therefore rejects `None` and vice
/// versa, and the inner type of `Some` is guarded like a bare value.
impl<T: CellValue> CellValue for Option<T> {
    fn type_name(&self) -> &'static str {
        self.as_ref().map_or("null", CellValue::type_name)
    }

    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_value(b),
            (None, None) => true,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Dynamic values
// ---------------------------------------------------------------------------

/// Kind of a dynamic [`Value`]; its name is the value's runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "json",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    List,
    Map,
}

impl ValueKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically typed value for cells fed from untyped boundaries.
///
/// Composite payloads are reference-counted, so cloning a `Value` is cheap
/// and keeps identity: a clone of a list is the *same* list as far as
/// [`CellValue::same_value`] is concerned. `PartialEq` is structural and is
/// not what cells use for change detection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Rc<Vec<Value>>),
    Map(Rc<BTreeMap<String, Value>>),
}

impl Value {
    /// Build a list from any iterator of values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Build a map from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Map(Rc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Boolean,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl CellValue for Value {
    #[inline]
    fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Map(a), Self::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(Rc::new(items))
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self::Map(Rc::new(entries))
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
