//! End-to-end scenarios for cells and binding through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ftui_state::{
    CellConfig, State, StateError, ValidationError, Value, ValueCell, bind, bind_with,
};

fn counter() -> (Rc<Cell<u32>>, impl Fn(&Value) + 'static) {
    let calls = Rc::new(Cell::new(0u32));
    let calls_clone = Rc::clone(&calls);
    (calls, move |_: &Value| calls_clone.set(calls_clone.get() + 1))
}

#[test]
fn equal_write_fires_nothing() {
    let (calls, on_change) = counter();
    let cell = ValueCell::with_on_change(Value::from(5), on_change);

    cell.set(Value::from(5)).unwrap();

    assert_eq!(calls.get(), 0);
    assert_eq!(cell.get().as_f64(), Some(5.0));
}

#[test]
fn changed_write_fires_once() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    let cell = ValueCell::with_on_change(Value::from(5), move |v: &Value| {
        seen_clone.borrow_mut().push(v.as_f64());
    });

    cell.set(Value::from(6)).unwrap();

    assert_eq!(*seen.borrow(), vec![Some(6.0)]);
    assert_eq!(cell.get().as_f64(), Some(6.0));
}

#[test]
fn mismatched_write_is_rejected() {
    let (calls, on_change) = counter();
    let cell = ValueCell::with_on_change(Value::from(5), on_change);

    let err = cell.set(Value::from("x")).unwrap_err();

    assert_eq!(err, ValidationError::new("number", "string"));
    assert_eq!(calls.get(), 0);
    assert_eq!(cell.get().as_f64(), Some(5.0));
}

#[test]
fn bind_records_initial_value_and_returns_same_cell() {
    let cell = ValueCell::new(Value::from("a"));
    let recorded = Rc::new(RefCell::new(Value::Null));
    let recorded_clone = Rc::clone(&recorded);

    let bound = bind_with(cell.clone(), move |v: &Value| {
        *recorded_clone.borrow_mut() = v.clone();
    })
    .unwrap();

    assert_eq!(recorded.borrow().as_str(), Some("a"));
    assert!(ValueCell::ptr_eq(&bound, &cell));
}

#[test]
fn bare_get_set_object_is_rejected() {
    #[derive(Debug)]
    struct Plain;

    impl State for Plain {
        type Value = Value;

        fn get(&self) -> Value {
            Value::Null
        }

        fn set(&self, _value: Value) -> Result<(), ValidationError> {
            Ok(())
        }
    }

    let err = bind(Plain).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Plain is not an instance of the State class."
    );
}

#[test]
fn errors_compose_with_question_mark() {
    fn configure(cell: ValueCell<Value>) -> Result<ValueCell<Value>, StateError> {
        let cell = bind(cell)?;
        cell.set(Value::from(true))?;
        Ok(cell)
    }

    let ok = configure(ValueCell::new(Value::from(false))).unwrap();
    assert_eq!(ok.get().as_bool(), Some(true));

    let err = configure(ValueCell::new(Value::from(0))).unwrap_err();
    assert!(matches!(err, StateError::Validation(_)));
}

#[test]
fn shared_list_is_not_a_change_but_rebuilt_list_is() {
    let (calls, on_change) = counter();
    let list = Value::list(["a", "b"]);
    let cell = ValueCell::with_on_change(list.clone(), on_change);

    cell.set(list).unwrap();
    assert_eq!(calls.get(), 0);

    cell.set(Value::list(["a", "b"])).unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn self_correcting_callback() {
    let config = CellConfig::new().with_label("temperature");
    let cell = ValueCell::with_config(Value::from(20), config);
    let weak = cell.downgrade();
    cell.set_on_change(move |v: &Value| {
        if v.as_f64().is_some_and(|t| t > 100.0) {
            if let Some(cell) = weak.upgrade() {
                cell.set(Value::from(100)).unwrap();
            }
        }
    });

    cell.set(Value::from(250)).unwrap();

    assert_eq!(cell.get().as_f64(), Some(100.0));
    assert_eq!(cell.version(), 2);
    assert_eq!(cell.label().as_deref(), Some("temperature"));
}
