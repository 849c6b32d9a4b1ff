//! Direct unit coverage for the quantified invariants `SPEC_FULL.md` §8
//! calls out that don't need a whole running script to exercise: value
//! equality relations, the property-descriptor round-trip, frozen-object
//! immutability, acyclic prototype chains, and the no-throw guarantees on
//! `typeof`/`toBoolean`.

use crate::ir::{validate_function, FunctionInfo, FunctionKind, Opcode};
use crate::object::JsObject;
use crate::property::{Attribute, PropertyDescriptor};
use crate::value::{JsValue, PropertyKey};

#[test]
fn same_value_distinguishes_signed_zero_but_same_value_zero_does_not() {
    let pos_zero = JsValue::Number(0.0);
    let neg_zero = JsValue::Number(-0.0);
    assert!(!JsValue::same_value(&pos_zero, &neg_zero));
    assert!(JsValue::same_value_zero(&pos_zero, &neg_zero));
    assert!(JsValue::strictly_equals(&pos_zero, &neg_zero));
}

#[test]
fn same_value_treats_nan_as_equal_to_itself() {
    let nan = JsValue::nan();
    assert!(JsValue::same_value(&nan, &nan));
    assert!(JsValue::same_value_zero(&nan, &nan));
    // `===` does not: NaN is never strictly equal to anything, including itself.
    assert!(!JsValue::strictly_equals(&nan, &nan));
}

#[test]
fn define_own_property_round_trips_through_get_own_property() {
    let object = JsObject::ordinary(None);
    let key = PropertyKey::from("answer");
    let descriptor = PropertyDescriptor::data(42.0, Attribute::WRITABLE | Attribute::ENUMERABLE);
    assert!(object.define_own_property(&key, descriptor));
    let read_back = object.get_own_property(&key).expect("property was just defined");
    assert!(JsValue::strictly_equals(read_back.value().unwrap(), &JsValue::Number(42.0)));
    assert_eq!(read_back.writable(), Some(true));
    assert_eq!(read_back.enumerable(), Some(true));
    assert_eq!(read_back.configurable(), Some(false));
}

#[test]
fn frozen_object_rejects_further_definition() {
    let object = JsObject::ordinary(None);
    let key = PropertyKey::from("x");
    object.define_own_property(&key, PropertyDescriptor::data(1.0, Attribute::DEFAULT));
    object.prevent_extensions();
    for own_key in [PropertyKey::from("x")] {
        let mut current = object.get_own_property(&own_key).unwrap();
        current.set_writable(false);
        current.set_configurable(false);
        object.define_own_property(&own_key, current);
    }
    assert!(!object.is_extensible());
    let rejected = object.define_own_property(&key, PropertyDescriptor::data(2.0, Attribute::DEFAULT));
    assert!(!rejected, "defining over a non-configurable, non-writable property must fail");
    let unchanged = object.get_own_property(&key).unwrap();
    assert!(JsValue::strictly_equals(unchanged.value().unwrap(), &JsValue::Number(1.0)));
}

#[test]
fn set_prototype_of_rejects_a_cycle() {
    let a = JsObject::ordinary(None);
    let b = JsObject::ordinary(Some(a.clone()));
    // a -> b would close a cycle (b's existing prototype is already a).
    assert!(!a.set_prototype_of(Some(b)));
    assert!(a.get_prototype_of().is_none());
}

#[test]
fn type_of_never_panics_across_every_value_shape() {
    let object = JsObject::ordinary(None);
    let values = [
        JsValue::undefined(),
        JsValue::null(),
        JsValue::Boolean(true),
        JsValue::Number(0.0),
        JsValue::nan(),
        JsValue::from("s"),
        JsValue::Object(object),
    ];
    for value in &values {
        let _ = value.type_of();
    }
}

#[test]
fn to_boolean_is_idempotent_under_the_boolean_round_trip() {
    for value in [
        JsValue::undefined(),
        JsValue::null(),
        JsValue::Boolean(true),
        JsValue::Boolean(false),
        JsValue::Number(0.0),
        JsValue::nan(),
        JsValue::from(""),
        JsValue::from("x"),
    ] {
        let once = value.to_boolean();
        let twice = JsValue::Boolean(once).to_boolean();
        assert_eq!(once, twice);
    }
}

#[test]
fn validator_rejects_a_function_with_unbalanced_stack_effect() {
    let info = FunctionInfo {
        name: None,
        expected_argument_count: 0,
        param_count: 0,
        has_rest: false,
        arguments_binding_index: None,
        is_strict: false,
        kind: FunctionKind::Normal,
        is_arrow: false,
        num_own_bindings: 0,
        has_lexical_arguments: false,
        code: vec![Opcode::PushUndefined, Opcode::PushUndefined, Opcode::Return],
        constants: Vec::new(),
        functions: Vec::new(),
        handlers: Vec::new(),
    };
    // Two pushes then a `Return` (which only consumes one) leaves the stack
    // one value too tall at the function's end — the validator must catch
    // this rather than let the VM under/overflow at run time.
    assert!(validate_function(&info).is_err());
}
