//! Comparison dispatch: same-kind primitives compare directly, a left-hand
//! class instance falls through to its `__eq__`/`__lt__` method, anything
//! else is a fatal type error. The four remaining comparators derive from
//! `equal` and `less`.

use std::cmp::Ordering;

use crate::runtime::class::{EQUAL_METHOD, LESS_METHOD};
use crate::runtime::context::Context;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::object::ObjectHolder;

fn compare(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
    method: &'static str,
    accept: fn(Ordering) -> bool,
) -> RuntimeResult<bool> {
    if let (Some(left), Some(right)) = (lhs.try_as_number(), rhs.try_as_number()) {
        return Ok(accept(left.cmp(&right)));
    }
    if let (Some(left), Some(right)) = (lhs.try_as_bool(), rhs.try_as_bool()) {
        return Ok(accept(left.cmp(&right)));
    }
    if let (Some(left), Some(right)) = (lhs.try_as_string(), rhs.try_as_string()) {
        return Ok(accept(left.cmp(&right)));
    }
    if lhs.has_method(method, 1) {
        let verdict = lhs.call_method(method, vec![rhs.share()], context)?;
        if let Some(value) = verdict.try_as_bool() {
            return Ok(value);
        }
    }
    Err(RuntimeError::UnsupportedOperation {
        operation: method,
        type_name: lhs.type_name(),
    })
}

pub fn equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> RuntimeResult<bool> {
    if lhs.is_empty() && rhs.is_empty() {
        return Ok(true);
    }
    if lhs.is_empty() || rhs.is_empty() {
        return Ok(false);
    }
    compare(lhs, rhs, context, EQUAL_METHOD, Ordering::is_eq)
}

pub fn less(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> RuntimeResult<bool> {
    compare(lhs, rhs, context, LESS_METHOD, Ordering::is_lt)
}

pub fn not_equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> RuntimeResult<bool> {
    Ok(!equal(lhs, rhs, context)?)
}

pub fn greater(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> RuntimeResult<bool> {
    if less(lhs, rhs, context)? {
        return Ok(false);
    }
    Ok(!equal(lhs, rhs, context)?)
}

pub fn less_or_equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> RuntimeResult<bool> {
    if less(lhs, rhs, context)? {
        return Ok(true);
    }
    equal(lhs, rhs, context)
}

pub fn greater_or_equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> RuntimeResult<bool> {
    Ok(!less(lhs, rhs, context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::SimpleContext;
    use crate::runtime::object::Object;

    fn number(value: i32) -> ObjectHolder {
        ObjectHolder::own(Object::Number(value))
    }

    fn string(value: &str) -> ObjectHolder {
        ObjectHolder::own(Object::String(value.to_string()))
    }

    fn boolean(value: bool) -> ObjectHolder {
        ObjectHolder::own(Object::Bool(value))
    }

    #[test]
    fn compares_numbers() {
        let mut output = String::new();
        let mut context = SimpleContext::new(&mut output);

        assert!(equal(&number(3), &number(3), &mut context).expect("equal"));
        assert!(less(&number(2), &number(3), &mut context).expect("less"));
        assert!(greater(&number(4), &number(3), &mut context).expect("greater"));
        assert!(less_or_equal(&number(3), &number(3), &mut context).expect("le"));
        assert!(greater_or_equal(&number(3), &number(3), &mut context).expect("ge"));
        assert!(not_equal(&number(1), &number(2), &mut context).expect("ne"));
    }

    #[test]
    fn compares_strings_and_bools() {
        let mut output = String::new();
        let mut context = SimpleContext::new(&mut output);

        assert!(less(&string("abc"), &string("abd"), &mut context).expect("less"));
        assert!(equal(&string("x"), &string("x"), &mut context).expect("equal"));
        assert!(less(&boolean(false), &boolean(true), &mut context).expect("less"));
        assert!(!equal(&boolean(false), &boolean(true), &mut context).expect("equal"));
    }

    #[test]
    fn exactly_one_of_less_equal_greater_holds_for_primitives() {
        let mut output = String::new();
        let mut context = SimpleContext::new(&mut output);

        for (left, right) in [(1, 2), (2, 2), (3, 2)] {
            let l = number(left);
            let r = number(right);
            let verdicts = [
                less(&l, &r, &mut context).expect("less"),
                equal(&l, &r, &mut context).expect("equal"),
                greater(&l, &r, &mut context).expect("greater"),
            ];
            assert_eq!(verdicts.iter().filter(|held| **held).count(), 1);
        }
    }

    #[test]
    fn empty_holders_are_equal_only_to_each_other() {
        let mut output = String::new();
        let mut context = SimpleContext::new(&mut output);

        assert!(equal(&ObjectHolder::none(), &ObjectHolder::none(), &mut context).expect("equal"));
        assert!(!equal(&ObjectHolder::none(), &number(0), &mut context).expect("equal"));
        assert!(!equal(&string(""), &ObjectHolder::none(), &mut context).expect("equal"));
        assert!(not_equal(&ObjectHolder::none(), &number(1), &mut context).expect("ne"));
    }

    #[test]
    fn mixed_primitive_kinds_are_a_type_error() {
        let mut output = String::new();
        let mut context = SimpleContext::new(&mut output);

        let err = equal(&number(1), &string("1"), &mut context).expect_err("expected type error");
        assert_eq!(
            err,
            RuntimeError::UnsupportedOperation {
                operation: "__eq__",
                type_name: "Number",
            }
        );

        let err =
            less(&ObjectHolder::none(), &number(1), &mut context).expect_err("expected type error");
        assert!(matches!(err, RuntimeError::UnsupportedOperation { .. }));
    }
}
