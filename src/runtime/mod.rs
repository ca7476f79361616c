//! Host runtime adapter
//!
//! This module provides the execution environment the test framework runs
//! against: script values, callable functions, module compilation with
//! script ids, call-stack capture, and per-context data slots.

mod realm;
mod value;

pub use realm::{Module, Output, Realm, DEFAULT_MAX_STACK_DEPTH};
pub use value::{Function, NativeFn, Object, ObjectKind, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_function_call() {
        let mut realm = Realm::new();
        let module = realm.compile_module("/add.js", |_| Ok(Value::Undefined)).unwrap();
        let add = module.function(Some("add"), 1, |_, args| {
            let a = args.first().map(Value::to_number).unwrap_or(f64::NAN);
            let b = args.get(1).map(Value::to_number).unwrap_or(f64::NAN);
            Ok(Value::Number(a + b))
        });
        let result = realm.call(&add, &[3.into(), 4.into()]).unwrap();
        assert_eq!(result, Value::Number(7.0));
    }

    #[test]
    fn test_globals() {
        let mut realm = Realm::new();
        realm.set_global("answer", Value::from(42));
        assert_eq!(realm.get_global("answer"), Some(Value::from(42)));
        assert!(realm.get_global("question").is_none());
    }
}
