//! Script-facing `describe`, `test` and `expect`
//!
//! These wrap a [`TestHarness`] in native functions that validate their
//! arguments the way script callers expect.

use super::config::TestConfig;
use super::{TestHarness, USAGE_STACK_FRAMES};
use crate::error::{messages, Error, Result};
use crate::runtime::{Function, Realm, Value};
use std::rc::Rc;

fn usage_error(realm: &Realm, message: &str) -> Error {
    Error::usage_error(message, realm.capture_stack(USAGE_STACK_FRAMES))
}

/// Check the `(name: string, body: function)` call shape shared by
/// `describe` and `test`
fn name_and_body<'a>(realm: &Realm, args: &'a [Value]) -> Result<(&'a str, &'a Value)> {
    if args.len() != 2 {
        return Err(usage_error(realm, messages::EXPECTED_TWO_ARGUMENTS));
    }
    let Value::String(name) = &args[0] else {
        return Err(usage_error(realm, messages::FIRST_ARGUMENT_STRING));
    };
    if !args[1].is_function() {
        return Err(usage_error(realm, messages::SECOND_ARGUMENT_FUNCTION));
    }
    Ok((name.as_str(), &args[1]))
}

fn describe_function(harness: &Rc<TestHarness>) -> Value {
    let harness = Rc::clone(harness);
    Value::new_function(Function::native("describe", move |realm, args| {
        let (name, body) = name_and_body(realm, args)?;
        harness.describe(realm, name, body)?;
        Ok(Value::Undefined)
    }))
}

fn test_function(harness: &Rc<TestHarness>) -> Value {
    let harness = Rc::clone(harness);
    Value::new_function(Function::native("test", move |realm, args| {
        let (name, body) = name_and_body(realm, args)?;
        harness.test(realm, name, body).map(Value::Boolean)
    }))
}

fn expect_function(harness: &Rc<TestHarness>) -> Value {
    let harness = Rc::clone(harness);
    Value::new_function(Function::native("expect", move |realm, args| {
        if args.len() > 1 {
            return Err(usage_error(realm, messages::EXPECT_MAX_ONE_ARGUMENT));
        }
        let subject = args.first().cloned();
        Ok(harness.expect(realm, subject).into_handle())
    }))
}

/// The module exports object: `describe`, `test`, `expect`, and a
/// `default` export holding the same three
pub fn exports(harness: &Rc<TestHarness>) -> Value {
    let describe = describe_function(harness);
    let test = test_function(harness);
    let expect = expect_function(harness);
    let default = Value::new_object_from([
        ("describe", describe.clone()),
        ("test", test.clone()),
        ("expect", expect.clone()),
    ]);
    Value::new_object_from([
        ("describe", describe),
        ("test", test),
        ("expect", expect),
        ("default", default),
    ])
}

/// Create a harness for `realm` and register its functions as globals
pub fn install(realm: &mut Realm, config: TestConfig) -> Rc<TestHarness> {
    let harness = Rc::new(TestHarness::new(config));
    let exported = exports(&harness);
    for name in ["describe", "test", "expect"] {
        let func = exported.get_property(name).unwrap_or(Value::Undefined);
        realm.set_global(name, func);
    }
    tracing::debug!("test framework installed");
    harness
}
