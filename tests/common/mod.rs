//! Shared test helpers for integration tests

use std::cell::RefCell;
use std::rc::Rc;
use verity::runtime::{Module, Output, Realm, Value};
use verity::test_runner::{install, TestConfig, TestHarness};

/// A realm with the test framework installed and output captured
pub struct Session {
    pub realm: Realm,
    pub output: Output,
    pub harness: Rc<TestHarness>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(TestConfig::plain())
    }

    pub fn with_config(config: TestConfig) -> Self {
        let output = Output::buffer();
        let mut realm = Realm::with_output(output.clone());
        let harness = install(&mut realm, config);
        Self {
            realm,
            output,
            harness,
        }
    }

    /// Everything printed so far
    pub fn printed(&self) -> String {
        self.output.contents().unwrap_or_default()
    }

    /// Compile and evaluate a module whose body can define functions in itself
    pub fn run<F>(&mut self, url: &str, body: F) -> verity::Result<Value>
    where
        F: Fn(&Module, &mut Realm) -> verity::Result<Value> + 'static,
    {
        let module = compile(&mut self.realm, url, body);
        self.realm.evaluate(&module)
    }
}

/// Compile a module; the body receives its own `Module` handle
pub fn compile<F>(realm: &mut Realm, url: &str, body: F) -> Module
where
    F: Fn(&Module, &mut Realm) -> verity::Result<Value> + 'static,
{
    let slot: Rc<RefCell<Option<Module>>> = Rc::default();
    let inner = Rc::clone(&slot);
    let module = realm
        .compile_module(url, move |realm| {
            let module = inner.borrow().clone().expect("module handle set after compile");
            body(&module, realm)
        })
        .expect("module compiles");
    *slot.borrow_mut() = Some(module.clone());
    module
}

/// `expect(subject)[matcher](...args)`
pub fn check(realm: &mut Realm, subject: Value, matcher: &str, args: &[Value]) -> verity::Result<Value> {
    let handle = realm.call_global("expect", &[subject])?;
    realm.call_method(&handle, matcher, args)
}

/// `test(name, body)` from script code
#[allow(dead_code)]
pub fn test(realm: &mut Realm, name: &str, body: Value) -> verity::Result<Value> {
    realm.call_global("test", &[Value::from(name), body])
}

/// `describe(name, body)` from script code
#[allow(dead_code)]
pub fn describe(realm: &mut Realm, name: &str, body: Value) -> verity::Result<Value> {
    realm.call_global("describe", &[Value::from(name), body])
}
