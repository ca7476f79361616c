//! Expectation handles
//!
//! An [`Expectation`] is created by every `expect(value)` call. It carries
//! the value under test and the negation flag; [`Expectation::not`] returns
//! a negated copy and leaves the original untouched.

use super::config::TestConfig;
use super::matchers::{evaluate, MatchOutcome, Matcher};
use crate::error::Result;
use crate::runtime::{Function, Realm, Value};
use std::rc::Rc;

/// The value-like handle returned by `expect`
#[derive(Debug, Clone)]
pub struct Expectation {
    subject: Option<Value>,
    negate: bool,
    short_circuit: bool,
    config: Rc<TestConfig>,
}

impl Expectation {
    /// Build an expectation for `subject` (`None` when `expect()` got no argument)
    pub fn new(subject: Option<Value>, config: Rc<TestConfig>) -> Self {
        Self {
            subject,
            negate: false,
            short_circuit: false,
            config,
        }
    }

    /// Mark the handle as created after its test already failed: its
    /// matchers report `false` without evaluating or touching the channel.
    pub(crate) fn short_circuited(mut self) -> Self {
        self.short_circuit = true;
        self
    }

    /// A copy with negation flipped
    pub fn not(&self) -> Self {
        Self {
            negate: !self.negate,
            ..self.clone()
        }
    }

    /// The value under test (`undefined` when absent)
    pub fn subject(&self) -> Value {
        self.subject.clone().unwrap_or(Value::Undefined)
    }

    pub fn has_subject(&self) -> bool {
        self.subject.is_some()
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    pub fn is_short_circuited(&self) -> bool {
        self.short_circuit
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Run a matcher with script-style arguments
    pub fn evaluate(&self, realm: &mut Realm, matcher: Matcher, args: &[Value]) -> Result<MatchOutcome> {
        evaluate(realm, self, matcher, args)
    }

    fn check(&self, realm: &mut Realm, matcher: Matcher, args: &[Value]) -> Result<bool> {
        self.evaluate(realm, matcher, args).map(|outcome| outcome.passed)
    }

    pub fn to_equal(&self, realm: &mut Realm, value: &Value) -> Result<bool> {
        self.check(realm, Matcher::ToEqual, std::slice::from_ref(value))
    }

    pub fn to_be_boolean(&self, realm: &mut Realm) -> Result<bool> {
        self.check(realm, Matcher::ToBeBoolean, &[])
    }

    pub fn to_be_true(&self, realm: &mut Realm) -> Result<bool> {
        self.check(realm, Matcher::ToBeTrue, &[])
    }

    pub fn to_be_false(&self, realm: &mut Realm) -> Result<bool> {
        self.check(realm, Matcher::ToBeFalse, &[])
    }

    pub fn to_be_array(&self, realm: &mut Realm) -> Result<bool> {
        self.check(realm, Matcher::ToBeArray, &[])
    }

    pub fn to_be_array_of_size(&self, realm: &mut Realm, size: usize) -> Result<bool> {
        self.check(realm, Matcher::ToBeArrayOfSize, &[Value::Number(size as f64)])
    }

    /// Expose the handle to script code
    ///
    /// The object carries one method per matcher, `negate` and `expected`
    /// data properties, and a read-only `not` accessor that builds a fresh
    /// negated handle on every read.
    pub fn into_handle(self) -> Value {
        let handle = Value::new_object();
        for matcher in Matcher::ALL {
            let expectation = self.clone();
            let method = Function::native(matcher.name(), move |realm, args| {
                expectation
                    .evaluate(realm, matcher, args)
                    .map(|outcome| Value::Boolean(outcome.passed))
            });
            handle.set_property(matcher.name(), Value::new_function(method));
        }
        handle.set_property("negate", Value::Boolean(self.negate));
        handle.set_property("expected", self.subject());

        if let Value::Object(obj) = &handle {
            let base = self;
            let not = Function::native("not", move |_, _| Ok(base.not().into_handle()));
            obj.borrow_mut().define_accessor("not", not);
        }
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Rc<TestConfig> {
        Rc::new(TestConfig::plain())
    }

    #[test]
    fn test_not_is_a_copy() {
        let base = Expectation::new(Some(Value::from(true)), config());
        let negated = base.not();
        assert!(!base.is_negated());
        assert!(negated.is_negated());
        assert!(!negated.not().is_negated());
    }

    #[test]
    fn test_double_negation_restores_result() {
        let mut realm = Realm::new();
        let samples = [Value::from(true), Value::from(false), Value::from(0), Value::new_array(vec![])];
        for subject in samples {
            let base = Expectation::new(Some(subject), config());
            for (matcher, args) in [
                (Matcher::ToBeTrue, vec![]),
                (Matcher::ToBeFalse, vec![]),
                (Matcher::ToBeBoolean, vec![]),
                (Matcher::ToBeArray, vec![]),
                (Matcher::ToBeArrayOfSize, vec![Value::from(0)]),
                (Matcher::ToEqual, vec![Value::from(0)]),
            ] {
                let plain = base.evaluate(&mut realm, matcher, &args).unwrap().passed;
                let once = base.not().evaluate(&mut realm, matcher, &args).unwrap().passed;
                let twice = base.not().not().evaluate(&mut realm, matcher, &args).unwrap().passed;
                assert_eq!(once, !plain, "{} negation", matcher);
                assert_eq!(twice, plain, "{} double negation", matcher);
            }
        }
    }

    #[test]
    fn test_absent_subject_is_undefined() {
        let mut realm = Realm::new();
        let e = Expectation::new(None, config());
        assert!(!e.has_subject());
        assert!(e.to_equal(&mut realm, &Value::Undefined).unwrap());
        assert!(!e.to_be_boolean(&mut realm).unwrap());
    }

    #[test]
    fn test_short_circuit_skips_work() {
        let mut realm = Realm::new();
        let e = Expectation::new(Some(Value::from(1)), config()).short_circuited();
        assert!(!e.to_equal(&mut realm, &Value::from(1)).unwrap());
        assert!(realm.context_data(super::super::channel::ChannelSlot::Error.slot()).is_none());
    }

    #[test]
    fn test_handle_object() {
        let mut realm = Realm::new();
        let handle = Expectation::new(Some(Value::from(true)), config()).into_handle();
        assert_eq!(realm.get(&handle, "negate").unwrap(), Value::Boolean(false));
        assert_eq!(realm.get(&handle, "expected").unwrap(), Value::Boolean(true));
        assert_eq!(
            realm.call_method(&handle, "toBeTrue", &[]).unwrap(),
            Value::Boolean(true)
        );

        let negated = realm.get(&handle, "not").unwrap();
        assert_eq!(realm.get(&negated, "negate").unwrap(), Value::Boolean(true));
        assert_eq!(
            realm.call_method(&negated, "toBeTrue", &[]).unwrap(),
            Value::Boolean(false)
        );
        // reading `not` never mutates the base handle
        assert_eq!(realm.get(&handle, "negate").unwrap(), Value::Boolean(false));
        assert!(!handle.set_property("not", Value::Null));
    }

    #[test]
    fn test_typed_matchers() {
        let mut realm = Realm::new();
        let arr = Expectation::new(Some(Value::new_array(vec![1.into(), 2.into()])), config());
        assert!(arr.to_be_array(&mut realm).unwrap());
        assert!(arr.to_be_array_of_size(&mut realm, 2).unwrap());
        assert!(!arr.to_be_array_of_size(&mut realm, 3).unwrap());
        let f = Expectation::new(Some(Value::from(false)), config());
        assert!(f.to_be_false(&mut realm).unwrap());
        assert!(f.not().to_be_true(&mut realm).unwrap());
    }
}
