//! Matcher engine
//!
//! Each matcher checks its call shape, computes a raw predicate over the
//! expectation's subject, applies negation, and on failure writes a
//! diagnostic into the result channel.

use super::channel::ResultChannel;
use super::compare::compare;
use super::diagnostic::{format_failure, stringify_for_output, Palette, SourcePosition};
use super::expect::Expectation;
use crate::error::{messages, Error, Result};
use crate::runtime::{Realm, Value};
use std::fmt;

/// The closed set of matchers an expectation supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Matcher {
    ToEqual,
    ToBeBoolean,
    ToBeTrue,
    ToBeFalse,
    ToBeArray,
    ToBeArrayOfSize,
}

impl Matcher {
    pub const ALL: [Matcher; 6] = [
        Matcher::ToEqual,
        Matcher::ToBeBoolean,
        Matcher::ToBeTrue,
        Matcher::ToBeFalse,
        Matcher::ToBeArray,
        Matcher::ToBeArrayOfSize,
    ];

    /// Script-visible method name
    pub fn name(self) -> &'static str {
        match self {
            Matcher::ToEqual => "toEqual",
            Matcher::ToBeBoolean => "toBeBoolean",
            Matcher::ToBeTrue => "toBeTrue",
            Matcher::ToBeFalse => "toBeFalse",
            Matcher::ToBeArray => "toBeArray",
            Matcher::ToBeArrayOfSize => "toBeArrayOfSize",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Number of arguments the matcher takes
    pub fn arity(self) -> usize {
        match self {
            Matcher::ToEqual | Matcher::ToBeArrayOfSize => 1,
            _ => 0,
        }
    }

    fn check_args(self, realm: &Realm, args: &[Value]) -> Result<()> {
        let message = if args.len() != self.arity() {
            Some(if self.arity() == 0 {
                messages::requires_no_arguments(self.name())
            } else {
                messages::requires_one_argument(self.name())
            })
        } else if self == Matcher::ToBeArrayOfSize && !matches!(args[0], Value::Number(_)) {
            Some(messages::requires_number(self.name()))
        } else {
            None
        };
        match message {
            Some(message) => Err(Error::usage_error(message, realm.capture_stack(super::USAGE_STACK_FRAMES))),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one matcher call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Result after negation
    pub passed: bool,
    /// Rendered diagnostic, present when the assertion failed and was evaluated
    pub diagnostic: Option<String>,
}

impl MatchOutcome {
    fn pass() -> Self {
        Self {
            passed: true,
            diagnostic: None,
        }
    }
}

/// Truncate toward zero the way ToInteger does; NaN becomes 0
fn to_integer(n: f64) -> i64 {
    if n.is_nan() {
        0
    } else {
        n.trunc() as i64
    }
}

fn raw_predicate(expectation: &Expectation, matcher: Matcher, args: &[Value]) -> bool {
    let subject = expectation.subject();
    match matcher {
        Matcher::ToEqual => compare(&subject, &args[0], expectation.config().compare_policy),
        Matcher::ToBeBoolean => subject.is_boolean(),
        Matcher::ToBeTrue => matches!(subject, Value::Boolean(true)),
        Matcher::ToBeFalse => matches!(subject, Value::Boolean(false)),
        Matcher::ToBeArray => subject.is_array(),
        Matcher::ToBeArrayOfSize => match subject.array_len() {
            Some(len) => len as f64 == args[0].to_number(),
            None => false,
        },
    }
}

/// The (expected, received) texts for a failed matcher
fn failure_labels(expectation: &Expectation, matcher: Matcher, args: &[Value]) -> (String, String) {
    let subject = expectation.subject();
    let (expected, received) = match matcher {
        Matcher::ToEqual => (stringify_for_output(&subject), stringify_for_output(&args[0])),
        Matcher::ToBeBoolean => (
            "boolean".to_string(),
            stringify_for_output(&Value::from(subject.type_of())),
        ),
        Matcher::ToBeTrue => ("true".to_string(), stringify_for_output(&subject)),
        Matcher::ToBeFalse => ("false".to_string(), stringify_for_output(&subject)),
        Matcher::ToBeArray => ("Array".to_string(), stringify_for_output(&subject)),
        Matcher::ToBeArrayOfSize => (
            format!("Array of size {}", to_integer(args[0].to_number())),
            match subject.array_len() {
                Some(len) => format!("Array of size {}", len),
                None => stringify_for_output(&subject),
            },
        ),
    };
    let prefix = if expectation.is_negated() { "[Not] " } else { "" };
    (format!("{}{}", prefix, expected), received)
}

/// Run `matcher` against `expectation`
pub(crate) fn evaluate(
    realm: &mut Realm,
    expectation: &Expectation,
    matcher: Matcher,
    args: &[Value],
) -> Result<MatchOutcome> {
    matcher.check_args(realm, args)?;

    if expectation.is_short_circuited() {
        tracing::trace!(matcher = %matcher, "skipped: test already failing");
        return Ok(MatchOutcome {
            passed: false,
            diagnostic: None,
        });
    }

    let raw = raw_predicate(expectation, matcher, args);
    let passed = raw != expectation.is_negated();
    tracing::trace!(matcher = %matcher, negated = expectation.is_negated(), passed, "matcher evaluated");
    if passed {
        return Ok(MatchOutcome::pass());
    }

    let (expected, received) = failure_labels(expectation, matcher, args);
    let palette = Palette::new(expectation.config().color.enabled());
    let position = SourcePosition::current(realm);
    let diagnostic = format_failure(&palette, &expected, &received, &position);
    ResultChannel::new(realm).record_failure(diagnostic.clone());

    Ok(MatchOutcome {
        passed: false,
        diagnostic: Some(diagnostic),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_runner::TestConfig;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn expectation(subject: Value) -> Expectation {
        Expectation::new(Some(subject), Rc::new(TestConfig::plain()))
    }

    #[test]
    fn test_names_round_trip() {
        for matcher in Matcher::ALL {
            assert_eq!(Matcher::from_name(matcher.name()), Some(matcher));
        }
        assert_eq!(Matcher::from_name("toBe"), None);
    }

    #[test]
    fn test_arity_errors() {
        let mut realm = Realm::new();
        let e = expectation(Value::from(true));
        let err = evaluate(&mut realm, &e, Matcher::ToBeTrue, &[1.into()]).unwrap_err();
        assert_eq!(err.message(), Some("toBeTrue() requires no arguments"));
        let err = evaluate(&mut realm, &e, Matcher::ToEqual, &[]).unwrap_err();
        assert_eq!(err.message(), Some("toEqual() requires 1 argument"));
        let err = evaluate(&mut realm, &e, Matcher::ToBeArrayOfSize, &["3".into()]).unwrap_err();
        assert_eq!(err.message(), Some("toBeArrayOfSize() expects a number"));
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_array_of_size_labels() {
        let mut realm = Realm::new();
        let e = expectation(Value::new_array(vec![1.into(), 2.into(), 3.into()]));
        let ok = evaluate(&mut realm, &e, Matcher::ToBeArrayOfSize, &[3.into()]).unwrap();
        assert!(ok.passed);
        let bad = evaluate(&mut realm, &e, Matcher::ToBeArrayOfSize, &[2.into()]).unwrap();
        assert!(!bad.passed);
        let text = bad.diagnostic.unwrap();
        assert!(text.contains("Expected: Array of size 2\n"));
        assert!(text.contains("Received: Array of size 3\n"));
    }

    #[test]
    fn test_to_be_boolean_reports_type() {
        let mut realm = Realm::new();
        let e = expectation(Value::from(4));
        let outcome = evaluate(&mut realm, &e, Matcher::ToBeBoolean, &[]).unwrap();
        assert!(outcome.diagnostic.unwrap().starts_with("Expected: boolean\nReceived: number\n"));
    }

    #[test]
    fn test_negated_label() {
        let mut realm = Realm::new();
        let e = expectation(Value::from(true)).not();
        let outcome = evaluate(&mut realm, &e, Matcher::ToBeTrue, &[]).unwrap();
        assert!(!outcome.passed);
        assert!(outcome.diagnostic.unwrap().starts_with("Expected: [Not] true\nReceived: true\n"));
    }

    #[test]
    fn test_failure_written_to_channel() {
        let mut realm = Realm::new();
        ResultChannel::new(&mut realm).reset_assertion();
        let e = expectation(Value::from("a"));
        let outcome = evaluate(&mut realm, &e, Matcher::ToEqual, &["b".into()]).unwrap();
        let (passed, message) = ResultChannel::new(&mut realm).read_assertion();
        assert!(!passed);
        assert_eq!(Some(message), outcome.diagnostic);
    }

    #[test]
    fn test_success_leaves_channel_alone() {
        let mut realm = Realm::new();
        ResultChannel::new(&mut realm).record_failure("earlier".to_string());
        let e = expectation(Value::from(5));
        assert!(evaluate(&mut realm, &e, Matcher::ToEqual, &[5.into()]).unwrap().passed);
        assert_eq!(
            ResultChannel::new(&mut realm).read_assertion(),
            (false, "earlier".to_string())
        );
    }

    #[test]
    fn test_array_of_size_on_non_array() {
        let mut realm = Realm::new();
        let e = expectation(Value::from("abc"));
        let outcome = evaluate(&mut realm, &e, Matcher::ToBeArrayOfSize, &[3.into()]).unwrap();
        assert!(outcome.diagnostic.unwrap().contains("Received: abc\n"));
    }
}
