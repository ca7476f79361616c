//! Structural equality for `toEqual`
//!
//! Primitives compare with strict equality. Arrays compare length first and
//! then element by element. Ordinary objects compare their own-key lists
//! positionally (same keys in the same order) and then each value.
//! Functions only ever equal themselves.

use crate::runtime::{ObjectKind, Value};
use rustc_hash::FxHashSet as HashSet;
use serde::{Deserialize, Serialize};

/// How far the comparator walks into arrays and objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparePolicy {
    /// Every element and every key, stopping at the first mismatch
    #[default]
    Full,
    /// Only the first element of each array and the first key of each
    /// object decide the result (legacy behavior)
    FirstEntry,
}

/// Compare two values for deep equality
pub fn compare(expected: &Value, actual: &Value, policy: ComparePolicy) -> bool {
    Comparator::new(policy).values(expected, actual)
}

/// Recursive comparator with cycle tracking
#[derive(Debug)]
pub struct Comparator {
    policy: ComparePolicy,
    in_progress: HashSet<(usize, usize)>,
}

#[derive(PartialEq)]
enum Shape {
    Primitive,
    Array,
    Ordinary,
    Function,
}

fn shape(value: &Value) -> Shape {
    match value {
        Value::Object(obj) => match obj.borrow().kind {
            ObjectKind::Array(_) => Shape::Array,
            ObjectKind::Ordinary => Shape::Ordinary,
            ObjectKind::Function(_) => Shape::Function,
        },
        _ => Shape::Primitive,
    }
}

impl Comparator {
    pub fn new(policy: ComparePolicy) -> Self {
        Self {
            policy,
            in_progress: HashSet::default(),
        }
    }

    /// Compare any two values
    pub fn values(&mut self, expected: &Value, actual: &Value) -> bool {
        match (shape(expected), shape(actual)) {
            (Shape::Array, Shape::Array) => self.guarded(expected, actual, Self::arrays),
            (Shape::Ordinary, Shape::Ordinary) => self.guarded(expected, actual, Self::objects),
            _ => expected.strict_equals(actual),
        }
    }

    /// Pairs already being compared further up count as equal; the
    /// comparison in progress decides them.
    fn guarded(
        &mut self,
        expected: &Value,
        actual: &Value,
        walk: fn(&mut Self, &Value, &Value) -> bool,
    ) -> bool {
        let (Some(e), Some(a)) = (expected.object_ptr(), actual.object_ptr()) else {
            return expected.strict_equals(actual);
        };
        if e == a {
            return true;
        }
        if !self.in_progress.insert((e, a)) {
            tracing::debug!("comparator revisited an object pair; treating the cycle as equal");
            return true;
        }
        let equal = walk(self, expected, actual);
        self.in_progress.remove(&(e, a));
        equal
    }

    fn arrays(&mut self, expected: &Value, actual: &Value) -> bool {
        let (Some(len), Some(actual_len)) = (expected.array_len(), actual.array_len()) else {
            return false;
        };
        if len != actual_len {
            return false;
        }
        for i in 0..len {
            let equal = self.values(&expected.get_index(i), &actual.get_index(i));
            if !equal || self.policy == ComparePolicy::FirstEntry {
                return equal;
            }
        }
        true
    }

    fn objects(&mut self, expected: &Value, actual: &Value) -> bool {
        let expected_keys = expected.own_keys();
        let actual_keys = actual.own_keys();
        if expected_keys.len() != actual_keys.len() {
            return false;
        }
        for (expected_key, actual_key) in expected_keys.iter().zip(&actual_keys) {
            if expected_key != actual_key {
                return false;
            }
            let expected_value = expected.get_property(expected_key).unwrap_or(Value::Undefined);
            let actual_value = actual.get_property(actual_key).unwrap_or(Value::Undefined);
            let equal = self.values(&expected_value, &actual_value);
            if !equal || self.policy == ComparePolicy::FirstEntry {
                return equal;
            }
        }
        true
    }
}
