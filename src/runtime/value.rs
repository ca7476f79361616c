//! Script value types
//!
//! This module defines the host's runtime representation of script values:
//! primitives, ordinary objects, arrays, and functions.

use super::Realm;
use crate::error::{Error, Result};
use crate::modules::ScriptId;
use rustc_hash::FxHashSet as HashSet;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Type alias for function implementations (script bodies and natives alike)
pub type NativeFn = Rc<dyn Fn(&mut Realm, &[Value]) -> Result<Value>>;

/// A script value
#[derive(Clone)]
pub enum Value {
    /// undefined
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Object (includes arrays and functions)
    Object(Rc<RefCell<Object>>),
}

impl Value {
    /// Check if value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if value is a boolean
    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    /// Check if value is an object of any kind (arrays and functions included)
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Check if value is an array
    pub fn is_array(&self) -> bool {
        match self {
            Value::Object(obj) => matches!(obj.borrow().kind, ObjectKind::Array(_)),
            _ => false,
        }
    }

    /// Check if value can be called
    pub fn is_function(&self) -> bool {
        self.as_function().is_some()
    }

    /// The callable behind this value, if it is a function
    pub fn as_function(&self) -> Option<Function> {
        match self {
            Value::Object(obj) => match &obj.borrow().kind {
                ObjectKind::Function(func) => Some(func.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Array length, if this is an array
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::Object(obj) => match &obj.borrow().kind {
                ObjectKind::Array(items) => Some(items.len()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Indexed element access (`undefined` past the end or on non-arrays)
    pub fn get_index(&self, index: usize) -> Value {
        match self {
            Value::Object(obj) => match &obj.borrow().kind {
                ObjectKind::Array(items) => items.get(index).cloned().unwrap_or(Value::Undefined),
                _ => Value::Undefined,
            },
            _ => Value::Undefined,
        }
    }

    /// Convert to number
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
            Value::Number(n) => *n,
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Object(_) => f64::NAN,
        }
    }

    /// Convert to the default string form
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(true) => "true".to_string(),
            Value::Boolean(false) => "false".to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.clone(),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match &obj.kind {
                    ObjectKind::Array(items) => items
                        .iter()
                        .map(|v| match v {
                            Value::Undefined | Value::Null => String::new(),
                            other => other.to_js_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(","),
                    ObjectKind::Function(func) => {
                        format!("[Function: {}]", func.name.as_deref().unwrap_or("anonymous"))
                    }
                    ObjectKind::Ordinary => "[object Object]".to_string(),
                }
            }
        }
    }

    /// Get the typeof string
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(obj) => match obj.borrow().kind {
                ObjectKind::Function(_) => "function",
                _ => "object",
            },
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() || b.is_nan() {
                    false
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Same object identity (pointer), used for cycle tracking
    pub(crate) fn object_ptr(&self) -> Option<usize> {
        match self {
            Value::Object(obj) => Some(Rc::as_ptr(obj) as *const () as usize),
            _ => None,
        }
    }

    /// Own enumerable property keys, in host order
    ///
    /// Integer-like keys come first in ascending order, followed by the
    /// remaining keys in insertion order. Array indices count as own keys.
    pub fn own_keys(&self) -> Vec<String> {
        let Value::Object(obj) = self else {
            return Vec::new();
        };
        let obj = obj.borrow();
        let mut indexed: Vec<(u32, String)> = Vec::new();
        let mut named: Vec<String> = Vec::new();

        if let ObjectKind::Array(items) = &obj.kind {
            indexed.extend((0..items.len() as u32).map(|i| (i, i.to_string())));
        }
        for (key, _) in &obj.properties {
            match array_index(key) {
                Some(i) => indexed.push((i, key.clone())),
                None => named.push(key.clone()),
            }
        }
        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, k)| k).chain(named).collect()
    }

    /// Get an own data property (array indices and `length` included)
    pub fn get_property(&self, key: &str) -> Option<Value> {
        let Value::Object(obj) = self else {
            return match (self, key) {
                (Value::String(s), "length") => Some(Value::Number(s.chars().count() as f64)),
                _ => None,
            };
        };
        let obj = obj.borrow();
        if let ObjectKind::Array(items) = &obj.kind {
            if key == "length" {
                return Some(Value::Number(items.len() as f64));
            }
            if let Some(i) = array_index(key) {
                return items.get(i as usize).cloned();
            }
        }
        obj.get_property(key)
    }

    /// Set an own data property. Returns false for non-objects and for
    /// accessor-backed (read-only) keys.
    pub fn set_property(&self, key: &str, value: Value) -> bool {
        match self {
            Value::Object(obj) => obj.borrow_mut().set_property(key, value),
            _ => false,
        }
    }

    /// Serialize the way `JSON.stringify` does
    ///
    /// Returns `Ok(None)` when the value has no JSON form (`undefined`,
    /// functions) and a TypeError for circular structures.
    pub fn json_stringify(&self) -> Result<Option<String>> {
        let mut seen = HashSet::default();
        match self.to_json(&mut seen)? {
            Some(json) => serde_json::to_string(&json)
                .map(Some)
                .map_err(|e| Error::InternalError(format!("JSON serialization failed: {}", e))),
            None => Ok(None),
        }
    }

    fn to_json(&self, seen: &mut HashSet<usize>) -> Result<Option<serde_json::Value>> {
        let json = match self {
            Value::Undefined => return Ok(None),
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Object(obj) => {
                let ptr = Rc::as_ptr(obj) as *const () as usize;
                if !seen.insert(ptr) {
                    return Err(Error::type_error("Converting circular structure to JSON"));
                }
                let json = self.object_to_json(obj, seen)?;
                seen.remove(&ptr);
                return Ok(json);
            }
        };
        Ok(Some(json))
    }

    fn object_to_json(
        &self,
        obj: &Rc<RefCell<Object>>,
        seen: &mut HashSet<usize>,
    ) -> Result<Option<serde_json::Value>> {
        let elements = match &obj.borrow().kind {
            ObjectKind::Function(_) => return Ok(None),
            ObjectKind::Array(items) => Some(items.clone()),
            ObjectKind::Ordinary => None,
        };

        if let Some(items) = elements {
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                out.push(item.to_json(seen)?.unwrap_or(serde_json::Value::Null));
            }
            return Ok(Some(serde_json::Value::Array(out)));
        }

        let mut map = serde_json::Map::new();
        for key in self.own_keys() {
            let value = self.get_property(&key).unwrap_or(Value::Undefined);
            if let Some(json) = value.to_json(seen)? {
                map.insert(key, json);
            }
        }
        Ok(Some(serde_json::Value::Object(map)))
    }

    /// Create a new empty ordinary object
    pub fn new_object() -> Value {
        Value::Object(Rc::new(RefCell::new(Object::new())))
    }

    /// Create an ordinary object from key/value pairs, keeping their order
    pub fn new_object_from<K, I>(entries: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut object = Object::new();
        for (key, value) in entries {
            object.set_property(&key.into(), value);
        }
        Value::Object(Rc::new(RefCell::new(object)))
    }

    /// Create a new array
    pub fn new_array(elements: Vec<Value>) -> Value {
        let mut object = Object::new();
        object.kind = ObjectKind::Array(elements);
        Value::Object(Rc::new(RefCell::new(object)))
    }

    /// Wrap a function in an object value
    pub fn new_function(func: Function) -> Value {
        let mut object = Object::new();
        object.kind = ObjectKind::Function(func);
        Value::Object(Rc::new(RefCell::new(object)))
    }
}

fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    key.parse::<u32>().ok().filter(|i| *i != u32::MAX)
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // shortest round-trip digits, with an explicit exponent sign
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text.clone(),
        }
    } else {
        format!("{}", n)
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        serde_json::Value::Null
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", number_to_string(*n)),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Object(obj) => match obj.try_borrow() {
                Ok(obj) => match &obj.kind {
                    ObjectKind::Ordinary => write!(f, "{{...}}"),
                    ObjectKind::Array(items) => write!(f, "{:?}", items),
                    ObjectKind::Function(func) => write!(f, "{:?}", func),
                },
                Err(_) => write!(f, "[Object (borrowed)]"),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// A script object
#[derive(Clone)]
pub struct Object {
    /// Object kind
    pub kind: ObjectKind,
    /// Own data properties in insertion order
    pub properties: Vec<(String, Value)>,
    /// Read-only accessor properties; not enumerable
    pub accessors: Vec<(String, Function)>,
}

impl Object {
    /// Create a new ordinary object
    pub fn new() -> Self {
        Self {
            kind: ObjectKind::Ordinary,
            properties: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Get an own data property
    pub fn get_property(&self, key: &str) -> Option<Value> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Set an own data property, keeping the original insertion slot
    pub fn set_property(&mut self, key: &str, value: Value) -> bool {
        if self.accessor(key).is_some() {
            return false;
        }
        match self.properties.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((key.to_string(), value)),
        }
        true
    }

    /// Define a read-only accessor property
    pub fn define_accessor(&mut self, key: &str, getter: Function) {
        self.properties.retain(|(k, _)| k != key);
        self.accessors.retain(|(k, _)| k != key);
        self.accessors.push((key.to_string(), getter));
    }

    /// The getter behind an accessor property
    pub fn accessor(&self, key: &str) -> Option<&Function> {
        self.accessors.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

/// Object kinds
#[derive(Clone)]
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Array with dense elements
    Array(Vec<Value>),
    /// Callable
    Function(Function),
}

/// A callable: either script code compiled from a module, or native code
#[derive(Clone)]
pub struct Function {
    /// Function name
    pub name: Option<String>,
    /// Script the function was compiled from (`None` for natives)
    pub script_id: Option<ScriptId>,
    /// Line of the function's definition
    pub line: u32,
    /// Implementation
    pub call: NativeFn,
}

impl Function {
    /// Create a native function
    pub fn native<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Realm, &[Value]) -> Result<Value> + 'static,
    {
        Self {
            name: Some(name.into()),
            script_id: None,
            line: 0,
            call: Rc::new(func),
        }
    }

    /// Create a script function defined at `line` of the given script
    pub fn script<F>(script_id: ScriptId, name: Option<String>, line: u32, func: F) -> Self
    where
        F: Fn(&mut Realm, &[Value]) -> Result<Value> + 'static,
    {
        Self {
            name,
            script_id: Some(script_id),
            line,
            call: Rc::new(func),
        }
    }

    /// Display name for stack frames and messages
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.script_id {
            Some(id) => write!(f, "[Function: {} ({}:{})]", self.display_name(), id, self.line),
            None => write!(f, "[Native: {}]", self.display_name()),
        }
    }
}
