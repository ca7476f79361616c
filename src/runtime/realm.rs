//! The execution context that script code and native functions run in
//!
//! A [`Realm`] owns the module registry, the call stack, per-context data
//! slots, the global bindings, and the output sink. Everything the test
//! framework needs from its host goes through here.

use super::value::{Function, NativeFn, Value};
use crate::error::{messages, Error, Result, StackFrame, StackTrace};
use crate::modules::{ModuleRegistry, ScriptId};
use rustc_hash::FxHashMap as HashMap;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Default maximum call depth before a resource error is raised
pub const DEFAULT_MAX_STACK_DEPTH: usize = 512;

/// Frames captured for usage-error reports
const ERROR_STACK_FRAMES: usize = 10;

/// Where printed text goes
#[derive(Clone, Default)]
pub enum Output {
    /// Process stdout
    #[default]
    Stdout,
    /// In-memory capture, shared with whoever created it
    Buffer(Rc<RefCell<String>>),
}

impl Output {
    /// A fresh capture buffer
    pub fn buffer() -> Self {
        Output::Buffer(Rc::new(RefCell::new(String::new())))
    }

    /// Everything captured so far (`None` for stdout)
    pub fn contents(&self) -> Option<String> {
        match self {
            Output::Stdout => None,
            Output::Buffer(buf) => Some(buf.borrow().clone()),
        }
    }

    fn write(&self, text: &str) {
        match self {
            Output::Stdout => {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
                    tracing::warn!(error = %e, "failed to write to stdout");
                }
            }
            Output::Buffer(buf) => buf.borrow_mut().push_str(text),
        }
    }
}

/// A compiled module, ready for evaluation
#[derive(Clone)]
pub struct Module {
    /// Id assigned at compile time
    pub script_id: ScriptId,
    /// Resolved URL
    pub url: String,
    body: NativeFn,
}

impl Module {
    /// Define a function whose code lives in this module, at `line`
    pub fn function<F>(&self, name: Option<&str>, line: u32, body: F) -> Value
    where
        F: Fn(&mut Realm, &[Value]) -> Result<Value> + 'static,
    {
        Value::new_function(Function::script(
            self.script_id,
            name.map(str::to_string),
            line,
            body,
        ))
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("script_id", &self.script_id)
            .field("url", &self.url)
            .finish()
    }
}

/// One script execution context
pub struct Realm {
    modules: ModuleRegistry,
    next_script_id: u32,
    stack: Vec<StackFrame>,
    max_stack_depth: usize,
    context_data: HashMap<u32, Value>,
    globals: HashMap<String, Value>,
    output: Output,
}

impl Realm {
    /// Create a realm printing to stdout
    pub fn new() -> Self {
        Self::with_output(Output::Stdout)
    }

    /// Create a realm printing to the given sink
    pub fn with_output(output: Output) -> Self {
        Self {
            modules: ModuleRegistry::new(),
            next_script_id: 1,
            stack: Vec::new(),
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            context_data: HashMap::default(),
            globals: HashMap::default(),
            output,
        }
    }

    /// Change the maximum call depth
    pub fn set_max_stack_depth(&mut self, depth: usize) {
        self.max_stack_depth = depth;
    }

    /// The output sink
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Write text to the output sink
    pub fn print(&mut self, text: &str) {
        self.output.write(text);
    }

    /// The module metadata registry
    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Compile a module: assign it a script id and record its metadata
    pub fn compile_module<F>(&mut self, url: impl Into<String>, body: F) -> Result<Module>
    where
        F: Fn(&mut Realm) -> Result<Value> + 'static,
    {
        let url = url.into();
        let script_id = ScriptId(self.next_script_id);
        self.modules.register(script_id, url.clone())?;
        self.next_script_id += 1;
        tracing::debug!(script = %script_id, url = %url, "compiled module");

        Ok(Module {
            script_id,
            url,
            body: Rc::new(move |realm: &mut Realm, _args: &[Value]| body(realm)),
        })
    }

    /// Evaluate a compiled module's top-level code
    pub fn evaluate(&mut self, module: &Module) -> Result<Value> {
        if self.modules.lookup(module.script_id).is_err() {
            return Err(Error::ModuleError(format!(
                "module {} was not compiled in this realm",
                module.url
            )));
        }
        let func = Function {
            name: Some("<module>".to_string()),
            script_id: Some(module.script_id),
            line: 1,
            call: module.body.clone(),
        };
        let result = self.invoke(&func, &[]);
        match &result {
            Ok(_) => tracing::debug!(url = %module.url, "module evaluated"),
            Err(e) => tracing::debug!(url = %module.url, error = %e, "module evaluation failed"),
        }
        result
    }

    /// Call a function value
    pub fn call(&mut self, callee: &Value, args: &[Value]) -> Result<Value> {
        match callee.as_function() {
            Some(func) => self.invoke(&func, args),
            None => Err(Error::type_error(messages::not_a_function(&callee.to_js_string()))
                .with_stack_trace(self.capture_stack(ERROR_STACK_FRAMES))),
        }
    }

    /// Read a property, running accessors
    pub fn get(&mut self, receiver: &Value, key: &str) -> Result<Value> {
        let getter = match receiver {
            Value::Undefined | Value::Null => {
                return Err(Error::type_error(format!(
                    "Cannot read properties of {} (reading '{}')",
                    receiver.to_js_string(),
                    key
                ))
                .with_stack_trace(self.capture_stack(ERROR_STACK_FRAMES)));
            }
            Value::Object(obj) => obj.borrow().accessor(key).cloned(),
            _ => None,
        };
        match getter {
            Some(getter) => self.invoke(&getter, &[]),
            None => Ok(receiver.get_property(key).unwrap_or(Value::Undefined)),
        }
    }

    /// Call the method stored under `key`
    pub fn call_method(&mut self, receiver: &Value, key: &str, args: &[Value]) -> Result<Value> {
        let method = self.get(receiver, key)?;
        if !method.is_function() {
            return Err(Error::type_error(messages::not_a_function(key))
                .with_stack_trace(self.capture_stack(ERROR_STACK_FRAMES)));
        }
        self.call(&method, args)
    }

    fn invoke(&mut self, func: &Function, args: &[Value]) -> Result<Value> {
        let pushed = match func.script_id {
            Some(script_id) => {
                if self.stack.len() >= self.max_stack_depth {
                    return Err(Error::stack_depth_exceeded(
                        self.stack.len() + 1,
                        self.max_stack_depth,
                    ));
                }
                self.stack
                    .push(StackFrame::new(func.display_name(), script_id, func.line));
                true
            }
            None => false,
        };

        let result = (func.call)(self, args);

        if pushed {
            self.stack.pop();
        }
        result
    }

    /// Move the innermost frame to `line`
    pub fn at_line(&mut self, line: u32) {
        if let Some(frame) = self.stack.last_mut() {
            frame.line = line;
        }
    }

    /// Current call depth
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Capture up to `limit` frames, innermost first, with file names resolved
    pub fn capture_stack(&self, limit: usize) -> StackTrace {
        let mut trace = StackTrace::new();
        for frame in self.stack.iter().rev().take(limit) {
            let url = frame.script_id.and_then(|id| self.modules.url_of(id));
            trace.push(match url {
                Some(url) => frame.clone().with_file(url),
                None => frame.clone(),
            });
        }
        trace
    }

    /// Store a value in a per-context data slot
    pub fn set_context_data(&mut self, slot: u32, value: Value) {
        self.context_data.insert(slot, value);
    }

    /// Read a per-context data slot
    pub fn context_data(&self, slot: u32) -> Option<Value> {
        self.context_data.get(&slot).cloned()
    }

    /// Set a global binding
    pub fn set_global(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    /// Get a global binding
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.get(name).cloned()
    }

    /// Call a global function by name
    pub fn call_global(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        match self.get_global(name) {
            Some(func) => self.call(&func, args),
            None => Err(Error::reference_error(messages::not_defined(name))
                .with_stack_trace(self.capture_stack(ERROR_STACK_FRAMES))),
        }
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_script_ids_are_sequential() {
        let mut realm = Realm::new();
        let a = realm.compile_module("/a.js", |_| Ok(Value::Undefined)).unwrap();
        let b = realm.compile_module("/b.js", |_| Ok(Value::Undefined)).unwrap();
        assert_eq!(a.script_id, ScriptId(1));
        assert_eq!(b.script_id, ScriptId(2));
        assert_eq!(realm.modules().url_of(ScriptId(2)), Some("/b.js"));
    }

    #[test]
    fn test_duplicate_module_url() {
        let mut realm = Realm::new();
        realm.compile_module("/a.js", |_| Ok(Value::Undefined)).unwrap();
        let err = realm.compile_module("/a.js", |_| Ok(Value::Undefined)).unwrap_err();
        assert!(matches!(err, Error::ModuleError(_)));
    }

    #[test]
    fn test_stack_capture_resolves_urls() {
        let mut realm = Realm::new();
        let module = realm
            .compile_module("/proj/stack.js", |realm| {
                realm.at_line(7);
                let trace = realm.capture_stack(1);
                let top = trace.top().cloned().unwrap();
                Ok(Value::from(format!(
                    "{}:{}",
                    top.file_name.unwrap_or_default(),
                    top.line
                )))
            })
            .unwrap();
        let result = realm.evaluate(&module).unwrap();
        assert_eq!(result, Value::from("/proj/stack.js:7"));
        assert_eq!(realm.stack_depth(), 0);
    }

    #[test]
    fn test_native_calls_push_no_frame() {
        let mut realm = Realm::new();
        let native = Value::new_function(Function::native("depth", |realm, _| {
            Ok(Value::Number(realm.stack_depth() as f64))
        }));
        assert_eq!(realm.call(&native, &[]).unwrap(), Value::from(0));
    }

    #[test]
    fn test_frames_popped_on_error() {
        let mut realm = Realm::new();
        let module = realm
            .compile_module("/err.js", |_| Err(Error::thrown("boom")))
            .unwrap();
        assert!(realm.evaluate(&module).is_err());
        assert_eq!(realm.stack_depth(), 0);
    }

    #[test]
    fn test_calling_non_function() {
        let mut realm = Realm::new();
        let err = realm.call(&Value::from(3), &[]).unwrap_err();
        assert!(matches!(err, Error::RuntimeError { kind: ErrorKind::TypeError, .. }));
    }

    #[test]
    fn test_unknown_global() {
        let mut realm = Realm::new();
        let err = realm.call_global("missing", &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::RuntimeError { kind: ErrorKind::ReferenceError, .. }
        ));
    }

    #[test]
    fn test_stack_depth_limit() {
        let mut realm = Realm::new();
        realm.set_max_stack_depth(4);
        let module = realm.compile_module("/deep.js", |_| Ok(Value::Undefined)).unwrap();
        let recurse = Rc::new(RefCell::new(Value::Undefined));
        let inner = recurse.clone();
        let func = module.function(Some("recurse"), 2, move |realm, _| {
            let me = inner.borrow().clone();
            realm.call(&me, &[])
        });
        *recurse.borrow_mut() = func.clone();
        let err = realm.call(&func, &[]).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitError { .. }));
        assert_eq!(realm.stack_depth(), 0);
    }

    #[test]
    fn test_accessor_get() {
        let mut realm = Realm::new();
        let obj = Value::new_object();
        if let Value::Object(o) = &obj {
            o.borrow_mut()
                .define_accessor("answer", Function::native("answer", |_, _| Ok(Value::from(42))));
        }
        assert_eq!(realm.get(&obj, "answer").unwrap(), Value::from(42));
        assert!(realm.get(&obj, "other").unwrap().is_undefined());
        assert!(realm.get(&Value::Undefined, "x").is_err());
    }

    #[test]
    fn test_buffer_output() {
        let output = Output::buffer();
        let mut realm = Realm::with_output(output.clone());
        realm.print("hello ");
        realm.print("world");
        assert_eq!(output.contents().as_deref(), Some("hello world"));
        assert_eq!(Output::Stdout.contents(), None);
    }
}
