//! Result channel
//!
//! Matchers run as ordinary calls from script code, possibly several helper
//! functions below the `test` body that is waiting on them. They report back
//! through three per-realm data slots: the active suite name, whether the
//! current test's assertions have all passed, and the last failure text.
//! The last write wins.

use crate::runtime::{Realm, Value};

/// Context data slots used by the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSlot {
    /// Name passed to the most recent `describe`
    Describe,
    /// `false` once an assertion in the current test has failed
    Error,
    /// Diagnostic of the last failed assertion
    ErrorStr,
}

impl ChannelSlot {
    /// The realm data slot backing this channel slot
    pub const fn slot(self) -> u32 {
        match self {
            ChannelSlot::Describe => 158,
            ChannelSlot::Error => 159,
            ChannelSlot::ErrorStr => 160,
        }
    }

    /// Look up a slot by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "describe" => Some(ChannelSlot::Describe),
            "error" => Some(ChannelSlot::Error),
            "errorStr" => Some(ChannelSlot::ErrorStr),
            _ => None,
        }
    }
}

/// Typed view over a realm's channel slots
pub struct ResultChannel<'r> {
    realm: &'r mut Realm,
}

impl<'r> ResultChannel<'r> {
    pub fn new(realm: &'r mut Realm) -> Self {
        Self { realm }
    }

    fn write(&mut self, slot: ChannelSlot, value: Value) {
        self.realm.set_context_data(slot.slot(), value);
    }

    fn read(&self, slot: ChannelSlot) -> Option<Value> {
        self.realm.context_data(slot.slot())
    }

    pub fn set_suite_name(&mut self, name: &str) {
        self.write(ChannelSlot::Describe, Value::from(name));
    }

    /// The active suite name (empty outside any `describe`)
    pub fn suite_name(&self) -> String {
        match self.read(ChannelSlot::Describe) {
            Some(Value::String(name)) => name,
            _ => String::new(),
        }
    }

    /// Mark the current test as passing and clear the last diagnostic
    pub fn reset_assertion(&mut self) {
        self.write(ChannelSlot::Error, Value::Boolean(true));
        self.write(ChannelSlot::ErrorStr, Value::from(""));
    }

    /// Mark the current test as failed with the given diagnostic
    pub fn record_failure(&mut self, message: String) {
        tracing::trace!(suite = %self.suite_name(), "assertion failed");
        self.write(ChannelSlot::Error, Value::Boolean(false));
        self.write(ChannelSlot::ErrorStr, Value::String(message));
    }

    /// Whether an assertion has failed since the last reset
    pub fn assertion_failed(&self) -> bool {
        matches!(self.read(ChannelSlot::Error), Some(Value::Boolean(false)))
    }

    /// The pass flag and, when it is `false`, the last diagnostic
    pub fn read_assertion(&self) -> (bool, String) {
        if !self.assertion_failed() {
            return (true, String::new());
        }
        let message = match self.read(ChannelSlot::ErrorStr) {
            Some(Value::String(text)) => text,
            _ => String::new(),
        };
        (false, message)
    }
}
