//! Verity: an in-process test framework for a script runtime
//!
//! Verity gives script code running in a [`Realm`] the familiar
//! `describe` / `test` / `expect` API. Tests run synchronously in the same
//! context as the code under test, and each finished test prints a
//! pass/fail line followed, on failure, by an Expected / Received / at
//! diagnostic pointing at the failing assertion.
//!
//! # Quick Start
//!
//! ```
//! use verity::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let output = Output::buffer();
//!     let mut realm = Realm::with_output(output.clone());
//!     let harness = install(&mut realm, TestConfig::plain());
//!
//!     let module = realm.compile_module("/proj/sum.test.js", |_| Ok(Value::Undefined))?;
//!     let body = module.function(None, 4, |realm, _| {
//!         realm.at_line(5);
//!         let handle = realm.call_global("expect", &[Value::from(1 + 1)])?;
//!         realm.call_method(&handle, "toEqual", &[Value::from(3)])
//!     });
//!     realm.call_global("test", &[Value::from("adds"), body])?;
//!
//!     assert_eq!(harness.report().failed, 1);
//!     assert!(output.contents().unwrap().contains("at /proj/sum.test.js:5"));
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Framework** | [`test_runner`] |
//! | **Host** | [`runtime`], [`modules`] |
//! | **Support** | [`error`](Error), [`logging`], [`prelude`] |

pub mod error;
pub mod logging;
pub mod modules;
pub mod prelude;
pub mod runtime;
pub mod test_runner;

pub use error::{Error, ErrorKind, Result};
pub use runtime::{Realm, Value};
pub use test_runner::{install, Expectation, TestConfig, TestHarness};

/// Verity version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
