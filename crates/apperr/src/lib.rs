//! # apperr
//!
//! Application errors with a status code, a structured body and a stack
//! trace captured where they were wrapped.
//!
//! ## Design Philosophy
//!
//! - **Status code**: Know how to answer (e.g. 404, 500)
//! - **Body**: Describe the error with pluggable structured context
//! - **Cause**: Keep the underlying error reachable through `source()`
//! - **Stack**: Record where the error was wrapped, resolve it lazily
//!
//! ## Usage
//!
//! ```rust
//! use apperr::{Cause, Error, h};
//!
//! fn find_user(id: u64) -> Result<(), Error> {
//!     let not_found = Error::new(404, h! { "resource" => "user", "id" => id });
//!     let lookup = std::io::Error::other("no rows in result set");
//!     Err(not_found.wrap_prefix(lookup, "loading user").expect("body is set"))
//! }
//!
//! let err = find_user(7).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "apperr(404): {id: 7, resource: user}; loading user: no rows in result set"
//! );
//! assert!(err.is(&Error::new(404, h! {})));
//! assert!(err.wrap(Cause::None).is_ok());
//! ```
//!
//! ## Principles
//!
//! - Wrapping never mutates the receiver, it always returns a new `Error`
//! - Wrapping an apperr `Error` flattens it: its prefix and cause carry over,
//!   its code and body are replaced
//! - Misuse of the library is reported as a [`Fault`], never as a panic

mod body;
mod cause;
mod chain;
pub mod config;
mod error;
mod fault;
mod kind;
mod stack;
mod verb;

pub use body::{Body, H};
pub use cause::{BoxError, Cause, Message};
pub use chain::{Chain, is_in_chain};
pub use config::StackConfig;
pub use error::Error;
pub use fault::Fault;
pub use kind::FaultKind;
pub use stack::StackFrame;
pub use verb::Verb;

/// Result type alias using apperr Fault
pub type Result<T> = std::result::Result<T, Fault>;
