//! Values accepted by the wrap operations.

use std::any::Any;
use std::fmt;

use crate::Error;

/// Boxed thread-safe error, the storage type of a cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Something to wrap: nothing, an apperr [`Error`], any other error, or a
/// non-error value that is turned into a message.
///
/// Any `std::error::Error + Send + Sync + 'static` converts with `into()`;
/// an apperr `Error` passed that way is recognized and flattened.
pub enum Cause {
    None,
    App(Error),
    Other(BoxError),
}

impl Cause {
    /// Wrap an already boxed error.
    pub fn boxed(err: BoxError) -> Self {
        match err.downcast::<Error>() {
            Ok(app) => Cause::App(*app),
            Err(other) => Cause::Other(other),
        }
    }

    /// Use the formatted form of an arbitrary value as the cause.
    pub fn msg(value: impl fmt::Display) -> Self {
        Cause::Other(Box::new(Message(value.to_string())))
    }

    /// Use a payload caught by `std::panic::catch_unwind` as the cause.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let text = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Cause::Other(Box::new(Message(text)))
    }
}

impl<E> From<E> for Cause
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Cause::boxed(Box::new(err))
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::None => write!(f, "Cause::None"),
            Cause::App(err) => f.debug_tuple("Cause::App").field(&err.to_string()).finish(),
            Cause::Other(err) => f.debug_tuple("Cause::Other").field(&err.to_string()).finish(),
        }
    }
}

/// Error built from a formatted non-error value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(String);

impl Message {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}
