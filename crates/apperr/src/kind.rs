//! Fault kinds for apperr operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of fault raised by the library itself.
///
/// These never describe application errors (that is what [`crate::Error`]
/// is for); they describe misuse of the library or a broken configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum FaultKind {
    /// `wrap` was called on an Error that has no Body to duplicate
    NilBody,

    /// Configuration values are out of range
    InvalidConfig,

    /// Configuration text is not valid TOML or has the wrong shape
    ConfigParseFailed,

    /// Reading a configuration file failed
    IoFailed,
}

impl FaultKind {
    /// Returns the fault kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}
