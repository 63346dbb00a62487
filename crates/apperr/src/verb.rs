//! Rendering verbs for [`crate::Error::render`].

use strum_macros::{Display, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Verb {
    /// The message as is (`{}`).
    #[default]
    Plain,
    /// The message escaped and double-quoted.
    Quoted,
    /// Reserved for printing stack frames; currently the same as `Plain`.
    Verbose,
}
