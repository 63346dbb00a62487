//! The application Error: status code, body, cause and captured stack.

use std::error::Error as StdError;
use std::fmt;

use crate::cause::BoxError;
use crate::chain::Chain;
use crate::config::{self, StackConfig};
use crate::stack::{Stack, StackFrame};
use crate::{Body, Cause, Fault, Result, Verb};

/// Frames between `Stack::capture` and the caller of a public entry point.
///
/// Every entry point calls `Stack::capture` itself and only then hands off
/// to a builder, so its own frame is live and is the only one to skip.
const ENTRY_FRAMES: usize = 1;

/// An error with a status code, a body and a stack trace.
///
/// ```rust
/// use apperr::{Error, h};
///
/// let not_found = Error::new(404, h! { "resource" => "user" });
/// let io = std::io::Error::other("no rows in result set");
/// let err = not_found.wrap(io).unwrap();
///
/// assert_eq!(err.to_string(), "apperr(404): {resource: user}; no rows in result set");
/// assert!(err.is(&not_found));
/// assert!(!err.stack_frames().is_empty());
/// ```
pub struct Error {
    status_code: i32,
    body: Option<Box<dyn Body>>,
    prefix: String,
    cause: Option<BoxError>,
    stack: Option<Stack>,
}

// ── Constructors ──────────────────────────────────────────────────

impl Error {
    /// Create a root error with no cause and no prefix.
    ///
    /// No stack is captured unless `capture_on_new` is set in the
    /// process-wide [`StackConfig`].
    #[inline(never)]
    pub fn new(status_code: i32, body: impl Body) -> Self {
        let config = config::current();
        let stack = if config.capture_on_new {
            Some(Stack::capture(ENTRY_FRAMES, config.max_depth))
        } else {
            None
        };
        Self::root(status_code, Some(Box::new(body)), stack)
    }

    /// Create a root error that carries no body.
    ///
    /// Such an error can be compared with [`Error::is`] but not wrapped.
    #[inline(never)]
    pub fn without_body(status_code: i32) -> Self {
        let config = config::current();
        let stack = if config.capture_on_new {
            Some(Stack::capture(ENTRY_FRAMES, config.max_depth))
        } else {
            None
        };
        Self::root(status_code, None, stack)
    }

    fn root(status_code: i32, body: Option<Box<dyn Body>>, stack: Option<Stack>) -> Self {
        Self {
            status_code,
            body,
            prefix: String::new(),
            cause: None,
            stack,
        }
    }
}

// ── Wrapping ──────────────────────────────────────────────────────

impl Error {
    /// Create a new error with this status code and a copy of this body,
    /// caused by `cause`.
    ///
    /// Wrapping another apperr `Error` takes over its prefix and cause
    /// instead of nesting it.
    #[inline(never)]
    pub fn wrap(&self, cause: impl Into<Cause>) -> Result<Error> {
        let body = self.duplicate_body("apperr::wrap")?;
        let stack = Stack::capture(ENTRY_FRAMES, config::max_stack_depth());
        Ok(self.derive(body, cause.into(), None, stack))
    }

    /// Like [`Error::wrap`], prepending `prefix` to the cause's message.
    #[inline(never)]
    pub fn wrap_prefix(&self, cause: impl Into<Cause>, prefix: &str) -> Result<Error> {
        let body = self.duplicate_body("apperr::wrap_prefix")?;
        let stack = Stack::capture(ENTRY_FRAMES, config::max_stack_depth());
        Ok(self.derive(body, cause.into(), Some(prefix), stack))
    }

    /// Wrap using an explicit config instead of the process-wide one.
    #[inline(never)]
    pub fn wrap_with(
        &self,
        cause: impl Into<Cause>,
        prefix: Option<&str>,
        config: &StackConfig,
    ) -> Result<Error> {
        config
            .validate()
            .map_err(|fault| fault.with_operation("apperr::wrap_with"))?;
        let body = self.duplicate_body("apperr::wrap_with")?;
        let stack = Stack::capture(ENTRY_FRAMES, config.max_depth);
        Ok(self.derive(body, cause.into(), prefix, stack))
    }

    fn duplicate_body(&self, operation: &'static str) -> Result<Box<dyn Body>> {
        match &self.body {
            Some(body) => Ok(body.duplicate()),
            None => Err(Fault::nil_body(self.status_code).with_operation(operation)),
        }
    }

    fn derive(
        &self,
        body: Box<dyn Body>,
        cause: Cause,
        prefix: Option<&str>,
        stack: Stack,
    ) -> Error {
        let (prefix, cause) = match cause {
            Cause::None => (String::new(), None),
            Cause::App(inner) => {
                let prefix = match prefix {
                    Some(prefix) => format!("{}: {}", prefix, inner.prefix),
                    None => inner.prefix,
                };
                (prefix, inner.cause)
            }
            Cause::Other(err) => {
                let prefix = prefix.map(|p| format!("{}: ", p)).unwrap_or_default();
                (prefix, Some(err))
            }
        };

        Error {
            status_code: self.status_code,
            body: Some(body),
            prefix,
            cause,
            stack: Some(stack),
        }
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl Error {
    pub fn status_code(&self) -> i32 {
        self.status_code
    }

    pub fn body(&self) -> Option<&dyn Body> {
        self.body.as_deref()
    }

    /// Text rendered in front of the cause's message.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The wrapped error, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Reports whether `target` is an apperr `Error` with the same status
    /// code and a matching body. Causes and stacks are ignored.
    pub fn is(&self, target: &(dyn StdError + 'static)) -> bool {
        let Some(target) = target.downcast_ref::<Error>() else {
            return false;
        };
        if target.status_code != self.status_code {
            return false;
        }
        match (&self.body, &target.body) {
            (Some(body), Some(other)) => body.matches(&**other),
            (None, None) => true,
            _ => false,
        }
    }

    /// Resolved frames of the captured stack, innermost first.
    ///
    /// Resolution happens on the first call; later calls return the same
    /// slice. Errors without a capture return an empty slice.
    pub fn stack_frames(&self) -> &[StackFrame] {
        match &self.stack {
            Some(stack) => stack.frames(),
            None => &[],
        }
    }

    /// Iterate over this error and all of its causes.
    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self)
    }

    /// First error in the cause chain that is a `T`.
    pub fn find_cause<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.chain().skip(1).find_map(|err| err.downcast_ref::<T>())
    }

    pub fn render(&self, verb: Verb) -> String {
        match verb {
            Verb::Plain => format!("{}", self),
            Verb::Quoted => format!("{:?}", self.to_string()),
            Verb::Verbose => format!("{:#}", self),
        }
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// ── Display / Debug ───────────────────────────────────────────────

struct BodyDisplay<'a>(Option<&'a dyn Body>);

impl fmt::Display for BodyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(body) => write!(f, "{}", body),
            None => write!(f, "<nil>"),
        }
    }
}

impl fmt::Display for Error {
    // `{:#}` renders the same text for now; frames are only exposed
    // through `stack_frames`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "apperr({}): {}",
            self.status_code,
            BodyDisplay(self.body())
        )?;
        if let Some(cause) = &self.cause {
            write!(f, "; {}{}", self.prefix, cause)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "apperr({})", self.status_code)?;
        writeln!(f)?;
        writeln!(f, "    Body: {}", BodyDisplay(self.body()))?;

        if !self.prefix.is_empty() {
            writeln!(f, "    Prefix: {:?}", self.prefix)?;
        }

        if let Some(cause) = &self.cause {
            writeln!(f, "    Cause: {:?}", cause)?;
        }

        if let Some(stack) = &self.stack {
            writeln!(f, "    Frames: {}", stack.len())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cause::Message;
    use crate::{FaultKind, H, h};
    use pretty_assertions::assert_eq;
    use std::any::Any;

    fn io_err(msg: &str) -> std::io::Error {
        std::io::Error::other(msg.to_string())
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Code(&'static str);

    impl fmt::Display for Code {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "code {}", self.0)
        }
    }

    impl Body for Code {
        fn matches(&self, target: &dyn Body) -> bool {
            target.downcast_ref::<Code>() == Some(self)
        }

        fn duplicate(&self) -> Box<dyn Body> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn new_renders_code_and_body() {
        let err = Error::new(404, h! { "resource" => "user" });
        assert_eq!(err.to_string(), "apperr(404): {resource: user}");
        assert!(err.cause().is_none());
        assert_eq!(err.prefix(), "");
        assert!(err.stack_frames().is_empty());
    }

    #[test]
    fn without_body_renders_nil() {
        let err = Error::without_body(500);
        assert_eq!(err.to_string(), "apperr(500): <nil>");
        assert!(err.body().is_none());
    }

    #[test]
    fn wrap_plain_error() {
        let base = Error::new(404, h! { "resource" => "user" });
        let err = base.wrap(io_err("no rows")).unwrap();

        assert_eq!(err.status_code(), 404);
        assert_eq!(err.prefix(), "");
        assert_eq!(err.cause().unwrap().to_string(), "no rows");
        assert_eq!(err.to_string(), "apperr(404): {resource: user}; no rows");
        assert!(base.cause().is_none());
    }

    #[test]
    fn wrap_none() {
        let base = Error::new(400, H::new());
        let err = base.wrap(Cause::None).unwrap();
        assert!(err.cause().is_none());
        assert!(!err.to_string().contains("; "));

        let err = base.wrap_prefix(Cause::None, "ignored").unwrap();
        assert_eq!(err.prefix(), "");
        assert!(err.cause().is_none());
    }

    #[test]
    fn wrap_prefix_plain_error() {
        let base = Error::new(500, H::new());
        let err = base.wrap_prefix(io_err("denied"), "reading config").unwrap();
        assert_eq!(err.prefix(), "reading config: ");
        assert_eq!(err.to_string(), "apperr(500): {}; reading config: denied");
    }

    #[test]
    fn wrap_flattens_app_errors() {
        let base = Error::new(404, H::new());
        let inner = base.wrap_prefix(io_err("gone"), "X").unwrap();

        let outer_base = Error::new(503, h! { "retry" => true });
        let outer = outer_base.wrap_prefix(inner, "Y").unwrap();

        assert_eq!(outer.status_code(), 503);
        assert_eq!(outer.prefix(), "Y: X: ");
        assert_eq!(outer.cause().unwrap().to_string(), "gone");
        assert!(outer.cause().unwrap().downcast_ref::<Error>().is_none());
        assert_eq!(outer.to_string(), "apperr(503): {retry: true}; Y: X: gone");
    }

    #[test]
    fn wrap_app_error_without_prefix_keeps_inherited_prefix() {
        let base = Error::new(404, H::new());
        let inner = base.wrap_prefix(io_err("gone"), "X").unwrap();
        let outer = Error::new(410, H::new()).wrap(inner).unwrap();
        assert_eq!(outer.prefix(), "X: ");
        assert_eq!(outer.to_string(), "apperr(410): {}; X: gone");
    }

    #[test]
    fn wrap_root_app_error_has_no_cause() {
        let root = Error::new(404, H::new());
        let err = Error::new(500, H::new()).wrap_prefix(root, "lookup").unwrap();
        assert!(err.cause().is_none());
        assert_eq!(err.prefix(), "lookup: ");
        assert_eq!(err.to_string(), "apperr(500): {}");
    }

    #[test]
    fn wrap_message_cause() {
        let err = Error::new(500, H::new()).wrap(Cause::msg(42)).unwrap();
        let cause = err.cause().unwrap();
        assert_eq!(cause.downcast_ref::<Message>().unwrap().as_str(), "42");
        assert_eq!(err.to_string(), "apperr(500): {}; 42");
    }

    #[test]
    fn wrap_without_body_is_a_fault() {
        let base = Error::without_body(500);
        let fault = base.wrap(io_err("x")).unwrap_err();
        assert_eq!(fault.kind(), FaultKind::NilBody);
        assert_eq!(fault.operation(), "apperr::wrap");

        let fault = base.wrap_prefix(Cause::None, "p").unwrap_err();
        assert_eq!(fault.operation(), "apperr::wrap_prefix");
    }

    #[test]
    fn wrap_duplicates_body() {
        let base = Error::new(404, h! { "resource" => "user" });
        let err = base.wrap(Cause::None).unwrap();
        let original = base.body().unwrap() as *const dyn Body as *const ();
        let copy = err.body().unwrap() as *const dyn Body as *const ();
        assert_ne!(original, copy);
        assert_eq!(
            err.body().unwrap().downcast_ref::<H>(),
            base.body().unwrap().downcast_ref::<H>()
        );
    }

    #[test]
    fn is_compares_code_and_body() {
        let base = Error::new(404, h! { "resource" => "user" });
        let other_body = Error::new(404, h! { "resource" => "group" });
        let other_code = Error::new(500, h! { "resource" => "user" });
        let wrapped = base.wrap(io_err("no rows")).unwrap();

        assert!(wrapped.is(&base));
        assert!(base.is(&other_body));
        assert!(!base.is(&other_code));
        assert!(!base.is(&io_err("no rows")));
    }

    #[test]
    fn is_with_custom_body() {
        let a = Error::new(400, Code("a"));
        let b = Error::new(400, Code("b"));
        assert!(a.is(&Error::new(400, Code("a"))));
        assert!(!a.is(&b));
        assert!(!a.is(&Error::new(400, H::new())));
    }

    #[test]
    fn is_with_missing_bodies() {
        let nil = Error::without_body(404);
        assert!(nil.is(&Error::without_body(404)));
        assert!(!nil.is(&Error::new(404, H::new())));
        assert!(!Error::new(404, H::new()).is(&nil));
    }

    #[test]
    fn render_verbs() {
        let err = Error::new(400, h! { "field" => "name" })
            .wrap(io_err("bad \"value\""))
            .unwrap();
        let plain = "apperr(400): {field: name}; bad \"value\"";
        assert_eq!(err.render(Verb::Plain), plain);
        assert_eq!(err.render(Verb::Verbose), plain);
        assert_eq!(
            err.render(Verb::Quoted),
            "\"apperr(400): {field: name}; bad \\\"value\\\"\""
        );
    }

    #[test]
    fn debug_report() {
        let err = Error::new(404, h! { "resource" => "user" })
            .wrap_prefix(io_err("no rows"), "query")
            .unwrap();
        let debug = format!("{:?}", err);
        assert!(debug.starts_with("apperr(404)\n"));
        assert!(debug.contains("Body: {resource: user}"));
        assert!(debug.contains("Prefix: \"query: \""));
        assert!(debug.contains("Frames: "));
    }

    #[test]
    fn source_is_cause() {
        let err = Error::new(500, H::new()).wrap(io_err("disk")).unwrap();
        assert_eq!(err.source().unwrap().to_string(), "disk");
        assert!(err.find_cause::<std::io::Error>().is_some());
        assert!(err.find_cause::<Message>().is_none());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
