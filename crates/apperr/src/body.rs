//! Error bodies: the structured context carried by an [`crate::Error`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Any information describing the context of an error.
///
/// `matches` is consulted by [`crate::Error::is`] and `duplicate` by the
/// wrap operations. Implementors that need a real comparison can downcast
/// `target` through [`Body::as_any`]:
///
/// ```rust
/// use std::any::Any;
/// use std::fmt;
/// use apperr::Body;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Fields(Vec<String>);
///
/// impl fmt::Display for Fields {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "invalid fields: {}", self.0.join(", "))
///     }
/// }
///
/// impl Body for Fields {
///     fn matches(&self, target: &dyn Body) -> bool {
///         target.as_any().downcast_ref::<Fields>() == Some(self)
///     }
///
///     fn duplicate(&self) -> Box<dyn Body> {
///         Box::new(self.clone())
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Body: fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Reports whether this body is equivalent to `target` for error identity.
    fn matches(&self, target: &dyn Body) -> bool;

    /// Returns an independent copy of this body.
    fn duplicate(&self) -> Box<dyn Body>;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Body {
    /// Downcast to a concrete body type.
    pub fn downcast_ref<T: Body>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Map-like body. Matches any other body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct H(BTreeMap<String, Value>);

impl H {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Body for H {
    /// Always true: an `H` body never distinguishes errors.
    fn matches(&self, _target: &dyn Body) -> bool {
        true
    }

    fn duplicate(&self) -> Box<dyn Body> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for H {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Value::String(s) => write!(f, "{}: {}", key, s)?,
                other => write!(f, "{}: {}", key, other)?,
            }
        }
        write!(f, "}}")
    }
}

impl<K, V> FromIterator<(K, V)> for H
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for H
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Build an [`H`] body from `key => value` pairs.
///
/// ```rust
/// let body = apperr::h! { "resource" => "user", "id" => 7 };
/// assert_eq!(body.to_string(), "{id: 7, resource: user}");
/// ```
#[macro_export]
macro_rules! h {
    () => {
        $crate::H::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut body = $crate::H::new();
        $( body.insert($key, $value); )+
        body
    }};
}
