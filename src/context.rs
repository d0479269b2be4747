//! Free-form diagnostic context attached to an [`AppError`](crate::AppError).
//!
//! Context travels upward with an error and is enriched by each layer that
//! knows more (component name, operation, request id). It is extended by
//! merging; an existing bag is never replaced wholesale.
//!
//! # Memory Hygiene
//!
//! Context routinely holds user ids, session ids and request URLs. Owned
//! values are zeroized when dropped. Borrowed values point at static program
//! memory and are left alone.
//!
//! ```rust
//! use hireline_errors::ErrorContext;
//!
//! let mut ctx = ErrorContext::new()
//!     .with("component", "JobBoard")
//!     .with("attempt", 1u32);
//! ctx.merge(ErrorContext::new().with("attempt", 2u32).with("requestId", "req_1"));
//!
//! assert_eq!(ctx.get("component"), Some("JobBoard"));
//! assert_eq!(ctx.get("attempt"), Some("2"));
//! assert_eq!(ctx.len(), 3);
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

// ============================================================================
// Context Field
// ============================================================================

/// Context value wrapper with zeroization for owned data.
#[derive(Clone, PartialEq, Eq)]
pub struct ContextField {
    value: Cow<'static, str>,
}

impl ContextField {
    /// Borrow the value.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.value.as_ref()
    }
}

impl fmt::Debug for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl From<&'static str> for ContextField {
    fn from(value: &'static str) -> Self {
        Self {
            value: Cow::Borrowed(value),
        }
    }
}

impl From<String> for ContextField {
    fn from(value: String) -> Self {
        Self {
            value: Cow::Owned(value),
        }
    }
}

impl From<Cow<'static, str>> for ContextField {
    fn from(value: Cow<'static, str>) -> Self {
        Self { value }
    }
}

macro_rules! context_field_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ContextField {
                fn from(value: $ty) -> Self {
                    Self { value: Cow::Owned(value.to_string()) }
                }
            }
        )*
    };
}

context_field_from_display!(bool, u16, u32, u64, usize, i32, i64, f64);

impl Zeroize for ContextField {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.value {
            s.zeroize();
        }
    }
}

impl Drop for ContextField {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// Context Bag
// ============================================================================

/// Ordered key/value bag. Insertion order is kept; re-inserting a key
/// overwrites its value in place.
///
/// Inline capacity of four covers the usual url/method/operation/request id
/// set without touching the heap.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    entries: SmallVec<[(Cow<'static, str>, ContextField); 4]>,
}

impl ErrorContext {
    /// Empty bag.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[inline]
    #[must_use]
    pub fn with(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<ContextField>,
    ) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style insert that skips `None`.
    #[inline]
    #[must_use]
    pub fn with_opt<V: Into<ContextField>>(
        self,
        key: impl Into<Cow<'static, str>>,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Insert or overwrite a single entry.
    pub fn insert(&mut self, key: impl Into<Cow<'static, str>>, value: impl Into<ContextField>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merge `other` into `self`. Keys present in both take `other`'s value.
    pub fn merge(&mut self, other: ErrorContext) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` is present.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }
}

impl fmt::Debug for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Serialize for ErrorContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K, V> FromIterator<(K, V)> for ErrorContext
where
    K: Into<Cow<'static, str>>,
    V: Into<ContextField>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}
