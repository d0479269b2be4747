//! Bounded in-memory error history.
//!
//! Keeps the most recent [`ErrorLogEntry`] values in a fixed-size ring. Once
//! the ring is full the oldest entry is dropped and the eviction counter is
//! bumped; nothing else happens, callers are never told.
//!
//! Reads return entries newest first. User agent and URL are cut to
//! [`MAX_ENVIRONMENT_BYTES`] on a character boundary.
//!
//! # Example
//!
//! ```rust
//! use hireline_errors::ring_buffer::{ErrorHistory, ErrorLogEntry};
//! use hireline_errors::{create_error, ErrorCode};
//!
//! let history = ErrorHistory::new(2);
//! for _ in 0..3 {
//!     let err = create_error(ErrorCode::QueryFailed, None, None, None);
//!     history.push(ErrorLogEntry::new(err, "Server", "/jobs"));
//! }
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.eviction_count(), 1);
//! ```

use crate::classify::generate_error_id;
use crate::models::AppError;
use crate::ErrorContext;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default number of entries kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Byte cap applied to user agent and URL strings.
pub const MAX_ENVIRONMENT_BYTES: usize = 512;

/// One logged error plus the environment it happened in.
///
/// Strings are `Arc<str>` so cloning an entry out of the history is a handful
/// of refcount bumps.
#[derive(Clone, Debug)]
pub struct ErrorLogEntry {
    /// Tracking id, `err_<millis>_<suffix>`.
    pub id: Arc<str>,
    /// The error itself.
    pub error: AppError,
    /// Client user agent, `"Server"` outside a browser.
    pub user_agent: Arc<str>,
    /// Page or endpoint, `"Server"` outside a browser.
    pub url: Arc<str>,
    /// Signed-in user.
    pub user_id: Option<Arc<str>>,
    /// Current session.
    pub session_id: Option<Arc<str>>,
    /// When the entry was logged, ms since epoch.
    pub timestamp: u64,
    /// Set once someone has looked into it.
    pub resolved: bool,
    /// Caller-supplied context at log time.
    pub context: ErrorContext,
}

impl ErrorLogEntry {
    /// New unresolved entry with a fresh id.
    pub fn new(error: AppError, user_agent: &str, url: &str) -> Self {
        Self {
            id: Arc::from(generate_error_id()),
            error,
            user_agent: Arc::from(truncate_to_bytes(user_agent, MAX_ENVIRONMENT_BYTES).as_ref()),
            url: Arc::from(truncate_to_bytes(url, MAX_ENVIRONMENT_BYTES).as_ref()),
            user_id: None,
            session_id: None,
            timestamp: crate::models::unix_millis(),
            resolved: false,
            context: ErrorContext::new(),
        }
    }

    /// Attach the signed-in user.
    #[must_use]
    pub fn with_user(mut self, user_id: Option<&str>, session_id: Option<&str>) -> Self {
        self.user_id = user_id.map(Arc::from);
        self.session_id = session_id.map(Arc::from);
        self
    }

    /// Attach caller context.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }
}

impl Serialize for ErrorLogEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ErrorLogEntry", 9)?;
        s.serialize_field("id", self.id.as_ref())?;
        s.serialize_field("error", &self.error.info())?;
        s.serialize_field("userAgent", self.user_agent.as_ref())?;
        s.serialize_field("url", self.url.as_ref())?;
        s.serialize_field("userId", &self.user_id.as_deref())?;
        s.serialize_field("sessionId", &self.session_id.as_deref())?;
        s.serialize_field("timestamp", &self.timestamp)?;
        s.serialize_field("resolved", &self.resolved)?;
        s.serialize_field("context", &self.context)?;
        s.end()
    }
}

/// Fixed-size ring with exact allocation.
struct RingBuffer {
    entries: Box<[Option<ErrorLogEntry>]>,
    tail: usize,
    head: usize,
    len: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            entries: std::iter::repeat_with(|| None)
                .take(capacity)
                .collect::<Box<[Option<ErrorLogEntry>]>>(),
            tail: 0,
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, entry: ErrorLogEntry) -> Option<ErrorLogEntry> {
        let evicted = self.entries[self.tail].replace(entry);
        self.tail = (self.tail + 1) % self.entries.len();

        if self.len < self.entries.len() {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % self.entries.len();
        }

        evicted
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    /// Oldest to newest.
    fn iter(&self) -> impl DoubleEndedIterator<Item = &ErrorLogEntry> {
        let head = self.head;
        let cap = self.entries.len();

        (0..self.len).filter_map(move |i| self.entries[(head + i) % cap].as_ref())
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut ErrorLogEntry> {
        self.entries
            .iter_mut()
            .flatten()
            .find(|entry| entry.id.as_ref() == id)
    }

    fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}

/// Shared, bounded, most-recent-first error history.
///
/// Clones share the same ring.
pub struct ErrorHistory {
    buffer: Arc<RwLock<RingBuffer>>,
    max_entries: usize,
    eviction_count: Arc<AtomicU64>,
}

impl ErrorHistory {
    /// History holding at most `max_entries` (minimum one).
    pub fn new(max_entries: usize) -> Self {
        let bounded_entries = max_entries.max(1);
        Self {
            buffer: Arc::new(RwLock::new(RingBuffer::new(bounded_entries))),
            max_entries: bounded_entries,
            eviction_count: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn read_buffer(&self) -> RwLockReadGuard<'_, RingBuffer> {
        match self.buffer.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write_buffer(&self) -> RwLockWriteGuard<'_, RingBuffer> {
        match self.buffer.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Store an entry, evicting the oldest when full.
    pub fn push(&self, entry: ErrorLogEntry) {
        let mut buffer = self.write_buffer();
        if buffer.push(entry).is_some() {
            self.eviction_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// The `count` newest entries, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<ErrorLogEntry> {
        let buffer = self.read_buffer();
        buffer.iter().rev().take(count).cloned().collect()
    }

    /// Every entry, newest first.
    pub fn get_all(&self) -> Vec<ErrorLogEntry> {
        let buffer = self.read_buffer();
        buffer.iter().rev().cloned().collect()
    }

    /// Entries matching `predicate`, newest first.
    ///
    /// ```rust
    /// # use hireline_errors::ring_buffer::ErrorHistory;
    /// # let history = ErrorHistory::new(10);
    /// let open = history.get_filtered(|entry| !entry.resolved);
    /// # assert!(open.is_empty());
    /// ```
    pub fn get_filtered<F>(&self, predicate: F) -> Vec<ErrorLogEntry>
    where
        F: Fn(&ErrorLogEntry) -> bool,
    {
        let buffer = self.read_buffer();
        buffer.iter().rev().filter(|e| predicate(e)).cloned().collect()
    }

    /// Look up one entry by id.
    pub fn get_by_id(&self, id: &str) -> Option<ErrorLogEntry> {
        let buffer = self.read_buffer();
        buffer.iter().find(|e| e.id.as_ref() == id).cloned()
    }

    /// Flag an entry as resolved. Returns `false` for unknown ids.
    pub fn mark_resolved(&self, id: &str) -> bool {
        let mut buffer = self.write_buffer();
        match buffer.find_mut(id) {
            Some(entry) => {
                entry.resolved = true;
                true
            }
            None => false,
        }
    }

    /// Current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.read_buffer().len()
    }

    /// Whether the history is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries dropped for space since creation.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.eviction_count.load(Ordering::Relaxed)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.write_buffer().clear();
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Whether the next push will evict.
    pub fn is_full(&self) -> bool {
        self.len() >= self.max_entries
    }
}

impl Default for ErrorHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl Clone for ErrorHistory {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            max_entries: self.max_entries,
            eviction_count: Arc::clone(&self.eviction_count),
        }
    }
}

impl std::fmt::Debug for ErrorHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHistory")
            .field("len", &self.len())
            .field("capacity", &self.max_entries)
            .field("evictions", &self.eviction_count())
            .finish()
    }
}

const ELLIPSIS: &str = "...";

/// Cut `s` to at most `max_bytes`, ending in an ellipsis when shortened.
pub(crate) fn truncate_to_bytes(s: &str, max_bytes: usize) -> Cow<'_, str> {
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }
    let Some(budget) = max_bytes.checked_sub(ELLIPSIS.len()) else {
        return Cow::Borrowed(&ELLIPSIS[..max_bytes]);
    };
    let cut = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= budget)
        .last()
        .unwrap_or(0);
    Cow::Owned(format!("{}{ELLIPSIS}", &s[..cut]))
}
