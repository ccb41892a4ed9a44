//! Session bookkeeping: version tokens and the temporary object URL.
//!
//! Every reload of the working image is keyed by a [`SessionVersion`]. A
//! load is started by handing out a [`LoadTicket`]; when the bytes arrive
//! the ticket is compared to the current version and discarded if a newer
//! load has been started since.
//!
//! The decoded blob is exposed to the host through exactly one temporary
//! object URL at a time. [`HandleSlot`] owns it and releases the previous
//! URL whenever it is replaced, cleared, or dropped.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Monotonically increasing token that keys reloads and defeats caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionVersion(u64);

impl SessionVersion {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof that a load was started for a particular version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub version: SessionVersion,
}

/// A temporary local URL referring to in-memory image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to create object URL: {0}")]
    Allocation(String),
}

/// Creates and revokes temporary object URLs.
///
/// In the browser this is `URL.createObjectURL` / `URL.revokeObjectURL`.
pub trait ObjectUrlAllocator {
    fn acquire(&self, bytes: &[u8], mime: &str) -> Result<ObjectUrl, SessionError>;
    fn release(&self, url: &ObjectUrl);
}

/// Allocator that keeps URLs in memory and tracks which are still live.
///
/// Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectUrls {
    inner: Rc<RefCell<Registry>>,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    live: HashSet<ObjectUrl>,
    released: u64,
}

impl InMemoryObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of URLs acquired and not yet released.
    pub fn live(&self) -> usize {
        self.inner.borrow().live.len()
    }

    pub fn is_live(&self, url: &ObjectUrl) -> bool {
        self.inner.borrow().live.contains(url)
    }

    /// Total number of releases so far.
    pub fn released(&self) -> u64 {
        self.inner.borrow().released
    }
}

impl ObjectUrlAllocator for InMemoryObjectUrls {
    fn acquire(&self, bytes: &[u8], mime: &str) -> Result<ObjectUrl, SessionError> {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        let url = ObjectUrl::new(format!(
            "blob:photodesk/{}?type={mime}&len={}",
            registry.next_id,
            bytes.len()
        ));
        registry.live.insert(url.clone());
        Ok(url)
    }

    fn release(&self, url: &ObjectUrl) {
        let mut registry = self.inner.borrow_mut();
        if registry.live.remove(url) {
            registry.released += 1;
        } else {
            tracing::warn!(%url, "release of unknown object URL");
        }
    }
}

/// Owner of the session's single live object URL.
pub struct HandleSlot<A: ObjectUrlAllocator> {
    allocator: A,
    current: Option<ObjectUrl>,
}

impl<A: ObjectUrlAllocator> HandleSlot<A> {
    pub fn new(allocator: A) -> Self {
        Self {
            allocator,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&ObjectUrl> {
        self.current.as_ref()
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Acquire a URL for `bytes`, releasing whichever URL was held before.
    ///
    /// On failure the previous URL is released as well, leaving the slot
    /// empty.
    pub fn replace(&mut self, bytes: &[u8], mime: &str) -> Result<&ObjectUrl, SessionError> {
        self.clear();
        let url = self.allocator.acquire(bytes, mime)?;
        Ok(self.current.insert(url))
    }

    /// Release the held URL, if any.
    pub fn clear(&mut self) {
        if let Some(url) = self.current.take() {
            self.allocator.release(&url);
        }
    }
}

impl<A: ObjectUrlAllocator> Drop for HandleSlot<A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<A: ObjectUrlAllocator> fmt::Debug for HandleSlot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleSlot")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingAllocator;

    impl ObjectUrlAllocator for FailingAllocator {
        fn acquire(&self, _bytes: &[u8], _mime: &str) -> Result<ObjectUrl, SessionError> {
            Err(SessionError::Allocation("quota exceeded".to_string()))
        }

        fn release(&self, _url: &ObjectUrl) {}
    }

    #[test]
    fn test_version_next_is_monotonic() {
        let v = SessionVersion::new(7);
        assert!(v.next() > v);
        assert_eq!(v.next().value(), 8);
        assert_eq!(v.to_string(), "7");
    }

    #[test]
    fn test_in_memory_acquire_release() {
        let urls = InMemoryObjectUrls::new();
        let a = urls.acquire(b"abc", "image/jpeg").unwrap();
        let b = urls.acquire(b"abc", "image/jpeg").unwrap();
        assert_ne!(a, b);
        assert_eq!(urls.live(), 2);

        urls.release(&a);
        assert!(!urls.is_live(&a));
        assert!(urls.is_live(&b));
        assert_eq!(urls.released(), 1);
    }

    #[test]
    fn test_slot_replace_releases_previous() {
        let urls = InMemoryObjectUrls::new();
        let mut slot = HandleSlot::new(urls.clone());

        let first = slot.replace(b"one", "image/png").unwrap().clone();
        let second = slot.replace(b"two", "image/png").unwrap().clone();

        assert!(!urls.is_live(&first));
        assert!(urls.is_live(&second));
        assert_eq!(urls.live(), 1);
        assert_eq!(slot.current(), Some(&second));
    }

    #[test]
    fn test_slot_clear() {
        let urls = InMemoryObjectUrls::new();
        let mut slot = HandleSlot::new(urls.clone());
        slot.replace(b"x", "image/png").unwrap();
        slot.clear();
        slot.clear();
        assert_eq!(urls.live(), 0);
        assert_eq!(urls.released(), 1);
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_slot_drop_releases() {
        let urls = InMemoryObjectUrls::new();
        {
            let mut slot = HandleSlot::new(urls.clone());
            slot.replace(b"x", "image/png").unwrap();
            assert_eq!(urls.live(), 1);
        }
        assert_eq!(urls.live(), 0);
    }

    #[test]
    fn test_slot_failed_acquire_leaves_empty() {
        let mut slot = HandleSlot::new(FailingAllocator);
        assert!(slot.replace(b"x", "image/png").is_err());
        assert!(slot.current().is_none());
    }
}
