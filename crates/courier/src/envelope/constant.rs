//! Memoizing decorator and its cache.

use super::{Envelope, EnvelopeKey};
use crate::error::Result;
use courier_mime::Message;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long an assembled message stays valid by default.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry {
    written: Instant,
    message: Arc<Message>,
}

type Slot = Mutex<Option<Entry>>;

/// Cache of assembled messages keyed by [`EnvelopeKey`].
///
/// Entries expire a fixed time after they were written, regardless of how
/// often they are read. Each key has its own lock, so concurrent requests
/// for one key run the assembly once while other keys proceed in parallel.
pub struct EnvelopeCache {
    ttl: Duration,
    slots: Mutex<HashMap<EnvelopeKey, Arc<Slot>>>,
}

impl EnvelopeCache {
    /// Creates a cache with a one-hour validity window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates a cache with a custom validity window.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Validity window of cached messages.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of keys with a slot (valid, expired or in flight).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns true if no key has a slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Drops every expired entry.
    pub fn purge(&self) {
        let ttl = self.ttl;
        self.slots.lock().retain(|_, slot| {
            // A slot that is locked is being filled right now.
            slot.try_lock()
                .is_none_or(|entry| entry.as_ref().is_some_and(|e| e.written.elapsed() < ttl))
        });
    }

    /// Returns the cached message for `key`, or runs `assemble` and caches
    /// its result. Failures are returned but not cached.
    ///
    /// `assemble` must not ask this cache for the same key.
    ///
    /// # Errors
    ///
    /// Returns the error of `assemble`.
    pub fn get_or_assemble<F>(&self, key: EnvelopeKey, assemble: F) -> Result<Arc<Message>>
    where
        F: FnOnce() -> Result<Arc<Message>>,
    {
        let slot = Arc::clone(self.slots.lock().entry(key).or_default());
        let mut entry = slot.lock();

        if let Some(cached) = entry.as_ref() {
            if cached.written.elapsed() < self.ttl {
                tracing::debug!("envelope cache hit");
                return Ok(Arc::clone(&cached.message));
            }
        }

        tracing::debug!("envelope cache miss");
        let message = assemble()?;
        *entry = Some(Entry {
            written: Instant::now(),
            message: Arc::clone(&message),
        });
        Ok(message)
    }
}

impl Default for EnvelopeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EnvelopeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeCache")
            .field("ttl", &self.ttl)
            .field("slots", &self.len())
            .finish()
    }
}

/// Returns the same message for structurally equal envelopes until the
/// cache entry expires.
#[derive(Debug, Clone)]
pub struct Constant<E> {
    origin: E,
    cache: Arc<EnvelopeCache>,
}

impl<E> Constant<E> {
    /// Wraps an envelope, memoizing into `cache`.
    pub const fn new(origin: E, cache: Arc<EnvelopeCache>) -> Self {
        Self { origin, cache }
    }
}

impl<E: Envelope> Envelope for Constant<E> {
    fn unwrap(&self) -> Result<Arc<Message>> {
        self.cache
            .get_or_assemble(self.origin.key(), || self.origin.unwrap())
    }

    fn key(&self) -> EnvelopeKey {
        EnvelopeKey::decorated("constant", self.origin.key())
    }
}
