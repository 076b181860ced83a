//! Object-URL style registry for in-memory blob resources
//!
//! Every segment and final clip blob gets a `blob:` URL while it is shown or
//! downloadable. URLs must be released explicitly so repeated runs do not
//! accumulate memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};
use uuid::Uuid;

use crate::domain::model::{BlobUrl, MediaBlob};
use crate::ports::ReleaseHook;

const URL_SCHEME: &str = "blob:cortefacil/";

/// Thread-safe registry of live blob URLs
#[derive(Clone, Default)]
pub struct BlobRegistry {
    inner: Arc<Mutex<RegistryInner>>,
    hooks: Arc<Mutex<Vec<Arc<dyn ReleaseHook>>>>,
}

#[derive(Default)]
struct RegistryInner {
    live: HashMap<BlobUrl, usize>,
    registered: u64,
    released: u64,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook called on every release
    pub fn add_hook(&self, hook: Arc<dyn ReleaseHook>) {
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.push(hook);
        }
    }

    /// Create a URL for a blob
    pub fn register(&self, blob: &MediaBlob) -> BlobUrl {
        let url = BlobUrl(format!("{}{}", URL_SCHEME, Uuid::new_v4()));
        if let Ok(mut inner) = self.inner.lock() {
            inner.live.insert(url.clone(), blob.len());
            inner.registered += 1;
        }
        trace!(url = %url, bytes = blob.len(), "Registered blob");
        url
    }

    /// Release a URL. Returns false when it was not live.
    pub fn release(&self, url: &BlobUrl) -> bool {
        let removed = match self.inner.lock() {
            Ok(mut inner) => {
                let removed = inner.live.remove(url).is_some();
                if removed {
                    inner.released += 1;
                }
                removed
            }
            Err(_) => false,
        };

        if removed {
            debug!(url = %url, "Released blob");
            self.notify_hooks(url);
        }
        removed
    }

    /// Release every URL in the list, returning how many were live
    pub fn release_all<'a, I>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = &'a BlobUrl>,
    {
        urls.into_iter().filter(|url| self.release(url)).count()
    }

    pub fn is_live(&self, url: &BlobUrl) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.live.contains_key(url))
            .unwrap_or(false)
    }

    pub fn live_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.live.len()).unwrap_or(0)
    }

    /// Bytes held by live blobs
    pub fn live_bytes(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.live.values().sum())
            .unwrap_or(0)
    }

    pub fn registered_count(&self) -> u64 {
        self.inner.lock().map(|inner| inner.registered).unwrap_or(0)
    }

    pub fn released_count(&self) -> u64 {
        self.inner.lock().map(|inner| inner.released).unwrap_or(0)
    }

    fn notify_hooks(&self, url: &BlobUrl) {
        if let Ok(hooks) = self.hooks.lock() {
            for hook in hooks.iter() {
                hook.on_release(url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHook(AtomicUsize);

    impl ReleaseHook for CountingHook {
        fn on_release(&self, _url: &BlobUrl) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn blob(size: usize) -> MediaBlob {
        MediaBlob::new(vec![0; size], "video/mp4")
    }

    #[test]
    fn test_register_and_release() {
        let registry = BlobRegistry::new();
        let url = registry.register(&blob(10));

        assert!(url.0.starts_with(URL_SCHEME));
        assert!(registry.is_live(&url));
        assert_eq!(registry.live_bytes(), 10);

        assert!(registry.release(&url));
        assert!(!registry.release(&url));
        assert!(!registry.is_live(&url));
        assert_eq!(registry.registered_count(), 1);
        assert_eq!(registry.released_count(), 1);
    }

    #[test]
    fn test_urls_are_unique() {
        let registry = BlobRegistry::new();
        let a = registry.register(&blob(1));
        let b = registry.register(&blob(1));
        assert_ne!(a, b);
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn test_hooks_fire_once_per_release() {
        let registry = BlobRegistry::new();
        let hook = Arc::new(CountingHook(AtomicUsize::new(0)));
        registry.add_hook(hook.clone());

        let urls = vec![registry.register(&blob(1)), registry.register(&blob(2))];
        assert_eq!(registry.release_all(&urls), 2);
        assert_eq!(registry.release_all(&urls), 0);
        assert_eq!(hook.0.load(Ordering::SeqCst), 2);
        assert_eq!(registry.live_count(), 0);
    }
}
