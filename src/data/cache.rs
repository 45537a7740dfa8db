use std::hash::{DefaultHasher, Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::filter::FilterSet;

// ---------------------------------------------------------------------------
// Memoization of loader and pipeline results
// ---------------------------------------------------------------------------

/// Identity of an upload: a hash of its raw bytes.
pub fn content_key(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// Cache key for one pipeline run over one upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub source: u64,
    pub filters: FilterSet,
}

/// Hit/miss counters, shown in the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
}

/// Bounded LRU memo of shared results.
///
/// Every memoized function is pure, so an evicted entry is simply recomputed.
pub struct Memo<K: Hash + Eq, V> {
    entries: LruCache<K, Arc<V>>,
    stats: MemoStats,
}

impl<K: Hash + Eq, V> Memo<K, V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Memo {
            entries: LruCache::new(capacity),
            stats: MemoStats::default(),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    /// Failures are not cached.
    pub fn get_or_try_insert<E>(
        &mut self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(hit) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Ok(Arc::clone(hit));
        }
        self.stats.misses += 1;
        let value = Arc::new(compute()?);
        self.entries.put(key, Arc::clone(&value));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> MemoStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lookup_hits() {
        let mut memo: Memo<u64, String> = Memo::new(4);
        let mut calls = 0;
        for _ in 0..3 {
            let v = memo
                .get_or_try_insert(7, || {
                    calls += 1;
                    Ok::<_, ()>("seven".to_string())
                })
                .unwrap();
            assert_eq!(*v, "seven");
        }
        assert_eq!(calls, 1);
        assert_eq!(memo.stats(), MemoStats { hits: 2, misses: 1 });
    }

    #[test]
    fn errors_are_not_cached() {
        let mut memo: Memo<u64, u32> = Memo::new(4);
        assert!(memo.get_or_try_insert(1, || Err("boom")).is_err());
        assert_eq!(memo.len(), 0);
        assert_eq!(*memo.get_or_try_insert(1, || Ok::<_, &str>(5)).unwrap(), 5);
    }

    #[test]
    fn capacity_evicts_least_recent() {
        let mut memo: Memo<u64, u64> = Memo::new(2);
        for k in [1, 2, 3] {
            memo.get_or_try_insert(k, || Ok::<_, ()>(k * 10)).unwrap();
        }
        assert_eq!(memo.len(), 2);
        let mut recomputed = false;
        memo.get_or_try_insert(1, || {
            recomputed = true;
            Ok::<_, ()>(10)
        })
        .unwrap();
        assert!(recomputed);
    }

    #[test]
    fn content_key_is_stable() {
        assert_eq!(content_key(b"age;job\n30;admin\n"), content_key(b"age;job\n30;admin\n"));
        assert_ne!(content_key(b"age;job\n30;admin\n"), content_key(b"age;job\n31;admin\n"));
    }
}
