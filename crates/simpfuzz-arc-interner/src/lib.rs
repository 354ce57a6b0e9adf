//! Global `Arc`-based hash-consing for immutable IR nodes.
//!
//! Two interned values are structurally equal iff they point to the same allocation, so equality
//! and hashing of an [`Interned`] are pointer operations. Entries are evicted from the global map
//! when the last handle outside the map is dropped.

use std::{
    fmt::{self, Debug, Display},
    hash::{BuildHasherDefault, Hash, Hasher},
    ops::Deref,
    sync::{Arc, OnceLock},
};

use dashmap::DashMap;
use rustc_hash::FxHasher;

type InternMap<T> = DashMap<Arc<T>, (), BuildHasherDefault<FxHasher>>;

pub struct Interned<T: Internable> {
    arc: Arc<T>,
}

impl<T: Internable> Interned<T> {
    pub fn new(obj: T) -> Self {
        let map = T::storage().get();
        if let Some(entry) = map.get(&obj) {
            return Self { arc: entry.key().clone() };
        }
        // Another handle may have raced us between the lookup and the insertion, in which case
        // `entry` hands back the key that is already in the map. `fresh` outlives the shard guard
        // so a rejected object drops its children without holding the lock.
        let fresh = Arc::new(obj);
        let arc = map.entry(Arc::clone(&fresh)).or_insert(()).key().clone();
        drop(fresh);
        Self { arc }
    }
}

impl<T: Internable> Drop for Interned<T> {
    #[inline]
    fn drop(&mut self) {
        // Only `self` and the global map point to the object.
        if Arc::strong_count(&self.arc) == 2 {
            self.drop_slow();
        }
    }
}

impl<T: Internable> Interned<T> {
    #[cold]
    fn drop_slow(&mut self) {
        let map = T::storage().get();
        // The removed key is dropped after the shard lock is released, so dropping its children
        // can re-enter the map safely.
        let removed = map.remove_if(&*self.arc, |key, _| Arc::strong_count(key) == 2);
        drop(removed);
    }
}

/// Compares interned values using pointer equality.
impl<T: Internable> PartialEq for Interned<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.arc, &other.arc)
    }
}

impl<T: Internable> Eq for Interned<T> {}

impl<T: Internable> Hash for Interned<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(Arc::as_ptr(&self.arc) as usize);
    }
}

impl<T: PartialOrd + Internable> PartialOrd for Interned<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        <T as PartialOrd>::partial_cmp(&self.arc, &other.arc)
    }
}

impl<T: Ord + Internable> Ord for Interned<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        <T as Ord>::cmp(&self.arc, &other.arc)
    }
}

impl<T: Internable> AsRef<T> for Interned<T> {
    #[inline]
    fn as_ref(&self) -> &T {
        &self.arc
    }
}

impl<T: Internable> Deref for Interned<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.arc
    }
}

impl<T: Internable> Clone for Interned<T> {
    fn clone(&self) -> Self {
        Self { arc: self.arc.clone() }
    }
}

impl<T: Debug + Internable> Debug for Interned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (*self.arc).fmt(f)
    }
}

impl<T: Display + Internable> Display for Interned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (*self.arc).fmt(f)
    }
}

pub struct InternStorage<T> {
    map: OnceLock<InternMap<T>>,
}

impl<T> InternStorage<T> {
    pub const fn new() -> Self {
        Self { map: OnceLock::new() }
    }
}

impl<T: Internable> InternStorage<T> {
    fn get(&self) -> &InternMap<T> {
        self.map.get_or_init(DashMap::default)
    }
}

pub trait Internable: Sized + Hash + Eq + Send + Sync + 'static {
    fn storage() -> &'static InternStorage<Self>;
}

/// Implements `Internable` for a given list of types, making them usable with `Interned`.
#[macro_export]
#[doc(hidden)]
macro_rules! _impl_internable {
    ( $($t:ty),+ $(,)? ) => { $(
        impl $crate::Internable for $t {
            fn storage() -> &'static $crate::InternStorage<Self> {
                static STORAGE: $crate::InternStorage<$t> = $crate::InternStorage::new();
                &STORAGE
            }
        }
    )+ };
}
pub use crate::_impl_internable as impl_internable;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(PartialEq, Eq, Hash, Debug)]
    struct Node(u32, &'static str);

    impl_internable!(Node);

    #[test]
    fn equal_values_share_allocation() {
        let a = Interned::new(Node(1, "x"));
        let b = Interned::new(Node(1, "x"));
        let c = Interned::new(Node(2, "x"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(std::ptr::eq(&*a, &*b));
    }

    #[derive(PartialEq, Eq, Hash, Debug)]
    struct Pair(Interned<Node>, u32);

    impl_internable!(Pair);

    #[test]
    fn concurrent_interning_agrees() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..2000)
                        .map(|i| Interned::new(Pair(Interned::new(Node(i % 7, "race")), i % 5)))
                        .last()
                        .unwrap()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn last_handle_evicts_entry() {
        let a = Interned::new(Node(42, "evict"));
        let b = a.clone();
        drop(a);
        assert_eq!(b.0, 42);
        drop(b);
        let again = Interned::new(Node(42, "evict"));
        assert_eq!(again.1, "evict");
    }
}
