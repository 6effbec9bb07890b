use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

use parking_lot::Mutex;

use crate::{IndexedMap, RandomSource};

struct State<KeyT, ValueT, SourceT, HasherT> {
    map: IndexedMap<KeyT, ValueT, HasherT>,
    source: SourceT,
}

impl<KeyT, ValueT, SourceT, HasherT> State<KeyT, ValueT, SourceT, HasherT>
where
    SourceT: RandomSource,
{
    // `None` when empty; the source is never asked for an index out of nothing.
    #[inline(always)]
    fn draw(&mut self) -> Option<usize> {
        let len = self.map.len();
        if len == 0 {
            return None;
        }
        let position = self.source.index(len);
        assert!(
            position < len,
            "random source returned position {} for length {}",
            position,
            len
        );
        return Some(position);
    }
}

/// Thread-safe map with uniform random key selection.
///
/// All state, including the random source, sits behind one mutex, so every
/// call is linearizable and the source only needs `Send`, not `Sync`.
/// Reads and writes take the same lock.
///
/// Closures passed to [`get_with`](Self::get_with), [`update`](Self::update),
/// [`random_with`](Self::random_with) and [`retain`](Self::retain) run while
/// the lock is held and must not call back into the same map.
pub struct RandMap<KeyT, ValueT, SourceT, HasherT = RandomState> {
    state: Mutex<State<KeyT, ValueT, SourceT, HasherT>>,
}

impl<KeyT, ValueT, SourceT> RandMap<KeyT, ValueT, SourceT, RandomState> {
    pub fn new(source: SourceT) -> Self {
        Self::with_hasher(source, RandomState::new())
    }

    pub fn with_capacity(capacity: usize, source: SourceT) -> Self {
        Self::with_capacity_and_hasher(capacity, source, RandomState::new())
    }
}

impl<KeyT, ValueT, SourceT> RandMap<KeyT, ValueT, SourceT, RandomState>
where
    KeyT: Eq + Hash + Clone,
{
    pub fn from_iter_with_source(
        items: impl IntoIterator<Item = (KeyT, ValueT)>,
        source: SourceT,
    ) -> Self {
        let mut map = IndexedMap::new();
        map.extend(items);
        Self::from_parts(map, source)
    }
}

impl<KeyT, ValueT, SourceT, HasherT> Default for RandMap<KeyT, ValueT, SourceT, HasherT>
where
    SourceT: Default,
    HasherT: Default,
{
    fn default() -> Self {
        Self::with_hasher(SourceT::default(), HasherT::default())
    }
}

impl<KeyT, ValueT, SourceT, HasherT> RandMap<KeyT, ValueT, SourceT, HasherT> {
    pub fn with_hasher(source: SourceT, hasher: HasherT) -> Self {
        Self::from_parts(IndexedMap::with_hasher(hasher), source)
    }

    pub fn with_capacity_and_hasher(capacity: usize, source: SourceT, hasher: HasherT) -> Self {
        Self::from_parts(
            IndexedMap::with_capacity_and_hasher(capacity, hasher),
            source,
        )
    }

    pub fn from_parts(map: IndexedMap<KeyT, ValueT, HasherT>, source: SourceT) -> Self {
        Self {
            state: Mutex::new(State { map, source }),
        }
    }

    /// Unwraps into the unsynchronized map and the source.
    pub fn into_parts(self) -> (IndexedMap<KeyT, ValueT, HasherT>, SourceT) {
        let state = self.state.into_inner();
        (state.map, state.source)
    }

    pub fn len(&self) -> usize {
        self.state.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().map.is_empty()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        let removed = state.map.len();
        state.map.clear();
        tracing::trace!(removed, "cleared rand map");
    }
}

impl<KeyT, ValueT, SourceT, HasherT> RandMap<KeyT, ValueT, SourceT, HasherT>
where
    KeyT: Eq + Hash + Clone,
    HasherT: BuildHasher,
{
    /// Inserts `value` under `key`, overwriting any existing value.
    /// Returns the value that was replaced.
    pub fn insert(&self, key: KeyT, value: ValueT) -> Option<ValueT> {
        self.state.lock().map.insert(key, value)
    }

    pub fn extend(&self, items: impl IntoIterator<Item = (KeyT, ValueT)>) {
        self.state.lock().map.extend(items);
    }

    pub fn contains_key<QueryT>(&self, key: &QueryT) -> bool
    where
        KeyT: Borrow<QueryT>,
        QueryT: Hash + Eq + ?Sized,
    {
        self.state.lock().map.contains_key(key)
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get<QueryT>(&self, key: &QueryT) -> Option<ValueT>
    where
        KeyT: Borrow<QueryT>,
        QueryT: Hash + Eq + ?Sized,
        ValueT: Clone,
    {
        self.state.lock().map.get(key).cloned()
    }

    pub fn get_with<QueryT, ResultT>(
        &self,
        key: &QueryT,
        f: impl FnOnce(&ValueT) -> ResultT,
    ) -> Option<ResultT>
    where
        KeyT: Borrow<QueryT>,
        QueryT: Hash + Eq + ?Sized,
    {
        self.state.lock().map.get(key).map(f)
    }

    /// Mutates the value under `key` in place. Returns `false` if absent.
    pub fn update<QueryT>(&self, key: &QueryT, f: impl FnOnce(&mut ValueT)) -> bool
    where
        KeyT: Borrow<QueryT>,
        QueryT: Hash + Eq + ?Sized,
    {
        match self.state.lock().map.get_mut(key) {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        }
    }

    /// Removes `key` and returns its value.
    pub fn pop<QueryT>(&self, key: &QueryT) -> Option<ValueT>
    where
        KeyT: Borrow<QueryT>,
        QueryT: Hash + Eq + ?Sized,
    {
        let mut state = self.state.lock();
        let value = state.map.remove(key)?;
        tracing::trace!(len = state.map.len(), "popped entry by key");
        return Some(value);
    }

    pub fn retain(&self, f: impl FnMut(&KeyT, &mut ValueT) -> bool) {
        let mut state = self.state.lock();
        let before = state.map.len();
        state.map.retain(f);
        tracing::trace!(
            removed = before - state.map.len(),
            len = state.map.len(),
            "retained entries"
        );
    }

    /// Walks every key and checks that the key list and the entries agree.
    /// O(n); meant for tests.
    pub fn is_consistent(&self) -> bool {
        self.state.lock().map.is_consistent()
    }

    /// Snapshot of the keys in their current list order.
    pub fn keys(&self) -> Vec<KeyT> {
        self.state.lock().map.keys().to_vec()
    }
}

impl<KeyT, ValueT, SourceT, HasherT> RandMap<KeyT, ValueT, SourceT, HasherT>
where
    KeyT: Eq + Hash + Clone,
    HasherT: BuildHasher,
    SourceT: RandomSource,
{
    /// Returns a clone of a randomly chosen entry, or `None` when empty.
    /// The source is called once with the current length.
    pub fn random(&self) -> Option<(KeyT, ValueT)>
    where
        ValueT: Clone,
    {
        self.random_with(|key, value| (key.clone(), value.clone()))
    }

    pub fn random_with<ResultT>(
        &self,
        f: impl FnOnce(&KeyT, &ValueT) -> ResultT,
    ) -> Option<ResultT> {
        let mut state = self.state.lock();
        let position = state.draw()?;
        let (key, value) = state.map.get_index(position)?;
        return Some(f(key, value));
    }

    /// Removes and returns a randomly chosen entry, or `None` when empty.
    pub fn pop_random(&self) -> Option<(KeyT, ValueT)> {
        let mut state = self.state.lock();
        let position = state.draw()?;
        let entry = state.map.swap_remove_at(position);
        tracing::trace!(position, len = state.map.len(), "popped random entry");
        return entry;
    }

    /// Removes up to `count` random entries without replacement, under a
    /// single lock hold.
    pub fn pop_random_n(&self, count: usize) -> Vec<(KeyT, ValueT)> {
        let mut state = self.state.lock();
        let mut entries = Vec::with_capacity(count.min(state.map.len()));
        while entries.len() < count {
            let Some(position) = state.draw() else {
                break;
            };
            if let Some(entry) = state.map.swap_remove_at(position) {
                entries.push(entry);
            }
        }
        tracing::trace!(
            popped = entries.len(),
            len = state.map.len(),
            "popped random entries"
        );
        entries
    }

    /// Empties the map, returning every entry in the order the source picks them.
    pub fn drain_random(&self) -> Vec<(KeyT, ValueT)> {
        self.pop_random_n(usize::MAX)
    }
}

impl<KeyT, ValueT, SourceT, HasherT> std::fmt::Debug for RandMap<KeyT, ValueT, SourceT, HasherT>
where
    KeyT: std::fmt::Debug,
    ValueT: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.state.lock().map, f)
    }
}
