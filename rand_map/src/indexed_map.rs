use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map::{Entry, RandomState};
use std::hash::{BuildHasher, Hash};

/// Hash map paired with a dense key list.
///
/// Every key lives in `key_array` exactly once, and its entry in `key_to_item`
/// records where. Removal swap-removes from `key_array` and patches the
/// position of the key that was moved into the hole, so removal by key and
/// removal by position are both O(1).
///
/// This type is not synchronized; [`crate::RandMap`] wraps it in a mutex.
pub struct IndexedMap<KeyT, ValueT, HasherT = RandomState> {
    key_to_item: HashMap<KeyT, (usize, ValueT), HasherT>,
    key_array: Vec<KeyT>,
}

impl<KeyT, ValueT> IndexedMap<KeyT, ValueT, RandomState> {
    #[inline(always)]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<KeyT, ValueT, HasherT> Default for IndexedMap<KeyT, ValueT, HasherT>
where
    HasherT: Default,
{
    fn default() -> Self {
        Self::with_hasher(HasherT::default())
    }
}

impl<KeyT, ValueT, HasherT> Clone for IndexedMap<KeyT, ValueT, HasherT>
where
    KeyT: Clone,
    ValueT: Clone,
    HasherT: Clone,
{
    fn clone(&self) -> Self {
        Self {
            key_to_item: self.key_to_item.clone(),
            key_array: self.key_array.clone(),
        }
    }
}

impl<KeyT, ValueT, HasherT> IndexedMap<KeyT, ValueT, HasherT> {
    #[inline(always)]
    pub fn with_hasher(hasher: HasherT) -> Self {
        Self {
            key_to_item: HashMap::with_hasher(hasher),
            key_array: Vec::default(),
        }
    }

    #[inline(always)]
    pub fn with_capacity_and_hasher(capacity: usize, hasher: HasherT) -> Self {
        Self {
            key_to_item: HashMap::with_capacity_and_hasher(capacity, hasher),
            key_array: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        debug_assert!(self.key_array.len() == self.key_to_item.len());
        self.key_array.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.key_array.is_empty()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.key_to_item.capacity().min(self.key_array.capacity())
    }

    /// Keys in their current list order. The order is unspecified: removals
    /// move the last key into the freed position.
    #[inline(always)]
    pub fn keys(&self) -> &[KeyT] {
        &self.key_array
    }

    #[inline(always)]
    pub fn key_at(&self, position: usize) -> Option<&KeyT> {
        self.key_array.get(position)
    }

    pub fn clear(&mut self) {
        self.key_to_item.clear();
        self.key_array.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyT, &ValueT)> + Clone {
        self.key_to_item.iter().map(|(key, (_, value))| (key, value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&KeyT, &mut ValueT)> {
        self.key_to_item
            .iter_mut()
            .map(|(key, (_, value))| (key, value))
    }
}

impl<KeyT, ValueT, HasherT> IndexedMap<KeyT, ValueT, HasherT>
where
    KeyT: Eq + Hash + Clone,
    HasherT: BuildHasher,
{
    #[inline(always)]
    pub fn contains_key<QueryT>(&self, key: &QueryT) -> bool
    where
        KeyT: Borrow<QueryT>,
        QueryT: Hash + Eq + ?Sized,
    {
        self.key_to_item.contains_key(key)
    }

    #[inline(always)]
    pub fn get<QueryT>(&self, key: &QueryT) -> Option<&ValueT>
    where
        KeyT: Borrow<QueryT>,
        QueryT: Hash + Eq + ?Sized,
    {
        self.key_to_item.get(key).map(|(_, value)| value)
    }

    #[inline(always)]
    pub fn get_mut<QueryT>(&mut self, key: &QueryT) -> Option<&mut ValueT>
    where
        KeyT: Borrow<QueryT>,
        QueryT: Hash + Eq + ?Sized,
    {
        self.key_to_item.get_mut(key).map(|(_, value)| value)
    }

    #[inline(always)]
    pub fn get_index(&self, position: usize) -> Option<(&KeyT, &ValueT)> {
        let key = self.key_array.get(position)?;
        match self.key_to_item.get(key) {
            Some((stored_position, value)) => {
                debug_assert!(*stored_position == position);
                Some((key, value))
            }
            None => unreachable!("key list holds a key with no entry"),
        }
    }

    /// Inserts or overwrites. A new key is appended to the key list; an
    /// existing key keeps its position. Returns the previous value.
    pub fn insert(&mut self, key: KeyT, value: ValueT) -> Option<ValueT> {
        match self.key_to_item.entry(key) {
            Entry::Occupied(mut occupied) => {
                debug_assert!(self.key_array[occupied.get().0] == *occupied.key());
                return Some(std::mem::replace(&mut occupied.get_mut().1, value));
            }
            Entry::Vacant(vacant) => {
                let position = self.key_array.len();
                self.key_array.push(vacant.key().clone());
                vacant.insert((position, value));
                return None;
            }
        }
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = (KeyT, ValueT)>) {
        for (key, value) in items {
            self.insert(key, value);
        }
    }

    pub fn remove<QueryT>(&mut self, key: &QueryT) -> Option<ValueT>
    where
        KeyT: Borrow<QueryT>,
        QueryT: Hash + Eq + ?Sized,
    {
        let (position, value) = self.key_to_item.remove(key)?;
        debug_assert!(<KeyT as Borrow<QueryT>>::borrow(&self.key_array[position]) == key);
        self.key_array.swap_remove(position);
        self.relink_moved_key(position);
        return Some(value);
    }

    /// Removes the entry whose key sits at `position` in the key list.
    /// The last key takes its place.
    pub fn swap_remove_at(&mut self, position: usize) -> Option<(KeyT, ValueT)> {
        if position >= self.key_array.len() {
            return None;
        }
        let key = self.key_array.swap_remove(position);
        let value = match self.key_to_item.remove(&key) {
            Some((stored_position, value)) => {
                debug_assert!(stored_position == position);
                value
            }
            None => unreachable!("key list holds a key with no entry"),
        };
        self.relink_moved_key(position);
        return Some((key, value));
    }

    pub fn retain(&mut self, mut f: impl FnMut(&KeyT, &mut ValueT) -> bool) {
        for position in (0..self.key_array.len()).rev() {
            let key = &self.key_array[position];
            let keep = match self.key_to_item.get_mut(key) {
                Some((_, value)) => f(key, value),
                None => unreachable!("key list holds a key with no entry"),
            };
            if !keep {
                self.swap_remove_at(position);
            }
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.key_to_item.reserve(additional);
        self.key_array.reserve(additional);
    }

    pub fn shrink_to_fit(&mut self) {
        self.key_to_item.shrink_to_fit();
        self.key_array.shrink_to_fit();
    }

    // After `swap_remove(position)`, the key now at `position` (if any) was
    // the last one; its recorded position still points past the end.
    #[inline(always)]
    fn relink_moved_key(&mut self, position: usize) {
        if position == self.key_array.len() {
            return;
        }
        match self.key_to_item.get_mut(&self.key_array[position]) {
            Some((moved_position, _)) => {
                debug_assert!(*moved_position == self.key_array.len());
                *moved_position = position;
            }
            None => unreachable!("key list holds a key with no entry"),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.key_array.len() == self.key_to_item.len()
            && self.key_array.iter().enumerate().all(|(position, key)| {
                self.key_to_item
                    .get(key)
                    .is_some_and(|(stored_position, _)| *stored_position == position)
            })
    }
}

impl<KeyT, ValueT, HasherT> std::fmt::Debug for IndexedMap<KeyT, ValueT, HasherT>
where
    KeyT: std::fmt::Debug,
    ValueT: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
