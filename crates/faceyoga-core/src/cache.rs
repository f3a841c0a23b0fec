//! Local mirrors of remote collections.
//!
//! The cached copy is never authoritative. It holds the last successful
//! remote read, is replaced wholesale on refetch and patched incrementally
//! with the rows returned by remote writes. Ids always come from the remote
//! side.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// An entity with a remote-assigned identity.
pub trait Identified {
    /// Identifier type.
    type Id: Eq;

    /// The entity's identifier.
    fn id(&self) -> &Self::Id;
}

/// An ordered, id-addressable collection of cached entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Collection<T> {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection with a fresh remote read, keeping its order.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Insert a newly created entity at the front.
    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Insert a newly created entity at the back.
    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    /// Drop every entity.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove every entity matching `predicate`, returning how many were removed.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !predicate(item));
        before - self.items.len()
    }

    /// Number of cached entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in cached order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The cached entities as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Identified> Collection<T> {
    /// Look up an entity by id.
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Replace the entity whose id matches `item`'s id. Returns `false` when
    /// no cached entity has that id, in which case nothing changes.
    pub fn update_by_id(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Remove the entity with the given id. Unknown ids are a no-op.
    pub fn remove_by_id(&mut self, id: &T::Id) -> bool {
        self.remove_where(|item| item.id() == id) > 0
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Collections partitioned by a parent key, such as sections per course.
///
/// Every operation that names a key touches only that key's slice.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedCollection<K: Eq + Hash, T> {
    slices: HashMap<K, Collection<T>>,
}

impl<K: Eq + Hash, T> Default for KeyedCollection<K, T> {
    fn default() -> Self {
        Self {
            slices: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, T> KeyedCollection<K, T> {
    /// An empty keyed collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slice for `key` with a fresh remote read.
    pub fn replace(&mut self, key: K, items: Vec<T>) {
        self.slices.insert(key, Collection::from(items));
    }

    /// Insert a new entity at the front of `key`'s slice.
    pub fn prepend(&mut self, key: K, item: T) {
        self.slices.entry(key).or_default().prepend(item);
    }

    /// Insert a new entity at the back of `key`'s slice.
    pub fn append(&mut self, key: K, item: T) {
        self.slices.entry(key).or_default().append(item);
    }

    /// Empty `key`'s slice while keeping the key known.
    pub fn clear_key(&mut self, key: K) {
        self.slices.insert(key, Collection::new());
    }

    /// Forget `key` and its slice entirely.
    pub fn remove_key<Q>(&mut self, key: &Q) -> Option<Collection<T>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.slices.remove(key)
    }

    /// Remove entities of `key`'s slice matching `predicate`.
    pub fn remove_where<Q>(&mut self, key: &Q, predicate: impl FnMut(&T) -> bool) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.slices
            .get_mut(key)
            .map_or(0, |slice| slice.remove_where(predicate))
    }

    /// The cached slice for `key`, if it was ever loaded.
    pub fn get<Q>(&self, key: &Q) -> Option<&Collection<T>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.slices.get(key)
    }

    /// The cached items for `key`, empty if it was never loaded.
    pub fn items<Q>(&self, key: &Q) -> &[T]
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.slices
            .get(key)
            .map(Collection::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `key` has a cached slice.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.slices.contains_key(key)
    }

    /// Iterate over keys and their slices.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Collection<T>)> {
        self.slices.iter()
    }

    /// Number of keys with a cached slice.
    pub fn key_count(&self) -> usize {
        self.slices.len()
    }

    /// Drop every slice.
    pub fn clear(&mut self) {
        self.slices.clear();
    }
}

impl<K: Eq + Hash, T: Identified> KeyedCollection<K, T> {
    /// Replace the entity with `item`'s id in whichever slice holds it.
    pub fn update_by_id(&mut self, item: T) -> bool
    where
        T: Clone,
    {
        let mut updated = false;
        for slice in self.slices.values_mut() {
            updated |= slice.update_by_id(item.clone());
        }
        updated
    }

    /// Remove the entity with `id` from every slice.
    pub fn remove_by_id(&mut self, id: &T::Id) -> bool {
        let mut removed = false;
        for slice in self.slices.values_mut() {
            removed |= slice.remove_by_id(id);
        }
        removed
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        payload: String,
    }

    impl Identified for Item {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn arb_items() -> impl Strategy<Value = Vec<Item>> {
        proptest::collection::btree_set(0u32..500, 0..40).prop_map(|ids| {
            ids.into_iter()
                .map(|id| Item {
                    id,
                    payload: format!("row-{id}"),
                })
                .collect()
        })
    }

    proptest! {
        /// Updating id X changes exactly the item with id X.
        #[test]
        fn prop_update_touches_only_matching_item(items in arb_items(), pick in any::<prop::sample::Index>()) {
            prop_assume!(!items.is_empty());
            let target = items[pick.index(items.len())].id;

            let mut collection = Collection::from(items.clone());
            let replacement = Item { id: target, payload: "updated".to_string() };
            prop_assert!(collection.update_by_id(replacement.clone()));

            for (before, after) in items.iter().zip(collection.iter()) {
                if before.id == target {
                    prop_assert_eq!(after, &replacement);
                } else {
                    prop_assert_eq!(after, before);
                }
            }
        }

        /// Deleting removes exactly one item, unknown ids change nothing.
        #[test]
        fn prop_remove_by_id(items in arb_items(), id in 0u32..600) {
            let mut collection = Collection::from(items.clone());
            let present = items.iter().any(|item| item.id == id);

            prop_assert_eq!(collection.remove_by_id(&id), present);
            let expected = if present { items.len() - 1 } else { items.len() };
            prop_assert_eq!(collection.len(), expected);
            prop_assert!(collection.get(&id).is_none());
        }

        /// Writing one key's slice never changes another key's slice.
        #[test]
        fn prop_keyed_isolation(a in arb_items(), b in arb_items(), fresh in arb_items()) {
            let mut keyed: KeyedCollection<&'static str, Item> = KeyedCollection::new();
            keyed.replace("a", a);
            keyed.replace("b", b.clone());

            keyed.replace("a", fresh.clone());
            keyed.append("a", Item { id: 9999, payload: "new".to_string() });

            prop_assert_eq!(keyed.items("b"), b.as_slice());
            prop_assert_eq!(keyed.items("a").len(), fresh.len() + 1);
        }
    }
}
