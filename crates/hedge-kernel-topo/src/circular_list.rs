//! An owning, intrusively-linked circular list of topology records.
//!
//! The natural pointer-chasing implementation of this container is an
//! intrusive doubly-linked ring threaded through each record's
//! `linked_prev`/`linked_next` fields, with raw pointers for the ring
//! links. In an arena-based, generational-index design the same shape is
//! obtained by storing records in a [`slotmap::SlotMap`] and threading the
//! ring through the map's own keys instead of pointers: deleting a record
//! invalidates its slot's generation, which a raw-pointer version would
//! otherwise need a manual invalidation-and-sweep pass to simulate safely.
//!
//! `CircularList` owns its members: dropping the list (or calling
//! [`CircularList::clear`]) drops every record still linked into it.

use slotmap::{Key, SlotMap};

struct Node<K, V> {
    value: V,
    linked_prev: K,
    linked_next: K,
}

/// An intrusively-linked, owning circular list of `V`, keyed by `K`.
///
/// `append` is O(1). `remove` is O(1) given a key and returns the key of
/// the next surviving element (or `None` if the list became empty).
/// Iteration follows the canonical `head, head.next, ... until head again`
/// walk over a non-empty ring.
pub struct CircularList<K: Key, V> {
    slots: SlotMap<K, Node<K, V>>,
    head: Option<K>,
}

impl<K: Key, V> CircularList<K, V> {
    /// An empty list.
    pub fn new() -> Self {
        CircularList {
            slots: SlotMap::with_key(),
            head: None,
        }
    }

    /// Number of live elements.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The head element's key, if the list is non-empty.
    pub fn head(&self) -> Option<K> {
        self.head
    }

    /// Whether `key` currently identifies a live element of this list.
    pub fn contains(&self, key: K) -> bool {
        self.slots.contains_key(key)
    }

    /// Borrow the value for `key`.
    pub fn get(&self, key: K) -> Option<&V> {
        self.slots.get(key).map(|n| &n.value)
    }

    /// Mutably borrow the value for `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.slots.get_mut(key).map(|n| &mut n.value)
    }

    /// Index-panicking borrow, for call sites that already know `key` is live.
    pub fn index(&self, key: K) -> &V {
        &self.slots[key].value
    }

    /// Index-panicking mutable borrow, for call sites that already know
    /// `key` is live.
    pub fn index_mut(&mut self, key: K) -> &mut V {
        &mut self.slots[key].value
    }

    /// Append a new element at the tail (i.e. just before the head, which
    /// does not move), returning its key. Becomes the head if the list was
    /// empty.
    pub fn append(&mut self, value: V) -> K {
        let key = self.slots.insert_with_key(|k| Node {
            value,
            linked_prev: k,
            linked_next: k,
        });
        match self.head {
            None => {
                self.head = Some(key);
            }
            Some(head) => {
                let tail = self.slots[head].linked_prev;
                self.slots[tail].linked_next = key;
                self.slots[key].linked_prev = tail;
                self.slots[key].linked_next = head;
                self.slots[head].linked_prev = key;
            }
        }
        key
    }

    /// Remove `key` from the ring and drop its value. Returns the key of
    /// the next surviving element, or `None` if the list is now empty.
    /// A no-op (returning `None`) if `key` was not present.
    pub fn remove(&mut self, key: K) -> Option<K> {
        let node = self.slots.remove(key)?;
        if self.slots.is_empty() {
            self.head = None;
            return None;
        }
        let prev = node.linked_prev;
        let next = node.linked_next;
        self.slots[prev].linked_next = next;
        self.slots[next].linked_prev = prev;
        if self.head == Some(key) {
            self.head = Some(next);
        }
        Some(next)
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
    }

    /// The key following `key` in ring order.
    pub fn next_of(&self, key: K) -> Option<K> {
        self.slots.get(key).map(|n| n.linked_next)
    }

    /// The key preceding `key` in ring order.
    pub fn prev_of(&self, key: K) -> Option<K> {
        self.slots.get(key).map(|n| n.linked_prev)
    }

    /// Splice `other`'s ring into `self` in O(1) and empty `other`.
    ///
    /// Because the two lists are backed by independent [`SlotMap`]s, the
    /// elements moving from `other` to `self` are assigned fresh keys in
    /// `self`'s key space — there is no way to preserve a `SlotMap` key
    /// across two different maps. The returned table maps each of
    /// `other`'s old keys to its new key in `self`, so that the caller can
    /// rewrite any foreign references (e.g. an edge's `twin` pointing at a
    /// moved vertex) that lived outside this list.
    pub fn concat(&mut self, other: &mut CircularList<K, V>) -> std::collections::HashMap<K, K> {
        let mut remap = std::collections::HashMap::new();
        if other.is_empty() {
            return remap;
        }
        let old_head = other.head.take().unwrap();
        let old_keys = other.ring_keys_from(old_head);
        other.slots.clear();

        let mut new_keys = Vec::with_capacity(old_keys.len());
        for (old_key, value) in old_keys {
            let new_key = self.append(value);
            remap.insert(old_key, new_key);
            new_keys.push(new_key);
        }
        let _ = new_keys;
        remap
    }

    /// Collect `(old_key, value)` pairs for every element reachable from
    /// `start` in ring order, destructively draining the Node wrapper.
    fn ring_keys_from(&mut self, start: K) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut current = start;
        loop {
            let next = self.slots[current].linked_next;
            let node = self.slots.remove(current).expect("ring key must be live");
            out.push((current, node.value));
            if next == start {
                break;
            }
            current = next;
        }
        out
    }

    /// Iterate values in ring order starting at the head.
    pub fn iter(&self) -> CircularListIter<'_, K, V> {
        CircularListIter {
            list: self,
            start: self.head,
            current: self.head,
            started: false,
        }
    }

    /// Iterate keys in ring order starting at the head.
    pub fn keys(&self) -> CircularListKeyIter<'_, K, V> {
        CircularListKeyIter {
            inner: self.iter(),
        }
    }

    /// Debug invariant: every linked_prev/linked_next pair is mutually
    /// consistent and the reported size equals the counted ring length.
    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) -> bool {
        if self.is_empty() {
            return self.head.is_none();
        }
        let head = match self.head {
            Some(h) => h,
            None => return false,
        };
        let mut count = 0usize;
        let mut current = head;
        loop {
            let node = match self.slots.get(current) {
                Some(n) => n,
                None => return false,
            };
            if self.slots[node.linked_next].linked_prev != current {
                return false;
            }
            if self.slots[node.linked_prev].linked_next != current {
                return false;
            }
            count += 1;
            current = node.linked_next;
            if current == head {
                break;
            }
            if count > self.slots.len() {
                return false; // cycle doesn't close within the known size
            }
        }
        count == self.slots.len()
    }
}

impl<K: Key, V> Default for CircularList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over values of a [`CircularList`] in ring order.
pub struct CircularListIter<'a, K: Key, V> {
    list: &'a CircularList<K, V>,
    start: Option<K>,
    current: Option<K>,
    started: bool,
}

impl<'a, K: Key, V> Iterator for CircularListIter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        if self.started && Some(current) == self.start {
            return None;
        }
        self.started = true;
        self.current = self.list.slots.get(current).map(|n| n.linked_next);
        Some((current, &self.list.slots[current].value))
    }
}

/// Iterator over keys of a [`CircularList`] in ring order.
pub struct CircularListKeyIter<'a, K: Key, V> {
    inner: CircularListIter<'a, K, V>,
}

impl<'a, K: Key, V> Iterator for CircularListKeyIter<'a, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    slotmap::new_key_type! {
        struct TestKey;
    }

    #[test]
    fn append_and_size() {
        let mut list: CircularList<TestKey, i32> = CircularList::new();
        assert!(list.is_empty());
        let a = list.append(1);
        let b = list.append(2);
        let c = list.append(3);
        assert_eq!(list.size(), 3);
        assert_eq!(list.head(), Some(a));
        assert_eq!(list.next_of(a), Some(b));
        assert_eq!(list.next_of(b), Some(c));
        assert_eq!(list.next_of(c), Some(a));
        assert!(list.check_invariants());
    }

    #[test]
    fn iterate_in_ring_order() {
        let mut list: CircularList<TestKey, i32> = CircularList::new();
        list.append(1);
        list.append(2);
        list.append(3);
        let values: Vec<i32> = list.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn remove_head_advances_head() {
        let mut list: CircularList<TestKey, i32> = CircularList::new();
        let a = list.append(1);
        let b = list.append(2);
        let c = list.append(3);
        let next = list.remove(a);
        assert_eq!(next, Some(b));
        assert_eq!(list.head(), Some(b));
        assert_eq!(list.size(), 2);
        let values: Vec<i32> = list.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![2, 3]);
        assert!(list.check_invariants());
        let _ = c;
    }

    #[test]
    fn remove_last_element_empties_list() {
        let mut list: CircularList<TestKey, i32> = CircularList::new();
        let a = list.append(1);
        assert_eq!(list.remove(a), None);
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
    }

    #[test]
    fn concat_splices_and_empties_source() {
        let mut a: CircularList<TestKey, i32> = CircularList::new();
        a.append(1);
        a.append(2);
        let mut b: CircularList<TestKey, i32> = CircularList::new();
        let bk1 = b.append(3);
        let bk2 = b.append(4);

        let remap = a.concat(&mut b);
        assert!(b.is_empty());
        assert_eq!(a.size(), 4);
        assert!(a.check_invariants());

        let mut values: Vec<i32> = a.iter().map(|(_, v)| *v).collect();
        values.sort();
        assert_eq!(values, vec![1, 2, 3, 4]);
        assert!(remap.contains_key(&bk1));
        assert!(remap.contains_key(&bk2));
    }

    #[test]
    fn concat_with_empty_source_is_noop() {
        let mut a: CircularList<TestKey, i32> = CircularList::new();
        a.append(1);
        let mut b: CircularList<TestKey, i32> = CircularList::new();
        let remap = a.concat(&mut b);
        assert!(remap.is_empty());
        assert_eq!(a.size(), 1);
    }
}
