//! Hash-consing table: every distinct value is stored once and gets a dense index.
//!
//! Values are compared structurally (`Eq`) inside chained buckets selected by
//! their `Hash`. The hasher is fixed, so the same sequence of insertions always
//! yields the same indices. Index 0 is a sentinel and never holds a value.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Index;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    next: usize,
}

#[derive(Debug, Clone)]
pub struct Table<T> {
    /// Slot 0 is the sentinel, so `data[i - 1]` holds the value with index `i`.
    data: Vec<Entry<T>>,
    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T> {
    /// Create a new table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Table bits should be in the range 0..=31");

        let buckets_size = 1 << bits;
        Self {
            data: Vec::new(),
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
        }
    }

    /// Get the number of stored values.
    pub fn len(&self) -> usize {
        self.data.len()
    }
    /// Check if no value is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// Get the number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        assert!(index <= self.data.len(), "Index {} is not occupied", index);
        &self.data[index - 1].value
    }

    /// Iterate over `(index, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.data.iter().enumerate().map(|(i, e)| (i + 1, &e.value))
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table::new(10)
    }
}

impl<T> Table<T>
where
    T: Hash + Eq,
{
    fn hash(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn bucket_index(&self, value: &T) -> usize {
        (Self::hash(value) & self.bitmask) as usize
    }

    /// Look up the index of a value without inserting it.
    pub fn get(&self, value: &T) -> Option<usize> {
        let mut index = self.buckets[self.bucket_index(value)];
        while index != 0 {
            if self.value(index) == value {
                return Some(index);
            }
            index = self.data[index - 1].next;
        }
        None
    }

    /// Put a value into the table.
    ///
    /// Returns its index and `true` if the value was new.
    pub fn put(&mut self, value: T) -> (usize, bool) {
        if let Some(index) = self.get(&value) {
            // The value already exists.
            return (index, false);
        }

        if self.data.len() >= self.buckets.len() {
            self.grow();
        }

        let bucket_index = self.bucket_index(&value);
        let index = self.data.len() + 1;
        // Prepend to the bucket chain.
        self.data.push(Entry {
            value,
            next: self.buckets[bucket_index],
        });
        self.buckets[bucket_index] = index;
        (index, true)
    }

    /// Double the number of buckets and rebuild the chains.
    fn grow(&mut self) {
        let buckets_size = self.buckets.len() * 2;
        self.buckets = vec![0; buckets_size];
        self.bitmask = (buckets_size - 1) as u64;
        for i in 0..self.data.len() {
            let bucket_index = self.bucket_index(&self.data[i].value);
            self.data[i].next = self.buckets[bucket_index];
            self.buckets[bucket_index] = i + 1;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_deduplicates() {
        let mut table = Table::new(2);
        assert_eq!(table.put(42), (1, true));
        assert_eq!(table.put(17), (2, true));
        assert_eq!(table.put(42), (1, false));
        assert_eq!(table.len(), 2);
        assert_eq!(table[1], 42);
        assert_eq!(table[2], 17);
    }

    #[test]
    fn test_get() {
        let mut table = Table::new(2);
        table.put("x".to_string());
        assert_eq!(table.get(&"x".to_string()), Some(1));
        assert_eq!(table.get(&"y".to_string()), None);
    }

    #[test]
    fn test_grow_keeps_indices() {
        let mut table = Table::new(0);
        for i in 0..100 {
            assert_eq!(table.put(i * 3), (i as usize + 1, true));
        }
        assert!(table.num_buckets() >= 100);
        for i in 0..100 {
            assert_eq!(table.get(&(i * 3)), Some(i as usize + 1));
        }
    }

    #[test]
    fn test_structural_equality() {
        #[derive(Debug, Clone, Hash, Eq, PartialEq)]
        struct Item(Vec<u32>, bool);

        let mut table = Table::new(4);
        let (i1, _) = table.put(Item(vec![1, 2], false));
        let (i2, new) = table.put(Item(vec![1, 2], false));
        let (i3, _) = table.put(Item(vec![1, 2], true));
        assert_eq!(i1, i2);
        assert!(!new);
        assert_ne!(i1, i3);
    }

    #[test]
    #[should_panic(expected = "Index is 0")]
    fn test_sentinel_panics() {
        let table = Table::<u32>::new(2);
        table.value(0);
    }
}
