//! Open-addressing term dictionary.
//!
//! Linear probing over a flat slot array. Deleted entries leave a tombstone
//! slot that lookups probe past and insertions may reuse; the
//! only thing that reclaims tombstones is a rehash.

/// Initial slot count for [`TermDict::new`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// Rehash once `(occupied + tombstones) / capacity` exceeds this.
pub const MAX_LOAD: f64 = 0.70;

/// 64-bit FNV-1a over the raw key bytes.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

#[derive(Debug)]
enum Slot<V> {
    Empty,
    Occupied { hash: u64, key: String, value: V },
    Tombstone,
}

enum Probe {
    Found(usize),
    Vacant(usize),
    Full,
}

#[derive(Debug)]
pub struct TermDict<V> {
    slots: Vec<Slot<V>>,
    len: usize,
    tombstones: usize,
}

impl<V> Default for TermDict<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TermDict<V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: empty_slots(capacity.max(1)), len: 0, tombstones: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn load_factor(&self) -> f64 {
        (self.len + self.tombstones) as f64 / self.slots.len() as f64
    }

    fn lookup(&self, key: &str) -> Option<usize> {
        let hash = fnv1a_64(key.as_bytes());
        let cap = self.slots.len();
        let mut idx = (hash % cap as u64) as usize;
        for _ in 0..cap {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied { hash: h, key: k, .. } if *h == hash && k == key => return Some(idx),
                _ => {}
            }
            idx = (idx + 1) % cap;
        }
        None
    }

    pub fn find(&self, key: &str) -> Option<&V> {
        match &self.slots[self.lookup(key)?] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns the stored value for `key`, inserting `default` first if the
    /// key is absent.
    pub fn get_or_insert(&mut self, key: &str, default: V) -> &mut V {
        self.maybe_grow();
        let hash = fnv1a_64(key.as_bytes());
        loop {
            match self.probe_for_insert(hash, key) {
                Probe::Found(idx) => return self.value_at(idx),
                Probe::Vacant(idx) => {
                    if matches!(self.slots[idx], Slot::Tombstone) {
                        self.tombstones -= 1;
                    }
                    self.slots[idx] = Slot::Occupied { hash, key: key.to_owned(), value: default };
                    self.len += 1;
                    return self.value_at(idx);
                }
                // Every slot is occupied or a tombstone.
                Probe::Full => self.rehash(self.slots.len() * 2),
            }
        }
    }

    /// Removes `key`, leaving a tombstone in its slot.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.lookup(key)?;
        match std::mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied { value, .. } => {
                self.len -= 1;
                self.tombstones += 1;
                Some(value)
            }
            other => {
                self.slots[idx] = other;
                None
            }
        }
    }

    pub fn into_entries(self) -> Vec<(String, V)> {
        self.slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Occupied { key, value, .. } => Some((key, value)),
                _ => None,
            })
            .collect()
    }

    fn probe_for_insert(&self, hash: u64, key: &str) -> Probe {
        let cap = self.slots.len();
        let mut idx = (hash % cap as u64) as usize;
        let mut first_tombstone = None;
        for _ in 0..cap {
            match &self.slots[idx] {
                Slot::Empty => return Probe::Vacant(first_tombstone.unwrap_or(idx)),
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(idx);
                    }
                }
                Slot::Occupied { hash: h, key: k, .. } => {
                    if *h == hash && k == key {
                        return Probe::Found(idx);
                    }
                }
            }
            idx = (idx + 1) % cap;
        }
        match first_tombstone {
            Some(idx) => Probe::Vacant(idx),
            None => Probe::Full,
        }
    }

    fn value_at(&mut self, idx: usize) -> &mut V {
        match &mut self.slots[idx] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("slot {idx} was just found or filled"),
        }
    }

    fn maybe_grow(&mut self) {
        if self.load_factor() > MAX_LOAD {
            self.rehash(self.slots.len() * 2);
        }
    }

    fn rehash(&mut self, new_capacity: usize) {
        let old = std::mem::replace(&mut self.slots, empty_slots(new_capacity));
        self.len = 0;
        self.tombstones = 0;
        for slot in old {
            if let Slot::Occupied { hash, key, value } = slot {
                self.insert_fresh(hash, key, value);
            }
        }
    }

    /// Reinsertion during rehash: the key is known to be absent and the new
    /// table has no tombstones.
    fn insert_fresh(&mut self, hash: u64, key: String, value: V) {
        let cap = self.slots.len();
        let mut idx = (hash % cap as u64) as usize;
        while !matches!(self.slots[idx], Slot::Empty) {
            idx = (idx + 1) % cap;
        }
        self.slots[idx] = Slot::Occupied { hash, key, value };
        self.len += 1;
    }
}

fn empty_slots<V>(capacity: usize) -> Vec<Slot<V>> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Distinct keys whose home slot is the same in a table of `cap` slots.
    fn colliding_keys(cap: usize, n: usize) -> Vec<String> {
        let mut by_home: std::collections::HashMap<u64, Vec<String>> = Default::default();
        for i in 0.. {
            let key = format!("term{i}");
            let home = fnv1a_64(key.as_bytes()) % cap as u64;
            let bucket = by_home.entry(home).or_default();
            bucket.push(key);
            if bucket.len() == n {
                return bucket.clone();
            }
        }
        unreachable!()
    }

    #[test]
    fn fnv_known_values() {
        assert_eq!(fnv1a_64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn insert_and_find() {
        let mut d: TermDict<u32> = TermDict::new();
        *d.get_or_insert("red", 0) += 1;
        *d.get_or_insert("red", 0) += 1;
        d.get_or_insert("boxe", 7);
        assert_eq!(d.find("red"), Some(&2));
        assert_eq!(d.find("boxe"), Some(&7));
        assert_eq!(d.find("blue"), None);
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn stress_across_rehashes() {
        let mut d: TermDict<usize> = TermDict::with_capacity(4);
        let n = 20_000;
        for i in 0..n {
            d.get_or_insert(&format!("k{i}"), i);
        }
        for i in (0..n).step_by(3) {
            *d.get_or_insert(&format!("k{i}"), 0) = i * 10;
        }
        assert_eq!(d.len(), n);
        assert!(d.capacity() > n);
        assert!(d.load_factor() <= MAX_LOAD + 1.0 / d.capacity() as f64);
        for i in 0..n {
            let want = if i % 3 == 0 { i * 10 } else { i };
            assert_eq!(d.find(&format!("k{i}")), Some(&want), "k{i}");
        }
    }

    #[test]
    fn lookup_probes_past_tombstones() {
        let keys = colliding_keys(64, 4);
        let mut d: TermDict<usize> = TermDict::with_capacity(64);
        for (i, k) in keys[..3].iter().enumerate() {
            d.get_or_insert(k, i);
        }
        assert_eq!(d.remove(&keys[1]), Some(1));
        assert_eq!(d.tombstones(), 1);
        assert_eq!(d.find(&keys[1]), None);
        assert_eq!(d.find(&keys[2]), Some(&2));

        // A new key with the same home slot lands in the tombstone.
        d.get_or_insert(&keys[3], 3);
        assert_eq!(d.tombstones(), 0);
        assert_eq!(d.len(), 3);
        assert_eq!(d.find(&keys[2]), Some(&2));
        assert_eq!(d.find(&keys[3]), Some(&3));
    }

    #[test]
    fn reinsert_reuses_own_tombstone() {
        let mut d: TermDict<&str> = TermDict::with_capacity(16);
        d.get_or_insert("alpha", "a");
        d.get_or_insert("beta", "b");
        d.remove("alpha");
        assert_eq!(d.remove("alpha"), None);
        d.get_or_insert("alpha", "again");
        assert_eq!(d.tombstones(), 0);
        assert_eq!(d.find("alpha"), Some(&"again"));
    }

    #[test]
    fn tombstones_count_toward_growth_and_vanish_on_rehash() {
        let mut d: TermDict<u32> = TermDict::with_capacity(16);
        for i in 0..12 {
            d.get_or_insert(&format!("t{i}"), i);
        }
        for i in 0..6 {
            d.remove(&format!("t{i}"));
        }
        assert_eq!(d.len(), 6);
        assert_eq!(d.tombstones(), 6);
        assert_eq!(d.capacity(), 16);

        // 12/16 > 0.70 counting tombstones, so the next insert doubles.
        d.get_or_insert("fresh", 99);
        assert_eq!(d.capacity(), 32);
        assert_eq!(d.tombstones(), 0);
        assert_eq!(d.len(), 7);
        for i in 6..12 {
            assert_eq!(d.find(&format!("t{i}")), Some(&i));
        }
    }

    #[test]
    fn full_of_tombstones_still_inserts() {
        let mut d: TermDict<u32> = TermDict::with_capacity(1);
        d.get_or_insert("only", 1);
        d.remove("only");
        assert_eq!(d.load_factor(), 1.0);
        d.get_or_insert("next", 2);
        assert_eq!(d.find("next"), Some(&2));
        assert_eq!(d.tombstones(), 0);
    }

    #[test]
    fn entries_cover_occupied_slots() {
        let mut d: TermDict<u8> = TermDict::with_capacity(8);
        for k in ["b", "a", "c"] {
            d.get_or_insert(k, 0);
        }
        d.remove("c");
        let mut keys: Vec<String> = d.into_entries().into_iter().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
