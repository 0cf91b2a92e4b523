use std::collections::BTreeSet;

use ahash::{AHashMap, AHashSet};

use crate::config::SetKind;

/// Insertion-ordered set: positions are tombstoned on removal and compacted
/// once the tombstones dominate.
#[derive(Debug, Clone, Default)]
struct LinkedLongSet {
    entries: Vec<Option<i64>>,
    positions: AHashMap<i64, usize>,
}

impl LinkedLongSet {
    fn insert(&mut self, value: i64) -> bool {
        if self.positions.contains_key(&value) {
            return false;
        }
        self.positions.insert(value, self.entries.len());
        self.entries.push(Some(value));
        true
    }

    fn remove(&mut self, value: i64) -> bool {
        let Some(pos) = self.positions.remove(&value) else {
            return false;
        };
        self.entries[pos] = None;
        if self.entries.len() > 2 * self.positions.len() + 16 {
            self.compact();
        }
        true
    }

    fn compact(&mut self) {
        self.entries.retain(Option::is_some);
        for (pos, value) in self.entries.iter().enumerate() {
            if let Some(v) = value {
                self.positions.insert(*v, pos);
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    fn at_or_after(&self, pos: usize) -> Option<(i64, usize)> {
        self.entries
            .iter()
            .enumerate()
            .skip(pos)
            .find_map(|(idx, v)| v.map(|value| (value, idx + 1)))
    }
}

#[derive(Debug, Clone)]
enum SetRepr {
    Hash(AHashSet<i64>),
    Sorted(BTreeSet<i64>),
    Linked(LinkedLongSet),
}

/// Set of vertex or edge indices.
#[derive(Debug, Clone)]
pub struct LongSet {
    repr: SetRepr,
    version: u64,
}

/// Resumable position inside a [`LongSet`], valid while the set's version
/// is unchanged.
#[derive(Debug, Clone)]
pub enum SetCursor {
    Linked(usize),
    Sorted(Option<i64>),
    Snapshot(std::vec::IntoIter<i64>),
}

impl LongSet {
    pub fn new(kind: SetKind) -> Self {
        let repr = match kind {
            SetKind::Hash => SetRepr::Hash(AHashSet::new()),
            SetKind::Sorted => SetRepr::Sorted(BTreeSet::new()),
            SetKind::Linked => SetRepr::Linked(LinkedLongSet::default()),
        };
        Self { repr, version: 0 }
    }

    pub fn linked() -> Self {
        Self::new(SetKind::Linked)
    }

    pub fn from_values<I: IntoIterator<Item = i64>>(kind: SetKind, values: I) -> Self {
        let mut set = Self::new(kind);
        for value in values {
            set.add(value);
        }
        set
    }

    pub fn kind(&self) -> SetKind {
        match self.repr {
            SetRepr::Hash(_) => SetKind::Hash,
            SetRepr::Sorted(_) => SetKind::Sorted,
            SetRepr::Linked(_) => SetKind::Linked,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns whether the value was newly inserted.
    pub fn add(&mut self, value: i64) -> bool {
        let inserted = match &mut self.repr {
            SetRepr::Hash(set) => set.insert(value),
            SetRepr::Sorted(set) => set.insert(value),
            SetRepr::Linked(set) => set.insert(value),
        };
        if inserted {
            self.version += 1;
        }
        inserted
    }

    /// Returns whether the value was present.
    pub fn remove(&mut self, value: i64) -> bool {
        let removed = match &mut self.repr {
            SetRepr::Hash(set) => set.remove(&value),
            SetRepr::Sorted(set) => set.remove(&value),
            SetRepr::Linked(set) => set.remove(value),
        };
        if removed {
            self.version += 1;
        }
        removed
    }

    pub fn contains(&self, value: i64) -> bool {
        match &self.repr {
            SetRepr::Hash(set) => set.contains(&value),
            SetRepr::Sorted(set) => set.contains(&value),
            SetRepr::Linked(set) => set.positions.contains_key(&value),
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            SetRepr::Hash(set) => set.len(),
            SetRepr::Sorted(set) => set.len(),
            SetRepr::Linked(set) => set.positions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        match &mut self.repr {
            SetRepr::Hash(set) => set.clear(),
            SetRepr::Sorted(set) => set.clear(),
            SetRepr::Linked(set) => set.clear(),
        }
        self.version += 1;
    }

    pub fn cursor(&self) -> SetCursor {
        match &self.repr {
            SetRepr::Hash(set) => SetCursor::Snapshot(set.iter().copied().collect::<Vec<_>>().into_iter()),
            SetRepr::Sorted(_) => SetCursor::Sorted(None),
            SetRepr::Linked(_) => SetCursor::Linked(0),
        }
    }

    pub fn advance(&self, cursor: &mut SetCursor) -> Option<i64> {
        match (cursor, &self.repr) {
            (SetCursor::Snapshot(iter), _) => iter.next(),
            (SetCursor::Sorted(last), SetRepr::Sorted(set)) => {
                let next = match *last {
                    None => set.iter().next().copied(),
                    Some(prev) => set
                        .range((std::ops::Bound::Excluded(prev), std::ops::Bound::Unbounded))
                        .next()
                        .copied(),
                };
                if next.is_some() {
                    *last = next;
                }
                next
            }
            (SetCursor::Linked(pos), SetRepr::Linked(set)) => {
                let (value, resume) = set.at_or_after(*pos)?;
                *pos = resume;
                Some(value)
            }
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        let mut cursor = self.cursor();
        std::iter::from_fn(move || self.advance(&mut cursor))
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.iter().collect()
    }
}

impl PartialEq for LongSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}
