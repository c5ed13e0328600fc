// lib/src/storage_engine/collection.rs

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use models::RecordId;
use serde::{de::DeserializeOwned, Serialize};
use sled::{Db, Tree};

use crate::errors::StorageResult;
use crate::storage_engine::codec::{decode, encode};

/// Result of an update-by-filter.
///
/// `matched == 0` means no document satisfied the filter; `matched == 1`
/// with `modified == 0` means the document was found but already held the
/// requested values.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome<T> {
    pub matched: u64,
    pub modified: u64,
    /// The document as stored after the update, when one matched.
    pub document: Option<T>,
}

impl<T> UpdateOutcome<T> {
    fn unmatched() -> Self {
        Self {
            matched: 0,
            modified: 0,
            document: None,
        }
    }
}

/// A sled tree of bincode-encoded documents of one type, keyed by
/// [`RecordId`].
///
/// Every write is a single-key operation. Updates and deletes are
/// compare-and-swap loops, so a filter is always checked against the exact
/// bytes being replaced.
pub struct Collection<T> {
    tree: Tree,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Opens (creating if needed) the tree named `name`.
    pub fn open(db: &Db, name: &str) -> StorageResult<Self> {
        let tree = db.open_tree(name)?;
        Ok(Self {
            tree,
            _marker: PhantomData,
        })
    }

    /// Inserts a document under a freshly generated identifier.
    pub fn insert(&self, document: &T) -> StorageResult<RecordId> {
        let id = RecordId::new();
        self.insert_with_id(id, document)?;
        Ok(id)
    }

    pub fn insert_with_id(&self, id: RecordId, document: &T) -> StorageResult<()> {
        self.tree.insert(id.as_key(), encode(document)?)?;
        Ok(())
    }

    pub fn get(&self, id: &RecordId) -> StorageResult<Option<T>> {
        match self.tree.get(id.as_key())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Returns up to `limit` documents accepted by `filter`, in key order.
    pub fn find<F>(&self, filter: F, limit: usize) -> StorageResult<Vec<(RecordId, T)>>
    where
        F: Fn(&T) -> bool,
    {
        let mut found = Vec::new();
        for item in self.tree.iter() {
            if found.len() >= limit {
                break;
            }
            let (key, value) = item?;
            let document: T = decode(&value)?;
            if filter(&document) {
                if let Some(id) = RecordId::from_key(&key) {
                    found.push((id, document));
                }
            }
        }
        Ok(found)
    }

    /// Counts documents per key in a single pass over the tree.
    pub fn tally<K, F>(&self, key_of: F) -> StorageResult<HashMap<K, usize>>
    where
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let mut counts = HashMap::new();
        for item in self.tree.iter() {
            let (_key, value) = item?;
            let document: T = decode(&value)?;
            *counts.entry(key_of(&document)).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Updates the document `id` if it exists and satisfies `filter`.
    ///
    /// `apply` mutates the document in place and reports whether it changed
    /// anything. It may run more than once if a concurrent writer wins the
    /// race, so it must not have side effects.
    pub fn update<F, U>(&self, id: &RecordId, filter: F, mut apply: U) -> StorageResult<UpdateOutcome<T>>
    where
        F: Fn(&T) -> bool,
        U: FnMut(&mut T) -> bool,
    {
        loop {
            let Some(current) = self.tree.get(id.as_key())? else {
                return Ok(UpdateOutcome::unmatched());
            };
            let mut document: T = decode(&current)?;
            if !filter(&document) {
                return Ok(UpdateOutcome::unmatched());
            }
            if !apply(&mut document) {
                return Ok(UpdateOutcome {
                    matched: 1,
                    modified: 0,
                    document: Some(document),
                });
            }
            let replacement = encode(&document)?;
            if self
                .tree
                .compare_and_swap(id.as_key(), Some(current), Some(replacement))?
                .is_ok()
            {
                return Ok(UpdateOutcome {
                    matched: 1,
                    modified: 1,
                    document: Some(document),
                });
            }
        }
    }

    /// Deletes the document `id` if it exists and satisfies `filter`;
    /// returns how many documents were removed.
    pub fn delete<F>(&self, id: &RecordId, filter: F) -> StorageResult<u64>
    where
        F: Fn(&T) -> bool,
    {
        loop {
            let Some(current) = self.tree.get(id.as_key())? else {
                return Ok(0);
            };
            let document: T = decode(&current)?;
            if !filter(&document) {
                return Ok(0);
            }
            if self
                .tree
                .compare_and_swap(id.as_key(), Some(current), None::<Vec<u8>>)?
                .is_ok()
            {
                return Ok(1);
            }
        }
    }

    pub fn clear(&self) -> StorageResult<()> {
        self.tree.clear()?;
        Ok(())
    }
}
