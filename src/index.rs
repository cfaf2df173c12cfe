// Copyright 2025 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The KeyIndex external contract (spec §4.1) and a reference in-memory
//! implementation.
//!
//! The map/hash-table data structure itself is out of scope for this
//! operator per spec §1 — it is "consumed via a narrow interface" — but a
//! library crate needs *something* concrete to be testable and usable
//! stand-alone, the same way `risingwave_batch`'s hash join ships its own
//! `JoinHashMap` (a thin wrapper over `std`/`hashbrown`'s `HashMap`) rather
//! than depending on the storage engine's page-backed tables. Production
//! engines embedding this operator are expected to supply their own
//! [`KeyIndex`] backed by off-heap or page-frame storage for genuinely
//! unbounded growth; [`HashMapKeyIndex`] is the in-process stand-in.

use std::collections::HashMap;

use crate::key::KeyBytes;
use crate::row::RowId;

/// Mapping from join-key bytes to the row id of the most recently
/// qualifying slave row seen for that key (spec §4.1).
///
/// `close`/`reopen` model releasing and reacquiring backing storage
/// independently of `clear` (which keeps capacity): `close` is called from
/// [`crate::join::AsOfJoinCursor::release`], `reopen` from
/// [`crate::join::AsOfJoinCursor::bind`].
pub trait KeyIndex {
    /// Remove every entry, keeping any allocated capacity.
    fn clear(&mut self);

    /// Insert `row_id` under `key`, overwriting any existing entry. The
    /// newest insertion for a key always wins (spec §4.1).
    fn insert_or_replace(&mut self, key: KeyBytes, row_id: RowId);

    /// Read-only lookup; `None` if `key` is absent.
    fn lookup(&self, key: &KeyBytes) -> Option<RowId>;

    /// Release backing storage. Idempotent.
    fn close(&mut self);

    /// Reacquire backing storage after a `close`.
    fn reopen(&mut self);
}

/// Reference [`KeyIndex`] backed by `std::collections::HashMap`. `close`
/// drops the map's allocation; `reopen` replaces it with a fresh empty one.
#[derive(Debug, Default)]
pub struct HashMapKeyIndex {
    entries: Option<HashMap<KeyBytes, RowId>>,
}

impl HashMapKeyIndex {
    pub fn new() -> Self {
        Self { entries: Some(HashMap::new()) }
    }

    fn entries_mut(&mut self) -> &mut HashMap<KeyBytes, RowId> {
        self.entries
            .as_mut()
            .expect("KeyIndex used while closed: bind() must be called before advance()")
    }
}

impl KeyIndex for HashMapKeyIndex {
    fn clear(&mut self) {
        self.entries_mut().clear();
    }

    fn insert_or_replace(&mut self, key: KeyBytes, row_id: RowId) {
        self.entries_mut().insert(key, row_id);
    }

    fn lookup(&self, key: &KeyBytes) -> Option<RowId> {
        self.entries.as_ref().and_then(|m| m.get(key).copied())
    }

    fn close(&mut self) {
        self.entries = None;
    }

    fn reopen(&mut self) {
        self.entries = Some(HashMap::new());
    }
}
