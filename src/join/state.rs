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

//! The transient state struct (spec §3, §9 "mutable shared fields of the
//! nested cursor class → an explicit state struct"). All transitions
//! happen inside `advance`/`rewind`/`bind`/`release`; nothing else mutates
//! these fields.

use crate::row::{RowId, NEG_INFINITY_TS, NULL_ROW_ID};

#[derive(Debug)]
pub(crate) struct JoinState {
    /// Timestamp of the dangling slave row, or `-infinity` if none.
    pub slave_timestamp: i64,
    /// Row id of the dangling slave row, or `NULL_ROW_ID` if none.
    pub last_slave_row_id: RowId,
    /// Cached result of the most recent master `advance`. Only valid while
    /// `master_has_next_pending` is false (invariant 1).
    pub master_has_next: bool,
    /// True iff the master must be advanced before the next row is emitted.
    pub master_has_next_pending: bool,
    /// Whether the current master row matched a slave row within tolerance;
    /// read by `current_row` to pick between the real and null slave facade.
    pub has_slave: bool,
}

impl JoinState {
    /// The state immediately after `bind`/`rewind`: no dangling row, and
    /// the master must be pulled before the first row can be produced.
    pub fn fresh() -> Self {
        Self {
            slave_timestamp: NEG_INFINITY_TS,
            last_slave_row_id: NULL_ROW_ID,
            master_has_next: false,
            master_has_next_pending: true,
            has_slave: false,
        }
    }

    pub fn has_dangling(&self) -> bool {
        self.last_slave_row_id != NULL_ROW_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_dangling_row() {
        let s = JoinState::fresh();
        assert!(!s.has_dangling());
        assert!(s.master_has_next_pending);
    }
}
