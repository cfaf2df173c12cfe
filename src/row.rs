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

//! Row and datum vocabulary shared by master and slave records.
//!
//! `Row` plays the role `risingwave_common::row::Row2` plays for the
//! engine's batch executors: a minimal, borrow-friendly projection
//! interface rather than a concrete struct. The outer-join adapter below
//! is this crate's analogue of that crate's `Chain` row combinator,
//! specialized to exactly two sides and a boolean that picks which
//! right-hand side is live.

/// A single typed column value. Deliberately small: this operator only
/// ever needs to read timestamps and row ids itself, and otherwise passes
/// columns through opaquely to whatever does the result projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Datum<'a> {
    Null,
    Int64(i64),
    Bytes(&'a [u8]),
}

/// Stable identifier of a row within a source cursor. `i64` rather than
/// `u64` so a sentinel outside the valid domain (`NULL_ROW_ID`) is free to
/// pick without reserving a bit pattern out of the valid range.
pub type RowId = i64;

/// Row id sentinel meaning "no row": distinct from every row id a real
/// source cursor can produce. Used consistently for `lastSlaveRowId` across
/// construction, `rewind`, and the dangling-row emptiness test.
pub const NULL_ROW_ID: RowId = i64::MIN;

/// Timestamp sentinel standing in for negative infinity, used to seed
/// `slaveTimestamp` so the first master row always falls on the
/// "dangling slave has not yet overshot" branch.
pub const NEG_INFINITY_TS: i64 = i64::MIN;

/// Capability set exposed by a master or slave record (spec §6: "Row
/// capability set"). Implementations are supplied by the table scan /
/// filter layer that produces the rows; this crate only reads through the
/// trait.
pub trait Row {
    /// Number of columns.
    fn len(&self) -> usize;

    /// Read the datum at `index`.
    fn datum_at(&self, index: usize) -> Datum<'_>;

    /// Read column `ts_idx` as a timestamp. Panics if the column isn't
    /// timestamp-typed; the timestamp column index is fixed per cursor and
    /// validated once at factory construction, not on every row.
    fn timestamp(&self, ts_idx: usize) -> i64 {
        match self.datum_at(ts_idx) {
            Datum::Int64(v) => v,
            other => panic!("column {ts_idx} is not a timestamp column: {other:?}"),
        }
    }

    /// Stable row identifier, used as the KeyIndex value and as the
    /// argument to `random_read`.
    fn row_id(&self) -> RowId;
}

/// Stateless, schema-shaped source of typed nulls standing in for a slave
/// row when `hasSlave = false`. A pure function of the slave schema width;
/// built once at factory construction time and reused for every unmatched
/// master row.
#[derive(Debug, Clone)]
pub struct NullRow {
    width: usize,
}

impl NullRow {
    pub fn with_width(width: usize) -> Self {
        Self { width }
    }
}

impl Row for NullRow {
    fn len(&self) -> usize {
        self.width
    }

    fn datum_at(&self, index: usize) -> Datum<'_> {
        assert!(index < self.width, "column {index} out of range");
        Datum::Null
    }

    fn row_id(&self) -> RowId {
        NULL_ROW_ID
    }
}

/// The right-hand side of an [`OuterJoinRow`]: either the slave cursor's
/// live probe slot, or the null-shaped stand-in. A plain enum rather than
/// `dyn Row` because both arms are fixed at the call site and dynamic
/// dispatch would cost a vtable indirection per column read for no benefit.
enum SlaveSide<'a, S: Row> {
    Real(&'a S),
    Null(&'a NullRow),
}

impl<'a, S: Row> Row for SlaveSide<'a, S> {
    fn len(&self) -> usize {
        match self {
            SlaveSide::Real(r) => r.len(),
            SlaveSide::Null(n) => n.len(),
        }
    }

    fn datum_at(&self, index: usize) -> Datum<'_> {
        match self {
            SlaveSide::Real(r) => r.datum_at(index),
            SlaveSide::Null(n) => n.datum_at(index),
        }
    }

    fn row_id(&self) -> RowId {
        match self {
            SlaveSide::Real(r) => r.row_id(),
            SlaveSide::Null(n) => n.row_id(),
        }
    }
}

/// Output record: master columns `[0, column_split)` chained with slave
/// columns `[column_split, total)`, the slave side toggled by `has_slave`.
pub struct OuterJoinRow<'a, M: Row, S: Row> {
    pub(crate) master: &'a M,
    pub(crate) slave_real: &'a S,
    pub(crate) slave_null: &'a NullRow,
    pub(crate) has_slave: bool,
    pub(crate) column_split: usize,
}

impl<'a, M: Row, S: Row> OuterJoinRow<'a, M, S> {
    /// Whether a real slave row backs this output, as opposed to the
    /// null-shaped stand-in.
    pub fn has_slave(&self) -> bool {
        self.has_slave
    }

    fn slave(&self) -> SlaveSide<'_, S> {
        if self.has_slave {
            SlaveSide::Real(self.slave_real)
        } else {
            SlaveSide::Null(self.slave_null)
        }
    }
}

impl<'a, M: Row, S: Row> Row for OuterJoinRow<'a, M, S> {
    fn len(&self) -> usize {
        self.column_split + self.slave().len()
    }

    fn datum_at(&self, index: usize) -> Datum<'_> {
        if index < self.column_split {
            self.master.datum_at(index)
        } else {
            // Re-borrow through a temporary: `slave()` returns an owned
            // enum of references, so this doesn't extend any borrow of
            // `self` past the call.
            match self.slave() {
                SlaveSide::Real(r) => r.datum_at(index - self.column_split),
                SlaveSide::Null(n) => n.datum_at(index - self.column_split),
            }
        }
    }

    fn row_id(&self) -> RowId {
        self.master.row_id()
    }
}
