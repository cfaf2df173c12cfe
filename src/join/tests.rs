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

//! Scenario tests S1–S6 from the spec, plus a couple of the universal
//! properties, run against an in-memory mock cursor pair. Each mock row is
//! two columns: an integer join key at index 0 and a timestamp at index 1.

use std::convert::Infallible;

use crate::cursor::{CancellationToken, SourceCursor};
use crate::index::HashMapKeyIndex;
use crate::join::config::AsOfJoinConfig;
use crate::join::cursor::AsOfJoinCursor;
use crate::key::Int64ColumnsKeySerializer;
use crate::row::{Datum, Row, RowId};

#[derive(Clone, Copy)]
struct MockRow {
    key: i64,
    ts: i64,
    row_id: RowId,
}

impl Row for MockRow {
    fn len(&self) -> usize {
        2
    }

    fn datum_at(&self, index: usize) -> Datum<'_> {
        match index {
            0 => Datum::Int64(self.key),
            1 => Datum::Int64(self.ts),
            _ => panic!("column {index} out of range"),
        }
    }

    fn row_id(&self) -> RowId {
        self.row_id
    }
}

struct MockCursor {
    rows: Vec<MockRow>,
    pos: Option<usize>,
    probe: MockRow,
}

impl MockCursor {
    fn new(rows: Vec<MockRow>) -> Self {
        Self {
            rows,
            pos: None,
            probe: MockRow { key: 0, ts: 0, row_id: crate::row::NULL_ROW_ID },
        }
    }
}

impl SourceCursor for MockCursor {
    type Row = MockRow;
    type Error = Infallible;

    fn advance(&mut self) -> Result<bool, Infallible> {
        let next = self.pos.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.pos = Some(next);
            Ok(true)
        } else {
            self.pos = Some(self.rows.len());
            Ok(false)
        }
    }

    fn current_row(&self) -> &MockRow {
        let pos = self.pos.expect("advance() not called yet");
        &self.rows[pos]
    }

    fn random_read(&mut self, row_id: RowId) -> Result<(), Infallible> {
        self.probe = *self
            .rows
            .iter()
            .find(|r| r.row_id() == row_id)
            .expect("row id not present in mock cursor");
        Ok(())
    }

    fn probe_row(&self) -> &MockRow {
        &self.probe
    }

    fn rewind(&mut self) -> Result<(), Infallible> {
        self.pos = None;
        Ok(())
    }

    fn release(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn size(&self) -> i64 {
        self.rows.len() as i64
    }

    fn pre_computed_state_size(&self) -> usize {
        0
    }

    fn calculate_size(
        &self,
        _cancel: &dyn CancellationToken,
        counter: &mut i64,
    ) -> Result<i64, Infallible> {
        *counter += self.rows.len() as i64;
        Ok(self.rows.len() as i64)
    }
}

fn r(ts: i64, key: i64, row_id: RowId) -> MockRow {
    MockRow { key, ts, row_id }
}

/// (key, ts, Some(matched slave ts) | None) for every master row, in order.
fn run(master: Vec<MockRow>, slave: Vec<MockRow>, tolerance: Option<i64>) -> Vec<(i64, i64, Option<i64>)> {
    let mut cfg = AsOfJoinConfig::new(1, 1, 2);
    if let Some(t) = tolerance {
        cfg = cfg.with_tolerance(t);
    }
    let mut cursor = AsOfJoinCursor::new(
        HashMapKeyIndex::new(),
        Int64ColumnsKeySerializer::new(vec![0]),
        Int64ColumnsKeySerializer::new(vec![0]),
        2,
        cfg,
    );
    cursor.bind(MockCursor::new(master), MockCursor::new(slave));
    collect(&mut cursor)
}

fn collect(
    cursor: &mut AsOfJoinCursor<
        MockCursor,
        MockCursor,
        Int64ColumnsKeySerializer,
        Int64ColumnsKeySerializer,
        HashMapKeyIndex,
    >,
) -> Vec<(i64, i64, Option<i64>)> {
    let mut out = Vec::new();
    while cursor.advance().unwrap() {
        let row = cursor.current_row();
        let key = match row.datum_at(0) {
            Datum::Int64(v) => v,
            _ => unreachable!(),
        };
        let ts = match row.datum_at(1) {
            Datum::Int64(v) => v,
            _ => unreachable!(),
        };
        let slave_ts = row.has_slave().then(|| match row.datum_at(3) {
            Datum::Int64(v) => v,
            _ => unreachable!(),
        });
        out.push((key, ts, slave_ts));
    }
    out
}

#[test]
fn s1_basic_prior_match() {
    let master = vec![r(1, 1, 1000), r(2, 2, 1001)];
    let slave = vec![r(0, 1, 200), r(1, 2, 201)];
    assert_eq!(run(master, slave, None), vec![(1, 1, Some(0)), (2, 2, Some(1))]);
}

#[test]
fn s2_no_match_missing_key() {
    let master = vec![r(5, 9, 1000)];
    let slave = vec![r(1, 8, 200)];
    assert_eq!(run(master, slave, None), vec![(9, 5, None)]);
}

#[test]
fn s3_tolerance_cutoff_at_probe_time() {
    let master = vec![r(10, 1, 1000), r(100, 1, 1001)];
    let slave = vec![r(8, 1, 200)];
    assert_eq!(run(master, slave, Some(3)), vec![(1, 10, Some(8)), (1, 100, None)]);
}

#[test]
fn s4_dangling_slave_carries_over() {
    let master = vec![r(5, 1, 1000), r(20, 1, 1001)];
    let slave = vec![r(4, 1, 200), r(10, 1, 201), r(25, 1, 202)];
    assert_eq!(run(master, slave, None), vec![(1, 5, Some(4)), (1, 20, Some(10))]);
}

#[test]
fn s5_key_change() {
    let master = vec![r(10, 1, 1000), r(10, 2, 1001)];
    let slave = vec![r(5, 1, 200), r(7, 2, 201)];
    assert_eq!(run(master, slave, None), vec![(1, 10, Some(5)), (2, 10, Some(7))]);
}

#[test]
fn s6_rewind_replays_identically() {
    let master = vec![r(5, 1, 1000), r(20, 1, 1001)];
    let slave = vec![r(4, 1, 200), r(10, 1, 201), r(25, 1, 202)];

    let mut cursor = AsOfJoinCursor::new(
        HashMapKeyIndex::new(),
        Int64ColumnsKeySerializer::new(vec![0]),
        Int64ColumnsKeySerializer::new(vec![0]),
        2,
        AsOfJoinConfig::new(1, 1, 2),
    );
    cursor.bind(MockCursor::new(master.clone()), MockCursor::new(slave.clone()));
    let first = collect(&mut cursor);

    cursor.rewind().unwrap();
    let second = collect(&mut cursor);

    assert_eq!(first, second);
}

#[test]
fn output_cardinality_equals_master_row_count() {
    let master = vec![r(1, 1, 1000), r(2, 1, 1001), r(3, 2, 1002)];
    let slave = vec![r(0, 1, 200)];
    assert_eq!(run(master.clone(), slave, None).len(), master.len());
}

#[test]
fn master_columns_are_preserved_in_order() {
    let master = vec![r(1, 7, 1000), r(2, 8, 1001)];
    let slave: Vec<MockRow> = vec![];
    let out = run(master, slave, None);
    assert_eq!(out, vec![(7, 1, None), (8, 2, None)]);
}

#[test]
fn release_is_idempotent() {
    let mut cursor = AsOfJoinCursor::new(
        HashMapKeyIndex::new(),
        Int64ColumnsKeySerializer::new(vec![0]),
        Int64ColumnsKeySerializer::new(vec![0]),
        2,
        AsOfJoinConfig::new(1, 1, 2),
    );
    cursor.bind(MockCursor::new(vec![r(1, 1, 1000)]), MockCursor::new(vec![]));
    cursor.release().unwrap();
    cursor.release().unwrap();
}
