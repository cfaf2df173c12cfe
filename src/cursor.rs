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

//! The source-cursor capability set (spec §6) that the master and slave
//! sides of the join are required to supply. Table scans, filters, and
//! page-frame I/O that produce these cursors are out of scope (spec §1);
//! this crate depends only on the trait.

use crate::row::{Row, RowId};

/// Signals cooperative cancellation of a long-running size calculation.
/// The operator itself does not poll this per row (spec §5) — it only
/// forwards it to `calculate_size` on the master cursor.
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

/// A token that never cancels, for tests and for engines that don't wire
/// cancellation into size estimation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Forward-only cursor over one side of the join, plus random access by
/// row id into a second, caller-owned slot that never disturbs the main
/// iteration position (spec §3 invariant 5, §6).
pub trait SourceCursor {
    type Row: Row;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Advance to the next row. `false` once exhausted.
    fn advance(&mut self) -> Result<bool, Self::Error>;

    /// The row last produced by `advance`. Only meaningful after `advance`
    /// has returned `true` at least once since construction or `rewind`.
    fn current_row(&self) -> &Self::Row;

    /// Read the row identified by `row_id` into the probe slot, leaving
    /// the main iteration position untouched.
    fn random_read(&mut self, row_id: RowId) -> Result<(), Self::Error>;

    /// The row last written by `random_read`.
    fn probe_row(&self) -> &Self::Row;

    /// Rewind to before the first row.
    fn rewind(&mut self) -> Result<(), Self::Error>;

    /// Release any resources. Idempotent.
    fn release(&mut self) -> Result<(), Self::Error>;

    /// Total row count, when cheaply known.
    fn size(&self) -> i64;

    /// Memory already accounted for by a precomputed state this cursor
    /// reuses across executions (pass-through; this operator never reads
    /// the value itself, only sums the two sides' for its own
    /// `pre_computed_state_size`).
    fn pre_computed_state_size(&self) -> usize;

    /// Estimate row count, honoring cooperative cancellation.
    fn calculate_size(
        &self,
        cancel: &dyn CancellationToken,
        counter: &mut i64,
    ) -> Result<i64, Self::Error>;
}
