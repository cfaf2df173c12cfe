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

//! The operator proper (spec §4.2–§4.3). This is the ~65% of the
//! implementation budget the spec assigns to the state machine: everything
//! else in the crate exists to give `advance` something to operate on.

use tracing::{instrument, trace};

use crate::cursor::SourceCursor;
use crate::error::{JoinError, Result};
use crate::index::KeyIndex;
use crate::join::config::AsOfJoinConfig;
use crate::join::state::JoinState;
use crate::key::{KeyHandle, KeySerializer};
use crate::row::{NullRow, OuterJoinRow, Row};

/// The streaming ASOF JOIN (light) operator.
///
/// Owns the key index for its entire lifetime, including the
/// closed-but-not-released interval between a `release`/`bind` pair
/// (spec §9 "Ownership of the KeyIndex"). `master`/`slave` are `None`
/// until the first `bind`; calling `advance`, `rewind`, or `current_row`
/// before that is a precondition violation in the caller, not a runtime
/// error the operator is specified to handle, so those paths panic with a
/// descriptive message rather than returning a [`JoinError`].
pub struct AsOfJoinCursor<M, S, Mk, Sk, Idx>
where
    M: SourceCursor,
    S: SourceCursor,
    Mk: KeySerializer<M::Row>,
    Sk: KeySerializer<S::Row>,
    Idx: KeyIndex,
{
    master: Option<M>,
    slave: Option<S>,
    index: Idx,
    master_key_serializer: Mk,
    slave_key_serializer: Sk,
    null_slave: NullRow,
    config: AsOfJoinConfig,
    state: JoinState,
    is_open: bool,
}

impl<M, S, Mk, Sk, Idx> AsOfJoinCursor<M, S, Mk, Sk, Idx>
where
    M: SourceCursor,
    S: SourceCursor,
    Mk: KeySerializer<M::Row>,
    Sk: KeySerializer<S::Row>,
    Idx: KeyIndex,
{
    /// Construct with the key index pre-allocated but closed (spec §3
    /// Lifecycle). Not bound to any source cursors yet.
    pub(crate) fn new(
        index: Idx,
        master_key_serializer: Mk,
        slave_key_serializer: Sk,
        null_slave_width: usize,
        config: AsOfJoinConfig,
    ) -> Self {
        Self {
            master: None,
            slave: None,
            index,
            master_key_serializer,
            slave_key_serializer,
            null_slave: NullRow::with_width(null_slave_width),
            config,
            state: JoinState::fresh(),
            is_open: false,
        }
    }

    /// Reopen the key index, reset transient state, and capture fresh
    /// source cursors for this execution.
    #[instrument(level = "debug", skip_all, fields(tolerance = ?self.config.tolerance))]
    pub fn bind(&mut self, master: M, slave: S) {
        self.index.reopen();
        self.state = JoinState::fresh();
        self.master = Some(master);
        self.slave = Some(slave);
        self.is_open = true;
    }

    fn master_mut(&mut self) -> &mut M {
        self.master.as_mut().expect("AsOfJoinCursor used before bind()")
    }

    fn slave_mut(&mut self) -> &mut S {
        self.slave.as_mut().expect("AsOfJoinCursor used before bind()")
    }

    fn master_ref(&self) -> &M {
        self.master.as_ref().expect("AsOfJoinCursor used before bind()")
    }

    fn slave_ref(&self) -> &S {
        self.slave.as_ref().expect("AsOfJoinCursor used before bind()")
    }

    fn master_key(&self, row: &M::Row) -> crate::key::KeyBytes {
        let mut handle = KeyHandle::new();
        self.master_key_serializer.write(row, &mut handle);
        handle.finish()
    }

    fn slave_key(&self, row: &S::Row) -> crate::key::KeyBytes {
        let mut handle = KeyHandle::new();
        self.slave_key_serializer.write(row, &mut handle);
        handle.finish()
    }

    /// Step the state machine. Returns `false` once the master cursor is
    /// exhausted; otherwise `current_row` refers to a joined row ready for
    /// projection (spec §4.2).
    pub fn advance(&mut self) -> Result<bool> {
        if self.state.master_has_next_pending {
            self.state.master_has_next =
                self.master_mut().advance().map_err(JoinError::iteration)?;
            self.state.master_has_next_pending = false;
        }
        if !self.state.master_has_next {
            return Ok(false);
        }

        let master_ts = self
            .master_ref()
            .current_row()
            .timestamp(self.config.master_ts_idx);
        let master_key = self.master_key(self.master_ref().current_row());
        let min_slave_ts = self.config.min_slave_ts(master_ts);

        if self.state.slave_timestamp <= master_ts {
            self.catch_up(master_ts, min_slave_ts)?;
        }

        self.state.has_slave = self.probe(&master_key, master_ts)?;

        self.state.master_has_next_pending = true;
        Ok(true)
    }

    /// Advance the slave cursor in lockstep with the master, inserting
    /// every slave row up to and including `master_ts` into the key index,
    /// and stopping at the first row that overshoots it (spec §4.2 step 4).
    fn catch_up(&mut self, master_ts: i64, min_slave_ts: i64) -> Result<()> {
        if self.state.has_dangling() {
            let dangling_id = self.state.last_slave_row_id;
            self.slave_mut()
                .random_read(dangling_id)
                .map_err(JoinError::iteration)?;
            let (probe_ts, key) = {
                let probe = self.slave_ref().probe_row();
                (probe.timestamp(self.config.slave_ts_idx), self.slave_key(probe))
            };
            if probe_ts >= min_slave_ts {
                trace!(row_id = dangling_id, "reinserting dangling slave row");
                self.index.insert_or_replace(key, dangling_id);
            }
        }

        loop {
            if !self.slave_mut().advance().map_err(JoinError::iteration)? {
                break;
            }
            let (slave_ts, row_id, insert_key) = {
                let row = self.slave_ref().current_row();
                let ts = row.timestamp(self.config.slave_ts_idx);
                let rid = row.row_id();
                let key = (ts <= master_ts && ts >= min_slave_ts).then(|| self.slave_key(row));
                (ts, rid, key)
            };
            if let Some(key) = insert_key {
                trace!(row_id, slave_ts, "inserting slave row into key index");
                self.index.insert_or_replace(key, row_id);
            }
            self.state.slave_timestamp = slave_ts;
            self.state.last_slave_row_id = row_id;
            if slave_ts > master_ts {
                trace!(row_id, slave_ts, master_ts, "slave row overshoots master, now dangling");
                break;
            }
        }
        Ok(())
    }

    /// Look up the master's key and, if present, re-check tolerance against
    /// the *current* master timestamp (spec §4.2 step 5).
    fn probe(&mut self, master_key: &crate::key::KeyBytes, master_ts: i64) -> Result<bool> {
        let Some(row_id) = self.index.lookup(master_key) else {
            return Ok(false);
        };
        self.slave_mut()
            .random_read(row_id)
            .map_err(JoinError::iteration)?;
        let slave_ts = self
            .slave_ref()
            .probe_row()
            .timestamp(self.config.slave_ts_idx);
        Ok(self.config.within_tolerance(master_ts, slave_ts))
    }

    /// The row most recently produced by `advance`.
    pub fn current_row(&self) -> OuterJoinRow<'_, M::Row, S::Row> {
        OuterJoinRow {
            master: self.master_ref().current_row(),
            slave_real: self.slave_ref().probe_row(),
            slave_null: &self.null_slave,
            has_slave: self.state.has_slave,
            column_split: self.config.column_split,
        }
    }

    /// Clear the key index and rewind both source cursors (spec §4.3).
    pub fn rewind(&mut self) -> Result<()> {
        self.index.clear();
        self.state = JoinState::fresh();
        self.master_mut().rewind().map_err(JoinError::iteration)?;
        self.slave_mut().rewind().map_err(JoinError::iteration)?;
        Ok(())
    }

    /// Close the key index and release both source cursors. Idempotent.
    pub fn release(&mut self) -> Result<()> {
        if !self.is_open {
            return Ok(());
        }
        self.index.close();
        if let Some(mut master) = self.master.take() {
            master.release().map_err(JoinError::iteration)?;
        }
        if let Some(mut slave) = self.slave.take() {
            slave.release().map_err(JoinError::iteration)?;
        }
        self.is_open = false;
        tracing::debug!("asof join cursor released");
        Ok(())
    }

    /// Equal to master `size`: outer join on master guarantees exactly one
    /// output row per master row (spec §4.3).
    pub fn size(&self) -> i64 {
        self.master_ref().size()
    }

    /// Sum of both sources' pre-computed state sizes (pass-through).
    pub fn pre_computed_state_size(&self) -> usize {
        self.master_ref().pre_computed_state_size() + self.slave_ref().pre_computed_state_size()
    }
}
