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

//! Constructs the [`AsOfJoinCursor`], owning the key index allocation, and
//! wires fresh source cursors on each execution (spec §4.4).

use crate::cursor::SourceCursor;
use crate::error::{JoinError, Result};
use crate::index::KeyIndex;
use crate::join::config::AsOfJoinConfig;
use crate::join::cursor::AsOfJoinCursor;
use crate::key::KeySerializer;

/// A child factory: the plan-sink contract (spec §6) passes the master and
/// slave child factories to this operator's factory "in master-then-slave
/// order". Each call to `acquire` must return a fresh cursor positioned
/// before its first row.
pub trait CursorFactory {
    type Cursor: SourceCursor;

    fn acquire(&mut self) -> std::result::Result<Self::Cursor, anyhow::Error>;

    /// Release any resources the factory itself holds (connection pools,
    /// metadata handles) independent of whatever cursors it has already
    /// handed out via `acquire`. Idempotent.
    fn release(&mut self) -> std::result::Result<(), anyhow::Error>;
}

/// Owns the key index and both child cursor factories. `execute` is called
/// once per query execution; the returned cursor borrows this factory's
/// key index until `release`.
pub struct AsOfJoinFactory<MF, SF, Mk, Sk, Idx>
where
    MF: CursorFactory,
    SF: CursorFactory,
    Mk: KeySerializer<<MF::Cursor as SourceCursor>::Row>,
    Sk: KeySerializer<<SF::Cursor as SourceCursor>::Row>,
    Idx: KeyIndex,
{
    master_factory: MF,
    slave_factory: SF,
    cursor: AsOfJoinCursor<MF::Cursor, SF::Cursor, Mk, Sk, Idx>,
}

impl<MF, SF, Mk, Sk, Idx> AsOfJoinFactory<MF, SF, Mk, Sk, Idx>
where
    MF: CursorFactory,
    SF: CursorFactory,
    Mk: KeySerializer<<MF::Cursor as SourceCursor>::Row>,
    Sk: KeySerializer<<SF::Cursor as SourceCursor>::Row>,
    Idx: KeyIndex,
{
    /// Construct the key index once (spec §4.4: "allocated from
    /// configuration, keyed on the declared join column types"), keeping
    /// it closed until the first `execute`.
    pub fn new(
        master_factory: MF,
        slave_factory: SF,
        master_key_serializer: Mk,
        slave_key_serializer: Sk,
        index: Idx,
        slave_column_count: usize,
        config: AsOfJoinConfig,
    ) -> Result<Self> {
        config.validate().map_err(JoinError::construction)?;
        let cursor = AsOfJoinCursor::new(
            index,
            master_key_serializer,
            slave_key_serializer,
            slave_column_count,
            config,
        );
        Ok(Self { master_factory, slave_factory, cursor })
    }

    /// Acquire fresh source cursors, bind them, and hand back the operator.
    /// On any failure acquiring either cursor, the one already acquired is
    /// released before the error propagates (spec §4.4, §5 "scoped
    /// acquisition discipline").
    pub fn execute(
        &mut self,
    ) -> Result<&mut AsOfJoinCursor<MF::Cursor, SF::Cursor, Mk, Sk, Idx>> {
        let master = self
            .master_factory
            .acquire()
            .map_err(JoinError::execution_acquire)?;

        let slave = match self.slave_factory.acquire() {
            Ok(slave) => slave,
            Err(e) => {
                let mut master = master;
                // Best effort: surface the acquire failure even if release
                // of the already-acquired master cursor also fails.
                let _ = master.release();
                return Err(JoinError::execution_acquire(e));
            }
        };

        self.cursor.bind(master, slave);
        Ok(&mut self.cursor)
    }

    /// Release the operator, which in turn closes the key index and
    /// releases both source cursors, then release the master and slave
    /// child factories themselves (spec §4.4: "releases metadata, both
    /// source factories, and the JoinCursor").
    pub fn release(&mut self) -> Result<()> {
        self.cursor.release()?;
        self.master_factory.release().map_err(JoinError::iteration)?;
        self.slave_factory.release().map_err(JoinError::iteration)?;
        Ok(())
    }
}
