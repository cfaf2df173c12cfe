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

//! Streaming ASOF JOIN operator (the "light" variant) for a columnar
//! time-series query engine.
//!
//! Given a master (driving) cursor and a slave (probe) cursor, both
//! ordered by a designated timestamp column, [`join::AsOfJoinCursor`]
//! emits, for each master row, that row joined with the slave row whose
//! key matches and whose timestamp is the greatest not exceeding the
//! master's, optionally bounded by a tolerance interval. Unmatched master
//! rows are still emitted, with slave columns logically null.
//!
//! The join index (see [`index`]) stores only a row identifier per key —
//! not a materialized copy of the slave record — so the operator re-reads
//! the slave row by identifier through [`cursor::SourceCursor::random_read`]
//! when producing output. SQL parsing/planning, the source cursors
//! themselves, the key index's backing map, query cancellation, and result
//! projection are all external collaborators (narrow interfaces in
//! [`cursor`], [`key`], [`index`]) rather than this crate's concern.

pub mod cursor;
pub mod error;
pub mod index;
pub mod join;
pub mod key;
pub mod row;

pub use error::{JoinError, Result};
pub use join::{AsOfDirection, AsOfJoinConfig, AsOfJoinCursor, AsOfJoinFactory, CursorFactory};
pub use row::{NullRow, OuterJoinRow, Row, RowId, NULL_ROW_ID};
