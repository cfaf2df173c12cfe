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

//! Error types for the ASOF join operator.
//!
//! Mirrors the engine-wide convention of one [`thiserror::Error`] enum per
//! crate with a transparent catch-all for collaborator errors that don't
//! warrant their own variant (see `risingwave_meta`'s `BackupError` for the
//! pattern this follows).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, JoinError>;

/// Failure kinds surfaced by the ASOF join operator and its factory.
///
/// Cancellation is not represented here: per the operator's external
/// interfaces, the cancellation token is an execution-context collaborator,
/// and a cancelled source cursor surfaces as an [`JoinError::Iteration`]
/// wrapping whatever error that collaborator produced.
#[derive(Error, Debug)]
pub enum JoinError {
    /// The key index (or any other construction-time allocation) failed.
    /// Anything already allocated must be closed before this propagates.
    #[error("failed to construct asof join cursor: {0}")]
    Construction(#[source] anyhow::Error),

    /// Acquiring the master or slave source cursor failed during `bind`.
    /// Any cursor already acquired is released before this propagates.
    #[error("failed to acquire source cursor for asof join: {0}")]
    ExecutionAcquire(#[source] anyhow::Error),

    /// A source cursor's `advance` or `random_read` failed mid-iteration.
    /// Not caught by the operator; the caller is expected to release it.
    #[error("source cursor iteration failed: {0}")]
    Iteration(#[source] anyhow::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JoinError {
    pub(crate) fn construction(e: impl Into<anyhow::Error>) -> Self {
        JoinError::Construction(e.into())
    }

    pub(crate) fn execution_acquire(e: impl Into<anyhow::Error>) -> Self {
        JoinError::ExecutionAcquire(e.into())
    }

    pub(crate) fn iteration(e: impl Into<anyhow::Error>) -> Self {
        JoinError::Iteration(e.into())
    }
}
