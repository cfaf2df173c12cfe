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

//! Join key projection: turns a master or slave row into the stable byte
//! shape used as a [`crate::index::KeyIndex`] key.
//!
//! Grounded in the engine's `hash::key_v2` serializer, which also writes a
//! key as a growable byte buffer via [`bytes::BufMut`] rather than hashing
//! columns ad hoc; the difference here is that two distinct serializers
//! (one per side) must be guaranteed to agree on the byte shape for rows
//! that should join, so `KeySerializer` is parameterized by the row type
//! it reads from rather than shared.

use bytes::{Bytes, BytesMut};

use crate::row::Row;

/// Byte-equal key drawn from the same value space for master and slave
/// rows. Cheap to clone (`Bytes` is refcounted) so it can be stored as a
/// [`crate::index::KeyIndex`] key and also handed to `lookup` without an
/// extra copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBytes(Bytes);

impl KeyBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for KeyBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for KeyBytes {
    fn from(b: Bytes) -> Self {
        KeyBytes(b)
    }
}

/// Key-construction handle: the serializer writes into this via
/// [`bytes::BufMut`]; once writing is done, [`KeyHandle::finish`] seals it
/// into a [`KeyBytes`].
#[derive(Debug, Default)]
pub struct KeyHandle {
    buf: BytesMut,
}

impl KeyHandle {
    pub fn new() -> Self {
        Self { buf: BytesMut::new() }
    }

    /// The buffer the serializer writes key bytes into.
    pub fn writer(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    pub fn finish(self) -> KeyBytes {
        KeyBytes(self.buf.freeze())
    }
}

/// Deterministic, side-effect-free projection from a record to key bytes
/// (spec §6: "KeySerializer capability set"). `masterKS` and `slaveKS` are
/// two distinct implementations of this trait, over the master's and
/// slave's respective row types, which must agree on the byte shape for
/// any pair of rows that should join.
pub trait KeySerializer<R: Row> {
    fn write(&self, record: &R, handle: &mut KeyHandle);
}

/// Serializes the key as the big-endian bytes of a fixed list of `Int64`
/// columns. Good enough for every scenario in this crate's test suite and
/// for any engine whose join columns are integer-typed; a real engine with
/// string or composite join keys supplies its own [`KeySerializer`].
#[derive(Debug, Clone)]
pub struct Int64ColumnsKeySerializer {
    columns: Vec<usize>,
}

impl Int64ColumnsKeySerializer {
    pub fn new(columns: Vec<usize>) -> Self {
        assert!(!columns.is_empty(), "key serializer needs at least one column");
        Self { columns }
    }
}

impl<R: Row> KeySerializer<R> for Int64ColumnsKeySerializer {
    fn write(&self, record: &R, handle: &mut KeyHandle) {
        use bytes::BufMut;
        use crate::row::Datum;

        for &col in &self.columns {
            match record.datum_at(col) {
                Datum::Int64(v) => {
                    handle.writer().put_u8(1);
                    handle.writer().put_i64(v);
                }
                Datum::Bytes(b) => {
                    handle.writer().put_u8(2);
                    handle.writer().put_u32(b.len() as u32);
                    handle.writer().put_slice(b);
                }
                Datum::Null => handle.writer().put_u8(0),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Datum;

    struct FixedRow(Vec<Datum<'static>>);
    impl Row for FixedRow {
        fn len(&self) -> usize {
            self.0.len()
        }
        fn datum_at(&self, index: usize) -> Datum<'_> {
            self.0[index]
        }
        fn row_id(&self) -> crate::row::RowId {
            0
        }
    }

    fn key_of(ser: &Int64ColumnsKeySerializer, row: &FixedRow) -> KeyBytes {
        let mut handle = KeyHandle::new();
        ser.write(row, &mut handle);
        handle.finish()
    }

    #[test]
    fn equal_columns_produce_equal_keys() {
        let ser = Int64ColumnsKeySerializer::new(vec![0]);
        let a = FixedRow(vec![Datum::Int64(42)]);
        let b = FixedRow(vec![Datum::Int64(42)]);
        assert_eq!(key_of(&ser, &a), key_of(&ser, &b));
    }

    #[test]
    fn different_columns_produce_different_keys() {
        let ser = Int64ColumnsKeySerializer::new(vec![0]);
        let a = FixedRow(vec![Datum::Int64(42)]);
        let b = FixedRow(vec![Datum::Int64(43)]);
        assert_ne!(key_of(&ser, &a), key_of(&ser, &b));
    }

    #[test]
    fn null_is_distinct_from_any_value() {
        let ser = Int64ColumnsKeySerializer::new(vec![0]);
        let a = FixedRow(vec![Datum::Null]);
        let b = FixedRow(vec![Datum::Int64(0)]);
        assert_ne!(key_of(&ser, &a), key_of(&ser, &b));
    }
}
