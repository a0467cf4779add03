use std::cmp::Ordering;

use redb::{ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::db::{next_id, Database, DatabaseError};

/// A row type stored in its own redb table, keyed by a numeric id.
pub trait Record: Serialize + DeserializeOwned {
    /// Table holding msgpack-encoded rows of this type.
    const TABLE: TableDefinition<'static, u64, &'static [u8]>;
    /// Sequence name used to issue ids.
    const KIND: &'static str;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

pub(super) fn write_record<R: Record>(
    write_txn: &WriteTransaction,
    record: &R,
) -> Result<(), DatabaseError> {
    debug_assert!(record.id() != 0, "record id must be assigned");

    let mut table = write_txn.open_table(R::TABLE)?;
    let data = rmp_serde::to_vec_named(record)?;
    table.insert(record.id(), data.as_slice())?;
    Ok(())
}

pub(super) fn read_record<R: Record>(
    write_txn: &WriteTransaction,
    id: u64,
) -> Result<Option<R>, DatabaseError> {
    let table = write_txn.open_table(R::TABLE)?;
    let result = match table.get(id)? {
        Some(data) => Some(rmp_serde::from_slice(data.value())?),
        None => None,
    };
    Ok(result)
}

impl Database {
    // ========================================================================
    // Generic record operations
    // ========================================================================

    /// Assign the next id to `record` and store it.
    pub fn insert<R: Record>(&self, record: &mut R) -> Result<u64, DatabaseError> {
        let write_txn = self.begin_write()?;
        let id = next_id(&write_txn, R::KIND)?;
        record.set_id(id);
        write_record(&write_txn, record)?;
        write_txn.commit()?;
        Ok(id)
    }

    /// Get a record by id
    pub fn get<R: Record>(&self, id: u64) -> Result<Option<R>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(R::TABLE)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// All records in ascending id order
    pub fn all<R: Record>(&self) -> Result<Vec<R>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(R::TABLE)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            records.push(rmp_serde::from_slice(value.value())?);
        }

        Ok(records)
    }

    /// Records matching `predicate`, sorted by `order` then by id.
    pub fn find_by<R, P, O>(&self, predicate: P, order: O) -> Result<Vec<R>, DatabaseError>
    where
        R: Record,
        P: Fn(&R) -> bool,
        O: Fn(&R, &R) -> Ordering,
    {
        let mut records: Vec<R> = self.all()?.into_iter().filter(|r| predicate(r)).collect();
        records.sort_by(|a, b| order(a, b).then_with(|| a.id().cmp(&b.id())));
        Ok(records)
    }

    /// Read-modify-write a record inside a single write transaction.
    /// Returns `Ok(None)` when the id is unknown. If `f` fails nothing is written.
    pub fn modify<R, E, F>(&self, id: u64, f: F) -> Result<Option<R>, E>
    where
        R: Record,
        E: From<DatabaseError>,
        F: FnOnce(&mut R) -> Result<(), E>,
    {
        let write_txn = self.begin_write()?;
        let mut record: R = match read_record(&write_txn, id)? {
            Some(record) => record,
            None => return Ok(None),
        };

        f(&mut record)?;
        record.set_id(id);
        write_record(&write_txn, &record)?;
        write_txn.commit().map_err(DatabaseError::from)?;
        Ok(Some(record))
    }

    /// Delete a record by id, returning the removed row
    pub fn remove<R: Record>(&self, id: u64) -> Result<Option<R>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(R::TABLE)?;
            let result = match table.remove(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            result
        };
        write_txn.commit()?;
        Ok(removed)
    }
}
