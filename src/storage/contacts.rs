use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{Contact, Subject};
use super::records::read_record;
use super::tables::*;

/// Outcome of [`Database::delete_subject`].
#[derive(Debug)]
pub enum SubjectDeletion {
    Deleted(Subject),
    /// Still referenced by this many contact requests; nothing was removed.
    InUse(usize),
    NotFound,
}

impl Database {
    // ========================================================================
    // Contact subject operations
    // ========================================================================

    /// Delete a subject unless a contact request still references it.
    /// The reference check and the delete share one write transaction.
    pub fn delete_subject(&self, id: u64) -> Result<SubjectDeletion, DatabaseError> {
        let write_txn = self.begin_write()?;
        let subject: Subject = match read_record(&write_txn, id)? {
            Some(subject) => subject,
            None => return Ok(SubjectDeletion::NotFound),
        };

        let references = {
            let contacts = write_txn.open_table(CONTACTS)?;
            let mut count = 0;
            for result in contacts.iter()? {
                let (_, value) = result?;
                let contact: Contact = rmp_serde::from_slice(value.value())?;
                if contact.subject_id == Some(id) {
                    count += 1;
                }
            }
            count
        };
        if references > 0 {
            return Ok(SubjectDeletion::InUse(references));
        }

        {
            let mut subjects = write_txn.open_table(SUBJECTS)?;
            subjects.remove(id)?;
        }
        write_txn.commit()?;
        Ok(SubjectDeletion::Deleted(subject))
    }
}
