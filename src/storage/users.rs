use redb::{ReadableTable, WriteTransaction};

use super::db::{next_id, Database, DatabaseError};
use super::models::User;
use super::records::{read_record, write_record, Record};
use super::tables::*;

/// Normalize an email address for the uniqueness index
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Database {
    // ========================================================================
    // User operations
    // ========================================================================

    /// Store a new user and claim its email in the index.
    /// Fails with `Duplicate` if the email already belongs to another account.
    pub fn insert_user(&self, user: &mut User) -> Result<u64, DatabaseError> {
        user.email = normalize_email(&user.email);

        let write_txn = self.begin_write()?;
        {
            let emails = write_txn.open_table(USER_EMAILS)?;
            if emails.get(user.email.as_str())?.is_some() {
                return Err(DatabaseError::Duplicate(user.email.clone()));
            }
        }

        let id = next_id(&write_txn, User::KIND)?;
        user.id = id;
        write_record(&write_txn, user)?;
        {
            let mut emails = write_txn.open_table(USER_EMAILS)?;
            emails.insert(user.email.as_str(), id)?;
        }
        write_txn.commit()?;
        Ok(id)
    }

    /// Edit a user inside a single write transaction, moving its email index
    /// entry when the email changed. Fields `edit` leaves alone keep the values
    /// read in the transaction, so concurrent logins and logouts are not undone.
    /// Returns `Ok(None)` if the user does not exist.
    pub fn update_user<E, F>(&self, id: u64, edit: F) -> Result<Option<User>, E>
    where
        E: From<DatabaseError>,
        F: FnOnce(&mut User) -> Result<(), E>,
    {
        let write_txn = self.begin_write()?;
        let existing: User = match read_record(&write_txn, id)? {
            Some(existing) => existing,
            None => return Ok(None),
        };

        let mut user = existing.clone();
        edit(&mut user)?;
        user.id = id;
        user.email = normalize_email(&user.email);

        if existing.email != user.email {
            move_email(&write_txn, id, &existing.email, &user.email)?;
        }

        write_record(&write_txn, &user)?;
        write_txn.commit().map_err(DatabaseError::from)?;
        Ok(Some(user))
    }

    /// Delete a user and its email index entry
    pub fn delete_user(&self, id: u64) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let existing: Option<User> = read_record(&write_txn, id)?;

        let deleted = match existing {
            Some(user) => {
                {
                    let mut table = write_txn.open_table(USERS)?;
                    table.remove(id)?;
                }
                {
                    let mut emails = write_txn.open_table(USER_EMAILS)?;
                    emails.remove(user.email.as_str())?;
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    /// Look up a user by email (case-insensitive)
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let email = normalize_email(email);
        let read_txn = self.begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS)?;

        let id = match emails.get(email.as_str())? {
            Some(id) => id.value(),
            None => return Ok(None),
        };

        drop(emails);
        drop(read_txn);
        self.get(id)
    }

    /// Id of the account owning `email`, if any
    pub fn email_owner(&self, email: &str) -> Result<Option<u64>, DatabaseError> {
        let email = normalize_email(email);
        let read_txn = self.begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS)?;
        let owner = emails.get(email.as_str())?.map(|v| v.value());
        Ok(owner)
    }
}

fn move_email(
    write_txn: &WriteTransaction,
    id: u64,
    from: &str,
    to: &str,
) -> Result<(), DatabaseError> {
    let mut emails = write_txn.open_table(USER_EMAILS)?;
    let owner = emails.get(to)?.map(|v| v.value());
    if matches!(owner, Some(owner) if owner != id) {
        return Err(DatabaseError::Duplicate(to.to_string()));
    }
    emails.remove(from)?;
    emails.insert(to, id)?;
    Ok(())
}
