mod contacts;
pub mod db;
pub mod models;
mod records;
mod tables;
mod users;

pub use contacts::SubjectDeletion;
pub use db::{Database, DatabaseError};
pub use records::Record;
pub use tables::*;
pub use users::normalize_email;
