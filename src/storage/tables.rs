use redb::TableDefinition;

/// Last issued id per record kind: kind -> u64
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Content tables: id -> record (msgpack)
pub const EVENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("events");
pub const GALLERY: TableDefinition<u64, &[u8]> = TableDefinition::new("gallery");
pub const SPONSORS: TableDefinition<u64, &[u8]> = TableDefinition::new("sponsors");
pub const PARTNERS: TableDefinition<u64, &[u8]> = TableDefinition::new("partners");
pub const PROFESSIONAL_SERVICES: TableDefinition<u64, &[u8]> =
    TableDefinition::new("professional_services");
pub const PARTICULAR_SERVICES: TableDefinition<u64, &[u8]> =
    TableDefinition::new("particular_services");
pub const FEEDBACK: TableDefinition<u64, &[u8]> = TableDefinition::new("feedback");

/// Contact requests and their subjects
pub const CONTACTS: TableDefinition<u64, &[u8]> = TableDefinition::new("contacts");
pub const SUBJECTS: TableDefinition<u64, &[u8]> = TableDefinition::new("subjects");

/// Admin console accounts
pub const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Email index: lowercase email -> user id
pub const USER_EMAILS: TableDefinition<&str, u64> = TableDefinition::new("user_emails");
