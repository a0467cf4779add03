use chrono::Utc;
use padel_cms::storage::models::{Contact, ContactStatus, GalleryItem, Subject, User};
use padel_cms::storage::{Database, DatabaseError, SubjectDeletion};

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn sample_item(title: &str, published: bool) -> GalleryItem {
    let now = Utc::now();
    GalleryItem {
        id: 0,
        title: title.to_string(),
        description: String::new(),
        image: None,
        published,
        created_at: now,
        updated_at: now,
    }
}

fn sample_user(email: &str) -> User {
    User {
        id: 0,
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        phone: None,
        roles: vec!["ROLE_USER".to_string()],
        password_hash: "hash".to_string(),
        session_id: None,
        session_expires_at: None,
        created_at: Utc::now(),
    }
}

fn sample_contact(subject_id: Option<u64>) -> Contact {
    Contact {
        id: 0,
        full_name: "Lucia Ruiz".to_string(),
        email: "lucia@example.com".to_string(),
        message: "Hello".to_string(),
        status: ContactStatus::Pending,
        subject_id,
        created_at: Utc::now(),
    }
}

// ============================================================================
// Generic records
// ============================================================================

#[test]
fn test_insert_and_get() {
    let (_dir, db) = test_db();
    let mut item = sample_item("Finals", true);

    let id = db.insert(&mut item).unwrap();
    assert_eq!(id, 1);
    assert_eq!(item.id, 1);

    let retrieved: GalleryItem = db.get(id).unwrap().expect("item should exist");
    assert_eq!(retrieved.title, "Finals");
    assert!(retrieved.published);
}

#[test]
fn test_get_missing() {
    let (_dir, db) = test_db();
    assert!(db.get::<GalleryItem>(42).unwrap().is_none());
}

#[test]
fn test_ids_are_never_reused() {
    let (_dir, db) = test_db();
    let first = db.insert(&mut sample_item("a", false)).unwrap();
    let second = db.insert(&mut sample_item("b", false)).unwrap();
    db.remove::<GalleryItem>(second).unwrap();

    let third = db.insert(&mut sample_item("c", false)).unwrap();
    assert_eq!((first, second, third), (1, 2, 3));
}

#[test]
fn test_sequences_are_per_kind() {
    let (_dir, db) = test_db();
    db.insert(&mut sample_item("a", false)).unwrap();
    db.insert(&mut sample_item("b", false)).unwrap();

    let mut subject = Subject {
        id: 0,
        kind: "Reservation".to_string(),
    };
    assert_eq!(db.insert(&mut subject).unwrap(), 1);
}

#[test]
fn test_all_in_id_order() {
    let (_dir, db) = test_db();
    for title in ["c", "a", "b"] {
        db.insert(&mut sample_item(title, false)).unwrap();
    }

    let titles: Vec<String> = db
        .all::<GalleryItem>()
        .unwrap()
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(titles, vec!["c", "a", "b"]);
}

#[test]
fn test_find_by_filters_and_orders() {
    let (_dir, db) = test_db();
    db.insert(&mut sample_item("b", true)).unwrap();
    db.insert(&mut sample_item("draft", false)).unwrap();
    db.insert(&mut sample_item("a", true)).unwrap();
    db.insert(&mut sample_item("a", true)).unwrap();

    let found: Vec<GalleryItem> = db
        .find_by(|i: &GalleryItem| i.published, |a, b| a.title.cmp(&b.title))
        .unwrap();

    let keys: Vec<(String, u64)> = found.into_iter().map(|i| (i.title, i.id)).collect();
    assert_eq!(
        keys,
        vec![
            ("a".to_string(), 3),
            ("a".to_string(), 4),
            ("b".to_string(), 1)
        ]
    );
}

#[test]
fn test_modify_writes_on_success() {
    let (_dir, db) = test_db();
    let id = db.insert(&mut sample_item("a", false)).unwrap();

    let updated = db
        .modify(id, |i: &mut GalleryItem| -> Result<(), DatabaseError> {
            i.published = true;
            Ok(())
        })
        .unwrap()
        .expect("item should exist");
    assert!(updated.published);

    let stored: GalleryItem = db.get(id).unwrap().unwrap();
    assert!(stored.published);
}

#[test]
fn test_modify_discards_on_error() {
    let (_dir, db) = test_db();
    let id = db.insert(&mut sample_item("a", false)).unwrap();

    let result = db.modify(id, |i: &mut GalleryItem| -> Result<(), DatabaseError> {
        i.title = "changed".to_string();
        Err(DatabaseError::Duplicate("forced".to_string()))
    });
    assert!(result.is_err());

    let stored: GalleryItem = db.get(id).unwrap().unwrap();
    assert_eq!(stored.title, "a");
}

#[test]
fn test_modify_missing_returns_none() {
    let (_dir, db) = test_db();
    let result = db
        .modify(9, |_: &mut GalleryItem| -> Result<(), DatabaseError> { Ok(()) })
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_remove_returns_row() {
    let (_dir, db) = test_db();
    let id = db.insert(&mut sample_item("gone", false)).unwrap();

    let removed: GalleryItem = db.remove(id).unwrap().expect("row should be returned");
    assert_eq!(removed.title, "gone");
    assert!(db.get::<GalleryItem>(id).unwrap().is_none());
    assert!(db.remove::<GalleryItem>(id).unwrap().is_none());
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data");
    {
        let db = Database::open(&path).unwrap();
        db.insert(&mut sample_item("kept", true)).unwrap();
    }

    let db = Database::open(&path).unwrap();
    let items: Vec<GalleryItem> = db.all().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(db.insert(&mut sample_item("next", true)).unwrap(), 2);
}

// ============================================================================
// Contact status
// ============================================================================

#[test]
fn test_contact_status_round_trips_through_storage() {
    let (_dir, db) = test_db();
    for status in [
        ContactStatus::Pending,
        ContactStatus::Rejected,
        ContactStatus::Resolved,
    ] {
        let mut contact = sample_contact(None);
        contact.status = status;
        let id = db.insert(&mut contact).unwrap();
        let stored: Contact = db.get(id).unwrap().unwrap();
        assert_eq!(stored.status, status);
    }
}

#[test]
fn test_contact_status_wire_format() {
    assert_eq!(serde_json::to_value(ContactStatus::Pending).unwrap(), serde_json::Value::Null);
    assert_eq!(serde_json::to_value(ContactStatus::Rejected).unwrap(), false);
    assert_eq!(serde_json::to_value(ContactStatus::Resolved).unwrap(), true);
}

#[test]
fn test_contact_status_toggle() {
    assert_eq!(ContactStatus::Pending.toggled(), None);
    assert_eq!(ContactStatus::Rejected.toggled(), Some(ContactStatus::Resolved));
    assert_eq!(ContactStatus::Resolved.toggled(), Some(ContactStatus::Rejected));
}

// ============================================================================
// Subjects
// ============================================================================

#[test]
fn test_delete_subject_in_use() {
    let (_dir, db) = test_db();
    let mut subject = Subject {
        id: 0,
        kind: "Lessons".to_string(),
    };
    let subject_id = db.insert(&mut subject).unwrap();
    db.insert(&mut sample_contact(Some(subject_id))).unwrap();
    db.insert(&mut sample_contact(Some(subject_id))).unwrap();

    assert!(matches!(
        db.delete_subject(subject_id).unwrap(),
        SubjectDeletion::InUse(2)
    ));
    assert!(db.get::<Subject>(subject_id).unwrap().is_some());
}

#[test]
fn test_delete_subject_unused() {
    let (_dir, db) = test_db();
    let mut subject = Subject {
        id: 0,
        kind: "Lessons".to_string(),
    };
    let subject_id = db.insert(&mut subject).unwrap();
    db.insert(&mut sample_contact(None)).unwrap();

    assert!(matches!(
        db.delete_subject(subject_id).unwrap(),
        SubjectDeletion::Deleted(_)
    ));
    assert!(matches!(
        db.delete_subject(subject_id).unwrap(),
        SubjectDeletion::NotFound
    ));
}

// ============================================================================
// Users
// ============================================================================

#[test]
fn test_insert_user_normalizes_email() {
    let (_dir, db) = test_db();
    let mut user = sample_user("  Coach@Club.TEST ");
    db.insert_user(&mut user).unwrap();

    assert_eq!(user.email, "coach@club.test");
    let found = db
        .find_user_by_email("COACH@club.test")
        .unwrap()
        .expect("user should be found");
    assert_eq!(found.id, user.id);
}

#[test]
fn test_insert_user_rejects_duplicate_email() {
    let (_dir, db) = test_db();
    db.insert_user(&mut sample_user("coach@club.test")).unwrap();

    let result = db.insert_user(&mut sample_user("Coach@club.test"));
    assert!(matches!(result, Err(DatabaseError::Duplicate(_))));
    assert_eq!(db.all::<User>().unwrap().len(), 1);
}

fn set_email(email: &'static str) -> impl FnOnce(&mut User) -> Result<(), DatabaseError> {
    move |u: &mut User| {
        u.email = email.to_string();
        Ok(())
    }
}

#[test]
fn test_update_user_moves_email_index() {
    let (_dir, db) = test_db();
    let mut user = sample_user("old@club.test");
    db.insert_user(&mut user).unwrap();

    let updated = db
        .update_user(user.id, set_email("New@Club.test"))
        .unwrap()
        .expect("user should exist");
    assert_eq!(updated.email, "new@club.test");

    assert!(db.find_user_by_email("old@club.test").unwrap().is_none());
    assert_eq!(db.email_owner("new@club.test").unwrap(), Some(user.id));
}

#[test]
fn test_update_user_duplicate_leaves_record_untouched() {
    let (_dir, db) = test_db();
    let mut first = sample_user("first@club.test");
    let mut second = sample_user("second@club.test");
    db.insert_user(&mut first).unwrap();
    db.insert_user(&mut second).unwrap();

    let result = db.update_user(second.id, |u: &mut User| -> Result<(), DatabaseError> {
        u.email = "first@club.test".to_string();
        u.first_name = "Changed".to_string();
        Ok(())
    });
    assert!(matches!(result, Err(DatabaseError::Duplicate(_))));

    let stored: User = db.get(second.id).unwrap().unwrap();
    assert_eq!(stored.email, "second@club.test");
    assert_eq!(stored.first_name, "Test");
    assert_eq!(db.email_owner("first@club.test").unwrap(), Some(first.id));
}

#[test]
fn test_update_user_keeps_session_written_meanwhile() {
    let (_dir, db) = test_db();
    let mut user = sample_user("coach@club.test");
    db.insert_user(&mut user).unwrap();

    // A login lands between the admin's read and the edit
    let stale: User = db.get(user.id).unwrap().unwrap();
    db.modify(user.id, |u: &mut User| -> Result<(), DatabaseError> {
        u.session_id = Some("fresh-session".to_string());
        Ok(())
    })
    .unwrap();

    let updated = db
        .update_user(stale.id, |u: &mut User| -> Result<(), DatabaseError> {
            u.first_name = "Renamed".to_string();
            Ok(())
        })
        .unwrap()
        .unwrap();

    assert_eq!(updated.first_name, "Renamed");
    assert_eq!(updated.session_id.as_deref(), Some("fresh-session"));
    let stored: User = db.get(user.id).unwrap().unwrap();
    assert_eq!(stored.session_id.as_deref(), Some("fresh-session"));
}

#[test]
fn test_update_missing_user() {
    let (_dir, db) = test_db();
    let result = db.update_user(99, set_email("ghost@club.test")).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_delete_user_frees_email() {
    let (_dir, db) = test_db();
    let mut user = sample_user("leaving@club.test");
    db.insert_user(&mut user).unwrap();

    assert!(db.delete_user(user.id).unwrap());
    assert!(!db.delete_user(user.id).unwrap());
    assert!(db.email_owner("leaving@club.test").unwrap().is_none());

    db.insert_user(&mut sample_user("leaving@club.test")).unwrap();
}
