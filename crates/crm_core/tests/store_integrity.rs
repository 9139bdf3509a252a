use crm_core::db::open_db_in_memory;
use crm_core::{ContactRepository, ContactService, ErrorKind, RepoError, SqliteContactRepository};
use rusqlite::Connection;
use uuid::Uuid;

fn insert_contact_without_at_sign(conn: &Connection) -> Uuid {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO contacts (id, name, email) VALUES (?1, 'Broken', 'no-at-sign');",
        [id.to_string()],
    )
    .unwrap();
    id
}

#[test]
fn invalid_stored_contact_is_invalid_data_in_the_repo() {
    let conn = open_db_in_memory().unwrap();
    let id = insert_contact_without_at_sign(&conn);
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    match repo.get_contact(id) {
        Err(RepoError::InvalidData(message)) => assert!(message.contains("contacts")),
        other => panic!("expected InvalidData, got {other:?}"),
    }
    assert!(matches!(repo.list_contacts(), Err(RepoError::InvalidData(_))));
}

#[test]
fn invalid_stored_contact_is_a_server_error_from_the_service() {
    let conn = open_db_in_memory().unwrap();
    let id = insert_contact_without_at_sign(&conn);
    let contacts = ContactService::new(SqliteContactRepository::try_new(&conn).unwrap());

    let err = contacts.list().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert!(err.to_string().contains("invalid persisted data"));

    assert_eq!(contacts.get(id).unwrap_err().kind(), ErrorKind::ServerError);
}
