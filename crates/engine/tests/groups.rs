use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, GroupRole, NewContactCmd, NewMemberCmd, UpdateMemberCmd};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db(users: &[&str]) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in users {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![(*user).into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

#[tokio::test]
async fn new_group_enrolls_creator_as_admin() {
    let (engine, _db) = engine_with_db(&["alice"]).await;

    let group_id = engine
        .new_group("Flatmates", Some("Via Roma 1"), "alice")
        .await
        .unwrap();

    let group = engine.group(&group_id.to_string(), "alice").await.unwrap();
    assert_eq!(group.name, "Flatmates");
    assert_eq!(group.owner_id, "alice");
    assert!(group.active);

    let members = engine
        .list_group_members(&group_id.to_string(), "alice")
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, "alice");
    assert_eq!(members[0].role, GroupRole::Admin);
    assert!(members[0].is_registered_user);
}

#[tokio::test]
async fn added_members_are_guests_with_synthetic_identity() {
    let (engine, _db) = engine_with_db(&["alice"]).await;
    let group_id = engine.new_group("Trip", None, "alice").await.unwrap();

    let member = engine
        .add_group_member(
            &group_id.to_string(),
            NewMemberCmd::new("Mario")
                .email("mario@example.com")
                .relationship_label("friend"),
            "alice",
        )
        .await
        .unwrap();

    assert!(!member.is_registered_user);
    assert_eq!(member.role, GroupRole::Member);
    // Synthetic identity: a fresh UUID, not a username.
    assert!(Uuid::parse_str(&member.user_id).is_ok());
    assert_eq!(member.email.as_deref(), Some("mario@example.com"));
}

#[tokio::test]
async fn duplicate_member_email_is_a_conflict() {
    let (engine, _db) = engine_with_db(&["alice"]).await;
    let group_id = engine.new_group("Trip", None, "alice").await.unwrap();

    engine
        .add_group_member(
            &group_id.to_string(),
            NewMemberCmd::new("Mario").email("mario@example.com"),
            "alice",
        )
        .await
        .unwrap();

    // Same mailbox under a different display name and casing.
    let err = engine
        .add_group_member(
            &group_id.to_string(),
            NewMemberCmd::new("Super Mario").email("MARIO@example.com"),
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn admin_member_cannot_be_removed() {
    let (engine, _db) = engine_with_db(&["alice"]).await;
    let group_id = engine.new_group("Trip", None, "alice").await.unwrap();

    let members = engine
        .list_group_members(&group_id.to_string(), "alice")
        .await
        .unwrap();
    let admin_id = members[0].id;

    let err = engine
        .remove_group_member(&group_id.to_string(), admin_id, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRole(_)));

    let guest = engine
        .add_group_member(
            &group_id.to_string(),
            NewMemberCmd::new("Mario"),
            "alice",
        )
        .await
        .unwrap();
    engine
        .remove_group_member(&group_id.to_string(), guest.id, "alice")
        .await
        .unwrap();

    let members = engine
        .list_group_members(&group_id.to_string(), "alice")
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn member_display_fields_can_be_edited() {
    let (engine, _db) = engine_with_db(&["alice"]).await;
    let group_id = engine.new_group("Trip", None, "alice").await.unwrap();

    let guest = engine
        .add_group_member(
            &group_id.to_string(),
            NewMemberCmd::new("Mario"),
            "alice",
        )
        .await
        .unwrap();

    let updated = engine
        .update_group_member(
            &group_id.to_string(),
            guest.id,
            UpdateMemberCmd {
                name: Some("Mario Rossi".to_string()),
                phone: Some("+39 333 1234567".to_string()),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name, "Mario Rossi");
    assert_eq!(updated.phone.as_deref(), Some("+39 333 1234567"));
    // Untouched fields survive.
    assert_eq!(updated.user_id, guest.user_id);
}

#[tokio::test]
async fn foreign_groups_are_hidden() {
    let (engine, _db) = engine_with_db(&["alice", "bob"]).await;
    let group_id = engine.new_group("Trip", None, "alice").await.unwrap();

    let err = engine
        .group(&group_id.to_string(), "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    assert!(engine.list_groups("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn deactivated_groups_leave_listings() {
    let (engine, _db) = engine_with_db(&["alice"]).await;
    let group_id = engine.new_group("Trip", None, "alice").await.unwrap();

    engine
        .deactivate_group(&group_id.to_string(), "alice")
        .await
        .unwrap();
    assert!(engine.list_groups("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_group_removes_roster() {
    let (engine, _db) = engine_with_db(&["alice"]).await;
    let group_id = engine.new_group("Trip", None, "alice").await.unwrap();
    engine
        .add_group_member(
            &group_id.to_string(),
            NewMemberCmd::new("Mario"),
            "alice",
        )
        .await
        .unwrap();

    engine
        .delete_group(&group_id.to_string(), "alice")
        .await
        .unwrap();

    let err = engine
        .group(&group_id.to_string(), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn duplicate_contact_returns_the_existing_entry() {
    let (engine, _db) = engine_with_db(&["alice"]).await;

    let first = engine
        .add_contact(NewContactCmd::new("Mario", "mario@example.com"), "alice")
        .await
        .unwrap();
    let second = engine
        .add_contact(
            NewContactCmd::new("Mario Rossi", "MARIO@example.com"),
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.name, "Mario");

    let contacts = engine.list_contacts("alice").await.unwrap();
    assert_eq!(contacts.len(), 1);
}

#[tokio::test]
async fn removed_contacts_are_soft_deleted_and_revivable() {
    let (engine, _db) = engine_with_db(&["alice"]).await;

    let contact = engine
        .add_contact(NewContactCmd::new("Mario", "mario@example.com"), "alice")
        .await
        .unwrap();
    engine.remove_contact(contact.id, "alice").await.unwrap();
    assert!(engine.list_contacts("alice").await.unwrap().is_empty());

    // Adding the same email again revives the soft-deleted row.
    let revived = engine
        .add_contact(NewContactCmd::new("Mario", "mario@example.com"), "alice")
        .await
        .unwrap();
    assert_eq!(revived.id, contact.id);
    assert_eq!(engine.list_contacts("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_caller_is_rejected() {
    let (engine, _db) = engine_with_db(&["alice"]).await;

    let err = engine.new_group("Trip", None, "mallory").await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthenticated(_)));

    let err = engine.list_contacts("").await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthenticated(_)));
}
