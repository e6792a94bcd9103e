use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Engine, EngineError, Participant, ResolvedPayer, ShareInput, SplitType, SubmitSplitCmd,
};
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

fn registered(user_id: &str) -> ShareInput {
    ShareInput::new(Participant::Registered {
        user_id: user_id.to_string(),
    })
}

fn guest(local_id: &str, name: &str, email: &str) -> ShareInput {
    ShareInput::new(Participant::Guest {
        id: Some(local_id.to_string()),
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: None,
    })
}

async fn group_for(engine: &Engine, owner: &str) -> Uuid {
    engine.new_group("Trip", None, owner).await.unwrap()
}

#[tokio::test]
async fn equal_split_creates_transaction_and_splits_atomically() {
    let (engine, _db) = engine_with_db(&["alice", "bob", "carol"]).await;
    let group_id = group_for(&engine, "alice").await;

    let cmd = SubmitSplitCmd::new(10000, SplitType::Equal, Utc::now())
        .group_id(group_id)
        .note("Dinner")
        .share(registered("alice"))
        .share(registered("bob"))
        .share(registered("carol"));
    let outcome = engine.submit_split_transaction(cmd, "alice").await.unwrap();
    assert!(outcome.link_failures.is_empty());

    let (page, next) = engine
        .list_group_expenses(&group_id.to_string(), "alice", 10, None)
        .await
        .unwrap();
    assert!(next.is_none());
    assert_eq!(page.len(), 1);

    let (tx, mut splits) = page.into_iter().next().unwrap();
    assert_eq!(tx.id, outcome.transaction_id);
    assert_eq!(tx.amount.cents(), 10000);
    assert_eq!(tx.split_count, 3);
    assert!(tx.has_splits);

    // Residual cent lands on the first participant.
    splits.sort_by(|a, b| b.amount.cmp(&a.amount));
    let amounts: Vec<i64> = splits.iter().map(|s| s.amount.cents()).collect();
    assert_eq!(amounts, vec![3334, 3333, 3333]);

    for split in &splits {
        assert_eq!(split.payer.registered_user_id(), Some("alice"));
        assert_eq!(split.split_type, SplitType::Equal);
    }
}

#[tokio::test]
async fn percentage_split_shares_sum_within_tolerance() {
    let (engine, _db) = engine_with_db(&["alice", "bob", "carol"]).await;
    let group_id = group_for(&engine, "alice").await;

    let cmd = SubmitSplitCmd::new(25000, SplitType::Percentage, Utc::now())
        .group_id(group_id)
        .share(registered("alice").percentage(33.3))
        .share(registered("bob").percentage(33.3))
        .share(registered("carol").percentage(33.4));
    let outcome = engine.submit_split_transaction(cmd, "alice").await.unwrap();

    let (page, _) = engine
        .list_group_expenses(&group_id.to_string(), "alice", 10, None)
        .await
        .unwrap();
    let (tx, splits) = page.into_iter().next().unwrap();
    assert_eq!(tx.id, outcome.transaction_id);

    let sum: i64 = splits.iter().map(|s| s.amount.cents()).sum();
    assert!((sum - 25000).abs() <= 1);
    assert!(splits.iter().all(|s| s.share_percentage.is_some()));
}

#[tokio::test]
async fn invalid_custom_split_carries_validator_report() {
    let (engine, _db) = engine_with_db(&["alice", "bob", "carol"]).await;

    let cmd = SubmitSplitCmd::new(10000, SplitType::Custom, Utc::now())
        .share(registered("alice").amount_minor(6000))
        .share(registered("bob").amount_minor(-1000))
        .share(registered("carol").amount_minor(5000));
    let err = engine
        .submit_split_transaction(cmd, "alice")
        .await
        .unwrap_err();

    let EngineError::Validation(report) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert!(!report.is_valid);
    assert!(!report.errors.is_empty());
}

#[tokio::test]
async fn zero_share_warns_but_submits() {
    let (engine, _db) = engine_with_db(&["alice", "bob"]).await;

    let cmd = SubmitSplitCmd::new(10000, SplitType::Custom, Utc::now())
        .share(registered("alice").amount_minor(10000))
        .share(registered("bob").amount_minor(0));
    let outcome = engine.submit_split_transaction(cmd, "alice").await.unwrap();
    assert!(outcome.validation.is_valid);
    assert_eq!(outcome.validation.warnings.len(), 1);
}

#[tokio::test]
async fn guest_payer_is_stamped_on_every_row() {
    let (engine, _db) = engine_with_db(&["alice"]).await;
    let group_id = group_for(&engine, "alice").await;

    let cmd = SubmitSplitCmd::new(5000, SplitType::Equal, Utc::now())
        .group_id(group_id)
        .paid_by("g-1")
        .share(registered("alice"))
        .share(guest("g-1", "Mario", "mario@example.com"));
    engine.submit_split_transaction(cmd, "alice").await.unwrap();

    let (page, _) = engine
        .list_group_expenses(&group_id.to_string(), "alice", 10, None)
        .await
        .unwrap();
    let (_, splits) = page.into_iter().next().unwrap();
    assert_eq!(splits.len(), 2);

    // The guest payer bundle is duplicated onto every row, not only the
    // guest's own.
    for split in &splits {
        assert_eq!(split.payer.registered_user_id(), None);
        assert_eq!(
            split.payer,
            ResolvedPayer::Guest {
                name: "Mario".to_string(),
                email: Some("mario@example.com".to_string()),
                phone: None,
            }
        );
    }
}

#[tokio::test]
async fn relationship_failure_never_blocks_the_transaction() {
    // "dave" has no account: linking his relationship fails, the split
    // is still created without a link.
    let (engine, _db) = engine_with_db(&["alice", "bob", "carol"]).await;
    let group_id = group_for(&engine, "alice").await;

    let cmd = SubmitSplitCmd::new(9000, SplitType::Equal, Utc::now())
        .group_id(group_id)
        .share(registered("bob"))
        .share(registered("carol"))
        .share(registered("dave"));
    let outcome = engine.submit_split_transaction(cmd, "alice").await.unwrap();

    assert_eq!(outcome.link_failures.len(), 1);
    assert_eq!(outcome.link_failures[0].participant, "dave");
    assert_eq!(outcome.refreshes.len(), 2);
    assert!(outcome.refreshes.iter().all(|r| r.result.is_ok()));

    let (page, _) = engine
        .list_group_expenses(&group_id.to_string(), "alice", 10, None)
        .await
        .unwrap();
    let (_, splits) = page.into_iter().next().unwrap();
    assert_eq!(splits.len(), 3);

    for split in &splits {
        let linked = split.relationship_id.is_some();
        match split.participant.user_id() {
            Some("bob") | Some("carol") => assert!(linked),
            _ => assert!(!linked),
        }
    }
}

#[tokio::test]
async fn balance_refresh_is_idempotent() {
    let (engine, _db) = engine_with_db(&["alice", "bob"]).await;
    let group_id = group_for(&engine, "alice").await;

    let cmd = SubmitSplitCmd::new(1000, SplitType::Equal, Utc::now())
        .group_id(group_id)
        .share(registered("alice"))
        .share(registered("bob"));
    let outcome = engine.submit_split_transaction(cmd, "alice").await.unwrap();
    assert_eq!(outcome.refreshes.len(), 1);
    let relationship_id = outcome.refreshes[0].relationship_id;

    // alice paid, bob owes half: +500 with (alice, bob) ordering.
    let first = engine
        .refresh_relationship_balance(relationship_id)
        .await
        .unwrap();
    let second = engine
        .refresh_relationship_balance(relationship_id)
        .await
        .unwrap();
    assert_eq!(first.cents(), 500);
    assert_eq!(second, first);
}

#[tokio::test]
async fn settle_clears_the_relationship_balance() {
    let (engine, _db) = engine_with_db(&["alice", "bob"]).await;
    let group_id = group_for(&engine, "alice").await;

    let cmd = SubmitSplitCmd::new(1000, SplitType::Equal, Utc::now())
        .group_id(group_id)
        .share(registered("alice"))
        .share(registered("bob"));
    engine.submit_split_transaction(cmd, "alice").await.unwrap();

    let (page, _) = engine
        .list_group_expenses(&group_id.to_string(), "alice", 10, None)
        .await
        .unwrap();
    let (_, splits) = page.into_iter().next().unwrap();
    let bob_split = splits
        .iter()
        .find(|s| s.participant.user_id() == Some("bob"))
        .unwrap();

    let outcome = engine
        .settle_split(bob_split.id, "cash", Some("paid at dinner"), "bob")
        .await
        .unwrap();
    assert!(outcome.settled);
    let refresh = outcome.refresh.unwrap();
    assert!(refresh.result.is_ok());

    let balance = engine
        .refresh_relationship_balance(refresh.relationship_id)
        .await
        .unwrap();
    assert!(balance.is_zero());

    // Settling again is a no-op.
    let again = engine
        .settle_split(bob_split.id, "cash", None, "bob")
        .await
        .unwrap();
    assert!(!again.settled);
    assert!(again.refresh.is_none());
}

#[tokio::test]
async fn group_balances_net_to_zero() {
    let (engine, _db) = engine_with_db(&["alice"]).await;
    let group_id = group_for(&engine, "alice").await;

    let cmd = SubmitSplitCmd::new(3000, SplitType::Equal, Utc::now())
        .group_id(group_id)
        .share(registered("alice"))
        .share(guest("g-1", "Mario", "mario@example.com"));
    engine.submit_split_transaction(cmd, "alice").await.unwrap();

    let balances = engine
        .group_balances(&group_id.to_string(), "alice")
        .await
        .unwrap();
    assert_eq!(balances.len(), 2);

    let total: i64 = balances.iter().map(|b| b.net.cents()).sum();
    assert_eq!(total, 0);

    let alice = balances
        .iter()
        .find(|b| b.user_id.as_deref() == Some("alice"))
        .unwrap();
    assert_eq!(alice.net.cents(), 1500);

    let mario = balances.iter().find(|b| b.user_id.is_none()).unwrap();
    assert_eq!(mario.net.cents(), -1500);
    assert_eq!(mario.display_name, "Mario");
}

#[tokio::test]
async fn expense_listing_paginates_newest_first() {
    let (engine, _db) = engine_with_db(&["alice", "bob"]).await;
    let group_id = group_for(&engine, "alice").await;

    for amount in [1000, 2000, 3000] {
        let cmd = SubmitSplitCmd::new(amount, SplitType::Equal, Utc::now())
            .group_id(group_id)
            .share(registered("alice"))
            .share(registered("bob"));
        engine.submit_split_transaction(cmd, "alice").await.unwrap();
    }

    let (first_page, cursor) = engine
        .list_group_expenses(&group_id.to_string(), "alice", 2, None)
        .await
        .unwrap();
    assert_eq!(first_page.len(), 2);
    let cursor = cursor.unwrap();

    let (second_page, end) = engine
        .list_group_expenses(&group_id.to_string(), "alice", 2, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);
    assert!(end.is_none());

    let seen: std::collections::HashSet<Uuid> = first_page
        .iter()
        .chain(second_page.iter())
        .map(|(tx, _)| tx.id)
        .collect();
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn submission_requires_a_resolvable_caller() {
    let (engine, _db) = engine_with_db(&["alice"]).await;

    let cmd = SubmitSplitCmd::new(1000, SplitType::Equal, Utc::now()).share(registered("alice"));
    let err = engine
        .submit_split_transaction(cmd, "nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthenticated(_)));
}
