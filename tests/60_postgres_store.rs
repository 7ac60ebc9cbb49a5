//! Store contract against a live Postgres. Each test works in its own
//! scratch tables and skips when DATABASE_URL is not set.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use house_feedback_api::config::DatabaseConfig;
use house_feedback_api::database::{
    DatabaseManager, NameMatch, PgStore, RecordStore, StoreError, StudentRoster,
};
use house_feedback_api::records::{Feedback, House, Improvement, RecordFields};

async fn pool() -> Result<Option<PgPool>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping Postgres store test");
        return Ok(None);
    };

    let pool = DatabaseManager::connect(&DatabaseConfig {
        url: Some(url),
        max_connections: 2,
        connection_timeout: 10,
    })
    .await?;
    Ok(Some(pool))
}

async fn scratch<F: RecordFields>(pool: &PgPool) -> Result<PgStore<F>> {
    let table = format!("{}_test_{}", F::COLLECTION, Uuid::new_v4().simple());
    let store = PgStore::<F>::in_table(pool.clone(), table);
    store.ensure_collection().await?;
    Ok(store)
}

async fn drop_scratch<F: RecordFields>(pool: &PgPool, store: &PgStore<F>) -> Result<()> {
    sqlx::query(&format!(r#"DROP TABLE IF EXISTS "{}""#, store.table()))
        .execute(pool)
        .await?;
    Ok(())
}

fn improvement(problem: &str) -> Improvement {
    Improvement {
        problem: problem.to_string(),
        solution: "fix it".to_string(),
        submitted_by: "tester".to_string(),
    }
}

fn feedback(name: &str, house: House) -> Feedback {
    Feedback {
        student_name: name.to_string(),
        house,
        rating: 4,
        comment: String::new(),
    }
}

#[tokio::test]
async fn lists_newest_first_with_insertion_tiebreak() -> Result<()> {
    let Some(pool) = pool().await? else {
        return Ok(());
    };
    let store = scratch::<Improvement>(&pool).await?;

    // One transaction usually lands in a single millisecond; seq breaks the tie
    let batch = store
        .insert_many(vec![improvement("a"), improvement("b"), improvement("c")])
        .await?;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let latest = store.create(improvement("d")).await?;

    let ids: Vec<Uuid> = store.list_all().await?.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![latest.id, batch[2].id, batch[1].id, batch[0].id]);

    drop_scratch(&pool, &store).await
}

#[tokio::test]
async fn update_never_inserts_and_delete_returns_the_record() -> Result<()> {
    let Some(pool) = pool().await? else {
        return Ok(());
    };
    let store = scratch::<Improvement>(&pool).await?;

    let missing = store.update_by_id(Uuid::new_v4(), improvement("ghost")).await;
    assert!(matches!(missing, Err(StoreError::NotFound("Improvement"))));
    assert!(store.list_all().await?.is_empty());

    let created = store.create(improvement("old")).await?;
    let updated = store.update_by_id(created.id, improvement("new")).await?;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.timestamp, created.timestamp);
    assert_eq!(updated.fields.problem, "new");

    let deleted = store.delete_by_id(created.id).await?;
    assert_eq!(deleted, updated);
    assert!(matches!(
        store.delete_by_id(created.id).await,
        Err(StoreError::NotFound(_))
    ));

    drop_scratch(&pool, &store).await
}

#[tokio::test]
async fn insert_many_rolls_back_on_failure() -> Result<()> {
    let Some(pool) = pool().await? else {
        return Ok(());
    };
    let store = scratch::<Improvement>(&pool).await?;

    sqlx::query(&format!(
        r#"ALTER TABLE "{}" ADD CONSTRAINT no_boom CHECK (doc->>'problem' <> 'boom')"#,
        store.table()
    ))
    .execute(&pool)
    .await?;

    let result = store
        .insert_many(vec![improvement("fine"), improvement("boom")])
        .await;
    assert!(matches!(result, Err(StoreError::Sqlx(_))));
    assert!(store.list_all().await?.is_empty());

    drop_scratch(&pool, &store).await
}

#[tokio::test]
async fn removal_predicates_agree_with_name_match() -> Result<()> {
    let Some(pool) = pool().await? else {
        return Ok(());
    };

    let bhairav = ["Ravinder Kaur", "ravinder", "RAVINDER", "Ravi", "Jannatveer Kaur"];

    for mode in [NameMatch::Exact, NameMatch::Prefix] {
        let store = scratch::<Feedback>(&pool).await?;
        for name in bhairav {
            store.create(feedback(name, House::Bhairav)).await?;
        }
        store.create(feedback("Ravinder Kaur", House::Megh)).await?;

        let expected = bhairav.iter().filter(|n| mode.matches(n, "Ravinder")).count() as u64;
        let removed = store.remove_students(House::Bhairav, "Ravinder", mode).await?;
        assert_eq!(removed, expected, "{:?}", mode);

        let mut left: Vec<String> = store
            .list_all()
            .await?
            .into_iter()
            .filter(|r| r.fields.house == House::Bhairav)
            .map(|r| r.fields.student_name)
            .collect();
        left.sort();
        let mut kept: Vec<String> = bhairav
            .iter()
            .filter(|n| !mode.matches(n, "Ravinder"))
            .map(|n| n.to_string())
            .collect();
        kept.sort();
        assert_eq!(left, kept, "{:?}", mode);

        // Other houses are never touched
        let megh = store
            .list_all()
            .await?
            .into_iter()
            .filter(|r| r.fields.house == House::Megh)
            .count();
        assert_eq!(megh, 1);

        drop_scratch(&pool, &store).await?;
    }
    Ok(())
}

#[tokio::test]
async fn corrupt_documents_surface_as_store_errors() -> Result<()> {
    let Some(pool) = pool().await? else {
        return Ok(());
    };
    let store = scratch::<Improvement>(&pool).await?;
    store.ping().await?;

    let id = Uuid::new_v4();
    sqlx::query(&format!(
        r#"INSERT INTO "{}" (id, "timestamp", doc) VALUES ($1, now(), $2)"#,
        store.table()
    ))
    .bind(id)
    .bind(serde_json::json!({ "problem": 1 }))
    .execute(&pool)
    .await?;

    match store.list_all().await {
        Err(StoreError::Corrupt { id: bad, .. }) => assert_eq!(bad, id),
        other => panic!("expected corrupt document error, got {:?}", other.map(|v| v.len())),
    }

    drop_scratch(&pool, &store).await
}
