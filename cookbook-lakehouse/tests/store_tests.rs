//! DeltaStore integration tests: append, predicates, update, paging, counts

use std::sync::Arc;

use deltalake::arrow::array::{Array, ArrayRef, RecordBatch, StringArray};
use deltalake::arrow::compute::cast;
use deltalake::arrow::datatypes::DataType;
use tempfile::TempDir;

use cookbook_lakehouse::config::CookbookConfig;
use cookbook_lakehouse::schema;
use cookbook_lakehouse::store::{quote_literal, DeltaStore, PageRequest, SortOrder};

fn test_config(dir: &TempDir) -> CookbookConfig {
    CookbookConfig::new(dir.path()).with_token_secret("test-secret-key-for-testing-only")
}

fn make_identity_batch(id: &str, name: &str, address: &str, created_at: &str) -> RecordBatch {
    RecordBatch::try_new(
        Arc::new(schema::identities_arrow_schema()),
        vec![
            Arc::new(StringArray::from(vec![id])) as ArrayRef,
            Arc::new(StringArray::from(vec![name])),
            Arc::new(StringArray::from(vec![address])),
            Arc::new(StringArray::from(vec!["$argon2id$fake_hash"])),
            Arc::new(StringArray::from(vec!["standard"])),
            Arc::new(StringArray::from(vec![None::<&str>])),
            Arc::new(StringArray::from(vec![created_at])),
            Arc::new(StringArray::from(vec![created_at])),
        ],
    )
    .unwrap()
}

fn rows(batches: &[RecordBatch]) -> usize {
    batches.iter().map(|b| b.num_rows()).sum()
}

fn names(batches: &[RecordBatch]) -> Vec<String> {
    let mut out = Vec::new();
    for batch in batches {
        let column = batch.column_by_name("display_name").unwrap();
        let column = cast(column, &DataType::Utf8).unwrap();
        let values = column.as_any().downcast_ref::<StringArray>().unwrap();
        out.extend(values.iter().map(|v| v.unwrap().to_string()));
    }
    out
}

#[tokio::test]
async fn test_store_init_creates_tables() {
    let dir = TempDir::new().unwrap();
    let store = DeltaStore::new(test_config(&dir)).await.unwrap();

    assert_eq!(store.version(schema::TABLE_IDENTITIES).await.unwrap(), 0);
    assert_eq!(store.version(schema::TABLE_RECIPES).await.unwrap(), 0);

    // Re-opening an initialized root is a no-op
    let reopened = DeltaStore::new(test_config(&dir)).await.unwrap();
    assert_eq!(reopened.version(schema::TABLE_IDENTITIES).await.unwrap(), 0);
}

#[tokio::test]
async fn test_append_and_scan() {
    let dir = TempDir::new().unwrap();
    let store = DeltaStore::new(test_config(&dir)).await.unwrap();

    let batch = make_identity_batch("i1", "Ana", "ana@example.com", "2026-01-01T00:00:00.000Z");
    let version = store.append(schema::TABLE_IDENTITIES, batch).await.unwrap();
    assert!(version > 0);

    let results = store.scan(schema::TABLE_IDENTITIES).await.unwrap();
    assert_eq!(rows(&results), 1);
}

#[tokio::test]
async fn test_query_with_quoted_predicate() {
    let dir = TempDir::new().unwrap();
    let store = DeltaStore::new(test_config(&dir)).await.unwrap();

    let ts = "2026-01-01T00:00:00.000Z";
    store
        .append(
            schema::TABLE_IDENTITIES,
            make_identity_batch("i1", "Ana", "ana@example.com", ts),
        )
        .await
        .unwrap();
    store
        .append(
            schema::TABLE_IDENTITIES,
            make_identity_batch("i2", "Seamus", "o'brien@example.com", ts),
        )
        .await
        .unwrap();

    let results = store
        .query(
            schema::TABLE_IDENTITIES,
            &format!("address = {}", quote_literal("o'brien@example.com")),
        )
        .await
        .unwrap();
    assert_eq!(names(&results), vec!["Seamus".to_string()]);

    // An injection attempt is just an odd literal that matches nothing
    let results = store
        .query(
            schema::TABLE_IDENTITIES,
            &format!("address = {}", quote_literal("' OR '1'='1")),
        )
        .await
        .unwrap();
    assert_eq!(rows(&results), 0);
}

#[tokio::test]
async fn test_update_rewrites_matching_rows() {
    let dir = TempDir::new().unwrap();
    let store = DeltaStore::new(test_config(&dir)).await.unwrap();

    let ts = "2026-01-01T00:00:00.000Z";
    store
        .append(
            schema::TABLE_IDENTITIES,
            make_identity_batch("i1", "Ana", "ana@example.com", ts),
        )
        .await
        .unwrap();
    store
        .append(
            schema::TABLE_IDENTITIES,
            make_identity_batch("i2", "Bo", "bo@example.com", ts),
        )
        .await
        .unwrap();

    let updated = store
        .update(
            schema::TABLE_IDENTITIES,
            "id = 'i1'",
            &[("display_name", quote_literal("Ana B")), ("role", quote_literal("admin"))],
        )
        .await
        .unwrap();
    assert_eq!(updated, 1);

    assert_eq!(
        store
            .count(schema::TABLE_IDENTITIES, "display_name = 'Ana B' AND role = 'admin'")
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        store
            .count(schema::TABLE_IDENTITIES, "display_name = 'Bo' AND role = 'standard'")
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_delete() {
    let dir = TempDir::new().unwrap();
    let store = DeltaStore::new(test_config(&dir)).await.unwrap();

    store
        .append(
            schema::TABLE_IDENTITIES,
            make_identity_batch("i1", "Ana", "ana@example.com", "2026-01-01T00:00:00.000Z"),
        )
        .await
        .unwrap();

    let metrics = store
        .delete(schema::TABLE_IDENTITIES, "id = 'i1'")
        .await
        .unwrap();
    assert_eq!(metrics.num_deleted_rows, 1);

    let results = store.scan(schema::TABLE_IDENTITIES).await.unwrap();
    assert_eq!(rows(&results), 0);
}

#[tokio::test]
async fn test_query_page_and_created_at_range() {
    let dir = TempDir::new().unwrap();
    let store = DeltaStore::new(test_config(&dir)).await.unwrap();

    let stamps = [
        "2026-01-05T09:00:00.000Z",
        "2026-03-05T09:00:00.000Z",
        "2026-06-05T09:00:00.000Z",
        "2026-09-05T09:00:00.000Z",
    ];
    for (i, ts) in stamps.iter().enumerate() {
        store
            .append(
                schema::TABLE_IDENTITIES,
                make_identity_batch(
                    &format!("i{i}"),
                    &format!("Cook {i}"),
                    &format!("cook{i}@example.com"),
                    ts,
                ),
            )
            .await
            .unwrap();
    }

    let newest = store
        .query_page(
            schema::TABLE_IDENTITIES,
            "true",
            "created_at",
            PageRequest::new(0, 2, SortOrder::Desc),
        )
        .await
        .unwrap();
    assert_eq!(names(&newest), vec!["Cook 3", "Cook 2"]);

    let oldest = store
        .query_page(
            schema::TABLE_IDENTITIES,
            "true",
            "created_at",
            PageRequest::new(1, 2, SortOrder::Asc),
        )
        .await
        .unwrap();
    assert_eq!(names(&oldest), vec!["Cook 1", "Cook 2"]);

    let since = store
        .count(
            schema::TABLE_IDENTITIES,
            &format!("created_at >= {}", quote_literal("2026-03-01T00:00:00.000Z")),
        )
        .await
        .unwrap();
    assert_eq!(since, 3);
    assert_eq!(store.count(schema::TABLE_IDENTITIES, "true").await.unwrap(), 4);
}

#[tokio::test]
async fn test_history() {
    let dir = TempDir::new().unwrap();
    let store = DeltaStore::new(test_config(&dir)).await.unwrap();

    let ts = "2026-01-01T00:00:00.000Z";
    store
        .append(
            schema::TABLE_IDENTITIES,
            make_identity_batch("i1", "Ana", "ana@example.com", ts),
        )
        .await
        .unwrap();
    store
        .append(
            schema::TABLE_IDENTITIES,
            make_identity_batch("i2", "Bo", "bo@example.com", ts),
        )
        .await
        .unwrap();

    let history = store
        .history(schema::TABLE_IDENTITIES, Some(10))
        .await
        .unwrap();
    assert!(history.len() >= 3); // create + 2 appends
}

#[tokio::test]
async fn test_sql_query() {
    let dir = TempDir::new().unwrap();
    let store = DeltaStore::new(test_config(&dir)).await.unwrap();

    let ts = "2026-01-01T00:00:00.000Z";
    store
        .append(
            schema::TABLE_IDENTITIES,
            make_identity_batch("i1", "Ana", "ana@example.com", ts),
        )
        .await
        .unwrap();
    store
        .append(
            schema::TABLE_IDENTITIES,
            make_identity_batch("i2", "Bo", "bo@example.com", ts),
        )
        .await
        .unwrap();

    let results = store
        .sql(
            schema::TABLE_IDENTITIES,
            "SELECT display_name, address FROM t WHERE role = 'standard' ORDER BY display_name",
        )
        .await
        .unwrap();
    assert_eq!(names(&results), vec!["Ana", "Bo"]);
}
