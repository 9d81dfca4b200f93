use banter_core::{BanterError, ResponseRef, SortKey, Statement, StatementFilter, StatementStore};
use banter_store::InMemoryStatementStore;
use chrono::{Duration, Utc};

// ---------------------------------------------------------------------------
// count / create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn count_returns_zero_on_fresh_store() {
    let store = InMemoryStatementStore::new();
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn create_increments_count() {
    let store = InMemoryStatementStore::new();
    store.create(Statement::new("Test statement")).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn create_allows_duplicates() {
    let store = InMemoryStatementStore::new();
    store.create(Statement::new("Hello")).await.unwrap();
    store.create(Statement::new("Hello")).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// filter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn filter_text_not_found_returns_empty() {
    let store = InMemoryStatementStore::new();
    let results = store
        .filter(&StatementFilter::new().with_text("Non-existent"))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn filter_text_found() {
    let store = InMemoryStatementStore::new();
    store.create(Statement::new("New statement")).await.unwrap();

    let results = store
        .filter(&StatementFilter::new().with_text("New statement"))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "New statement");
}

#[tokio::test]
async fn filter_no_criteria_returns_all() {
    let store = InMemoryStatementStore::new();
    store.create(Statement::new("Testing...")).await.unwrap();
    store
        .create(Statement::new("Testing one, two, three."))
        .await
        .unwrap();

    let results = store.filter(&StatementFilter::new()).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn filter_in_response_to_scalar() {
    let store = InMemoryStatementStore::new();
    store
        .create(Statement::new("A").with_in_response_to("Yes"))
        .await
        .unwrap();
    store
        .create(Statement::new("B").with_in_response_to("No"))
        .await
        .unwrap();

    let results = store
        .filter(&StatementFilter::new().with_in_response_to("Yes"))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].in_response_to, ResponseRef::from("Yes"));
}

#[tokio::test]
async fn filter_in_response_to_no_matches() {
    let store = InMemoryStatementStore::new();
    store
        .update(&Statement::new("Testing...").with_in_response_to("Why are you counting?"))
        .await
        .unwrap();

    let results = store
        .filter(&StatementFilter::new().with_in_response_to("Maybe"))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn filter_empty_list_response_link() {
    let store = InMemoryStatementStore::new();
    let statement1 = Statement::new("Testing...").with_in_response_to(Vec::<String>::new());
    let statement2 =
        Statement::new("Testing one, two, three.").with_in_response_to(Vec::<String>::new());
    store.update(&statement1).await.unwrap();
    store.update(&statement2).await.unwrap();
    // A statement with no response link must not show up in the results.
    store.create(Statement::new("Unlinked")).await.unwrap();

    let results = store
        .filter(&StatementFilter::new().with_in_response_to(Vec::<String>::new()))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.contains(&statement1));
    assert!(results.contains(&statement2));
}

#[tokio::test]
async fn filter_exclude_text() {
    let store = InMemoryStatementStore::new();
    store.create(Statement::new("Hello")).await.unwrap();
    store.create(Statement::new("Goodbye")).await.unwrap();

    let results = store
        .filter(&StatementFilter::new().without_texts(["Hello"]))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "Goodbye");
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_adds_new_statement() {
    let store = InMemoryStatementStore::new();
    store.update(&Statement::new("New statement")).await.unwrap();

    let results = store
        .filter(&StatementFilter::new().with_text("New statement"))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "New statement");
    assert!(results[0].in_response_to.is_none());
}

#[tokio::test]
async fn update_modifies_existing_statement() {
    let store = InMemoryStatementStore::new();
    let statement = Statement::new("New statement");
    store.update(&statement).await.unwrap();

    let updated = statement.with_in_response_to("New response");
    store.update(&updated).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    let results = store
        .filter(&StatementFilter::new().with_text("New statement"))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].in_response_to, ResponseRef::from("New response"));
}

// ---------------------------------------------------------------------------
// remove
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_deletes_statement() {
    let store = InMemoryStatementStore::new();
    let text = "Sometimes you have to run before you can walk.";
    store.create(Statement::new(text)).await.unwrap();

    store.remove(text).await.unwrap();

    let results = store
        .filter(&StatementFilter::new().with_text(text))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn remove_matches_text_only() {
    let store = InMemoryStatementStore::new();
    let text = "Sometimes you have to run before you can walk.";
    store
        .create(Statement::new("").with_in_response_to(text))
        .await
        .unwrap();

    store.remove(text).await.unwrap();

    // The statement's text is empty, not the removal argument, so it survives.
    assert_eq!(store.count().await.unwrap(), 1);
    let results = store
        .filter(&StatementFilter::new().with_text(text))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn remove_nonexistent_is_noop() {
    let store = InMemoryStatementStore::new();
    store.remove("ghost").await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn remove_deletes_only_first_duplicate() {
    let store = InMemoryStatementStore::new();
    store.create(Statement::new("Hello")).await.unwrap();
    store.create(Statement::new("Hello")).await.unwrap();

    store.remove("Hello").await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// get_random
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_random_returns_statement() {
    let store = InMemoryStatementStore::new();
    store.create(Statement::new("New statement")).await.unwrap();

    let random = store.get_random().await.unwrap();
    assert_eq!(random.text, "New statement");
}

#[tokio::test]
async fn get_random_on_empty_store_errors() {
    let store = InMemoryStatementStore::new();
    let err = store.get_random().await.unwrap_err();
    assert!(matches!(err, BanterError::EmptyStore));
}

// ---------------------------------------------------------------------------
// response_statements
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_statements_returns_responded_to() {
    let store = InMemoryStatementStore::new();
    let statements = [
        Statement::new("What... is your quest?"),
        Statement::new("This is a phone."),
        Statement::new("A what?").with_in_response_to("This is a phone."),
        Statement::new("A phone.").with_in_response_to("A what?"),
    ];
    for statement in &statements {
        store.update(statement).await.unwrap();
    }

    let responses = store.response_statements().await.unwrap();

    assert_eq!(responses.len(), 2);
    let texts: Vec<&str> = responses.iter().map(|s| s.text.as_str()).collect();
    assert!(texts.contains(&"This is a phone."));
    assert!(texts.contains(&"A what?"));
}

#[tokio::test]
async fn response_statements_dedupes_by_text() {
    let store = InMemoryStatementStore::new();
    store.update(&Statement::new("Hi")).await.unwrap();
    store
        .update(&Statement::new("Hello").with_in_response_to("Hi"))
        .await
        .unwrap();
    store
        .update(&Statement::new("Hey").with_in_response_to("Hi"))
        .await
        .unwrap();

    let responses = store.response_statements().await.unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].text, "Hi");
}

#[tokio::test]
async fn response_statements_expands_list_links() {
    let store = InMemoryStatementStore::new();
    store.update(&Statement::new("one")).await.unwrap();
    store.update(&Statement::new("two")).await.unwrap();
    store
        .update(&Statement::new("both").with_in_response_to(vec!["one", "two"]))
        .await
        .unwrap();

    let responses = store.response_statements().await.unwrap();
    assert_eq!(responses.len(), 2);
}

// ---------------------------------------------------------------------------
// ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn order_by_text() {
    let store = InMemoryStatementStore::new();
    let statement_a = Statement::new("A is the first letter of the alphabet.");
    let statement_b = Statement::new("B is the second letter of the alphabet.");
    // Insert out of order to make the sort observable.
    store.update(&statement_b).await.unwrap();
    store.update(&statement_a).await.unwrap();

    let results = store
        .filter(&StatementFilter::new().order_by(SortKey::Text))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0], statement_a);
    assert_eq!(results[1], statement_b);
}

#[tokio::test]
async fn order_by_created_at_is_chronological() {
    let store = InMemoryStatementStore::new();
    let today = Utc::now();
    let yesterday = today - Duration::days(1);

    let statement_a = Statement::new("A is the first letter of the alphabet.")
        .with_created_at(today);
    let statement_b = Statement::new("B is the second letter of the alphabet.")
        .with_created_at(yesterday);

    store.update(&statement_a).await.unwrap();
    store.update(&statement_b).await.unwrap();

    let results = store
        .filter(&StatementFilter::new().order_by(SortKey::CreatedAt))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0], statement_b);
    assert_eq!(results[1], statement_a);
}

// ---------------------------------------------------------------------------
// drop_all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drop_all_clears_store_and_is_idempotent() {
    let store = InMemoryStatementStore::new();
    store.create(Statement::new("Hello")).await.unwrap();

    store.drop_all().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);

    store.drop_all().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
}
