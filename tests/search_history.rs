use qure_storefront::{
    services::search_service::SearchHistory,
    storage::{Storage, keys},
};

#[test]
fn keeps_five_most_recent_unique_queries() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut history = SearchHistory::load(storage.clone(), 5);

    for query in ["a", "b", "c", "d", "e", "f"] {
        history.record(query)?;
    }
    assert_eq!(history.entries(), ["f", "e", "d", "c", "b"]);

    history.record(" c ")?;
    assert_eq!(history.entries(), ["c", "f", "e", "d", "b"]);

    history.record("   ")?;
    assert_eq!(history.entries().len(), 5);

    let reloaded = SearchHistory::load(storage.clone(), 5);
    assert_eq!(reloaded.entries(), history.entries());
    assert_eq!(
        storage.get(keys::SEARCH_HISTORY)?.as_deref(),
        Some(r#"["c","f","e","d","b"]"#)
    );
    Ok(())
}

#[test]
fn oversized_stored_history_is_trimmed_and_clear_empties_it() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    storage.set(keys::SEARCH_HISTORY, r#"["1","2","3","4","5","6","7"]"#)?;

    let mut history = SearchHistory::load(storage.clone(), 5);
    assert_eq!(history.entries().len(), 5);

    history.clear()?;
    assert!(history.entries().is_empty());
    assert!(storage.get(keys::SEARCH_HISTORY)?.is_none());
    Ok(())
}
