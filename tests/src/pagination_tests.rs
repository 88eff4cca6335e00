use crate::utils::{collection, in_collection, owned_item, setup_with_index, test_config, SELLER};
use anyhow::Result;
use leda_marketplace::memory::InMemoryIndex;
use leda_marketplace::store::actions;
use leda_marketplace::Error;
use leda_types::{Item, ItemsFilters};

fn collection_items(count: usize) -> Vec<Item> {
    (1..=count)
        .map(|i| in_collection(owned_item(&format!("a{i}"), SELLER), "c1"))
        .collect()
}

fn seeded_index(index: InMemoryIndex) -> InMemoryIndex {
    index.seed_collections([collection("c1", "Apes"), collection("c2", "Birds")]);
    index
}

#[tokio::test]
async fn test_exact_multiple_needs_extra_fetch_without_totals() -> Result<()> {
    let index = seeded_index(InMemoryIndex::new().without_totals());
    let mut m = setup_with_index(collection_items(4), index, test_config());

    actions::find_collection_by_id(&mut m.store, m.index.as_ref(), "c1").await?;
    actions::find_paged_collection_items(&mut m.store, m.index.as_ref()).await?;
    assert!(m.store.more_available());

    let page = actions::load_more_items(&mut m.store, m.index.as_ref()).await?;
    assert_eq!(page.map(|p| p.items.len()), Some(2));
    // Every row is loaded, but the last page was full so the heuristic
    // still asks for another one.
    assert!(m.store.more_available());
    assert!(m.store.has_more());

    let page = actions::load_more_items(&mut m.store, m.index.as_ref()).await?;
    assert_eq!(page.map(|p| p.items.len()), Some(0));
    assert!(!m.store.more_available());
    assert!(actions::load_more_items(&mut m.store, m.index.as_ref())
        .await?
        .is_none());

    let detail = m.store.collections().selected().expect("selected");
    assert_eq!(detail.items_stats.items.len(), 4);
    assert_eq!(detail.items_filters.page, 3);
    Ok(())
}

#[tokio::test]
async fn test_load_more_before_any_fetch_loads_first_page() -> Result<()> {
    let index = seeded_index(InMemoryIndex::new().without_totals());
    let mut m = setup_with_index(collection_items(3), index, test_config());

    actions::find_collection_by_id(&mut m.store, m.index.as_ref(), "c1").await?;
    assert!(!m.store.more_available());

    let page = actions::load_more_items(&mut m.store, m.index.as_ref())
        .await?
        .expect("first page");
    assert_eq!(page.page, 1);
    assert_eq!(page.items.len(), 2);

    let detail = m.store.collections().selected().expect("selected");
    assert_eq!(detail.items_filters.page, 1);
    assert_eq!(detail.items_stats.items.len(), 2);
    assert!(m.store.more_available());

    let page = actions::load_more_items(&mut m.store, m.index.as_ref()).await?;
    assert_eq!(page.map(|p| p.items.len()), Some(1));
    assert!(!m.store.more_available());
    Ok(())
}

#[tokio::test]
async fn test_total_corrects_heuristic() -> Result<()> {
    let index = seeded_index(InMemoryIndex::new());
    let mut m = setup_with_index(collection_items(4), index, test_config());

    actions::find_collection_by_id(&mut m.store, m.index.as_ref(), "c1").await?;
    actions::find_paged_collection_items(&mut m.store, m.index.as_ref()).await?;
    assert!(m.store.has_more());
    actions::load_more_items(&mut m.store, m.index.as_ref()).await?;

    assert!(m.store.more_available());
    assert!(!m.store.has_more());
    Ok(())
}

#[tokio::test]
async fn test_short_last_page_stops_loading() -> Result<()> {
    let index = seeded_index(InMemoryIndex::new().without_totals());
    let mut m = setup_with_index(collection_items(3), index, test_config());

    actions::find_collection_by_id(&mut m.store, m.index.as_ref(), "c1").await?;
    actions::find_paged_collection_items(&mut m.store, m.index.as_ref()).await?;
    actions::load_more_items(&mut m.store, m.index.as_ref()).await?;

    assert!(!m.store.more_available());
    let stats = &m.store.collections().selected().expect("selected").items_stats;
    assert_eq!(stats.items.len(), 3);
    assert_eq!(stats.limit, 4);
    Ok(())
}

#[tokio::test]
async fn test_search_resets_to_first_page() -> Result<()> {
    let index = seeded_index(InMemoryIndex::new());
    let mut m = setup_with_index(collection_items(5), index, test_config());

    actions::find_collection_by_id(&mut m.store, m.index.as_ref(), "c1").await?;
    actions::find_paged_collection_items(&mut m.store, m.index.as_ref()).await?;
    actions::load_more_items(&mut m.store, m.index.as_ref()).await?;

    let filters = ItemsFilters {
        search: Some("a3".into()),
        ..ItemsFilters::first_page(2)
    };
    let page = actions::set_items_filters(&mut m.store, m.index.as_ref(), filters).await?;
    assert_eq!(page.total, Some(1));

    let detail = m.store.collections().selected().expect("selected");
    assert_eq!(detail.items_filters.page, 1);
    assert_eq!(detail.items_stats.items.len(), 1);
    assert_eq!(detail.items_stats.items[0].item_id.as_str(), "a3");
    Ok(())
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() -> Result<()> {
    let index = seeded_index(InMemoryIndex::new());
    let mut m = setup_with_index(vec![], index, test_config());

    let err = actions::find_collection_by_id(&mut m.store, m.index.as_ref(), "c9")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(m.store.collections().selected().is_none());
    assert!(m.store.collections().last_error().is_some());
    Ok(())
}

#[tokio::test]
async fn test_switching_collection_drops_loaded_pages() -> Result<()> {
    let index = seeded_index(InMemoryIndex::new());
    let mut m = setup_with_index(collection_items(2), index, test_config());

    actions::find_collection_by_id(&mut m.store, m.index.as_ref(), "c1").await?;
    actions::find_paged_collection_items(&mut m.store, m.index.as_ref()).await?;
    actions::find_collection_by_id(&mut m.store, m.index.as_ref(), "c2").await?;

    let detail = m.store.collections().selected().expect("selected");
    assert_eq!(detail.collection.name, "Birds");
    assert!(detail.items_stats.items.is_empty());
    Ok(())
}
