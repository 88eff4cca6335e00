use crate::utils::{collection, listed_item, setup_marketplace, setup_with_index, test_config, BUYER, SELLER};
use anyhow::Result;
use leda_marketplace::memory::InMemoryIndex;
use leda_marketplace::selection::{Cost, ItemFilters};
use leda_marketplace::store::{actions, AsyncOutcome, StoreAction};
use leda_marketplace::{Config, MarketplaceState, ServiceError};
use leda_types::{Address, CollectionFilters, ItemId};
use std::sync::Arc;

#[tokio::test]
async fn test_filtered_items_memoized_until_snapshot_changes() -> Result<()> {
    let mut m = setup_marketplace(vec![
        listed_item("1", SELLER, 1.0),
        listed_item("2", SELLER, 5.0),
    ]);
    actions::find_all(&mut m.store, m.index.as_ref()).await?;

    let filters = ItemFilters::default().with_price_range(0.0, 3.0);
    let first = m.store.filtered_items(&filters);
    let second = m.store.filtered_items(&filters);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(m.store.filter_cache().stats(), (1, 1));

    let item = m.store.by_id(&ItemId::from("2"))?.clone();
    actions::buy_item(&mut m.store, &m.services, MarketplaceState::new(item, BUYER)).await?;
    let after = m.store.filtered_items(&filters);
    assert!(!Arc::ptr_eq(&first, &after));
    assert_eq!(after.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_cache_disabled_with_zero_capacity() -> Result<()> {
    let config = Config {
        filter_cache_capacity: 0,
        ..test_config()
    };
    let mut m = setup_with_index(vec![listed_item("1", SELLER, 1.0)], InMemoryIndex::new(), config);
    actions::find_all(&mut m.store, m.index.as_ref()).await?;

    let filters = ItemFilters::default();
    let first = m.store.filtered_items(&filters);
    let second = m.store.filtered_items(&filters);
    assert_eq!(first, second);
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(m.store.filter_cache().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_costed_item_tracks_store_updates() -> Result<()> {
    let mut m = setup_marketplace(vec![
        listed_item("1", SELLER, 3.0),
        listed_item("2", SELLER, 8.0),
    ]);
    assert_eq!(m.store.costed_item(Cost::Expensive), None);

    actions::find_all(&mut m.store, m.index.as_ref()).await?;
    assert_eq!(m.store.costed_item(Cost::Expensive), Some(8.0));
    assert_eq!(m.store.costed_item(Cost::Cheapest), Some(3.0));
    Ok(())
}

#[tokio::test]
async fn test_like_updates_item_without_loading_flag() -> Result<()> {
    let mut m = setup_marketplace(vec![listed_item("1", SELLER, 3.0)]);
    actions::find_all(&mut m.store, m.index.as_ref()).await?;

    let liked = actions::like_item(
        &mut m.store,
        m.index.as_ref(),
        &ItemId::from("1"),
        &Address::from(BUYER),
    )
    .await?;
    assert_eq!(liked.likes, 1);
    assert_eq!(m.store.by_id(&ItemId::from("1"))?.likes, 1);
    assert!(!m.store.nft().is_loading());
    Ok(())
}

#[tokio::test]
async fn test_find_by_id_fetches_unknown_item_into_snapshot() -> Result<()> {
    let mut m = setup_marketplace(vec![listed_item("1", SELLER, 3.0)]);
    assert!(m.store.by_id(&ItemId::from("1")).is_err());

    actions::find_by_id(&mut m.store, m.index.as_ref(), &ItemId::from("1")).await?;
    assert_eq!(m.store.nft().items().len(), 1);

    let err = actions::find_by_id(&mut m.store, m.index.as_ref(), &ItemId::from("404"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("404"));
    assert_eq!(m.store.nft().items().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_index_outage_is_recorded_as_rejection() -> Result<()> {
    let mut m = setup_marketplace(vec![listed_item("1", SELLER, 3.0)]);
    m.index.fail_writes(ServiceError::Unavailable("index down".into()));

    let result = actions::like_item(
        &mut m.store,
        m.index.as_ref(),
        &ItemId::from("1"),
        &Address::from(BUYER),
    )
    .await;
    assert!(result.is_err());
    let rejection = m.store.nft().last_error().expect("rejection");
    assert!(rejection.message.contains("index down"));
    assert!(!rejection.diverged);
    Ok(())
}

#[tokio::test]
async fn test_collections_filters_drive_query() -> Result<()> {
    let index = InMemoryIndex::new();
    index.seed_collections([
        collection("c1", "Apes"),
        collection("c2", "Ape Punks"),
        collection("c3", "Birds"),
    ]);
    let mut m = setup_with_index(vec![], index, test_config());

    let all = actions::find_all_collections(&mut m.store, m.index.as_ref()).await?;
    assert_eq!(all.len(), 3);

    m.store.dispatch(StoreAction::SetCollectionsFilters(CollectionFilters {
        search: Some("ape".into()),
        ..CollectionFilters::with_limit(1)
    }));
    let page = actions::find_filtered_collections(&mut m.store, m.index.as_ref()).await?;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, Some(2));
    assert_eq!(m.store.collections().collections().len(), 1);
    assert_eq!(m.store.collections().collections_total(), Some(2));

    m.store.dispatch(StoreAction::SetCollectionsFilters(CollectionFilters {
        page: 2,
        search: Some("ape".into()),
        ..CollectionFilters::with_limit(1)
    }));
    actions::find_filtered_collections(&mut m.store, m.index.as_ref()).await?;
    let names: Vec<_> = m
        .store
        .collections()
        .collections()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Apes", "Ape Punks"]);

    m.store.dispatch(StoreAction::ResetCollectionsFilters);
    assert_eq!(
        m.store.collections().collections_filters(),
        &CollectionFilters::with_limit(2)
    );
    Ok(())
}

#[test]
fn test_action_names_are_namespaced() {
    assert_eq!(
        StoreAction::BuyItem(AsyncOutcome::Pending).name(),
        "marketplace/buyItem"
    );
    assert_eq!(StoreAction::NextItemsPage.name(), "collections/nextItemsPage");
}
