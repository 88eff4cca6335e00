use crate::utils::{listed_item, minted_draft, owned_item, setup_marketplace, BUYER, SELLER};
use anyhow::Result;
use leda_marketplace::services::{DraftItemRequest, ItemService, ProcessLazyItemRequest};
use leda_marketplace::store::actions::{self, MintNftRequest};
use leda_marketplace::{Action, Error, MarketplaceState, ServiceError};
use leda_types::{Address, HistoryKind, ItemId, ItemStatus};

#[tokio::test]
async fn test_list_then_buy_round_trip() -> Result<()> {
    let mut m = setup_marketplace(vec![minted_draft("1", SELLER)]);
    let item = actions::find_by_id(&mut m.store, m.index.as_ref(), &ItemId::from("1")).await?;
    assert_eq!(item.status, ItemStatus::Draft);
    assert_eq!(item.price, None);

    let state = MarketplaceState::new(item, SELLER)
        .with_price(10.0)
        .with_list_id(1);
    let listed = actions::list_item(&mut m.store, &m.services, state).await?;
    assert_eq!(listed.status, ItemStatus::Listed);
    assert_eq!(listed.price, Some(10.0));

    let state = MarketplaceState::new(listed, BUYER);
    let sold = actions::buy_item(&mut m.store, &m.services, state).await?;
    assert_eq!(sold.status, ItemStatus::Sold);
    assert_eq!(sold.owner, Address::from(BUYER));
    assert_eq!(sold.price, Some(10.0));

    // Chain, index and store all agree.
    let id = ItemId::from("1");
    assert_eq!(m.chain.item(&id).map(|i| i.status), Some(ItemStatus::Sold));
    assert_eq!(m.index.item(&id), Some(sold.clone()));
    assert_eq!(m.store.by_id(&id)?, &sold);

    let history = actions::find_history(&mut m.store, m.index.as_ref(), &id).await?;
    let kinds: Vec<_> = history.iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec![HistoryKind::List, HistoryKind::Buy]);
    assert_eq!(m.store.nft().history().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_chain_failure_leaves_index_and_store_untouched() -> Result<()> {
    let mut m = setup_marketplace(vec![listed_item("1", SELLER, 10.0)]);
    actions::find_all(&mut m.store, m.index.as_ref()).await?;
    m.chain
        .fail_with(ServiceError::Unavailable("rpc timeout".into()));

    let item = m.store.by_id(&ItemId::from("1"))?.clone();
    let err = actions::buy_item(&mut m.store, &m.services, MarketplaceState::new(item, BUYER))
        .await
        .unwrap_err();

    assert_eq!(err, Error::Chain(ServiceError::Unavailable("rpc timeout".into())));
    assert_eq!(m.index.write_count(), 0);
    let stored = m.store.by_id(&ItemId::from("1"))?;
    assert_eq!(stored.status, ItemStatus::Listed);
    assert_eq!(stored.price, Some(10.0));
    let rejection = m.store.nft().last_error().expect("rejection recorded");
    assert!(!rejection.diverged);
    assert!(!m.store.nft().is_loading());
    Ok(())
}

#[tokio::test]
async fn test_index_failure_after_chain_is_divergence() -> Result<()> {
    let mut m = setup_marketplace(vec![listed_item("1", SELLER, 4.0)]);
    m.index.fail_writes(ServiceError::Unavailable("index down".into()));

    let item = m.index.item(&ItemId::from("1")).expect("seeded");
    let err = actions::buy_item(&mut m.store, &m.services, MarketplaceState::new(item, BUYER))
        .await
        .unwrap_err();

    match &err {
        Error::Diverged {
            action,
            item_id,
            tx_hash,
            reason,
        } => {
            assert_eq!(*action, Action::Buy);
            assert_eq!(item_id, &ItemId::from("1"));
            assert!(tx_hash.starts_with("0x"));
            assert!(matches!(**reason, Error::Index(_)));
        }
        other => panic!("expected divergence, got {other:?}"),
    }
    assert_eq!(m.chain.tx_count(), 1);
    assert_eq!(
        m.chain.item(&ItemId::from("1")).map(|i| i.status),
        Some(ItemStatus::Sold)
    );
    assert_eq!(
        m.index.item(&ItemId::from("1")).map(|i| i.status),
        Some(ItemStatus::Listed)
    );
    assert!(m.store.nft().last_error().expect("rejection").diverged);
    Ok(())
}

#[tokio::test]
async fn test_self_purchase_rejected_on_chain() -> Result<()> {
    let mut m = setup_marketplace(vec![listed_item("1", SELLER, 1.0)]);
    let item = m.index.item(&ItemId::from("1")).expect("seeded");
    let err = actions::buy_item(&mut m.store, &m.services, MarketplaceState::new(item, SELLER))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Chain(ServiceError::Rejected(_))));
    assert_eq!(m.index.write_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_list_without_price_fails_before_chain() -> Result<()> {
    let mut m = setup_marketplace(vec![owned_item("1", SELLER)]);
    let item = m.index.item(&ItemId::from("1")).expect("seeded");
    let err = actions::list_item(
        &mut m.store,
        &m.services,
        MarketplaceState::new(item, SELLER).with_list_id(1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(m.chain.tx_count(), 0);
    assert_eq!(m.index.write_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_delist_keeps_last_price() -> Result<()> {
    let mut m = setup_marketplace(vec![listed_item("1", SELLER, 7.5)]);
    let item = m.index.item(&ItemId::from("1")).expect("seeded");
    let delisted =
        actions::delist_item(&mut m.store, &m.services, MarketplaceState::new(item, SELLER))
            .await?;
    assert_eq!(delisted.status, ItemStatus::Delisted);
    assert_eq!(delisted.price, Some(7.5));
    assert!(delisted.check_invariant().is_ok());

    // The index names this status differently on the wire.
    let wire = serde_json::to_value(&delisted)?;
    assert_eq!(wire["status"], "NotListed");
    assert_eq!(wire["itemId"], "1");
    Ok(())
}

#[tokio::test]
async fn test_mint_creates_draft_then_lists_token() -> Result<()> {
    let mut m = setup_marketplace(vec![]);
    let request = MintNftRequest {
        draft: DraftItemRequest {
            address: Address::from(SELLER),
            name: "Sunset".into(),
            royalty: 5,
            ..Default::default()
        },
        price: 2.0,
        token_uri: "ipfs://sunset".into(),
    };
    let minted = actions::mint_nft(&mut m.store, &m.services, request).await?;

    assert_eq!(minted.status, ItemStatus::Listed);
    assert_eq!(minted.price, Some(2.0));
    assert!(minted.token_id.is_some());
    assert_eq!(minted.owner, Address::from(SELLER));
    assert_eq!(m.chain.tx_count(), 1);
    assert_eq!(m.store.nft().items().len(), 1);

    let history = m.index.find_history_by_item_id(&minted.item_id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, HistoryKind::Mint);
    Ok(())
}

#[tokio::test]
async fn test_mint_with_invalid_price_writes_nothing() -> Result<()> {
    let mut m = setup_marketplace(vec![]);
    let request = MintNftRequest {
        draft: DraftItemRequest {
            address: Address::from(SELLER),
            name: "Sunset".into(),
            ..Default::default()
        },
        price: 0.0,
        token_uri: "ipfs://sunset".into(),
    };
    let err = actions::mint_nft(&mut m.store, &m.services, request)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(m.index.write_count(), 0);
    assert_eq!(m.chain.tx_count(), 0);
    assert!(m.index.find_all().await?.is_empty());
    assert!(m.store.nft().items().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_lazy_mint_then_redeem() -> Result<()> {
    let mut m = setup_marketplace(vec![]);
    let request = MintNftRequest {
        draft: DraftItemRequest {
            address: Address::from(SELLER),
            name: "Voucher".into(),
            is_lazy: true,
            ..Default::default()
        },
        price: 3.0,
        token_uri: "ipfs://voucher".into(),
    };
    let lazy = actions::mint_nft(&mut m.store, &m.services, request).await?;
    assert_eq!(lazy.status, ItemStatus::Lazy);
    assert_eq!(m.chain.tx_count(), 0);

    let redeemed = actions::process_lazy_item(
        &mut m.store,
        m.index.as_ref(),
        &ProcessLazyItemRequest {
            item_id: lazy.item_id.clone(),
            token_id: 42,
            price: 3.0,
            address: Address::from(BUYER),
        },
    )
    .await?;
    assert_eq!(redeemed.status, ItemStatus::Sold);
    assert_eq!(redeemed.owner, Address::from(BUYER));
    assert_eq!(m.store.by_id(&lazy.item_id)?.status, ItemStatus::Sold);
    Ok(())
}
