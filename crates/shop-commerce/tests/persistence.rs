//! Persistence behavior: round trips, fail-open loads, write retries and stale reads.

mod common;

use std::sync::Arc;

use common::{cap, memory_cache, shirt, tote, FlakyStore};
use shop_cache::{Cache, FileStore};
use shop_commerce::cart::CART_KEY;
use shop_commerce::prelude::*;

#[tokio::test]
async fn cart_survives_file_store_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = CatalogId::new("shirt");

    {
        let store = FileStore::open(dir.path()).await.unwrap();
        let mut session = ShopSession::open_default(Cache::new(Arc::new(store))).await;
        session.cart.add(&shirt(), Some("M")).await.unwrap();
        session.cart.add(&shirt(), Some("M")).await.unwrap();
        session.cart.toggle_select(&id, Some("M")).await;
        session.favorites.toggle(&id).await;
    }

    let store = FileStore::open(dir.path()).await.unwrap();
    let session = ShopSession::open_default(Cache::new(Arc::new(store))).await;
    let entry = session.cart.get(&id, Some("M")).unwrap();
    assert_eq!(entry.quantity, 2);
    assert!(entry.selected);
    assert_eq!(entry.unit_price.amount_minor, 150000);
    assert!(session.favorites.is_favorite(&id));
}

#[tokio::test]
async fn cart_order_survives_file_store_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let shirt_id = CatalogId::new("shirt");

    let saved = {
        let store = FileStore::open(dir.path()).await.unwrap();
        let mut cart = CartStore::load(Cache::new(Arc::new(store)), Currency::VND).await;
        cart.add(&tote(), None).await.unwrap();
        cart.add(&shirt(), Some("L")).await.unwrap();
        cart.add(&cap(), None).await.unwrap();
        cart.add(&shirt(), Some("S")).await.unwrap();
        cart.add(&shirt(), Some("L")).await.unwrap();
        cart.toggle_select(&shirt_id, Some("L")).await;
        cart.toggle_select(&CatalogId::new("cap"), None).await;
        cart.items().to_vec()
    };

    let store = FileStore::open(dir.path()).await.unwrap();
    let cart = CartStore::load(Cache::new(Arc::new(store)), Currency::VND).await;
    assert_eq!(cart.len(), 4);
    for (loaded, expected) in cart.items().iter().zip(&saved) {
        assert_eq!(loaded, expected);
    }

    let order: Vec<_> = cart.items().iter().map(LineItem::identity).collect();
    assert_eq!(
        order,
        vec![
            LineIdentity::new("tote", None),
            LineIdentity::new("shirt", Some("L")),
            LineIdentity::new("cap", None),
            LineIdentity::new("shirt", Some("S")),
        ]
    );
    let selected: Vec<bool> = cart.items().iter().map(|item| item.selected).collect();
    assert_eq!(selected, vec![false, true, true, false]);
    assert_eq!(cart.items()[1].quantity, 2);
}

#[tokio::test]
async fn corrupt_snapshot_fails_open() {
    let cache = memory_cache();
    cache.set(CART_KEY, &serde_json::json!({"not": "a list"})).await.unwrap();

    let mut cart = CartStore::load(cache.clone(), Currency::VND).await;
    assert!(cart.is_empty());

    cart.add(&tote(), None).await.unwrap();
    let reloaded = CartStore::load(cache, Currency::VND).await;
    assert_eq!(reloaded.len(), 1);
}

#[tokio::test]
async fn failed_write_keeps_memory_and_flush_retries() {
    let store = FlakyStore::new();
    let cache = Cache::new(store.clone());
    let mut cart = CartStore::load(cache.clone(), Currency::VND).await;

    store.fail_writes(true);
    cart.add(&tote(), None).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert!(cart.has_pending_write());
    assert!(matches!(
        cart.flush().await,
        Err(CommerceError::PersistenceWriteFailed { .. })
    ));
    assert!(CartStore::load(cache.clone(), Currency::VND).await.is_empty());

    store.fail_writes(false);
    cart.flush().await.unwrap();
    assert!(!cart.has_pending_write());
    assert_eq!(CartStore::load(cache, Currency::VND).await.len(), 1);
}

#[tokio::test]
async fn failed_favorite_write_is_retried() {
    let store = FlakyStore::new();
    let cache = Cache::new(store.clone());
    let mut favorites = FavoritesStore::load(cache.clone()).await;

    store.fail_writes(true);
    assert!(favorites.toggle(&CatalogId::new("tote")).await);
    assert!(favorites.has_pending_writes());

    store.fail_writes(false);
    favorites.flush().await.unwrap();
    assert!(!favorites.has_pending_writes());
    assert_eq!(FavoritesStore::load(cache).await.count(), 1);
}

#[tokio::test]
async fn session_flush_covers_both_stores() {
    let store = FlakyStore::new();
    let mut session = ShopSession::open_default(Cache::new(store.clone())).await;

    store.fail_writes(true);
    session.cart.add(&tote(), None).await.unwrap();
    session.favorites.toggle(&CatalogId::new("tote")).await;
    assert!(session.has_pending_writes());

    store.fail_writes(false);
    session.flush().await.unwrap();
    assert!(!session.has_pending_writes());
}

#[tokio::test]
async fn late_reader_cannot_clobber_newer_edit() {
    let cache = memory_cache();
    let mut seed = CartStore::load(cache.clone(), Currency::VND).await;
    seed.add(&tote(), None).await.unwrap();

    let mut cart = CartStore::load(cache, Currency::VND).await;
    let reader = cart.reader();
    let pending = tokio::spawn(reader.fetch());

    cart.add(&shirt(), Some("L")).await.unwrap();
    let snapshot = pending.await.unwrap();

    assert!(!cart.apply_snapshot(snapshot));
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.quantity_total(), 2);
}
