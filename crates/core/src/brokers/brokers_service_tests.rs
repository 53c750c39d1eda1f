//! Tests for the broker store and refresh service against an in-test provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::brokers::{
    BrokerRefreshService, BrokerRefreshServiceTrait, BrokerViewStore, BrokerViewStoreTrait,
};
use crate::brokers::{Broker, Stock};
use crate::cache::{CacheConfig, CacheManagerTrait, CacheRegionTrait};
use crate::errors::{Error, Result, StoreError, ValidationError};
use crate::portfolios::{Portfolio, PortfolioClientTrait};

// ==================== Test provider ====================

struct FakeRegion {
    name: String,
    value_type: String,
    entries: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl FakeRegion {
    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionFailed("connection reset".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl CacheRegionTrait for FakeRegion {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, payload: String) -> Result<()> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), payload);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        self.check()?;
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[derive(Default)]
struct FakeManager {
    regions: Mutex<HashMap<String, Arc<FakeRegion>>>,
    create_calls: AtomicUsize,
    unreachable: AtomicBool,
}

impl FakeManager {
    fn add_region(&self, name: &str, value_type: &str) -> Arc<FakeRegion> {
        let region = Arc::new(FakeRegion {
            name: name.to_string(),
            value_type: value_type.to_string(),
            entries: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        });
        self.regions
            .lock()
            .unwrap()
            .insert(name.to_string(), region.clone());
        region
    }

    fn region(&self, name: &str) -> Arc<FakeRegion> {
        self.regions.lock().unwrap()[name].clone()
    }
}

#[async_trait]
impl CacheManagerTrait for FakeManager {
    async fn get_cache(
        &self,
        name: &str,
        value_type: &str,
    ) -> Result<Option<Arc<dyn CacheRegionTrait>>> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionFailed("no route to host".to_string()).into());
        }
        match self.regions.lock().unwrap().get(name) {
            Some(region) if region.value_type != value_type => Err(Error::Initialization(
                format!("region {} holds {}", name, region.value_type),
            )),
            Some(region) => Ok(Some(region.clone() as Arc<dyn CacheRegionTrait>)),
            None => Ok(None),
        }
    }

    async fn create_cache(
        &self,
        name: &str,
        config: CacheConfig,
    ) -> Result<Arc<dyn CacheRegionTrait>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.add_region(name, &config.value_type))
    }
}

fn store_with_manager() -> (Arc<FakeManager>, BrokerViewStore) {
    let manager = Arc::new(FakeManager::default());
    let store = BrokerViewStore::new(manager.clone());
    (manager, store)
}

fn alice() -> Broker {
    Broker {
        owner: "alice".to_string(),
        total: 1000.0,
        loyalty: "Bronze".to_string(),
        balance: 500.0,
        commissions: 9.95,
        free: 3,
        sentiment: "Neutral".to_string(),
        next_commission: 7.99,
        ..Broker::default()
    }
}

// ==================== Store: read/write ====================

#[tokio::test]
async fn test_put_then_get_returns_what_was_written() {
    let (_, store) = store_with_manager();
    let stored = store.put("alice", alice()).await.unwrap();
    let fetched = store.get("alice").await.unwrap();

    assert_eq!(stored, alice());
    assert_eq!(fetched, alice());
    let rendered = fetched.render();
    assert!(rendered.contains(r#""total": 1000.00"#));
    assert!(rendered.contains(r#""commissions": 9.95"#));
}

#[tokio::test]
async fn test_get_missing_owner_is_not_found() {
    let (_, store) = store_with_manager();
    store.put("alice", alice()).await.unwrap();

    let err = store.get("mallory").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(ref owner) if owner == "mallory"));
}

#[tokio::test]
async fn test_list_all_on_empty_store() {
    let (_, store) = store_with_manager();
    let brokers = store.list_all().await.unwrap();
    assert!(brokers.is_empty());
}

#[tokio::test]
async fn test_list_all_returns_every_record() {
    let (_, store) = store_with_manager();
    store.put("alice", alice()).await.unwrap();
    store.put("bob", Broker::new("bob")).await.unwrap();

    let mut owners: Vec<String> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.owner)
        .collect();
    owners.sort();
    assert_eq!(owners, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_put_is_last_write_wins_without_merge() {
    let (_, store) = store_with_manager();
    let mut first = alice();
    first.add_stock(Stock::new("IBM", 10, 9.99, 150.0, 1500.0, "2024-01-01"));
    store.put("alice", first).await.unwrap();

    let mut second = alice();
    second.balance = 10.0;
    store.put("alice", second).await.unwrap();

    let fetched = store.get("alice").await.unwrap();
    assert_eq!(fetched.balance, 10.0);
    assert!(fetched.stocks.is_empty());
}

#[tokio::test]
async fn test_put_fills_empty_owner_from_key() {
    let (_, store) = store_with_manager();
    let mut broker = alice();
    broker.owner = String::new();

    let stored = store.put("alice", broker).await.unwrap();
    assert_eq!(stored.owner, "alice");
    assert_eq!(store.get("alice").await.unwrap().owner, "alice");
}

#[tokio::test]
async fn test_put_rejects_owner_mismatch() {
    let (_, store) = store_with_manager();
    let err = store.put("bob", alice()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::OwnerMismatch { .. })
    ));
    assert!(matches!(store.get("bob").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_put_rejects_empty_key() {
    let (_, store) = store_with_manager();
    let err = store.put("", alice()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingField(_))
    ));
}

// ==================== Store: initialization ====================

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let (manager, store) = store_with_manager();
    assert!(!store.is_initialized());

    store.initialize().await.unwrap();
    store.initialize().await.unwrap();
    store.list_all().await.unwrap();

    assert!(store.is_initialized());
    assert_eq!(manager.create_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_first_use_creates_one_region() {
    let (manager, store) = store_with_manager();
    let store = Arc::new(store);

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.put(&format!("owner-{i}"), Broker::new("")).await })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap().unwrap();
    }

    assert_eq!(manager.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.list_all().await.unwrap().len(), 16);
}

#[tokio::test]
async fn test_existing_region_is_reused() {
    let manager = Arc::new(FakeManager::default());
    manager.add_region("broker", "Broker");
    let store = BrokerViewStore::new(manager.clone());

    store.initialize().await.unwrap();
    assert_eq!(manager.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_custom_region_name() {
    let manager = Arc::new(FakeManager::default());
    let store = BrokerViewStore::with_cache_name(manager.clone(), "broker-staging");
    store.put("alice", alice()).await.unwrap();

    assert_eq!(manager.region("broker-staging").name(), "broker-staging");
}

#[tokio::test]
async fn test_unreachable_provider_is_initialization_error_and_retried() {
    let (manager, store) = store_with_manager();
    manager.unreachable.store(true, Ordering::SeqCst);

    let err = store.get("alice").await.unwrap_err();
    assert!(matches!(err, Error::Initialization(_)));
    assert!(!store.is_initialized());

    manager.unreachable.store(false, Ordering::SeqCst);
    store.initialize().await.unwrap();
    assert!(store.is_initialized());
}

#[tokio::test]
async fn test_region_of_another_type_fails_initialization() {
    let manager = Arc::new(FakeManager::default());
    manager.add_region("broker", "Portfolio");
    let store = BrokerViewStore::new(manager);

    let err = store.initialize().await.unwrap_err();
    assert!(matches!(err, Error::Initialization(_)));
}

// ==================== Store: provider faults ====================

#[tokio::test]
async fn test_provider_fault_surfaces_as_store_error() {
    let (manager, store) = store_with_manager();
    store.initialize().await.unwrap();
    manager
        .region("broker")
        .failing
        .store(true, Ordering::SeqCst);

    assert!(matches!(
        store.get("alice").await,
        Err(Error::Store(StoreError::ConnectionFailed(_)))
    ));
    assert!(matches!(store.list_all().await, Err(Error::Store(_))));
    assert!(matches!(
        store.put("alice", alice()).await,
        Err(Error::Store(_))
    ));
}

#[tokio::test]
async fn test_corrupt_payload_is_serialization_fault() {
    let (manager, store) = store_with_manager();
    store.initialize().await.unwrap();
    manager
        .region("broker")
        .put("alice", "{not json".to_string())
        .await
        .unwrap();

    assert!(matches!(
        store.get("alice").await,
        Err(Error::Store(StoreError::Serialization(_)))
    ));
}

// ==================== Refresh ====================

struct FakePortfolioClient {
    portfolios: Vec<Portfolio>,
}

#[async_trait]
impl PortfolioClientTrait for FakePortfolioClient {
    async fn get_portfolios(&self) -> Result<Vec<Portfolio>> {
        Ok(self.portfolios.clone())
    }

    async fn get_portfolio(&self, owner: &str) -> Result<Portfolio> {
        self.portfolios
            .iter()
            .find(|p| p.owner == owner)
            .cloned()
            .ok_or_else(|| Error::NotFound(owner.to_string()))
    }
}

fn refresh_fixture() -> (Arc<BrokerViewStore>, BrokerRefreshService) {
    let (_, store) = store_with_manager();
    let store = Arc::new(store);
    let mut portfolio = Portfolio {
        owner: "alice".to_string(),
        total: 1500.0,
        account_id: Some("acct-1".to_string()),
        ..Portfolio::default()
    };
    portfolio.stocks.insert(
        "IBM".to_string(),
        Stock::new("IBM", 10, 9.99, 150.0, 1500.0, "2024-01-01"),
    );
    let client = Arc::new(FakePortfolioClient {
        portfolios: vec![portfolio, Portfolio {
            owner: "bob".to_string(),
            ..Portfolio::default()
        }],
    });
    let service = BrokerRefreshService::new(store.clone(), client);
    (store, service)
}

#[tokio::test]
async fn test_refresh_stores_partial_broker_with_sentinels() {
    let (store, service) = refresh_fixture();

    let broker = service.refresh("alice").await.unwrap();
    assert_eq!(broker.total, 1500.0);
    assert_eq!(broker.balance, -1.0);
    assert_eq!(broker.free, -1);
    assert_eq!(broker.loyalty, "Unknown");

    let cached = store.get("alice").await.unwrap();
    assert_eq!(cached, broker);
    assert_eq!(cached.stocks["IBM"].shares, 10);
}

#[tokio::test]
async fn test_refresh_unknown_owner_is_not_found() {
    let (store, service) = refresh_fixture();
    assert!(matches!(
        service.refresh("zoe").await,
        Err(Error::NotFound(_))
    ));
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refresh_all_counts_stored_brokers() {
    let (store, service) = refresh_fixture();
    assert_eq!(service.refresh_all().await.unwrap(), 2);
    assert_eq!(store.list_all().await.unwrap().len(), 2);
}
