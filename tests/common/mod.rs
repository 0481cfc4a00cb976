#![allow(dead_code)]

use futures_util::future::join_all;
use nanoid::nanoid;
use std::sync::Arc;
use std::time::Duration;
use vcode_store::domain_port::{VerificationStore, VerificationStoreError};

pub fn unique_login(tag: &str) -> String {
    format!("test-{}-{}", tag, nanoid!(10))
}

pub async fn create_then_read(store: Arc<dyn VerificationStore>) {
    let login = unique_login("create");
    store.create(&login, "121", 5).await.unwrap();

    let record = store.read(&login).await.unwrap();
    assert_eq!(record.vcode, "121");
    assert_eq!(record.retry, 0);

    store.delete(&login).await.unwrap();
}

pub async fn second_create_keeps_original(store: Arc<dyn VerificationStore>) {
    let login = unique_login("twice");
    store.create(&login, "121", 5).await.unwrap();

    let err = store.create(&login, "321", 5).await.unwrap_err();
    assert!(matches!(err, VerificationStoreError::LoginExists));
    assert!(!err.is_infra());

    assert_eq!(store.read(&login).await.unwrap().vcode, "121");

    store.delete(&login).await.unwrap();
}

pub async fn increment_on_absent_login_creates_nothing(store: Arc<dyn VerificationStore>) {
    let login = unique_login("absent");

    assert!(matches!(
        store.increment_retry(&login).await,
        Err(VerificationStoreError::LoginNotFound)
    ));
    assert!(matches!(
        store.read(&login).await,
        Err(VerificationStoreError::LoginNotFound)
    ));
}

pub async fn short_login_is_simply_not_found(store: Arc<dyn VerificationStore>) {
    assert!(matches!(
        store.increment_retry("").await,
        Err(VerificationStoreError::LoginNotFound)
    ));
}

pub async fn sequential_increments(store: Arc<dyn VerificationStore>, n: u64) {
    let login = unique_login("seq");
    store.create(&login, "555", 5).await.unwrap();

    for _ in 0..n {
        store.increment_retry(&login).await.unwrap();
    }

    assert_eq!(store.read(&login).await.unwrap().retry, n);

    store.delete(&login).await.unwrap();
}

pub async fn concurrent_increments(store: Arc<dyn VerificationStore>, m: u64) {
    let login = unique_login("par");
    store.create(&login, "777", 10).await.unwrap();

    let handles = (0..m).map(|_| {
        let store = store.clone();
        let login = login.clone();
        tokio::spawn(async move { store.increment_retry(&login).await })
    });
    for result in join_all(handles).await {
        result.unwrap().unwrap();
    }

    assert_eq!(store.read(&login).await.unwrap().retry, m);

    store.delete(&login).await.unwrap();
}

pub async fn concurrent_creates_have_one_winner(store: Arc<dyn VerificationStore>, m: usize) {
    let login = unique_login("race");

    let handles = (0..m).map(|i| {
        let store = store.clone();
        let login = login.clone();
        tokio::spawn(async move { store.create(&login, &format!("code{}", i), 10).await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, VerificationStoreError::LoginExists))
    );

    store.delete(&login).await.unwrap();
}

pub async fn delete_is_idempotent(store: Arc<dyn VerificationStore>) {
    let login = unique_login("delete");
    store.delete(&login).await.unwrap();

    store.create(&login, "999", 5).await.unwrap();
    store.delete(&login).await.unwrap();
    assert!(matches!(
        store.read(&login).await,
        Err(VerificationStoreError::LoginNotFound)
    ));

    store.delete(&login).await.unwrap();
}

pub async fn delete_then_create_rotates_code(store: Arc<dyn VerificationStore>) {
    let login = unique_login("rotate");
    store.create(&login, "111", 5).await.unwrap();
    store.increment_retry(&login).await.unwrap();

    store.delete(&login).await.unwrap();
    store.create(&login, "222", 5).await.unwrap();

    let record = store.read(&login).await.unwrap();
    assert_eq!(record.vcode, "222");
    assert_eq!(record.retry, 0);

    store.delete(&login).await.unwrap();
}

pub async fn full_round_trip(store: Arc<dyn VerificationStore>) {
    let login = unique_login("x");

    store.create(&login, "121", 5).await.unwrap();
    assert!(matches!(
        store.create(&login, "321", 5).await,
        Err(VerificationStoreError::LoginExists)
    ));

    for _ in 0..8 {
        store.increment_retry(&login).await.unwrap();
    }

    let record = store.read(&login).await.unwrap();
    assert_eq!((record.vcode.as_str(), record.retry), ("121", 8));

    store.delete(&login).await.unwrap();
    assert!(matches!(
        store.read(&login).await,
        Err(VerificationStoreError::LoginNotFound)
    ));
}

pub async fn rejects_invalid_input(store: Arc<dyn VerificationStore>) {
    assert!(matches!(
        store.create("ab", "121", 5).await,
        Err(VerificationStoreError::InvalidLogin)
    ));
    assert!(matches!(
        store.create("abc", "12", 5).await,
        Err(VerificationStoreError::InvalidCode)
    ));
    assert!(matches!(
        store.create("abc", "123", 0).await,
        Err(VerificationStoreError::InvalidTtl)
    ));
    assert!(matches!(
        store.read("abc").await,
        Err(VerificationStoreError::LoginNotFound)
    ));
}

pub async fn record_expires(store: Arc<dyn VerificationStore>) {
    let login = unique_login("ttl");
    store.create(&login, "123", 1).await.unwrap();
    store.increment_retry(&login).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert!(matches!(
        store.read(&login).await,
        Err(VerificationStoreError::LoginNotFound)
    ));
    assert!(matches!(
        store.increment_retry(&login).await,
        Err(VerificationStoreError::LoginNotFound)
    ));

    store.create(&login, "456", 5).await.unwrap();
    assert_eq!(store.read(&login).await.unwrap().retry, 0);

    store.delete(&login).await.unwrap();
}
