//! Lifetime manager integration tests
//!
//! Run with: cargo test -p integration-tests --test lifetime_tests
//!
//! Fan-out order is unspecified, so assertions only look at final state.

use futures::future::join_all;
use hub_common::{GroupCleanup, LifetimeConfig};
use hub_core::{HubConnection, HubLifetimeManager};
use integration_tests::{test_config, RecordingConnection, TestHub};
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// Connection Lifetime Tests
// ============================================================================

#[tokio::test]
async fn test_connect_then_disconnect() {
    let hub = TestHub::start();
    let conn = hub.connect("a").await;

    assert!(hub.manager.lookup(&conn.id()).is_some());

    hub.disconnect(&conn).await;
    assert!(hub.manager.lookup(&conn.id()).is_none());
}

#[tokio::test]
async fn test_invoke_client_unknown_id_is_noop() {
    let hub = TestHub::start();
    let conn = hub.connect("a").await;

    hub.manager.invoke_client("missing", "x", vec![]).await;

    assert_eq!(conn.attempts(), 0);
}

#[tokio::test]
async fn test_invoke_client_after_disconnect_is_noop() {
    let hub = TestHub::start();
    let conn = hub.connect("a").await;
    hub.disconnect(&conn).await;

    hub.manager.invoke_client(&conn.id(), "x", vec![]).await;

    assert_eq!(conn.attempts(), 0);
}

#[tokio::test]
async fn test_independent_managers_share_nothing() {
    let first = TestHub::start();
    let second = TestHub::start();
    let conn = first.connect("a").await;

    second.manager.invoke_all("hello", vec![]).await;

    assert!(conn.received().is_empty());
    assert_eq!(second.manager.connection_count(), 0);
}

// ============================================================================
// Group Tests
// ============================================================================

#[tokio::test]
async fn test_group_fan_out_reaches_members_only() {
    let hub = TestHub::start();
    let a = hub.connect("a").await;
    let b = hub.connect("b").await;
    let c = hub.connect("c").await;

    hub.manager.add_to_group("room1", &a.id()).await;
    hub.manager.add_to_group("room1", &b.id()).await;
    hub.manager.invoke_group("room1", "chat", vec![json!("hi")]).await;

    assert_eq!(a.targets(), vec!["chat"]);
    assert_eq!(b.targets(), vec!["chat"]);
    assert!(c.received().is_empty());
    assert_eq!(a.received()[0].arguments, vec![json!("hi")]);
}

#[tokio::test]
async fn test_unknown_group_reaches_nobody() {
    let hub = TestHub::start();
    let a = hub.connect("a").await;

    hub.manager.invoke_group("nowhere", "chat", vec![]).await;

    assert_eq!(a.attempts(), 0);
}

#[tokio::test]
async fn test_add_twice_keeps_one_membership() {
    let hub = TestHub::start();
    let a = hub.connect("a").await;

    hub.manager.add_to_group("g", &a.id()).await;
    hub.manager.add_to_group("g", &a.id()).await;
    hub.manager.invoke_group("g", "once", vec![]).await;

    assert_eq!(hub.member_ids("g"), vec![a.id()]);
    assert_eq!(a.received().len(), 1);
}

#[tokio::test]
async fn test_remove_then_add_restores_membership() {
    let hub = TestHub::start();
    let a = hub.connect("a").await;
    hub.manager.add_to_group("g", &a.id()).await;

    hub.manager.remove_from_group("g", &a.id()).await;
    assert!(hub.member_ids("g").is_empty());

    hub.manager.add_to_group("g", &a.id()).await;
    assert_eq!(hub.member_ids("g"), vec![a.id()]);
}

#[tokio::test]
async fn test_stale_member_is_tolerated_by_default() {
    let hub = TestHub::start();
    let a = hub.connect("a").await;
    let b = hub.connect("b").await;
    hub.manager.add_to_group("g", &a.id()).await;
    hub.manager.add_to_group("g", &b.id()).await;

    a.close();
    hub.disconnect(&a).await;
    hub.manager.invoke_group("g", "chat", vec![]).await;

    assert_eq!(a.attempts(), 1);
    assert!(a.received().is_empty());
    assert_eq!(b.received().len(), 1);
    assert_eq!(hub.member_ids("g").len(), 2);
}

#[tokio::test]
async fn test_lazy_cleanup_from_config() {
    let config = test_config(&[("HUB_GROUP_CLEANUP", "lazy")]).unwrap();
    let hub = TestHub::start_with_config(config.lifetime);
    let a = hub.connect("a").await;
    hub.manager.add_to_group("g", &a.id()).await;

    a.close();
    hub.manager.invoke_group("g", "chat", vec![]).await;
    hub.manager.invoke_group("g", "chat", vec![]).await;

    assert!(hub.member_ids("g").is_empty());
    assert_eq!(a.attempts(), 1);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_adds_lose_no_updates() {
    const N: usize = 200;

    let hub = TestHub::start();
    let mut conns = Vec::with_capacity(N);
    for _ in 0..N {
        conns.push(hub.connect("member").await);
    }

    let tasks = conns.iter().map(|conn| {
        let manager = Arc::clone(&hub.manager);
        let id = conn.id();
        tokio::spawn(async move {
            manager.add_to_group("g", &id).await;
        })
    });
    for result in join_all(tasks).await {
        result.unwrap();
    }

    assert_eq!(hub.manager.members_of("g").len(), N);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_add_remove_same_member() {
    let hub = TestHub::start();
    let a = hub.connect("a").await;

    let tasks = (0..100).map(|i| {
        let manager = Arc::clone(&hub.manager);
        let id = a.id();
        tokio::spawn(async move {
            if i % 2 == 0 {
                manager.add_to_group("g", &id).await;
            } else {
                manager.remove_from_group("g", &id).await;
            }
        })
    });
    for result in join_all(tasks).await {
        result.unwrap();
    }

    // Whatever the interleaving, there is at most one entry and a final
    // sequential write decides membership.
    assert!(hub.member_ids("g").len() <= 1);

    hub.manager.add_to_group("g", &a.id()).await;
    assert_eq!(hub.member_ids("g"), vec![a.id()]);
    hub.manager.remove_from_group("g", &a.id()).await;
    assert!(hub.member_ids("g").is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_fan_out_during_membership_churn() {
    let hub = TestHub::start();
    let stable = hub.connect("stable").await;
    hub.manager.add_to_group("g", &stable.id()).await;

    let mut churners = Vec::new();
    for _ in 0..20 {
        churners.push(hub.connect("churn").await);
    }

    let mutators = churners.iter().map(|conn| {
        let manager = Arc::clone(&hub.manager);
        let id = conn.id();
        tokio::spawn(async move {
            for _ in 0..50 {
                manager.add_to_group("g", &id).await;
                manager.remove_from_group("g", &id).await;
            }
        })
    });

    let senders = (0..10).map(|_| {
        let manager = Arc::clone(&hub.manager);
        tokio::spawn(async move {
            for _ in 0..20 {
                manager.invoke_group("g", "tick", vec![]).await;
            }
        })
    });

    let mutators: Vec<_> = mutators.collect();
    let senders: Vec<_> = senders.collect();
    for result in join_all(mutators.into_iter().chain(senders)).await {
        result.unwrap();
    }

    // Every fan-out saw the stable member; churners end up out of the group.
    assert_eq!(stable.received().len(), 200);
    assert_eq!(hub.member_ids("g"), vec![stable.id()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_connect_disconnect() {
    let hub = TestHub::start();

    let tasks = (0..100).map(|i| {
        let manager = Arc::clone(&hub.manager);
        tokio::spawn(async move {
            let conn = RecordingConnection::unique("conn");
            manager.on_connected(conn.clone()).await;
            manager.add_to_group("lobby", conn.connection_id().as_str()).await;
            manager.invoke_all("hello", vec![json!(i)]).await;
            if i % 2 == 0 {
                manager.on_disconnected(conn.clone()).await;
            }
            conn
        })
    });

    let mut conns = Vec::new();
    for result in join_all(tasks).await {
        conns.push(result.unwrap());
    }

    assert_eq!(hub.manager.connection_count(), 50);
    assert_eq!(hub.member_ids("lobby").len(), 100);
    for conn in &conns {
        // Each connection at least saw its own broadcast.
        assert!(!conn.received().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_on_disconnect_cleanup_under_concurrency() {
    let hub = TestHub::start_with_config(LifetimeConfig {
        group_cleanup: GroupCleanup::OnDisconnect,
        ..LifetimeConfig::default()
    });

    let mut conns = Vec::new();
    for _ in 0..50 {
        conns.push(hub.connect("member").await);
    }
    for conn in &conns {
        hub.manager.add_to_group("a", &conn.id()).await;
        hub.manager.add_to_group("b", &conn.id()).await;
    }

    let tasks = conns.iter().map(|conn| {
        let manager = Arc::clone(&hub.manager);
        let conn = Arc::clone(conn);
        tokio::spawn(async move {
            manager.on_disconnected(conn).await;
        })
    });
    for result in join_all(tasks).await {
        result.unwrap();
    }

    assert_eq!(hub.manager.connection_count(), 0);
    assert!(hub.member_ids("a").is_empty());
    assert!(hub.member_ids("b").is_empty());
    assert_eq!(hub.manager.prune_empty_groups(), 2);
}
