mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{reachable_port, test_timeouts, FakeConnector, FakeControlPlane};

use kafscope::cluster::capability::INTER_NODE_PROTOCOL_VERSION_PROP as PROTOCOL_VERSION_PROP;
use kafscope::cluster::{ProxyFactory, RefreshScheduler};
use kafscope::control_plane::HostPort;

async fn healthy_fake() -> (FakeControlPlane, tokio::net::TcpListener) {
    let (listener, port) = reachable_port().await;
    let fake = FakeControlPlane::new();
    fake.set_cluster("test-cluster", Some("1"));
    fake.add_node("1", "127.0.0.1", port);
    fake.set_broker_config("1", &[(PROTOCOL_VERSION_PROP, "2.4.0")]);
    (fake, listener)
}

#[tokio::test]
async fn obtain_reuses_the_proxy_held_for_an_endpoint() {
    let (fake, _listener) = healthy_fake().await;
    let connector = FakeConnector::new(fake);
    let factory = ProxyFactory::new(connector.clone(), test_timeouts());
    let endpoint = HostPort::new("127.0.0.1", 9092);

    let first = factory.obtain(&endpoint).await.unwrap();
    let second = factory.obtain(&endpoint).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.id(), second.id());
    // every obtain still opens a fresh connection
    assert_eq!(connector.connect_count(), 2);
}

#[tokio::test]
async fn obtain_constructs_a_distinct_proxy_per_endpoint() {
    let (fake, _listener) = healthy_fake().await;
    let connector = FakeConnector::new(fake);
    let factory = ProxyFactory::new(connector, test_timeouts());

    let first = factory.obtain(&HostPort::new("127.0.0.1", 9092)).await.unwrap();
    let second = factory.obtain(&HostPort::new("127.0.0.1", 9093)).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first.id(), second.id());
    assert_eq!(first.endpoint(), &HostPort::new("127.0.0.1", 9092));
    assert_eq!(second.endpoint(), &HostPort::new("127.0.0.1", 9093));
}

#[tokio::test]
async fn obtained_proxy_is_already_refreshed() {
    let (fake, _listener) = healthy_fake().await;
    fake.add_topic("orders", 2);
    let factory = ProxyFactory::new(FakeConnector::new(fake), test_timeouts());

    let proxy = factory.obtain(&HostPort::new("127.0.0.1", 9092)).await.unwrap();

    assert_eq!(proxy.snapshot().cluster_id(), "test-cluster");
    assert!(proxy.has_topic("orders"));
}

#[tokio::test]
async fn scheduler_refreshes_periodically_until_shut_down() {
    let (fake, _listener) = healthy_fake().await;
    let connector = FakeConnector::new(fake.clone());
    let factory = Arc::new(ProxyFactory::new(connector.clone(), test_timeouts()));
    let proxy = factory.obtain(&HostPort::new("127.0.0.1", 9092)).await.unwrap();
    let after_obtain = connector.connect_count();

    let scheduler = RefreshScheduler::start(Duration::from_millis(50), factory, proxy.clone());
    tokio::time::sleep(Duration::from_millis(220)).await;

    let while_running = connector.connect_count();
    assert!(
        while_running > after_obtain,
        "scheduler never refreshed ({} connects)",
        while_running
    );

    scheduler.shutdown();
    let after_shutdown = connector.connect_count();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(connector.connect_count(), after_shutdown);

    // the proxy itself is still usable after the driver stops
    assert_eq!(proxy.snapshot().cluster_id(), "test-cluster");
}

#[tokio::test]
async fn scheduler_keeps_ticking_through_failed_refreshes() {
    let (fake, listener) = healthy_fake().await;
    let connector = FakeConnector::new(fake);
    let factory = Arc::new(ProxyFactory::new(connector.clone(), test_timeouts()));
    let proxy = factory.obtain(&HostPort::new("127.0.0.1", 9092)).await.unwrap();

    // advertised listener goes away: every periodic pass now fails validation
    drop(listener);

    let _scheduler = RefreshScheduler::start(
        Duration::from_millis(50),
        factory,
        proxy.clone(),
    );
    tokio::time::sleep(Duration::from_millis(220)).await;

    assert!(connector.connect_count() >= 2);
    // the last successful snapshot stays visible
    assert_eq!(proxy.snapshot().cluster_id(), "test-cluster");
}
