//! Integration Tests for the Peer Protocol
//!
//! Runs real nodes on loopback ports and drives them through the HTTP
//! client, the pool and the group read path.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use kcache::{
    create_router, models::Request, AppState, CacheError, GetterFn, Group, GroupRegistry,
    HttpGetter, HttpPool, PeerGetter, PeerPicker, Result,
};
use tokio::net::TcpListener;

// == Helper Functions ==

fn db(key: &str) -> Result<Vec<u8>> {
    match key {
        "Tom" => Ok(b"630".to_vec()),
        "Jack" => Ok(b"589".to_vec()),
        "Sam" => Ok(b"567".to_vec()),
        _ => Err(CacheError::Internal(format!("{} not exist", key))),
    }
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    (listener, addr)
}

/// Address nothing listens on.
fn closed_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Starts a node whose "scores" group tags every loaded value with `tag`.
fn spawn_node(
    listener: TcpListener,
    self_addr: &str,
    peers: &[String],
    tag: &'static str,
) -> (Arc<HttpPool>, Arc<Group>) {
    let groups = Arc::new(GroupRegistry::new());
    let group = groups.new_group(
        "scores",
        100,
        Duration::ZERO,
        GetterFn(move |key: &str| -> Result<Vec<u8>> { Ok(format!("{}:{}", tag, key).into_bytes()) }),
    );
    groups.new_group("db", 100, Duration::ZERO, GetterFn(db));

    let pool = Arc::new(HttpPool::new(self_addr).unwrap());
    pool.add_peers(peers.iter().cloned());
    group.register_peers(pool.clone()).unwrap();

    let app = create_router(AppState::new(pool.clone(), groups));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (pool, group)
}

/// First key whose owner, as seen from `pool`, is a remote node.
fn remote_key(pool: &HttpPool) -> (String, String) {
    (0..1000)
        .map(|i| format!("key-{}", i))
        .find_map(|key| {
            pool.pick_peer(&key)
                .map(|getter| (key, getter.addr().to_string()))
        })
        .expect("some key should be owned by a remote node")
}

fn local_key(pool: &HttpPool) -> String {
    (0..1000)
        .map(|i| format!("key-{}", i))
        .find(|key| pool.pick_peer(key).is_none())
        .expect("some key should be owned locally")
}

// == HTTP Getter Tests ==

#[tokio::test]
async fn test_getter_round_trip() {
    let (listener, addr) = bind().await;
    spawn_node(listener, &addr, &[addr.clone()], "a");

    let getter = HttpGetter::new(&addr, "/_kcache/", reqwest::Client::new());
    let response = getter.get(&Request::new("db", "Tom")).await.unwrap();

    assert_eq!(&response.value[..], b"630");
}

#[tokio::test]
async fn test_getter_escapes_key() {
    let (listener, addr) = bind().await;
    spawn_node(listener, &addr, &[addr.clone()], "a");

    let getter = HttpGetter::new(&addr, "/_kcache/", reqwest::Client::new());
    let response = getter
        .get(&Request::new("scores", "a/b c?d"))
        .await
        .unwrap();

    assert_eq!(&response.value[..], b"a:a/b c?d");
}

#[tokio::test]
async fn test_getter_unknown_group_is_remote_status() {
    let (listener, addr) = bind().await;
    spawn_node(listener, &addr, &[addr.clone()], "a");

    let getter = HttpGetter::new(&addr, "/_kcache/", reqwest::Client::new());
    let err = getter
        .get(&Request::new("nope", "Tom"))
        .await
        .unwrap_err();

    match err {
        CacheError::RemoteStatus(status) => assert!(status.starts_with("404"), "{}", status),
        other => panic!("expected RemoteStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_getter_loader_failure_is_remote_status() {
    let (listener, addr) = bind().await;
    spawn_node(listener, &addr, &[addr.clone()], "a");

    let getter = HttpGetter::new(&addr, "/_kcache/", reqwest::Client::new());
    let err = getter.get(&Request::new("db", "Bob")).await.unwrap_err();

    assert!(matches!(err, CacheError::RemoteStatus(ref s) if s.starts_with("500")));
}

#[tokio::test]
async fn test_getter_garbage_body_is_decode_error() {
    let (listener, addr) = bind().await;
    // Length prefix promises 5 bytes that never arrive
    let app = axum::Router::new().fallback(|| async { vec![0x0a_u8, 0x05] });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let getter = HttpGetter::new(&addr, "/_kcache/", reqwest::Client::new());
    let err = getter.get(&Request::new("scores", "Tom")).await.unwrap_err();

    assert!(matches!(err, CacheError::Decode(_)), "{:?}", err);
}

#[tokio::test]
async fn test_getter_closed_port_is_transport_error() {
    let getter = HttpGetter::new(closed_addr(), "/_kcache/", reqwest::Client::new());
    let err = getter.get(&Request::new("db", "Tom")).await.unwrap_err();

    assert!(matches!(err, CacheError::Transport(_)));
}

// == Cluster Tests ==

#[tokio::test]
async fn test_two_nodes_route_to_owner() {
    let (listener_a, addr_a) = bind().await;
    let (listener_b, addr_b) = bind().await;
    let peers = vec![addr_a.clone(), addr_b.clone()];

    let (pool_a, group_a) = spawn_node(listener_a, &addr_a, &peers, "a");
    let (_pool_b, group_b) = spawn_node(listener_b, &addr_b, &peers, "b");

    let (key, owner) = remote_key(&pool_a);
    assert_eq!(owner, addr_b);

    // Node b loads and caches the value; node a only relays it
    let value = group_a.get(&key).await.unwrap();
    assert_eq!(value.to_string(), format!("b:{}", key));
    assert_eq!(group_a.stats().total_entries, 0);
    assert_eq!(group_b.stats().total_entries, 1);

    let local = local_key(&pool_a);
    let value = group_a.get(&local).await.unwrap();
    assert_eq!(value.to_string(), format!("a:{}", local));
    assert_eq!(group_a.stats().total_entries, 1);
}

#[tokio::test]
async fn test_both_nodes_agree_on_owner() {
    let (listener_a, addr_a) = bind().await;
    let (listener_b, addr_b) = bind().await;
    let peers = vec![addr_a.clone(), addr_b.clone()];

    let (pool_a, group_a) = spawn_node(listener_a, &addr_a, &peers, "a");
    let (_pool_b, group_b) = spawn_node(listener_b, &addr_b, &peers, "b");

    for i in 0..20 {
        let key = format!("key-{}", i);
        let from_a = group_a.get(&key).await.unwrap();
        let from_b = group_b.get(&key).await.unwrap();
        assert_eq!(from_a, from_b, "key {}", key);

        let expected = if pool_a.pick_peer(&key).is_some() { "b" } else { "a" };
        assert_eq!(from_a.to_string(), format!("{}:{}", expected, key));
    }
}

#[tokio::test]
async fn test_unreachable_owner_falls_back_to_loader() {
    let (listener, addr) = bind().await;
    let dead = closed_addr();
    let peers = vec![addr.clone(), dead.clone()];

    let (pool, group) = spawn_node(listener, &addr, &peers, "a");

    let (key, owner) = remote_key(&pool);
    assert_eq!(owner, dead);

    let value = group.get(&key).await.unwrap();
    assert_eq!(value.to_string(), format!("a:{}", key));
}
