use std::time::Duration;

use seabattle::{
    confirm_pair, pair_waiting, InMemoryTransport, MatchmakingQueue, Player, PlayerId,
    ServerConfig, SessionRegistry, Transport,
};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn expect(client: &mut InMemoryTransport, needle: &str) -> anyhow::Result<String> {
    let wanted = async {
        loop {
            let msg = client.recv().await?;
            if msg.contains(needle) {
                return anyhow::Ok(msg);
            }
        }
    };
    timeout(WAIT, wanted)
        .await
        .map_err(|_| anyhow::anyhow!("timed out waiting for {:?}", needle))?
}

fn connect(id: u64) -> (Player, InMemoryTransport) {
    let (server, client) = InMemoryTransport::pair();
    (Player::new(PlayerId(id), Box::new(server)), client)
}

#[test]
fn test_queue_pairs_in_arrival_order() {
    let queue = MatchmakingQueue::new();
    assert!(queue.pop_pair().is_none());

    let mut clients = Vec::new();
    for id in 1..=3 {
        let (player, client) = connect(id);
        queue.enqueue(player);
        clients.push(client);
    }
    assert_eq!(queue.waiting_ids(), vec![PlayerId(1), PlayerId(2), PlayerId(3)]);

    let (first, second) = queue.pop_pair().unwrap();
    assert_eq!((first.id(), second.id()), (PlayerId(1), PlayerId(2)));
    assert_eq!(queue.len(), 1);
    assert!(queue.pop_pair().is_none());

    let (player, client) = connect(4);
    queue.enqueue(player);
    clients.push(client);
    let (first, second) = queue.pop_pair().unwrap();
    assert_eq!((first.id(), second.id()), (PlayerId(3), PlayerId(4)));
    assert!(queue.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_confirm_pair_announces_opponents() -> anyhow::Result<()> {
    let (first, mut a) = connect(1);
    let (second, mut b) = connect(2);

    let (first, second) = confirm_pair(first, second).await.unwrap();
    assert!(first.is_connected() && second.is_connected());
    assert_eq!(expect(&mut a, "MATCH_FOUND").await?, "MATCH_FOUND: vs Player 2\n");
    assert_eq!(expect(&mut b, "MATCH_FOUND").await?, "MATCH_FOUND: vs Player 1\n");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stale_second_player_drops_the_pair() -> anyhow::Result<()> {
    let (first, mut a) = connect(1);
    let (second, b) = connect(2);
    drop(b);

    assert!(confirm_pair(first, second).await.is_none());
    assert_eq!(
        a.recv().await?,
        "GAME_OVER: opponent disconnected before the match started\n"
    );
    assert!(a.recv().await.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stale_first_player_drops_the_pair() -> anyhow::Result<()> {
    let (first, a) = connect(1);
    let (second, mut b) = connect(2);
    drop(a);

    assert!(confirm_pair(first, second).await.is_none());
    let farewell = b.recv().await?;
    assert!(farewell.starts_with("GAME_OVER"), "{}", farewell);
    assert!(farewell.contains("before the match started"));
    assert!(b.recv().await.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pair_waiting_launches_sessions() -> anyhow::Result<()> {
    let queue = MatchmakingQueue::new();
    let registry = SessionRegistry::new();
    let config = ServerConfig {
        ready_poll_interval: Duration::from_millis(5),
        ..ServerConfig::default()
    };

    let (p1, mut a) = connect(1);
    let (p2, mut b) = connect(2);
    let (p3, _c) = connect(3);
    queue.enqueue(p1);
    queue.enqueue(p2);
    queue.enqueue(p3);

    let launched = pair_waiting(&queue, &registry, &config).await;
    assert_eq!(launched.len(), 1);
    assert!(registry.contains(launched[0]));
    assert_eq!(queue.waiting_ids(), vec![PlayerId(3)]);

    expect(&mut a, "MATCH_FOUND: vs Player 2").await?;
    expect(&mut b, "MATCH_FOUND: vs Player 1").await?;
    expect(&mut a, "YOUR_TURN").await?;
    expect(&mut b, "OPPONENT_TURN").await?;

    registry.abort_all();
    assert_eq!(registry.active_count(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pair_waiting_skips_players_who_left() -> anyhow::Result<()> {
    let queue = MatchmakingQueue::new();
    let registry = SessionRegistry::new();
    let config = ServerConfig::default();

    let (p1, a) = connect(1);
    let (p2, mut b) = connect(2);
    queue.enqueue(p1);
    queue.enqueue(p2);
    drop(a);

    assert!(pair_waiting(&queue, &registry, &config).await.is_empty());
    assert_eq!(registry.active_count(), 0);
    assert!(queue.is_empty());
    let farewell = b.recv().await?;
    assert!(farewell.contains("before the match started"), "{}", farewell);
    Ok(())
}
