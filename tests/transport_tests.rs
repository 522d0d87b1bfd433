use seabattle::{InMemoryTransport, TcpTransport, Transport, MAX_LINE_LEN};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout, Duration};

#[tokio::test(flavor = "multi_thread")]
async fn test_in_memory_delivers_whole_messages() -> anyhow::Result<()> {
    let (mut server, mut client) = InMemoryTransport::pair();
    server.send("first line\nsecond line\n").await?;
    client.send("3 4").await?;

    assert_eq!(client.recv().await?, "first line\nsecond line\n");
    assert_eq!(server.recv().await?, "3 4");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_in_memory_detects_closed_peer() -> anyhow::Result<()> {
    let (mut server, client) = InMemoryTransport::pair();
    drop(client);
    assert!(server.send("hello").await.is_err());
    assert!(server.recv().await.is_err());

    let (mut server, mut client) = InMemoryTransport::pair();
    server.close().await;
    assert!(server.send("late").await.is_err());
    assert!(client.recv().await.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tcp_splits_lines() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let client = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await?;
        stream.write_all(b"3 4\r\nA1\nJ1").await?;
        stream.write_all(b"0\n").await?;
        anyhow::Ok(stream)
    });

    let (socket, _) = listener.accept().await?;
    let mut transport = TcpTransport::new(socket);
    assert_eq!(transport.recv().await?, "3 4");
    assert_eq!(transport.recv().await?, "A1");
    assert_eq!(transport.recv().await?, "J10");

    let stream = client.await??;
    drop(stream);
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("closed"), "{}", err);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tcp_rejects_overlong_lines() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let client = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await?;
        stream.write_all(&vec![b'7'; MAX_LINE_LEN * 4]).await?;
        anyhow::Ok(stream)
    });

    let (socket, _) = listener.accept().await?;
    let mut transport = TcpTransport::new(socket);
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("too long"), "{}", err);
    drop(client.await??);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tcp_send_reaches_peer() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let mut client = TcpTransport::connect(addr).await?;
    let (socket, _) = listener.accept().await?;
    let mut server = TcpTransport::new(socket);
    assert!(!client.peer().is_empty());

    server.send("YOUR_TURN\nYour board:\n").await?;
    assert_eq!(client.recv().await?, "YOUR_TURN");
    assert_eq!(client.recv().await?, "Your board:");

    server.close().await;
    assert!(server.send("late").await.is_err());
    assert!(client.recv().await.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_in_memory_liveness() -> anyhow::Result<()> {
    let (mut server, client) = InMemoryTransport::pair();
    assert!(server.is_alive());
    drop(client);
    assert!(!server.is_alive());

    let (mut server, _client) = InMemoryTransport::pair();
    server.close().await;
    assert!(!server.is_alive());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tcp_liveness_keeps_buffered_input() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let mut client = TcpStream::connect(addr).await?;
    let (socket, _) = listener.accept().await?;
    let mut transport = TcpTransport::new(socket);
    assert!(transport.is_alive());

    client.write_all(b"B7\n").await?;
    sleep(Duration::from_millis(50)).await;
    assert!(transport.is_alive());
    assert_eq!(transport.recv().await?, "B7");

    drop(client);
    timeout(Duration::from_secs(5), async {
        while transport.is_alive() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;
    assert!(transport.recv().await.is_err());
    Ok(())
}
