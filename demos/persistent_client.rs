//! Resilient client example: stays connected to an echo server through
//! restarts and drops.

use resock_tokio::{SocketConfig, SocketEvent};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <server|client> [address]", args[0]);
        eprintln!("Example: {} server 127.0.0.1:12345", args[0]);
        eprintln!("Example: {} client 127.0.0.1:12345", args[0]);
        return Ok(());
    }

    let mode = &args[1];
    let addr: SocketAddr = if args.len() > 2 {
        args[2].parse()?
    } else {
        "127.0.0.1:12345".parse()?
    };

    match mode.as_str() {
        "server" => run_server(addr).await,
        "client" => run_client(addr).await,
        _ => {
            eprintln!("Mode must be 'server' or 'client'");
            Ok(())
        }
    }
}

async fn run_server(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting TCP echo server on {}", addr);
    let listener = TcpListener::bind(addr).await?;

    loop {
        match listener.accept().await {
            Ok((mut stream, peer_addr)) => {
                info!("New connection from {}", peer_addr);

                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    loop {
                        match stream.read(&mut buf).await {
                            Ok(0) => {
                                info!("Client {} disconnected", peer_addr);
                                break;
                            }
                            Ok(n) => {
                                if let Err(e) = stream.write_all(&buf[..n]).await {
                                    error!("Error writing to {}: {}", peer_addr, e);
                                    break;
                                }
                            }
                            Err(e) => {
                                error!("Error reading from {}: {}", peer_addr, e);
                                break;
                            }
                        }
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn run_client(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    info!("Connecting to echo server at {}", addr);

    let (socket, mut events) = SocketConfig::resilient()
        .host(addr.ip().to_string())
        .port(addr.port())
        .retry_interval(Duration::from_secs(1))
        .connect()
        .await?;

    // Send a heartbeat line every two seconds; the socket survives server
    // restarts in between
    let sender = socket.clone();
    tokio::spawn(async move {
        let mut counter = 0u64;
        loop {
            counter += 1;
            let message = format!("heartbeat {}", counter);
            match sender.send(message.clone()).await {
                Ok(()) => info!("Sent: {}", message),
                Err(e) => warn!("Send failed ({}), waiting for reconnect", e),
            }
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    });

    while let Some(event) = events.next().await {
        match event {
            SocketEvent::Connected => info!("Connected"),
            SocketEvent::Data(bytes) => {
                info!("Received echo: {}", String::from_utf8_lossy(&bytes));
            }
            SocketEvent::Closed { had_error, .. } => {
                warn!("Connection closed (had_error = {})", had_error);
            }
            SocketEvent::ReconnectScheduled { attempt, wait } => {
                warn!("Reconnect attempt {} scheduled in {:?}", attempt, wait);
            }
            SocketEvent::Error(e) => {
                error!("Fatal socket error: {}", e);
                break;
            }
            SocketEvent::Idle => info!("Connection idle"),
            SocketEvent::Destroyed => break,
        }
    }

    let _ = socket.destroy().await;
    info!("Client finished");
    Ok(())
}
