//! Trait abstraction for datagram socket operations to enable testing

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Trait for datagram I/O operations
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one datagram to the peer
    async fn send(&self, frame: &[u8]) -> io::Result<usize>;

    /// Receive one datagram into `buf`, returning its length
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// UDP socket bound to the local driver-station port and connected to the
/// robot address, so `send`/`recv` only talk to that peer.
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpTransport {
    /// Bind `local` and connect the socket to `peer`.
    pub async fn bind(local: SocketAddr, peer: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;
        Ok(Self { socket, peer })
    }

    /// The robot address this transport is connected to.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The locally bound address (useful when binding port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, frame: &[u8]) -> io::Result<usize> {
        self.socket.send(frame).await
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket.recv(buf).await
    }
}
