//! Server network layer handling UDP communications and tick pacing

use crate::config::ServerConfig;
use crate::session::{GameMessage, ServerPhase, ServerSession};
use log::{debug, error, info, warn};
use shared::protocol::{decode_client_packet, encode_server_packet, ServerPacket};
use shared::{MAX_DELTA_TIME, PACKET_BUFFER_SIZE};
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::{interval, MissedTickBehavior};

/// Authoritative server: one socket, one session, one tick loop
pub struct Server {
    socket: UdpSocket,
    session: ServerSession,
    tick_duration: Duration,
    buffer: Vec<u8>,
}

impl Server {
    /// Binds the socket and opens the lobby.
    pub async fn new(config: &ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let mut session = ServerSession::new(config.max_players, config.client_timeout);
        session.begin_hosting();

        let addr = config.bind_addr();
        let socket = UdpSocket::bind(&addr).await?;
        info!("Server listening on {}", socket.local_addr()?);
        session.network_ready();

        Ok(Server {
            socket,
            session,
            tick_duration: config.tick_duration(),
            buffer: vec![0u8; PACKET_BUFFER_SIZE],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn session(&self) -> &ServerSession {
        &self.session
    }

    pub fn phase(&self) -> ServerPhase {
        self.session.phase()
    }

    /// Reads every datagram currently queued on the socket.
    fn drain_socket(&mut self) -> io::Result<usize> {
        let mut received = 0;
        loop {
            match self.socket.try_recv_from(&mut self.buffer) {
                Ok((len, addr)) => {
                    received += 1;
                    match decode_client_packet(&self.buffer[..len]) {
                        Ok(packet) => self.session.handle_packet(packet, addr),
                        Err(e) => warn!("Dropping packet from {}: {}", addr, e),
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                // ICMP port-unreachable from a departed client surfaces here
                // on some platforms.
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused
                    ) =>
                {
                    debug!("Ignoring socket error: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(received)
    }

    async fn send_packet_impl(&self, packet: &ServerPacket, addrs: &[SocketAddr]) {
        let data = match encode_server_packet(packet) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to encode {:?} packet: {}", packet.command, e);
                return;
            }
        };

        for addr in addrs {
            if let Err(e) = self.socket.send_to(&data, addr).await {
                warn!("Failed to send packet to {}: {}", addr, e);
            }
        }
    }

    /// Sends everything the session queued during this tick.
    async fn flush_outbox(&mut self) {
        for message in self.session.drain_outbox() {
            match message {
                GameMessage::SendPacket { packet, addr } => {
                    self.send_packet_impl(&packet, &[addr]).await;
                }
                GameMessage::BroadcastPacket { packet } => {
                    let addrs: Vec<SocketAddr> = self
                        .session
                        .clients()
                        .get_client_addrs()
                        .into_iter()
                        .map(|(_, addr)| addr)
                        .collect();
                    self.send_packet_impl(&packet, &addrs).await;
                }
            }
        }
    }

    /// Main server loop. Returns only on an unrecoverable socket error.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_tick = Instant::now();

        info!("Server started successfully");

        loop {
            tick_interval.tick().await;

            self.drain_socket()?;

            let now = Instant::now();
            let mut dt = now.duration_since(last_tick).as_secs_f32();
            last_tick = now;

            if dt > MAX_DELTA_TIME {
                warn!(
                    "Large delta time detected ({:.3}s), capping to {:.3}s",
                    dt, MAX_DELTA_TIME
                );
                dt = MAX_DELTA_TIME;
            }

            self.session.update(dt, now);
            self.flush_outbox().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::{decode_server_packet, encode_client_packet, ClientPacket, ServerCommand};
    use tokio::time::timeout;

    fn local_config(max_players: usize) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_players,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_server_binds_and_opens_lobby() {
        let server = Server::new(&local_config(2)).await.unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert_eq!(server.phase(), ServerPhase::WaitingForPlayers);
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let first = Server::new(&local_config(2)).await.unwrap();
        let taken = ServerConfig {
            port: first.local_addr().unwrap().port(),
            ..local_config(2)
        };
        assert!(Server::new(&taken).await.is_err());
    }

    #[tokio::test]
    async fn test_ready_gets_assign_index() {
        let mut server = Server::new(&local_config(2)).await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let ready = encode_client_packet(&ClientPacket::ready()).unwrap();
        client.send_to(&ready, server_addr).await.unwrap();

        let mut buf = vec![0u8; PACKET_BUFFER_SIZE];
        let received = tokio::select! {
            _ = server.run() => panic!("server loop exited"),
            result = timeout(Duration::from_secs(2), client.recv_from(&mut buf)) => result,
        };
        let (len, from) = received.unwrap().unwrap();
        assert_eq!(from, server_addr);

        let packet = decode_server_packet(&buf[..len]).unwrap();
        assert_eq!(packet.command, ServerCommand::AssignIndex);
        assert_eq!(packet.assigned_player_index, 0);
        assert_eq!(server.session().clients().len(), 1);
    }

    #[tokio::test]
    async fn test_garbage_datagram_is_dropped() {
        let mut server = Server::new(&local_config(2)).await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&[1, 2, 3], server_addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let received = server.drain_socket().unwrap();
        assert_eq!(received, 1);
        assert!(server.session().clients().is_empty());
    }
}
