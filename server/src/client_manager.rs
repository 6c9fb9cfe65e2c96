//! Player slot registry for the lobby and the running match
//!
//! This module tracks who has joined the server:
//! - Sequential player indices handed out in arrival order
//! - Ready flags used by the lobby start condition
//! - Last-seen timestamps for liveness logging
//!
//! Slots are never freed. A player index stays bound to the address that
//! claimed it for the lifetime of the server, so team assignment and
//! snapshot money stay stable even if a client goes quiet.

use log::info;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A player that has claimed a slot
#[derive(Debug)]
pub struct Client {
    /// Player index, equal to the slot's position in join order
    pub index: usize,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Whether the client has announced it is ready to start
    pub ready: bool,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
}

impl Client {
    pub fn new(index: usize, addr: SocketAddr) -> Self {
        Self {
            index,
            addr,
            ready: false,
            last_seen: Instant::now(),
        }
    }

    /// Returns true if nothing has been heard from this client within `timeout`
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Fixed-capacity roster of player slots
pub struct ClientManager {
    /// Clients in join order; position equals player index
    clients: Vec<Client>,
    /// Number of players a match needs
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: Vec::with_capacity(max_clients),
            max_clients,
        }
    }

    /// Claims the next free player index for `addr`
    ///
    /// Returns None when every slot is taken.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<usize> {
        if self.is_full() {
            return None;
        }

        let index = self.clients.len();
        info!("Client {} connected from {}", index, addr);
        self.clients.push(Client::new(index, addr));
        Some(index)
    }

    /// Finds the player index bound to a network address
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<usize> {
        self.clients
            .iter()
            .find(|client| client.addr == addr)
            .map(|client| client.index)
    }

    /// Refreshes the liveness timestamp of a client
    pub fn touch(&mut self, index: usize) {
        if let Some(client) = self.clients.get_mut(index) {
            client.last_seen = Instant::now();
        }
    }

    /// Marks a client ready. Returns true only if the flag changed.
    pub fn mark_ready(&mut self, index: usize) -> bool {
        match self.clients.get_mut(index) {
            Some(client) if !client.ready => {
                client.ready = true;
                true
            }
            _ => false,
        }
    }

    /// True once every slot is claimed and every claimant is ready
    pub fn all_ready(&self) -> bool {
        self.is_full() && self.clients.iter().all(|client| client.ready)
    }

    /// Player indices that have been silent for longer than `timeout`
    pub fn stale_clients(&self, timeout: Duration) -> Vec<usize> {
        self.clients
            .iter()
            .filter(|client| client.is_timed_out(timeout))
            .map(|client| client.index)
            .collect()
    }

    /// Gets all player indices and their network addresses
    ///
    /// Used for broadcasting lobby and match packets.
    pub fn get_client_addrs(&self) -> Vec<(usize, SocketAddr)> {
        self.clients
            .iter()
            .map(|client| (client.index, client.addr))
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&Client> {
        self.clients.get(index)
    }

    pub fn capacity(&self) -> usize {
        self.max_clients
    }

    pub fn is_full(&self) -> bool {
        self.clients.len() >= self.max_clients
    }

    /// Returns the number of claimed slots
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
