//! Server lobby and match state machine
//!
//! [`ServerSession`] holds everything the server knows about a match and
//! decides what to send in response to each datagram and each tick. It never
//! touches a socket: outgoing packets are queued as [`GameMessage`]s and the
//! network layer drains them after every tick.

use crate::client_manager::ClientManager;
use log::{debug, info, warn};
use shared::protocol::{ClientCommand, ClientPacket, ServerCommand, ServerPacket};
use shared::sim::{self, Cue};
use shared::snapshot::GameSnapshot;
use shared::state::GameState;
use shared::{Side, WINDOW_WIDTH};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

const WAITING_BROADCAST_INTERVAL: Duration = Duration::from_secs(1);
const LIVENESS_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle of a server process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    MainMenu,
    AwaitingNetworkInit,
    WaitingForPlayers,
    Running,
    /// Final snapshots were sent. Datagrams are still drained but the match
    /// no longer advances.
    GameOverBroadcasting,
}

/// Packets queued for the network layer
#[derive(Debug, Clone, PartialEq)]
pub enum GameMessage {
    SendPacket {
        packet: ServerPacket,
        addr: SocketAddr,
    },
    BroadcastPacket {
        packet: ServerPacket,
    },
}

/// Whether `player_index` may build at `x`. The left team owns everything up
/// to the centerline, the right team everything from it.
pub fn placement_on_own_side(player_index: i32, x: i32) -> bool {
    let mid = WINDOW_WIDTH / 2;
    match Side::of_player(player_index) {
        Side::Left => x <= mid,
        Side::Right => x >= mid,
    }
}

pub struct ServerSession {
    phase: ServerPhase,
    clients: ClientManager,
    game_state: GameState,
    client_timeout: Duration,
    tick: u64,
    last_waiting_broadcast: Option<Instant>,
    last_liveness_check: Option<Instant>,
    stale_reported: HashSet<usize>,
    outbox: Vec<GameMessage>,
}

impl ServerSession {
    pub fn new(max_players: usize, client_timeout: Duration) -> Self {
        Self {
            phase: ServerPhase::MainMenu,
            clients: ClientManager::new(max_players),
            game_state: GameState::new(),
            client_timeout,
            tick: 0,
            last_waiting_broadcast: None,
            last_liveness_check: None,
            stale_reported: HashSet::new(),
            outbox: Vec::new(),
        }
    }

    pub fn phase(&self) -> ServerPhase {
        self.phase
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Leaves the menu; the caller is about to open the socket.
    pub fn begin_hosting(&mut self) {
        if self.phase == ServerPhase::MainMenu {
            self.phase = ServerPhase::AwaitingNetworkInit;
        }
    }

    /// The socket is bound and the lobby is open.
    pub fn network_ready(&mut self) {
        if self.phase == ServerPhase::AwaitingNetworkInit {
            info!(
                "Waiting for {} players to connect",
                self.clients.capacity()
            );
            self.phase = ServerPhase::WaitingForPlayers;
        }
    }

    /// Takes every packet queued since the last call.
    pub fn drain_outbox(&mut self) -> Vec<GameMessage> {
        std::mem::take(&mut self.outbox)
    }

    fn send(&mut self, addr: SocketAddr, packet: ServerPacket) {
        self.outbox.push(GameMessage::SendPacket { packet, addr });
    }

    fn broadcast(&mut self, packet: ServerPacket) {
        self.outbox.push(GameMessage::BroadcastPacket { packet });
    }

    fn connected(&self) -> i32 {
        self.clients.len() as i32
    }

    fn broadcast_waiting(&mut self) {
        let packet = ServerPacket::new(ServerCommand::Waiting).with_clients_connected(self.connected());
        self.broadcast(packet);
    }

    /// Processes one datagram from `addr`.
    pub fn handle_packet(&mut self, packet: ClientPacket, addr: SocketAddr) {
        if matches!(
            self.phase,
            ServerPhase::MainMenu | ServerPhase::AwaitingNetworkInit
        ) {
            debug!("Dropping packet from {} before the lobby opened", addr);
            return;
        }

        let Some(index) = self.clients.find_client_by_addr(addr) else {
            if packet.command == ClientCommand::Ready {
                self.admit(addr);
            } else {
                debug!("Ignoring {:?} from unknown address {}", packet.command, addr);
            }
            return;
        };

        self.clients.touch(index);
        self.stale_reported.remove(&index);
        if packet.command != ClientCommand::Ready && packet.player_index != index as i32 {
            debug!(
                "Client {} sent packet claiming index {}",
                index, packet.player_index
            );
        }

        match packet.command {
            ClientCommand::Ready => {
                if self.clients.mark_ready(index) {
                    info!("Player {} signaled ready", index);
                    self.broadcast_waiting();
                }
            }
            ClientCommand::PlaceTower => {
                let placed = self.try_place_tower(index, &packet);
                let command = if placed {
                    ServerCommand::PlaceTowerConfirm
                } else {
                    ServerCommand::PlaceTowerReject
                };
                let reply = ServerPacket::new(command)
                    .with_assigned_index(index as i32)
                    .with_clients_connected(self.connected());
                self.send(addr, reply);
            }
            ClientCommand::Heartbeat => {}
            ClientCommand::None => {
                debug!("Empty command from client {}", index);
            }
        }
    }

    fn admit(&mut self, addr: SocketAddr) {
        match self.clients.add_client(addr) {
            Some(index) => {
                self.clients.mark_ready(index);
                let reply = ServerPacket::new(ServerCommand::AssignIndex)
                    .with_assigned_index(index as i32)
                    .with_clients_connected(self.connected());
                self.send(addr, reply);
                self.broadcast_waiting();
            }
            None => {
                info!("Connection from {} rejected: server full", addr);
                let reply =
                    ServerPacket::new(ServerCommand::RejectFull).with_clients_connected(self.connected());
                self.send(addr, reply);
            }
        }
    }

    fn try_place_tower(&mut self, index: usize, packet: &ClientPacket) -> bool {
        if self.phase != ServerPhase::Running {
            debug!("Placement from player {} outside a running match", index);
            return false;
        }

        let owner = index as i32;
        if !placement_on_own_side(owner, packet.target_x) {
            info!(
                "Player {} tried to build on the other team's side at x={}",
                index, packet.target_x
            );
            return false;
        }

        let Ok(prototype_index) = usize::try_from(packet.tower_type_index) else {
            return false;
        };
        self.game_state
            .place_tower(prototype_index, packet.target_x, packet.target_y, owner)
    }

    /// Runs one server tick with `dt` seconds of simulated time.
    pub fn update(&mut self, dt: f32, now: Instant) {
        self.check_liveness(now);

        match self.phase {
            ServerPhase::WaitingForPlayers => self.update_lobby(now),
            ServerPhase::Running => self.update_match(dt),
            ServerPhase::MainMenu
            | ServerPhase::AwaitingNetworkInit
            | ServerPhase::GameOverBroadcasting => {}
        }
    }

    fn update_lobby(&mut self, now: Instant) {
        if self.clients.all_ready() {
            self.start_match();
            return;
        }

        let due = self
            .last_waiting_broadcast
            .map_or(true, |last| now.duration_since(last) >= WAITING_BROADCAST_INTERVAL);
        if due {
            self.broadcast_waiting();
            self.last_waiting_broadcast = Some(now);
        }
    }

    fn start_match(&mut self) {
        info!("All {} players ready! Starting game", self.clients.len());
        self.phase = ServerPhase::Running;
        self.game_state.spawn_timer = 0.0;
        let packet =
            ServerPacket::new(ServerCommand::GameStart).with_clients_connected(self.connected());
        self.broadcast(packet);
    }

    fn update_match(&mut self, dt: f32) {
        let events = sim::step(&mut self.game_state, dt);
        self.tick += 1;

        if events.cues.contains(&Cue::LevelUp) {
            debug!("Level up at wave {}", self.game_state.current_wave);
        }

        let command = if self.game_state.game_over {
            ServerCommand::GameOver
        } else {
            ServerCommand::StateUpdate
        };
        let connected = self.connected();
        for (index, addr) in self.clients.get_client_addrs() {
            let snapshot = GameSnapshot::capture(&self.game_state, index as i32);
            let packet = ServerPacket::new(command)
                .with_assigned_index(index as i32)
                .with_clients_connected(connected)
                .with_snapshot(snapshot);
            self.send(addr, packet);
        }

        if self.game_state.game_over {
            info!(
                "Game over after {} ticks. Winner: {:?}",
                self.tick, self.game_state.winner
            );
            self.phase = ServerPhase::GameOverBroadcasting;
            return;
        }

        if self.tick % 60 == 0 {
            debug!(
                "Tick {}: wave {}, {} enemies, {} towers, {} projectiles, lanes {:?}",
                self.tick,
                self.game_state.current_wave,
                self.game_state.enemies.len(),
                self.game_state.towers.len(),
                self.game_state.projectiles.len(),
                self.game_state.lane_hp
            );
        }
    }

    fn check_liveness(&mut self, now: Instant) {
        let due = self
            .last_liveness_check
            .map_or(true, |last| now.duration_since(last) >= LIVENESS_CHECK_INTERVAL);
        if !due {
            return;
        }
        self.last_liveness_check = Some(now);

        for index in self.clients.stale_clients(self.client_timeout) {
            if self.stale_reported.insert(index) {
                warn!(
                    "Client {} has been silent for over {:?}",
                    index, self.client_timeout
                );
            }
        }
    }
}
