//! Client connection state machine
//!
//! [`ClientSession`] decides what each server packet means for the local
//! player and which packet is due next. It owns the mirror of the match but
//! no socket, so every transition can be driven directly from tests.

use crate::game::ClientGameState;
use log::{debug, error, info, warn};
use shared::protocol::{ClientPacket, ServerCommand, ServerPacket};
use shared::sim::Cue;
use shared::snapshot::GameSnapshot;
use shared::{Side, HEARTBEAT_INTERVAL_MS, MAX_PLAYERS, READY_RETRY_INTERVAL_MS};
use std::time::{Duration, Instant};

const READY_RETRY_INTERVAL: Duration = Duration::from_millis(READY_RETRY_INTERVAL_MS);
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(HEARTBEAT_INTERVAL_MS);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Init,
    MainMenu,
    Resolving,
    Connecting,
    WaitingForStart,
    Running,
    GameOver,
    /// A send failed. Packets are still read but nothing more is sent.
    Disconnected,
    Error,
}

pub struct ClientSession {
    state: ClientState,
    player_index: Option<i32>,
    status_text: String,
    game_over_message: Option<String>,
    mirror: ClientGameState,
    last_ready_sent: Option<Instant>,
    last_heartbeat_sent: Option<Instant>,
    pending_cues: Vec<Cue>,
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            state: ClientState::Init,
            player_index: None,
            status_text: String::new(),
            game_over_message: None,
            mirror: ClientGameState::new(),
            last_ready_sent: None,
            last_heartbeat_sent: None,
            pending_cues: Vec::new(),
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn player_index(&self) -> Option<i32> {
        self.player_index
    }

    pub fn team(&self) -> Option<Side> {
        self.player_index.map(Side::of_player)
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn game_over_message(&self) -> Option<&str> {
        self.game_over_message.as_deref()
    }

    pub fn mirror(&self) -> &ClientGameState {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut ClientGameState {
        &mut self.mirror
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status_text = text.into();
    }

    pub fn show_menu(&mut self) {
        if self.state == ClientState::Init {
            self.state = ClientState::MainMenu;
            self.set_status("Main Menu");
        }
    }

    pub fn begin_resolving(&mut self) {
        if self.state == ClientState::MainMenu {
            self.state = ClientState::Resolving;
            self.set_status("Resolving server address...");
        }
    }

    /// The server address is known and the socket is open.
    pub fn resolved(&mut self) {
        if self.state == ClientState::Resolving {
            self.state = ClientState::Connecting;
            self.set_status("Connecting...");
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.state = ClientState::Error;
        self.set_status(message);
    }

    /// A packet could not be sent.
    pub fn send_failed(&mut self) {
        warn!("Send failed, treating the server as gone");
        self.state = ClientState::Disconnected;
        self.set_status("Error Sending Packet - Disconnected?");
    }

    pub fn can_send(&self) -> bool {
        !matches!(self.state, ClientState::Error | ClientState::Disconnected)
    }

    /// Nothing further will change without user action.
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            ClientState::GameOver | ClientState::Error | ClientState::Disconnected
        )
    }

    /// Takes the cues raised since the last call.
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.pending_cues)
    }

    /// The keep-alive packet due at `now`, if any.
    ///
    /// `READY` repeats every 500ms until an index is assigned. After that a
    /// `HEARTBEAT` goes out every 2s until the match ends.
    pub fn due_packet(&mut self, now: Instant) -> Option<ClientPacket> {
        if !self.can_send() {
            return None;
        }

        match self.state {
            ClientState::Connecting => {
                if is_due(self.last_ready_sent, now, READY_RETRY_INTERVAL) {
                    self.last_ready_sent = Some(now);
                    return Some(ClientPacket::ready());
                }
                None
            }
            ClientState::WaitingForStart | ClientState::Running => {
                let index = self.player_index?;
                if is_due(self.last_heartbeat_sent, now, HEARTBEAT_INTERVAL) {
                    self.last_heartbeat_sent = Some(now);
                    return Some(ClientPacket::heartbeat(index));
                }
                None
            }
            _ => None,
        }
    }

    /// Applies one server packet.
    pub fn handle_packet(&mut self, packet: &ServerPacket) {
        match packet.command {
            ServerCommand::AssignIndex => {
                if self.state == ClientState::Connecting {
                    let index = packet.assigned_player_index;
                    info!("Assigned player index {}", index);
                    self.player_index = Some(index);
                    self.state = ClientState::WaitingForStart;
                    self.set_status(format!("Connected as P{}. Waiting...", index + 1));
                }
            }
            ServerCommand::Waiting => {
                if self.state == ClientState::WaitingForStart {
                    self.set_status(format!(
                        "Waiting... ({}/{} Ready)",
                        packet.clients_connected, MAX_PLAYERS
                    ));
                }
            }
            ServerCommand::GameStart => {
                if self.state == ClientState::WaitingForStart {
                    info!("Game started");
                    self.state = ClientState::Running;
                    self.set_status("Game Running!");
                    self.pending_cues.push(Cue::MusicStart);
                }
            }
            ServerCommand::StateUpdate => {
                if matches!(
                    self.state,
                    ClientState::Running | ClientState::WaitingForStart
                ) {
                    match &packet.snapshot {
                        Some(snapshot) => {
                            self.apply(snapshot);
                            if snapshot.game_over {
                                self.finish_game();
                            }
                        }
                        None => warn!("STATE_UPDATE packet too small, snapshot dropped"),
                    }
                }
            }
            ServerCommand::GameOver => {
                if !matches!(self.state, ClientState::GameOver | ClientState::Error) {
                    if let Some(snapshot) = &packet.snapshot {
                        self.apply(snapshot);
                    }
                    self.finish_game();
                }
            }
            ServerCommand::RejectFull => {
                if self.state == ClientState::Connecting {
                    self.fail("Server Full. Connection Rejected.");
                }
            }
            ServerCommand::PlaceTowerConfirm => {
                info!("Server confirmed tower placement");
            }
            ServerCommand::PlaceTowerReject => {
                info!("Server rejected tower placement");
            }
            ServerCommand::None => {
                debug!("Empty command from server");
            }
        }
    }

    fn apply(&mut self, snapshot: &GameSnapshot) {
        let index = self.player_index.unwrap_or(0);
        let outcome = self.mirror.apply_server_state(snapshot, index);
        if outcome.fired {
            self.pending_cues.push(Cue::Pop);
        }
    }

    fn finish_game(&mut self) {
        if self.state == ClientState::GameOver {
            return;
        }

        let victory = match (self.team(), self.mirror.state().winner) {
            (Some(team), Some(winner)) => team == winner,
            _ => false,
        };
        let message = if victory { "YOU WIN!" } else { "YOU LOSE!" };
        info!("Game over: {}", message);

        self.state = ClientState::GameOver;
        self.game_over_message = Some(message.to_string());
        self.set_status("Game Over");
        self.pending_cues.push(Cue::MusicStop);
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

fn is_due(last: Option<Instant>, now: Instant, interval: Duration) -> bool {
    match last {
        None => true,
        Some(last) => now.saturating_duration_since(last) >= interval,
    }
}
