//! Datagram formats exchanged between client and server.
//!
//! Both directions use bincode's fixed-width little-endian encoding. Every
//! server packet carries a full-capacity [`GameSnapshot`], so its encoded
//! size is always [`SERVER_PACKET_SIZE`].

use crate::snapshot::GameSnapshot;
use crate::{MAX_ENEMIES, MAX_PROJECTILES, MAX_TOWERS, PACKET_BUFFER_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClientCommand {
    #[default]
    None,
    Ready,
    PlaceTower,
    Heartbeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServerCommand {
    #[default]
    None,
    Waiting,
    AssignIndex,
    GameStart,
    StateUpdate,
    GameOver,
    RejectFull,
    PlaceTowerConfirm,
    PlaceTowerReject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPacket {
    pub command: ClientCommand,
    pub player_index: i32,
    pub tower_type_index: i32,
    pub target_x: i32,
    pub target_y: i32,
}

impl ClientPacket {
    fn new(command: ClientCommand, player_index: i32) -> Self {
        Self {
            command,
            player_index,
            tower_type_index: -1,
            target_x: 0,
            target_y: 0,
        }
    }

    /// Sent before the server has assigned an index.
    pub fn ready() -> Self {
        Self::new(ClientCommand::Ready, -1)
    }

    pub fn heartbeat(player_index: i32) -> Self {
        Self::new(ClientCommand::Heartbeat, player_index)
    }

    pub fn place_tower(player_index: i32, tower_type_index: i32, x: i32, y: i32) -> Self {
        Self {
            command: ClientCommand::PlaceTower,
            player_index,
            tower_type_index,
            target_x: x,
            target_y: y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
struct ServerHeader {
    command: ServerCommand,
    assigned_player_index: i32,
    clients_connected: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerPacket {
    pub command: ServerCommand,
    pub assigned_player_index: i32,
    pub clients_connected: i32,
    /// Absent on decode when the datagram was shorter than a full packet.
    /// Encoding an absent snapshot writes an empty one.
    pub snapshot: Option<GameSnapshot>,
}

impl ServerPacket {
    pub fn new(command: ServerCommand) -> Self {
        Self {
            command,
            assigned_player_index: -1,
            clients_connected: 0,
            snapshot: None,
        }
    }

    pub fn with_assigned_index(mut self, index: i32) -> Self {
        self.assigned_player_index = index;
        self
    }

    pub fn with_clients_connected(mut self, count: i32) -> Self {
        self.clients_connected = count;
        self
    }

    pub fn with_snapshot(mut self, snapshot: GameSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("packet too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("encoded packet is {0} bytes, larger than the receive buffer")]
    TooLarge(usize),

    #[error("malformed packet: {0}")]
    Codec(#[from] bincode::Error),
}

const ENUM_TAG_SIZE: usize = 4;
const VEC_LEN_SIZE: usize = 8;

pub const CLIENT_PACKET_SIZE: usize = ENUM_TAG_SIZE + 4 * 4;
pub const SERVER_HEADER_SIZE: usize = ENUM_TAG_SIZE + 2 * 4;

const ENEMY_SNAPSHOT_SIZE: usize = 3 * 4 + 1 + 4 + 1 + 1;
const TOWER_SNAPSHOT_SIZE: usize = 2 * 4 + 1 + 4 + 1 + 4;
const PROJECTILE_SNAPSHOT_SIZE: usize = 3 * 4 + 1 + 1;

pub const SNAPSHOT_SIZE: usize = 3 * VEC_LEN_SIZE
    + MAX_ENEMIES * ENEMY_SNAPSHOT_SIZE
    + MAX_TOWERS * TOWER_SNAPSHOT_SIZE
    + MAX_PROJECTILES * PROJECTILE_SNAPSHOT_SIZE
    // entity counts
    + 3 * 4
    // money, lane hp, wave
    + 4 * 4
    + 1
    + 4;

pub const SERVER_PACKET_SIZE: usize = SERVER_HEADER_SIZE + SNAPSHOT_SIZE;

/// Encoded size of every server packet.
pub fn server_packet_size() -> usize {
    SERVER_PACKET_SIZE
}

pub fn encode_client_packet(packet: &ClientPacket) -> Result<Vec<u8>, ProtocolError> {
    Ok(bincode::serialize(packet)?)
}

pub fn decode_client_packet(bytes: &[u8]) -> Result<ClientPacket, ProtocolError> {
    if bytes.len() < CLIENT_PACKET_SIZE {
        return Err(ProtocolError::TooShort {
            expected: CLIENT_PACKET_SIZE,
            actual: bytes.len(),
        });
    }
    Ok(bincode::deserialize(&bytes[..CLIENT_PACKET_SIZE])?)
}

pub fn encode_server_packet(packet: &ServerPacket) -> Result<Vec<u8>, ProtocolError> {
    let header = ServerHeader {
        command: packet.command,
        assigned_player_index: packet.assigned_player_index,
        clients_connected: packet.clients_connected,
    };
    let mut bytes = Vec::with_capacity(SERVER_PACKET_SIZE);
    bincode::serialize_into(&mut bytes, &header)?;

    match &packet.snapshot {
        Some(snapshot) if snapshot.is_padded() => bincode::serialize_into(&mut bytes, snapshot)?,
        Some(snapshot) => {
            let mut padded = snapshot.clone();
            padded.normalize();
            bincode::serialize_into(&mut bytes, &padded)?;
        }
        None => bincode::serialize_into(&mut bytes, &GameSnapshot::empty())?,
    }

    if bytes.len() > PACKET_BUFFER_SIZE {
        return Err(ProtocolError::TooLarge(bytes.len()));
    }
    Ok(bytes)
}

/// Decodes the header, then the snapshot if the datagram is full-size.
pub fn decode_server_packet(bytes: &[u8]) -> Result<ServerPacket, ProtocolError> {
    if bytes.len() < SERVER_HEADER_SIZE {
        return Err(ProtocolError::TooShort {
            expected: SERVER_HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    let header: ServerHeader = bincode::deserialize(&bytes[..SERVER_HEADER_SIZE])?;

    let snapshot = if bytes.len() >= SERVER_PACKET_SIZE {
        Some(bincode::deserialize::<GameSnapshot>(
            &bytes[SERVER_HEADER_SIZE..SERVER_PACKET_SIZE],
        )?)
    } else {
        None
    };

    Ok(ServerPacket {
        command: header.command,
        assigned_player_index: header.assigned_player_index,
        clients_connected: header.clients_connected,
        snapshot,
    })
}
