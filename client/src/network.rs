//! Client network layer: one UDP socket talking to one server

use crate::config::ClientConfig;
use crate::input::{placement_request, select_tower, InputIntent, InputManager};
use crate::presenter::Presenter;
use crate::session::{ClientSession, ClientState};
use log::{debug, error, info, warn};
use shared::protocol::{decode_server_packet, encode_client_packet, ClientPacket};
use shared::PACKET_BUFFER_SIZE;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::{interval, MissedTickBehavior};

pub struct Client<P: Presenter> {
    socket: UdpSocket,
    server_addr: SocketAddr,
    session: ClientSession,
    input: InputManager,
    presenter: P,
    buffer: Vec<u8>,
    frame_interval: Duration,
    game_over_shown: bool,
}

impl<P: Presenter> Client<P> {
    /// Resolves the server and opens a socket. Either failure leaves the
    /// session in `Error` and is returned to the caller.
    pub async fn connect(
        config: &ClientConfig,
        mut presenter: P,
        input: InputManager,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut session = ClientSession::new();
        session.show_menu();
        session.begin_resolving();
        presenter.status(session.status_text());

        let target = config.server_addr();
        let server_addr = match lookup_host(&target).await.map(|mut addrs| addrs.next()) {
            Ok(Some(addr)) => addr,
            Ok(None) => {
                session.fail(format!("Could not resolve server {}", target));
                presenter.status(session.status_text());
                return Err(io::Error::new(io::ErrorKind::NotFound, "no address for server").into());
            }
            Err(e) => {
                session.fail(format!("Could not resolve server {}: {}", target, e));
                presenter.status(session.status_text());
                return Err(e.into());
            }
        };

        let bind_addr = if server_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = match UdpSocket::bind(bind_addr).await {
            Ok(socket) => socket,
            Err(e) => {
                session.fail(format!("Could not open socket: {}", e));
                presenter.status(session.status_text());
                return Err(e.into());
            }
        };

        info!("Connecting to {} from {}", server_addr, socket.local_addr()?);
        session.resolved();

        Ok(Client {
            socket,
            server_addr,
            session,
            input,
            presenter,
            buffer: vec![0u8; PACKET_BUFFER_SIZE],
            frame_interval: config.frame_interval,
            game_over_shown: false,
        })
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub fn state(&self) -> ClientState {
        self.session.state()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Applies every datagram queued on the socket. Anything not from the
    /// server is ignored.
    fn drain_socket(&mut self) -> io::Result<usize> {
        let mut received = 0;
        loop {
            match self.socket.try_recv_from(&mut self.buffer) {
                Ok((len, from)) => {
                    if from != self.server_addr {
                        debug!("Ignoring datagram from {}", from);
                        continue;
                    }
                    received += 1;
                    match decode_server_packet(&self.buffer[..len]) {
                        Ok(packet) => self.session.handle_packet(&packet),
                        Err(e) => warn!("Dropping packet from server: {}", e),
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                // The server is not listening yet, or has gone away.
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

    async fn send(&mut self, packet: &ClientPacket) {
        if !self.session.can_send() {
            return;
        }

        let data = match encode_client_packet(packet) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to encode {:?} packet: {}", packet.command, e);
                return;
            }
        };

        if let Err(e) = self.socket.send_to(&data, self.server_addr).await {
            warn!("Failed to send {:?} to {}: {}", packet.command, self.server_addr, e);
            self.session.send_failed();
        }
    }

    /// Applies at most one intent. Returns false on `Quit`.
    async fn apply_input(&mut self) -> bool {
        let quitting = matches!(self.input.peek(), Some(InputIntent::Quit));
        if self.session.state() != ClientState::Running && !quitting {
            return true;
        }

        let Some(intent) = self.input.next_intent() else {
            return true;
        };

        match intent {
            InputIntent::Quit => return false,
            InputIntent::Cancel => self.session.mirror_mut().state_mut().selection = None,
            InputIntent::SelectTower(slot) => {
                if let Some(team) = self.session.team() {
                    select_tower(self.session.mirror_mut().state_mut(), slot, team);
                }
            }
            InputIntent::PlaceAt { x, y } => {
                let player_index = self.session.player_index();
                let request =
                    placement_request(self.session.mirror_mut().state_mut(), player_index, x, y);
                if let Some(packet) = request {
                    info!("Requesting tower {} at ({}, {})", packet.tower_type_index, x, y);
                    self.send(&packet).await;
                }
            }
        }
        true
    }

    fn present(&mut self) {
        self.presenter.status(self.session.status_text());
        for cue in self.session.drain_cues() {
            self.presenter.cue(cue);
        }

        if matches!(
            self.session.state(),
            ClientState::WaitingForStart | ClientState::Running | ClientState::GameOver
        ) {
            let mirror = self.session.mirror();
            let state = mirror.state();
            self.presenter
                .frame(state, mirror.rotations(), state.selection);
        }

        if !self.game_over_shown {
            if let Some(message) = self.session.game_over_message() {
                self.presenter.game_over(message);
                self.game_over_shown = true;
            }
        }
    }

    /// One pass of the client loop: receive, act, keep alive, present.
    /// Returns Ok(false) when the player quit.
    pub async fn frame(&mut self, now: Instant) -> io::Result<bool> {
        self.drain_socket()?;

        if !self.apply_input().await {
            return Ok(false);
        }

        if let Some(packet) = self.session.due_packet(now) {
            self.send(&packet).await;
        }

        self.present();
        Ok(true)
    }

    /// Runs frames until the player quits or the session ends.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut frame_interval = interval(self.frame_interval);
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            frame_interval.tick().await;

            if !self.frame(Instant::now()).await? {
                info!("Quitting");
                break;
            }

            if self.session.is_finished() {
                info!("Session ended: {}", self.session.status_text());
                break;
            }
        }

        Ok(())
    }
}
