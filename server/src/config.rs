use shared::{CLIENT_TIMEOUT_MS, MAX_PLAYERS, SERVER_PORT, TICK_RATE};
use std::time::Duration;

/// Runtime settings for one server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tick_rate: u32,
    /// Players needed before a match starts.
    pub max_players: usize,
    /// Silence after which a client is reported stale.
    pub client_timeout: Duration,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: SERVER_PORT,
            tick_rate: TICK_RATE,
            max_players: MAX_PLAYERS,
            client_timeout: Duration::from_millis(CLIENT_TIMEOUT_MS),
        }
    }
}
