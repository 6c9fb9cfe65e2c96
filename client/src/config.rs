use shared::SERVER_PORT;
use std::time::Duration;

/// Where to connect and how often to run a frame.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub frame_interval: Duration,
}

impl ClientConfig {
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: SERVER_PORT,
            frame_interval: Duration::from_millis(16),
        }
    }
}
