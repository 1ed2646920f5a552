/// Huddle API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Maximum number of messages retained in the history log. Unset means
    /// the log grows without bound for the process lifetime.
    pub history_capacity: Option<usize>,
    /// Capacity of each connection's outbound queue. A connection whose
    /// queue overflows is disconnected rather than sent a gapped stream.
    pub outbound_buffer: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            history_capacity: std::env::var("HISTORY_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok()),
            outbound_buffer: std::env::var("RELAY_OUTBOUND_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
        }
    }
}
