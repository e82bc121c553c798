use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpConfig {
    pub(crate) timeout: Duration,
    pub(crate) conn_timeout: Duration,
    pub(crate) user_agent: String,
}

impl HttpConfig {
    pub fn new(timeout: Duration, conn_timeout: Duration, user_agent: String) -> Self {
        Self {
            timeout,
            conn_timeout,
            user_agent,
        }
    }
}
