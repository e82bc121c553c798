use chrono::{DateTime, Utc};

/// Encoded assertion together with the instant it stops being accepted.
pub struct SignedJwt {
    value: String,
    expires_at: DateTime<Utc>,
}

impl SignedJwt {
    pub(crate) fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn into_value(self) -> String {
        self.value
    }
}
