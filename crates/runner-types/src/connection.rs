use std::fmt;

use serde::{Deserialize, Serialize};

/// How to reach the remote target.
///
/// The engine never dials this itself; it is handed to the executor as-is.
/// `host`, `port`, and `user` identify the target and cannot change in place;
/// the remaining fields are credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_socket_path: Option<String>,
}

impl ConnectionInfo {
    /// Connection to `host` with every other field left to the executor's defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("agent_socket_path", &self.agent_socket_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let conn = ConnectionInfo {
            password: Some("hunter2".into()),
            private_key: Some("-----BEGIN KEY-----".into()),
            ..ConnectionInfo::new("10.0.0.1")
        };
        let rendered = format!("{conn:?}");
        assert!(rendered.contains("10.0.0.1"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("BEGIN KEY"));
    }
}
