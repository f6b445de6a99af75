//! Hostname lookup used when no `hostname` attribute is configured.

use std::env;

/// Supplies the hostname reported with shipped records.
pub trait HostnameProvider: Send + Sync {
    fn hostname(&self) -> String;
}

/// Ambient lookup: the system hostname, then the `HOSTNAME` environment
/// variable, then `"unknown"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostname;

impl HostnameProvider for SystemHostname {
    fn hostname(&self) -> String {
        if let Some(name) = ::hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.is_empty())
        {
            return name;
        }

        match env::var("HOSTNAME") {
            Ok(name) if !name.is_empty() => name,
            _ => "unknown".to_string(),
        }
    }
}

/// Fixed hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHostname(pub String);

impl StaticHostname {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self(hostname.into())
    }
}

impl HostnameProvider for StaticHostname {
    fn hostname(&self) -> String {
        self.0.clone()
    }
}
