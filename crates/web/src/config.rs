use std::{env, net::SocketAddr};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

pub struct WebConfig {
    pub bind_address: SocketAddr,
}

impl WebConfig {
    /// Reads `WEB_BIND_ADDRESS`, falling back to all interfaces on port 8080.
    pub fn from_env() -> Result<Self, String> {
        let bind_address = env::var("WEB_BIND_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_owned());
        Self::parse(&bind_address)
    }

    fn parse(bind_address: &str) -> Result<Self, String> {
        bind_address
            .parse()
            .map(|bind_address| Self { bind_address })
            .map_err(|why| format!("invalid bind address '{}': {}", bind_address, why))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_address_parses() {
        let config = WebConfig::parse(DEFAULT_BIND_ADDRESS).unwrap();
        assert_eq!(config.bind_address.port(), 8080);
    }

    #[test]
    fn invalid_address_is_reported() {
        let error = WebConfig::parse("localhost").err().unwrap();
        assert!(error.contains("localhost"));
    }
}
