use std::net::{IpAddr, SocketAddr};

use anyhow::{Context as _, Result};
use lifeboard_core::repository::SqliteRepository;

use super::Context;
use crate::cli::ServeCommand;
use crate::config::ServerConfig;
use crate::server::{self, AppState};

fn bind_address(config: &ServerConfig, command: &ServeCommand) -> Result<SocketAddr> {
    let bind = command.bind.as_deref().unwrap_or(&config.bind);
    let ip: IpAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", bind))?;
    Ok(SocketAddr::new(ip, command.port.unwrap_or(config.port)))
}

pub async fn serve(repo: SqliteRepository, ctx: &Context, config: &ServerConfig, command: ServeCommand) -> Result<()> {
    let addr = bind_address(config, &command)?;
    let state = AppState::new(repo, ctx.timezone, ctx.owner.clone());
    println!("Lifeboard API listening on http://{}", addr);
    server::serve(state, addr).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let config = ServerConfig::default();
        let command = ServeCommand { bind: None, port: None };
        assert_eq!(bind_address(&config, &command).unwrap().to_string(), "127.0.0.1:3000");

        let command = ServeCommand { bind: Some("0.0.0.0".to_string()), port: Some(8080) };
        assert_eq!(bind_address(&config, &command).unwrap().to_string(), "0.0.0.0:8080");

        let command = ServeCommand { bind: Some("localhost:80".to_string()), port: None };
        assert!(bind_address(&config, &command).is_err());
    }
}
