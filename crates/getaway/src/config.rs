//! Command-line configuration for the server binary.

use clap::Parser;
use getaway_room::LobbyConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "getaway-server")]
#[command(about = "WebSocket server for the Getaway card game")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// Smallest room a player may create (3-6)
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(3..=6))]
    pub min_players: u8,

    /// Largest room a player may create (3-6)
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(3..=6))]
    pub max_players: u8,
}

impl ServerConfig {
    /// `bind:port`, ready for the transport.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn lobby_config(&self) -> LobbyConfig {
        LobbyConfig {
            min_players: self.min_players,
            max_players: self.max_players,
            ..LobbyConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::parse_from(["getaway-server"]);
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.lobby_config(), LobbyConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::parse_from([
            "getaway-server",
            "--bind",
            "127.0.0.1",
            "-p",
            "9000",
            "--max-players",
            "4",
        ]);
        assert_eq!(config.addr(), "127.0.0.1:9000");
        assert_eq!(config.lobby_config().max_players, 4);
    }

    #[test]
    fn test_player_bounds_outside_seat_limits_rejected() {
        for args in [["--min-players", "0"], ["--min-players", "1"], ["--max-players", "10"]] {
            let parsed = ServerConfig::try_parse_from(["getaway-server", args[0], args[1]]);
            assert!(parsed.is_err(), "{args:?} should be rejected");
        }
    }
}
