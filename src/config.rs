//! Server configuration
//!
//! Every option can be given as a flag or through its environment variable.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::reading::IngestMode;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 2029;

#[derive(Debug, Clone, Parser)]
#[command(name = "thermocast", version, about = "Live temperature readings over Server-Sent Events")]
pub struct Config {
    /// Port to listen on (all interfaces)
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Accepted ingest encoding and stream payload format
    #[arg(long, env = "INGEST_MODE", value_enum, default_value_t = IngestMode::Json)]
    pub mode: IngestMode,

    /// Directory served for static assets
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Document served at `/`, relative to the static directory
    #[arg(long, env = "INDEX_FILE", default_value = "index.html")]
    pub index_file: PathBuf,
}

impl Config {
    /// Config for the given static directory with every other option at its default.
    pub fn with_static_dir(static_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: IngestMode::default(),
            static_dir: static_dir.into(),
            index_file: PathBuf::from("index.html"),
        }
    }

    /// Set the ingest mode
    pub fn mode(mut self, mode: IngestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join(&self.index_file)
    }
}
