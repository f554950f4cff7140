//! Command-line configuration for pulsar-dx

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for pulsar-dx
#[derive(Parser, Debug, Clone)]
#[command(name = "pulsar-dx")]
#[command(about = "Deterministic medical scan diagnosis service")]
#[command(version)]
pub struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "PULSAR_HOST")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "5055", env = "PULSAR_PORT")]
    pub port: u16,

    /// Folder holding the diagnosis database
    ///
    /// `PULSAR_ROOT_FOLDER` is read by the root folder resolver, not here.
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    pub request_timeout_secs: u64,

    /// Largest accepted upload, in MiB
    #[arg(long, default_value = "20")]
    pub max_upload_mb: usize,
}

impl Args {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_upload_bytes: self.max_upload_mb.saturating_mul(1024 * 1024),
        }
    }
}

/// Limits applied by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}
