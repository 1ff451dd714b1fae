//! Startup configuration assembled once in `main` and handed to the
//! bootstrap sequence by reference.

use crate::render::RenderDefaults;
use crate::system::identity::ProcessIdentity;

/// Environment variable overriding the remote-control port
pub const RPC_PORT_ENV: &str = "AVOGADRO_RPC_PORT";
pub const DEFAULT_RPC_PORT: u16 = 6510;

/// Optional subsystems, lifted from cargo features into runtime flags so the
/// same startup logic runs under every combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildFeatures {
    pub test_playback: bool,
    pub remote_listener: bool,
}

impl BuildFeatures {
    /// Features this binary was compiled with
    pub fn compiled() -> Self {
        Self {
            test_playback: cfg!(feature = "test-playback"),
            remote_listener: cfg!(feature = "rpc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

impl RpcConfig {
    /// Build from an optional port override, falling back to the default port
    pub fn from_port_override(value: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = value {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(e) => log::warn!("Ignoring {}={:?}: {}, using port {}", RPC_PORT_ENV, raw, e, DEFAULT_RPC_PORT),
            }
        }
        config
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub identity: ProcessIdentity,
    pub render_defaults: RenderDefaults,
    pub features: BuildFeatures,
    pub rpc: RpcConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port_override = std::env::var(RPC_PORT_ENV).ok();
        Self {
            identity: ProcessIdentity::default(),
            render_defaults: RenderDefaults::default(),
            features: BuildFeatures::compiled(),
            rpc: RpcConfig::from_port_override(port_override.as_deref()),
        }
    }
}
