use clap::Parser;

use crate::config::{AppConfig, StoreBackend};

#[derive(Debug, Parser)]
#[command(name = "client-portal-api")]
#[command(about = "HTTP gateway for the client portal")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Address to bind (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, value_parser = parse_backend, help = "Store backend: supabase or memory (overrides STORE_BACKEND)")]
    pub store: Option<StoreBackend>,

    #[arg(long, help = "YAML fixture seeding the memory store (overrides STORE_FIXTURE)")]
    pub fixture: Option<String>,
}

impl Cli {
    /// Layer the flags over an environment-derived configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(backend) = self.store {
            config.store.backend = backend;
        }
        if let Some(fixture) = &self.fixture {
            config.store.fixture_path = Some(fixture.clone());
        }
    }
}

fn parse_backend(s: &str) -> Result<StoreBackend, String> {
    s.parse()
}
