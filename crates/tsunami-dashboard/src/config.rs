//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_MODEL_PATH: &str = "models/tsunami_model.json";

/// Earthquake & tsunami risk prediction dashboard
#[derive(Parser, Debug)]
#[command(name = "tsunami-dashboard")]
#[command(about = "Serve the tsunami risk prediction dashboard", version)]
pub struct Args {
    /// Path to the trained classifier artifact (JSON)
    #[arg(long, env = "TSUNAMI_MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Address to bind
    #[arg(long, env = "TSUNAMI_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "TSUNAMI_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl From<&Args> for DashboardConfig {
    fn from(args: &Args) -> Self {
        Self { host: args.host.clone(), port: args.port, model_path: args.model.clone() }
    }
}

impl DashboardConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
