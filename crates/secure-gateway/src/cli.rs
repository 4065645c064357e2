use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "secure-gateway",
    version,
    about = "Prompt-injection and PII firewall in front of an LLM backend"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yaml", env = "GATEWAY_CONFIG")]
    pub config: PathBuf,

    /// Listen address (overrides config file setting)
    #[arg(long)]
    pub listen: Option<String>,

    /// Signature/PII extensions file (overrides config file setting)
    #[arg(long)]
    pub extensions: Option<PathBuf>,

    /// Audit log path (overrides config file setting)
    #[arg(long)]
    pub audit_log: Option<PathBuf>,
}
