use clap::Parser;

/// Jellyfin monitoring check
#[derive(Parser, Debug, Clone)]
#[command(name = "check_jellyfin", version, about, long_about = None)]
pub struct Args {
    /// Hostname to connect to
    #[arg(short = 'H', long)]
    pub hostname: Option<String>,

    /// Jellyfin port
    #[arg(short, long, default_value_t = 80)]
    pub port: u16,

    /// Use SSL (1 to enable)
    #[arg(short = 'S', long = "use-ssl", default_value_t = 0)]
    pub use_ssl: u8,

    /// Jellyfin API key
    #[arg(short = 'k', long = "api-key")]
    pub api_key: Option<String>,
}
