use clap::Parser;

use crate::version::VERSION;

#[derive(Debug, Parser)]
#[command(
    name = "antbox-cli",
    version = VERSION,
    about = "Interactive shell for browsing and managing an Antbox server"
)]
pub struct Cli {
    /// Base URL of the Antbox server, e.g. http://localhost:7180
    pub server_url: String,
    /// Authenticate every request with this API key
    #[arg(long = "api-key", conflicts_with_all = ["root_passwd", "jwt"])]
    pub api_key: Option<String>,
    /// Log in as root with this password before starting
    #[arg(long = "root-passwd", conflicts_with = "jwt")]
    pub root_passwd: Option<String>,
    /// Authenticate every request with an existing JWT
    #[arg(long)]
    pub jwt: Option<String>,
    /// Log requests and state changes to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
