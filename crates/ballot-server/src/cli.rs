use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ballot-server", version, about = "Self-hosted polling server")]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "ballot.toml")]
    pub config: String,

    /// Override the bind address from the config file
    #[arg(long)]
    pub bind: Option<String>,
}
