//! LCR CLI - Lower Colorado River reach loss apportionment.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "lcr-cli",
    version,
    about = "Lower Colorado River water accounting and loss apportionment"
)]
struct Cli {
    #[command(subcommand)]
    command: lcr_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("lcr-cli {}", env!("CARGO_PKG_VERSION"));
    lcr_cmd::run(cli.command)
}
