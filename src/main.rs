mod engine;

use clap::Parser;

use crate::engine::{use_command, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    use_command(Cli::parse()).await
}
