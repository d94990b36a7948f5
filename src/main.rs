// Quadbot - Operator console for a four-limbed crawling robot
use clap::Parser;
use quadbot::cli::{execute_command, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(e) = execute_command(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
