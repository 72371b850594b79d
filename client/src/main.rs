use clap::Parser;
use client::input::{Controller, HELP};
use client::network::Client;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Player name, unique on the server
    #[arg(short = 'n', long)]
    name: String,

    /// Let the computer play this seat
    #[arg(short = 'c', long)]
    computer: bool,

    /// Seed for the computer player's random moves
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);

    let controller = if args.computer {
        info!("Computer player enabled");
        Controller::computer(args.seed)
    } else {
        println!("{}", HELP);
        Controller::Human
    };

    let mut client = Client::connect(&args.server, &args.name, controller).await?;
    client.run().await?;

    Ok(())
}
