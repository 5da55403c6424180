use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = smartsave::api::Cli::parse();
    if let Err(e) = smartsave::api::run_cli(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
