use clap::Parser;
use tracing_subscriber::EnvFilter;
use waylay_interceptor::config::Config;

#[derive(Parser, Debug)]
#[command(name = "waylay")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    println!(
        "Waylay ready (replay timeout: {}s); attach a browser session to begin intercepting",
        config.replay.request_timeout_secs
    );
    tokio::signal::ctrl_c().await.ok();
    Ok(())
}
