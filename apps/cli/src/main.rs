mod main_lib;

use clap::Parser;
use global_food::{Config, GlobalFood};
use main_lib::{init_tracing, load_credentials, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let credentials = load_credentials(args.credentials.as_deref())?;
    let config = Config::from_env();
    let client = GlobalFood::with_config(credentials, config).await;
    client.wait_for_handshakes().await;

    if args.states {
        println!("{}", serde_json::to_string_pretty(&client.provider_states())?);
        return Ok(());
    }

    let request = args.search_request();
    match client.search(request).await {
        Ok(result) => {
            tracing::info!("{}", result.summary());
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            for (kind, state) in client.provider_states() {
                tracing::warn!("{}: {}", kind, state);
            }
            Err(e.into())
        }
    }
}
