use std::sync::Arc;

use clap::Parser;
use contentdesk::cli::{Args, init_logging, open_store, validate_api_origin};
use contentdesk::{ConsoleConfig, commands, connect};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(api_origin) = validate_api_origin(&args.api_origin) else {
        std::process::exit(1);
    };

    let Some(store) = open_store(&args.database).await else {
        std::process::exit(1);
    };

    let console = connect(ConsoleConfig {
        api_origin,
        store: Arc::new(store),
    });

    let code = commands::run(&console, args.command).await;

    console.guard.shutdown();
    std::process::exit(code);
}
