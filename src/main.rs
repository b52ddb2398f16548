use clap::Parser;

use lostfound::cli::commands::{config, schemes, send, serve};
use lostfound::cli::{Cli, Commands, ConfigAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            config,
            bind,
            port,
            debug,
        }) => {
            serve::handle_serve(serve::ServeOptions {
                config,
                bind,
                port,
                debug,
            })
            .await
        }
        Some(Commands::Send {
            descriptor,
            title,
            body,
            timeout,
        }) => send::handle_send(&descriptor, &title, &body, timeout).await,
        Some(Commands::Schemes) => schemes::handle_schemes().await,
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { force, path } => config::handle_init(force, path).await,
            ConfigAction::Show { json } => config::handle_show(json).await,
            ConfigAction::Validate { path } => config::handle_validate(path).await,
        },
        None => {
            println!("lostfound - lost and found notification service");
            println!("Use --help to see available commands");
            Ok(())
        }
    }
}
