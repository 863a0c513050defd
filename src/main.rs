use clap::Parser;
use tracing_subscriber::EnvFilter;

use openclinic::cli::{Cli, Commands, ServeArgs};
use openclinic::config::ServerConfig;

fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

async fn serve(args: ServeArgs) -> std::process::ExitCode {
    init_tracing("info,tower_http=debug");
    let config = args.apply(ServerConfig::from_env());
    match openclinic::server::run(config).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::ExitCode::from(1)
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match cli.command {
        None => serve(ServeArgs::default()).await,
        Some(Commands::Serve(args)) => serve(args).await,
        _ => {
            init_tracing("warn");
            match openclinic::cli::run(cli).await {
                Ok(output) => {
                    println!("{output}");
                    std::process::ExitCode::SUCCESS
                }
                Err(err) => {
                    if let Some(lookup_err) = err.downcast_ref::<openclinic::error::OpenClinicError>()
                    {
                        eprintln!("Error: {lookup_err}");
                    } else {
                        eprintln!("Error: {err}");
                    }
                    std::process::ExitCode::from(1)
                }
            }
        }
    }
}
