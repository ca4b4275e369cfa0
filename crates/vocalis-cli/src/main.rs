//! CLI entry point.
//!
//! Loads `.env`, initialises logging, composes the context and dispatches.
//! Errors already reported by a handler only set the exit code; anything
//! else is printed here.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use vocalis_cli::handlers::{export::ExportArgs, speak::SpeakArgs};
use vocalis_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::with_defaults()?
        .with_api_key(cli.api_key)
        .with_api_base_url(cli.api_base_url)
        .with_force_local(cli.local);
    let ctx = bootstrap(config).await?;

    match command {
        Commands::Voices => handlers::voices::execute(&ctx).await?,
        Commands::Speak {
            input,
            voice,
            music,
            music_volume,
        } => {
            let args = SpeakArgs {
                input,
                voice,
                music,
                music_volume,
            };
            handlers::speak::execute(&ctx, args).await?;
        }
        Commands::Export {
            input,
            voice,
            format,
            out,
            prefix,
        } => {
            let args = ExportArgs {
                input,
                voice,
                format,
                out,
                prefix,
            };
            handlers::export::execute(&ctx, args).await?;
        }
        Commands::Read { file } => handlers::read::execute(&ctx, &file).await?,
        Commands::Config { command } => handlers::config::execute(&ctx, command).await?,
    }

    ctx.flush_notifications();
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => match err.downcast_ref::<CliError>() {
            Some(cli_err) => cli_err.exit_code(),
            None => {
                eprintln!("Error: {err:#}");
                1
            }
        },
    };

    // Exit explicitly: a pending stdin read would otherwise block runtime shutdown.
    std::process::exit(code)
}
