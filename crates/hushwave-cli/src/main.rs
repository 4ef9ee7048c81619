//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use hushwave_cli::handlers::speak::SpeakArgs;
use hushwave_cli::{Cli, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Script { prefs, variation } => {
            handlers::script::execute(&prefs, variation.as_deref())?;
        }
        Commands::Speak {
            prefs,
            text,
            out,
            play,
        } => {
            let ctx = bootstrap(cli.models_dir)?;
            let args = SpeakArgs {
                prefs,
                text,
                out,
                play,
            };
            handlers::speak::execute(&ctx, args).await?;
        }
        Commands::Ambient {
            sounds,
            seconds,
            volume,
        } => {
            let ctx = bootstrap(cli.models_dir)?;
            handlers::ambient::execute(&ctx, sounds, seconds, volume).await?;
        }
        Commands::Render {
            sound,
            seconds,
            out,
        } => {
            let ctx = bootstrap(cli.models_dir)?;
            handlers::render::execute(&ctx, &sound, seconds, &out)?;
        }
        Commands::Voices { json } => {
            let ctx = bootstrap(cli.models_dir)?;
            handlers::voices::execute(&ctx, json)?;
        }
        Commands::Devices => {
            handlers::devices::execute()?;
        }
        Commands::Paths => {
            let ctx = bootstrap(cli.models_dir)?;
            handlers::paths::execute(&ctx)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
