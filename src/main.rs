use clap::{Parser, Subcommand};
use lexpand::server::{self, AppState};
use lexpand_core::{config::Settings, Engine, Lexicon};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lexpand", about = "Lexicon-based query expansion")]
struct Cli {
    /// Config file to use instead of ~/.config/lexpand/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Runtime artifact to load, overriding `[lexicon] path`.
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expand a query and print the result.
    Rewrite {
        /// Query text; multiple words are joined with spaces.
        #[arg(required = true)]
        query: Vec<String>,
        /// Caller identifier, hashed before it reaches telemetry.
        #[arg(long)]
        caller: Option<String>,
        /// Print the full outcome as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Compile a YAML ontology into a runtime artifact.
    Compile { source: PathBuf, output: PathBuf },
    /// List aliases starting with a prefix.
    Suggest {
        prefix: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Serve the HTTP API.
    Serve {
        /// Address to bind, overriding `[server] bind`.
        #[arg(long)]
        bind: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(path) = cli.lexicon {
        settings.lexicon.path = path;
    }

    match cli.command {
        Command::Compile { source, output } => {
            let summary = lexpand_compiler::compile_file(&source, &output)?;
            println!(
                "compiled {} entities (version {}, {} bytes) into {}",
                summary.entity_count,
                summary.version,
                summary.bytes,
                summary.output.display()
            );
        }
        Command::Suggest { prefix, limit } => {
            let lexicon = Lexicon::from_path(&settings.lexicon.path)?;
            for alias in lexicon.suggest(&prefix, limit) {
                println!("{alias}");
            }
        }
        Command::Rewrite {
            query,
            caller,
            json,
        } => {
            let engine = Engine::from_settings(&settings)?;
            let query = query.join(" ");
            let outcome = match caller.as_deref() {
                Some(caller) => engine.rewrite_as(caller, &query),
                None => engine.rewrite(&query),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.result.expanded_query);
                println!(
                    "matched: [{}]  terms: {}  time: {:.2}ms",
                    outcome.result.matched_entities.join(", "),
                    outcome.result.expansion_count,
                    outcome.elapsed.as_secs_f64() * 1000.0
                );
                if !outcome.result.ambiguous_dropped.is_empty() {
                    println!("ambiguous: [{}]", outcome.result.ambiguous_dropped.join(", "));
                }
            }
        }
        Command::Serve { bind } => {
            let engine = Engine::from_settings(&settings)?;
            let addr = bind.unwrap_or_else(|| settings.server.bind.clone());
            let state = Arc::new(AppState {
                engine,
                lexicon_path: settings.lexicon.path.clone(),
            });
            tokio::runtime::Runtime::new()?.block_on(server::serve(state, &addr))?;
        }
    }

    Ok(())
}
