use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lineup_bro::config::{self, Config};
use lineup_bro::enrich::enrich_roster;
use lineup_bro::identity::{IdentityResolver, MatchHints, NameIndex};
use lineup_bro::lineup::{assign_pool, SlotRequirement};
use lineup_bro::output;
use lineup_bro::provider::types::Position;
use lineup_bro::provider::{DataProvider, ProviderError, SleeperProvider, SnapshotProvider};
use lineup_bro::scoring::{compare_for_flex, explain_comparison, normalize, score_matchup};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_PROVIDER: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Fill the starting lineup from the roster (default if no subcommand)
    Lineup,
    /// List every rostered player grouped by position
    Players,
    /// Resolve a player name against the provider B pool
    Resolve {
        name: String,
        /// Position hint (QB, RB, WR, TE, K, DEF)
        #[arg(long)]
        position: Option<String>,
        /// Team hint (e.g. KC)
        #[arg(long)]
        team: Option<String>,
    },
    /// Score a matchup against an opponent defense
    Matchup {
        /// Opponent team, "@" and "vs" prefixes are accepted
        opponent: String,
        position: String,
    },
    /// Compare two players for the FLEX slot
    Compare {
        proj_a: f64,
        pos_a: String,
        proj_b: f64,
        pos_b: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
    Tsv,
}

#[derive(Parser, Debug)]
#[command(name = "lineup-bro")]
#[command(about = "Fantasy football start/sit decisions from two data providers", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/lineup-bro/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot directory (overrides provider.snapshot_dir)
    #[arg(long, global = true)]
    snapshot_dir: Option<PathBuf>,

    /// Fetch pool, projections and trending from Sleeper instead of the snapshot
    #[arg(long, global = true)]
    sleeper: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_position(raw: &str) -> anyhow::Result<Position> {
    let position = Position::parse(raw);
    if !position.is_playable() {
        anyhow::bail!("Unknown position '{}'. Expected QB, RB, WR, TE, K or DEF", raw);
    }
    Ok(position)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let command = cli.command.clone().unwrap_or(Commands::Lineup);
    let start_time = Instant::now();

    // Load config
    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let result = match command {
        Commands::Compare { proj_a, pos_a, proj_b, pos_b } => {
            run_compare(proj_a, &pos_a, proj_b, &pos_b, cli.format)
        }
        command => dispatch(&cli, command, &config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        let code = if e.downcast_ref::<ProviderError>().is_some() {
            EXIT_PROVIDER
        } else {
            EXIT_FAILURE
        };
        std::process::exit(code);
    }

    info!("Done in {:?}", start_time.elapsed());
    std::process::exit(EXIT_SUCCESS);
}

/// Build the provider the flags ask for and run the command against it.
async fn dispatch(cli: &Cli, command: Commands, config: &Config) -> anyhow::Result<()> {
    let snapshot_dir = match &cli.snapshot_dir {
        Some(dir) => dir.clone(),
        None => config::snapshot_dir(config)?,
    };
    info!("Snapshot directory: {}", snapshot_dir.display());

    if cli.sleeper {
        let provider = SleeperProvider::new(
            config.provider.sleeper_base_url(),
            config.provider.timeout()?,
            snapshot_dir,
        )?;
        run(&provider, command, config, cli.format).await
    } else {
        let provider = SnapshotProvider::new(snapshot_dir);
        run(&provider, command, config, cli.format).await
    }
}

async fn run<P: DataProvider>(
    provider: &P,
    command: Commands,
    config: &Config,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let use_colors = output::should_use_colors();

    match command {
        Commands::Lineup => {
            let settings = config.enrich_settings()?;
            let pool = enrich_roster(provider, &settings).await?;
            let slots = SlotRequirement::from_config(&config.slots);
            let lineup = assign_pool(&pool, &slots);

            match format {
                OutputFormat::Json => println!("{}", output::format_json(&lineup)?),
                OutputFormat::Tsv => {
                    let starters: Vec<_> = lineup.starters.iter().map(|f| f.player).collect();
                    println!("{}", output::format_tsv(&starters));
                }
                OutputFormat::Table => {
                    println!("{}", output::format_lineup(&lineup, use_colors));
                    println!();
                    println!("{}", output::format_quality(&lineup.quality, use_colors));
                }
            }
        }
        Commands::Players => {
            let settings = config.enrich_settings()?;
            let pool = enrich_roster(provider, &settings).await?;
            let groups = pool.by_position();

            match format {
                OutputFormat::Json => println!("{}", output::format_json(&pool.players)?),
                OutputFormat::Tsv => {
                    let players: Vec<_> = groups.values().flatten().copied().collect();
                    println!("{}", output::format_tsv(&players));
                }
                OutputFormat::Table => {
                    println!("{}", output::format_player_groups(&groups, use_colors));
                    if tracing::enabled!(tracing::Level::DEBUG) {
                        for player in groups.values().flatten() {
                            eprintln!("{}", player.name());
                            eprintln!("{}", output::format_breakdown(&player.decision));
                        }
                    }
                    println!();
                    println!("{}", output::format_quality(&pool.quality, use_colors));
                }
            }
        }
        Commands::Resolve { name, position, team } => {
            let position = position.as_deref().map(parse_position).transpose()?;
            let pool = provider.player_pool().await?;
            let index = Arc::new(NameIndex::build(&pool));
            let resolver = IdentityResolver::new(index)
                .with_threshold(config.matching.approximate_threshold());
            let identity = resolver.resolve(&name, &MatchHints::new(position, team.as_deref()));

            match format {
                OutputFormat::Json => {
                    let value = serde_json::json!({
                        "query": name,
                        "identity": identity,
                        "confidence": identity.confidence(),
                    });
                    println!("{}", output::format_json(&value)?);
                }
                OutputFormat::Table | OutputFormat::Tsv => {
                    println!("{}", output::format_identity(&name, &identity, use_colors));
                }
            }
        }
        Commands::Matchup { opponent, position } => {
            let position = parse_position(&position)?;
            let table = provider
                .defense_table()
                .await
                .context("Defensive rankings unavailable")?;
            let matchup = score_matchup(&table, &opponent, position);

            match format {
                OutputFormat::Json => println!("{}", output::format_json(&matchup)?),
                OutputFormat::Table | OutputFormat::Tsv => {
                    println!("{}", output::format_matchup(&matchup, position, use_colors));
                }
            }
        }
        Commands::Compare { proj_a, pos_a, proj_b, pos_b } => {
            return run_compare(proj_a, &pos_a, proj_b, &pos_b, format);
        }
    }
    Ok(())
}

fn run_compare(
    proj_a: f64,
    pos_a: &str,
    proj_b: f64,
    pos_b: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let pos_a = parse_position(pos_a)?;
    let pos_b = parse_position(pos_b)?;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "pick": compare_for_flex((proj_a, pos_a), (proj_b, pos_b)),
                "a": normalize(proj_a, pos_a),
                "b": normalize(proj_b, pos_b),
            });
            println!("{}", output::format_json(&value)?);
        }
        OutputFormat::Table | OutputFormat::Tsv => {
            print!(
                "{}",
                explain_comparison((proj_a, pos_a, "Player A"), (proj_b, pos_b, "Player B"))
            );
        }
    }
    Ok(())
}
