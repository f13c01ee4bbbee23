//! Gridiron CLI
//!
//! Team-statistics features and matchup predictions from stored game results.

use clap::{Parser, Subcommand};
use gridiron::{Config, Result};

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "League game features and matchup predictions", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// List teams in the schedule
    Teams {
        /// Only teams scheduled in this season
        #[arg(long)]
        season: Option<i32>,
    },
    /// Build the per-game feature table
    Features {
        /// Only games from this season
        #[arg(long)]
        season: Option<i32>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Predict a matchup
    Predict {
        /// Home team
        home: String,
        /// Away team
        away: String,
        /// Use only this season's games
        #[arg(long)]
        season: Option<i32>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Import games from a JSON file
    Import {
        /// JSON array of games
        file: String,
    },
    /// Show database status
    Status,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Import { file } => commands::data_import(&config, &file),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Teams { season } => commands::teams(&config, season),
        Commands::Features { season, format } => commands::features(&config, season, format),
        Commands::Predict {
            home,
            away,
            season,
            format,
        } => commands::predict(&config, &home, &away, season, format),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use gridiron::data::{completed_matches, Database, DatasetSummary};
    use gridiron::features::{FeatureEngine, FeatureVector};
    use gridiron::model::LogisticModel;
    use gridiron::predict::{format_prediction, Predictor};
    use gridiron::RawMatch;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("models")?;
        println!("Created data/ and models/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'gridiron data import games.json' to load results");
        println!("  3. Run 'gridiron features --format csv' to export training rows");
        println!("  4. Run 'gridiron predict KC BUF' to make predictions");

        Ok(())
    }

    pub fn data_import(config: &Config, file: &str) -> Result<()> {
        let mut db = Database::open(&config.data.database_path)?;

        let text = std::fs::read_to_string(file)?;
        let raws: Vec<RawMatch> = serde_json::from_str(&text)?;
        println!("Read {} games from {}", raws.len(), file);

        let stored = db.upsert_games(&raws)?;
        let total = raws.len();
        let completed = completed_matches(raws);
        println!(
            "Stored {} of {} games ({} with final scores)",
            stored,
            total,
            completed.matches.len()
        );

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;
        let summary = DatasetSummary::from_matches(&db.get_completed_matches(None)?);

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:       {}", config.data.database_path);
        println!("  Teams:      {}", stats.team_count);
        println!("  Games:      {}", stats.game_count);
        println!("  Completed:  {}", stats.completed_count);
        if let (Some(first), Some(last)) = (stats.seasons.first(), stats.seasons.last()) {
            println!("  Seasons:    {} to {}", first, last);
        }
        if let Some((lo, hi)) = summary.week_range {
            println!("  Weeks:      {} to {}", lo, hi);
        }
        if summary.total_games > 0 {
            println!(
                "  Home wins:  {} of {} ({:.1}%)",
                summary.home_wins, summary.total_games, summary.home_win_pct
            );
        }

        Ok(())
    }

    pub fn teams(config: &Config, season: Option<i32>) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let teams = db.get_teams(season)?;

        if teams.is_empty() {
            println!("No teams found. Run 'gridiron data import' first.");
            return Ok(());
        }

        for team in &teams {
            println!("{}", team);
        }
        println!("\n{} teams", teams.len());

        Ok(())
    }

    pub fn features(config: &Config, season: Option<i32>, format: OutputFormat) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let matches = db.get_completed_matches(season)?;
        let engine = FeatureEngine::new(config.features);

        let table = match season {
            Some(s) => engine.build_season_feature_table(&matches, s)?,
            None => engine.build_feature_table(&matches)?,
        };

        match format {
            OutputFormat::Csv => table.write_csv(std::io::stdout().lock())?,
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
            OutputFormat::Table => {
                let summary = DatasetSummary::from_matches(&matches);
                println!("Feature Table");
                println!("───────────────────────────────");
                println!("  Games:           {}", table.len());
                println!("  Teams:           {}", summary.team_count);
                println!("  League average:  {:.2}", table.league_average);
                println!("  Home win rate:   {:.1}%", summary.home_win_pct);
                println!("  Form window:     {}", engine.config().recent_form_window);

                println!("\n  Column means:");
                let rows = table.feature_matrix();
                for (i, name) in FeatureVector::COLUMNS.iter().enumerate() {
                    let mean = rows.iter().map(|r| r[i]).sum::<f64>() / rows.len() as f64;
                    println!("    {:<30} {:>8.2}", name, mean);
                }
            }
        }

        Ok(())
    }

    pub fn predict(
        config: &Config,
        home: &str,
        away: &str,
        season: Option<i32>,
        format: OutputFormat,
    ) -> Result<()> {
        let model = LogisticModel::load(&config.model.model_path)?;
        let db = Database::open(&config.data.database_path)?;
        let predictor = Predictor::new(model, db, FeatureEngine::new(config.features));

        let pred = predictor.predict(home, away, season)?;
        for (team, stats) in [
            (&pred.home_team, &pred.home_stats),
            (&pred.away_team, &pred.away_stats),
        ] {
            if stats.fallback {
                log::info!("{} has no completed games in scope, using league average", team);
            }
        }

        match format {
            OutputFormat::Table => println!("{}", format_prediction(&pred)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pred)?),
            OutputFormat::Csv => {
                println!("home,away,predicted_winner,home_win_prob,away_win_prob,confidence");
                println!(
                    "{},{},{},{:.4},{:.4},{:?}",
                    pred.home_team,
                    pred.away_team,
                    pred.predicted_winner,
                    pred.home_win_probability,
                    pred.away_win_probability,
                    pred.confidence
                );
            }
        }

        Ok(())
    }
}
