//! Basketball total-points prediction CLI
//!
//! Pulls ended games, builds rolling team features, trains a totals model and
//! predicts the combined score of a matchup.

use clap::{Parser, Subcommand};
use hoops::{Config, Result};

#[derive(Parser)]
#[command(name = "hoops")]
#[command(about = "Basketball total-points prediction from rolling team form", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "hoops.toml")]
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
    /// Build the rolling feature table from stored games
    Features {
        /// Rolling window size (games per team)
        #[arg(long)]
        window: Option<usize>,
        /// Minimum prior games required per team
        #[arg(long)]
        min_games: Option<usize>,
    },
    /// Train candidate models and keep the best on the most recent games
    Train {
        /// Fraction of most-recent rows held out for evaluation
        #[arg(long)]
        test_ratio: Option<f64>,
    },
    /// Predict the combined score of a matchup
    Predict {
        /// Home team name, as it appears in the feature table
        home: String,
        /// Away team name, as it appears in the feature table
        away: String,
        /// Path to a saved model (defaults to the best saved model)
        #[arg(long)]
        model: Option<String>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Fetch ended events and store normalized games
    Sync {
        /// Number of result pages to pull (about 50 events each)
        #[arg(long)]
        pages: Option<u32>,
        /// Use only cached pages (no network requests)
        #[arg(long)]
        offline: bool,
    },
    /// Show stored games and features
    Status,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
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
            DataCommands::Sync { pages, offline } => commands::data_sync(&config, pages, offline),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Features { window, min_games } => {
            commands::build_features(&config, window, min_games)
        }
        Commands::Train { test_ratio } => commands::train(&config, test_ratio),
        Commands::Predict {
            home,
            away,
            model,
            format,
        } => commands::predict(&config, &home, &away, model, format),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use hoops::data::table::{read_features, read_games, write_features, write_games};
    use hoops::data::{normalize_events, sort_games, EventsClient};
    use hoops::features::{build_rolling_features, RollingConfig};
    use hoops::predict::{format_prediction, Predictor};
    use hoops::training::Trainer;
    use hoops::HoopsError;
    use std::path::Path;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all(&config.data.raw_dir)?;
        std::fs::create_dir_all(&config.data.processed_dir)?;
        std::fs::create_dir_all(&config.data.models_dir)?;
        println!(
            "Created {}, {} and {} directories",
            config.data.raw_dir, config.data.processed_dir, config.data.models_dir
        );

        println!("\nNext steps:");
        println!("  1. Export BETS_API_TOKEN (or set api.token in {})", config_path);
        println!("  2. Run 'hoops data sync' to fetch ended games");
        println!("  3. Run 'hoops features' to build the feature table");
        println!("  4. Run 'hoops train' to train the model");
        println!("  5. Run 'hoops predict \"Home Team\" \"Away Team\"' to predict a total");

        Ok(())
    }

    pub fn data_sync(config: &Config, pages: Option<u32>, offline: bool) -> Result<()> {
        let pages = pages.unwrap_or(config.api.pages);
        let client = EventsClient::new(&config.api, config.api_token())?
            .with_cache(&config.data.raw_dir)
            .offline_only(offline);

        if offline {
            println!("Offline mode: using cached pages only");
        }
        println!("Pulling {} pages of ended events...", pages);

        let events = client.fetch_all(pages)?;
        println!("Fetched {} raw events", events.len());

        let games = sort_games(normalize_events(&events));
        let games_path = config.data.games_path();
        write_games(&games_path, &games)?;
        println!("Wrote games -> {} ({} rows)", games_path.display(), games.len());

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let games_path = config.data.games_path();
        let features_path = config.data.features_path();

        println!("Data Status");
        println!("───────────────────────────────");

        if games_path.exists() {
            let games = read_games(&games_path)?;
            let mut teams: Vec<&str> = games
                .iter()
                .flat_map(|g| [g.home_id.0.as_str(), g.away_id.0.as_str()])
                .collect();
            teams.sort_unstable();
            teams.dedup();

            println!("  Games:    {} ({})", games.len(), games_path.display());
            println!("  Teams:    {}", teams.len());
            let dates: Vec<_> = games.iter().filter_map(|g| g.date).collect();
            if let (Some(earliest), Some(latest)) = (dates.iter().min(), dates.iter().max()) {
                println!("  Range:    {} to {}", earliest, latest);
            }
        } else {
            println!("  Games:    none (run 'hoops data sync')");
        }

        if features_path.exists() {
            let rows = read_features(&features_path)?;
            println!("  Features: {} ({})", rows.len(), features_path.display());
        } else {
            println!("  Features: none (run 'hoops features')");
        }

        Ok(())
    }

    pub fn build_features(
        config: &Config,
        window: Option<usize>,
        min_games: Option<usize>,
    ) -> Result<()> {
        let rolling = RollingConfig::new(
            window.unwrap_or(config.features.window),
            min_games.unwrap_or(config.features.min_games),
        );
        rolling.validate()?;

        let games_path = config.data.games_path();
        if !games_path.exists() {
            return Err(HoopsError::Config(format!(
                "No games at {}. Run 'hoops data sync' first.",
                games_path.display()
            )));
        }

        // Stored games are already ordered; re-sorting is a no-op for them
        let games = sort_games(read_games(&games_path)?);
        println!("Loaded {} games", games.len());

        let rows = build_rolling_features(&games, rolling);
        let features_path = config.data.features_path();
        write_features(&features_path, &rows)?;
        println!("Wrote features -> {} ({} rows)", features_path.display(), rows.len());

        Ok(())
    }

    pub fn train(config: &Config, test_ratio: Option<f64>) -> Result<()> {
        let mut training = config.training.clone();
        if let Some(ratio) = test_ratio {
            training.test_ratio = ratio;
        }
        let trainer = Trainer::from_config(&training)?;

        let features_path = config.data.features_path();
        if !features_path.exists() {
            return Err(HoopsError::Config(format!(
                "No feature table at {}. Run 'hoops features' first.",
                features_path.display()
            )));
        }
        let rows = read_features(&features_path)?;
        println!("Loaded {} feature rows", rows.len());

        let report = trainer.train_and_save(&rows, Path::new(&config.data.models_dir))?;

        println!("\nEvaluation (most-recent holdout)");
        println!(
            "  {} training rows, {} holdout rows",
            report.train_rows, report.test_rows
        );
        for result in &report.results {
            println!("- {:13} | {}", result.method, result.metrics);
        }

        if let Some(path) = &report.saved_to {
            println!("\nSaved best model ({}) -> {}", report.best.method(), path.display());
        }

        Ok(())
    }

    pub fn predict(
        config: &Config,
        home: &str,
        away: &str,
        model: Option<String>,
        format: OutputFormat,
    ) -> Result<()> {
        let predictor = Predictor::load(
            &config.data.features_path(),
            Path::new(&config.data.models_dir),
            model.as_deref().map(Path::new),
        )?;
        let prediction = predictor.predict(home, away)?;

        match format {
            OutputFormat::Table => print!("{}", format_prediction(&prediction)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&prediction)?),
        }

        Ok(())
    }
}
