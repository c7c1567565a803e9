//! Racecard CLI - extract entrants from race programs and rank them

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use racecard::config::{Config, ScoreWeights, ScoringProfile};
use racecard::error::{validate_distance, validate_field_size};
use racecard::{
    save_csv, Entrant, Extractor, ManualEntry, Prediction, PredictionSession, RaceContext, Scorer,
    TextDecoder, TrackCondition,
};

#[derive(Parser)]
#[command(name = "racecard")]
#[command(author, version, about = "Race program extraction and horse ranking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// JSON file overriding the default heuristic tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entrants from program text
    Extract {
        #[command(flatten)]
        source: Source,

        /// Print entrants as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract, score and rank a race
    Predict {
        #[command(flatten)]
        source: Source,

        /// Race distance in furlongs
        #[arg(long, default_value = "6.0")]
        distance: f64,

        /// Track condition (fast, good, sloppy, muddy, turf-firm, turf-good)
        #[arg(long, default_value = "fast")]
        track: TrackCondition,

        /// Field size override (defaults to the number of entrants)
        #[arg(long)]
        field_size: Option<usize>,

        /// Weight profile; the configured weights are used when omitted
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,

        /// Number of predictions to show
        #[arg(long, default_value = "10")]
        top: usize,

        /// Export all predictions to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Program text file (UTF-8 or Latin-1)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Program text given inline
    #[arg(long)]
    text: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Weighted,
    Simple,
}

impl From<ProfileArg> for ScoringProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Weighted => ScoringProfile::Weighted,
            ProfileArg::Simple => ScoringProfile::Simple,
        }
    }
}

/// Decoder, extractor and scorer tables built from one configuration
struct Toolkit {
    config: Config,
    decoder: TextDecoder,
    extractor: Extractor,
}

impl Toolkit {
    fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?,
            None => Config::default(),
        };
        let decoder = TextDecoder::from_config(&config.decode)
            .context("Invalid encoding list in config")?;
        let extractor = Extractor::new(config.extractor.clone());

        Ok(Self {
            config,
            decoder,
            extractor,
        })
    }

    fn scorer(&self, profile: Option<ScoringProfile>) -> Scorer {
        let mut config = self.config.scorer.clone();
        if let Some(profile) = profile {
            config.weights = ScoreWeights::for_profile(profile);
        }
        Scorer::new(config)
    }

    fn read_text(&self, source: &Source) -> Result<String> {
        if let Some(text) = &source.text {
            return Ok(text.clone());
        }
        match &source.input {
            Some(path) => self.read_file(path),
            None => bail!("Either --input or --text is required"),
        }
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        let decoded = self
            .decoder
            .decode(&bytes)
            .with_context(|| format!("Failed to decode {:?}", path))?;
        Ok(decoded.text)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let toolkit = Toolkit::load(cli.config.as_deref())?;

    if cli.interactive {
        println!("{}", "Racecard CLI".cyan().bold());
        println!();
        run_interactive(&toolkit)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Extract { source, json } => {
                run_extract(&toolkit, &source, json)?;
            }
            Commands::Predict {
                source,
                distance,
                track,
                field_size,
                profile,
                top,
                csv,
            } => {
                validate_distance(distance)?;
                if let Some(size) = field_size {
                    validate_field_size(size, toolkit.config.extractor.max_entrants)?;
                }
                let ctx = RaceContext {
                    distance_furlongs: distance,
                    track,
                    field_size,
                };
                run_predict(
                    &toolkit,
                    &source,
                    &ctx,
                    profile.map(Into::into),
                    top,
                    csv.as_deref(),
                )?;
            }
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn run_extract(toolkit: &Toolkit, source: &Source, json: bool) -> Result<()> {
    let text = toolkit.read_text(source)?;
    let extraction = toolkit.extractor.extract_with_report(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&extraction.entrants)?);
        return Ok(());
    }

    if extraction.is_empty() {
        println!("{}", "No entrants found.".red());
        return Ok(());
    }

    println!(
        "{}: {} entrants ({} strategy, {} lines skipped)",
        "Extracted".green(),
        extraction.entrants.len(),
        extraction.strategy.unwrap_or("-"),
        extraction.skipped_lines
    );
    println!();
    print_entrants(&extraction.entrants);
    Ok(())
}

fn run_predict(
    toolkit: &Toolkit,
    source: &Source,
    ctx: &RaceContext,
    profile: Option<ScoringProfile>,
    top: usize,
    csv: Option<&Path>,
) -> Result<()> {
    let text = toolkit.read_text(source)?;
    let entrants = toolkit.extractor.extract(&text);

    if entrants.is_empty() {
        println!("{}", "No entrants found.".red());
        return Ok(());
    }

    println!(
        "{}: {} runners, {} furlongs, {}",
        "Predicting".green(),
        entrants.len(),
        ctx.distance_furlongs,
        ctx.track
    );
    println!();

    let predictions = toolkit.scorer(profile).predict(&entrants, ctx);
    print_predictions(&predictions, top);

    if let Some(path) = csv {
        save_csv(path, &predictions)
            .with_context(|| format!("Failed to write CSV to {:?}", path))?;
        println!();
        println!("{}: {:?}", "Saved".green(), path);
    }

    Ok(())
}

fn print_entrants(entrants: &[Entrant]) {
    println!("{}", "Entrants:".yellow().bold());
    println!("{:>4} {:<22} {:>6} {:>8}", "Post", "Horse", "Weight", "Form");
    println!("{}", "-".repeat(44));
    for entrant in entrants {
        println!(
            "{:>4} {:<22} {:>6} {:>8}",
            entrant.post_position,
            truncate_name(&entrant.name, 22),
            entrant.weight,
            entrant.form_string()
        );
    }
}

fn print_predictions(predictions: &[Prediction], top: usize) {
    println!("{}", "Predictions:".yellow().bold());
    println!(
        "{:>4} {:<22} {:>4} {:>7} {:>6} {:>6} {:>8}  {}",
        "Rank", "Horse", "Post", "Win%", "Score", "Weight", "Form", "Analysis"
    );
    println!("{}", "-".repeat(90));

    for p in predictions.iter().take(top) {
        let win = format!("{:>6.1}%", p.win_probability);
        let win = if p.rank == 1 { win.green().bold() } else { win.normal() };
        println!(
            "{:>4} {:<22} {:>4} {} {:>6.1} {:>6} {:>8}  {}",
            p.rank,
            truncate_name(&p.name, 22),
            p.post_position,
            win,
            p.score,
            p.weight,
            p.form_string(),
            p.analysis.dimmed()
        );
    }

    if predictions.len() > top {
        println!("{}", format!("... {} more", predictions.len() - top).dimmed());
    }
}

fn run_interactive(toolkit: &Toolkit) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    let theme = ColorfulTheme::default();
    let mut session = PredictionSession::for_config(toolkit.extractor.config());

    loop {
        let options = vec![
            "Add horse",
            "Load program file",
            "Show entries",
            "Predict",
            "Clear entries",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let entry = prompt_manual_entry(&theme)?;
                match session.add_manual(entry) {
                    Ok(entrant) => println!("{}: {}", "Added".green(), entrant.name),
                    Err(e) => println!("{}: {}", "Error".red(), e),
                }
            }
            1 => {
                let path: String = Input::with_theme(&theme)
                    .with_prompt("Program file")
                    .interact_text()?;
                match toolkit.read_file(Path::new(path.trim())) {
                    Ok(text) => {
                        let loaded = session.load_text(&toolkit.extractor, &text);
                        if loaded == 0 {
                            println!("{}", "No entrants found; add horses manually.".yellow());
                        } else {
                            println!("{}: {} entrants", "Loaded".green(), loaded);
                        }
                    }
                    Err(e) => println!("{}: {:#}", "Error".red(), e),
                }
            }
            2 => {
                if session.is_empty() {
                    println!("{}", "No entries yet.".yellow());
                } else {
                    print_entrants(session.entrants());
                }
            }
            3 => {
                if session.len() < 2 {
                    println!("{}", "Need at least 2 horses to predict.".yellow());
                } else {
                    let ctx = prompt_race_context(&theme)?;
                    let predictions =
                        session.predict(&toolkit.scorer(None), &ctx);
                    println!();
                    print_predictions(&predictions, 5);
                }
            }
            4 => {
                session.clear();
                println!("{}", "Entries cleared.".green());
            }
            5 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
        println!();
    }

    Ok(())
}

fn prompt_manual_entry(theme: &ColorfulTheme) -> Result<ManualEntry> {
    let name: String = Input::with_theme(theme)
        .with_prompt("Horse name")
        .interact_text()?;
    let speed_figure: f64 = Input::with_theme(theme)
        .with_prompt("Speed figure (50-120)")
        .default(80.0)
        .interact_text()?;
    let form_rating: u8 = Input::with_theme(theme)
        .with_prompt("Form rating (1-10)")
        .default(5)
        .interact_text()?;
    let post_position: u32 = Input::with_theme(theme)
        .with_prompt("Post position (1-20)")
        .interact_text()?;

    Ok(ManualEntry {
        name,
        speed_figure,
        form_rating,
        post_position,
    })
}

fn prompt_race_context(theme: &ColorfulTheme) -> Result<RaceContext> {
    let distance_furlongs: f64 = Input::with_theme(theme)
        .with_prompt("Distance (furlongs)")
        .default(6.0)
        .validate_with(check_distance)
        .interact_text()?;

    let tracks: Vec<&str> = TrackCondition::ALL.iter().map(|t| t.as_str()).collect();
    let track = Select::with_theme(theme)
        .with_prompt("Track condition")
        .items(&tracks)
        .default(0)
        .interact()?;

    Ok(RaceContext {
        distance_furlongs,
        track: TrackCondition::ALL[track],
        field_size: None,
    })
}

/// Prompt validator: rejected input is asked for again
fn check_distance(furlongs: &f64) -> Result<(), String> {
    validate_distance(*furlongs).map_err(|e| e.to_string())
}

/// Truncate name to fit display width
fn truncate_name(name: &str, max_len: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_len {
        name.to_string()
    } else {
        chars[..max_len - 1].iter().collect::<String>() + "…"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_distance() {
        assert!(check_distance(&6.0).is_ok());
        let err = check_distance(&0.0).unwrap_err();
        assert!(err.contains("Distance must be a positive number"));
        assert!(check_distance(&f64::NAN).is_err());
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Thunderbolt", 22), "Thunderbolt");
        assert_eq!(truncate_name("EL GRAN CAPITAN", 8), "EL GRAN…");
    }
}
