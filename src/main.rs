use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use grant_scout::config::AppConfig;
use grant_scout::engine::{
    analyze, Application, BudgetRange, CategoryFocus, CategoryTaxonomy, CsvCatalogSource,
    DiscoveryEngine, DiscoveryResult, MatchScorer, Opportunity, OpportunitySource,
    PredictionConfig, Profile, SuccessPredictor,
};
use grant_scout::error::AppError;
use grant_scout::telemetry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "grant-scout",
    about = "Score grant opportunities against an operator profile and estimate application success",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a discovery pass over one or more CSV opportunity catalogs
    Discover(DiscoverArgs),
    /// Predict success for an application/opportunity pair
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// CSV catalog file acting as an opportunity source (repeatable)
    #[arg(long = "catalog", required = true)]
    catalogs: Vec<PathBuf>,
    /// Operator profile as JSON (defaults to the stock documentary profile)
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Override the configured minimum alignment score (0-100)
    #[arg(long)]
    min_match_score: Option<f64>,
    /// Override the configured result cap
    #[arg(long)]
    max_results: Option<usize>,
    /// Evaluation date for deadline-sensitive factors (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Emit the full result as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Application as JSON
    #[arg(long)]
    application: PathBuf,
    /// Opportunity as JSON
    #[arg(long)]
    opportunity: PathBuf,
    /// Evaluation date for deadline-sensitive factors (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Emit the full analysis as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Discover(args) => run_discover(args).await,
        Command::Predict(args) => run_predict(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Stock profile used when no profile file is supplied.
fn default_profile() -> Profile {
    Profile {
        category_focus: CategoryFocus::Documentary,
        target_communities: vec![
            "diverse communities".to_string(),
            "multicultural communities".to_string(),
            "indigenous communities".to_string(),
        ],
        impact_areas: vec![
            "cultural representation".to_string(),
            "community engagement".to_string(),
            "social cohesion".to_string(),
            "diversity inclusion".to_string(),
        ],
        cultural_tags: vec![
            "multicultural".to_string(),
            "indigenous".to_string(),
            "diverse voices".to_string(),
            "cultural authenticity".to_string(),
        ],
        budget_range: BudgetRange {
            min: 10_000,
            max: 200_000,
        },
        capabilities: vec![
            "documentary production".to_string(),
            "cultural consultation".to_string(),
            "community engagement".to_string(),
            "impact measurement".to_string(),
        ],
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

async fn run_discover(args: DiscoverArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    if let Some(min) = args.min_match_score {
        config.discovery.min_match_score = min;
    }
    if let Some(max) = args.max_results {
        config.discovery.max_results = max;
    }

    let profile = match &args.profile {
        Some(path) => load_json(path)?,
        None => default_profile(),
    };
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let taxonomy = CategoryTaxonomy::default();
    let scorer = MatchScorer::new(profile, taxonomy.clone());
    let predictor = SuccessPredictor::new(PredictionConfig::default(), taxonomy);
    let engine = DiscoveryEngine::new(scorer, predictor, config.discovery)?;

    let sources: Vec<Arc<dyn OpportunitySource>> = args
        .catalogs
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("catalog-{index}"));
            Arc::new(CsvCatalogSource::new(format!("catalog-{index}"), name, path))
                as Arc<dyn OpportunitySource>
        })
        .collect();

    info!(catalogs = sources.len(), %today, "starting discovery run");
    let result = engine.discover(&sources, today).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_discovery(&result);
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let application: Application = load_json(&args.application)?;
    let opportunity: Opportunity = load_json(&args.opportunity)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let predictor = SuccessPredictor::new(PredictionConfig::default(), CategoryTaxonomy::default());
    let prediction = predictor.predict(&application, &opportunity, today);
    let analysis = analyze(&application, &prediction.factors);

    if args.json {
        let payload = serde_json::json!({
            "probability": prediction.probability,
            "factors": prediction.factors,
            "analysis": analysis,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Success prediction for {}", opportunity.title);
    println!(
        "Probability: {:.1}% (evaluated {})",
        prediction.probability * 100.0,
        today
    );

    println!("\nFactors");
    for factor in &prediction.factors {
        println!(
            "- {} (weight {:.2}, {:?}): {}",
            factor.kind.label(),
            factor.weight,
            factor.impact,
            factor.description
        );
    }

    if analysis.risks.high.is_empty() && analysis.risks.medium.is_empty() {
        println!("\nRisks: none above the low tier");
    } else {
        println!("\nRisks");
        for risk in &analysis.risks.high {
            println!("- [high] {risk}");
        }
        for risk in &analysis.risks.medium {
            println!("- [medium] {risk}");
        }
        for risk in &analysis.risks.low {
            println!("- [low] {risk}");
        }
    }

    println!("\nRecommendations");
    for recommendation in &analysis.recommendations {
        println!("- {recommendation}");
    }

    println!("\nQuick wins");
    for item in &analysis.improvements.quick_wins {
        println!("- {item}");
    }

    Ok(())
}

fn render_discovery(result: &DiscoveryResult) {
    println!("Discovery run");
    println!(
        "Sources searched: {} | candidates found: {} | retained: {}",
        result.sources_searched,
        result.total_found,
        result.opportunities.len()
    );
    println!(
        "Match distribution: {} high / {} medium / {} low",
        result.match_distribution.high,
        result.match_distribution.medium,
        result.match_distribution.low
    );

    if result.opportunities.is_empty() {
        println!("\nNo opportunities cleared the minimum match score");
    } else {
        println!("\nRanked opportunities");
        for opportunity in &result.opportunities {
            println!(
                "- {} ({}) | ${} | due {} | alignment {:.0} | success {:.0}%",
                opportunity.title,
                opportunity.organization,
                opportunity.amount,
                opportunity.deadline,
                opportunity.alignment_score.unwrap_or(0.0),
                opportunity.success_prediction.unwrap_or(0.0)
            );
        }
    }

    if result.recommendations.is_empty() {
        println!("\nRecommendations: none");
    } else {
        println!("\nRecommendations");
        for recommendation in &result.recommendations {
            println!("- {recommendation}");
        }
    }
}
