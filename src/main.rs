use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::process::ExitCode;

use satlook::config::{parse_duration, Config};
use satlook::predict::{
    evaluate, evaluate_batch, predict_passes, sample, BatchSummary, Observer, Sgp4Propagator,
};
use satlook::tle::{parse_catalog, parse_record, OrbitalElementSet};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "satlook")]
#[command(about = "Satellite position and look-angle calculator for two-line element sets")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<String>,
    /// Observer position as "lat,lon" in degrees
    #[arg(long, global = true)]
    observer: Option<String>,
    /// Observer altitude in metres
    #[arg(long, global = true)]
    altitude_m: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a TLE file and print its elements
    Parse { tle: String },
    /// Position (and look angles, with an observer) at one instant
    Position {
        tle: String,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Sample positions over a time range
    Track {
        tle: String,
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: DateTime<Utc>,
        /// Sampling interval, e.g. 30s or 5m
        #[arg(long)]
        interval: Option<String>,
    },
    /// Predict passes over the observer
    Passes {
        tle: String,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Search window length, e.g. 24h
        #[arg(long, default_value = "24h")]
        window: String,
        #[arg(long)]
        min_elevation: Option<f64>,
    },
    /// Evaluate every record of a multi-satellite file at one instant
    Batch {
        tle: String,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

struct Context {
    config: Config,
    observer: Option<Observer>,
}

#[derive(Serialize)]
struct NamedSample<'a, T: Serialize> {
    satellite: &'a str,
    #[serde(flatten)]
    sample: T,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let ctx = match load_context(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Parse { tle } => parse(&tle),
        Commands::Position { tle, at } => position(&ctx, &tle, at.unwrap_or_else(Utc::now)),
        Commands::Track {
            tle,
            start,
            end,
            interval,
        } => track(&ctx, &tle, start, end, interval.as_deref()),
        Commands::Passes {
            tle,
            start,
            window,
            min_elevation,
        } => passes(
            &ctx,
            &tle,
            start.unwrap_or_else(Utc::now),
            &window,
            min_elevation,
        ),
        Commands::Batch { tle, at } => batch(&ctx, &tle, at.unwrap_or_else(Utc::now)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_context(cli: &Cli) -> Result<Context, Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let configured = config.observer()?;
    let observer = match &cli.observer {
        Some(coordinates) => {
            let altitude = cli
                .altitude_m
                .or_else(|| configured.map(|o| o.altitude_m));
            Some(Observer::from_coordinates(coordinates, altitude)?)
        }
        None => match (configured, cli.altitude_m) {
            (Some(o), Some(alt)) => Some(Observer::new(o.latitude_deg, o.longitude_deg, alt)?),
            (o, _) => o,
        },
    };

    Ok(Context { config, observer })
}

fn read_record(path: &str) -> Result<OrbitalElementSet, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let elements = parse_record(&text)?;
    let missing = elements.missing_fields();
    if !missing.is_empty() {
        log::warn!("{}: could not read {}", elements.name, missing.join(", "));
    }
    Ok(elements)
}

fn propagator(
    ctx: &Context,
    elements: &OrbitalElementSet,
) -> Result<Sgp4Propagator, Box<dyn Error>> {
    let propagator = Sgp4Propagator::new(elements)?;
    Ok(match ctx.config.validity_window()? {
        Some(window) => propagator.with_validity_window(window),
        None => propagator,
    })
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn parse(path: &str) -> CliResult {
    let elements = read_record(path)?;
    print_json(&elements)
}

fn position(ctx: &Context, path: &str, at: DateTime<Utc>) -> CliResult {
    let elements = read_record(path)?;
    let propagator = propagator(ctx, &elements)?;
    let sample = evaluate(&propagator, at, ctx.observer.as_ref())?;
    print_json(&NamedSample {
        satellite: &elements.name,
        sample,
    })
}

fn track(
    ctx: &Context,
    path: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Option<&str>,
) -> CliResult {
    let interval = match interval {
        Some(s) => parse_duration(s)?,
        None => ctx.config.interval()?,
    };
    let elements = read_record(path)?;
    let propagator = propagator(ctx, &elements)?;

    let trajectory = sample(&propagator, start, end, interval, ctx.observer.as_ref())?;
    log::info!("Sampled {} points for {}", trajectory.len(), elements.name);
    for point in &trajectory {
        print_json(&NamedSample {
            satellite: &elements.name,
            sample: point,
        })?;
    }
    Ok(())
}

fn passes(
    ctx: &Context,
    path: &str,
    start: DateTime<Utc>,
    window: &str,
    min_elevation: Option<f64>,
) -> CliResult {
    let observer = ctx
        .observer
        .ok_or("pass prediction needs an observer (--observer or config)")?;
    let window: Duration = parse_duration(window)?;
    let min_elevation = min_elevation.unwrap_or(ctx.config.sampling.min_elevation_deg);

    let elements = read_record(path)?;
    let propagator = propagator(ctx, &elements)?;
    let passes = predict_passes(
        &propagator,
        &observer,
        &elements.name,
        elements.catalog_number,
        start,
        start + window,
        min_elevation,
    )?;

    log::info!("Found {} passes for {}", passes.len(), elements.name);
    for pass in &passes {
        print_json(pass)?;
    }
    Ok(())
}

fn batch(ctx: &Context, path: &str, at: DateTime<Utc>) -> CliResult {
    let text = fs::read_to_string(path)?;
    let results = parse_catalog(&text);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        eprintln!("Skipping record: {}", err);
    }

    let sets: Vec<OrbitalElementSet> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .cloned()
        .collect();
    let window = ctx.config.validity_window()?;
    let samples = evaluate_batch(&sets, at, ctx.observer.as_ref(), window);
    for (set, sample) in sets.iter().zip(samples) {
        match sample {
            Ok(sample) => print_json(&NamedSample {
                satellite: &set.name,
                sample,
            })?,
            Err(e) => eprintln!("{}: {}", set.name, e),
        }
    }

    print_json(&BatchSummary::from_results(&results))
}
