use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::debug;
use serde_json::json;

use weather_time::extract::DEFAULT_FORECAST_HORIZON_DAYS;
use weather_time::slot::parse_slot_timestamp;
use weather_time::{
    extract_time_interval, extract_time_intervals, is_today, is_tomorrow, parse_slots,
    ExtractOptions,
};

/// weather-time - inspect forecast time windows extracted from NLU time slots
#[derive(Debug, Parser)]
#[command(name = "weather-time")]
#[command(about = "Inspect forecast time windows extracted from NLU time slots", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge a JSON array of time slots into forecast intervals
    Extract {
        /// Slot JSON file (reads stdin if omitted)
        file: Option<PathBuf>,

        #[command(flatten)]
        anchor: AnchorArgs,

        /// Days past today the forecast covers
        #[arg(long, default_value_t = DEFAULT_FORECAST_HORIZON_DAYS)]
        horizon_days: u32,

        /// Only print the earliest interval
        #[arg(long)]
        first: bool,
    },

    /// Report whether an instant falls today or tomorrow
    Day {
        /// The instant to check (RFC 3339 or `YYYY-MM-DD HH:MM:SS +HH:MM`)
        instant: String,

        #[command(flatten)]
        anchor: AnchorArgs,
    },
}

#[derive(Debug, Args)]
struct AnchorArgs {
    /// Reference "now" (defaults to the system clock)
    #[arg(long)]
    now: Option<String>,

    /// IANA timezone of the user
    #[arg(long, short = 't', default_value = "UTC")]
    timezone: String,
}

impl AnchorArgs {
    fn now(&self) -> Result<DateTime<Utc>> {
        match &self.now {
            Some(now) => Ok(parse_slot_timestamp(now)
                .context("invalid --now")?
                .with_timezone(&Utc)),
            None => Ok(Utc::now()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let output = match cli.command {
        Commands::Extract {
            file,
            anchor,
            horizon_days,
            first,
        } => {
            let input = read_input(file.as_ref())?;
            let slots = parse_slots(&input)?;
            let now = anchor.now()?;
            let options = ExtractOptions {
                forecast_horizon_days: horizon_days,
            };
            debug!("extracting {} slot(s) at {} in {}", slots.len(), now, anchor.timezone);

            if first {
                match extract_time_interval(now, &slots, &anchor.timezone, &options)? {
                    Some((interval, truncated)) => {
                        json!({ "interval": interval, "truncated": truncated })
                    }
                    None => serde_json::Value::Null,
                }
            } else {
                serde_json::to_value(extract_time_intervals(
                    now,
                    &slots,
                    &anchor.timezone,
                    &options,
                )?)?
            }
        }
        Commands::Day { instant, anchor } => {
            let instant = parse_slot_timestamp(&instant).context("invalid instant")?;
            let now = anchor.now()?;
            json!({
                "today": is_today(now, &instant, &anchor.timezone)?,
                "tomorrow": is_tomorrow(now, &instant, &anchor.timezone)?,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
