//! narrateur-voices - find out which voices accept a slowed speaking rate
//!
//! Probes every voice of a language once and prints the resulting
//! eligibility table. `--save` writes it as JSON for `narrateur --voice-table`.

use clap::Parser;
use narrateur::backends::google::GoogleTtsBackend;
use narrateur::config_loader::Settings;
use narrateur::voices::{self, EligibilityTable};
use std::path::PathBuf;

/// Probe Google Cloud TTS voices for slow-rate support
#[derive(Parser)]
#[command(name = "narrateur-voices")]
#[command(author = "StarTuz")]
#[command(version)]
#[command(about = "Classify voices by whether they accept a slowed speaking rate", long_about = None)]
struct Cli {
    /// Language code to probe (defaults to the configured one)
    #[arg(short, long)]
    language: Option<String>,

    /// Trial speaking rate, below 1.0
    #[arg(short, long)]
    rate: Option<f32>,

    /// Write the table to this JSON file
    #[arg(short, long)]
    save: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::new()?;
    if let Some(language) = cli.language {
        settings.language_code = language;
    }
    if let Some(rate) = cli.rate {
        settings.probe_speaking_rate = rate;
    }
    settings.validate()?;

    let backend = GoogleTtsBackend::new(
        settings.api_endpoint.clone(),
        settings.credentials()?,
        settings.request_timeout(),
    )?;
    let outcome = voices::probe(
        &backend,
        &settings.language_code,
        settings.probe_speaking_rate,
        settings.sample_rate_hertz,
    )?;
    let table = EligibilityTable::from_probe(&outcome);

    println!("{:<32} {:<32} SLOW RATE", "VOICE", "GENDER");
    for (name, entry) in table.iter() {
        println!(
            "{:<32} {:<32} {}",
            name,
            entry.gender,
            if entry.supports_slow_rate { "yes" } else { "no" }
        );
    }

    let pool = settings.voice_pool();
    if let Err(e) = pool.check_against(&table) {
        eprintln!("Warning: configured voice pool is not usable here: {}", e);
    }

    if let Some(path) = cli.save {
        table.save(&path)?;
        println!("Saved {} voices to {}", table.len(), path.display());
    }

    Ok(())
}
