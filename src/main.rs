//! narrateur - narrate French text or a .docx document with Google Cloud TTS
//!
//! Settings come from `Narrateur.toml`, `~/.config/narrateur/Narrateur.toml`
//! and `NARRATEUR_*` variables; the flags below override them.

use clap::Parser;
use narrateur::backends::google::GoogleTtsBackend;
use narrateur::config_loader::Settings;
use narrateur::narrator::{self, Source};
use narrateur::output::ParagraphOutcome;
use narrateur::synthesizer::{ClauseOutcome, ErrorPolicy};
use std::error::Error;
use std::path::PathBuf;

/// Narrate French text as paced audio
#[derive(Parser)]
#[command(name = "narrateur")]
#[command(author = "StarTuz")]
#[command(version)]
#[command(about = "Turn French text or a .docx document into narrated audio", long_about = None)]
struct Cli {
    /// Text to narrate as a single paragraph
    #[arg(short, long)]
    text: Option<String>,

    /// Document to narrate (.docx or .txt)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Directory for the saved paragraphs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// File name prefix, followed by the paragraph number
    #[arg(long)]
    prefix: Option<String>,

    /// Silence after each paragraph, e.g. "3s"
    #[arg(long)]
    paragraph_pause: Option<String>,

    /// Silence after each punctuation mark, e.g. "1s" or "500ms"
    #[arg(long)]
    punctuation_pause: Option<String>,

    /// Slow speaking rate for voices that accept one
    #[arg(short = 'r', long)]
    speaking_rate: Option<f32>,

    /// Paragraphs narrated by a voice before rotating to the next
    #[arg(long)]
    rotate_every: Option<usize>,

    /// Play the audio instead of saving it
    #[arg(short, long)]
    play: bool,

    /// Use a saved eligibility table instead of probing voices
    #[arg(long)]
    voice_table: Option<PathBuf>,

    /// What to do when a paragraph fails
    #[arg(long, value_enum)]
    on_error: Option<ErrorPolicy>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            settings.prefix = prefix.clone();
        }
        if let Some(pause) = &self.paragraph_pause {
            settings.paragraph_pause = pause.clone();
        }
        if let Some(pause) = &self.punctuation_pause {
            settings.punctuation_pause = pause.clone();
        }
        if let Some(rate) = self.speaking_rate {
            settings.speaking_rate = rate;
        }
        if let Some(every) = self.rotate_every {
            settings.rotate_every = every;
        }
        if self.play {
            settings.play_audio = true;
        }
        if let Some(path) = &self.voice_table {
            settings.voice_table = Some(path.clone());
        }
        if let Some(policy) = self.on_error {
            settings.on_error = policy;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::new()?;
    cli.apply(&mut settings);
    settings.validate()?;

    // Fail on bad input before touching the network
    let source = Source::from_options(cli.text.clone(), cli.file.clone())?;
    let config = settings.narration_config()?;
    let pool = settings.voice_pool();

    let backend = GoogleTtsBackend::new(
        settings.api_endpoint.clone(),
        settings.credentials()?,
        settings.request_timeout(),
    )?;
    let table = narrator::eligibility_table(
        &backend,
        &settings.language_code,
        settings.probe_speaking_rate,
        settings.sample_rate_hertz,
        settings.voice_table.as_deref(),
    )?;

    let mut sink = narrator::open_sink(settings.play_audio, &settings.output_dir, &settings.prefix)?;
    let reports = narrator::run(&source, &backend, &table, &pool, &config, sink.as_mut())?;

    let mut failed = 0;
    for report in &reports {
        let status = match &report.outcome {
            ParagraphOutcome::Saved(path) => format!("saved {}", path.display()),
            ParagraphOutcome::Played => "played".to_string(),
            ParagraphOutcome::Failed(reason) => {
                failed += 1;
                format!("FAILED: {}", reason)
            }
        };
        let spoken = report
            .clauses
            .iter()
            .filter(|c| matches!(c, ClauseOutcome::Synthesized { .. }))
            .count();
        println!(
            "[{:>4}] {} @ {}  {} clause(s), {} skipped  {}",
            report.index,
            report.voice,
            report.speaking_rate,
            spoken,
            report.skipped_clauses(),
            status
        );
    }

    if failed > 0 {
        return Err(format!("{} of {} paragraph(s) failed", failed, reports.len()).into());
    }
    Ok(())
}
