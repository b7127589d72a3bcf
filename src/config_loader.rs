use config::{Config, ConfigBuilder, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::backends::google::Credentials;
use crate::backends::Gender;
use crate::synthesizer::{ErrorPolicy, NarrationConfig};
use crate::voices::{PoolVoice, VoicePool};

/// Lowest and highest speaking rates the service accepts.
const MIN_SPEAKING_RATE: f32 = 0.25;
const MAX_SPEAKING_RATE: f32 = 4.0;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub paragraph_pause: String,   // "3s", "1.5s" or "500ms"
    pub punctuation_pause: String, // same syntax as paragraph_pause
    pub speaking_rate: f32,
    pub probe_speaking_rate: f32,
    pub rotate_every: usize,
    pub play_audio: bool,
    pub language_code: String,
    pub sample_rate_hertz: u32,
    // Service access
    pub api_endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
    pub on_error: ErrorPolicy,
    #[serde(default = "default_voice_pool")]
    pub voice_pool: Vec<PoolVoice>,
    #[serde(default)]
    pub voice_table: Option<PathBuf>,
}

fn default_voice_pool() -> Vec<PoolVoice> {
    vec![
        PoolVoice::new("fr-FR-Polyglot-1", Gender::Male),
        PoolVoice::new("fr-FR-Wavenet-D", Gender::Male),
        PoolVoice::new("fr-FR-Wavenet-C", Gender::Female),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("AudioFromText"),
            prefix: "French_".to_string(),
            paragraph_pause: "3s".to_string(),
            punctuation_pause: "1s".to_string(),
            speaking_rate: 0.85,
            probe_speaking_rate: 0.5,
            rotate_every: 10,
            play_audio: false,
            language_code: "fr-FR".to_string(),
            sample_rate_hertz: 24_000,
            api_endpoint: "https://texttospeech.googleapis.com".to_string(),
            api_key: None,
            access_token: None,
            request_timeout_secs: 30,
            on_error: ErrorPolicy::Abort,
            voice_pool: default_voice_pool(),
            voice_table: None,
        }
    }
}

impl Settings {
    /// Defaults, then `Narrateur.*` in the working directory, then
    /// `~/.config/narrateur/Narrateur.*`, then `NARRATEUR_*` variables.
    ///
    /// Values are not validated here; call [`Settings::validate`] once
    /// command-line overrides have been applied.
    pub fn new() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let builder = Self::defaults()?
            .add_source(File::with_name("Narrateur").required(false))
            .add_source(
                File::with_name(&home.join(".config/narrateur/Narrateur").to_string_lossy())
                    .required(false),
            )
            // e.g. NARRATEUR_SPEAKING_RATE=0.9
            .add_source(config::Environment::with_prefix("NARRATEUR").try_parsing(true));

        Self::finish(builder)
    }

    /// Defaults overlaid with a single explicit file. No environment lookup.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from(path).required(true));
        Self::finish(builder)
    }

    fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let d = Settings::default();
        Config::builder()
            .set_default("output_dir", d.output_dir.to_string_lossy().to_string())?
            .set_default("prefix", d.prefix)?
            .set_default("paragraph_pause", d.paragraph_pause)?
            .set_default("punctuation_pause", d.punctuation_pause)?
            .set_default("speaking_rate", d.speaking_rate as f64)?
            .set_default("probe_speaking_rate", d.probe_speaking_rate as f64)?
            .set_default("rotate_every", d.rotate_every as u64)?
            .set_default("play_audio", d.play_audio)?
            .set_default("language_code", d.language_code)?
            .set_default("sample_rate_hertz", d.sample_rate_hertz as u64)?
            .set_default("api_endpoint", d.api_endpoint)?
            .set_default("request_timeout_secs", d.request_timeout_secs)?
            .set_default("on_error", "abort")
    }

    fn finish(
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SPEAKING_RATE..=MAX_SPEAKING_RATE).contains(&self.speaking_rate) {
            return Err(ConfigError::Message(format!(
                "Invalid speaking_rate: {}. Must be between {} and {}",
                self.speaking_rate, MIN_SPEAKING_RATE, MAX_SPEAKING_RATE
            )));
        }
        if self.probe_speaking_rate < MIN_SPEAKING_RATE || self.probe_speaking_rate >= 1.0 {
            return Err(ConfigError::Message(format!(
                "Invalid probe_speaking_rate: {}. Must be at least {} and below 1.0",
                self.probe_speaking_rate, MIN_SPEAKING_RATE
            )));
        }
        if self.rotate_every == 0 {
            return Err(ConfigError::Message(
                "rotate_every must be greater than 0".to_string(),
            ));
        }
        if self.voice_pool.is_empty() {
            return Err(ConfigError::Message(
                "voice_pool must name at least one voice".to_string(),
            ));
        }
        if self.sample_rate_hertz == 0 {
            return Err(ConfigError::Message(
                "sample_rate_hertz must be positive".to_string(),
            ));
        }
        parse_pause(&self.paragraph_pause)?;
        parse_pause(&self.punctuation_pause)?;
        Ok(())
    }

    /// Explicit credential value for the service client.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        match (&self.api_key, &self.access_token) {
            (Some(key), _) if !key.trim().is_empty() => Ok(Credentials::ApiKey(key.clone())),
            (_, Some(token)) if !token.trim().is_empty() => {
                Ok(Credentials::Bearer(token.clone()))
            }
            _ => Err(ConfigError::Message(
                "no credentials: set api_key or access_token (NARRATEUR_API_KEY / NARRATEUR_ACCESS_TOKEN)"
                    .to_string(),
            )),
        }
    }

    pub fn voice_pool(&self) -> VoicePool {
        VoicePool::new(self.voice_pool.clone())
    }

    pub fn narration_config(&self) -> Result<NarrationConfig, ConfigError> {
        Ok(NarrationConfig {
            prefix: self.prefix.clone(),
            paragraph_pause: parse_pause(&self.paragraph_pause)?,
            punctuation_pause: parse_pause(&self.punctuation_pause)?,
            speaking_rate: self.speaking_rate,
            rotate_every: self.rotate_every,
            language_code: self.language_code.clone(),
            sample_rate_hertz: self.sample_rate_hertz,
            on_error: self.on_error,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parses a pause written as `"<secs>s"` or `"<millis>ms"`.
pub fn parse_pause(raw: &str) -> Result<Duration, ConfigError> {
    let trimmed = raw.trim();
    let invalid = || {
        ConfigError::Message(format!(
            "Invalid pause duration '{}'. Use e.g. \"3s\", \"1.5s\" or \"500ms\"",
            raw
        ))
    };

    let (number, scale) = if let Some(ms) = trimmed.strip_suffix("ms") {
        (ms, 0.001)
    } else if let Some(s) = trimmed.strip_suffix('s') {
        (s, 1.0)
    } else {
        return Err(invalid());
    };

    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(Duration::from_secs_f64(value * scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_documented_surface() {
        let settings = Settings::default();
        assert_eq!(settings.output_dir, PathBuf::from("AudioFromText"));
        assert_eq!(settings.prefix, "French_");
        assert_eq!(settings.rotate_every, 10);
        assert!(!settings.play_audio);
        assert!(settings.validate().is_ok());

        let narration = settings.narration_config().unwrap();
        assert_eq!(narration.paragraph_pause, Duration::from_secs(3));
        assert_eq!(narration.punctuation_pause, Duration::from_secs(1));
        assert!((narration.speaking_rate - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_pause() {
        assert_eq!(parse_pause("1s").unwrap(), Duration::from_millis(1000));
        assert_eq!(parse_pause(" 1.5s ").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_pause("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_pause("0s").unwrap(), Duration::ZERO);
        assert!(parse_pause("3").is_err());
        assert!(parse_pause("-1s").is_err());
        assert!(parse_pause("abc s").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.rotate_every = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.probe_speaking_rate = 1.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.speaking_rate = 5.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.voice_pool.clear();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.paragraph_pause = "long".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_credentials_prefer_api_key() {
        let mut settings = Settings::default();
        assert!(settings.credentials().is_err());

        settings.access_token = Some("tok".to_string());
        assert_eq!(
            settings.credentials().unwrap(),
            Credentials::Bearer("tok".to_string())
        );

        settings.api_key = Some("key".to_string());
        assert_eq!(
            settings.credentials().unwrap(),
            Credentials::ApiKey("key".to_string())
        );
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
prefix = "Livre_"
rotate_every = 4
paragraph_pause = "2s"
on_error = "continue"

[[voice_pool]]
name = "fr-FR-Neural2-A"
gender = "FEMALE"
"#
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.prefix, "Livre_");
        assert_eq!(settings.rotate_every, 4);
        assert_eq!(settings.on_error, ErrorPolicy::Continue);
        assert_eq!(settings.voice_pool.len(), 1);
        assert_eq!(settings.voice_pool[0].gender, Gender::Female);
        // untouched keys keep their defaults
        assert_eq!(settings.punctuation_pause, "1s");
        assert_eq!(settings.language_code, "fr-FR");
    }
}
