use narrateur::config_loader::Settings;
use narrateur::synthesizer::ErrorPolicy;
use serial_test::serial;
use std::time::Duration;

struct EnvGuard(&'static [&'static str]);

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in self.0 {
            std::env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_environment_overrides_defaults() {
    let _guard = EnvGuard(&[
        "NARRATEUR_SPEAKING_RATE",
        "NARRATEUR_ROTATE_EVERY",
        "NARRATEUR_PUNCTUATION_PAUSE",
        "NARRATEUR_ON_ERROR",
        "NARRATEUR_API_KEY",
    ]);
    std::env::set_var("NARRATEUR_SPEAKING_RATE", "0.9");
    std::env::set_var("NARRATEUR_ROTATE_EVERY", "5");
    std::env::set_var("NARRATEUR_PUNCTUATION_PAUSE", "750ms");
    std::env::set_var("NARRATEUR_ON_ERROR", "continue");
    std::env::set_var("NARRATEUR_API_KEY", "from-env");

    let settings = Settings::new().expect("settings load");
    assert!(settings.validate().is_ok());
    assert!((settings.speaking_rate - 0.9).abs() < 1e-6);
    assert_eq!(settings.rotate_every, 5);
    assert_eq!(settings.on_error, ErrorPolicy::Continue);
    assert!(settings.credentials().is_ok());

    let narration = settings.narration_config().unwrap();
    assert_eq!(narration.punctuation_pause, Duration::from_millis(750));
    assert_eq!(narration.paragraph_pause, Duration::from_secs(3));
}

#[test]
#[serial]
fn test_bad_environment_value_can_be_overridden_before_validation() {
    let _guard = EnvGuard(&["NARRATEUR_ROTATE_EVERY"]);
    std::env::set_var("NARRATEUR_ROTATE_EVERY", "0");

    let mut settings = Settings::new().expect("loading does not validate");
    assert_eq!(settings.rotate_every, 0);
    assert!(settings.validate().is_err());

    // what `--rotate-every 4` does before validation
    settings.rotate_every = 4;
    assert!(settings.validate().is_ok());
}
