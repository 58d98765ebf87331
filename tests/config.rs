use std::time::Duration;

use spoiler_scope::config::Settings;

fn settings() -> Settings {
    Settings::rooted("data", "outputs")
}

#[test]
fn defaults_are_valid() {
    settings().validate().unwrap();
}

#[test]
fn zero_sample_cap_is_rejected() {
    let mut settings = settings();
    settings.sample_cap = 0;
    let err = settings.validate().unwrap_err();
    assert!(err.to_string().contains("SAMPLE_CAP"));
}

#[test]
fn zero_timeout_is_rejected() {
    let mut settings = settings();
    settings.task_timeout = Duration::ZERO;
    let err = settings.validate().unwrap_err();
    assert!(err.to_string().contains("EXTRACT_TIMEOUT_SECS"));
}

#[test]
fn test_fraction_must_be_a_proper_share() {
    for fraction in [0.0, 1.0, -0.1, f64::NAN] {
        let mut settings = settings();
        settings.test_fraction = fraction;
        assert!(settings.validate().is_err(), "accepted {fraction}");
    }
}
