//! Configuration integration tests

use hardrock_ev::config::Config;
use rust_decimal_macros::dec;
use std::io::Write;

#[test]
fn test_config_example_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example");
    let config = Config::load(path).unwrap();
    assert_eq!(config.feed.bookmaker, "hardrock");
    assert_eq!(config.reference.markets, "spreads,h2h");
    assert_eq!(config.risk.bankroll, dec!(500));
    assert_eq!(config.schedule.interval_secs, 900);
}

#[test]
fn test_config_file_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [risk]
        bankroll = 2500
        max_unit_pct = 0.01

        [notify]
        webhook_url = "https://discord.test/hook"
        suppress_repeats = false
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.risk.bankroll, dec!(2500));
    assert_eq!(config.kelly().max_bet_pct, dec!(0.01));
    assert!(!config.poller_options().suppress_repeats);
    assert_eq!(config.notify.webhook_url.as_deref(), Some("https://discord.test/hook"));
    assert_eq!(config.engine().bankroll, dec!(2500));
}
