//! Environment precedence runs in its own test binary so that setting
//! `MQTT_*` variables cannot leak into other tests.

use clap::Parser;
use ucmsg::config::{Cli, Config, DEFAULT_HOST, DEFAULT_PASS, DEFAULT_PORT, DEFAULT_TOPIC, DEFAULT_USER};

const VARS: [&str; 5] = ["MQTT_HOST", "MQTT_PORT", "MQTT_TOPIC", "MQTT_USER", "MQTT_PASS"];

fn parse(args: &[&str]) -> Config {
    let mut argv = vec!["send-mqtt"];
    argv.extend_from_slice(args);
    Config::from(Cli::try_parse_from(argv).expect("valid arguments"))
}

#[test]
fn test_defaults_then_env_then_flags() {
    // SAFETY: this is the only test in the binary, nothing else reads the
    // environment concurrently.
    unsafe {
        for var in VARS {
            std::env::remove_var(var);
        }
    }
    let config = parse(&[]);
    assert_eq!(config.host, DEFAULT_HOST);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.topic, DEFAULT_TOPIC);
    assert_eq!(config.user, DEFAULT_USER);
    assert_eq!(config.password, DEFAULT_PASS);

    unsafe {
        std::env::set_var("MQTT_HOST", "env-host");
        std::env::set_var("MQTT_PORT", "2883");
        std::env::set_var("MQTT_TOPIC", "env-topic");
        std::env::set_var("MQTT_USER", "env-user");
        std::env::set_var("MQTT_PASS", "env-pass");
    }
    let config = parse(&[]);
    assert_eq!(config.host, "env-host");
    assert_eq!(config.port, 2883);
    assert_eq!(config.topic, "env-topic");
    assert_eq!(config.user, "env-user");
    assert_eq!(config.password, "env-pass");

    let config = parse(&["-H", "cli-host", "-P", "3883", "-t", "cli-topic", "-u", "cli-user", "-p", "cli-pass"]);
    assert_eq!(config.host, "cli-host");
    assert_eq!(config.port, 3883);
    assert_eq!(config.topic, "cli-topic");
    assert_eq!(config.user, "cli-user");
    assert_eq!(config.password, "cli-pass");

    unsafe {
        std::env::set_var("MQTT_PORT", "not-a-port");
    }
    assert!(Cli::try_parse_from(["send-mqtt"]).is_err());
    assert!(Cli::try_parse_from(["send-mqtt", "-P", "1883"]).is_ok());
}
