use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_set() {
    let config = RelayConfig::from_lookup(lookup_from(&[])).expect("defaults should parse");
    assert_eq!(config, RelayConfig::default());
    assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
}

#[test]
fn reads_all_variables() {
    let config = RelayConfig::from_lookup(lookup_from(&[
        ("PORT", "8080"),
        ("BIND_ADDR", "127.0.0.1"),
        ("STATIC_DIR", "public"),
        ("PEER_QUEUE_CAPACITY", "16"),
    ]))
    .expect("config should parse");

    assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
    assert_eq!(config.static_dir, Some(PathBuf::from("public")));
    assert_eq!(config.peer_queue_capacity, 16);
}

#[test]
fn empty_port_falls_back_to_default() {
    let config = RelayConfig::from_lookup(lookup_from(&[("PORT", "")])).expect("empty PORT is unset");
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
fn invalid_port_is_an_error() {
    let err = RelayConfig::from_lookup(lookup_from(&[("PORT", "http")])).expect_err("PORT must be numeric");
    assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    assert_eq!(err.to_string(), "invalid PORT: \"http\"");
}

#[test]
fn zero_queue_capacity_is_rejected() {
    let err = RelayConfig::from_lookup(lookup_from(&[("PEER_QUEUE_CAPACITY", "0")]))
        .expect_err("zero capacity cannot hold a frame");
    assert!(matches!(err, ConfigError::Invalid { var: "PEER_QUEUE_CAPACITY", .. }));
}
