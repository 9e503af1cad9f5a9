use tg_domain::config::{Config, ConfigSeverity};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.auth.host, "127.0.0.1");
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 3210
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3210);
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config.server.cors.allowed_origins.contains(&"http://localhost:*".to_string()));
    assert!(config.server.cors.allowed_origins.contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn cors_config_parses_custom_origins() {
    let toml_str = r#"
[server.cors]
allowed_origins = ["https://trade.example.com", "http://localhost:3000"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.cors.allowed_origins.len(), 2);
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"https://trade.example.com".to_string()));
}

#[test]
fn full_deployment_file_parses() {
    let toml_str = r#"
[server]
port = 8443

[session_service]
url = "http://127.0.0.1:50051"
verify_timeout_ms = 1000

[auth]
port = 50051
token_ttl_hours = 12
sweep_interval_secs = 600

[cookie]
domain = "trade.example.com"

[broker]
timeout_ms = 5000
mac_address = "00:00:00:00:00:00"

[observability]
otlp_endpoint = "http://otel:4317"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.session_service.url.as_deref(), Some("http://127.0.0.1:50051"));
    assert_eq!(config.session_service.verify_timeout_ms, 1000);
    assert_eq!(config.auth.token_ttl_hours, 12);
    assert_eq!(config.auth.sweep_interval_secs, Some(600));
    assert_eq!(config.cookie.name, "user_session_token");
    assert_eq!(config.broker.timeout_ms, 5000);
    assert!(config
        .validate()
        .iter()
        .all(|i| i.severity != ConfigSeverity::Error));
}

#[test]
fn wildcard_cors_is_flagged() {
    let toml_str = r#"
[server.cors]
allowed_origins = ["*"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues.iter().any(|i| i.field == "server.cors.allowed_origins"));
}

#[test]
fn zero_ttl_is_rejected() {
    let toml_str = r#"
[auth]
token_ttl_hours = 0
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "auth.token_ttl_hours" && i.severity == ConfigSeverity::Error));
}

#[test]
fn rpc_token_env_default() {
    let config = Config::default();
    assert_eq!(config.auth.rpc_token_env, "TG_RPC_TOKEN");
    assert_eq!(config.auth.secret_env, "TG_SESSION_SECRET");
}
