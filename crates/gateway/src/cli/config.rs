use tg_domain::config::{Config, ConfigSeverity};

/// Print every config issue.  Returns `false` when any of them is an error.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let source = if std::path::Path::new(config_path).exists() {
        config_path.to_owned()
    } else {
        format!("defaults; no file at {config_path}")
    };
    let mut issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({source})");
        return true;
    }

    // Errors first.
    issues.sort_by_key(|i| i.severity != ConfigSeverity::Error);

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!("\n{error_count} error(s), {warning_count} warning(s) in {source}");

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

/// An inline `auth.secret` is never serialized; only the env var name is.
pub fn render(config: &Config) -> anyhow::Result<String> {
    let mut redacted = config.clone();
    redacted.auth.secret = None;
    toml::to_string_pretty(&redacted)
        .map_err(|e| anyhow::anyhow!("failed to serialize config: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_omits_inline_secret() {
        let mut config = Config::default();
        config.auth.secret = Some("inline-signing-secret-value".into());

        let out = render(&config).unwrap();
        assert!(!out.contains("inline-signing-secret-value"));
        assert!(out.contains("secret_env = \"TG_SESSION_SECRET\""));
        // The caller's config is untouched.
        assert!(config.auth.secret.is_some());
    }
}
