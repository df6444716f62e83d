use asha_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;

/// Render the effective configuration, one `key = value` line per field,
/// with the session signing key redacted.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];

    lines.push(render_line("database.url", &config.database.url));
    lines.push(render_line(
        "database.max_connections",
        &config.database.max_connections.to_string(),
    ));
    lines.push(render_line("database.timeout_secs", &config.database.timeout_secs.to_string()));

    lines.push(render_line("server.bind_address", &config.server.bind_address));
    lines.push(render_line("server.port", &config.server.port.to_string()));
    lines.push(render_line(
        "server.health_check_port",
        &config.server.health_check_port.to_string(),
    ));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
    ));

    lines.push(render_line("knowledge.data_dir", &config.knowledge.data_dir.display().to_string()));
    lines.push(render_line("knowledge.top_k", &config.knowledge.top_k.to_string()));

    lines.push(render_line("scraper.enabled", &config.scraper.enabled.to_string()));
    lines.push(render_line("scraper.jobs_url", &config.scraper.jobs_url));
    lines.push(render_line("scraper.events_url", &config.scraper.events_url));
    lines.push(render_line(
        "scraper.refresh_interval_secs",
        &config.scraper.refresh_interval_secs.to_string(),
    ));
    lines.push(render_line(
        "scraper.retry_delay_secs",
        &config.scraper.retry_delay_secs.to_string(),
    ));
    lines.push(render_line(
        "scraper.request_timeout_secs",
        &config.scraper.request_timeout_secs.to_string(),
    ));

    lines.push(render_line(
        "session.signing_key",
        &redact(config.session.signing_key.expose_secret()),
    ));
    lines.push(render_line("session.ttl_secs", &config.session.ttl_secs.to_string()));
    lines.push(render_line("session.history_turns", &config.session.history_turns.to_string()));
    lines.push(render_line("session.entity_values", &config.session.entity_values.to_string()));

    lines.push(render_line("logging.level", &config.logging.level));
    lines.push(render_line("logging.format", &format!("{:?}", config.logging.format)));

    lines.join("\n")
}

fn render_line(key: &str, value: &str) -> String {
    format!("  {key} = {value}")
}

fn redact(secret: &str) -> String {
    if secret.len() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", &secret[..4])
    }
}
