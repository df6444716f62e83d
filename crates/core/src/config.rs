use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub knowledge: KnowledgeConfig,
    pub scraper: ScraperConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct KnowledgeConfig {
    pub data_dir: PathBuf,
    pub top_k: usize,
}

#[derive(Clone, Debug)]
pub struct ScraperConfig {
    pub enabled: bool,
    pub jobs_url: String,
    pub events_url: String,
    pub refresh_interval_secs: u64,
    pub retry_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub signing_key: SecretString,
    pub ttl_secs: u64,
    pub history_turns: usize,
    pub entity_values: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub server_port: Option<u16>,
    pub scraper_enabled: Option<bool>,
    pub session_signing_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://asha.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
            },
            knowledge: KnowledgeConfig { data_dir: PathBuf::from("data"), top_k: 5 },
            scraper: ScraperConfig {
                enabled: false,
                jobs_url: "https://www.herkey.com/jobs".to_string(),
                events_url: "https://events.herkey.com/events".to_string(),
                refresh_interval_secs: 24 * 60 * 60,
                retry_delay_secs: 300,
                request_timeout_secs: 30,
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                    .to_string(),
            },
            session: SessionConfig {
                signing_key: "asha-dev-session-signing-key".to_string().into(),
                ttl_secs: 3600,
                history_turns: 10,
                entity_values: 5,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("asha.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(knowledge) = patch.knowledge {
            if let Some(data_dir) = knowledge.data_dir {
                self.knowledge.data_dir = PathBuf::from(data_dir);
            }
            if let Some(top_k) = knowledge.top_k {
                self.knowledge.top_k = top_k;
            }
        }

        if let Some(scraper) = patch.scraper {
            if let Some(enabled) = scraper.enabled {
                self.scraper.enabled = enabled;
            }
            if let Some(jobs_url) = scraper.jobs_url {
                self.scraper.jobs_url = jobs_url;
            }
            if let Some(events_url) = scraper.events_url {
                self.scraper.events_url = events_url;
            }
            if let Some(refresh_interval_secs) = scraper.refresh_interval_secs {
                self.scraper.refresh_interval_secs = refresh_interval_secs;
            }
            if let Some(retry_delay_secs) = scraper.retry_delay_secs {
                self.scraper.retry_delay_secs = retry_delay_secs;
            }
            if let Some(request_timeout_secs) = scraper.request_timeout_secs {
                self.scraper.request_timeout_secs = request_timeout_secs;
            }
            if let Some(user_agent) = scraper.user_agent {
                self.scraper.user_agent = user_agent;
            }
        }

        if let Some(session) = patch.session {
            if let Some(signing_key_value) = session.signing_key {
                self.session.signing_key = secret_value(signing_key_value);
            }
            if let Some(ttl_secs) = session.ttl_secs {
                self.session.ttl_secs = ttl_secs;
            }
            if let Some(history_turns) = session.history_turns {
                self.session.history_turns = history_turns;
            }
            if let Some(entity_values) = session.entity_values {
                self.session.entity_values = entity_values;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ASHA_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("ASHA_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("ASHA_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("ASHA_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("ASHA_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("ASHA_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("ASHA_SERVER_PORT") {
            self.server.port = parse_u16("ASHA_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("ASHA_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port = parse_u16("ASHA_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("ASHA_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("ASHA_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("ASHA_KNOWLEDGE_DATA_DIR") {
            self.knowledge.data_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("ASHA_KNOWLEDGE_TOP_K") {
            self.knowledge.top_k = parse_usize("ASHA_KNOWLEDGE_TOP_K", &value)?;
        }

        if let Some(value) = read_env("ASHA_SCRAPER_ENABLED") {
            self.scraper.enabled = parse_bool("ASHA_SCRAPER_ENABLED", &value)?;
        }
        if let Some(value) = read_env("ASHA_SCRAPER_JOBS_URL") {
            self.scraper.jobs_url = value;
        }
        if let Some(value) = read_env("ASHA_SCRAPER_EVENTS_URL") {
            self.scraper.events_url = value;
        }
        if let Some(value) = read_env("ASHA_SCRAPER_REFRESH_INTERVAL_SECS") {
            self.scraper.refresh_interval_secs =
                parse_u64("ASHA_SCRAPER_REFRESH_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = read_env("ASHA_SCRAPER_RETRY_DELAY_SECS") {
            self.scraper.retry_delay_secs = parse_u64("ASHA_SCRAPER_RETRY_DELAY_SECS", &value)?;
        }
        if let Some(value) = read_env("ASHA_SCRAPER_REQUEST_TIMEOUT_SECS") {
            self.scraper.request_timeout_secs =
                parse_u64("ASHA_SCRAPER_REQUEST_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("ASHA_SCRAPER_USER_AGENT") {
            self.scraper.user_agent = value;
        }

        if let Some(value) = read_env("ASHA_SESSION_SIGNING_KEY") {
            self.session.signing_key = secret_value(value);
        }
        if let Some(value) = read_env("ASHA_SESSION_TTL_SECS") {
            self.session.ttl_secs = parse_u64("ASHA_SESSION_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("ASHA_SESSION_HISTORY_TURNS") {
            self.session.history_turns = parse_usize("ASHA_SESSION_HISTORY_TURNS", &value)?;
        }
        if let Some(value) = read_env("ASHA_SESSION_ENTITY_VALUES") {
            self.session.entity_values = parse_usize("ASHA_SESSION_ENTITY_VALUES", &value)?;
        }

        let log_level = read_env("ASHA_LOGGING_LEVEL").or_else(|| read_env("ASHA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("ASHA_LOGGING_FORMAT").or_else(|| read_env("ASHA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.knowledge.data_dir = data_dir;
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
        if let Some(scraper_enabled) = overrides.scraper_enabled {
            self.scraper.enabled = scraper_enabled;
        }
        if let Some(session_signing_key) = overrides.session_signing_key {
            self.session.signing_key = secret_value(session_signing_key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_knowledge(&self.knowledge)?;
        validate_scraper(&self.scraper)?;
        validate_session(&self.session)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("asha.toml"), PathBuf::from("config/asha.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.port == server.health_check_port {
        return Err(ConfigError::Validation(
            "server.port and server.health_check_port must differ".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_knowledge(knowledge: &KnowledgeConfig) -> Result<(), ConfigError> {
    if knowledge.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("knowledge.data_dir must not be empty".to_string()));
    }

    if knowledge.top_k == 0 || knowledge.top_k > 50 {
        return Err(ConfigError::Validation("knowledge.top_k must be in range 1..=50".to_string()));
    }

    Ok(())
}

fn validate_scraper(scraper: &ScraperConfig) -> Result<(), ConfigError> {
    for (field, url) in
        [("scraper.jobs_url", &scraper.jobs_url), ("scraper.events_url", &scraper.events_url)]
    {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{field} must start with http:// or https://"
            )));
        }
    }

    if scraper.refresh_interval_secs < 60 {
        return Err(ConfigError::Validation(
            "scraper.refresh_interval_secs must be at least 60".to_string(),
        ));
    }

    if scraper.retry_delay_secs == 0 {
        return Err(ConfigError::Validation(
            "scraper.retry_delay_secs must be greater than zero".to_string(),
        ));
    }

    if scraper.request_timeout_secs == 0 || scraper.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "scraper.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    let signing_key = session.signing_key.expose_secret();
    if signing_key.trim().is_empty() {
        return Err(ConfigError::Validation("session.signing_key is required".to_string()));
    }
    if signing_key.len() < 16 {
        return Err(ConfigError::Validation(
            "session.signing_key must be at least 16 characters".to_string(),
        ));
    }

    if session.ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "session.ttl_secs must be greater than zero".to_string(),
        ));
    }

    if session.history_turns < 2 {
        return Err(ConfigError::Validation(
            "session.history_turns must hold at least one exchange (>= 2)".to_string(),
        ));
    }

    if session.entity_values == 0 {
        return Err(ConfigError::Validation(
            "session.entity_values must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    knowledge: Option<KnowledgePatch>,
    scraper: Option<ScraperPatch>,
    session: Option<SessionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct KnowledgePatch {
    data_dir: Option<String>,
    top_k: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ScraperPatch {
    enabled: Option<bool>,
    jobs_url: Option<String>,
    events_url: Option<String>,
    refresh_interval_secs: Option<u64>,
    retry_delay_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    signing_key: Option<String>,
    ttl_secs: Option<u64>,
    history_turns: Option<usize>,
    entity_values: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
