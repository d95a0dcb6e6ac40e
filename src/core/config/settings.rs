use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment,
    parse_number, parse_positive_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, RedisSettings, RuntimeSettings,
    SecuritySettings, ServerHost, ServerPort, ServerSettings, Settings, TakingSettings,
    TelemetrySettings,
};

const SUPPORTED_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("EXAMONLINE_HOST", "0.0.0.0");
        let port = env_or_default("EXAMONLINE_PORT", "8000");

        let environment = parse_environment(
            env_optional("EXAMONLINE_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("EXAMONLINE_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "ExamOnline API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let (secret_key, secret_key_generated) = match env_optional("SECRET_KEY") {
            Some(value) => (value, false),
            None => (load_or_create_secret_key(env_optional("SECRET_KEY_FILE")), true),
        };
        let access_token_expire_minutes = parse_number::<u64>(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port =
            parse_number::<u16>("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "examonline");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "examonline_db");
        let database_url = env_optional("DATABASE_URL");
        let max_connections = parse_number::<u32>(
            "DATABASE_MAX_CONNECTIONS",
            env_or_default("DATABASE_MAX_CONNECTIONS", "30"),
        )?;
        let acquire_timeout_seconds = parse_number::<u64>(
            "DATABASE_ACQUIRE_TIMEOUT_SECONDS",
            env_or_default("DATABASE_ACQUIRE_TIMEOUT_SECONDS", "30"),
        )?;

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port =
            parse_number::<u16>("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_number::<u16>("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let draft_save_rate_limit = parse_positive_u64(
            "DRAFT_SAVE_RATE_LIMIT",
            env_or_default("DRAFT_SAVE_RATE_LIMIT", "30"),
        )?;
        let draft_save_rate_window_seconds = parse_positive_u64(
            "DRAFT_SAVE_RATE_WINDOW_SECONDS",
            env_or_default("DRAFT_SAVE_RATE_WINDOW_SECONDS", "10"),
        )?;

        let log_level = env_or_default("EXAMONLINE_LOG_LEVEL", "info");
        let json =
            env_optional("EXAMONLINE_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings {
                secret_key,
                secret_key_generated,
                access_token_expire_minutes,
                algorithm,
            },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
                acquire_timeout_seconds,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            taking: TakingSettings { draft_save_rate_limit, draft_save_rate_window_seconds },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn taking(&self) -> &TakingSettings {
        &self.taking
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_ALGORITHMS.contains(&self.security.algorithm.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "ALGORITHM",
                value: self.security.algorithm.clone(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        if !self.api.api_v1_str.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "API_V1_STR",
                value: self.api.api_v1_str.clone(),
            });
        }

        if !self.runtime.strict_config {
            return Ok(());
        }

        if self.security.secret_key_generated {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }
        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        Ok(())
    }
}
