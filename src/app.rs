use scylla::client::caching_session::CachingSession;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::sync::Arc;
use std::time::Duration;
use std::env;

use crate::constants::DEFAULT_PORT;
use crate::errors::CounterError;
use crate::models::counter::store::{ensure_counter_table, ScyllaCounterStore};

pub struct Config {
    pub hosts: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keyspace: String,
    pub table: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Config, CounterError> {
        dotenv::dotenv().ok();

        let hosts: Vec<String> = required("SCYLLA_HOSTS")?
            .split(',')
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .collect();

        if hosts.is_empty() {
            return Err(CounterError::ConfigurationMissing("SCYLLA_HOSTS"));
        }

        let username = env::var("SCYLLA_USERNAME").ok();
        let password = env::var("SCYLLA_PASSWORD").ok();

        if username.is_some() != password.is_some() {
            return Err(CounterError::ConfigurationMissing(
                "SCYLLA_USERNAME/SCYLLA_PASSWORD",
            ));
        }

        let keyspace = required("SCYLLA_KEYSPACE")?;
        let table = required("SCYLLA_TABLE")?;

        // Both names end up inside CQL text, so they must be plain
        // identifiers rather than arbitrary strings.
        if !is_cql_identifier(&keyspace) {
            return Err(CounterError::ConfigurationMissing("SCYLLA_KEYSPACE"));
        }

        if !is_cql_identifier(&table) {
            return Err(CounterError::ConfigurationMissing("SCYLLA_TABLE"));
        }

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| CounterError::ConfigurationMissing("PORT"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Config {
            hosts,
            username,
            password,
            keyspace,
            table,
            port,
        })
    }
}

pub struct App {
    pub config: Config,
    pub store: Arc<ScyllaCounterStore>,
}

impl App {
    pub async fn new() -> Result<App, CounterError> {
        let config = Config::from_env()?;
        let session = db_session(&config).await?;

        ensure_counter_table(&session, &config.table).await?;

        let store = ScyllaCounterStore::new(
            CachingSession::from(session, 1000),
            config.table.clone(),
        );

        Ok(App {
            config,
            store: Arc::new(store),
        })
    }

    /// Startup work that has to happen once the process is up.
    pub fn init(&self) {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn store(&self) -> Arc<ScyllaCounterStore> {
        self.store.clone()
    }
}

async fn db_session(config: &Config) -> Result<Session, CounterError> {
    let mut builder = SessionBuilder::new()
        .known_nodes(&config.hosts)
        .connection_timeout(Duration::from_secs(3))
        .use_keyspace(config.keyspace.as_str(), false);

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        builder = builder.user(username.as_str(), password.as_str());
    }

    Ok(builder.build().await?)
}

fn required(key: &'static str) -> Result<String, CounterError> {
    env::var(key).map_err(|_| CounterError::ConfigurationMissing(key))
}

fn is_cql_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
