use std::{env, str::FromStr};

use crate::key_strategy::KeyStrategy;

#[derive(Debug)]
pub struct Config {
    /// Postgres URL; conversations are kept in memory when unset.
    pub db_url: Option<String>,
    pub sentry_url: Option<String>,
    pub key_strategy: KeyStrategy,
    pub allow_re_entry: bool,
}

fn read_optional_from_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_from_env<T: FromStr>(name: &str, default: T) -> T {
    match read_optional_from_env(name) {
        Some(value) => match value.parse() {
            Ok(value) => value,
            Err(_) => panic!("Can't parse {} from env: {:?}", name, value),
        },
        None => default,
    }
}

impl Config {
    pub fn init() -> Self {
        let db_url = read_optional_from_env("DB_URL");
        let sentry_url = read_optional_from_env("SENTRY_URL");
        let key_strategy = parse_from_env("CONVERSATION_KEY_STRATEGY", KeyStrategy::default());
        let allow_re_entry = parse_from_env("CONVERSATION_ALLOW_RE_ENTRY", false);

        Config {
            db_url,
            sentry_url,
            key_strategy,
            allow_re_entry,
        }
    }
}
