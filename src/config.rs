use std::env;

pub const REDIS_URL_VAR: &str = "ORDERS_REDIS_URL";
pub const KEY_PREFIX_VAR: &str = "ORDERS_KEY_PREFIX";

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1/";
const DEFAULT_KEY_PREFIX: &str = "orders";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub redis_url: String,
    /// Prepended to every redis key, so several deployments can
    /// share one redis
    pub key_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            redis_url:  DEFAULT_REDIS_URL.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Config {
        let default = Config::default();
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        Config {
            redis_url:  non_empty(REDIS_URL_VAR).unwrap_or(default.redis_url),
            key_prefix: non_empty(KEY_PREFIX_VAR).unwrap_or(default.key_prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Config::default(), Config::from_lookup(|_| None));
        assert_eq!(Config::default(),
                   Config::from_lookup(|_| Some("  ".to_string())));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(|var| match var {
            REDIS_URL_VAR => Some("redis://cache:6380/2".to_string()),
            _ => None,
        });
        assert_eq!("redis://cache:6380/2", config.redis_url);
        assert_eq!("orders", config.key_prefix);
    }
}
