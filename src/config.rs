use anyhow::{bail, Context};

use crate::auth::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

const MIN_KEY_LEN: usize = 32;

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub frontend_url: Option<String>,
    pub enable_hsts: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Token keys are read by `auth` on use; here they are only checked.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        for var in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            match get(var) {
                None => missing.push(var),
                Some(v) if v.len() < MIN_KEY_LEN => bail!("{var} must be at least {MIN_KEY_LEN} characters long"),
                Some(_) => {}
            }
        }
        if !missing.is_empty() {
            bail!("missing required environment variables: {missing:?}");
        }
        if let Some(age) = get("ACCESS_TOKEN_AGE") {
            age.parse::<i64>().with_context(|| format!("ACCESS_TOKEN_AGE is not a number: {age}"))?;
        }

        let port = match get("PORT") {
            Some(p) => p.parse().with_context(|| format!("PORT is not a valid port: {p}"))?,
            None => 5000,
        };
        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: get("DATABASE_URL").filter(|s| !s.is_empty()),
            frontend_url: get("FRONTEND_URL").filter(|s| !s.is_empty()),
            enable_hsts: get("ENABLE_HSTS").map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false),
        })
    }
}
