use std::{env, net::SocketAddr, str::FromStr};

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_MENU_HOST: &str = "https://nutrition.umd.edu";
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_DAYS: u32 = 7;
pub const DEFAULT_FIRESTORE_PROJECT: &str = "umd-menu";

/// Which backend persists the fetched meal documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Firestore,
    Memory,
    File(String),
}

impl StoreKind {
    fn from_var(value: Option<&str>) -> Self {
        match value {
            Some(":firestore:") => Self::Firestore,
            Some(":memory:") => Self::Memory,
            Some(path) => Self::File(path.to_owned()),
            None => {
                log::warn!("env var STORE not set, using ad-hoc memory store.");
                Self::Memory
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub menu_host: Url,
    pub workers: usize,
    pub days: u32,
    pub fail_fast: bool,
    pub store: StoreKind,
    pub firestore_project: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so tests don't have to touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let addr = SocketAddr::from_str(&format!("{host}:{port}"))
            .map_err(|e| Error::config_error(format!("invalid listen address {host}:{port}: {e}")))?;

        let menu_host = lookup("MENU_HOST").unwrap_or_else(|| DEFAULT_MENU_HOST.to_string());
        let menu_host = Url::parse(&menu_host)?;

        let workers = parse_positive(lookup("WORKERS"), "WORKERS", DEFAULT_WORKERS)?;
        let days = parse_positive(lookup("DAYS"), "DAYS", DEFAULT_DAYS)?;

        let fail_fast = matches!(
            lookup("FAIL_FAST").as_deref().map(str::trim),
            Some("1" | "true" | "TRUE" | "yes")
        );

        Ok(Self {
            addr,
            menu_host,
            workers,
            days,
            fail_fast,
            store: StoreKind::from_var(lookup("STORE").as_deref()),
            firestore_project: lookup("FIRESTORE_PROJECT")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_PROJECT.to_string()),
        })
    }
}

fn parse_positive<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(Error::config_error(format!(
            "{key} must be a positive integer, got {value:?}"
        ))),
    }
}
