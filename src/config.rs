use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use url::Url;

/// Process-wide configuration, resolved once on first access.
///
/// Sources, later ones winning: built-in defaults, `config.toml`,
/// `HOMEMATCH_*` environment variables (nested keys split on `__`).
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|e| panic!("invalid configuration: {e}"))
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub service_key: String,
    pub storage_dir: PathBuf,
    pub public_base_url: Url,
    pub avatar_max_bytes: usize,
    pub feed_page_size: u32,
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub requests_per_second: u32,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:homematch.sqlite".to_string(),
            loglevel: "info".to_string(),
            jwt_secret: String::new(),
            jwt_audience: Some("authenticated".to_string()),
            service_key: String::new(),
            storage_dir: PathBuf::from("storage"),
            public_base_url: Url::parse("http://localhost:8000").expect("static url"),
            avatar_max_bytes: 5 * 1024 * 1024,
            feed_page_size: 20,
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://nominatim.openstreetmap.org").expect("static url"),
            user_agent: concat!("homematch/", env!("CARGO_PKG_VERSION")).to_string(),
            requests_per_second: 1,
            timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("HOMEMATCH_").split("__"))
            .extract()
    }

    /// Public URL for a file stored under `storage_dir`.
    pub fn storage_url(&self, relative: &str) -> String {
        let base = self.public_base_url.as_str().trim_end_matches('/');
        format!("{base}/storage/{}", relative.trim_start_matches('/'))
    }
}
