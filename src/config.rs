use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Bolt URI of the sales graph (source A)
    #[serde(default = "default_graph_uri")]
    pub vgsales_uri: String,

    #[serde(default = "default_graph_user")]
    pub vgsales_user: String,

    pub vgsales_password: String,

    /// Bolt URI of the catalogue graph (source B)
    #[serde(default = "default_graph_uri")]
    pub videogames_uri: String,

    #[serde(default = "default_graph_user")]
    pub videogames_user: String,

    pub videogames_password: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Comma separated list of allowed origins, `*` for any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    /// Keep only the last observed value per attribute kind when
    /// discovering a seed game's attributes
    #[serde(default)]
    pub single_valued_attributes: bool,

    /// Rebuild the category index on this interval; 0 disables
    #[serde(default)]
    pub index_reload_hours: u64,
}

fn default_graph_uri() -> String {
    "neo4j://localhost:7687".to_string()
}

fn default_graph_user() -> String {
    "neo4j".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> String {
    "*".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Parsed CORS origins; `None` means any origin
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}
