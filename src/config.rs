use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_address")]
    pub address: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            address: default_web_address(),
            port: default_web_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SamplingConfig {
    /// Fixed seed for reproducible samples. OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_experience_mean")]
    pub experience_mean: f64,
    #[serde(default = "default_experience_std_dev")]
    pub experience_std_dev: f64,
    /// Lowest experience value ever handed out
    #[serde(default = "default_experience_floor")]
    pub experience_floor: i64,
    /// Opt-in cap on gamma rejection rounds. Unbounded when absent.
    #[serde(default)]
    pub gamma_max_iterations: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: None,
            experience_mean: default_experience_mean(),
            experience_std_dev: default_experience_std_dev(),
            experience_floor: default_experience_floor(),
            gamma_max_iterations: None,
        }
    }
}

// Default value functions
fn default_web_address() -> String { "0.0.0.0".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_experience_mean() -> f64 { 2000.0 }
fn default_experience_std_dev() -> f64 { 1000.0 }
fn default_experience_floor() -> i64 { 500 }

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config '{}': {}", path, e))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
