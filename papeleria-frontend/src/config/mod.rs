use papeleria_core::config::ObservabilitySettings;
use papeleria_core::error::AppError;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub api: ApiSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// Root of the remote REST API, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize, Clone, Debug)]
pub struct SessionSettings {
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: i64,
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            expiry_hours: default_expiry_hours(),
            secure_cookie: false,
        }
    }
}

fn default_expiry_hours() -> i64 {
    24
}

#[derive(Deserialize, Clone, Debug)]
pub struct DashboardSettings {
    #[serde(default = "default_top_products")]
    pub top_products: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            top_products: default_top_products(),
        }
    }
}

fn default_top_products() -> usize {
    5
}

impl Settings {
    /// Settings for tests and embedding: everything defaulted except the API root.
    pub fn for_api(base_url: impl Into<String>) -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            api: ApiSettings {
                base_url: base_url.into(),
                timeout_secs: default_timeout_secs(),
            },
            session: SessionSettings::default(),
            observability: ObservabilitySettings::default(),
            dashboard: DashboardSettings::default(),
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;

    // Works from the workspace root and from the crate directory.
    let configuration_directory = if base_path.ends_with("papeleria-frontend") {
        base_path.join("config")
    } else {
        base_path.join("papeleria-frontend").join("config")
    };

    papeleria_core::config::load(&configuration_directory)
}
