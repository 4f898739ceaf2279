use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://aip.baidubce.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const APP_DIR_NAME: &str = "invoice-ocr";

/// Runtime settings resolved from the environment (and `.env` files).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub api_base: String,
    pub timeout: Duration,
}

impl AppConfig {
    /// Reads the working-directory `.env`, then `<data_dir>/.env`. Variables that
    /// are already set are never overwritten, so the process environment wins.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        let data_dir = data_dir_from_env();
        let env_path = data_dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }

        let api_base = std::env::var("INVOICE_OCR_API_BASE")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = std::env::var("INVOICE_OCR_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            data_dir,
            api_base,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn settings_db_path(&self) -> PathBuf {
        self.data_dir.join("settings.db")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn data_dir_from_env() -> PathBuf {
    std::env::var("INVOICE_OCR_DATA_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_data_dir)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
