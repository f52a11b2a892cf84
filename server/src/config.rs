use std::path::PathBuf;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_DATA_PATH: &str = "data/companies.json";
pub const DEFAULT_STATIC_DIR: &str = "client/dist";
pub const API_CACHE_CONTROL: &str = "public, max-age=60";

pub fn server_port() -> u16 {
    std::env::var("TECHMAP_PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// JSON array of organization records loaded at startup.
pub fn data_path() -> PathBuf {
    non_empty_var("TECHMAP_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

/// Built client bundle served for every non-API path.
pub fn static_dir() -> PathBuf {
    non_empty_var("TECHMAP_STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
