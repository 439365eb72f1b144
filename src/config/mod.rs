mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable that supplies the TMDB API key when the file has none.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./cinedex.toml",
        "~/.config/cinedex/config.toml",
        "/etc/cinedex/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env(&mut config);
    Ok(config)
}

fn apply_env(config: &mut Config) {
    if config.tmdb.api_key.trim().is_empty() {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.tmdb.api_key = key;
        }
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    let rate = config.tmdb.requests_per_second;
    if !rate.is_finite() || rate <= 0.0 {
        anyhow::bail!("tmdb.requests_per_second must be positive, got {}", rate);
    }

    if config.scan.concurrency == 0 {
        anyhow::bail!("scan.concurrency cannot be 0");
    }

    if config.scan.extensions.is_empty() {
        anyhow::bail!("scan.extensions cannot be empty");
    }

    if config.tmdb.timeout_secs == 0 {
        anyhow::bail!("tmdb.timeout_secs cannot be 0");
    }

    for warning in config.warnings() {
        tracing::warn!("{}", warning);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.tmdb.requests_per_second, 30.0);
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.images.poster_size, "original");
        assert_eq!(config.scan.extensions, vec!["mkv"]);
        assert_eq!(config.scan.concurrency, 4);
    }

    #[test]
    fn test_partial_sections() {
        let file = write_config(
            r#"
            [tmdb]
            api_key = "abc"
            requests_per_second = 10

            [scan]
            extensions = ["mkv", "mp4"]
            "#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.tmdb.api_key, "abc");
        assert_eq!(config.tmdb.requests_per_second, 10.0);
        assert_eq!(config.tmdb.language, "en-US");
        assert_eq!(config.scan.extensions, vec!["mkv", "mp4"]);
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let file = write_config("[tmdb]\nrequests_per_second = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("requests_per_second"));
    }

    #[test]
    fn test_rejects_zero_concurrency_and_empty_extensions() {
        let file = write_config("[scan]\nconcurrency = 0\n");
        assert!(load_config(file.path()).is_err());

        let file = write_config("[scan]\nextensions = []\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml_has_context() {
        let file = write_config("[tmdb\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    #[serial]
    fn test_api_key_from_environment() {
        std::env::set_var(API_KEY_ENV, "from-env");
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        std::env::remove_var(API_KEY_ENV);

        assert_eq!(config.tmdb.api_key, "from-env");
    }

    #[test]
    #[serial]
    fn test_file_key_wins_over_environment() {
        std::env::set_var(API_KEY_ENV, "from-env");
        let file = write_config("[tmdb]\napi_key = \"from-file\"\n");
        let config = load_config(file.path()).unwrap();
        std::env::remove_var(API_KEY_ENV);

        assert_eq!(config.tmdb.api_key, "from-file");
    }

    #[test]
    #[serial]
    fn test_missing_key_is_a_warning() {
        std::env::remove_var(API_KEY_ENV);
        let config = Config::default();
        assert_eq!(config.warnings().len(), 1);
    }
}
