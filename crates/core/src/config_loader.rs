use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging the TOML file with
    /// `TRADECYCLE_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TRADECYCLE_"))
            .extract()?;

        Ok(config)
    }

    /// Loads application configuration with a profile overlay
    /// (`Config.{profile}.toml` next to the base file).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(path: &str, profile: &str) -> Result<AppConfig> {
        let overlay = profile_path(path, profile);
        let config: AppConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Toml::file(overlay))
            .merge(Env::prefixed("TRADECYCLE_"))
            .extract()?;

        Ok(config)
    }
}

fn profile_path(path: &str, profile: &str) -> String {
    match path.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}.{profile}.{ext}"),
        None => format!("{path}.{profile}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_path_inserts_before_extension() {
        assert_eq!(
            profile_path("config/Config.toml", "prod"),
            "config/Config.prod.toml"
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load("does-not-exist.toml").unwrap();
            assert!(config.trading.paper_trading);
            Ok(())
        });
    }

    #[test]
    fn toml_values_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [trading]
                paper_trading = false
                pairs = ["SOL_USDT"]

                [risk]
                max_open_positions = 3
                "#,
            )?;
            let config = ConfigLoader::load("Config.toml").unwrap();
            assert!(!config.trading.paper_trading);
            assert_eq!(config.trading.pairs, vec!["SOL_USDT".to_string()]);
            assert_eq!(config.risk.max_open_positions, 3);
            Ok(())
        });
    }
}
