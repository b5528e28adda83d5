use std::path::{Path, PathBuf};

use tracing::debug;

pub const HOTELS_FILE: &str = "hotels.json";
pub const CUSTOMERS_FILE: &str = "customers.json";
pub const RESERVATIONS_FILE: &str = "reservations.json";

pub const HOTELS_FILE_ENV: &str = "RESERVATIONS_HOTELS_FILE";
pub const CUSTOMERS_FILE_ENV: &str = "RESERVATIONS_CUSTOMERS_FILE";
pub const RESERVATIONS_FILE_ENV: &str = "RESERVATIONS_RESERVATIONS_FILE";

// Locations of the three backing files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    pub hotels_path: PathBuf,
    pub customers_path: PathBuf,
    pub reservations_path: PathBuf,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl SystemConfig {
    /// Uses the default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            hotels_path: dir.join(HOTELS_FILE),
            customers_path: dir.join(CUSTOMERS_FILE),
            reservations_path: dir.join(RESERVATIONS_FILE),
        }
    }

    /// Replaces individual paths with values found through `lookup`.
    /// Empty values are ignored.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets = [
            (HOTELS_FILE_ENV, &mut self.hotels_path),
            (CUSTOMERS_FILE_ENV, &mut self.customers_path),
            (RESERVATIONS_FILE_ENV, &mut self.reservations_path),
        ];

        for (key, slot) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                debug!(key, path = %value, "overriding backing file");
                *slot = PathBuf::from(value);
            }
        }
        self
    }

    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_in_dir_uses_default_names() {
        let config = SystemConfig::in_dir("/data");
        assert_eq!(config.hotels_path, PathBuf::from("/data/hotels.json"));
        assert_eq!(config.customers_path, PathBuf::from("/data/customers.json"));
        assert_eq!(
            config.reservations_path,
            PathBuf::from("/data/reservations.json")
        );
    }

    #[test]
    fn test_overrides_replace_only_given_paths() {
        let vars: HashMap<&str, &str> = [
            (HOTELS_FILE_ENV, "/elsewhere/h.json"),
            (CUSTOMERS_FILE_ENV, "  "),
        ]
        .into_iter()
        .collect();

        let config = SystemConfig::in_dir("/data")
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.hotels_path, PathBuf::from("/elsewhere/h.json"));
        assert_eq!(config.customers_path, PathBuf::from("/data/customers.json"));
        assert_eq!(
            config.reservations_path,
            PathBuf::from("/data/reservations.json")
        );
    }
}
