//! Run settings loaded via OrthoConfig.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_OUTPUT_FILE: &str = "roster.json";

fn fixture_path(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(file_name)
}

/// Default location of the roster configuration.
#[must_use]
pub fn default_config_path() -> PathBuf {
    fixture_path("roster.json")
}

/// Default location of the organizational-unit table.
#[must_use]
pub fn default_org_units_path() -> PathBuf {
    fixture_path("org_units.json")
}

/// Settings controlling a roster generation run.
///
/// Values come from CLI flags and `ROSTER_*` environment variables.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROSTER")]
pub struct RosterSettings {
    /// Roster configuration JSON path.
    pub config_path: Option<PathBuf>,
    /// Organizational-unit table JSON path.
    pub org_units_path: Option<PathBuf>,
    /// Report output path.
    pub output_path: Option<PathBuf>,
    /// RNG seed; drawn at random when absent.
    pub seed: Option<u64>,
    /// Write the report even when invariant checks fail.
    #[ortho_config(default = false)]
    pub allow_violations: bool,
}

impl RosterSettings {
    /// Return the configured configuration path, falling back to the bundled
    /// fixture.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    /// Return the configured unit table path, falling back to the bundled
    /// fixture.
    #[must_use]
    pub fn org_units_path(&self) -> PathBuf {
        self.org_units_path
            .clone()
            .unwrap_or_else(default_org_units_path)
    }

    /// Return the configured report path, falling back to `roster.json`.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for run settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> RosterSettings {
        RosterSettings::load_from_iter([OsString::from("roster-generate")])
            .expect("settings should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("ROSTER_CONFIG_PATH", None::<String>),
            ("ROSTER_ORG_UNITS_PATH", None::<String>),
            ("ROSTER_OUTPUT_PATH", None::<String>),
            ("ROSTER_SEED", None::<String>),
            ("ROSTER_ALLOW_VIOLATIONS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.allow_violations);
        assert!(settings.seed.is_none());
        assert_eq!(settings.config_path(), default_config_path());
        assert_eq!(settings.org_units_path(), default_org_units_path());
        assert_eq!(settings.output_path(), PathBuf::from(DEFAULT_OUTPUT_FILE));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ROSTER_CONFIG_PATH", Some("/tmp/roster_config.json".to_owned())),
            ("ROSTER_ORG_UNITS_PATH", Some("/tmp/units.json".to_owned())),
            ("ROSTER_OUTPUT_PATH", Some("/tmp/out.json".to_owned())),
            ("ROSTER_SEED", Some("2026".to_owned())),
            ("ROSTER_ALLOW_VIOLATIONS", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.allow_violations);
        assert_eq!(settings.seed, Some(2026));
        assert_eq!(
            settings.config_path(),
            PathBuf::from("/tmp/roster_config.json")
        );
        assert_eq!(settings.org_units_path(), PathBuf::from("/tmp/units.json"));
        assert_eq!(settings.output_path(), PathBuf::from("/tmp/out.json"));
    }
}
