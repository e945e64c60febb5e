// hivevlan - VLAN inventory across hive switch-management APIs
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::aggregate::SortMode;
use crate::hives::{DEFAULT_HIVE, HiveId, default_fleet};
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// `{hive}` is replaced with the hive ID.
pub const DEFAULT_API_URL: &str =
    "https://api.hive{hive}.mass.systems/{hive}/bridge-domain-vlans/vlans=0/bulk";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const USER_ENV: &str = "API_USER";
pub const PASSWORD_ENV: &str = "API_PASSWORD";

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    pub default_hive: Option<String>,
    pub sort_by: Option<String>,
    pub fleet: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("could not locate a config directory for the current user")]
    MissingConfigDir,
    #[error("unsupported sort mode `{0}`; expected `vlan_name` or `vlan_id`")]
    UnsupportedSortMode(String),
    #[error("`fleet` must list at least one hive")]
    EmptyFleet,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    /// Unset variables become empty strings; the hive rejects them.
    pub fn from_env() -> Self {
        Self {
            user: env::var(USER_ENV).unwrap_or_default(),
            password: env::var(PASSWORD_ENV).unwrap_or_default(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug)]
pub struct EffectiveConfig {
    pub api_url: String,
    pub default_hive: HiveId,
    pub sort_by: SortMode,
    pub fleet: Vec<HiveId>,
    pub timeout: Duration,
    pub credentials: Credentials,
}

pub fn config_path(scope: Scope, cwd: &Path) -> Result<PathBuf> {
    match scope {
        Scope::Local => Ok(cwd.join(".hivevlan.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var("HIVEVLAN_CONFIG_DIR") {
                return Ok(PathBuf::from(custom).join("config.yaml"));
            }
            let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
            Ok(base.join("hivevlan").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = read_if_exists(&config_path(Scope::User, cwd)?)?.unwrap_or_default();
    let local = read_if_exists(&config_path(Scope::Local, cwd)?)?.unwrap_or_default();
    Ok(merge(user, local))
}

pub fn resolve(cwd: &Path, api_url_override: Option<String>) -> Result<EffectiveConfig> {
    let mut merged = load(cwd)?;

    if let Some(url) = api_url_override {
        merged.api_url = Some(url);
    }

    let sort_by = match merged.sort_by.as_deref() {
        Some(raw) => raw.trim().parse::<SortMode>()?,
        None => SortMode::VlanName,
    };

    let fleet = match merged.fleet {
        Some(fleet) if fleet.is_empty() => return Err(ConfigError::EmptyFleet.into()),
        Some(fleet) => fleet,
        None => default_fleet(),
    };

    Ok(EffectiveConfig {
        api_url: merged
            .api_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        default_hive: merged
            .default_hive
            .unwrap_or_else(|| DEFAULT_HIVE.to_string()),
        sort_by,
        fleet,
        timeout: Duration::from_secs(merged.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        credentials: Credentials::from_env(),
    })
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

fn merge(user: Config, local: Config) -> Config {
    Config {
        api_url: local.api_url.or(user.api_url),
        default_hive: local.default_hive.or(user.default_hive),
        sort_by: local.sort_by.or(user.sort_by),
        fleet: local.fleet.or(user.fleet),
        timeout_secs: local.timeout_secs.or(user.timeout_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use tempfile::{TempDir, tempdir};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn isolated() -> (MutexGuard<'static, ()>, TempDir) {
        let guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let cwd = tempdir().unwrap();
        unsafe {
            env::set_var("HIVEVLAN_CONFIG_DIR", cwd.path().join("config"));
            env::remove_var(USER_ENV);
            env::remove_var(PASSWORD_ENV);
        }
        fs::create_dir_all(cwd.path().join("config")).unwrap();
        (guard, cwd)
    }

    #[test]
    fn defaults_without_config_files() {
        let (_guard, cwd) = isolated();
        let effective = resolve(cwd.path(), None).unwrap();
        assert_eq!(effective.api_url, DEFAULT_API_URL);
        assert_eq!(effective.default_hive, "205");
        assert_eq!(effective.sort_by, SortMode::VlanName);
        assert_eq!(effective.fleet.len(), 21);
        assert_eq!(effective.timeout, Duration::from_secs(30));
        assert_eq!(effective.credentials, Credentials::default());
    }

    #[test]
    fn local_file_wins_over_user_file_and_flag_wins_over_both() {
        let (_guard, cwd) = isolated();
        fs::write(
            cwd.path().join("config").join("config.yaml"),
            "api_url: https://user.test/{hive}\ndefault_hive: \"210\"\nsort_by: vlan_id\ntimeout_secs: 5\n",
        )
        .unwrap();
        fs::write(
            cwd.path().join(".hivevlan.yaml"),
            "api_url: https://local.test/{hive}\nfleet: [\"1\", \"2\"]\n",
        )
        .unwrap();

        let effective = resolve(cwd.path(), None).unwrap();
        assert_eq!(effective.api_url, "https://local.test/{hive}");
        assert_eq!(effective.default_hive, "210");
        assert_eq!(effective.sort_by, SortMode::VlanId);
        assert_eq!(effective.fleet, vec!["1", "2"]);
        assert_eq!(effective.timeout, Duration::from_secs(5));

        let overridden = resolve(cwd.path(), Some("http://flag.test/{hive}".into())).unwrap();
        assert_eq!(overridden.api_url, "http://flag.test/{hive}");
    }

    #[test]
    fn rejects_unknown_sort_mode() {
        let (_guard, cwd) = isolated();
        fs::write(cwd.path().join(".hivevlan.yaml"), "sort_by: vlan_ip\n").unwrap();
        let err = resolve(cwd.path(), None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::UnsupportedSortMode("vlan_ip".into()))
        );
    }

    #[test]
    fn rejects_empty_fleet() {
        let (_guard, cwd) = isolated();
        fs::write(cwd.path().join(".hivevlan.yaml"), "fleet: []\n").unwrap();
        let err = resolve(cwd.path(), None).unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::EmptyFleet));
    }

    #[test]
    fn malformed_file_reports_path() {
        let (_guard, cwd) = isolated();
        fs::write(cwd.path().join(".hivevlan.yaml"), "fleet: {not: [a list\n").unwrap();
        let err = resolve(cwd.path(), None).unwrap_err();
        assert!(err.to_string().contains(".hivevlan.yaml"));
    }

    #[test]
    fn reads_credentials_from_env_and_masks_password() {
        let (_guard, cwd) = isolated();
        unsafe {
            env::set_var(USER_ENV, "netops");
            env::set_var(PASSWORD_ENV, "s3cret");
        }
        let effective = resolve(cwd.path(), None).unwrap();
        assert_eq!(effective.credentials.user, "netops");
        assert_eq!(effective.credentials.password, "s3cret");
        let debug = format!("{:?}", effective.credentials);
        assert!(debug.contains("netops"));
        assert!(!debug.contains("s3cret"));
        unsafe {
            env::remove_var(USER_ENV);
            env::remove_var(PASSWORD_ENV);
        }
    }
}
