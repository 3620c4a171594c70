/* This file is part of the DERSFLIX project
*
*  Copyright (C) 2025-2026 The DERSFLIX contributors
*  
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::{path::PathBuf, sync::Arc, time::Duration};

use actix_web::web;
use chrono::{DateTime, Utc};
use dersflix_core::{store::{AccountRepository, SettingsRepository, VideoRepository}, Library, LocalIdentity};
use serde::{Deserialize, Serialize};

pub type StateData = web::Data<AppState>;

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JSON file holding videos, accounts and site settings
    pub data_path: PathBuf,
    pub static_content_path: PathBuf,
    pub listen: ListenConfig,
    pub enable_timings_header: bool,
    /// Sessions are forgotten this many hours after login
    pub session_ttl_hours: u64,
    #[serde(skip)]
    pub startup_timestamp: DateTime<Utc>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data/dersflix.json"),
            static_content_path: PathBuf::from("./static"),
            listen: ListenConfig::default(),
            enable_timings_header: false,
            session_ttl_hours: 7 * 24,
            startup_timestamp: Utc::now(),
        }
    }
}

impl AppConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_hours.saturating_mul(60 * 60))
    }
}

#[derive(Serialize, Deserialize)]
pub struct ListenConfig {
    pub tcp: Option<(String, u16)>,
    pub unix: Option<String>,
    pub unix_mode: Option<u32>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            tcp: Some(("0.0.0.0".to_owned(), 9393)),
            unix: None,
            unix_mode: None,
        }
    }
}

pub struct AppState {
    pub library: Library,
    pub identity: LocalIdentity,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, session_ttl: Duration) -> AppState
    where
        S: VideoRepository + SettingsRepository + AccountRepository + 'static,
    {
        AppState {
            library: Library::new(store.clone(), store.clone()),
            identity: LocalIdentity::with_ttl(store, session_ttl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig = toml::from_str("enable_timings_header = true\n").unwrap();
        assert!(config.enable_timings_header);
        assert_eq!(config.data_path, PathBuf::from("./data/dersflix.json"));
        assert_eq!(config.listen.tcp, Some(("0.0.0.0".to_owned(), 9393)));
        assert_eq!(config.session_ttl(), Duration::from_secs(7 * 24 * 60 * 60));
    }

    #[test]
    fn session_ttl_is_read_in_hours() {
        let config: AppConfig = toml::from_str("session_ttl_hours = 2\n").unwrap();
        assert_eq!(config.session_ttl(), Duration::from_secs(2 * 60 * 60));
        let config = AppConfig { session_ttl_hours: u64::MAX, ..AppConfig::default() };
        assert_eq!(config.session_ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn default_config_serializes() {
        let serialized = toml::to_string(&AppConfig::default()).unwrap();
        let config: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(config.static_content_path, PathBuf::from("./static"));
        assert!(config.listen.unix.is_none());
    }
}
