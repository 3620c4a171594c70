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

use std::{fs::{self, File}, io::{self, BufReader, BufWriter, Write}, path::{Path, PathBuf}, sync::RwLock};

use cloneable_errors::{ErrContext, ResContext};
use log::{info, warn};

use crate::{errors::{Result, LIBRARY_READ_ERR, LIBRARY_WRITE_ERR}, types::{Account, OwnerId, SiteSettings, Video}};

use super::{AccountRepository, SettingsRepository, StoreData, VideoRepository};

/// A store backed by a single JSON document, rewritten after every change
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl JsonFileStore {
    /// Loads the store from `path`. A missing file is treated as an empty store.
    pub fn open(path: &Path) -> Result<JsonFileStore> {
        let data = match File::open(path) {
            Ok(file) => {
                let data: StoreData = serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("Failed to deserialize contents of {}", path.display()))?;
                info!("Loaded {} videos and {} accounts from {}", data.videos.len(), data.accounts.len(), path.display());
                data
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("{} does not exist yet, starting with an empty store", path.display());
                StoreData::default()
            },
            Err(e) => return Err(e.context(format!("Failed to open {}", path.display())).into()),
        };
        Ok(JsonFileStore { path: path.to_owned(), data: RwLock::new(data) })
    }

    fn persist(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, data).context("Failed to serialize the store")?;
            writer.flush().with_context(|| format!("Failed to write {}", tmp_path.display()))?;
            writer.get_ref().sync_all().with_context(|| format!("Failed to sync {} to disk", tmp_path.display()))?;
        }
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&StoreData) -> T) -> Result<T> {
        let data = self.data.read().map_err(|_| LIBRARY_READ_ERR.clone())?;
        Ok(f(&data))
    }

    /// Applies `f` to a copy of the data, which only replaces the live data once it is on disk
    fn write<T>(&self, f: impl FnOnce(&mut StoreData) -> Result<T>) -> Result<T> {
        let mut data = self.data.write().map_err(|_| LIBRARY_WRITE_ERR.clone())?;
        let mut next = data.clone();
        let output = f(&mut next)?;
        self.persist(&next)?;
        *data = next;
        Ok(output)
    }
}

impl VideoRepository for JsonFileStore {
    fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Video>> {
        self.read(|d| d.list_by_owner(owner))
    }

    fn get(&self, id: &str) -> Result<Option<Video>> {
        self.read(|d| d.get(id))
    }

    fn create(&self, video: Video) -> Result<()> {
        self.write(|d| d.create(video))
    }

    fn update(&self, video: Video) -> Result<()> {
        self.write(|d| d.update(video))
    }

    fn modify(&self, id: &str, change: &mut dyn FnMut(&mut Video) -> Result<()>) -> Result<Video> {
        self.write(|d| d.modify(id, change))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.write(|d| d.delete(id))
    }

    fn count(&self) -> Result<usize> {
        self.read(|d| d.videos.len())
    }
}

impl SettingsRepository for JsonFileStore {
    fn load(&self) -> Result<SiteSettings> {
        self.read(|d| d.settings.clone().unwrap_or_default())
    }

    fn save(&self, settings: SiteSettings) -> Result<()> {
        self.write(|d| {
            d.settings = Some(settings);
            Ok(())
        })
    }
}

impl AccountRepository for JsonFileStore {
    fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.read(|d| d.find_account(email))
    }

    fn insert(&self, account: Account) -> Result<()> {
        self.write(|d| d.insert_account(account))
    }
}
