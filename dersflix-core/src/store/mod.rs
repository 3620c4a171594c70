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

//! Persistence seams. The application layer only ever talks to these traits.

use serde::{Deserialize, Serialize};

use crate::{errors::{LibraryError, ObjectKind, Result}, types::{Account, OwnerId, SiteSettings, Video}};

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

pub trait VideoRepository: Send + Sync {
    /// All videos of one owner, in creation order
    fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Video>>;
    fn get(&self, id: &str) -> Result<Option<Video>>;
    fn create(&self, video: Video) -> Result<()>;
    /// Replaces the stored video with the same id
    fn update(&self, video: Video) -> Result<()>;
    /// Looks up, changes and stores a video under a single write lock.
    /// Nothing is stored if `change` fails.
    fn modify(&self, id: &str, change: &mut dyn FnMut(&mut Video) -> Result<()>) -> Result<Video>;
    fn delete(&self, id: &str) -> Result<()>;
    fn count(&self) -> Result<usize>;
}

pub trait SettingsRepository: Send + Sync {
    /// Returns the defaults if nothing was ever saved
    fn load(&self) -> Result<SiteSettings>;
    fn save(&self, settings: SiteSettings) -> Result<()>;
}

pub trait AccountRepository: Send + Sync {
    /// `email` must already be normalized
    fn find_by_email(&self, email: &str) -> Result<Option<Account>>;
    fn insert(&self, account: Account) -> Result<()>;
}

/// Everything a store holds, also the on-disk layout of [`JsonFileStore`]
#[derive(Serialize, Deserialize, Clone, Default, Debug)]
#[serde(default)]
pub struct StoreData {
    pub videos: Vec<Video>,
    pub settings: Option<SiteSettings>,
    pub accounts: Vec<Account>,
}

impl StoreData {
    fn position(&self, id: &str) -> Option<usize> {
        self.videos.iter().position(|v| v.id == id)
    }

    pub fn list_by_owner(&self, owner: &OwnerId) -> Vec<Video> {
        self.videos.iter()
            .filter(|v| &v.owner == owner)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Video> {
        self.position(id).map(|i| self.videos[i].clone())
    }

    pub fn create(&mut self, video: Video) -> Result<()> {
        if self.position(&video.id).is_some() {
            return Err(LibraryError::conflict(ObjectKind::Video, video.id));
        }
        self.videos.push(video);
        Ok(())
    }

    pub fn update(&mut self, video: Video) -> Result<()> {
        let i = self.position(&video.id).ok_or_else(|| LibraryError::not_found(ObjectKind::Video, video.id.as_str()))?;
        self.videos[i] = video;
        Ok(())
    }

    pub fn modify(&mut self, id: &str, change: &mut dyn FnMut(&mut Video) -> Result<()>) -> Result<Video> {
        let i = self.position(id).ok_or_else(|| LibraryError::not_found(ObjectKind::Video, id))?;
        let mut video = self.videos[i].clone();
        change(&mut video)?;
        self.videos[i] = video.clone();
        Ok(video)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let i = self.position(id).ok_or_else(|| LibraryError::not_found(ObjectKind::Video, id))?;
        self.videos.remove(i);
        Ok(())
    }

    pub fn find_account(&self, email: &str) -> Option<Account> {
        self.accounts.iter().find(|a| a.email == email).cloned()
    }

    pub fn insert_account(&mut self, account: Account) -> Result<()> {
        if self.accounts.iter().any(|a| a.email == account.email) {
            return Err(LibraryError::EmailTaken);
        }
        self.accounts.push(account);
        Ok(())
    }
}
