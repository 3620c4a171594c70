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

use std::sync::RwLock;

use crate::{errors::{Result, LIBRARY_READ_ERR, LIBRARY_WRITE_ERR}, types::{Account, OwnerId, SiteSettings, Video}};

use super::{AccountRepository, SettingsRepository, StoreData, VideoRepository};

/// A store that forgets everything once dropped
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<StoreData>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn read<T>(&self, f: impl FnOnce(&StoreData) -> T) -> Result<T> {
        let data = self.data.read().map_err(|_| LIBRARY_READ_ERR.clone())?;
        Ok(f(&data))
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreData) -> Result<T>) -> Result<T> {
        let mut data = self.data.write().map_err(|_| LIBRARY_WRITE_ERR.clone())?;
        f(&mut data)
    }
}

impl VideoRepository for MemoryStore {
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

impl SettingsRepository for MemoryStore {
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

impl AccountRepository for MemoryStore {
    fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.read(|d| d.find_account(email))
    }

    fn insert(&self, account: Account) -> Result<()> {
        self.write(|d| d.insert_account(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::LibraryError, types::Platform};

    fn video(id: &str, owner: &str) -> Video {
        Video {
            id: id.to_owned(),
            title: format!("Video {id}"),
            video_url: format!("https://vimeo.com/{id}"),
            platform: Platform::Vimeo,
            video_id: id.to_owned(),
            class: "9".to_owned(),
            subject: "Physics".to_owned(),
            owner: owner.into(),
            watched: false,
            favorite: false,
            notes: vec![],
            created_at: 0,
        }
    }

    #[test]
    fn lists_only_own_videos_in_creation_order() {
        let store = MemoryStore::new();
        store.create(video("3", "alice")).unwrap();
        store.create(video("1", "bob")).unwrap();
        store.create(video("2", "alice")).unwrap();

        let ids: Vec<_> = store.list_by_owner(&"alice".into()).unwrap().into_iter().map(|v| v.id).collect();
        assert_eq!(ids, ["3", "2"]);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn duplicate_ids_conflict() {
        let store = MemoryStore::new();
        store.create(video("1", "alice")).unwrap();
        assert!(matches!(store.create(video("1", "bob")), Err(LibraryError::Conflict { .. })));
    }

    #[test]
    fn update_and_delete_missing_videos() {
        let store = MemoryStore::new();
        assert!(matches!(store.update(video("1", "alice")), Err(LibraryError::NotFound { .. })));
        assert!(matches!(store.delete("1"), Err(LibraryError::NotFound { .. })));
    }

    #[test]
    fn update_replaces_record() {
        let store = MemoryStore::new();
        store.create(video("1", "alice")).unwrap();
        let mut changed = video("1", "alice");
        changed.watched = true;
        store.update(changed).unwrap();
        assert!(store.get("1").unwrap().unwrap().watched);
        store.delete("1").unwrap();
        assert_eq!(store.get("1").unwrap(), None);
    }

    #[test]
    fn failed_modification_keeps_the_record() {
        let store = MemoryStore::new();
        store.create(video("1", "alice")).unwrap();
        let result = store.modify("1", &mut |v| {
            v.watched = true;
            Err(LibraryError::EmptyNote)
        });
        assert!(matches!(result, Err(LibraryError::EmptyNote)));
        assert!(!store.get("1").unwrap().unwrap().watched);

        let changed = store.modify("1", &mut |v| {
            v.favorite = true;
            Ok(())
        }).unwrap();
        assert!(changed.favorite);
        assert!(store.get("1").unwrap().unwrap().favorite);
        assert!(matches!(store.modify("2", &mut |_| Ok(())), Err(LibraryError::NotFound { .. })));
    }

    #[test]
    fn settings_default_until_saved() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), SiteSettings::default());
        let custom = SiteSettings { site_name: "Lessons".to_owned(), theme_color: "#2563EB".to_owned(), updated_at: Some(1) };
        store.save(custom.clone()).unwrap();
        assert_eq!(store.load().unwrap(), custom);
    }
}
