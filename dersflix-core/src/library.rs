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

use std::sync::{Arc, LazyLock};

use log::{debug, info};
use regex::Regex;

use crate::{
    errors::{LibraryError, ObjectKind, Result},
    normalize::normalize,
    resolver::{render_directive, thumbnail_url, PlayDirective},
    session::Session,
    store::{SettingsRepository, VideoRepository},
    types::{FilterOptions, NewVideo, Note, SiteSettings, Video, VideoFilter, VideoUpdate},
};

static THEME_COLOR: LazyLock<Regex> = LazyLock::new(|| Regex::new("^#[0-9A-Fa-f]{6}$").expect("theme color regex should be valid"));

fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(LibraryError::MissingField(field))
    } else {
        Ok(value.to_owned())
    }
}

fn push_distinct(labels: &mut Vec<String>, label: &str) {
    if !labels.iter().any(|l| l == label) {
        labels.push(label.to_owned());
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Owner-scoped operations on a user's video library
pub struct Library {
    videos: Arc<dyn VideoRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl Library {
    pub fn new(videos: Arc<dyn VideoRepository>, settings: Arc<dyn SettingsRepository>) -> Library {
        Library { videos, settings }
    }

    /// Foreign videos are reported as missing, same as videos that don't exist
    fn owned(&self, session: &Session, id: &str) -> Result<Video> {
        match self.videos.get(id)? {
            Some(video) if &video.owner == session.owner() => Ok(video),
            _ => Err(LibraryError::not_found(ObjectKind::Video, id)),
        }
    }

    /// Runs `f` on an owned video inside the repository's write lock
    fn modify<F>(&self, session: &Session, id: &str, mut f: F) -> Result<Video>
    where
        F: FnMut(&mut Video) -> Result<()>,
    {
        self.videos.modify(id, &mut |video| {
            if &video.owner != session.owner() {
                return Err(LibraryError::not_found(ObjectKind::Video, id));
            }
            f(video)
        })
    }

    pub fn add_video(&self, session: &Session, new: NewVideo) -> Result<Video> {
        let title = required("title", &new.title)?;
        let class = required("class", &new.class)?;
        let subject = required("subject", &new.subject)?;
        let video_ref = normalize(new.video_url.trim())?;
        let video = Video {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            video_url: new.video_url.trim().to_owned(),
            platform: video_ref.platform,
            video_id: video_ref.identifier,
            class,
            subject,
            owner: session.owner().clone(),
            watched: false,
            favorite: false,
            notes: Vec::new(),
            created_at: now_millis(),
        };
        self.videos.create(video.clone())?;
        info!("Added {} video {} for {}", video.platform, video.id, video.owner);
        Ok(video)
    }

    pub fn list_videos(&self, session: &Session, filter: &VideoFilter) -> Result<Vec<Video>> {
        let mut videos = self.videos.list_by_owner(session.owner())?;
        videos.retain(|v| filter.matches(v));
        Ok(videos)
    }

    pub fn filter_options(&self, session: &Session) -> Result<FilterOptions> {
        let mut options = FilterOptions::default();
        for video in self.videos.list_by_owner(session.owner())? {
            push_distinct(&mut options.classes, &video.class);
            push_distinct(&mut options.subjects, &video.subject);
        }
        Ok(options)
    }

    pub fn get_video(&self, session: &Session, id: &str) -> Result<Video> {
        self.owned(session, id)
    }

    pub fn update_video(&self, session: &Session, id: &str, update: VideoUpdate) -> Result<Video> {
        self.modify(session, id, |video| {
            if let Some(ref title) = update.title {
                video.title = required("title", title)?;
            }
            if let Some(ref class) = update.class {
                video.class = required("class", class)?;
            }
            if let Some(ref subject) = update.subject {
                video.subject = required("subject", subject)?;
            }
            if let Some(watched) = update.watched {
                video.watched = watched;
            }
            if let Some(favorite) = update.favorite {
                video.favorite = favorite;
            }
            Ok(())
        })
    }

    pub fn toggle_watched(&self, session: &Session, id: &str) -> Result<Video> {
        self.modify(session, id, |video| {
            video.watched = !video.watched;
            Ok(())
        })
    }

    pub fn toggle_favorite(&self, session: &Session, id: &str) -> Result<Video> {
        self.modify(session, id, |video| {
            video.favorite = !video.favorite;
            Ok(())
        })
    }

    pub fn delete_video(&self, session: &Session, id: &str) -> Result<()> {
        let video = self.owned(session, id)?;
        self.videos.delete(&video.id)?;
        info!("Deleted video {} of {}", video.id, video.owner);
        Ok(())
    }

    pub fn add_note(&self, session: &Session, video_id: &str, text: &str) -> Result<Note> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LibraryError::EmptyNote);
        }
        let note = Note {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_owned(),
            completed: false,
        };
        self.modify(session, video_id, |video| {
            video.notes.push(note.clone());
            Ok(())
        })?;
        Ok(note)
    }

    pub fn toggle_note(&self, session: &Session, video_id: &str, note_id: &str) -> Result<Note> {
        let video = self.modify(session, video_id, |video| {
            let note = video.notes.iter_mut()
                .find(|n| n.id == note_id)
                .ok_or_else(|| LibraryError::not_found(ObjectKind::Note, note_id))?;
            note.completed = !note.completed;
            Ok(())
        })?;
        video.note(note_id)
            .cloned()
            .ok_or_else(|| LibraryError::not_found(ObjectKind::Note, note_id))
    }

    pub fn delete_note(&self, session: &Session, video_id: &str, note_id: &str) -> Result<()> {
        self.modify(session, video_id, |video| {
            let before = video.notes.len();
            video.notes.retain(|n| n.id != note_id);
            if video.notes.len() == before {
                return Err(LibraryError::not_found(ObjectKind::Note, note_id));
            }
            Ok(())
        })?;
        Ok(())
    }

    pub fn video_count(&self) -> Result<usize> {
        self.videos.count()
    }

    pub fn settings(&self) -> Result<SiteSettings> {
        self.settings.load()
    }

    pub fn update_settings(&self, session: &Session, site_name: &str, theme_color: &str) -> Result<SiteSettings> {
        let site_name = required("site_name", site_name)?;
        let theme_color = theme_color.trim();
        if !THEME_COLOR.is_match(theme_color) {
            return Err(LibraryError::InvalidThemeColor(theme_color.to_owned()));
        }
        let settings = SiteSettings {
            site_name,
            theme_color: theme_color.to_owned(),
            updated_at: Some(now_millis()),
        };
        self.settings.save(settings.clone())?;
        debug!("Site settings updated by {}", session.owner());
        Ok(settings)
    }

    pub fn thumbnail_for(video: &Video) -> String {
        thumbnail_url(video.platform, &video.video_id)
    }

    pub fn directive_for(video: &Video) -> PlayDirective {
        render_directive(video.platform, &video.video_id, &video.video_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::{IdentityProvider, LocalIdentity}, store::MemoryStore, types::Platform};

    struct Fixture {
        store: Arc<MemoryStore>,
        library: Library,
        identity: LocalIdentity,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            library: Library::new(store.clone(), store.clone()),
            identity: LocalIdentity::new(store.clone()),
            store,
        }
    }

    fn lecture(title: &str, url: &str, class: &str, subject: &str) -> NewVideo {
        NewVideo {
            title: title.to_owned(),
            video_url: url.to_owned(),
            class: class.to_owned(),
            subject: subject.to_owned(),
        }
    }

    #[test]
    fn add_video_normalizes_the_link() {
        let f = fixture();
        let alice = f.identity.register("alice@example.com", "password").unwrap();
        let video = f.library.add_video(&alice, lecture(" Limits ", "https://www.youtube.com/watch?v=abc123", "12", "Math")).unwrap();

        assert_eq!(video.title, "Limits");
        assert_eq!(video.platform, Platform::YouTube);
        assert_eq!(video.video_id, "abc123");
        assert_eq!(&video.owner, alice.owner());
        assert!(!video.watched && !video.favorite && video.notes.is_empty());
        assert_eq!(Library::thumbnail_for(&video), "https://img.youtube.com/vi/abc123/maxresdefault.jpg");
        assert_eq!(Library::directive_for(&video), PlayDirective::StructuredPlayer("https://www.youtube.com/watch?v=abc123".to_owned()));
    }

    #[test]
    fn rejected_input_is_not_stored() {
        let f = fixture();
        let alice = f.identity.register("alice@example.com", "password").unwrap();
        assert!(matches!(
            f.library.add_video(&alice, lecture("x", "not a url at all", "12", "Math")),
            Err(LibraryError::InvalidUrl)
        ));
        assert!(matches!(
            f.library.add_video(&alice, lecture("x", "https://vimeo.com/1", "  ", "Math")),
            Err(LibraryError::MissingField("class"))
        ));
        assert_eq!(f.store.count().unwrap(), 0);
    }

    #[test]
    fn listing_is_scoped_and_filtered() {
        let f = fixture();
        let alice = f.identity.register("alice@example.com", "password").unwrap();
        let bob = f.identity.register("bob@example.com", "password").unwrap();
        f.library.add_video(&alice, lecture("a", "https://vimeo.com/1", "11", "Physics")).unwrap();
        f.library.add_video(&alice, lecture("b", "https://vimeo.com/2", "12", "Math")).unwrap();
        f.library.add_video(&alice, lecture("c", "https://vimeo.com/3", "12", "Physics")).unwrap();
        f.library.add_video(&bob, lecture("d", "https://vimeo.com/4", "12", "Math")).unwrap();

        let all = f.library.list_videos(&alice, &VideoFilter::default()).unwrap();
        assert_eq!(all.iter().map(|v| v.title.as_str()).collect::<Vec<_>>(), ["a", "b", "c"]);

        let filter = VideoFilter { class: Some("12".to_owned()), subject: Some("all".to_owned()) };
        let twelfth = f.library.list_videos(&alice, &filter).unwrap();
        assert_eq!(twelfth.iter().map(|v| v.title.as_str()).collect::<Vec<_>>(), ["b", "c"]);

        let options = f.library.filter_options(&alice).unwrap();
        assert_eq!(options.classes, ["11", "12"]);
        assert_eq!(options.subjects, ["Physics", "Math"]);
    }

    #[test]
    fn foreign_videos_look_missing() {
        let f = fixture();
        let alice = f.identity.register("alice@example.com", "password").unwrap();
        let bob = f.identity.register("bob@example.com", "password").unwrap();
        let video = f.library.add_video(&alice, lecture("a", "https://vimeo.com/1", "11", "Physics")).unwrap();

        assert!(matches!(f.library.get_video(&bob, &video.id), Err(LibraryError::NotFound { kind: ObjectKind::Video, .. })));
        assert!(matches!(f.library.toggle_watched(&bob, &video.id), Err(LibraryError::NotFound { .. })));
        assert!(matches!(f.library.delete_video(&bob, &video.id), Err(LibraryError::NotFound { .. })));
        assert!(!f.library.get_video(&alice, &video.id).unwrap().watched);
    }

    #[test]
    fn flags_and_updates() {
        let f = fixture();
        let alice = f.identity.register("alice@example.com", "password").unwrap();
        let video = f.library.add_video(&alice, lecture("a", "https://vimeo.com/1", "11", "Physics")).unwrap();

        assert!(f.library.toggle_watched(&alice, &video.id).unwrap().watched);
        assert!(!f.library.toggle_watched(&alice, &video.id).unwrap().watched);
        assert!(f.library.toggle_favorite(&alice, &video.id).unwrap().favorite);

        let update = VideoUpdate { title: Some("Optics".to_owned()), watched: Some(true), ..Default::default() };
        let updated = f.library.update_video(&alice, &video.id, update).unwrap();
        assert_eq!(updated.title, "Optics");
        assert!(updated.watched && updated.favorite);
        assert_eq!(updated.video_url, video.video_url);

        let blank = VideoUpdate { subject: Some(String::new()), ..Default::default() };
        assert!(matches!(f.library.update_video(&alice, &video.id, blank), Err(LibraryError::MissingField("subject"))));
        assert_eq!(f.library.get_video(&alice, &video.id).unwrap().subject, "Physics");

        f.library.delete_video(&alice, &video.id).unwrap();
        assert!(matches!(f.library.get_video(&alice, &video.id), Err(LibraryError::NotFound { .. })));
    }

    #[test]
    fn notes() {
        let f = fixture();
        let alice = f.identity.register("alice@example.com", "password").unwrap();
        let video = f.library.add_video(&alice, lecture("a", "https://vimeo.com/1", "11", "Physics")).unwrap();

        assert!(matches!(f.library.add_note(&alice, &video.id, "   "), Err(LibraryError::EmptyNote)));
        let note = f.library.add_note(&alice, &video.id, "  revise chapter 3 ").unwrap();
        assert_eq!(note.text, "revise chapter 3");
        assert!(!note.completed);

        assert!(f.library.toggle_note(&alice, &video.id, &note.id).unwrap().completed);
        assert!(f.library.get_video(&alice, &video.id).unwrap().note(&note.id).unwrap().completed);
        assert!(matches!(f.library.toggle_note(&alice, &video.id, "nope"), Err(LibraryError::NotFound { kind: ObjectKind::Note, .. })));

        f.library.delete_note(&alice, &video.id, &note.id).unwrap();
        assert!(f.library.get_video(&alice, &video.id).unwrap().notes.is_empty());
        assert!(matches!(f.library.delete_note(&alice, &video.id, &note.id), Err(LibraryError::NotFound { kind: ObjectKind::Note, .. })));
    }

    #[test]
    fn concurrent_changes_are_not_lost() {
        let f = fixture();
        let alice = f.identity.register("alice@example.com", "password").unwrap();
        let video = f.library.add_video(&alice, lecture("a", "https://vimeo.com/1", "11", "Physics")).unwrap();

        std::thread::scope(|s| {
            for worker in 0..8 {
                let (library, alice, id) = (&f.library, &alice, video.id.as_str());
                s.spawn(move || {
                    for i in 0..50 {
                        library.add_note(alice, id, &format!("note {worker}-{i}")).unwrap();
                        library.toggle_favorite(alice, id).unwrap();
                    }
                });
            }
        });

        let stored = f.library.get_video(&alice, &video.id).unwrap();
        assert_eq!(stored.notes.len(), 400);
        // an even number of toggles
        assert!(!stored.favorite);
    }

    #[test]
    fn opaque_embeds_play_as_markup() {
        let f = fixture();
        let alice = f.identity.register("alice@example.com", "password").unwrap();
        let video = f.library.add_video(&alice, lecture("a", "https://cdn.example.org/lecture.mp4", "11", "Physics")).unwrap();
        assert_eq!(video.platform, Platform::Embed);
        assert_eq!(video.video_id, "https://cdn.example.org/lecture.mp4");
        match Library::directive_for(&video) {
            PlayDirective::Embed(markup) => assert!(markup.starts_with("<iframe src=\"https://cdn.example.org/lecture.mp4\"")),
            other => panic!("expected embed markup, got {other:?}"),
        }
    }

    #[test]
    fn settings() {
        let f = fixture();
        let alice = f.identity.register("alice@example.com", "password").unwrap();
        assert_eq!(f.library.settings().unwrap(), SiteSettings::default());

        assert!(matches!(f.library.update_settings(&alice, "School", "red"), Err(LibraryError::InvalidThemeColor(..))));
        assert!(matches!(f.library.update_settings(&alice, " ", "#123456"), Err(LibraryError::MissingField("site_name"))));

        let saved = f.library.update_settings(&alice, "School", "#1a2B3c").unwrap();
        assert!(saved.updated_at.is_some());
        assert_eq!(f.library.settings().unwrap(), saved);
    }
}
