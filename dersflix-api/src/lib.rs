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

use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ApiPlatform {
    YouTube,
    Vimeo,
    Dailymotion,
    Embed,
}
#[cfg(feature = "dersflix-core")]
impl From<dersflix_core::Platform> for ApiPlatform {
    fn from(value: dersflix_core::Platform) -> Self {
        use dersflix_core::Platform;
        match value {
            Platform::YouTube => Self::YouTube,
            Platform::Vimeo => Self::Vimeo,
            Platform::Dailymotion => Self::Dailymotion,
            Platform::Embed => Self::Embed,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default, Debug)]
#[serde(default)]
pub struct StatusResponse {
    pub videos: Option<usize>,
    pub active_sessions: Option<usize>,
    // general server build data
    pub server_version: Option<Arc<str>>,
    pub server_git_hash: Option<Arc<str>>,
    pub server_git_dirty: Option<bool>,
    pub server_build_timestamp: Option<i64>,
    pub server_startup_timestamp: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ApiNote {
    pub id: Arc<str>,
    pub text: Arc<str>,
    pub completed: bool,
}
#[cfg(feature = "dersflix-core")]
impl From<&dersflix_core::Note> for ApiNote {
    fn from(value: &dersflix_core::Note) -> Self {
        Self {
            id: value.id.as_str().into(),
            text: value.text.as_str().into(),
            completed: value.completed,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ApiVideo {
    pub id: Arc<str>,
    pub title: Arc<str>,
    pub video_url: Arc<str>,
    pub platform: ApiPlatform,
    pub video_id: Arc<str>,
    pub class: Arc<str>,
    pub subject: Arc<str>,
    pub user_id: Arc<str>,
    pub watched: bool,
    pub favorite: bool,
    pub notes: Vec<ApiNote>,
    pub created_at: i64,
    pub thumbnail_url: Arc<str>,
}
#[cfg(feature = "dersflix-core")]
impl From<&dersflix_core::Video> for ApiVideo {
    fn from(value: &dersflix_core::Video) -> Self {
        Self {
            id: value.id.as_str().into(),
            title: value.title.as_str().into(),
            video_url: value.video_url.as_str().into(),
            platform: value.platform.into(),
            video_id: value.video_id.as_str().into(),
            class: value.class.as_str().into(),
            subject: value.subject.as_str().into(),
            user_id: value.owner.as_str().into(),
            watched: value.watched,
            favorite: value.favorite,
            notes: value.notes.iter().map(Into::into).collect(),
            created_at: value.created_at,
            thumbnail_url: dersflix_core::Library::thumbnail_for(value).into(),
        }
    }
}

/// How a client should render a video
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlayDirective {
    /// Markup to be inserted into the page as-is
    Embed { payload: Arc<str> },
    /// A link for a generic player component
    Player { url: Arc<str> },
}
#[cfg(feature = "dersflix-core")]
impl From<dersflix_core::PlayDirective> for PlayDirective {
    fn from(value: dersflix_core::PlayDirective) -> Self {
        match value {
            dersflix_core::PlayDirective::Embed(payload) => Self::Embed { payload: payload.into() },
            dersflix_core::PlayDirective::StructuredPlayer(url) => Self::Player { url: url.into() },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct NormalizeRequest {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct NormalizeResponse {
    pub platform: ApiPlatform,
    pub identifier: Arc<str>,
    pub thumbnail_url: Arc<str>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ThumbnailQuery {
    pub platform: String,
    pub identifier: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ThumbnailResponse {
    pub url: Arc<str>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct CreateVideoRequest {
    pub title: String,
    pub video_url: String,
    pub class: String,
    pub subject: String,
}
#[cfg(feature = "dersflix-core")]
impl From<CreateVideoRequest> for dersflix_core::NewVideo {
    fn from(value: CreateVideoRequest) -> Self {
        Self {
            title: value.title,
            video_url: value.video_url,
            class: value.class,
            subject: value.subject,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default, Debug)]
#[serde(default)]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub class: Option<String>,
    pub subject: Option<String>,
    pub watched: Option<bool>,
    pub favorite: Option<bool>,
}
#[cfg(feature = "dersflix-core")]
impl From<UpdateVideoRequest> for dersflix_core::VideoUpdate {
    fn from(value: UpdateVideoRequest) -> Self {
        Self {
            title: value.title,
            class: value.class,
            subject: value.subject,
            watched: value.watched,
            favorite: value.favorite,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default, Debug)]
#[serde(default)]
pub struct VideoQuery {
    pub class: Option<String>,
    pub subject: Option<String>,
}
#[cfg(feature = "dersflix-core")]
impl From<VideoQuery> for dersflix_core::VideoFilter {
    fn from(value: VideoQuery) -> Self {
        Self { class: value.class, subject: value.subject }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct NoteRequest {
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct FilterOptions {
    pub classes: Vec<Arc<str>>,
    pub subjects: Vec<Arc<str>>,
}
#[cfg(feature = "dersflix-core")]
impl From<dersflix_core::FilterOptions> for FilterOptions {
    fn from(value: dersflix_core::FilterOptions) -> Self {
        Self {
            classes: value.classes.into_iter().map(Into::into).collect(),
            subjects: value.subjects.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct SessionResponse {
    pub token: Arc<str>,
    pub user_id: Arc<str>,
    pub email: Arc<str>,
}
#[cfg(feature = "dersflix-core")]
impl From<&dersflix_core::Session> for SessionResponse {
    fn from(value: &dersflix_core::Session) -> Self {
        Self {
            token: value.token().as_str().into(),
            user_id: value.owner().as_str().into(),
            email: value.email().into(),
        }
    }
}

/// Like [`SessionResponse`], without the token
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct UserResponse {
    pub user_id: Arc<str>,
    pub email: Arc<str>,
}
#[cfg(feature = "dersflix-core")]
impl From<&dersflix_core::Session> for UserResponse {
    fn from(value: &dersflix_core::Session) -> Self {
        Self {
            user_id: value.owner().as_str().into(),
            email: value.email().into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct SiteSettings {
    pub site_name: Arc<str>,
    pub theme_color: Arc<str>,
    pub updated_at: Option<i64>,
}
#[cfg(feature = "dersflix-core")]
impl From<dersflix_core::SiteSettings> for SiteSettings {
    fn from(value: dersflix_core::SiteSettings) -> Self {
        Self {
            site_name: value.site_name.into(),
            theme_color: value.theme_color.into(),
            updated_at: value.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct UpdateSettingsRequest {
    pub site_name: String,
    pub theme_color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_directive_wire_format() {
        let embed = PlayDirective::Embed { payload: "<iframe></iframe>".into() };
        assert_eq!(serde_json::to_string(&embed).unwrap(), r#"{"kind":"embed","payload":"<iframe></iframe>"}"#);
        let player: PlayDirective = serde_json::from_str(r#"{"kind":"player","url":"https://vimeo.com/1"}"#).unwrap();
        assert_eq!(player, PlayDirective::Player { url: "https://vimeo.com/1".into() });
    }

    #[test]
    fn platforms_are_lowercase() {
        assert_eq!(serde_json::to_string(&ApiPlatform::YouTube).unwrap(), r#""youtube""#);
        assert_eq!(serde_json::from_str::<ApiPlatform>(r#""dailymotion""#).unwrap(), ApiPlatform::Dailymotion);
    }

    #[test]
    fn partial_updates_deserialize() {
        let update: UpdateVideoRequest = serde_json::from_str(r#"{"favorite":true}"#).unwrap();
        assert_eq!(update, UpdateVideoRequest { favorite: Some(true), ..Default::default() });
    }
}
