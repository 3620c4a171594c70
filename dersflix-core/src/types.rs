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

use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    YouTube,
    Vimeo,
    Dailymotion,
    /// Anything that could not be matched to a known host, kept verbatim
    Embed,
}

/// The normalized form of a user-supplied video link
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VideoRef {
    pub platform: Platform,
    /// A video ID for known platforms, the literal user input for [`Platform::Embed`]
    pub identifier: String,
}

impl VideoRef {
    pub fn new<S: Into<String>>(platform: Platform, identifier: S) -> VideoRef {
        VideoRef { platform, identifier: identifier.into() }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn generate() -> OwnerId {
        OwnerId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        OwnerId(value.to_owned())
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Note {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Video {
    pub id: String,
    pub title: String,
    /// Raw link as typed by the user, handed to the player as-is
    pub video_url: String,
    pub platform: Platform,
    pub video_id: String,
    pub class: String,
    pub subject: String,
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Unix timestamp in milliseconds
    #[serde(default)]
    pub created_at: i64,
}

impl Video {
    pub fn note(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == note_id)
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct NewVideo {
    pub title: String,
    pub video_url: String,
    pub class: String,
    pub subject: String,
}

/// A partial update of a [`Video`]. The source link cannot be changed after creation.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
#[serde(default)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub class: Option<String>,
    pub subject: Option<String>,
    pub watched: Option<bool>,
    pub favorite: Option<bool>,
}

pub const DEFAULT_SITE_NAME: &str = "DERSFLIX";
pub const DEFAULT_THEME_COLOR: &str = "#DC2626";

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct SiteSettings {
    pub site_name: String,
    pub theme_color: String,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_owned(),
            theme_color: DEFAULT_THEME_COLOR.to_owned(),
            updated_at: None,
        }
    }
}

/// Dashboard filter. `None` and the literal `"all"` both disable a criterion.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
#[serde(default)]
pub struct VideoFilter {
    pub class: Option<String>,
    pub subject: Option<String>,
}

impl VideoFilter {
    pub fn matches(&self, video: &Video) -> bool {
        fn criterion_matches(criterion: Option<&str>, value: &str) -> bool {
            match criterion {
                None | Some("all") => true,
                Some(c) => c == value,
            }
        }
        criterion_matches(self.class.as_deref(), &video.class)
            && criterion_matches(self.subject.as_deref(), &video.subject)
    }
}

/// Distinct class and subject labels, in the order they were first seen
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct FilterOptions {
    pub classes: Vec<String>,
    pub subjects: Vec<String>,
}

/// A stored local account
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Account {
    pub owner: OwnerId,
    pub email: String,
    /// Argon2 PHC string, salt included
    pub password_hash: String,
}
