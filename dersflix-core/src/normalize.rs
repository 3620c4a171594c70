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

//! Turns whatever the user pasted into a [`VideoRef`].
//!
//! Rules are tried in a fixed order and the first one producing a non-empty identifier wins:
//! 1. if the input looks like embed markup, the `src` attribute replaces the working string
//! 2. the working string is parsed as a URL, retrying with `https://` prepended
//! 3. YouTube, Vimeo and Dailymotion hosts are matched
//! 4. anything still unmatched that looks embeddable becomes a [`Platform::Embed`] carrying the
//!    original input verbatim
//!
//! Only full links are accepted. A bare video ID does not normalize back to itself.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use url::Url;

use crate::{errors::InvalidUrl, types::{Platform, VideoRef}};

/// Tag opening of inline embed markup
pub const MARKUP_MARKER: &str = "<iframe";
const EMBED_MARKER: &str = "embed";
const VIDEO_FILE_EXTENSIONS: &[&str] = &[".mp4"];
const SECURE_SCHEME_PREFIX: &str = "https://";

static SRC_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"src=["'](.*?)["']"#).expect("src attribute regex should be valid"));

/// Checks for inline embed markup, ignoring ASCII case
pub fn contains_markup(s: &str) -> bool {
    s.to_ascii_lowercase().contains(MARKUP_MARKER)
}

fn looks_embeddable(s: &str) -> bool {
    contains_markup(s)
        || s.contains(EMBED_MARKER)
        || VIDEO_FILE_EXTENSIONS.iter().any(|ext| s.ends_with(ext))
}

fn extract_embed_source(raw: &str) -> Option<&str> {
    if !contains_markup(raw) && !raw.contains(EMBED_MARKER) {
        return None;
    }
    SRC_ATTRIBUTE.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn parse_lenient(s: &str) -> Option<Url> {
    Url::parse(s)
        .or_else(|_| Url::parse(&format!("{SECURE_SCHEME_PREFIX}{s}")))
        .ok()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

/// Last path segment, ignoring trailing slashes
fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

fn youtube_id(url: &Url, host: &str) -> Option<String> {
    let path = url.path();
    if host.contains("youtu.be") {
        non_empty(path.strip_prefix('/').unwrap_or(path))
    } else if path.contains(EMBED_MARKER) {
        // no trimming here: `/embed/` without an ID must fall through
        non_empty(path.rsplit('/').next().unwrap_or_default())
    } else {
        url.query_pairs()
            .find(|(k, _)| k == "v")
            .and_then(|(_, v)| non_empty(&v))
    }
}

fn vimeo_id(url: &Url) -> Option<String> {
    non_empty(last_segment(url.path()))
}

fn dailymotion_id(url: &Url) -> Option<String> {
    let path = url.path();
    let id = match path.split_once("/video/") {
        Some((_, rest)) => rest.split('/').next().unwrap_or_default(),
        None => last_segment(path),
    };
    non_empty(id.split('?').next().unwrap_or_default())
}

fn match_platform(url: &Url) -> Option<VideoRef> {
    let host = url.host_str().unwrap_or_default();

    if host.contains("youtube.com") || host.contains("youtu.be") {
        if let Some(id) = youtube_id(url, host) {
            return Some(VideoRef::new(Platform::YouTube, id));
        }
    }
    if host.contains("vimeo.com") {
        if let Some(id) = vimeo_id(url) {
            return Some(VideoRef::new(Platform::Vimeo, id));
        }
    }
    if host.contains("dailymotion.com") {
        if let Some(id) = dailymotion_id(url) {
            return Some(VideoRef::new(Platform::Dailymotion, id));
        }
    }
    None
}

pub fn normalize(raw: &str) -> Result<VideoRef, InvalidUrl> {
    let working = extract_embed_source(raw).unwrap_or(raw);

    if let Some(video) = parse_lenient(working).as_ref().and_then(match_platform) {
        return Ok(video);
    }

    if looks_embeddable(raw) || looks_embeddable(working) {
        return Ok(VideoRef::new(Platform::Embed, raw));
    }

    debug!("Rejected video link {raw:?}");
    Err(InvalidUrl)
}
