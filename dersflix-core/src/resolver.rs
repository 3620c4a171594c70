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

use std::sync::LazyLock;

use html_escape::encode_double_quoted_attribute;
use url::Url;

use crate::{normalize::contains_markup, types::Platform};

static YOUTUBE_THUMBNAIL_URL:     LazyLock<Url> = LazyLock::new(|| Url::parse("https://img.youtube.com/vi").expect("should be able to parse the youtube thumbnail URL"));
static DAILYMOTION_THUMBNAIL_URL: LazyLock<Url> = LazyLock::new(|| Url::parse("https://www.dailymotion.com/thumbnail/video").expect("should be able to parse the dailymotion thumbnail URL"));
static PLACEHOLDER_URL:           LazyLock<Url> = LazyLock::new(|| Url::parse("https://placehold.co/640x360/333/fff").expect("should be able to parse the placeholder URL"));

/// How a stored video should be played back
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PlayDirective {
    /// Inline markup, ready to be injected as-is
    Embed(String),
    /// The original link, for a generic player that knows how to resolve it
    StructuredPlayer(String),
}

fn with_segments(base: &Url, segments: &[&str]) -> String {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.extend(segments);
    }
    url.into()
}

fn placeholder(label: &str) -> String {
    let mut url = PLACEHOLDER_URL.clone();
    url.query_pairs_mut().append_pair("text", label);
    url.into()
}

pub fn thumbnail_url(platform: Platform, identifier: &str) -> String {
    match platform {
        Platform::YouTube => with_segments(&YOUTUBE_THUMBNAIL_URL, &[identifier, "maxresdefault.jpg"]),
        // real vimeo thumbnails need an API round trip
        Platform::Vimeo => placeholder("Vimeo Video"),
        Platform::Dailymotion => with_segments(&DAILYMOTION_THUMBNAIL_URL, &[identifier]),
        Platform::Embed => placeholder("Video Player"),
    }
}

/// Same as [`thumbnail_url`], for platform tags of unknown provenance
pub fn thumbnail_url_for_tag(tag: &str, identifier: &str) -> String {
    match tag.parse::<Platform>() {
        Ok(platform) => thumbnail_url(platform, identifier),
        Err(_) => placeholder("Video"),
    }
}

fn iframe_for(src: &str) -> String {
    format!(
        r#"<iframe src="{}" width="100%" height="100%" frameborder="0" allowfullscreen></iframe>"#,
        encode_double_quoted_attribute(src),
    )
}

pub fn render_directive(platform: Platform, identifier: &str, original_url: &str) -> PlayDirective {
    match platform {
        Platform::Embed if contains_markup(identifier) => PlayDirective::Embed(identifier.to_owned()),
        Platform::Embed => PlayDirective::Embed(iframe_for(identifier)),
        Platform::YouTube | Platform::Vimeo | Platform::Dailymotion => PlayDirective::StructuredPlayer(original_url.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_thumbnail() {
        assert_eq!(thumbnail_url(Platform::YouTube, "dQw4w9WgXcQ"), "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg");
    }

    #[test]
    fn dailymotion_thumbnail() {
        assert_eq!(thumbnail_url(Platform::Dailymotion, "x7abcde"), "https://www.dailymotion.com/thumbnail/video/x7abcde");
    }

    #[test]
    fn vimeo_thumbnail_ignores_identifier() {
        let expected = "https://placehold.co/640x360/333/fff?text=Vimeo+Video";
        assert_eq!(thumbnail_url(Platform::Vimeo, "12345"), expected);
        assert_eq!(thumbnail_url(Platform::Vimeo, "67890"), expected);
        assert_eq!(thumbnail_url(Platform::Vimeo, ""), expected);
    }

    #[test]
    fn placeholder_thumbnails() {
        assert_eq!(thumbnail_url(Platform::Embed, "<iframe></iframe>"), "https://placehold.co/640x360/333/fff?text=Video+Player");
        assert_eq!(thumbnail_url_for_tag("embed", "whatever"), "https://placehold.co/640x360/333/fff?text=Video+Player");
        assert_eq!(thumbnail_url_for_tag("twitch", "whatever"), "https://placehold.co/640x360/333/fff?text=Video");
        assert_eq!(thumbnail_url_for_tag("youtube", "abc"), "https://img.youtube.com/vi/abc/maxresdefault.jpg");
    }

    #[test]
    fn markup_is_not_rewrapped() {
        let markup = r#"<iframe src="https://example.com/player"></iframe>"#;
        assert_eq!(render_directive(Platform::Embed, markup, "ignored"), PlayDirective::Embed(markup.to_owned()));
    }

    #[test]
    fn bare_embed_urls_get_wrapped() {
        let directive = render_directive(Platform::Embed, "https://example.com/v.mp4?a=1&b=2", "ignored");
        assert_eq!(
            directive,
            PlayDirective::Embed(r#"<iframe src="https://example.com/v.mp4?a=1&amp;b=2" width="100%" height="100%" frameborder="0" allowfullscreen></iframe>"#.to_owned()),
        );
    }

    #[test]
    fn known_platforms_use_original_link() {
        let original = "https://youtu.be/dQw4w9WgXcQ?t=42";
        assert_eq!(render_directive(Platform::YouTube, "dQw4w9WgXcQ", original), PlayDirective::StructuredPlayer(original.to_owned()));
        assert_eq!(render_directive(Platform::Vimeo, "1", "https://vimeo.com/1"), PlayDirective::StructuredPlayer("https://vimeo.com/1".to_owned()));
    }
}
