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

use std::{fmt::Display, sync::LazyLock};

use cloneable_errors::{anyhow, ErrorContext};

pub static LIBRARY_READ_ERR:   LazyLock<ErrorContext> = LazyLock::new(|| anyhow!("Failed to acquire the video store for reading"));
pub static LIBRARY_WRITE_ERR:  LazyLock<ErrorContext> = LazyLock::new(|| anyhow!("Failed to acquire the video store for writing"));
pub static IDENTITY_READ_ERR:  LazyLock<ErrorContext> = LazyLock::new(|| anyhow!("Failed to acquire the session table for reading"));
pub static IDENTITY_WRITE_ERR: LazyLock<ErrorContext> = LazyLock::new(|| anyhow!("Failed to acquire the session table for writing"));

/// The only way [`crate::normalize`] can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidUrl;

impl std::error::Error for InvalidUrl {}
impl Display for InvalidUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Please enter a valid video URL from YouTube, Vimeo, or Dailymotion")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ObjectKind {
    Video,
    Note,
    Account,
}

#[derive(Debug, Clone)]
pub enum LibraryError {
    InvalidUrl,
    MissingField(&'static str),
    EmptyNote,
    InvalidThemeColor(String),
    NotFound {
        kind: ObjectKind,
        id: String,
    },
    Conflict {
        kind: ObjectKind,
        id: String,
    },
    Unauthorized,
    EmailTaken,
    InvalidCredentials,
    WeakPassword {
        min_length: usize,
    },
    Storage(ErrorContext),
}

impl LibraryError {
    pub fn not_found<S: Into<String>>(kind: ObjectKind, id: S) -> LibraryError {
        LibraryError::NotFound { kind, id: id.into() }
    }

    pub fn conflict<S: Into<String>>(kind: ObjectKind, id: S) -> LibraryError {
        LibraryError::Conflict { kind, id: id.into() }
    }

    /// Whether the caller can fix this by changing their input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LibraryError::InvalidUrl
                | LibraryError::MissingField(..)
                | LibraryError::EmptyNote
                | LibraryError::InvalidThemeColor(..)
                | LibraryError::WeakPassword { .. }
        )
    }
}

impl From<InvalidUrl> for LibraryError {
    fn from(_: InvalidUrl) -> Self {
        LibraryError::InvalidUrl
    }
}

impl From<ErrorContext> for LibraryError {
    fn from(value: ErrorContext) -> Self {
        LibraryError::Storage(value)
    }
}

impl std::error::Error for LibraryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LibraryError::Storage(ref err) => Some(err),
            _ => None,
        }
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::InvalidUrl => Display::fmt(&InvalidUrl, f),
            LibraryError::MissingField(field) => write!(f, "Validation error: {field} must not be empty"),
            LibraryError::EmptyNote => write!(f, "Validation error: a note must contain some text"),
            LibraryError::InvalidThemeColor(ref color) => write!(f, "Validation error: \"{color}\" is not a #RRGGBB color"),
            LibraryError::NotFound { kind, ref id } => write!(f, "{kind} {id} does not exist"),
            LibraryError::Conflict { kind, ref id } => write!(f, "{kind} {id} already exists"),
            LibraryError::Unauthorized => write!(f, "Missing, expired or revoked session token"),
            LibraryError::EmailTaken => write!(f, "An account with this e-mail address already exists"),
            LibraryError::InvalidCredentials => write!(f, "Invalid e-mail address or password"),
            LibraryError::WeakPassword { min_length } => write!(f, "Validation error: the password must be at least {min_length} characters long"),
            LibraryError::Storage(ref err) => write!(f, "Storage error: {err}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
