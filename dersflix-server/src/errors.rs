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

use std::fmt::{Debug, Display};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use cloneable_errors::{ErrorContext, IntoErrorIterator};
use dersflix_core::LibraryError;
use log::error;

/// Present on every error response rendered by [`Error`].
/// Holds the full error chain as text, for clients that don't want json.
pub struct PlaintextErrorBody(pub String);

pub enum Error {
    Library(LibraryError),
    #[allow(clippy::enum_variant_names)]
    ErrorContext(ErrorContext),
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Library(ref err) => Debug::fmt(err, f),
            Error::ErrorContext(ref err) => Debug::fmt(err, f),
        }
    }
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Library(ref err) => Display::fmt(err, f),
            Error::ErrorContext(ref err) => Display::fmt(err, f),
        }
    }
}
impl From<LibraryError> for Error {
    fn from(value: LibraryError) -> Self {
        Error::Library(value)
    }
}
impl From<ErrorContext> for Error {
    fn from(value: ErrorContext) -> Self {
        Error::ErrorContext(value)
    }
}
impl std::error::Error for Error {}

fn library_status(err: &LibraryError) -> StatusCode {
    match err {
        _ if err.is_validation() => StatusCode::BAD_REQUEST,
        LibraryError::Unauthorized | LibraryError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        LibraryError::NotFound { .. } => StatusCode::NOT_FOUND,
        LibraryError::Conflict { .. } | LibraryError::EmailTaken => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Library(err) => library_status(err),
            Error::ErrorContext(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {self:?}");
        }
        let mut builder = HttpResponse::build(status);
        let serialized = match self {
            Error::Library(err) => err.serializable_copy(),
            Error::ErrorContext(err) => err.serializable_copy(),
        };
        builder.extensions_mut().insert(PlaintextErrorBody(format!("{serialized:?}")));
        builder.json(serialized)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use dersflix_core::ObjectKind;

    #[test]
    fn library_errors_map_to_statuses() {
        let cases = [
            (LibraryError::InvalidUrl, StatusCode::BAD_REQUEST),
            (LibraryError::EmptyNote, StatusCode::BAD_REQUEST),
            (LibraryError::WeakPassword { min_length: 6 }, StatusCode::BAD_REQUEST),
            (LibraryError::Unauthorized, StatusCode::UNAUTHORIZED),
            (LibraryError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (LibraryError::not_found(ObjectKind::Video, "v"), StatusCode::NOT_FOUND),
            (LibraryError::EmailTaken, StatusCode::CONFLICT),
            (LibraryError::Storage(cloneable_errors::anyhow!("disk on fire")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(Error::from(err).status_code(), status);
        }
    }

    #[test]
    fn error_responses_carry_a_plaintext_rendering() {
        use cloneable_errors::ErrContext;
        let err = Error::from(cloneable_errors::anyhow!("disk on fire").context("Failed to save the library"));
        let resp = err.error_response();
        let extensions = resp.extensions();
        let plaintext = &extensions.get::<PlaintextErrorBody>().unwrap().0;
        assert!(plaintext.contains("Failed to save the library"));
        assert!(plaintext.contains("disk on fire"));
    }
}
