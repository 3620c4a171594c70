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

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, FromRequest, HttpRequest};
use cloneable_errors::anyhow;
use dersflix_core::{IdentityProvider, LibraryError, Session};

use crate::{errors::{Error, Result}, state::StateData};

/// Extracts the [`Session`] behind an `Authorization: Bearer <token>` header.
/// Requests without a valid token are rejected with 401.
pub struct Authenticated(pub Session);

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated> {
    let state = req.app_data::<StateData>().ok_or_else(|| anyhow!("Application state is missing"))?;
    let token = bearer_token(req).ok_or(LibraryError::Unauthorized)?;
    Ok(Authenticated(state.identity.resolve(token)?))
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
