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

pub mod errors;
pub mod library;
pub mod normalize;
pub mod resolver;
pub mod session;
pub mod store;
pub mod types;

pub use errors::{InvalidUrl, LibraryError, ObjectKind};
pub use library::Library;
pub use normalize::normalize;
pub use resolver::{render_directive, thumbnail_url, thumbnail_url_for_tag, PlayDirective};
pub use session::{IdentityProvider, LocalIdentity, Session, SessionToken};
pub use types::*;
