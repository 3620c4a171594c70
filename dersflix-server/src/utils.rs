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

use actix_web::{http::header::{HeaderMap, TryIntoHeaderPair}, web};
use cloneable_errors::ResContext;

use crate::errors::Result;

/// Runs a library call on the blocking thread pool, stores may touch the disk
pub async fn blocking<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> dersflix_core::errors::Result<R> + Send + 'static,
    R: Send + 'static,
{
    Ok(web::block(f).await.context("Library task was cancelled")??)
}

pub trait HeaderMapExt {
    fn append_header<H: TryIntoHeaderPair>(&mut self, header: H) -> std::result::Result<(), H::Error>;
    fn replace_header<H: TryIntoHeaderPair>(&mut self, header: H) -> std::result::Result<(), H::Error>;
}

impl HeaderMapExt for HeaderMap {
    fn append_header<H: TryIntoHeaderPair>(&mut self, header: H) -> std::result::Result<(), H::Error> {
        let (name, value) = header.try_into_pair()?;
        self.append(name, value);
        Ok(())
    }

    fn replace_header<H: TryIntoHeaderPair>(&mut self, header: H) -> std::result::Result<(), H::Error> {
        let (name, value) = header.try_into_pair()?;
        self.insert(name, value);
        Ok(())
    }
}
