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

use std::{future::{ready, Ready}, time::{Duration, Instant}};

use actix_web::{dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform}, error::{Error, HttpError}, web};
use futures::{future::LocalBoxFuture, FutureExt};
use log::error;

use crate::{state::AppConfig, utils::HeaderMapExt};

pub const TIME_SPENT_HEADER: &str = "X-Time-Spent";

/// Adds an `X-Time-Spent` header when `enable_timings_header` is set
pub struct Timings;

impl<S, B> Transform<S, ServiceRequest> for Timings
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TimingsInstance<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TimingsInstance { service }))
    }
}

pub struct TimingsInstance<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TimingsInstance<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let enabled = req.app_data::<web::Data<AppConfig>>().is_some_and(|config| config.enable_timings_header);
        if !enabled {
            return self.service.call(req).boxed_local();
        }
        let start = Instant::now();
        let srv = self.service.call(req);

        async move {
            let mut resp = srv.await?;
            let elapsed = start.elapsed();
            if let Err(e) = resp.headers_mut().append_header((TIME_SPENT_HEADER, format!("{} ns", render_duration(&elapsed)))) {
                error!("Failed to append the {TIME_SPENT_HEADER} header: {}", HttpError::from(e));
            }
            Ok(resp)
        }.boxed_local()
    }
}

/// Nanoseconds with digits grouped by three, `1 234 567`
fn render_duration(duration: &Duration) -> String {
    let digits = duration.as_nanos().to_string();
    let mut rendered = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            rendered.push(' ');
        }
        rendered.push(digit);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_grouped() {
        assert_eq!(render_duration(&Duration::from_nanos(7)), "7");
        assert_eq!(render_duration(&Duration::from_nanos(123)), "123");
        assert_eq!(render_duration(&Duration::from_nanos(1234)), "1 234");
        assert_eq!(render_duration(&Duration::from_nanos(1_234_567)), "1 234 567");
    }
}
