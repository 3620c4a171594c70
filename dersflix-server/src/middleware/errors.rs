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

use actix_web::body::{BoxBody, EitherBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::Error;
use actix_web::http::header::{Accept, ContentType, Header};
use futures::{future::LocalBoxFuture, FutureExt};
use log::warn;

use crate::{errors::PlaintextErrorBody, utils::HeaderMapExt};

/// Serves error responses as their [`PlaintextErrorBody`],
/// unless the client explicitly accepts `application/json`
pub struct ErrorRepresentation;

impl<S, B> Transform<S, ServiceRequest> for ErrorRepresentation
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorRepresentationInstance<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorRepresentationInstance { service }))
    }
}

pub struct ErrorRepresentationInstance<S> {
    service: S,
}

fn accepts_json(req: &ServiceRequest) -> bool {
    Accept::parse(req).is_ok_and(|accept| accept.iter().any(|item| item.item.essence_str() == "application/json"))
}

fn into_plaintext<B>(resp: ServiceResponse<B>, text: String) -> ServiceResponse<EitherBody<B, BoxBody>> {
    resp.map_body(|head, _| {
        if let Err(err) = head.headers.replace_header(ContentType::plaintext()) {
            warn!("Failed to replace the Content-Type header: {err}");
        }
        EitherBody::right(BoxBody::new(text))
    })
}

impl<S, B> Service<ServiceRequest> for ErrorRepresentationInstance<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let requested_json = accepts_json(&req);
        let srv = self.service.call(req);

        async move {
            let mut resp = srv.await?;
            if requested_json {
                return Ok(resp.map_into_left_body());
            }
            let text = resp.response_mut().extensions_mut().remove::<PlaintextErrorBody>();
            Ok(match text {
                Some(PlaintextErrorBody(text)) => into_plaintext(resp, text),
                None => resp.map_into_left_body(),
            })
        }.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{get, http::{header, StatusCode}, test, App, HttpResponse};
    use dersflix_core::LibraryError;

    use super::*;

    #[get("/missing")]
    async fn missing() -> crate::errors::Result<HttpResponse> {
        Err(LibraryError::Unauthorized.into())
    }

    #[get("/fine")]
    async fn fine() -> HttpResponse {
        HttpResponse::Ok().json(["fine"])
    }

    #[actix_web::test]
    async fn only_error_bodies_are_rewritten() {
        let app = test::init_service(App::new().wrap(ErrorRepresentation).service(missing).service(fine)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain; charset=utf-8");
        let body = test::read_body(resp).await;
        assert!(!body.starts_with(b"{"));

        let req = test::TestRequest::get().uri("/missing").insert_header((header::ACCEPT, "application/json")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/fine").to_request()).await;
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(&test::read_body(resp).await[..], br#"["fine"]"#);
    }
}
