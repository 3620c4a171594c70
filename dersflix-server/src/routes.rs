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
#![allow(clippy::needless_pass_by_value)]
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use chrono::DateTime;
use dersflix_api::*;
use dersflix_core::{normalize, thumbnail_url, thumbnail_url_for_tag, IdentityProvider, Library, LibraryError, NewVideo, VideoFilter, VideoUpdate};

use crate::{auth::Authenticated, built_info, errors::Result, state::{AppConfig, StateData}, utils::blocking};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(helo)
       .service(get_status)
       .service(post_normalize)
       .service(get_thumbnail)
       .service(register)
       .service(login)
       .service(logout)
       .service(whoami)
       .service(list_videos)
       // must come before the /videos/{id} routes
       .service(get_filters)
       .service(create_video)
       .service(get_video)
       .service(update_video)
       .service(delete_video)
       .service(toggle_watched)
       .service(toggle_favorite)
       .service(play_video)
       .service(add_note)
       .service(toggle_note)
       .service(delete_note)
       .service(get_settings)
       .service(put_settings);
}

type JsonResult<T> = Result<web::Json<T>>;

#[get("/")]
async fn helo() -> impl Responder {
    "hi"
}

#[get("/status")]
async fn get_status(state: StateData, config: Option<web::Data<AppConfig>>) -> JsonResult<StatusResponse> {
    let (videos, sessions) = blocking(move || Ok((state.library.video_count()?, state.identity.active_sessions()?))).await?;
    Ok(web::Json(StatusResponse {
        videos: Some(videos),
        active_sessions: Some(sessions),
        server_version: Some(built_info::PKG_VERSION.into()),
        server_git_hash: built_info::GIT_COMMIT_HASH.map(Into::into),
        server_git_dirty: built_info::GIT_DIRTY,
        server_build_timestamp: DateTime::parse_from_rfc2822(built_info::BUILT_TIME_UTC).ok().map(|t| t.timestamp()),
        server_startup_timestamp: config.map(|c| c.startup_timestamp.timestamp()),
    }))
}

#[post("/normalize")]
async fn post_normalize(body: web::Json<NormalizeRequest>) -> JsonResult<NormalizeResponse> {
    let video_ref = normalize(&body.url).map_err(LibraryError::from)?;
    Ok(web::Json(NormalizeResponse {
        platform: video_ref.platform.into(),
        thumbnail_url: thumbnail_url(video_ref.platform, &video_ref.identifier).into(),
        identifier: video_ref.identifier.into(),
    }))
}

#[get("/thumbnail")]
async fn get_thumbnail(query: web::Query<ThumbnailQuery>) -> web::Json<ThumbnailResponse> {
    web::Json(ThumbnailResponse {
        url: thumbnail_url_for_tag(&query.platform, &query.identifier).into(),
    })
}

#[post("/auth/register")]
async fn register(state: StateData, body: web::Json<Credentials>) -> Result<HttpResponse> {
    let Credentials { email, password } = body.into_inner();
    let session = blocking(move || state.identity.register(&email, &password)).await?;
    Ok(HttpResponse::Created().json(SessionResponse::from(&session)))
}

#[post("/auth/login")]
async fn login(state: StateData, body: web::Json<Credentials>) -> JsonResult<SessionResponse> {
    let Credentials { email, password } = body.into_inner();
    let session = blocking(move || state.identity.login(&email, &password)).await?;
    Ok(web::Json((&session).into()))
}

#[post("/auth/logout")]
async fn logout(state: StateData, auth: Authenticated) -> Result<HttpResponse> {
    state.identity.logout(auth.0.token().as_str())?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/auth/me")]
async fn whoami(auth: Authenticated) -> web::Json<UserResponse> {
    web::Json((&auth.0).into())
}

#[get("/videos")]
async fn list_videos(state: StateData, auth: Authenticated, query: web::Query<VideoQuery>) -> JsonResult<Vec<ApiVideo>> {
    let filter: VideoFilter = query.into_inner().into();
    let videos = blocking(move || state.library.list_videos(&auth.0, &filter)).await?;
    Ok(web::Json(videos.iter().map(Into::into).collect()))
}

#[get("/videos/filters")]
async fn get_filters(state: StateData, auth: Authenticated) -> JsonResult<FilterOptions> {
    let options = blocking(move || state.library.filter_options(&auth.0)).await?;
    Ok(web::Json(options.into()))
}

#[post("/videos")]
async fn create_video(state: StateData, auth: Authenticated, body: web::Json<CreateVideoRequest>) -> Result<HttpResponse> {
    let new: NewVideo = body.into_inner().into();
    let video = blocking(move || state.library.add_video(&auth.0, new)).await?;
    Ok(HttpResponse::Created().json(ApiVideo::from(&video)))
}

#[get("/videos/{id}")]
async fn get_video(state: StateData, auth: Authenticated, path: web::Path<String>) -> JsonResult<ApiVideo> {
    let id = path.into_inner();
    let video = blocking(move || state.library.get_video(&auth.0, &id)).await?;
    Ok(web::Json((&video).into()))
}

#[patch("/videos/{id}")]
async fn update_video(state: StateData, auth: Authenticated, path: web::Path<String>, body: web::Json<UpdateVideoRequest>) -> JsonResult<ApiVideo> {
    let id = path.into_inner();
    let update: VideoUpdate = body.into_inner().into();
    let video = blocking(move || state.library.update_video(&auth.0, &id, update)).await?;
    Ok(web::Json((&video).into()))
}

#[delete("/videos/{id}")]
async fn delete_video(state: StateData, auth: Authenticated, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    blocking(move || state.library.delete_video(&auth.0, &id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/videos/{id}/watched")]
async fn toggle_watched(state: StateData, auth: Authenticated, path: web::Path<String>) -> JsonResult<ApiVideo> {
    let id = path.into_inner();
    let video = blocking(move || state.library.toggle_watched(&auth.0, &id)).await?;
    Ok(web::Json((&video).into()))
}

#[post("/videos/{id}/favorite")]
async fn toggle_favorite(state: StateData, auth: Authenticated, path: web::Path<String>) -> JsonResult<ApiVideo> {
    let id = path.into_inner();
    let video = blocking(move || state.library.toggle_favorite(&auth.0, &id)).await?;
    Ok(web::Json((&video).into()))
}

#[get("/videos/{id}/play")]
async fn play_video(state: StateData, auth: Authenticated, path: web::Path<String>) -> JsonResult<PlayDirective> {
    let id = path.into_inner();
    let video = blocking(move || state.library.get_video(&auth.0, &id)).await?;
    Ok(web::Json(Library::directive_for(&video).into()))
}

#[post("/videos/{id}/notes")]
async fn add_note(state: StateData, auth: Authenticated, path: web::Path<String>, body: web::Json<NoteRequest>) -> Result<HttpResponse> {
    let id = path.into_inner();
    let NoteRequest { text } = body.into_inner();
    let note = blocking(move || state.library.add_note(&auth.0, &id, &text)).await?;
    Ok(HttpResponse::Created().json(ApiNote::from(&note)))
}

#[post("/videos/{id}/notes/{note_id}/toggle")]
async fn toggle_note(state: StateData, auth: Authenticated, path: web::Path<(String, String)>) -> JsonResult<ApiNote> {
    let (id, note_id) = path.into_inner();
    let note = blocking(move || state.library.toggle_note(&auth.0, &id, &note_id)).await?;
    Ok(web::Json((&note).into()))
}

#[delete("/videos/{id}/notes/{note_id}")]
async fn delete_note(state: StateData, auth: Authenticated, path: web::Path<(String, String)>) -> Result<HttpResponse> {
    let (id, note_id) = path.into_inner();
    blocking(move || state.library.delete_note(&auth.0, &id, &note_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/settings")]
async fn get_settings(state: StateData) -> JsonResult<SiteSettings> {
    let settings = blocking(move || state.library.settings()).await?;
    Ok(web::Json(settings.into()))
}

#[put("/settings")]
async fn put_settings(state: StateData, auth: Authenticated, body: web::Json<UpdateSettingsRequest>) -> JsonResult<SiteSettings> {
    let UpdateSettingsRequest { site_name, theme_color } = body.into_inner();
    let settings = blocking(move || state.library.update_settings(&auth.0, &site_name, &theme_color)).await?;
    Ok(web::Json(settings.into()))
}
