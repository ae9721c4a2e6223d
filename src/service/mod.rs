//! Request handlers: resolve the acting user, call the movie service and
//! shape the HTTP response.

pub mod movie_service;
pub mod user_context;

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::MovieForm;
use crate::service::movie_service::MovieFilter;
use crate::service::user_context::UserContext;

/// Body returned when a create or edit fails, so the client can redisplay
/// the submitted form alongside the message.
#[derive(Debug, Serialize, Deserialize)]
pub struct FormFailure {
    pub error: String,
    pub movie: MovieForm,
}

/// Comment submission body
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(rename = "Comment")]
    pub comment: String,
}

fn header_handler(req: &HttpRequest) -> CatalogResult<UserContext> {
    let context = UserContext::from_request(req)?;
    debug!("{} {} as user {}", req.method(), req.path(), context.user_id);
    Ok(context)
}

fn redisplay(form: MovieForm, e: CatalogError) -> HttpResponse {
    error!("Failed to save movie {:?}: {}", form.title, e);
    HttpResponse::build(e.status_code()).json(FormFailure {
        error: e.to_string(),
        movie: form,
    })
}

pub async fn list_service(filter: MovieFilter, app_state: web::Data<AppState>) -> CatalogResult<HttpResponse> {
    let movies = app_state.movie_service.list(&filter).await?;
    debug!("Listing {} movies (filter: {:?})", movies.len(), filter);
    Ok(HttpResponse::Ok().json(movies))
}

pub async fn details_service(id: String, app_state: web::Data<AppState>) -> CatalogResult<HttpResponse> {
    let movie = app_state.movie_service.details(&id).await?;
    Ok(HttpResponse::Ok().json(movie))
}

pub async fn edit_view_service(
    id: String,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    let context = header_handler(&req)?;
    let movie = app_state.movie_service.edit_view(&context, &id).await?;
    Ok(HttpResponse::Ok().json(movie))
}

pub async fn delete_view_service(
    id: String,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    let context = header_handler(&req)?;
    let movie = app_state.movie_service.delete_view(&context, &id).await?;
    Ok(HttpResponse::Ok().json(movie))
}

pub async fn create_service(
    form: MovieForm,
    file: Option<Bytes>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    let context = header_handler(&req)?;

    match app_state.movie_service.create(&context, form.clone(), file).await {
        Ok(movie) => Ok(HttpResponse::Created().json(movie)),
        Err(e) => Ok(redisplay(form, e)),
    }
}

/// Read the whole upload body, refusing more than `limit` bytes
async fn read_upload(payload: &mut web::Payload, limit: usize) -> CatalogResult<Bytes> {
    let mut bytes = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| CatalogError::Validation(format!("failed to read upload: {}", e)))?;
        if bytes.len() + chunk.len() > limit {
            return Err(CatalogError::Validation(format!("upload exceeds {} bytes", limit)));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes.freeze())
}

/// Create a movie whose file arrives as the raw request body
pub async fn upload_service(
    form: MovieForm,
    mut payload: web::Payload,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    info!("Starting chunk load for upload {:?}", form.file_name);
    let data = match read_upload(&mut payload, app_state.config.server.max_payload_size).await {
        Ok(data) => data,
        Err(e) => return Ok(redisplay(form, e)),
    };
    info!("Total received data size: {} bytes", data.len());

    create_service(form, Some(data), req, app_state).await
}

pub async fn update_service(
    id: String,
    form: MovieForm,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    let context = header_handler(&req)?;

    match app_state.movie_service.update(&context, &id, form.clone()).await {
        Ok(movie) => Ok(HttpResponse::Ok().json(movie)),
        Err(e) => Ok(redisplay(form, e)),
    }
}

pub async fn delete_service(
    id: String,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    let context = header_handler(&req)?;
    app_state.movie_service.delete(&context, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn comment_service(
    id: String,
    comment: CommentForm,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    let context = header_handler(&req)?;
    app_state
        .movie_service
        .append_comment(&context, &id, &comment.comment)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn download_service(id: String, app_state: web::Data<AppState>) -> CatalogResult<HttpResponse> {
    let url = app_state.movie_service.download_url(&id).await?;
    debug!("Redirecting download of {} to {}", id, url);
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .finish())
}
