//! HTTP routes of the catalog

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

use crate::app_state::AppState;
use crate::error::CatalogResult;
use crate::metadata::MovieForm;
use crate::service::movie_service::MovieFilter;
use crate::service::{
    comment_service, create_service, delete_service, delete_view_service, details_service,
    download_service, edit_view_service, list_service, update_service, upload_service, CommentForm,
};

#[get("/movies")]
pub async fn list(filter: web::Query<MovieFilter>, app_state: web::Data<AppState>) -> CatalogResult<HttpResponse> {
    list_service(filter.into_inner(), app_state).await
}

#[post("/movies")]
pub async fn create(
    form: web::Json<MovieForm>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    create_service(form.into_inner(), None, req, app_state).await
}

#[post("/movies/upload")]
pub async fn upload(
    form: web::Query<MovieForm>,
    payload: web::Payload,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    upload_service(form.into_inner(), payload, req, app_state).await
}

#[get("/movies/{id}")]
pub async fn details(id: web::Path<String>, app_state: web::Data<AppState>) -> CatalogResult<HttpResponse> {
    details_service(id.into_inner(), app_state).await
}

#[get("/movies/{id}/edit")]
pub async fn edit_view(
    id: web::Path<String>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    edit_view_service(id.into_inner(), req, app_state).await
}

#[put("/movies/{id}")]
pub async fn update(
    id: web::Path<String>,
    form: web::Json<MovieForm>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    update_service(id.into_inner(), form.into_inner(), req, app_state).await
}

#[get("/movies/{id}/delete")]
pub async fn delete_view(
    id: web::Path<String>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    delete_view_service(id.into_inner(), req, app_state).await
}

#[delete("/movies/{id}")]
pub async fn remove(
    id: web::Path<String>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    delete_service(id.into_inner(), req, app_state).await
}

#[post("/movies/{id}/comments")]
pub async fn comment(
    id: web::Path<String>,
    comment: web::Json<CommentForm>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> CatalogResult<HttpResponse> {
    comment_service(id.into_inner(), comment.into_inner(), req, app_state).await
}

#[get("/movies/{id}/download")]
pub async fn download(id: web::Path<String>, app_state: web::Data<AppState>) -> CatalogResult<HttpResponse> {
    download_service(id.into_inner(), app_state).await
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Register every catalog route. `/movies/upload` precedes `/movies/{id}`
/// so it is never taken for a movie id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(list)
        .service(create)
        .service(upload)
        .service(edit_view)
        .service(delete_view)
        .service(download)
        .service(comment)
        .service(details)
        .service(update)
        .service(remove);
}
