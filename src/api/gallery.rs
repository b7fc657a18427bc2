use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::api::auth::AdminAuth;
use crate::api::parse_path_id;
use crate::db::{connection, repository};
use crate::errors::{not_found_or_dependency, ApiError};
use crate::models::{
    ApiResponse, GalleryFilter, GalleryItemCreateRequest, GalleryListQuery, DEFAULT_LANGUAGE,
};
use crate::AppState;

pub async fn get_gallery_items(
    state: web::Data<AppState>,
    query: web::Query<GalleryListQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = GalleryFilter::from_query(&query);
    let mut conn = connection::conn(&state.pool)?;
    let items = repository::get_gallery_items(&mut conn, &filter)
        .map_err(|err| ApiError::dependency("Ошибка при получении галереи", err))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(items)))
}

pub async fn create_gallery_item(
    _auth: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<GalleryItemCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    if !body.translations.contains_key(DEFAULT_LANGUAGE) {
        return Err(ApiError::BadRequest(
            "Отсутствует обязательный перевод для русского языка".to_string(),
        ));
    }

    let mut conn = connection::conn(&state.pool)?;
    let item_id = repository::create_gallery_item(&mut conn, &body)
        .map_err(|err| ApiError::dependency("Ошибка при создании элемента галереи", err))?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(json!({
        "id": item_id,
        "message": "Элемент галереи успешно создан",
    }))))
}

pub async fn delete_gallery_item(
    _auth: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let item_id = parse_path_id(&path, "Некорректный ID элемента")?;
    let mut conn = connection::conn(&state.pool)?;

    repository::delete_gallery_item(&mut conn, item_id).map_err(|err| {
        not_found_or_dependency(
            err,
            "Элемент галереи не найден",
            "Ошибка при удалении элемента галереи",
        )
    })?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({
        "id": item_id,
        "message": "Элемент галереи успешно удален",
    }))))
}
