use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::api::auth::AdminAuth;
use crate::api::parse_path_id;
use crate::db::{connection, repository};
use crate::errors::{not_found_or_dependency, ApiError};
use crate::models::{
    normalize_language, parse_positive, ApiResponse, LanguageQuery, ProductCreateRequest,
    ProductFilter, ProductListQuery, ProductUpdateRequest, RelatedQuery, DEFAULT_LANGUAGE,
    DEFAULT_RELATED_LIMIT,
};
use crate::AppState;

pub async fn get_products(
    state: web::Data<AppState>,
    query: web::Query<ProductListQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = ProductFilter::from_query(&query);
    let mut conn = connection::conn(&state.pool)?;
    let list = repository::get_products(&mut conn, &filter)
        .map_err(|err| ApiError::dependency("Ошибка при получении списка товаров", err))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(list)))
}

pub async fn get_product_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LanguageQuery>,
) -> Result<HttpResponse, ApiError> {
    let product_id = parse_path_id(&path, "Некорректный ID товара")?;
    let language = normalize_language(query.language.as_deref());
    let mut conn = connection::conn(&state.pool)?;
    let detail = repository::get_product_by_id(&mut conn, product_id, &language)
        .map_err(|err| not_found_or_dependency(err, "Товар не найден", "Ошибка при получении товара"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(detail)))
}

pub async fn get_related_products(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RelatedQuery>,
) -> Result<HttpResponse, ApiError> {
    let product_id = parse_path_id(&path, "Некорректный ID товара")?;
    let language = normalize_language(query.language.as_deref());
    let limit = parse_positive(query.limit.as_deref(), DEFAULT_RELATED_LIMIT);
    let mut conn = connection::conn(&state.pool)?;
    let related = repository::get_related_products(&mut conn, product_id, &language, limit)
        .map_err(|err| {
            not_found_or_dependency(
                err,
                "Товар не найден",
                "Ошибка при получении связанных товаров",
            )
        })?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(related)))
}

pub async fn get_categories(
    state: web::Data<AppState>,
    query: web::Query<LanguageQuery>,
) -> Result<HttpResponse, ApiError> {
    let language = normalize_language(query.language.as_deref());
    let mut conn = connection::conn(&state.pool)?;
    let tree = repository::get_categories(&mut conn, &language)
        .map_err(|err| ApiError::dependency("Ошибка при получении списка категорий", err))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tree)))
}

pub async fn create_product(
    _auth: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<ProductCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    if !body.translations.contains_key(DEFAULT_LANGUAGE) {
        return Err(ApiError::BadRequest(
            "Отсутствует обязательный перевод для русского языка".to_string(),
        ));
    }

    let mut conn = connection::conn(&state.pool)?;
    let product_id = repository::create_product(&mut conn, &body)
        .map_err(|err| ApiError::dependency("Ошибка при создании товара", err))?;

    let mut payload = json!({
        "id": product_id,
        "message": "Товар успешно создан",
    });
    // Read-back is informational only; the product is already committed.
    match repository::get_product_by_id(&mut conn, product_id, DEFAULT_LANGUAGE) {
        Ok(detail) => payload["product"] = serde_json::to_value(&detail).unwrap_or_default(),
        Err(err) => tracing::warn!(product_id, error = %err, "created product read-back failed"),
    }
    Ok(HttpResponse::Created().json(ApiResponse::ok(payload)))
}

pub async fn update_product(
    _auth: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ProductUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let product_id = parse_path_id(&path, "Некорректный ID товара")?;
    let mut conn = connection::conn(&state.pool)?;

    repository::update_product(&mut conn, product_id, &body).map_err(|err| {
        not_found_or_dependency(err, "Товар не найден", "Ошибка при обновлении товара")
    })?;

    let mut payload = json!({
        "id": product_id,
        "message": "Товар успешно обновлен",
    });
    match repository::get_product_by_id(&mut conn, product_id, DEFAULT_LANGUAGE) {
        Ok(detail) => payload["product"] = serde_json::to_value(&detail).unwrap_or_default(),
        Err(err) => tracing::warn!(product_id, error = %err, "updated product read-back failed"),
    }
    Ok(HttpResponse::Ok().json(ApiResponse::ok(payload)))
}
