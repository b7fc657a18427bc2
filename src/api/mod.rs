pub mod auth;
pub mod gallery;
pub mod orders;
pub mod products;

use actix_web::{error::InternalError, web, ResponseError};

use crate::errors::ApiError;

/// Path ids arrive as strings; a garbled one is a client error with a
/// route-specific message, never a routing 404.
pub(crate) fn parse_path_id(raw: &str, message: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

/// Malformed JSON bodies get the standard envelope instead of actix's
/// plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        InternalError::from_response(
            err,
            ApiError::BadRequest("Некорректный формат запроса".to_string()).error_response(),
        )
        .into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/products", web::get().to(products::get_products))
            .route("/products", web::post().to(products::create_product))
            .route("/products/{id}", web::get().to(products::get_product_by_id))
            .route("/products/{id}", web::patch().to(products::update_product))
            .route(
                "/products/{id}/related",
                web::get().to(products::get_related_products),
            )
            .route("/categories", web::get().to(products::get_categories))
            .route("/gallery", web::get().to(gallery::get_gallery_items))
            .route("/gallery", web::post().to(gallery::create_gallery_item))
            .route("/gallery/{id}", web::delete().to(gallery::delete_gallery_item))
            .route("/orders", web::post().to(orders::create_order))
            .route("/contact", web::post().to(orders::submit_contact_form)),
    );
}
