use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::db::models::NewOrder;
use crate::db::{connection, repository};
use crate::errors::ApiError;
use crate::models::{
    order_total, ApiResponse, ContactFormRequest, OrderRequest, OrderResponse, DEFAULT_LANGUAGE,
    SUPPORTED_LANGUAGES,
};
use crate::AppState;

/// First supported language prefix from `Accept-Language`, else "ru".
pub fn preferred_language(header: Option<&str>) -> String {
    if let Some(header) = header {
        for part in header.split(',') {
            let tag = part.split(';').next().unwrap_or("").trim();
            for supported in SUPPORTED_LANGUAGES {
                if tag == supported || tag.starts_with(&format!("{supported}-")) {
                    return supported.to_string();
                }
            }
        }
    }
    DEFAULT_LANGUAGE.to_string()
}

fn order_success_message(language: &str) -> &'static str {
    match language {
        "en" => "Order successfully created",
        "es" => "Pedido creado exitosamente",
        _ => "Заказ успешно создан",
    }
}

fn contact_success_message(language: &str) -> &'static str {
    match language {
        "en" => "Message sent successfully",
        "es" => "Mensaje enviado exitosamente",
        _ => "Сообщение успешно отправлено",
    }
}

pub async fn create_order(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<OrderRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(ApiError::Validation)?;

    let language = match body.language.as_deref().filter(|l| !l.is_empty()) {
        Some(lang) if SUPPORTED_LANGUAGES.contains(&lang) => lang.to_string(),
        _ => preferred_language(
            req.headers()
                .get("Accept-Language")
                .and_then(|v| v.to_str().ok()),
        ),
    };

    let mut conn = connection::conn(&state.pool)?;

    // Every line is re-priced and snapshotted from the catalog; an unknown
    // product id fails the whole order.
    let priced_items =
        repository::price_items(&mut conn, &body.items, &language).map_err(|err| match err {
            diesel::result::Error::NotFound => {
                ApiError::BadRequest("Один из товаров не найден".to_string())
            }
            other => ApiError::dependency("Ошибка при создании заказа", other),
        })?;

    let new_order = NewOrder {
        name: body.name.clone(),
        email: body.email.clone(),
        phone: body.phone.clone(),
        comment: body.comment.clone(),
        status: "new".to_string(),
        total_cost: order_total(&priced_items),
        language: language.clone(),
    };

    let order_id = repository::create_order(&mut conn, &new_order, &priced_items)
        .map_err(|err| ApiError::dependency("Ошибка при создании заказа", err))?;

    // The order is committed; confirmation is best effort from here on.
    match repository::get_order_by_id(&mut conn, order_id) {
        Ok(order) => {
            if let Err(err) = state.sender.send_order_confirmation(&order) {
                tracing::error!(order_id, error = %err, "order confirmation dispatch failed");
            }
        }
        Err(err) => {
            tracing::error!(order_id, error = %err, "order read-back for confirmation failed");
        }
    }

    Ok(HttpResponse::Ok().json(OrderResponse {
        success: true,
        order_id,
        message: order_success_message(&language).to_string(),
    }))
}

pub async fn submit_contact_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ContactFormRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(ApiError::Validation)?;

    let language = match body.language.as_deref().filter(|l| !l.is_empty()) {
        Some(lang) if SUPPORTED_LANGUAGES.contains(&lang) => lang.to_string(),
        _ => preferred_language(
            req.headers()
                .get("Accept-Language")
                .and_then(|v| v.to_str().ok()),
        ),
    };

    let mut form = body.into_inner();
    form.language = Some(language.clone());

    // Delivery is the only effect of this endpoint, so a dispatch failure
    // is a failed request, unlike the order path.
    state
        .sender
        .send_contact_form(&form)
        .map_err(|err| ApiError::dependency("Ошибка при отправке сообщения", err))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({
        "message": contact_success_message(&language),
    }))))
}
