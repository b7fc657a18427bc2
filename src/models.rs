use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::FieldError;

pub const DEFAULT_LANGUAGE: &str = "ru";
pub const SUPPORTED_LANGUAGES: [&str; 3] = ["ru", "en", "es"];
pub const DEFAULT_PRODUCT_IMAGE: &str = "/default-product-image.jpg";
pub const DEFAULT_RELATED_LIMIT: i64 = 5;

const REQUIRED_MESSAGE: &str = "Поле обязательно для заполнения";
const EMAIL_MESSAGE: &str = "Некорректный формат email";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Product {
    pub id: i32,
    pub category_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<i32>,
    pub images: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub items: Vec<Product>,
    pub total_items: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct Category {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct GalleryItem {
    pub id: i32,
    pub category_id: i32,
    pub thumbnail: String,
    #[serde(rename = "full")]
    pub full_image: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct Order {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub comment: String,
    pub status: String,
    pub total_cost: f64,
    pub language: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize)]
pub struct OrderItem {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_image: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order_id: i32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductTranslationCreate {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: String,
    pub characteristics: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct ProductCreateRequest {
    #[serde(default)]
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub translations: HashMap<String, ProductTranslationCreate>,
}

#[derive(Debug, Deserialize)]
pub struct ProductTranslationPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub characteristics: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct ProductUpdateRequest {
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub translations: HashMap<String, ProductTranslationPatch>,
}

#[derive(Debug, Deserialize)]
pub struct GalleryTranslationCreate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct GalleryItemCreateRequest {
    #[serde(default)]
    pub category_id: i32,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub full_image: String,
    #[serde(default)]
    pub translations: HashMap<String, GalleryTranslationCreate>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub comment: String,
    pub language: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactFormRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    pub language: Option<String>,
}

/// Catalog snapshot of one order line, resolved at order time. Prices,
/// names and images come from the catalog in the order's language;
/// client-submitted values are never used.
#[derive(Debug, Clone)]
pub struct PricedItem {
    pub product_id: i32,
    pub quantity: i32,
    pub price: f64,
    pub product_name: String,
    pub product_image: String,
}

pub fn order_total(items: &[PricedItem]) -> f64 {
    items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum()
}

/// Raw product listing query. Everything arrives as an optional string and
/// is normalized leniently; a garbled parameter falls back to its default
/// instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub language: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    pub sort_price: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryListQuery {
    pub language: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedQuery {
    pub language: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug)]
pub struct ProductFilter {
    pub language: String,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub search: Option<String>,
    pub sort_price: Option<SortDirection>,
    pub page: i64,
    pub page_size: i64,
}

impl ProductFilter {
    pub const DEFAULT_PAGE_SIZE: i64 = 10;

    pub fn from_query(query: &ProductListQuery) -> Self {
        Self {
            language: normalize_language(query.language.as_deref()),
            category_id: parse_id(query.category.as_deref()),
            subcategory_id: parse_id(query.subcategory.as_deref()),
            search: query
                .search
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string()),
            sort_price: match query.sort_price.as_deref() {
                Some("asc") => Some(SortDirection::Asc),
                Some("desc") => Some(SortDirection::Desc),
                _ => None,
            },
            page: parse_positive(query.page.as_deref(), 1),
            page_size: parse_positive(query.page_size.as_deref(), Self::DEFAULT_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

#[derive(Debug)]
pub struct GalleryFilter {
    pub language: String,
    pub category_id: Option<i32>,
    pub page: i64,
    pub page_size: i64,
}

impl GalleryFilter {
    pub const DEFAULT_PAGE_SIZE: i64 = 15;

    pub fn from_query(query: &GalleryListQuery) -> Self {
        Self {
            language: normalize_language(query.language.as_deref()),
            category_id: parse_id(query.category.as_deref()),
            page: parse_positive(query.page.as_deref(), 1),
            page_size: parse_positive(query.page_size.as_deref(), Self::DEFAULT_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

pub fn normalize_language(raw: Option<&str>) -> String {
    match raw {
        Some(lang) if SUPPORTED_LANGUAGES.contains(&lang) => lang.to_string(),
        _ => DEFAULT_LANGUAGE.to_string(),
    }
}

pub fn parse_id(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|value| value.parse::<i32>().ok())
        .filter(|id| *id > 0)
}

pub fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

pub fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total_items + page_size - 1) / page_size
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"))
}

fn check_required(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, REQUIRED_MESSAGE));
    }
}

fn check_email(errors: &mut Vec<FieldError>, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new("email", REQUIRED_MESSAGE));
    } else if !email_regex().is_match(trimmed) {
        errors.push(FieldError::new("email", EMAIL_MESSAGE));
    }
}

impl OrderRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_required(&mut errors, "name", &self.name);
        check_email(&mut errors, &self.email);
        check_required(&mut errors, "phone", &self.phone);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl ContactFormRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_required(&mut errors, "name", &self.name);
        check_email(&mut errors, &self.email);
        check_required(&mut errors, "phone", &self.phone);
        check_required(&mut errors, "message", &self.message);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_for_empty_query() {
        let filter = ProductFilter::from_query(&ProductListQuery::default());
        assert_eq!(filter.language, "ru");
        assert_eq!(filter.category_id, None);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, 10);
        assert_eq!(filter.offset(), 0);
        assert!(filter.sort_price.is_none());
    }

    #[test]
    fn garbled_parameters_fall_back_to_defaults() {
        let query = ProductListQuery {
            language: Some("de".to_string()),
            category: Some("abc".to_string()),
            subcategory: Some("-3".to_string()),
            search: Some("   ".to_string()),
            sort_price: Some("sideways".to_string()),
            page: Some("zero".to_string()),
            page_size: Some("-5".to_string()),
        };
        let filter = ProductFilter::from_query(&query);
        assert_eq!(filter.language, "ru");
        assert_eq!(filter.category_id, None);
        assert_eq!(filter.subcategory_id, None);
        assert_eq!(filter.search, None);
        assert!(filter.sort_price.is_none());
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, 10);
    }

    #[test]
    fn valid_parameters_are_honored() {
        let query = ProductListQuery {
            language: Some("en".to_string()),
            category: Some("4".to_string()),
            subcategory: Some("9".to_string()),
            search: Some(" box ".to_string()),
            sort_price: Some("desc".to_string()),
            page: Some("3".to_string()),
            page_size: Some("20".to_string()),
        };
        let filter = ProductFilter::from_query(&query);
        assert_eq!(filter.language, "en");
        assert_eq!(filter.category_id, Some(4));
        assert_eq!(filter.subcategory_id, Some(9));
        assert_eq!(filter.search.as_deref(), Some("box"));
        assert_eq!(filter.sort_price, Some(SortDirection::Desc));
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn gallery_filter_default_page_size() {
        let filter = GalleryFilter::from_query(&GalleryListQuery::default());
        assert_eq!(filter.page_size, 15);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn order_total_sums_line_totals() {
        let items = [
            PricedItem {
                product_id: 1,
                quantity: 2,
                price: 100.0,
                product_name: "Шкатулка".to_string(),
                product_image: "/images/box.jpg".to_string(),
            },
            PricedItem {
                product_id: 2,
                quantity: 1,
                price: 49.5,
                product_name: "Брелок".to_string(),
                product_image: String::new(),
            },
        ];
        assert_eq!(order_total(&items), 249.5);
        assert_eq!(order_total(&[]), 0.0);
    }

    #[test]
    fn order_validation_reports_each_field() {
        let request = OrderRequest {
            name: String::new(),
            email: "not-an-email".to_string(),
            phone: " ".to_string(),
            comment: String::new(),
            language: None,
            items: Vec::new(),
        };
        let errors = request.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "phone"]);
        assert_eq!(errors[1].message, EMAIL_MESSAGE);
    }

    #[test]
    fn contact_validation_accepts_well_formed_input() {
        let request = ContactFormRequest {
            name: "Анна".to_string(),
            email: "anna@example.com".to_string(),
            phone: "+7 900 000-00-00".to_string(),
            message: "Здравствуйте".to_string(),
            language: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn email_syntax_edge_cases() {
        for bad in ["a@b", "a b@c.d", "@c.d", "a@", "a@@b.c"] {
            let request = ContactFormRequest {
                name: "n".to_string(),
                email: bad.to_string(),
                phone: "1".to_string(),
                message: "m".to_string(),
                language: None,
            };
            assert!(request.validate().is_err(), "{bad} should fail");
        }
    }
}
