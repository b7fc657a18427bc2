use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::db::schema::{
    gallery_item_translations, gallery_items, order_items, orders, product_characteristics,
    product_images, product_translations, products,
};

#[derive(Debug, Queryable)]
pub struct ProductRow {
    pub id: i32,
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Queryable)]
pub struct ProductTranslationRow {
    pub product_id: i32,
    pub language: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Queryable)]
pub struct CategoryRow {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub name: String,
}

#[derive(Debug, Queryable)]
pub struct GalleryItemRow {
    pub id: i32,
    pub category_id: i32,
    pub thumbnail: String,
    pub full_image: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Queryable)]
pub struct OrderRow {
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
}

/// Order line as stored, name and image snapshotted at order time.
#[derive(Debug, Queryable)]
pub struct OrderItemRow {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: f64,
    pub product_name: String,
    pub product_image: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_translations)]
pub struct NewProductTranslation {
    pub product_id: i32,
    pub language: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_characteristics)]
pub struct NewProductCharacteristic {
    pub product_id: i32,
    pub language: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_images)]
pub struct NewProductImage {
    pub product_id: i32,
    pub url: String,
    pub is_main: bool,
    pub sort_order: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = gallery_items)]
pub struct NewGalleryItem {
    pub category_id: i32,
    pub thumbnail: String,
    pub full_image: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = gallery_item_translations)]
pub struct NewGalleryItemTranslation {
    pub gallery_item_id: i32,
    pub language: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub comment: String,
    pub status: String,
    pub total_cost: f64,
    pub language: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: f64,
    pub product_name: String,
    pub product_image: String,
}

impl ProductTranslationRow {
    /// Applies a partial translation update on top of the stored row.
    /// Empty strings and non-positive prices leave the stored value in place,
    /// so a client can patch a single field without resending the rest.
    pub fn merged_with(&self, patch: &crate::models::ProductTranslationPatch) -> NewProductTranslation {
        let name = match &patch.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.name.clone(),
        };
        let description = match &patch.description {
            Some(description) if !description.is_empty() => description.clone(),
            _ => self.description.clone(),
        };
        let price = match patch.price {
            Some(price) if price > 0.0 => price,
            _ => self.price,
        };
        let currency = match &patch.currency {
            Some(currency) if !currency.is_empty() => currency.clone(),
            _ => self.currency.clone(),
        };
        NewProductTranslation {
            product_id: self.product_id,
            language: self.language.clone(),
            name,
            description,
            price,
            currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductTranslationPatch;

    fn stored() -> ProductTranslationRow {
        ProductTranslationRow {
            product_id: 7,
            language: "ru".to_string(),
            name: "Шкатулка".to_string(),
            description: "Дерево".to_string(),
            price: 1500.0,
            currency: "RUB".to_string(),
        }
    }

    #[test]
    fn merge_overrides_only_provided_fields() {
        let patch = ProductTranslationPatch {
            name: Some("Шкатулка резная".to_string()),
            description: None,
            price: Some(1800.0),
            currency: None,
            characteristics: None,
        };
        let merged = stored().merged_with(&patch);
        assert_eq!(merged.name, "Шкатулка резная");
        assert_eq!(merged.description, "Дерево");
        assert_eq!(merged.price, 1800.0);
        assert_eq!(merged.currency, "RUB");
    }

    #[test]
    fn merge_ignores_empty_strings_and_nonpositive_price() {
        let patch = ProductTranslationPatch {
            name: Some(String::new()),
            description: Some(String::new()),
            price: Some(0.0),
            currency: Some(String::new()),
            characteristics: None,
        };
        let merged = stored().merged_with(&patch);
        assert_eq!(merged.name, "Шкатулка");
        assert_eq!(merged.price, 1500.0);
        assert_eq!(merged.currency, "RUB");
    }
}
