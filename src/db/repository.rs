use std::collections::HashMap;

use chrono::Utc;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Double;

use crate::db::models::{
    CategoryRow, GalleryItemRow, NewGalleryItem, NewGalleryItemTranslation, NewOrder, NewOrderItem,
    NewProduct, NewProductCharacteristic, NewProductImage, NewProductTranslation, OrderItemRow,
    OrderRow, ProductRow, ProductTranslationRow,
};
use crate::db::schema::{
    categories, category_translations, gallery_item_translations, gallery_items, order_items,
    orders, product_characteristics, product_images, product_translations, products,
};
use crate::models::{
    total_pages, Category, GalleryFilter, GalleryItem, GalleryItemCreateRequest, Order, OrderItem,
    OrderItemRequest, PricedItem, Product, ProductCreateRequest, ProductDetail, ProductFilter,
    ProductList, ProductUpdateRequest, SortDirection, DEFAULT_PRODUCT_IMAGE, DEFAULT_RELATED_LIMIT,
};

/// The nine columns a localized product row is read from.
macro_rules! product_columns {
    () => {
        (
            products::id,
            products::category_id,
            products::subcategory_id,
            products::created_at,
            products::updated_at,
            product_translations::name,
            product_translations::description,
            product_translations::price,
            product_translations::currency,
        )
    };
}

/// Builds the filtered product query for a given select clause. The count
/// query and the page query both expand this macro, so their predicates are
/// the same construction by definition.
macro_rules! filtered_products {
    ($filter:expr, $select:expr) => {{
        let mut query = products::table
            .inner_join(product_translations::table)
            .filter(product_translations::language.eq($filter.language.clone()))
            .select($select)
            .into_boxed();
        if let Some(category_id) = $filter.category_id {
            query = query.filter(products::category_id.eq(category_id));
        }
        if let Some(subcategory_id) = $filter.subcategory_id {
            query = query.filter(products::subcategory_id.eq(subcategory_id));
        }
        if let Some(search) = &$filter.search {
            let pattern = format!("%{}%", search);
            query = query.filter(
                product_translations::name
                    .ilike(pattern.clone())
                    .or(product_translations::description.ilike(pattern)),
            );
        }
        query
    }};
}

pub fn get_products(conn: &mut PgConnection, filter: &ProductFilter) -> QueryResult<ProductList> {
    let total_items: i64 =
        filtered_products!(filter, diesel::dsl::count_star()).get_result(conn)?;

    let mut query = filtered_products!(filter, product_columns!());
    query = match filter.sort_price {
        Some(SortDirection::Asc) => query.order(product_translations::price.asc()),
        Some(SortDirection::Desc) => query.order(product_translations::price.desc()),
        None => query.order(products::id.desc()),
    };
    let rows: Vec<ProductRow> = query
        .limit(filter.page_size)
        .offset(filter.offset())
        .load(conn)?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(hydrate_product(conn, row, &filter.language));
    }

    Ok(ProductList {
        items,
        total_items,
        page: filter.page,
        page_size: filter.page_size,
        total_pages: total_pages(total_items, filter.page_size),
    })
}

pub fn get_product_by_id(
    conn: &mut PgConnection,
    product_id: i32,
    language: &str,
) -> QueryResult<ProductDetail> {
    let row: ProductRow = products::table
        .inner_join(product_translations::table)
        .filter(products::id.eq(product_id))
        .filter(product_translations::language.eq(language))
        .select(product_columns!())
        .first(conn)?;

    let product = hydrate_product(conn, row, language);

    // Related products are decoration on the detail page; a failed fetch
    // degrades to an empty list rather than a failed request.
    let related_products =
        match get_related_products(conn, product_id, language, DEFAULT_RELATED_LIMIT) {
            Ok(related) => related,
            Err(err) => {
                tracing::warn!(product_id, error = %err, "failed to load related products");
                Vec::new()
            }
        };

    Ok(ProductDetail {
        product,
        related_products,
    })
}

/// Random sample of other products from the same category, localized.
pub fn get_related_products(
    conn: &mut PgConnection,
    product_id: i32,
    language: &str,
    limit: i64,
) -> QueryResult<Vec<Product>> {
    let category_id: i32 = products::table
        .find(product_id)
        .select(products::category_id)
        .get_result(conn)?;

    let rows: Vec<ProductRow> = products::table
        .inner_join(product_translations::table)
        .filter(products::category_id.eq(category_id))
        .filter(products::id.ne(product_id))
        .filter(product_translations::language.eq(language))
        .select(product_columns!())
        .order(sql::<Double>("RANDOM()"))
        .limit(limit)
        .load(conn)?;

    let mut related = Vec::with_capacity(rows.len());
    for row in rows {
        let images = vec![main_image_for(conn, row.id)];
        related.push(product_view(row, images, None));
    }
    Ok(related)
}

fn hydrate_product(conn: &mut PgConnection, row: ProductRow, language: &str) -> Product {
    let images = product_images_for(conn, row.id);
    let characteristics = characteristics_for(conn, row.id, language);
    product_view(row, images, characteristics)
}

fn product_view(
    row: ProductRow,
    images: Vec<String>,
    characteristics: Option<HashMap<String, String>>,
) -> Product {
    Product {
        id: row.id,
        category_id: row.category_id,
        subcategory_id: row.subcategory_id,
        images,
        created_at: row.created_at,
        updated_at: row.updated_at,
        name: row.name,
        description: row.description,
        price: row.price,
        currency: row.currency,
        characteristics,
    }
}

fn product_images_for(conn: &mut PgConnection, product_id: i32) -> Vec<String> {
    let loaded: QueryResult<Vec<String>> = product_images::table
        .filter(product_images::product_id.eq(product_id))
        .order((product_images::is_main.desc(), product_images::sort_order.asc()))
        .select(product_images::url)
        .load(conn);
    match loaded {
        Ok(urls) if !urls.is_empty() => urls,
        Ok(_) => vec![DEFAULT_PRODUCT_IMAGE.to_string()],
        Err(err) => {
            tracing::warn!(product_id, error = %err, "failed to load product images");
            vec![DEFAULT_PRODUCT_IMAGE.to_string()]
        }
    }
}

fn main_image_for(conn: &mut PgConnection, product_id: i32) -> String {
    let main: QueryResult<Option<String>> = product_images::table
        .filter(product_images::product_id.eq(product_id))
        .order((product_images::is_main.desc(), product_images::sort_order.asc()))
        .select(product_images::url)
        .first(conn)
        .optional();
    match main {
        Ok(Some(url)) => url,
        Ok(None) => DEFAULT_PRODUCT_IMAGE.to_string(),
        Err(err) => {
            tracing::warn!(product_id, error = %err, "failed to load main product image");
            DEFAULT_PRODUCT_IMAGE.to_string()
        }
    }
}

fn characteristics_for(
    conn: &mut PgConnection,
    product_id: i32,
    language: &str,
) -> Option<HashMap<String, String>> {
    let loaded: QueryResult<Vec<(String, String)>> = product_characteristics::table
        .filter(product_characteristics::product_id.eq(product_id))
        .filter(product_characteristics::language.eq(language))
        .select((product_characteristics::key, product_characteristics::value))
        .load(conn);
    match loaded {
        Ok(pairs) if !pairs.is_empty() => Some(pairs.into_iter().collect()),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(product_id, error = %err, "failed to load product characteristics");
            None
        }
    }
}

pub fn create_product(conn: &mut PgConnection, req: &ProductCreateRequest) -> QueryResult<i32> {
    conn.transaction(|conn| {
        let product_id: i32 = diesel::insert_into(products::table)
            .values(NewProduct {
                category_id: req.category_id,
                subcategory_id: req.subcategory_id,
            })
            .returning(products::id)
            .get_result(conn)?;

        for (language, translation) in &req.translations {
            diesel::insert_into(product_translations::table)
                .values(NewProductTranslation {
                    product_id,
                    language: language.clone(),
                    name: translation.name.clone(),
                    description: translation.description.clone().unwrap_or_default(),
                    price: translation.price,
                    currency: translation.currency.clone(),
                })
                .execute(conn)?;

            if let Some(characteristics) = &translation.characteristics {
                insert_characteristics(conn, product_id, language, characteristics)?;
            }
        }

        insert_images(conn, product_id, &req.images)?;
        Ok(product_id)
    })
}

pub fn update_product(
    conn: &mut PgConnection,
    product_id: i32,
    req: &ProductUpdateRequest,
) -> QueryResult<()> {
    conn.transaction(|conn| {
        let (current_category, current_subcategory): (i32, Option<i32>) = products::table
            .find(product_id)
            .select((products::category_id, products::subcategory_id))
            .get_result(conn)?;

        diesel::update(products::table.find(product_id))
            .set((
                products::category_id.eq(req.category_id.unwrap_or(current_category)),
                products::subcategory_id.eq(req.subcategory_id.or(current_subcategory)),
                products::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        for (language, patch) in &req.translations {
            let existing: Option<ProductTranslationRow> = product_translations::table
                .find((product_id, language.as_str()))
                .get_result(conn)
                .optional()?;

            match existing {
                Some(row) => {
                    let merged = row.merged_with(patch);
                    diesel::update(product_translations::table.find((product_id, language.as_str())))
                        .set((
                            product_translations::name.eq(merged.name),
                            product_translations::description.eq(merged.description),
                            product_translations::price.eq(merged.price),
                            product_translations::currency.eq(merged.currency),
                        ))
                        .execute(conn)?;
                }
                None => {
                    diesel::insert_into(product_translations::table)
                        .values(NewProductTranslation {
                            product_id,
                            language: language.clone(),
                            name: patch.name.clone().unwrap_or_default(),
                            description: patch.description.clone().unwrap_or_default(),
                            price: patch.price.unwrap_or_default(),
                            currency: patch.currency.clone().unwrap_or_else(|| "RUB".to_string()),
                        })
                        .execute(conn)?;
                }
            }

            // Characteristics replace that language's set wholesale.
            if let Some(characteristics) = &patch.characteristics {
                if !characteristics.is_empty() {
                    diesel::delete(
                        product_characteristics::table
                            .filter(product_characteristics::product_id.eq(product_id))
                            .filter(product_characteristics::language.eq(language)),
                    )
                    .execute(conn)?;
                    insert_characteristics(conn, product_id, language, characteristics)?;
                }
            }
        }

        // An images field in the request replaces the whole set, even when
        // it is empty.
        if let Some(images) = &req.images {
            diesel::delete(product_images::table.filter(product_images::product_id.eq(product_id)))
                .execute(conn)?;
            insert_images(conn, product_id, images)?;
        }

        Ok(())
    })
}

fn insert_characteristics(
    conn: &mut PgConnection,
    product_id: i32,
    language: &str,
    characteristics: &HashMap<String, String>,
) -> QueryResult<()> {
    let rows: Vec<NewProductCharacteristic> = characteristics
        .iter()
        .map(|(key, value)| NewProductCharacteristic {
            product_id,
            language: language.to_string(),
            key: key.clone(),
            value: value.clone(),
        })
        .collect();
    if rows.is_empty() {
        return Ok(());
    }
    diesel::insert_into(product_characteristics::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

// First submitted image becomes the main one.
fn insert_images(conn: &mut PgConnection, product_id: i32, urls: &[String]) -> QueryResult<()> {
    let rows: Vec<NewProductImage> = urls
        .iter()
        .enumerate()
        .map(|(index, url)| NewProductImage {
            product_id,
            url: url.clone(),
            is_main: index == 0,
            sort_order: index as i32,
        })
        .collect();
    if rows.is_empty() {
        return Ok(());
    }
    diesel::insert_into(product_images::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

pub fn get_categories(conn: &mut PgConnection, language: &str) -> QueryResult<Vec<Category>> {
    let parents: Vec<CategoryRow> = categories::table
        .inner_join(category_translations::table)
        .filter(categories::parent_id.is_null())
        .filter(category_translations::language.eq(language))
        .select((
            categories::id,
            categories::parent_id,
            categories::created_at,
            categories::updated_at,
            category_translations::name,
        ))
        .order(category_translations::name.asc())
        .load(conn)?;

    let mut tree = Vec::with_capacity(parents.len());
    for parent in parents {
        let subcategories = subcategories_for(conn, parent.id, language);
        tree.push(Category {
            id: parent.id,
            parent_id: parent.parent_id,
            created_at: parent.created_at,
            updated_at: parent.updated_at,
            name: parent.name,
            subcategories,
        });
    }
    Ok(tree)
}

fn subcategories_for(conn: &mut PgConnection, parent_id: i32, language: &str) -> Vec<Category> {
    let loaded: QueryResult<Vec<CategoryRow>> = categories::table
        .inner_join(category_translations::table)
        .filter(categories::parent_id.eq(parent_id))
        .filter(category_translations::language.eq(language))
        .select((
            categories::id,
            categories::parent_id,
            categories::created_at,
            categories::updated_at,
            category_translations::name,
        ))
        .order(category_translations::name.asc())
        .load(conn);
    match loaded {
        Ok(rows) => rows
            .into_iter()
            .map(|row| Category {
                id: row.id,
                parent_id: row.parent_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
                name: row.name,
                subcategories: Vec::new(),
            })
            .collect(),
        Err(err) => {
            tracing::warn!(parent_id, error = %err, "failed to load subcategories");
            Vec::new()
        }
    }
}

pub fn get_gallery_items(
    conn: &mut PgConnection,
    filter: &GalleryFilter,
) -> QueryResult<Vec<GalleryItem>> {
    let mut query = gallery_items::table
        .inner_join(gallery_item_translations::table)
        .filter(gallery_item_translations::language.eq(filter.language.clone()))
        .select((
            gallery_items::id,
            gallery_items::category_id,
            gallery_items::thumbnail,
            gallery_items::full_image,
            gallery_items::created_at,
            gallery_items::updated_at,
            gallery_item_translations::title,
            gallery_item_translations::description,
        ))
        .into_boxed();
    if let Some(category_id) = filter.category_id {
        query = query.filter(gallery_items::category_id.eq(category_id));
    }
    let rows: Vec<GalleryItemRow> = query
        .order(gallery_items::created_at.desc())
        .limit(filter.page_size)
        .offset(filter.offset())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| GalleryItem {
            id: row.id,
            category_id: row.category_id,
            thumbnail: row.thumbnail,
            full_image: row.full_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
            title: row.title,
            description: row.description,
        })
        .collect())
}

pub fn create_gallery_item(
    conn: &mut PgConnection,
    req: &GalleryItemCreateRequest,
) -> QueryResult<i32> {
    conn.transaction(|conn| {
        let item_id: i32 = diesel::insert_into(gallery_items::table)
            .values(NewGalleryItem {
                category_id: req.category_id,
                thumbnail: req.thumbnail.clone(),
                full_image: req.full_image.clone(),
            })
            .returning(gallery_items::id)
            .get_result(conn)?;

        for (language, translation) in &req.translations {
            diesel::insert_into(gallery_item_translations::table)
                .values(NewGalleryItemTranslation {
                    gallery_item_id: item_id,
                    language: language.clone(),
                    title: translation.title.clone(),
                    description: translation.description.clone(),
                })
                .execute(conn)?;
        }
        Ok(item_id)
    })
}

/// Hard delete; translations go with the parent row via the cascading FK.
pub fn delete_gallery_item(conn: &mut PgConnection, item_id: i32) -> QueryResult<()> {
    let deleted = diesel::delete(gallery_items::table.find(item_id)).execute(conn)?;
    if deleted == 0 {
        return Err(diesel::result::Error::NotFound);
    }
    Ok(())
}

/// Resolves every requested line against the catalog in the order's
/// language, snapshotting price, name and main image. A single unresolvable
/// product id fails the whole lot with `NotFound`.
pub fn price_items(
    conn: &mut PgConnection,
    items: &[OrderItemRequest],
    language: &str,
) -> QueryResult<Vec<PricedItem>> {
    let mut priced = Vec::with_capacity(items.len());
    for item in items {
        let (price, product_name): (f64, String) = product_translations::table
            .find((item.product_id, language))
            .select((product_translations::price, product_translations::name))
            .get_result(conn)?;
        priced.push(PricedItem {
            product_id: item.product_id,
            quantity: item.quantity,
            price,
            product_name,
            product_image: main_image_for(conn, item.product_id),
        });
    }
    Ok(priced)
}

/// Inserts the order and its priced items in one transaction.
pub fn create_order(
    conn: &mut PgConnection,
    order: &NewOrder,
    items: &[PricedItem],
) -> QueryResult<i32> {
    conn.transaction(|conn| {
        let order_id: i32 = diesel::insert_into(orders::table)
            .values(order)
            .returning(orders::id)
            .get_result(conn)?;

        let rows: Vec<NewOrderItem> = items
            .iter()
            .map(|item| NewOrderItem {
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                product_name: item.product_name.clone(),
                product_image: item.product_image.clone(),
            })
            .collect();
        if !rows.is_empty() {
            diesel::insert_into(order_items::table)
                .values(&rows)
                .execute(conn)?;
        }
        Ok(order_id)
    })
}

/// Reads an order back with its snapshotted items, for the confirmation
/// notification.
pub fn get_order_by_id(conn: &mut PgConnection, order_id: i32) -> QueryResult<Order> {
    let row: OrderRow = orders::table.find(order_id).get_result(conn)?;

    let item_rows: Vec<OrderItemRow> = order_items::table
        .filter(order_items::order_id.eq(order_id))
        .order(order_items::id.asc())
        .load(conn)?;

    let items = item_rows
        .into_iter()
        .map(|item| OrderItem {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            product_name: item.product_name,
            product_image: item.product_image,
        })
        .collect();

    Ok(Order {
        id: row.id,
        name: row.name,
        email: row.email,
        phone: row.phone,
        comment: row.comment,
        status: row.status,
        total_cost: row.total_cost,
        language: row.language,
        created_at: row.created_at,
        updated_at: row.updated_at,
        items,
    })
}
