//! Product and category models.

use serde::{Deserialize, Serialize};

/// Entry in `GET Product/all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProductResponse {
    #[serde(rename = "productId")]
    pub product_id: i64,
    #[serde(rename = "productName")]
    pub product_name: String,
    #[serde(rename = "briefDescription", default)]
    pub brief_description: Option<String>,
    pub price: f64,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<i64>,
}

/// Response from `GET Product/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProductDetailResponse {
    #[serde(rename = "productId")]
    pub product_id: i64,
    #[serde(rename = "productName")]
    pub product_name: String,
    #[serde(rename = "briefDescription", default)]
    pub brief_description: Option<String>,
    #[serde(rename = "fullDescription", default)]
    pub full_description: Option<String>,
    #[serde(rename = "technicalSpecifications", default)]
    pub technical_specifications: Option<String>,
    pub price: f64,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<i64>,
    #[serde(rename = "cartItems", default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub category: Option<CategoryResponse>,
}

impl ProductDetailResponse {
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.category_name.as_str())
            .unwrap_or("Uncategorized")
    }
}

/// Cart line as embedded in a product detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CartItem {
    #[serde(rename = "cartItemId")]
    pub cart_item_id: i64,
    #[serde(rename = "cartId", default)]
    pub cart_id: Option<i64>,
    #[serde(rename = "productId", default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub price: f64,
}

/// Entry in `GET Category/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CategoryResponse {
    #[serde(rename = "categoryId")]
    pub category_id: i64,
    #[serde(rename = "categoryName")]
    pub category_name: String,
}

/// Products in `category` (all when `None`) whose name contains `query`, ignoring case.
pub fn filter_products<'a>(
    products: &'a [ProductResponse],
    category: Option<i64>,
    query: &str,
) -> Vec<&'a ProductResponse> {
    let query = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| category.is_none() || p.category_id == category)
        .filter(|p| query.is_empty() || p.product_name.to_lowercase().contains(&query))
        .collect()
}
