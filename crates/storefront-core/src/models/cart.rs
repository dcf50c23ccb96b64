use serde::{Deserialize, Serialize};

/// Response from `GET Cart`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CartResponse {
    #[serde(rename = "cartId")]
    pub cart_id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "totalPrice", default)]
    pub total_price: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItemDto>,
}

impl CartResponse {
    /// Total number of units across all lines.
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn find_item(&self, product_id: i64) -> Option<&CartItemDto> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Sum of line subtotals, for checking against `total_price`.
    pub fn recomputed_total(&self) -> f64 {
        self.items.iter().map(|i| i.sub_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CartItemDto {
    #[serde(rename = "cartItemId")]
    pub cart_item_id: i64,
    #[serde(rename = "productId")]
    pub product_id: i64,
    #[serde(rename = "productName", default)]
    pub product_name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(rename = "subTotal", default)]
    pub sub_total: f64,
}

/// Body for `POST Cart/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AddCartItemRequest {
    #[serde(rename = "productId")]
    pub product_id: i64,
    pub quantity: i32,
}

/// Body for `POST Cart/increase`, `Cart/decrease` and `Cart/remove`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CartRequest {
    #[serde(rename = "productId")]
    pub product_id: i64,
}
