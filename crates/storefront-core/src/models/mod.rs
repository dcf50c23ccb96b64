//! Data models for storefront entities.
//!
//! This module contains the request and response bodies of the backend API:
//!
//! - Account types: `RegisterRequest`, `LoginRequest`, `LoginResponse`, `UserResponse`
//! - Catalog types: `ProductResponse`, `ProductDetailResponse`, `CategoryResponse`
//! - Cart types: `CartResponse`, `CartItemDto`, `AddCartItemRequest`, `CartRequest`
//! - `CurrencyQuote` from the external exchange-rate service

pub mod cart;
pub mod catalog;
pub mod currency;
pub mod user;

pub use cart::{AddCartItemRequest, CartItemDto, CartRequest, CartResponse};
pub use catalog::{
    filter_products, CartItem, CategoryResponse, ProductDetailResponse, ProductResponse,
};
pub use currency::{CurrencyError, CurrencyQuote};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse};
