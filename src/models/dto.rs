// DTOs des requêtes (validés avec validator) et des réponses structurées
use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use chrono::{DateTime, Utc};
use validator::Validate;

use super::categories;
use super::orders::OrderStatus;
use super::seller_profiles;
use super::users::UserRole;

// ============================================================
// Requêtes
// ============================================================

/// Inscription. La présence de shopName bascule le compte créé en vendeur
/// (avec sa fiche boutique), sinon le compte est un client.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub phone: Option<String>,
    pub city: Option<String>,

    // Champs vendeur (ignorés pour un client)
    #[validate(length(min = 2, message = "Shop name must be at least 2 characters"))]
    pub shop_name: Option<String>,
    pub shop_name_ar: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 2, message = "Product name is required"))]
    pub name: String,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be positive"))]
    pub price: f64,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category_id: String,
    pub car_make: Option<String>,
    pub car_model: Option<String>,
    pub car_year: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    // None = conserver les images existantes lors d'un update
    pub images: Option<Vec<String>>,
    pub currency: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[validate(length(min = 1, message = "Product is required"))]
    pub product_id: String,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Order must have at least one item"), nested)]
    pub items: Vec<OrderItemRequest>,
    #[validate(length(min = 5, message = "Shipping address is required"))]
    pub shipping_address: String,
    #[validate(length(min = 8, message = "Phone number is required"))]
    pub phone: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[validate(length(min = 1, message = "Receiver is required"))]
    pub receiver_id: String,
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[validate(length(min = 2, message = "Category name is required"))]
    pub name: String,
    pub name_ar: Option<String>,
    #[validate(length(min = 2, message = "Slug is required"))]
    pub slug: String,
    pub icon: Option<String>,
    pub parent_id: Option<String>,
}

// ============================================================
// Réponses
// ============================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerInfo {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub shop_name: Option<String>,
    pub shop_name_ar: Option<String>,
    pub location: Option<String>,
    pub is_verified: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub is_available: bool,
    pub currency: String,
    pub images: Vec<String>,
    pub car_make: Option<String>,
    pub car_model: Option<String>,
    pub car_year: Option<String>,
    pub category: Option<categories::Model>,
    pub seller: Option<SellerInfo>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
}

/// Catégorie racine avec ses enfants directs et son nombre de produits
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTreeResponse {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub slug: String,
    pub icon: Option<String>,
    pub children: Vec<categories::Model>,
    pub product_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerBrief {
    pub id: String,
    pub name: String,
    pub shop_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub images: Vec<String>,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub customer: Option<CustomerInfo>,
    pub seller: Option<SellerBrief>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub phone: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBrief {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub sender: Option<UserBrief>,
    pub receiver: Option<UserBrief>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub shop_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub contact: Option<ContactInfo>,
    pub last_message: Option<MessageResponse>,
    pub unread_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub users: u64,
    pub products: u64,
    pub orders: u64,
    // Chiffre d'affaires des commandes CONFIRMED / SHIPPED / DELIVERED
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub city: Option<String>,
    pub shop_name: Option<String>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub seller_profile: Option<seller_profiles::Model>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::first_error_message;

    fn valid_order() -> CreateOrderRequest {
        CreateOrderRequest {
            items: vec![OrderItemRequest {
                product_id: "p1".to_string(),
                quantity: 2,
            }],
            shipping_address: "12 rue des Frères Bouadou, Alger".to_string(),
            phone: "0550123456".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_valid_order_passes() {
        assert!(valid_order().validate().is_ok());
    }

    #[test]
    fn test_order_rejects_empty_items() {
        let mut order = valid_order();
        order.items = vec![];

        let errors = order.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "Order must have at least one item");
    }

    #[test]
    fn test_order_rejects_short_address() {
        let mut order = valid_order();
        order.shipping_address = "x".to_string();

        let errors = order.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "Shipping address is required");
    }

    #[test]
    fn test_order_rejects_short_phone() {
        let mut order = valid_order();
        order.phone = "123".to_string();

        let errors = order.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "Phone number is required");
    }

    #[test]
    fn test_order_rejects_zero_quantity() {
        let mut order = valid_order();
        order.items[0].quantity = 0;

        assert!(order.validate().is_err());
    }

    #[test]
    fn test_register_rejects_invalid_email() {
        let request = RegisterRequest {
            name: "Karim".to_string(),
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
            phone: None,
            city: None,
            shop_name: None,
            shop_name_ar: None,
            location: None,
            description: None,
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "Invalid email address");
    }

    #[test]
    fn test_register_rejects_short_shop_name_when_present() {
        let request = RegisterRequest {
            name: "Karim".to_string(),
            email: "karim@example.com".to_string(),
            password: "secret123".to_string(),
            phone: None,
            city: None,
            shop_name: Some("x".to_string()),
            shop_name_ar: None,
            location: None,
            description: None,
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(
            first_error_message(&errors),
            "Shop name must be at least 2 characters"
        );
    }

    #[test]
    fn test_product_rejects_non_positive_price() {
        let request = ProductRequest {
            name: "Brake pads".to_string(),
            name_ar: None,
            description: None,
            description_ar: None,
            price: 0.0,
            stock: 3,
            category_id: "c1".to_string(),
            car_make: None,
            car_model: None,
            car_year: None,
            is_available: true,
            images: None,
            currency: None,
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "Price must be positive");
    }

    #[test]
    fn test_product_rejects_negative_stock() {
        let request = ProductRequest {
            name: "Brake pads".to_string(),
            name_ar: None,
            description: None,
            description_ar: None,
            price: 4500.0,
            stock: -1,
            category_id: "c1".to_string(),
            car_make: None,
            car_model: None,
            car_year: None,
            is_available: true,
            images: None,
            currency: None,
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "Stock cannot be negative");
    }

    #[test]
    fn test_message_rejects_empty_content() {
        let request = MessageRequest {
            receiver_id: "u2".to_string(),
            content: "".to_string(),
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "Message cannot be empty");
    }
}
