use actix_web::{post, get, patch, web, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use validator::Validate;

use crate::models::orders::{self, OrderStatus};
use crate::models::dto::CreateOrderRequest;
use crate::middleware::AuthUser;
use crate::services::order_service::{OrderError, OrderScope, OrderService};
use crate::utils::validation;

#[derive(Deserialize)]
pub struct OrderListQuery {
    pub role: Option<String>,
}

// DTO pour le changement de statut
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub order_id: String,
    pub status: OrderStatus,
}

/// GET /api/orders - Commandes du périmètre de l'appelant (PROTÉGÉE)
/// Client: ses achats. Vendeur: ses ventes. Admin: tout.
#[get("")]
pub async fn list_orders(
    auth_user: AuthUser,
    query: web::Query<OrderListQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let scope = if query.role.as_deref() == Some("SELLER") || auth_user.is_seller() {
        OrderScope::Seller(auth_user.user_id.clone())
    } else if auth_user.is_admin() {
        OrderScope::All
    } else {
        OrderScope::Customer(auth_user.user_id.clone())
    };

    match OrderService::list_orders(db.get_ref(), scope).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            eprintln!("⚠️  Orders fetch error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch orders"
            }))
        }
    }
}

/// POST /api/orders - Checkout: une commande créée par vendeur (PROTÉGÉE)
#[post("")]
pub async fn create_order(
    auth_user: AuthUser,
    body: web::Json<CreateOrderRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": validation::first_error_message(&errors)
        }));
    }

    let created =
        match OrderService::create_orders(db.get_ref(), &auth_user.user_id, body.into_inner())
            .await
        {
            Ok(created) => created,
            Err(OrderError::Rejected(message)) => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": message
                }));
            }
            Err(OrderError::Db(e)) => {
                eprintln!("⚠️  Order creation error: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to create order"
                }));
            }
        };

    let mut response = Vec::new();
    for order in created {
        match OrderService::shape_order(db.get_ref(), order).await {
            Ok(shaped) => response.push(shaped),
            Err(e) => {
                eprintln!("⚠️  Order shaping error: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to create order"
                }));
            }
        }
    }

    HttpResponse::Created().json(response)
}

/// PATCH /api/orders - Changer le statut d'une commande (VENDEUR de la
/// commande ou ADMIN). Aucun enchaînement de statuts n'est imposé.
#[patch("")]
pub async fn update_order_status(
    auth_user: AuthUser,
    body: web::Json<UpdateOrderStatusRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let order = match orders::Entity::find_by_id(body.order_id.as_str())
        .one(db.get_ref())
        .await
    {
        Ok(Some(order)) => order,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Order not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Order fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update order"
            }));
        }
    };

    if order.seller_id != auth_user.user_id && !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Unauthorized"
        }));
    }

    let mut active_model: orders::ActiveModel = order.into();
    active_model.status = Set(body.status);

    match active_model.update(db.get_ref()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => {
            eprintln!("⚠️  Order update error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update order"
            }))
        }
    }
}

pub fn order_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .service(list_orders)
            .service(create_order)
            .service(update_order_status)
    );
}
