use actix_web::{get, patch, web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{categories, orders, products, seller_profiles, users};
use crate::models::orders::OrderStatus;
use crate::models::users::UserRole;
use crate::models::dto::{AdminUserResponse, StatsResponse, UserProfileResponse};
use crate::middleware::AuthUser;
use crate::routes::products::shape_product;
use crate::services::order_service::{OrderScope, OrderService};

#[derive(Deserialize)]
pub struct AdminQuery {
    #[serde(rename = "type")]
    pub query_type: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

// Catégorie vue admin: parent résolu et nombre de produits
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCategoryResponse {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub slug: String,
    pub icon: Option<String>,
    pub parent: Option<categories::Model>,
    pub product_count: u64,
}

/// DTO du PATCH multi-usage: les champs utiles dépendent du type demandé
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPatchRequest {
    #[serde(rename = "type")]
    pub patch_type: String,

    // user-profile
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,

    // seller-profile
    pub shop_name: Option<String>,
    pub shop_name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    pub location: Option<String>,

    // opérations admin
    pub user_id: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<UserRole>,
    pub is_verified: Option<bool>,
    pub category_id: Option<String>,
}

async fn load_profile(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<UserProfileResponse>, sea_orm::DbErr> {
    let user = match users::Entity::find_by_id(user_id).one(db).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    let seller_profile = seller_profiles::Entity::find_by_id(user_id).one(db).await?;

    Ok(Some(UserProfileResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        phone: user.phone,
        city: user.city,
        address: user.address,
        role: user.role,
        is_active: user.is_active,
        created_at: user.created_at,
        seller_profile,
    }))
}

/// GET /api/admin - Endpoint multi-usage discriminé par ?type= (PROTÉGÉE)
/// user-profile et seller-profile sont accessibles hors admin, le reste non
#[get("")]
pub async fn admin_get(
    auth_user: AuthUser,
    query: web::Query<AdminQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let query_type = query.query_type.as_deref().unwrap_or("");

    // Profil utilisateur: soi-même, ou n'importe qui pour un admin
    if query_type == "user-profile" {
        let user_id = query
            .user_id
            .clone()
            .unwrap_or_else(|| auth_user.user_id.clone());

        if user_id != auth_user.user_id && !auth_user.is_admin() {
            return HttpResponse::Forbidden().json(serde_json::json!({
                "error": "Unauthorized"
            }));
        }

        return match load_profile(db.get_ref(), &user_id).await {
            Ok(Some(profile)) => HttpResponse::Ok().json(profile),
            Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            })),
            Err(e) => {
                eprintln!("⚠️  Profile fetch error: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Something went wrong"
                }))
            }
        };
    }

    // Fiche boutique publique d'un vendeur
    if query_type == "seller-profile" {
        let user_id = query
            .user_id
            .clone()
            .unwrap_or_else(|| auth_user.user_id.clone());

        return match load_profile(db.get_ref(), &user_id).await {
            Ok(Some(profile)) => HttpResponse::Ok().json(profile),
            Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            })),
            Err(e) => {
                eprintln!("⚠️  Profile fetch error: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Something went wrong"
                }))
            }
        };
    }

    // Tout le reste est réservé aux admins
    if !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Unauthorized"
        }));
    }

    match query_type {
        "stats" => admin_stats(db.get_ref()).await,
        "users" => admin_users(db.get_ref()).await,
        "products" => admin_products(db.get_ref()).await,
        "orders" => match OrderService::list_orders(db.get_ref(), OrderScope::All).await {
            Ok(response) => HttpResponse::Ok().json(response),
            Err(e) => {
                eprintln!("⚠️  Orders fetch error: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Something went wrong"
                }))
            }
        },
        "categories" => admin_categories(db.get_ref()).await,
        _ => HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid type"
        })),
    }
}

/// Compteurs globaux + chiffre d'affaires des commandes confirmées ou mieux
async fn admin_stats(db: &DatabaseConnection) -> HttpResponse {
    let users_count = users::Entity::find().count(db).await;
    let products_count = products::Entity::find().count(db).await;
    let orders_count = orders::Entity::find().count(db).await;

    let revenue_orders = orders::Entity::find()
        .filter(orders::Column::Status.is_in([
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ]))
        .all(db)
        .await;

    match (users_count, products_count, orders_count, revenue_orders) {
        (Ok(users), Ok(products), Ok(orders), Ok(revenue_orders)) => {
            let revenue: Decimal = revenue_orders.iter().map(|order| order.total_amount).sum();

            HttpResponse::Ok().json(StatsResponse {
                users,
                products,
                orders,
                revenue,
            })
        }
        (users, products, orders, revenue) => {
            for error in [users.err(), products.err(), orders.err(), revenue.err()]
                .into_iter()
                .flatten()
            {
                eprintln!("⚠️  Stats fetch error: {}", error);
            }
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }))
        }
    }
}

async fn admin_users(db: &DatabaseConnection) -> HttpResponse {
    let all_users = users::Entity::find()
        .order_by_desc(users::Column::CreatedAt)
        .all(db)
        .await;

    let all_users = match all_users {
        Ok(all_users) => all_users,
        Err(e) => {
            eprintln!("⚠️  Users fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    let mut response = Vec::new();
    for user in all_users {
        let profile = seller_profiles::Entity::find_by_id(user.id.as_str())
            .one(db)
            .await
            .unwrap_or(None);

        response.push(AdminUserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            city: user.city,
            shop_name: profile.as_ref().map(|p| p.shop_name.clone()),
            is_verified: profile.map(|p| p.is_verified),
        });
    }

    HttpResponse::Ok().json(response)
}

/// Catalogue complet vu admin, produits indisponibles compris
async fn admin_products(db: &DatabaseConnection) -> HttpResponse {
    let all_products = products::Entity::find()
        .order_by_desc(products::Column::CreatedAt)
        .all(db)
        .await;

    let all_products = match all_products {
        Ok(all_products) => all_products,
        Err(e) => {
            eprintln!("⚠️  Products fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    let mut response = Vec::new();
    for product in all_products {
        match shape_product(db, product).await {
            Ok(shaped) => response.push(shaped),
            Err(e) => {
                eprintln!("⚠️  Product shaping error: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Something went wrong"
                }));
            }
        }
    }

    HttpResponse::Ok().json(response)
}

async fn admin_categories(db: &DatabaseConnection) -> HttpResponse {
    let all_categories = categories::Entity::find()
        .order_by_asc(categories::Column::Name)
        .all(db)
        .await;

    let all_categories = match all_categories {
        Ok(all_categories) => all_categories,
        Err(e) => {
            eprintln!("⚠️  Categories fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    let mut response = Vec::new();
    for category in all_categories {
        let parent = match &category.parent_id {
            Some(parent_id) => categories::Entity::find_by_id(parent_id.as_str())
                .one(db)
                .await
                .unwrap_or(None),
            None => None,
        };

        let product_count = products::Entity::find()
            .filter(products::Column::CategoryId.eq(&category.id))
            .count(db)
            .await
            .unwrap_or(0);

        response.push(AdminCategoryResponse {
            id: category.id,
            name: category.name,
            name_ar: category.name_ar,
            slug: category.slug,
            icon: category.icon,
            parent,
            product_count,
        });
    }

    HttpResponse::Ok().json(response)
}

/// PATCH /api/admin - Mises à jour de profils + opérations admin (PROTÉGÉE)
#[patch("")]
pub async fn admin_patch(
    auth_user: AuthUser,
    body: web::Json<AdminPatchRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // Mise à jour de son propre profil utilisateur
    if body.patch_type == "user-profile" {
        let user = match users::Entity::find_by_id(auth_user.user_id.as_str())
            .one(db.get_ref())
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": "User not found"
                }));
            }
            Err(e) => {
                eprintln!("⚠️  User fetch error: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Something went wrong"
                }));
            }
        };

        let mut active_model: users::ActiveModel = user.into();
        if let Some(name) = &body.name {
            active_model.name = Set(name.clone());
        }
        if let Some(phone) = &body.phone {
            active_model.phone = Set(Some(phone.clone()));
        }
        if let Some(city) = &body.city {
            active_model.city = Set(Some(city.clone()));
        }
        if let Some(address) = &body.address {
            active_model.address = Set(Some(address.clone()));
        }

        return match active_model.update(db.get_ref()).await {
            Ok(updated) => HttpResponse::Ok().json(updated),
            Err(e) => {
                eprintln!("⚠️  Profile update error: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Something went wrong"
                }))
            }
        };
    }

    // Mise à jour de sa propre fiche boutique
    if body.patch_type == "seller-profile" {
        let profile = match seller_profiles::Entity::find_by_id(auth_user.user_id.as_str())
            .one(db.get_ref())
            .await
        {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": "Seller profile not found"
                }));
            }
            Err(e) => {
                eprintln!("⚠️  Seller profile fetch error: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Something went wrong"
                }));
            }
        };

        let mut active_model: seller_profiles::ActiveModel = profile.into();
        if let Some(shop_name) = &body.shop_name {
            active_model.shop_name = Set(shop_name.clone());
        }
        if let Some(shop_name_ar) = &body.shop_name_ar {
            active_model.shop_name_ar = Set(Some(shop_name_ar.clone()));
        }
        if let Some(description) = &body.description {
            active_model.description = Set(Some(description.clone()));
        }
        if let Some(description_ar) = &body.description_ar {
            active_model.description_ar = Set(Some(description_ar.clone()));
        }
        if let Some(location) = &body.location {
            active_model.location = Set(Some(location.clone()));
        }

        return match active_model.update(db.get_ref()).await {
            Ok(updated) => HttpResponse::Ok().json(updated),
            Err(e) => {
                eprintln!("⚠️  Seller profile update error: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Something went wrong"
                }))
            }
        };
    }

    // Opérations réservées aux admins
    if !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Unauthorized"
        }));
    }

    match body.patch_type.as_str() {
        "toggle-user" => toggle_user(db.get_ref(), &body).await,
        "change-role" => change_role(db.get_ref(), &body).await,
        "verify-seller" => verify_seller(db.get_ref(), &body).await,
        "delete-category" => delete_category(db.get_ref(), &body).await,
        _ => HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid type"
        })),
    }
}

/// Activer/désactiver un compte (un compte désactivé ne peut plus se connecter)
async fn toggle_user(db: &DatabaseConnection, body: &AdminPatchRequest) -> HttpResponse {
    let (user_id, is_active) = match (&body.user_id, body.is_active) {
        (Some(user_id), Some(is_active)) => (user_id, is_active),
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "userId and isActive are required"
            }));
        }
    };

    let user = match users::Entity::find_by_id(user_id.as_str()).one(db).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  User fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    let mut active_model: users::ActiveModel = user.into();
    active_model.is_active = Set(is_active);

    match active_model.update(db).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => {
            eprintln!("⚠️  User update error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }))
        }
    }
}

async fn change_role(db: &DatabaseConnection, body: &AdminPatchRequest) -> HttpResponse {
    let (user_id, role) = match (&body.user_id, body.role) {
        (Some(user_id), Some(role)) => (user_id, role),
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "userId and role are required"
            }));
        }
    };

    let user = match users::Entity::find_by_id(user_id.as_str()).one(db).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  User fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    let mut active_model: users::ActiveModel = user.into();
    active_model.role = Set(role);

    match active_model.update(db).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => {
            eprintln!("⚠️  Role update error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }))
        }
    }
}

async fn verify_seller(db: &DatabaseConnection, body: &AdminPatchRequest) -> HttpResponse {
    let (user_id, is_verified) = match (&body.user_id, body.is_verified) {
        (Some(user_id), Some(is_verified)) => (user_id, is_verified),
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "userId and isVerified are required"
            }));
        }
    };

    let profile = match seller_profiles::Entity::find_by_id(user_id.as_str())
        .one(db)
        .await
    {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Seller profile not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Seller profile fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    let mut active_model: seller_profiles::ActiveModel = profile.into();
    active_model.is_verified = Set(is_verified);

    match active_model.update(db).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => {
            eprintln!("⚠️  Seller verification error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }))
        }
    }
}

/// Une catégorie qui possède encore des produits ne peut pas être supprimée
async fn delete_category(db: &DatabaseConnection, body: &AdminPatchRequest) -> HttpResponse {
    let category_id = match &body.category_id {
        Some(category_id) => category_id,
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "categoryId is required"
            }));
        }
    };

    let category = match categories::Entity::find_by_id(category_id.as_str())
        .one(db)
        .await
    {
        Ok(Some(category)) => category,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Category not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Category fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    let product_count = match products::Entity::find()
        .filter(products::Column::CategoryId.eq(&category.id))
        .count(db)
        .await
    {
        Ok(product_count) => product_count,
        Err(e) => {
            eprintln!("⚠️  Category products count error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    if product_count > 0 {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Category has products and cannot be deleted"
        }));
    }

    match categories::Entity::delete_by_id(category.id).exec(db).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Category deleted"
        })),
        Err(e) => {
            eprintln!("⚠️  Category delete error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }))
        }
    }
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(admin_get)
            .service(admin_patch)
    );
}
