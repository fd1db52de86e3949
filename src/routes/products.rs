use actix_web::{post, get, put, delete, web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use rust_decimal::Decimal;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::models::{categories, products, seller_profiles, users};
use crate::models::dto::{ProductListResponse, ProductRequest, ProductResponse, SellerInfo};
use crate::middleware::AuthUser;
use crate::utils::images::{parse_images, serialize_images};
use crate::utils::validation;

// Paramètres de recherche du catalogue public
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub car_make: Option<String>,
    pub sort: Option<String>,
    pub seller_id: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Construit la réponse API d'un produit (catégorie + vendeur + images parsées)
pub(crate) async fn shape_product(
    db: &DatabaseConnection,
    product: products::Model,
) -> Result<ProductResponse, DbErr> {
    let category = categories::Entity::find_by_id(product.category_id.as_str())
        .one(db)
        .await?;

    let seller = users::Entity::find_by_id(product.seller_id.as_str())
        .one(db)
        .await?;
    let profile = seller_profiles::Entity::find_by_id(product.seller_id.as_str())
        .one(db)
        .await?;

    let seller = seller.map(|user| SellerInfo {
        id: user.id,
        name: user.name,
        phone: user.phone,
        city: user.city,
        shop_name: profile.as_ref().map(|p| p.shop_name.clone()),
        shop_name_ar: profile.as_ref().and_then(|p| p.shop_name_ar.clone()),
        location: profile.as_ref().and_then(|p| p.location.clone()),
        is_verified: profile.as_ref().map(|p| p.is_verified).unwrap_or(false),
    });

    Ok(ProductResponse {
        id: product.id,
        name: product.name,
        name_ar: product.name_ar,
        description: product.description,
        description_ar: product.description_ar,
        price: product.price,
        stock: product.stock,
        is_available: product.is_available,
        currency: product.currency,
        images: parse_images(&product.images),
        car_make: product.car_make,
        car_model: product.car_model,
        car_year: product.car_year,
        category,
        seller,
        created_at: product.created_at,
    })
}

/// GET /api/products - Recherche du catalogue (PUBLIC)
/// Seuls les produits disponibles sont visibles ici
#[get("")]
pub async fn list_products(
    query: web::Query<ProductQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(12).max(1);

    let mut condition = Condition::all().add(products::Column::IsAvailable.eq(true));

    // Recherche insensible à la casse sur nom, nom arabe, description et véhicule
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(products::Column::Name).ilike(pattern.as_str()))
                .add(Expr::col(products::Column::NameAr).ilike(pattern.as_str()))
                .add(Expr::col(products::Column::Description).ilike(pattern.as_str()))
                .add(Expr::col(products::Column::CarMake).ilike(pattern.as_str()))
                .add(Expr::col(products::Column::CarModel).ilike(pattern.as_str())),
        );
    }

    // Filtre catégorie par slug (aucun résultat si le slug est inconnu)
    if let Some(slug) = query.category.as_deref().filter(|s| !s.is_empty()) {
        match categories::Entity::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(db.get_ref())
            .await
        {
            Ok(Some(category)) => {
                condition = condition.add(products::Column::CategoryId.eq(category.id));
            }
            Ok(None) => {
                return HttpResponse::Ok().json(ProductListResponse {
                    products: vec![],
                    total: 0,
                    pages: 0,
                    current_page: page,
                });
            }
            Err(e) => {
                eprintln!("⚠️  Category lookup error: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to fetch products"
                }));
            }
        }
    }

    if let Some(car_make) = query.car_make.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", car_make);
        condition = condition.add(Expr::col(products::Column::CarMake).ilike(pattern.as_str()));
    }

    if let Some(seller_id) = query.seller_id.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(products::Column::SellerId.eq(seller_id));
    }

    let mut select = products::Entity::find().filter(condition);
    select = match query.sort.as_deref() {
        Some("price_asc") => select.order_by_asc(products::Column::Price),
        Some("price_desc") => select.order_by_desc(products::Column::Price),
        _ => select.order_by_desc(products::Column::CreatedAt),
    };

    let paginator = select.paginate(db.get_ref(), limit);

    let counts = match paginator.num_items_and_pages().await {
        Ok(counts) => counts,
        Err(e) => {
            eprintln!("⚠️  Products count error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch products"
            }));
        }
    };

    let page_products = match paginator.fetch_page(page - 1).await {
        Ok(page_products) => page_products,
        Err(e) => {
            eprintln!("⚠️  Products fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch products"
            }));
        }
    };

    let mut shaped = Vec::new();
    for product in page_products {
        match shape_product(db.get_ref(), product).await {
            Ok(response) => shaped.push(response),
            Err(e) => {
                eprintln!("⚠️  Product shaping error: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to fetch products"
                }));
            }
        }
    }

    HttpResponse::Ok().json(ProductListResponse {
        products: shaped,
        total: counts.number_of_items,
        pages: counts.number_of_pages,
        current_page: page,
    })
}

/// GET /api/products/mine - Produits du vendeur connecté, y compris
/// les produits indisponibles (VENDEUR)
#[get("/mine")]
pub async fn get_my_products(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if !auth_user.is_seller() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Unauthorized"
        }));
    }

    let own_products = products::Entity::find()
        .filter(products::Column::SellerId.eq(&auth_user.user_id))
        .order_by_desc(products::Column::CreatedAt)
        .all(db.get_ref())
        .await;

    let own_products = match own_products {
        Ok(own_products) => own_products,
        Err(e) => {
            eprintln!("⚠️  Seller products fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch products"
            }));
        }
    };

    let mut shaped = Vec::new();
    for product in own_products {
        match shape_product(db.get_ref(), product).await {
            Ok(response) => shaped.push(response),
            Err(e) => {
                eprintln!("⚠️  Product shaping error: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to fetch products"
                }));
            }
        }
    }

    HttpResponse::Ok().json(shaped)
}

/// POST /api/products - Publier un produit (VENDEUR)
#[post("")]
pub async fn create_product(
    auth_user: AuthUser,
    body: web::Json<ProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if !auth_user.is_seller() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Unauthorized"
        }));
    }

    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": validation::first_error_message(&errors)
        }));
    }

    let price = match Decimal::from_f64_retain(body.price) {
        Some(price) => price,
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid price format"
            }));
        }
    };

    let new_product = products::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(body.name.clone()),
        name_ar: Set(body.name_ar.clone()),
        description: Set(body.description.clone()),
        description_ar: Set(body.description_ar.clone()),
        price: Set(price),
        stock: Set(body.stock),
        is_available: Set(body.is_available),
        currency: Set(body.currency.clone().unwrap_or_else(|| "DZD".to_string())),
        images: Set(serialize_images(body.images.as_deref().unwrap_or_default())),
        car_make: Set(body.car_make.clone()),
        car_model: Set(body.car_model.clone()),
        car_year: Set(body.car_year.clone()),
        category_id: Set(body.category_id.clone()),
        seller_id: Set(auth_user.user_id.clone()),
        created_at: Set(Utc::now()),
    };

    match new_product.insert(db.get_ref()).await {
        Ok(product) => match shape_product(db.get_ref(), product).await {
            Ok(response) => HttpResponse::Created().json(response),
            Err(e) => {
                eprintln!("⚠️  Product shaping error: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to create product"
                }))
            }
        },
        Err(e) => {
            eprintln!("⚠️  Product creation error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create product"
            }))
        }
    }
}

/// GET /api/products/{id} - Fiche produit (PUBLIC)
/// Un produit retiré de la vente n'est pas exposé ici
#[get("/{id}")]
pub async fn get_product(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let product_id = path.into_inner();

    let product = match products::Entity::find_by_id(product_id.as_str())
        .one(db.get_ref())
        .await
    {
        Ok(Some(product)) => product,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Product not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Product fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch product"
            }));
        }
    };

    if !product.is_available {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "Product not found"
        }));
    }

    match shape_product(db.get_ref(), product).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            eprintln!("⚠️  Product shaping error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch product"
            }))
        }
    }
}

/// PUT /api/products/{id} - Modifier un produit (PROPRIÉTAIRE ou ADMIN)
#[put("/{id}")]
pub async fn update_product(
    auth_user: AuthUser,
    path: web::Path<String>,
    body: web::Json<ProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let product_id = path.into_inner();

    let product = match products::Entity::find_by_id(product_id.as_str())
        .one(db.get_ref())
        .await
    {
        Ok(Some(product)) => product,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Product not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Product fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update product"
            }));
        }
    };

    if product.seller_id != auth_user.user_id && !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Unauthorized"
        }));
    }

    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": validation::first_error_message(&errors)
        }));
    }

    let price = match Decimal::from_f64_retain(body.price) {
        Some(price) => price,
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid price format"
            }));
        }
    };

    // Sans nouvelle liste d'images, la liste existante est conservée
    let images = match &body.images {
        Some(images) => serialize_images(images),
        None => product.images.clone(),
    };
    let currency = body
        .currency
        .clone()
        .unwrap_or_else(|| product.currency.clone());

    let mut active_model: products::ActiveModel = product.into();
    active_model.name = Set(body.name.clone());
    active_model.name_ar = Set(body.name_ar.clone());
    active_model.description = Set(body.description.clone());
    active_model.description_ar = Set(body.description_ar.clone());
    active_model.price = Set(price);
    active_model.stock = Set(body.stock);
    active_model.is_available = Set(body.is_available);
    active_model.currency = Set(currency);
    active_model.images = Set(images);
    active_model.car_make = Set(body.car_make.clone());
    active_model.car_model = Set(body.car_model.clone());
    active_model.car_year = Set(body.car_year.clone());
    active_model.category_id = Set(body.category_id.clone());

    match active_model.update(db.get_ref()).await {
        Ok(updated) => match shape_product(db.get_ref(), updated).await {
            Ok(response) => HttpResponse::Ok().json(response),
            Err(e) => {
                eprintln!("⚠️  Product shaping error: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to update product"
                }))
            }
        },
        Err(e) => {
            eprintln!("⚠️  Product update error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update product"
            }))
        }
    }
}

/// DELETE /api/products/{id} - Supprimer un produit (PROPRIÉTAIRE ou ADMIN)
#[delete("/{id}")]
pub async fn delete_product(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let product_id = path.into_inner();

    let product = match products::Entity::find_by_id(product_id.as_str())
        .one(db.get_ref())
        .await
    {
        Ok(Some(product)) => product,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Product not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Product fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete product"
            }));
        }
    };

    if product.seller_id != auth_user.user_id && !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Unauthorized"
        }));
    }

    match products::Entity::delete_by_id(product.id).exec(db.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Product deleted"
        })),
        Err(e) => {
            eprintln!("⚠️  Product delete error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete product"
            }))
        }
    }
}

pub fn product_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .service(list_products)
            .service(get_my_products)
            .service(create_product)
            .service(get_product)
            .service(update_product)
            .service(delete_product)
    );
}
