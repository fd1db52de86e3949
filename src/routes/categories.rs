use actix_web::{post, get, web, HttpResponse};
use sea_orm::{
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, ColumnTrait, PaginatorTrait, Set,
    ActiveModelTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::models::categories::{self, Entity as Categories, Column as CategoryColumn};
use crate::models::products;
use crate::models::dto::{CategoryRequest, CategoryTreeResponse};
use crate::middleware::AuthUser;
use crate::utils::validation;

/// GET /api/categories - Catégories racines avec enfants et nb produits (PUBLIC)
#[get("")]
pub async fn get_categories(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let roots = Categories::find()
        .filter(CategoryColumn::ParentId.is_null())
        .order_by_asc(CategoryColumn::Name)
        .all(db.get_ref())
        .await;

    let roots = match roots {
        Ok(roots) => roots,
        Err(e) => {
            eprintln!("⚠️  Categories fetch error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch categories"
            }));
        }
    };

    let mut response = Vec::new();
    for root in roots {
        let children = Categories::find()
            .filter(CategoryColumn::ParentId.eq(&root.id))
            .order_by_asc(CategoryColumn::Name)
            .all(db.get_ref())
            .await
            .unwrap_or_default();

        let product_count = products::Entity::find()
            .filter(products::Column::CategoryId.eq(&root.id))
            .count(db.get_ref())
            .await
            .unwrap_or(0);

        response.push(CategoryTreeResponse {
            id: root.id,
            name: root.name,
            name_ar: root.name_ar,
            slug: root.slug,
            icon: root.icon,
            children,
            product_count,
        });
    }

    HttpResponse::Ok().json(response)
}

/// POST /api/categories - Créer une catégorie (ADMIN)
#[post("")]
pub async fn create_category(
    auth_user: AuthUser,
    body: web::Json<CategoryRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Unauthorized"
        }));
    }

    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": validation::first_error_message(&errors)
        }));
    }

    // Le slug identifie la catégorie dans les URLs: il doit rester unique
    let existing = Categories::find()
        .filter(CategoryColumn::Slug.eq(&body.slug))
        .one(db.get_ref())
        .await;

    match existing {
        Ok(Some(_)) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Category slug already exists"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Category lookup error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create category"
            }));
        }
        _ => {}
    }

    let new_category = categories::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(body.name.clone()),
        name_ar: Set(body.name_ar.clone()),
        slug: Set(body.slug.clone()),
        icon: Set(body.icon.clone()),
        parent_id: Set(body.parent_id.clone()),
    };

    match new_category.insert(db.get_ref()).await {
        Ok(category) => HttpResponse::Created().json(category),
        Err(e) => {
            eprintln!("⚠️  Category creation error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create category"
            }))
        }
    }
}

pub fn category_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/categories")
            .service(get_categories)
            .service(create_category)
    );
}
