use actix_web::{post, get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, Set, ActiveModelTrait};
use serde::{Deserialize, Serialize};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::models::users::{self, Entity as Users, Column as UserColumn, UserRole};
use crate::models::seller_profiles;
use crate::models::dto::RegisterRequest;
use crate::utils::{password, jwt, validation};
use crate::middleware::AuthUser;

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Réponse après login
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
}

// Réponse pour /auth/me
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
}

/// POST /api/auth/register - Créer un compte client ou vendeur (PUBLIC)
/// La présence de shopName dans le payload crée un compte vendeur
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Valider le payload
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": validation::first_error_message(&errors)
        }));
    }

    let is_seller = body.shop_name.is_some();

    // 2. Refuser les emails déjà enregistrés
    let existing_user = Users::find()
        .filter(UserColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await;

    match existing_user {
        Ok(Some(_)) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Email already registered"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Registration lookup error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
        _ => {}
    }

    // 3. Hash le mot de passe
    let password_hash = match password::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            eprintln!("⚠️  Password hash error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    // 4. Créer l'utilisateur
    let user_id = Uuid::new_v4().to_string();
    let new_user = users::ActiveModel {
        id: Set(user_id.clone()),
        email: Set(body.email.clone()),
        password_hash: Set(password_hash),
        name: Set(body.name.clone()),
        role: Set(if is_seller { UserRole::Seller } else { UserRole::Customer }),
        phone: Set(body.phone.clone()),
        city: Set(body.city.clone()),
        address: Set(None),
        avatar: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
    };

    if let Err(e) = new_user.insert(db.get_ref()).await {
        eprintln!("⚠️  Failed to create user: {}", e);
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Something went wrong"
        }));
    }

    // 5. Créer la fiche boutique pour un vendeur
    if is_seller {
        let new_profile = seller_profiles::ActiveModel {
            user_id: Set(user_id.clone()),
            shop_name: Set(body.shop_name.clone().unwrap_or_default()),
            shop_name_ar: Set(body.shop_name_ar.clone()),
            description: Set(body.description.clone()),
            description_ar: Set(None),
            location: Set(body.location.clone()),
            is_verified: Set(false),
        };

        if let Err(e) = new_profile.insert(db.get_ref()).await {
            eprintln!("⚠️  Failed to create seller profile: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    }

    HttpResponse::Created().json(serde_json::json!({
        "message": "Account created successfully",
        "userId": user_id
    }))
}

/// POST /api/auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Trouver l'utilisateur
    let user = Users::find()
        .filter(UserColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await;

    let user = match user {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Login lookup error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    // 2. Vérifier le mot de passe
    let is_valid = match password::verify_password(&body.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            eprintln!("⚠️  Password verification error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid email or password"
        }));
    }

    // 3. Les comptes désactivés par un admin ne peuvent plus se connecter
    if !user.is_active {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Account is disabled"
        }));
    }

    // 4. Générer le JWT
    let token = match jwt::generate_token(&user.id, &user.name, user.role) {
        Ok(token) => token,
        Err(e) => {
            eprintln!("⚠️  Token generation error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Something went wrong"
            }));
        }
    };

    HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
        name: user.name,
        role: user.role,
    })
}

/// GET /api/auth/me - Vérifier le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        user_id: auth_user.user_id,
        name: auth_user.name,
        role: auth_user.role,
    })
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me)
    );
}
