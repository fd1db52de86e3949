use actix_web::{post, get, web, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Deserialize;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::models::messages;
use crate::models::dto::MessageRequest;
use crate::middleware::AuthUser;
use crate::services::message_service::MessageService;
use crate::utils::validation;

#[derive(Deserialize)]
pub struct MessageQuery {
    // Id de l'interlocuteur: présent = fil de discussion, absent = liste
    pub with: Option<String>,
}

/// GET /api/messages - Liste des conversations, ou fil complet avec
/// ?with=<userId> (PROTÉGÉE). Ouvrir un fil marque comme lus les messages
/// reçus de cet interlocuteur.
#[get("")]
pub async fn get_messages(
    auth_user: AuthUser,
    query: web::Query<MessageQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(contact_id) = query.with.as_deref().filter(|s| !s.is_empty()) {
        return match MessageService::get_thread(db.get_ref(), &auth_user.user_id, contact_id).await
        {
            Ok(thread) => HttpResponse::Ok().json(thread),
            Err(e) => {
                eprintln!("⚠️  Thread fetch error: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to fetch messages"
                }))
            }
        };
    }

    match MessageService::list_conversations(db.get_ref(), &auth_user.user_id).await {
        Ok(conversations) => HttpResponse::Ok().json(conversations),
        Err(e) => {
            eprintln!("⚠️  Conversations fetch error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch messages"
            }))
        }
    }
}

/// POST /api/messages - Envoyer un message (PROTÉGÉE)
#[post("")]
pub async fn send_message(
    auth_user: AuthUser,
    body: web::Json<MessageRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": validation::first_error_message(&errors)
        }));
    }

    let new_message = messages::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        sender_id: Set(auth_user.user_id.clone()),
        receiver_id: Set(body.receiver_id.clone()),
        content: Set(body.content.clone()),
        is_read: Set(false),
        created_at: Set(Utc::now()),
    };

    match new_message.insert(db.get_ref()).await {
        Ok(message) => HttpResponse::Created().json(message),
        Err(e) => {
            eprintln!("⚠️  Message send error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to send message"
            }))
        }
    }
}

pub fn message_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/messages")
            .service(get_messages)
            .service(send_message)
    );
}
