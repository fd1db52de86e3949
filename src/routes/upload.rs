use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures::StreamExt;
use chrono::Utc;
use uuid::Uuid;
use std::path::Path;

use crate::middleware::AuthUser;

/// POST /api/upload - Upload multipart d'images produit (PROTÉGÉE)
/// Chaque fichier est réécrit sous public/uploads/ avec un nom régénéré;
/// la réponse liste les URLs publiques correspondantes.
#[post("")]
pub async fn upload_files(_auth_user: AuthUser, mut payload: Multipart) -> HttpResponse {
    let upload_dir = Path::new("public").join("uploads");
    if let Err(e) = tokio::fs::create_dir_all(&upload_dir).await {
        eprintln!("⚠️  Upload dir creation error: {}", e);
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Failed to upload files"
        }));
    }

    let mut urls: Vec<String> = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                eprintln!("⚠️  Multipart read error: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to upload files"
                }));
            }
        };

        // Nom régénéré, seule l'extension du fichier original est conservée
        let extension = field
            .content_disposition()
            .get_filename()
            .and_then(|name| Path::new(name).extension())
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let random_part = Uuid::new_v4().simple().to_string();
        let filename = format!(
            "{}-{}{}",
            Utc::now().timestamp_millis(),
            &random_part[..8],
            extension
        );
        let filepath = upload_dir.join(&filename);

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(data) => bytes.extend_from_slice(&data),
                Err(e) => {
                    eprintln!("⚠️  Multipart chunk error: {}", e);
                    return HttpResponse::InternalServerError().json(serde_json::json!({
                        "error": "Failed to upload files"
                    }));
                }
            }
        }

        if let Err(e) = tokio::fs::write(&filepath, &bytes).await {
            eprintln!("⚠️  File write error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to upload files"
            }));
        }

        urls.push(format!("/uploads/{}", filename));
    }

    if urls.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "No files provided"
        }));
    }

    HttpResponse::Ok().json(serde_json::json!({ "urls": urls }))
}

pub fn upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/upload")
            .service(upload_files)
    );
}
