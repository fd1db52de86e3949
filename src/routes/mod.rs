pub mod health;
pub mod auth;
pub mod categories;
pub mod products;
pub mod orders;
pub mod messages;
pub mod admin;
pub mod upload;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(categories::category_routes)
            .configure(products::product_routes)
            .configure(orders::order_routes)
            .configure(messages::message_routes)
            .configure(admin::admin_routes)
            .configure(upload::upload_routes)
    );
}
