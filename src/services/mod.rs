pub mod order_service;
pub mod message_service;
