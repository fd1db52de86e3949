use sea_orm::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{orders, order_items, products, seller_profiles, users};
use crate::models::orders::OrderStatus;
use crate::models::dto::{
    CreateOrderRequest, CustomerInfo, OrderItemRequest, OrderItemResponse, OrderResponse,
    SellerBrief,
};
use crate::utils::images::parse_images;

/// Erreur métier du workflow de commande
#[derive(Debug)]
pub enum OrderError {
    /// Panier refusé avant toute écriture (produit inconnu ou indisponible)
    Rejected(String),
    Db(DbErr),
}

impl From<DbErr> for OrderError {
    fn from(e: DbErr) -> Self {
        OrderError::Db(e)
    }
}

/// Périmètre de lecture des commandes selon le rôle de l'appelant
pub enum OrderScope {
    Customer(String),
    Seller(String),
    All,
}

/// Ligne d'une commande en préparation (prix unitaire capturé au moment T)
#[derive(Debug, Clone)]
struct OrderLine {
    product_id: String,
    quantity: i32,
    price: Decimal,
}

pub struct OrderService;

impl OrderService {
    /// Crée les commandes d'un checkout: une commande par vendeur distinct,
    /// chacune avec ses lignes et son total calculé sur le prix catalogue
    /// courant (jamais un prix fourni par le client).
    ///
    /// Les insertions par groupe vendeur sont séquentielles et indépendantes:
    /// le stock n'est pas décrémenté et aucune transaction globale n'englobe
    /// les groupes.
    pub async fn create_orders(
        db: &DatabaseConnection,
        customer_id: &str,
        request: CreateOrderRequest,
    ) -> Result<Vec<orders::Model>, OrderError> {
        // 1. Charger tous les produits référencés en une seule requête
        let product_ids: Vec<String> = request
            .items
            .iter()
            .map(|item| item.product_id.clone())
            .collect();

        let products_list = products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(db)
            .await?;

        // 2. Partitionner les lignes par vendeur; tout le panier est refusé
        //    si un produit est inconnu ou indisponible
        let groups = group_items_by_seller(&request.items, &products_list)?;

        // 3. Une commande par vendeur
        let mut created = Vec::new();
        for (seller_id, lines) in groups {
            let total = group_total(&lines);

            let new_order = orders::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                customer_id: Set(customer_id.to_string()),
                seller_id: Set(seller_id),
                status: Set(OrderStatus::Pending),
                total_amount: Set(total),
                shipping_address: Set(request.shipping_address.clone()),
                phone: Set(request.phone.clone()),
                notes: Set(request.notes.clone()),
                created_at: Set(Utc::now()),
            };
            let order = new_order.insert(db).await?;

            for line in lines {
                let new_item = order_items::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    order_id: Set(order.id.clone()),
                    product_id: Set(line.product_id),
                    quantity: Set(line.quantity),
                    price: Set(line.price),
                };
                new_item.insert(db).await?;
            }

            created.push(order);
        }

        Ok(created)
    }

    /// Liste les commandes d'un périmètre, les plus récentes en premier
    pub async fn list_orders(
        db: &DatabaseConnection,
        scope: OrderScope,
    ) -> Result<Vec<OrderResponse>, DbErr> {
        let mut query = orders::Entity::find().order_by_desc(orders::Column::CreatedAt);

        match scope {
            OrderScope::Customer(id) => {
                query = query.filter(orders::Column::CustomerId.eq(id));
            }
            OrderScope::Seller(id) => {
                query = query.filter(orders::Column::SellerId.eq(id));
            }
            OrderScope::All => {}
        }

        let orders_list = query.all(db).await?;

        let mut response = Vec::new();
        for order in orders_list {
            response.push(Self::shape_order(db, order).await?);
        }

        Ok(response)
    }

    /// Construit la réponse API d'une commande (client, vendeur, lignes)
    pub async fn shape_order(
        db: &DatabaseConnection,
        order: orders::Model,
    ) -> Result<OrderResponse, DbErr> {
        let customer = users::Entity::find_by_id(order.customer_id.as_str())
            .one(db)
            .await?;
        let seller = users::Entity::find_by_id(order.seller_id.as_str())
            .one(db)
            .await?;
        let shop_name = seller_profiles::Entity::find_by_id(order.seller_id.as_str())
            .one(db)
            .await?
            .map(|profile| profile.shop_name);

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(&order.id))
            .all(db)
            .await?;

        let mut item_responses = Vec::new();
        for item in items {
            let product = products::Entity::find_by_id(item.product_id.as_str())
                .one(db)
                .await?;

            item_responses.push(OrderItemResponse {
                id: item.id,
                product_id: item.product_id,
                product_name: product.as_ref().map(|p| p.name.clone()),
                images: product
                    .map(|p| parse_images(&p.images))
                    .unwrap_or_default(),
                quantity: item.quantity,
                price: item.price,
            });
        }

        Ok(OrderResponse {
            id: order.id,
            customer: customer.map(|c| CustomerInfo {
                id: c.id,
                name: c.name,
                phone: c.phone,
            }),
            seller: seller.map(|s| SellerBrief {
                id: s.id,
                name: s.name,
                shop_name,
            }),
            status: order.status,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address,
            phone: order.phone,
            notes: order.notes,
            created_at: order.created_at,
            items: item_responses,
        })
    }
}

/// Partitionne les lignes du panier par vendeur propriétaire de chaque produit
fn group_items_by_seller(
    items: &[OrderItemRequest],
    products_list: &[products::Model],
) -> Result<HashMap<String, Vec<OrderLine>>, OrderError> {
    // Moins de produits chargés que demandés = au moins un id inconnu
    if products_list.len() != items.len() {
        return Err(OrderError::Rejected("Some products not found".to_string()));
    }

    let mut groups: HashMap<String, Vec<OrderLine>> = HashMap::new();

    for item in items {
        let product = products_list
            .iter()
            .find(|p| p.id == item.product_id)
            .ok_or_else(|| OrderError::Rejected("Some products not found".to_string()))?;

        if !product.is_available {
            return Err(OrderError::Rejected(format!(
                "Product {} is not available",
                product.name
            )));
        }

        groups
            .entry(product.seller_id.clone())
            .or_default()
            .push(OrderLine {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                price: product.price,
            });
    }

    Ok(groups)
}

/// Total d'un groupe vendeur: Σ(prix unitaire × quantité)
fn group_total(lines: &[OrderLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_product(id: &str, seller_id: &str, price: i64, available: bool) -> products::Model {
        products::Model {
            id: id.to_string(),
            name: format!("Product {}", id),
            name_ar: None,
            description: None,
            description_ar: None,
            price: Decimal::from(price),
            stock: 5,
            is_available: available,
            currency: "DZD".to_string(),
            images: "[]".to_string(),
            car_make: None,
            car_model: None,
            car_year: None,
            category_id: "cat".to_string(),
            seller_id: seller_id.to_string(),
            created_at: Utc::now(),
        }
    }

    fn make_item(product_id: &str, quantity: i32) -> OrderItemRequest {
        OrderItemRequest {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_one_group_per_distinct_seller() {
        let products_list = vec![
            make_product("p1", "seller-a", 1000, true),
            make_product("p2", "seller-a", 2000, true),
            make_product("p3", "seller-b", 500, true),
        ];
        let items = vec![make_item("p1", 2), make_item("p2", 1), make_item("p3", 4)];

        let groups = group_items_by_seller(&items, &products_list).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["seller-a"].len(), 2);
        assert_eq!(groups["seller-b"].len(), 1);
    }

    #[test]
    fn test_totals_are_independent_per_seller() {
        let products_list = vec![
            make_product("p1", "seller-a", 1000, true),
            make_product("p2", "seller-b", 500, true),
        ];
        let items = vec![make_item("p1", 2), make_item("p2", 3)];

        let groups = group_items_by_seller(&items, &products_list).unwrap();

        assert_eq!(group_total(&groups["seller-a"]), Decimal::from(2000));
        assert_eq!(group_total(&groups["seller-b"]), Decimal::from(1500));
    }

    #[test]
    fn test_captured_price_is_catalog_price() {
        let products_list = vec![make_product("p1", "seller-a", 1000, true)];
        let items = vec![make_item("p1", 2)];

        let groups = group_items_by_seller(&items, &products_list).unwrap();
        let line = &groups["seller-a"][0];

        assert_eq!(line.price, Decimal::from(1000));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_unknown_product_rejects_whole_cart() {
        let products_list = vec![make_product("p1", "seller-a", 1000, true)];
        let items = vec![make_item("p1", 1), make_item("missing", 1)];

        match group_items_by_seller(&items, &products_list) {
            Err(OrderError::Rejected(message)) => {
                assert_eq!(message, "Some products not found");
            }
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unavailable_product_rejects_whole_cart() {
        let products_list = vec![
            make_product("p1", "seller-a", 1000, true),
            make_product("p2", "seller-b", 500, false),
        ];
        let items = vec![make_item("p1", 1), make_item("p2", 1)];

        match group_items_by_seller(&items, &products_list) {
            Err(OrderError::Rejected(message)) => {
                assert_eq!(message, "Product Product p2 is not available");
            }
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }
}
