// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - users : Comptes (ADMIN, SELLER, CUSTOMER) avec auth par email
//   - seller_profiles : Fiche boutique 1:1 avec un user vendeur
//   - categories : Catégories de pièces (arbre à un niveau, slug unique)
//   - products : Pièces auto en vente (prix, stock, compatibilité véhicule)
//   - orders : Commandes (une par vendeur lors d'un checkout)
//   - order_items : Lignes de commande (prix unitaire capturé à la commande)
//   - messages : Messagerie acheteur/vendeur (conversations dérivées)
//   - dto : Data Transfer Objects pour les requêtes et réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les identifiants sont des chaînes opaques (UUID v4 générés à l'insert)
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod users;
pub mod seller_profiles;
pub mod categories;
pub mod products;
pub mod orders;
pub mod order_items;
pub mod messages;
pub mod dto;
