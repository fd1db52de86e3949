use sea_orm::*;
use sea_orm::sea_query::Expr;
use std::collections::HashSet;

use crate::models::{messages, seller_profiles, users};
use crate::models::dto::{ContactInfo, ConversationResponse, MessageResponse, UserBrief};

pub struct MessageService;

impl MessageService {
    /// Liste des conversations de l'utilisateur. Aucune entité conversation
    /// n'existe: la liste est dérivée à chaque requête à partir des messages.
    pub async fn list_conversations(
        db: &DatabaseConnection,
        user_id: &str,
    ) -> Result<Vec<ConversationResponse>, DbErr> {
        // 1. Interlocuteurs distincts (destinataires de mes envois
        //    + expéditeurs de mes messages reçus)
        let sent_to: Vec<String> = messages::Entity::find()
            .select_only()
            .column(messages::Column::ReceiverId)
            .filter(messages::Column::SenderId.eq(user_id))
            .distinct()
            .into_tuple()
            .all(db)
            .await?;

        let received_from: Vec<String> = messages::Entity::find()
            .select_only()
            .column(messages::Column::SenderId)
            .filter(messages::Column::ReceiverId.eq(user_id))
            .distinct()
            .into_tuple()
            .all(db)
            .await?;

        let contact_ids: HashSet<String> =
            sent_to.into_iter().chain(received_from).collect();

        // 2. Pour chaque interlocuteur: fiche contact, dernier message, non-lus
        let mut conversations = Vec::new();
        for contact_id in contact_ids {
            let contact = users::Entity::find_by_id(contact_id.as_str())
                .one(db)
                .await?;
            let shop_name = seller_profiles::Entity::find_by_id(contact_id.as_str())
                .one(db)
                .await?
                .map(|profile| profile.shop_name);

            let last_message = messages::Entity::find()
                .filter(between(user_id, &contact_id))
                .order_by_desc(messages::Column::CreatedAt)
                .one(db)
                .await?;

            let unread_count = messages::Entity::find()
                .filter(messages::Column::SenderId.eq(&contact_id))
                .filter(messages::Column::ReceiverId.eq(user_id))
                .filter(messages::Column::IsRead.eq(false))
                .count(db)
                .await?;

            conversations.push(ConversationResponse {
                contact: contact.map(|user| ContactInfo {
                    id: user.id,
                    name: user.name,
                    avatar: user.avatar,
                    shop_name,
                }),
                last_message: last_message.map(|message| shape_message(message, None, None)),
                unread_count,
            });
        }

        // 3. Conversation la plus active en premier (aucun message = en dernier)
        conversations.sort_by(|a, b| {
            let a_key = a.last_message.as_ref().map(|m| m.created_at);
            let b_key = b.last_message.as_ref().map(|m| m.created_at);
            b_key.cmp(&a_key)
        });

        Ok(conversations)
    }

    /// Fil de discussion avec un interlocuteur, du plus ancien au plus récent.
    /// Ouvrir le fil acquitte les messages non lus de l'interlocuteur; une
    /// relecture ne change plus rien (les messages sont déjà lus).
    pub async fn get_thread(
        db: &DatabaseConnection,
        user_id: &str,
        contact_id: &str,
    ) -> Result<Vec<MessageResponse>, DbErr> {
        let thread = messages::Entity::find()
            .filter(between(user_id, contact_id))
            .order_by_asc(messages::Column::CreatedAt)
            .all(db)
            .await?;

        messages::Entity::update_many()
            .col_expr(messages::Column::IsRead, Expr::value(true))
            .filter(messages::Column::SenderId.eq(contact_id))
            .filter(messages::Column::ReceiverId.eq(user_id))
            .filter(messages::Column::IsRead.eq(false))
            .exec(db)
            .await?;

        let me = users::Entity::find_by_id(user_id).one(db).await?;
        let contact = users::Entity::find_by_id(contact_id).one(db).await?;

        let response = thread
            .into_iter()
            .map(|message| {
                let (sender, receiver) = if message.sender_id == user_id {
                    (me.clone(), contact.clone())
                } else {
                    (contact.clone(), me.clone())
                };
                shape_message(message, sender, receiver)
            })
            .collect();

        Ok(response)
    }
}

/// Condition "messages échangés entre ces deux utilisateurs"
fn between(user_id: &str, contact_id: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(messages::Column::SenderId.eq(user_id))
                .add(messages::Column::ReceiverId.eq(contact_id)),
        )
        .add(
            Condition::all()
                .add(messages::Column::SenderId.eq(contact_id))
                .add(messages::Column::ReceiverId.eq(user_id)),
        )
}

fn shape_message(
    message: messages::Model,
    sender: Option<users::Model>,
    receiver: Option<users::Model>,
) -> MessageResponse {
    MessageResponse {
        id: message.id,
        sender_id: message.sender_id,
        receiver_id: message.receiver_id,
        content: message.content,
        is_read: message.is_read,
        created_at: message.created_at,
        sender: sender.map(brief),
        receiver: receiver.map(brief),
    }
}

fn brief(user: users::Model) -> UserBrief {
    UserBrief {
        id: user.id,
        name: user.name,
        avatar: user.avatar,
    }
}
