//! Notification event repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use permio_core::notification::sink::{NotificationError, NotificationSink};
use permio_core::notification::types::{NotificationEvent, NotificationKind};
use permio_shared::{EmployeeId, NotificationId, RequestId};

use crate::entities::{notification_events, sea_orm_active_enums};

/// Postgres-backed [`NotificationSink`].
///
/// The `(request_id, kind)` unique key absorbs at-least-once dispatch:
/// a duplicate insert is dropped by `ON CONFLICT DO NOTHING`.
#[derive(Debug, Clone)]
pub struct SeaOrmNotificationSink {
    db: DatabaseConnection,
}

impl SeaOrmNotificationSink {
    /// Creates a new notification sink.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationSink for SeaOrmNotificationSink {
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        let active = notification_events::ActiveModel {
            id: Set(event.id.into_inner()),
            request_id: Set(event.request_id.into_inner()),
            recipient_id: Set(event.recipient_id.into_inner()),
            kind: Set(kind_to_db(event.kind)),
            message: Set(event.message.clone()),
            read: Set(event.read),
            created_at: Set(event.created_at.into()),
        };

        notification_events::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    notification_events::Column::RequestId,
                    notification_events::Column::Kind,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        debug!(
            request_id = %event.request_id,
            recipient_id = %event.recipient_id,
            kind = event.kind.as_str(),
            "notification recorded"
        );
        Ok(())
    }

    async fn for_recipient(
        &self,
        recipient_id: EmployeeId,
    ) -> Result<Vec<NotificationEvent>, NotificationError> {
        let models = notification_events::Entity::find()
            .filter(notification_events::Column::RecipientId.eq(recipient_id.into_inner()))
            .order_by_desc(notification_events::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_core).collect())
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn db_err(err: sea_orm::DbErr) -> NotificationError {
    NotificationError::Storage(err.to_string())
}

fn kind_to_db(value: NotificationKind) -> sea_orm_active_enums::NotificationKind {
    match value {
        NotificationKind::Submitted => sea_orm_active_enums::NotificationKind::Submitted,
        NotificationKind::Approved => sea_orm_active_enums::NotificationKind::Approved,
        NotificationKind::Rejected => sea_orm_active_enums::NotificationKind::Rejected,
        NotificationKind::Cancelled => sea_orm_active_enums::NotificationKind::Cancelled,
    }
}

fn kind_to_core(value: &sea_orm_active_enums::NotificationKind) -> NotificationKind {
    match value {
        sea_orm_active_enums::NotificationKind::Submitted => NotificationKind::Submitted,
        sea_orm_active_enums::NotificationKind::Approved => NotificationKind::Approved,
        sea_orm_active_enums::NotificationKind::Rejected => NotificationKind::Rejected,
        sea_orm_active_enums::NotificationKind::Cancelled => NotificationKind::Cancelled,
    }
}

fn model_to_core(model: notification_events::Model) -> NotificationEvent {
    NotificationEvent {
        id: NotificationId::from_uuid(model.id),
        request_id: RequestId::from_uuid(model.request_id),
        recipient_id: EmployeeId::from_uuid(model.recipient_id),
        kind: kind_to_core(&model.kind),
        message: model.message,
        created_at: model.created_at.with_timezone(&Utc),
        read: model.read,
    }
}
