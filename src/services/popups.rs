use crate::{
    db::DbPool,
    entities::popup::{ActiveModel as PopupActiveModel, Entity as PopupEntity, Model as PopupModel},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// The single promotional popup. Setting a new image replaces whatever
/// row exists; the active flag toggles independently.
#[derive(Clone)]
pub struct PopupService {
    db: Arc<DbPool>,
}

impl PopupService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn current(&self) -> Result<Option<PopupModel>, ServiceError> {
        Ok(PopupEntity::find().one(&*self.db).await?)
    }

    /// Replaces the popup record with a fresh, active one. Returns the
    /// new popup plus the replaced image filename for cleanup.
    #[instrument(skip(self))]
    pub async fn set_popup(
        &self,
        image_filename: String,
    ) -> Result<(PopupModel, Option<String>), ServiceError> {
        let txn = self.db.begin().await?;

        let replaced = PopupEntity::find()
            .one(&txn)
            .await?
            .map(|existing| existing.image_filename);

        PopupEntity::delete_many().exec(&txn).await?;

        let model = PopupActiveModel {
            id: Set(Uuid::new_v4()),
            image_filename: Set(image_filename),
            is_active: Set(true),
        };
        let created = model.insert(&txn).await?;

        txn.commit().await?;

        info!(popup_id = %created.id, "popup replaced");
        Ok((created, replaced))
    }

    /// Flips the active flag; missing popup is an error the admin
    /// panel surfaces.
    #[instrument(skip(self))]
    pub async fn toggle(&self) -> Result<PopupModel, ServiceError> {
        let popup = PopupEntity::find()
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No popup to toggle".to_string()))?;

        let next = !popup.is_active;
        let mut active: PopupActiveModel = popup.into();
        active.is_active = Set(next);
        let updated = active.update(&*self.db).await?;

        info!(is_active = updated.is_active, "popup toggled");
        Ok(updated)
    }
}
