use crate::{
    db::DbPool,
    entities::event::{
        self, ActiveModel as EventActiveModel, Entity as EventEntity, Model as EventModel,
    },
    errors::ServiceError,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub image_filename: Option<String>,
    #[serde(default = "default_true")]
    pub display_title: bool,
    #[serde(default = "default_true")]
    pub display_description: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub display_title: bool,
    pub display_description: bool,
    /// When set, replaces the stored banner image
    #[serde(default)]
    pub image_filename: Option<String>,
}

/// Promotional calendar entries shown on the landing page.
#[derive(Clone)]
pub struct PromotionService {
    db: Arc<DbPool>,
}

impl PromotionService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    fn validate_dates(start: NaiveDate, end: NaiveDate) -> Result<(), ServiceError> {
        if end < start {
            return Err(ServiceError::ValidationError(
                "Event end date must not precede its start date".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<EventModel, ServiceError> {
        EventEntity::find_by_id(event_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Event {} not found", event_id)))
    }

    /// Events still running on `today`, soonest first. The first entry
    /// is the landing page's headline event, the second its follow-up.
    #[instrument(skip(self))]
    pub async fn upcoming(&self, today: NaiveDate) -> Result<Vec<EventModel>, ServiceError> {
        Ok(EventEntity::find()
            .filter(event::Column::EndDate.gte(today))
            .order_by_asc(event::Column::StartDate)
            .all(&*self.db)
            .await?)
    }

    /// Admin listing, newest first.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<EventModel>, ServiceError> {
        Ok(EventEntity::find()
            .order_by_desc(event::Column::StartDate)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_event(
        &self,
        request: CreateEventRequest,
    ) -> Result<EventModel, ServiceError> {
        request.validate()?;
        Self::validate_dates(request.start_date, request.end_date)?;

        let model = EventActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(request.title),
            description: Set(request.description),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            image_filename: Set(request.image_filename),
            display_title: Set(request.display_title),
            display_description: Set(request.display_description),
        };

        let created = model.insert(&*self.db).await?;
        info!(event_id = %created.id, "event created");
        Ok(created)
    }

    /// Returns the updated event plus any replaced image filename so
    /// the caller can clean up the stored file.
    #[instrument(skip(self, request), fields(event_id = %event_id))]
    pub async fn update_event(
        &self,
        event_id: Uuid,
        request: UpdateEventRequest,
    ) -> Result<(EventModel, Option<String>), ServiceError> {
        request.validate()?;
        Self::validate_dates(request.start_date, request.end_date)?;

        let existing = self.get_event(event_id).await?;
        let replaced_image = match &request.image_filename {
            Some(_) => existing.image_filename.clone(),
            None => None,
        };

        let mut active: EventActiveModel = existing.into();
        active.title = Set(request.title);
        active.description = Set(request.description);
        active.start_date = Set(request.start_date);
        active.end_date = Set(request.end_date);
        active.display_title = Set(request.display_title);
        active.display_description = Set(request.display_description);
        if let Some(image) = request.image_filename {
            active.image_filename = Set(Some(image));
        }

        let updated = active.update(&*self.db).await?;
        info!(event_id = %event_id, "event updated");
        Ok((updated, replaced_image))
    }

    /// Deletes the event; returns its image filename for cleanup.
    #[instrument(skip(self), fields(event_id = %event_id))]
    pub async fn delete_event(&self, event_id: Uuid) -> Result<Option<String>, ServiceError> {
        let existing = self.get_event(event_id).await?;
        let image = existing.image_filename.clone();
        existing.delete(&*self.db).await?;
        info!(event_id = %event_id, "event deleted");
        Ok(image)
    }
}
