use crate::{
    db::DbPool,
    entities::dining_table::{
        self, ActiveModel as TableActiveModel, Entity as TableEntity, Model as TableModel,
    },
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Manages the dense set of physical tables. Tables are identified by
/// their position (1..=count); the admin only ever supplies a target
/// count and the set is reconciled to it.
#[derive(Clone)]
pub struct TableService {
    db: Arc<DbPool>,
}

impl TableService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_tables(&self) -> Result<Vec<TableModel>, ServiceError> {
        Ok(TableEntity::find()
            .order_by_asc(dining_table::Column::Id)
            .all(&*self.db)
            .await?)
    }

    pub async fn table_count(&self) -> Result<u64, ServiceError> {
        Ok(TableEntity::find().count(&*self.db).await?)
    }

    /// Whether `table_id` addresses an existing table. The menu
    /// endpoints 404 outside `1..=count`.
    pub async fn table_exists(&self, table_id: i32) -> Result<bool, ServiceError> {
        if table_id < 1 {
            return Ok(false);
        }
        Ok(TableEntity::find_by_id(table_id)
            .one(&*self.db)
            .await?
            .is_some())
    }

    /// Reconciles the table set to `target` entries: missing tables are
    /// appended with their QR token, surplus tables (id > target) are
    /// removed. Historical orders keep their table_id; the reference is
    /// nullable and never cascaded.
    #[instrument(skip(self))]
    pub async fn set_table_count(&self, target: i32) -> Result<Vec<TableModel>, ServiceError> {
        if target < 0 {
            return Err(ServiceError::ValidationError(
                "Table count must not be negative".to_string(),
            ));
        }

        let current = self.table_count().await? as i32;
        let txn = self.db.begin().await?;

        if target > current {
            for id in (current + 1)..=target {
                let table = TableActiveModel {
                    id: Set(id),
                    qr_token: Set(format!("table_{id}")),
                };
                table.insert(&txn).await?;
            }
        } else if target < current {
            TableEntity::delete_many()
                .filter(dining_table::Column::Id.gt(target))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        info!(from = current, to = target, "table count updated");
        self.list_tables().await
    }
}
