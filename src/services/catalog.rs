use crate::{
    db::DbPool,
    entities::menu_item::{
        self, ActiveModel as MenuItemActiveModel, Entity as MenuItemEntity, Model as MenuItemModel,
    },
    entities::order_item::{self, Entity as OrderItemEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// The fixed menu categories, in display order. Grouping queries run
/// one query per entry; admin forms must pick from this list.
pub const CATEGORIES: &[&str] = &[
    "Lunch of the Day",
    "Dessert of the Day",
    "Starters",
    "Breakfasts",
    "Sandwiches",
    "Soups",
    "Bowls",
    "Mains",
    "Kids' Dishes",
    "Salads",
    "Desserts",
    "Hot Drinks",
    "Cold Drinks",
    "Specialty Drinks",
    "Alcohol",
];

/// Public storefront pages and the categories each one shows.
const STOREFRONT_PAGES: &[(&str, &[&str])] = &[
    ("breakfasts", &["Breakfasts", "Sandwiches"]),
    ("bowls", &["Bowls"]),
    ("salads", &["Salads"]),
    ("hot-dishes", &["Mains", "Kids' Dishes"]),
    ("soups-desserts-starters", &["Soups", "Desserts", "Starters"]),
    (
        "drinks",
        &["Hot Drinks", "Cold Drinks", "Specialty Drinks", "Alcohol"],
    ),
];

pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

pub fn storefront_categories(slug: &str) -> Option<&'static [&'static str]> {
    STOREFRONT_PAGES
        .iter()
        .find(|(name, _)| *name == slug)
        .map(|(_, categories)| *categories)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategorySection {
    pub category: String,
    pub items: Vec<MenuItemModel>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMenuItemRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub customizable: bool,
    #[serde(default)]
    pub contains_alcohol: bool,
    #[serde(default)]
    pub display_date: Option<NaiveDate>,
    #[serde(default)]
    pub image_filename: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMenuItemRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub customizable: bool,
    pub available: bool,
    #[serde(default)]
    pub display_date: Option<NaiveDate>,
    /// When set, replaces the stored image
    #[serde(default)]
    pub image_filename: Option<String>,
}

/// Outcome of a mutation that may orphan a stored image file. The
/// caller owns the filesystem cleanup.
#[derive(Debug)]
pub struct ItemMutation {
    pub item: MenuItemModel,
    pub replaced_image: Option<String>,
}

/// Menu reader and admin-side catalog mutations. Reads are uncached;
/// every request re-queries the store.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_logged(event).await;
        }
    }

    fn validate_category(category: &str) -> Result<(), ServiceError> {
        if !is_known_category(category) {
            return Err(ServiceError::ValidationError(format!(
                "Unknown category '{}'",
                category
            )));
        }
        Ok(())
    }

    fn validate_price(price: Decimal) -> Result<(), ServiceError> {
        if price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    async fn items_in(
        &self,
        category: &str,
        only_available: bool,
    ) -> Result<Vec<MenuItemModel>, ServiceError> {
        let mut query = MenuItemEntity::find()
            .filter(menu_item::Column::Category.eq(category))
            .order_by_asc(menu_item::Column::Name);
        if only_available {
            query = query.filter(menu_item::Column::Available.eq(true));
        }
        Ok(query.all(&*self.db).await?)
    }

    /// The full menu grouped by the fixed category list. Customer-facing
    /// contexts pass `only_available = true`; the admin panel passes
    /// false to see disabled items too.
    #[instrument(skip(self))]
    pub async fn menu_by_category(
        &self,
        only_available: bool,
    ) -> Result<Vec<CategorySection>, ServiceError> {
        let mut sections = Vec::with_capacity(CATEGORIES.len());
        for category in CATEGORIES {
            sections.push(CategorySection {
                category: (*category).to_string(),
                items: self.items_in(category, only_available).await?,
            });
        }
        Ok(sections)
    }

    /// Availability-filtered sections for one public storefront page.
    #[instrument(skip(self))]
    pub async fn storefront_page(&self, slug: &str) -> Result<Vec<CategorySection>, ServiceError> {
        let categories = storefront_categories(slug)
            .ok_or_else(|| ServiceError::NotFound(format!("Unknown storefront page '{slug}'")))?;

        let mut sections = Vec::with_capacity(categories.len());
        for category in categories {
            sections.push(CategorySection {
                category: (*category).to_string(),
                items: self.items_in(category, true).await?,
            });
        }
        Ok(sections)
    }

    /// Flat unfiltered listing for the admin panel.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<MenuItemModel>, ServiceError> {
        Ok(MenuItemEntity::find()
            .order_by_asc(menu_item::Column::Category)
            .order_by_asc(menu_item::Column::Name)
            .all(&*self.db)
            .await?)
    }

    pub async fn get_item(&self, item_id: Uuid) -> Result<MenuItemModel, ServiceError> {
        MenuItemEntity::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {} not found", item_id)))
    }

    #[instrument(skip(self, request), fields(name = %request.name, category = %request.category))]
    pub async fn create_item(
        &self,
        request: CreateMenuItemRequest,
    ) -> Result<MenuItemModel, ServiceError> {
        request.validate()?;
        Self::validate_category(&request.category)?;
        Self::validate_price(request.price)?;

        let model = MenuItemActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price),
            category: Set(request.category),
            customizable: Set(request.customizable),
            contains_alcohol: Set(request.contains_alcohol),
            image_filename: Set(request.image_filename),
            display_date: Set(request.display_date),
            available: Set(true),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await?;
        info!(item_id = %created.id, "menu item created");
        self.emit(Event::MenuItemCreated(created.id)).await;
        Ok(created)
    }

    #[instrument(skip(self, request), fields(item_id = %item_id))]
    pub async fn update_item(
        &self,
        item_id: Uuid,
        request: UpdateMenuItemRequest,
    ) -> Result<ItemMutation, ServiceError> {
        request.validate()?;
        Self::validate_category(&request.category)?;
        Self::validate_price(request.price)?;

        let item = self.get_item(item_id).await?;
        let replaced_image = match &request.image_filename {
            Some(_) => item.image_filename.clone(),
            None => None,
        };

        let mut active: MenuItemActiveModel = item.into();
        active.name = Set(request.name);
        active.description = Set(request.description);
        active.price = Set(request.price);
        active.category = Set(request.category);
        active.customizable = Set(request.customizable);
        active.available = Set(request.available);
        active.display_date = Set(request.display_date);
        if let Some(image) = request.image_filename {
            active.image_filename = Set(Some(image));
        }

        let updated = active.update(&*self.db).await?;
        info!(item_id = %item_id, "menu item updated");
        self.emit(Event::MenuItemUpdated(item_id)).await;

        Ok(ItemMutation {
            item: updated,
            replaced_image,
        })
    }

    /// Removes an item together with every order line referencing it,
    /// in one transaction, so no order_items rows are orphaned.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn delete_item(&self, item_id: Uuid) -> Result<ItemMutation, ServiceError> {
        let item = self.get_item(item_id).await?;
        let image = item.image_filename.clone();

        let txn = self.db.begin().await?;

        OrderItemEntity::delete_many()
            .filter(order_item::Column::MenuItemId.eq(item_id))
            .exec(&txn)
            .await?;

        item.clone().delete(&txn).await?;

        txn.commit().await?;

        info!(item_id = %item_id, "menu item deleted");
        self.emit(Event::MenuItemDeleted(item_id)).await;

        Ok(ItemMutation {
            item,
            replaced_image: image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_list_is_closed() {
        assert!(is_known_category("Soups"));
        assert!(is_known_category("Alcohol"));
        assert!(!is_known_category("soups"));
        assert!(!is_known_category("Specials"));
    }

    #[test]
    fn storefront_pages_reference_known_categories() {
        for (slug, categories) in STOREFRONT_PAGES {
            assert!(
                storefront_categories(slug).is_some(),
                "missing page {slug}"
            );
            for category in *categories {
                assert!(is_known_category(category), "{category} not in CATEGORIES");
            }
        }
        assert!(storefront_categories("desserts-only").is_none());
    }
}
