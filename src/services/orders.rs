use crate::{
    db::DbPool,
    entities::menu_item::{self, Entity as MenuItemEntity},
    entities::order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel},
    entities::order_item::{self, ActiveModel as OrderItemActiveModel, Entity as OrderItemEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Attempts to claim a daily order number before giving up. Collisions
/// only happen when two orders for the same day commit concurrently.
const NUMBERING_ATTEMPTS: usize = 3;

/// Completed-order history page size
const HISTORY_PAGE_SIZE: u64 = 50;

/// Order lifecycle states. The display string is what is persisted and
/// what dashboards receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum OrderStatus {
    #[strum(serialize = "Pending")]
    Pending,
    #[strum(serialize = "Accepted")]
    Accepted,
    #[strum(serialize = "In Preparation")]
    #[serde(rename = "In Preparation")]
    InPreparation,
    #[strum(serialize = "Ready")]
    Ready,
    #[strum(serialize = "Completed")]
    Completed,
}

impl OrderStatus {
    /// Statuses shown on the waiter dashboard
    pub const ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::InPreparation,
        OrderStatus::Ready,
    ];

    /// Statuses shown on the kitchen dashboard
    pub const IN_KITCHEN: [OrderStatus; 2] = [OrderStatus::Accepted, OrderStatus::InPreparation];

    /// Whether moving `self -> to` follows the fixed sequence.
    /// `Completed` is terminal and reachable from every other state.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, to) {
            (Completed, _) => false,
            (_, Completed) => true,
            (Pending, Accepted) => true,
            (Accepted, InPreparation) => true,
            (InPreparation, Ready) => true,
            _ => false,
        }
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus, ServiceError> {
    OrderStatus::from_str(raw)
        .map_err(|_| ServiceError::InternalError(format!("Unknown order status in store: {raw}")))
}

/// Request/response types for the order service
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    pub table_id: Option<i32>,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderLineRequest>,
    pub delivery: Option<DeliveryDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub customization: Option<String>,
    #[serde(default)]
    pub takeaway: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub postal: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub order_number: i32,
    pub total_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BillRequest {
    pub payment_method: String,
    #[serde(default)]
    pub tip: Option<Decimal>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

/// Line shape shared by the dashboards and the customer status view
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub customization: Option<String>,
    pub takeaway: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub order_number: i32,
    pub table_id: Option<i32>,
    pub status: OrderStatus,
    pub total_price: Decimal,
    /// Local wall-clock time the order was placed (HH:MM)
    pub order_time: String,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order_id: Uuid,
    pub order_number: i32,
    pub table_id: Option<i32>,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub estimated_completion_time: Option<DateTime<Utc>>,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderStatusView {
    pub status: OrderStatus,
    pub estimated_completion_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    WaiterCall,
    BillRequest,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WaiterCall {
    pub order_id: Uuid,
    pub order_number: i32,
    pub table_id: Option<i32>,
    pub call_type: CallType,
    /// Local wall-clock time of the signal (HH:MM:SS)
    pub call_time: Option<String>,
    pub payment_method: Option<String>,
    pub tip: Option<Decimal>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderHistoryPage {
    pub orders: Vec<OrderSummary>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for order placement, the status machine, and the waiter
/// signals layered on top of it.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    tz: Tz,
    waiter_call_cooldown: Duration,
}

impl OrderService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        tz: Tz,
        waiter_call_cooldown_minutes: i64,
    ) -> Self {
        Self {
            db,
            event_sender,
            tz,
            waiter_call_cooldown: Duration::minutes(waiter_call_cooldown_minutes),
        }
    }

    fn business_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_logged(event).await;
        }
    }

    /// Highest number already claimed for `day`, within the caller's
    /// transaction so the subsequent insert sees a consistent max.
    async fn next_order_number(
        txn: &DatabaseTransaction,
        day: NaiveDate,
    ) -> Result<i32, ServiceError> {
        let max: Option<Option<i32>> = OrderEntity::find()
            .select_only()
            .column_as(order::Column::OrderNumber.max(), "max_number")
            .filter(order::Column::OrderDay.eq(day))
            .into_tuple()
            .one(txn)
            .await?;

        Ok(max.flatten().unwrap_or(0) + 1)
    }

    /// Creates an order with its lines in one transaction.
    ///
    /// Lines referencing missing or unavailable menu items are skipped;
    /// the total is the sum of price x quantity over the lines kept.
    /// The daily number is claimed inside the transaction and the whole
    /// insert retries on a unique-index collision.
    #[instrument(skip(self, request), fields(table_id = ?request.table_id, lines = request.items.len()))]
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
    ) -> Result<PlacedOrder, ServiceError> {
        request.validate()?;

        if request.items.iter().any(|line| line.quantity <= 0) {
            return Err(ServiceError::ValidationError(
                "Item quantity must be a positive integer".to_string(),
            ));
        }

        let mut last_err: Option<ServiceError> = None;

        for attempt in 1..=NUMBERING_ATTEMPTS {
            match self.try_place_order(&request).await {
                Ok(placed) => {
                    info!(
                        order_id = %placed.order_id,
                        order_number = placed.order_number,
                        "order placed"
                    );
                    self.emit(Event::OrderPlaced {
                        order_id: placed.order_id,
                        order_number: placed.order_number,
                    })
                    .await;
                    return Ok(placed);
                }
                Err(ServiceError::DatabaseError(db_err))
                    if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    warn!(attempt, "daily order number collision, retrying");
                    last_err = Some(ServiceError::DatabaseError(db_err));
                }
                Err(other) => return Err(other),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ServiceError::InternalError("Order numbering retries exhausted".to_string())
        }))
    }

    async fn try_place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> Result<PlacedOrder, ServiceError> {
        let txn = self.db.begin().await?;

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order_day = self.business_day(now);
        let order_number = Self::next_order_number(&txn, order_day).await?;

        // Resolve lines first so the stored total matches what is kept.
        let mut kept: Vec<(&OrderLineRequest, menu_item::Model)> = Vec::new();
        let mut total = Decimal::ZERO;
        for line in &request.items {
            let item = MenuItemEntity::find_by_id(line.menu_item_id).one(&txn).await?;
            match item {
                Some(item) if item.available => {
                    total += item.price * Decimal::from(line.quantity);
                    kept.push((line, item));
                }
                _ => {
                    warn!(menu_item_id = %line.menu_item_id, "skipping unavailable menu item");
                }
            }
        }

        if kept.is_empty() {
            return Err(ServiceError::ValidationError(
                "None of the ordered items are available".to_string(),
            ));
        }

        let delivery = request.delivery.clone().unwrap_or_default();

        let order_model = OrderActiveModel {
            id: Set(order_id),
            table_id: Set(request.table_id),
            status: Set(OrderStatus::Pending.to_string()),
            total_price: Set(total),
            created_at: Set(now),
            order_day: Set(order_day),
            order_number: Set(order_number),
            call_waiter: Set(false),
            last_call_time: Set(None),
            request_bill: Set(false),
            bill_payment_method: Set(None),
            tip: Set(None),
            tax_id: Set(None),
            estimated_completion_time: Set(None),
            delivery_name: Set(delivery.name),
            delivery_phone: Set(delivery.phone),
            delivery_address: Set(delivery.address),
            delivery_postal: Set(delivery.postal),
            delivery_comments: Set(delivery.comments),
        };

        order_model.insert(&txn).await?;

        for (line, _item) in &kept {
            let item_model = OrderItemActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                menu_item_id: Set(line.menu_item_id),
                quantity: Set(line.quantity),
                customization: Set(line.customization.clone()),
                takeaway: Set(line.takeaway),
            };
            item_model.insert(&txn).await?;
        }

        txn.commit().await?;

        Ok(PlacedOrder {
            order_id,
            order_number,
            total_price: total,
        })
    }

    /// Prices a cart the same way `place_order` will: missing or
    /// unavailable items contribute nothing.
    pub async fn price_items(
        &self,
        items: &[OrderLineRequest],
    ) -> Result<Decimal, ServiceError> {
        if items.iter().any(|line| line.quantity <= 0) {
            return Err(ServiceError::ValidationError(
                "Item quantity must be a positive integer".to_string(),
            ));
        }

        let mut total = Decimal::ZERO;
        for line in items {
            if let Some(item) = MenuItemEntity::find_by_id(line.menu_item_id)
                .one(&*self.db)
                .await?
            {
                if item.available {
                    total += item.price * Decimal::from(line.quantity);
                }
            }
        }
        Ok(total)
    }

    async fn find_order(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    async fn transition(
        &self,
        order_id: Uuid,
        to: OrderStatus,
        mut apply: impl FnMut(&mut OrderActiveModel),
    ) -> Result<OrderModel, ServiceError> {
        let order = self.find_order(order_id).await?;
        let from = parse_status(&order.status)?;

        if !from.can_transition(to) {
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot move order from '{}' to '{}'",
                from, to
            )));
        }

        let mut active: OrderActiveModel = order.into();
        active.status = Set(to.to_string());
        apply(&mut active);
        let updated = active.update(&*self.db).await?;

        info!(%order_id, from = %from, to = %to, "order status changed");
        self.emit(Event::OrderStatusChanged {
            order_id,
            old_status: from.to_string(),
            new_status: to.to_string(),
        })
        .await;

        Ok(updated)
    }

    /// `Pending -> Accepted`. Staff supplies the expected realization
    /// time in minutes; the completion estimate is stamped from it.
    #[instrument(skip(self), fields(order_id = %order_id, realization_minutes))]
    pub async fn accept_order(
        &self,
        order_id: Uuid,
        realization_minutes: i64,
    ) -> Result<OrderModel, ServiceError> {
        if realization_minutes <= 0 {
            return Err(ServiceError::ValidationError(
                "Realization time must be a positive number of minutes".to_string(),
            ));
        }

        let eta = Utc::now() + Duration::minutes(realization_minutes);
        self.transition(order_id, OrderStatus::Accepted, move |active| {
            active.estimated_completion_time = Set(Some(eta));
        })
        .await
    }

    /// `Accepted -> In Preparation` (kitchen takes the order).
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn start_preparation(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        self.transition(order_id, OrderStatus::InPreparation, |_| {}).await
    }

    /// `In Preparation -> Ready` (kitchen finished plating).
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn mark_ready(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        self.transition(order_id, OrderStatus::Ready, |_| {}).await
    }

    /// Terminal transition; allowed from every non-completed state.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn complete_order(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        self.transition(order_id, OrderStatus::Completed, |_| {}).await
    }

    /// Flags the order for waiter attention. Repeat calls inside the
    /// cooldown window are rejected.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn call_waiter(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let order = self.find_order(order_id).await?;
        let now = Utc::now();

        if let Some(last_call) = order.last_call_time {
            if now - last_call < self.waiter_call_cooldown {
                return Err(ServiceError::RateLimited(
                    "Please wait before calling the waiter again".to_string(),
                ));
            }
        }

        let mut active: OrderActiveModel = order.into();
        active.call_waiter = Set(true);
        active.last_call_time = Set(Some(now));
        active.update(&*self.db).await?;

        self.emit(Event::WaiterCalled(order_id)).await;
        Ok(())
    }

    /// Records a bill request with payment method, optional tax id and
    /// tip. Also stamps the call clock, so a bill request arms the
    /// waiter-call cooldown window.
    #[instrument(skip(self, request), fields(order_id = %order_id, payment_method = %request.payment_method))]
    pub async fn request_bill(
        &self,
        order_id: Uuid,
        request: BillRequest,
    ) -> Result<(), ServiceError> {
        if request.payment_method.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Payment method is required".to_string(),
            ));
        }

        let order = self.find_order(order_id).await?;

        let mut active: OrderActiveModel = order.into();
        active.request_bill = Set(true);
        active.bill_payment_method = Set(Some(request.payment_method.clone()));
        active.tip = Set(Some(request.tip.unwrap_or(Decimal::ZERO)));
        active.tax_id = Set(request.tax_id);
        active.last_call_time = Set(Some(Utc::now()));
        active.update(&*self.db).await?;

        self.emit(Event::BillRequested {
            order_id,
            payment_method: request.payment_method,
        })
        .await;
        Ok(())
    }

    /// Clears the waiter-call flag; the bill request is untouched.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn dismiss_call(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let order = self.find_order(order_id).await?;
        let mut active: OrderActiveModel = order.into();
        active.call_waiter = Set(false);
        active.update(&*self.db).await?;

        self.emit(Event::CallDismissed(order_id)).await;
        Ok(())
    }

    /// Clears the bill request and its stored payment method.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn dismiss_bill(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let order = self.find_order(order_id).await?;
        let mut active: OrderActiveModel = order.into();
        active.request_bill = Set(false);
        active.bill_payment_method = Set(None);
        active.update(&*self.db).await?;

        self.emit(Event::BillDismissed(order_id)).await;
        Ok(())
    }

    async fn load_lines(&self, order_id: Uuid) -> Result<Vec<OrderLine>, ServiceError> {
        let rows = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .find_also_related(MenuItemEntity)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(line, item)| {
                let (name, price) = item
                    .map(|i| (i.name, i.price))
                    .unwrap_or_else(|| ("(removed item)".to_string(), Decimal::ZERO));
                OrderLine {
                    name,
                    quantity: line.quantity,
                    price,
                    customization: line.customization,
                    takeaway: line.takeaway,
                }
            })
            .collect())
    }

    async fn summarize(&self, order: OrderModel) -> Result<OrderSummary, ServiceError> {
        let items = self.load_lines(order.id).await?;
        Ok(OrderSummary {
            order_id: order.id,
            order_number: order.order_number,
            table_id: order.table_id,
            status: parse_status(&order.status)?,
            total_price: order.total_price,
            order_time: order
                .created_at
                .with_timezone(&self.tz)
                .format("%H:%M")
                .to_string(),
            items,
        })
    }

    async fn summarize_all(
        &self,
        orders: Vec<OrderModel>,
    ) -> Result<Vec<OrderSummary>, ServiceError> {
        let mut summaries = Vec::with_capacity(orders.len());
        for order in orders {
            summaries.push(self.summarize(order).await?);
        }
        Ok(summaries)
    }

    /// Orders awaiting any staff action (waiter dashboard poll).
    #[instrument(skip(self))]
    pub async fn active_orders(&self) -> Result<Vec<OrderSummary>, ServiceError> {
        let statuses: Vec<String> = OrderStatus::ACTIVE.iter().map(|s| s.to_string()).collect();
        let orders = OrderEntity::find()
            .filter(order::Column::Status.is_in(statuses))
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        self.summarize_all(orders).await
    }

    /// Orders the kitchen is expected to work on (kitchen dashboard poll).
    #[instrument(skip(self))]
    pub async fn accepted_orders(&self) -> Result<Vec<OrderSummary>, ServiceError> {
        let statuses: Vec<String> = OrderStatus::IN_KITCHEN
            .iter()
            .map(|s| s.to_string())
            .collect();
        let orders = OrderEntity::find()
            .filter(order::Column::Status.is_in(statuses))
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        self.summarize_all(orders).await
    }

    /// Orders with an unanswered waiter call or bill request. An order
    /// with both signals produces two entries.
    #[instrument(skip(self))]
    pub async fn waiter_calls(&self) -> Result<Vec<WaiterCall>, ServiceError> {
        let orders = OrderEntity::find()
            .filter(
                order::Column::CallWaiter
                    .eq(true)
                    .or(order::Column::RequestBill.eq(true)),
            )
            .order_by_asc(order::Column::LastCallTime)
            .all(&*self.db)
            .await?;

        let mut calls = Vec::new();
        for order in orders {
            let call_time = order
                .last_call_time
                .map(|t| t.with_timezone(&self.tz).format("%H:%M:%S").to_string());

            if order.call_waiter {
                calls.push(WaiterCall {
                    order_id: order.id,
                    order_number: order.order_number,
                    table_id: order.table_id,
                    call_type: CallType::WaiterCall,
                    call_time: call_time.clone(),
                    payment_method: None,
                    tip: None,
                    tax_id: None,
                });
            }
            if order.request_bill {
                calls.push(WaiterCall {
                    order_id: order.id,
                    order_number: order.order_number,
                    table_id: order.table_id,
                    call_type: CallType::BillRequest,
                    call_time,
                    payment_method: order.bill_payment_method.clone(),
                    tip: order.tip,
                    tax_id: order.tax_id.clone(),
                });
            }
        }

        Ok(calls)
    }

    /// Full order view for the customer status page.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetail, ServiceError> {
        let order = self.find_order(order_id).await?;
        let items = self.load_lines(order.id).await?;

        Ok(OrderDetail {
            order_id: order.id,
            order_number: order.order_number,
            table_id: order.table_id,
            status: parse_status(&order.status)?,
            total_price: order.total_price,
            created_at: order.created_at,
            estimated_completion_time: order.estimated_completion_time,
            items,
        })
    }

    /// Lightweight poll target for the customer status page.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order_status(&self, order_id: Uuid) -> Result<OrderStatusView, ServiceError> {
        let order = self.find_order(order_id).await?;
        Ok(OrderStatusView {
            status: parse_status(&order.status)?,
            estimated_completion_time: order.estimated_completion_time,
        })
    }

    /// Completed orders, newest first.
    #[instrument(skip(self))]
    pub async fn order_history(&self, page: u64) -> Result<OrderHistoryPage, ServiceError> {
        let page = page.max(1);
        let paginator = OrderEntity::find()
            .filter(order::Column::Status.eq(OrderStatus::Completed.to_string()))
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, HISTORY_PAGE_SIZE);

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page - 1).await?;
        let orders = self.summarize_all(orders).await?;

        Ok(OrderHistoryPage {
            orders,
            total,
            page,
            per_page: HISTORY_PAGE_SIZE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_display() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Accepted,
            OrderStatus::InPreparation,
            OrderStatus::Ready,
            OrderStatus::Completed,
        ] {
            let raw = status.to_string();
            assert_eq!(OrderStatus::from_str(&raw).unwrap(), status);
        }
        assert_eq!(OrderStatus::InPreparation.to_string(), "In Preparation");
    }

    #[rstest::rstest]
    #[case(OrderStatus::Pending, OrderStatus::Accepted, true)]
    #[case(OrderStatus::Accepted, OrderStatus::InPreparation, true)]
    #[case(OrderStatus::InPreparation, OrderStatus::Ready, true)]
    // Skipping ahead is rejected
    #[case(OrderStatus::Pending, OrderStatus::InPreparation, false)]
    #[case(OrderStatus::Pending, OrderStatus::Ready, false)]
    #[case(OrderStatus::Accepted, OrderStatus::Ready, false)]
    // Going backwards is rejected
    #[case(OrderStatus::Ready, OrderStatus::InPreparation, false)]
    #[case(OrderStatus::Accepted, OrderStatus::Pending, false)]
    fn transitions_follow_the_fixed_sequence(
        #[case] from: OrderStatus,
        #[case] to: OrderStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition(to), allowed);
    }

    #[test]
    fn completed_is_terminal_and_reachable_from_anywhere_else() {
        use OrderStatus::*;

        for from in [Pending, Accepted, InPreparation, Ready] {
            assert!(from.can_transition(Completed));
        }
        for to in [Pending, Accepted, InPreparation, Ready, Completed] {
            assert!(!Completed.can_transition(to));
        }
    }
}
