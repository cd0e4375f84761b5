pub mod auth;
pub mod catalog;
pub mod common;
pub mod geo;
pub mod orders;
pub mod payments;
pub mod popups;
pub mod promotions;
pub mod tables;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::media::MediaStore;
use crate::services::checkout::{CheckoutService, PaymentProvider};
use crate::services::geo::{Coordinates, GeoService};
use crate::services::{
    catalog::CatalogService, orders::OrderService, popups::PopupService,
    promotions::PromotionService, tables::TableService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub orders: Arc<OrderService>,
    pub catalog: Arc<CatalogService>,
    pub tables: Arc<TableService>,
    pub promotions: Arc<PromotionService>,
    pub popups: Arc<PopupService>,
    pub geo: Arc<GeoService>,
    pub checkout: Arc<CheckoutService>,
    pub media: Arc<MediaStore>,
}

impl AppServices {
    /// Wires every service against the shared pool and event channel.
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        payment_provider: Arc<dyn PaymentProvider>,
        cfg: &AppConfig,
    ) -> Self {
        let auth = Arc::new(AuthService::new(
            db.clone(),
            cfg.jwt_secret.clone(),
            cfg.jwt_expiration,
        ));

        let orders = Arc::new(OrderService::new(
            db.clone(),
            Some(event_sender.clone()),
            cfg.tz(),
            cfg.waiter_call_cooldown_minutes,
        ));

        let catalog = Arc::new(CatalogService::new(db.clone(), Some(event_sender.clone())));
        let tables = Arc::new(TableService::new(db.clone()));
        let promotions = Arc::new(PromotionService::new(db.clone()));
        let popups = Arc::new(PopupService::new(db.clone()));

        let geo = Arc::new(GeoService::new(
            Coordinates {
                latitude: cfg.restaurant_latitude,
                longitude: cfg.restaurant_longitude,
            },
            cfg.service_radius_km,
        ));

        let checkout = Arc::new(CheckoutService::new(
            payment_provider,
            orders.clone(),
            Some(event_sender),
        ));

        let media = Arc::new(MediaStore::new(cfg.upload_dir.clone()));

        Self {
            auth,
            orders,
            catalog,
            tables,
            promotions,
            popups,
            geo,
            checkout,
            media,
        }
    }
}
