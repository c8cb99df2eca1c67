use crate::config::AppConfig;
use crate::store::BookingStore;

pub struct AppState {
    pub store: BookingStore,
    pub config: AppConfig,
}
