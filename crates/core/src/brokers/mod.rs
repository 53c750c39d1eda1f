//! Brokers module - the Broker read-model and the store that serves it.

mod brokers_model;
mod brokers_refresh_service;
mod brokers_render;
mod brokers_service;
mod brokers_traits;

#[cfg(test)]
mod brokers_service_tests;

// Re-export the public interface
pub(crate) use brokers_model::deserialize_stocks;
pub use brokers_model::{Broker, Stock};
pub use brokers_refresh_service::BrokerRefreshService;
pub use brokers_render::format_currency;
pub use brokers_service::BrokerViewStore;
pub use brokers_traits::{BrokerRefreshServiceTrait, BrokerViewStoreTrait};
