//! Portfolios module - upstream shapes from the companion services.

mod portfolios_model;
mod portfolios_traits;

pub use portfolios_model::{Account, Portfolio};
pub use portfolios_traits::PortfolioClientTrait;
