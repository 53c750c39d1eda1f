//! Client contract for the companion Portfolio service.

use async_trait::async_trait;

use super::portfolios_model::Portfolio;
use crate::errors::Result;

/// Read side of the Portfolio service API.
///
/// Implementations report a missing portfolio as `Error::NotFound` and any
/// other remote failure as `Error::Upstream`.
#[async_trait]
pub trait PortfolioClientTrait: Send + Sync {
    async fn get_portfolios(&self) -> Result<Vec<Portfolio>>;

    async fn get_portfolio(&self, owner: &str) -> Result<Portfolio>;
}
