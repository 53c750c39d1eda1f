use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::brokers_model::Broker;
use super::brokers_traits::{BrokerRefreshServiceTrait, BrokerViewStoreTrait};
use crate::errors::Result;
use crate::portfolios::PortfolioClientTrait;

/// Rebuilds brokers from the Portfolio service.
///
/// The Account service isn't consulted, so refreshed brokers carry the
/// unknown sentinels in their account fields.
pub struct BrokerRefreshService {
    store: Arc<dyn BrokerViewStoreTrait>,
    portfolio_client: Arc<dyn PortfolioClientTrait>,
}

impl BrokerRefreshService {
    pub fn new(
        store: Arc<dyn BrokerViewStoreTrait>,
        portfolio_client: Arc<dyn PortfolioClientTrait>,
    ) -> Self {
        Self {
            store,
            portfolio_client,
        }
    }
}

#[async_trait]
impl BrokerRefreshServiceTrait for BrokerRefreshService {
    async fn refresh(&self, owner: &str) -> Result<Broker> {
        debug!("Refreshing broker {} from portfolio service", owner);
        let portfolio = self.portfolio_client.get_portfolio(owner).await?;
        let broker = Broker::from_parts(portfolio, None);
        self.store.put(owner, broker).await
    }

    async fn refresh_all(&self) -> Result<usize> {
        let portfolios = self.portfolio_client.get_portfolios().await?;
        let mut count = 0;
        for portfolio in portfolios {
            let owner = portfolio.owner.clone();
            self.store
                .put(&owner, Broker::from_parts(portfolio, None))
                .await?;
            count += 1;
        }
        info!("Refreshed {} brokers from portfolio service", count);
        Ok(count)
    }
}
