//! User data gateway. Listing replays `NewUser` events rather than walking
//! an index; single users come straight from the `users` mapping.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::info;

use crate::contract::ReportRegistry::{createUserCall, usersCall, NewUser};
use crate::errors::Result;
use crate::models::{DataResponse, User, UserListing};
use crate::provider::ProviderAdapter;

#[derive(Clone)]
pub struct UserGateway {
    provider: Arc<ProviderAdapter>,
}

impl UserGateway {
    pub fn new(provider: Arc<ProviderAdapter>) -> Self {
        Self { provider }
    }

    /// All registrations since genesis, in the order they were emitted.
    pub async fn list_users(&self) -> Result<DataResponse<Vec<UserListing>>> {
        let events = self.provider.contract().events::<NewUser>().await?;
        Ok(DataResponse::new(
            events.into_iter().map(UserListing::from).collect(),
        ))
    }

    /// The mapping entry for `address`, as stored. Unknown addresses come
    /// back as the contract's zero-valued record.
    pub async fn get_user(&self, address: Address) -> Result<DataResponse<User>> {
        let raw = self
            .provider
            .contract()
            .read(usersCall { account: address })
            .await?;
        Ok(DataResponse::new(User::from_call(raw)?))
    }

    pub async fn create_user(&self, name: String) -> Result<DataResponse<()>> {
        let from = self.provider.current_account().await?;
        self.provider
            .contract()
            .write(from, createUserCall { name }, None)
            .await?;
        info!(%from, "User created");
        Ok(DataResponse::new(()))
    }
}
