use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use chrono::Utc;
use tower::Service;

use crate::{
    domain::{Balance, TransactionKind},
    ports::{balance::BalanceStorePort, history::HistoryStorePort},
};

use super::{validate_amount, validate_user_id, Error, Ledger};

/// Spend points from a user's balance
///
/// The amount floor applies here just like for charges, so a use below the
/// minimum is rejected even when the balance would cover it.
#[derive(Clone, Copy, Debug)]
pub struct UsePointsRequest {
    pub user_id: i64,
    pub amount: i64,
}

impl<B, H> Service<UsePointsRequest> for Ledger<B, H>
where
    B: BalanceStorePort + 'static,
    H: HistoryStorePort + 'static,
{
    type Response = Balance;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: UsePointsRequest) -> Self::Future {
        let balances = self.balances.clone();
        let history = self.history.clone();
        let config = self.config;
        let user_locks = self.user_locks.clone();
        Box::pin(async move {
            let user_id = validate_user_id(req.user_id)?;
            let amount = validate_amount(req.amount, config.minimum_amount)?;

            let _guard = user_locks.acquire_if(config.serialization, user_id).await;

            let current = balances.get(user_id).await?;
            // The insufficient-funds check happens strictly before any write
            if current.points < amount {
                return Err(Error::InsufficientBalance {
                    current: current.points,
                    requested: amount,
                });
            }

            let balance = balances.upsert(user_id, current.points - amount).await?;
            history
                .append(user_id, amount, TransactionKind::Use, Utc::now())
                .await?;

            tracing::debug!(user_id, amount, points = balance.points, "points used");

            Ok(balance)
        })
    }
}
