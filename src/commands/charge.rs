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

/// Add points to a user's balance
///
/// Fields are signed so out-of-range input from the transport layer reaches
/// the validation step instead of failing at conversion.
#[derive(Clone, Copy, Debug)]
pub struct ChargeRequest {
    pub user_id: i64,
    pub amount: i64,
}

impl<B, H> Service<ChargeRequest> for Ledger<B, H>
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

    fn call(&mut self, req: ChargeRequest) -> Self::Future {
        let balances = self.balances.clone();
        let history = self.history.clone();
        let config = self.config;
        let user_locks = self.user_locks.clone();
        Box::pin(async move {
            // Nothing is written until every validation has passed
            let user_id = validate_user_id(req.user_id)?;
            let amount = validate_amount(req.amount, config.minimum_amount)?;

            let _guard = user_locks.acquire_if(config.serialization, user_id).await;

            // An unknown user reads as a zero balance. The addition saturates
            // so the total stays defined at the top of the u64 range.
            let current = balances.get(user_id).await?;
            let balance = balances
                .upsert(user_id, current.points.saturating_add(amount))
                .await?;

            // The history entry carries the charged amount, not the new total
            history
                .append(user_id, amount, TransactionKind::Charge, Utc::now())
                .await?;

            tracing::debug!(user_id, amount, points = balance.points, "points charged");

            Ok(balance)
        })
    }
}
