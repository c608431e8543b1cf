use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;

use crate::{domain::Balance, ports::balance::BalanceStorePort};

use super::{validate_user_id, Error, Ledger};

/// Look up the current balance for a user
#[derive(Clone, Copy, Debug)]
pub struct BalanceOfRequest {
    pub user_id: i64,
}

impl<B, H> Service<BalanceOfRequest> for Ledger<B, H>
where
    B: BalanceStorePort + 'static,
    H: 'static,
{
    type Response = Balance;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: BalanceOfRequest) -> Self::Future {
        let balances = self.balances.clone();
        Box::pin(async move {
            let user_id = validate_user_id(req.user_id)?;

            // A user that never charged resolves to a zero balance
            let balance = balances.get(user_id).await?;

            Ok(balance)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::memory::{MemoryBalanceStore, MemoryHistoryStore},
        commands::{charge::ChargeRequest, LedgerConfig},
        ports::{balance::MockBalanceStorePort, history::MockHistoryStorePort},
    };
    use rstest::*;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    #[rstest]
    #[case(0)]
    #[case(-42)]
    #[tokio::test]
    async fn test_invalid_user_id(#[case] user_id: i64) -> Result<(), BoxError> {
        let mut ledger = Ledger::new(
            Arc::new(MockBalanceStorePort::new()),
            Arc::new(MockHistoryStorePort::new()),
            LedgerConfig::default(),
        );

        let res = ServiceExt::<BalanceOfRequest>::ready(&mut ledger).await?.call(BalanceOfRequest { user_id }).await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidUser { .. }));

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_unknown_user_is_zero() -> Result<(), BoxError> {
        let mut ledger = Ledger::new(
            Arc::new(MemoryBalanceStore::default()),
            Arc::new(MemoryHistoryStore::default()),
            LedgerConfig::default(),
        );

        let res = ServiceExt::<BalanceOfRequest>::ready(&mut ledger)
            .await?
            .call(BalanceOfRequest { user_id: 9 })
            .await;

        assert_that!(res)
            .is_ok()
            .matches(|balance| balance.user_id == 9 && balance.points == 0);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_returns_stored_balance() -> Result<(), BoxError> {
        let mut ledger = Ledger::new(
            Arc::new(MemoryBalanceStore::default()),
            Arc::new(MemoryHistoryStore::default()),
            LedgerConfig::default(),
        );

        ServiceExt::<ChargeRequest>::ready(&mut ledger)
            .await?
            .call(ChargeRequest {
                user_id: 1,
                amount: 2000,
            })
            .await?;
        let res = ServiceExt::<BalanceOfRequest>::ready(&mut ledger)
            .await?
            .call(BalanceOfRequest { user_id: 1 })
            .await;

        assert_that!(res).is_ok().matches(|balance| balance.points == 2000);

        Ok(())
    }
}
