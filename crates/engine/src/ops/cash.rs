use sea_orm::{QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CashCategory, CashTransaction, CashTransactionCmd, EngineError, LedgerCategory, ResultEngine,
    cash_transactions,
};

use super::{Engine, ledger::PostEntry, numbers, with_tx};

impl Engine {
    /// Records an organization cash movement.
    ///
    /// Member withdrawals additionally post a `withdrawal` ledger entry in
    /// the same DB transaction, so the balance-sufficiency check and the
    /// balance update cannot race a competing withdrawal.
    pub async fn record_cash_transaction(
        &self,
        cmd: CashTransactionCmd,
    ) -> ResultEngine<CashTransaction> {
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "cash amount must be > 0".to_string(),
            ));
        }
        if cmd.direction != cmd.category.direction() {
            return Err(EngineError::InvalidCategoryDirection(format!(
                "category {} must move {}",
                cmd.category.as_str(),
                cmd.category.direction().as_str()
            )));
        }
        match (cmd.category.requires_member(), cmd.member_id) {
            (true, None) => {
                return Err(EngineError::InvalidAmount(
                    "member_withdrawal requires a member".to_string(),
                ));
            }
            (false, Some(_)) => {
                return Err(EngineError::InvalidAmount(format!(
                    "category {} must not reference a member",
                    cmd.category.as_str()
                )));
            }
            _ => {}
        }

        with_tx!(self, |db_tx| {
            let number = self
                .next_number(
                    &db_tx,
                    "cash_transactions",
                    numbers::CASH_TAG,
                    cmd.occurred_at,
                )
                .await?;

            let tx = CashTransaction {
                id: Uuid::new_v4(),
                number,
                direction: cmd.direction,
                category: cmd.category,
                amount_minor: cmd.amount_minor,
                member_id: cmd.member_id,
                admin_id: cmd.admin_id.clone(),
                occurred_at: cmd.occurred_at,
            };
            cash_transactions::ActiveModel::from(&tx)
                .insert(&db_tx)
                .await
                .map_err(|err| numbers::map_number_conflict(err, &tx.number))?;

            if cmd.category == CashCategory::MemberWithdrawal {
                let member_id = cmd.member_id.ok_or_else(|| {
                    EngineError::InvalidAmount("member_withdrawal requires a member".to_string())
                })?;
                self.post_entry(
                    &db_tx,
                    PostEntry {
                        member_id,
                        category: LedgerCategory::Withdrawal,
                        amount_delta_minor: -cmd.amount_minor,
                        point_delta: 0,
                        deposit_id: None,
                        cash_transaction_id: Some(tx.id),
                        admin_id: cmd.admin_id,
                        occurred_at: cmd.occurred_at,
                    },
                )
                .await?;
            }

            Ok(tx)
        })
    }

    /// Lists recent cash transactions, newest first.
    pub async fn list_cash_transactions(&self, limit: u64) -> ResultEngine<Vec<CashTransaction>> {
        let models: Vec<cash_transactions::Model> = cash_transactions::Entity::find()
            .order_by_desc(cash_transactions::Column::OccurredAt)
            .order_by_desc(cash_transactions::Column::Number)
            .limit(limit)
            .all(&self.database)
            .await?;

        models.into_iter().map(CashTransaction::try_from).collect()
    }
}
