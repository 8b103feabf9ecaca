//! sea-orm adapter for the storage ports.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, AccountReader, AccountStore, EngineError, FinancialGroup, GroupDirectory, LedgerLog,
    MoneyCents, NewEntry, ResultEngine, Storage, UnitOfWork, accounts, group_members, groups,
    transactions, util::now_seconds,
};

/// Storage backed by a sea-orm connection pool.
#[derive(Clone, Debug)]
pub struct SeaStore {
    database: DatabaseConnection,
}

impl SeaStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// One database transaction.
///
/// Dropping it without [`UnitOfWork::commit`] rolls the transaction back.
pub struct SeaUnit {
    tx: DatabaseTransaction,
}

impl SeaUnit {
    pub(crate) fn connection(&self) -> &DatabaseTransaction {
        &self.tx
    }
}

async fn find_account<C: ConnectionTrait>(
    db: &C,
    account_id: i32,
) -> ResultEngine<Option<Account>> {
    accounts::Entity::find_by_id(account_id)
        .one(db)
        .await?
        .map(Account::try_from)
        .transpose()
}

async fn find_group<C: ConnectionTrait>(
    db: &C,
    group_id: i32,
) -> ResultEngine<Option<FinancialGroup>> {
    groups::Entity::find_by_id(group_id)
        .one(db)
        .await?
        .map(FinancialGroup::try_from)
        .transpose()
}

async fn membership_exists<C: ConnectionTrait>(
    db: &C,
    group_id: i32,
    user_id: Uuid,
) -> ResultEngine<bool> {
    group_members::Entity::find_by_id((group_id, user_id.to_string()))
        .one(db)
        .await
        .map(|row| row.is_some())
        .map_err(Into::into)
}

#[async_trait]
impl AccountReader for SeaStore {
    async fn account(&self, account_id: i32) -> ResultEngine<Option<Account>> {
        find_account(&self.database, account_id).await
    }
}

#[async_trait]
impl GroupDirectory for SeaStore {
    async fn group(&self, group_id: i32) -> ResultEngine<Option<FinancialGroup>> {
        find_group(&self.database, group_id).await
    }

    async fn is_member(&self, group_id: i32, user_id: Uuid) -> ResultEngine<bool> {
        membership_exists(&self.database, group_id, user_id).await
    }
}

#[async_trait]
impl Storage for SeaStore {
    type Unit = SeaUnit;

    async fn begin(&self) -> ResultEngine<SeaUnit> {
        Ok(SeaUnit {
            tx: self.database.begin().await?,
        })
    }
}

#[async_trait]
impl AccountReader for SeaUnit {
    async fn account(&self, account_id: i32) -> ResultEngine<Option<Account>> {
        find_account(&self.tx, account_id).await
    }
}

#[async_trait]
impl GroupDirectory for SeaUnit {
    async fn group(&self, group_id: i32) -> ResultEngine<Option<FinancialGroup>> {
        find_group(&self.tx, group_id).await
    }

    async fn is_member(&self, group_id: i32, user_id: Uuid) -> ResultEngine<bool> {
        membership_exists(&self.tx, group_id, user_id).await
    }
}

#[async_trait]
impl AccountStore for SeaUnit {
    async fn apply_delta(
        &self,
        account_id: i32,
        owner_id: Uuid,
        delta: MoneyCents,
    ) -> ResultEngine<Account> {
        // Single UPDATE so concurrent units serialize on the row lock instead
        // of losing each other's writes. The range filter keeps the sum
        // inside i64: sqlite would silently widen it to REAL.
        let mut update = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(delta.cents()),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now_seconds()))
            .filter(accounts::Column::Id.eq(account_id))
            .filter(accounts::Column::UserId.eq(owner_id.to_string()));
        if delta.is_positive() {
            update = update.filter(accounts::Column::BalanceMinor.lte(i64::MAX - delta.cents()));
        } else if delta.is_negative() {
            update = update.filter(accounts::Column::BalanceMinor.gte(i64::MIN - delta.cents()));
        }

        let res = update.exec(&self.tx).await?;
        let account = find_account(&self.tx, account_id)
            .await?
            .filter(|account| account.is_owned_by(owner_id))
            .ok_or_else(|| EngineError::NotFound("account".to_string()))?;
        if res.rows_affected == 0 {
            return Err(EngineError::InvalidInput(
                "balance out of range".to_string(),
            ));
        }
        Ok(account)
    }
}

#[async_trait]
impl LedgerLog for SeaUnit {
    async fn append(&self, entry: NewEntry) -> ResultEngine<i32> {
        let model = transactions::ActiveModel::from(&entry)
            .insert(&self.tx)
            .await?;
        Ok(model.id)
    }

    async fn link(&self, entry_id: i32, linked_id: i32) -> ResultEngine<()> {
        let res = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::LinkedTransactionId,
                Expr::value(linked_id),
            )
            .filter(transactions::Column::Id.eq(entry_id))
            .filter(transactions::Column::LinkedTransactionId.is_null())
            .exec(&self.tx)
            .await?;
        if res.rows_affected != 1 {
            return Err(EngineError::Internal(DbErr::RecordNotUpdated));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for SeaUnit {
    async fn commit(self) -> ResultEngine<()> {
        self.tx.commit().await.map_err(Into::into)
    }
}
