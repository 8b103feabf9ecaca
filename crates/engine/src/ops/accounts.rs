use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    Account, AccountPatch, AccountReader, AccountStore, CorrectionCmd, EngineError, LedgerEntry,
    OpenAccountCmd, ResultEngine, TransferCmd, TransferResult, accounts, guard, journal,
    transactions,
    util::{normalize_required_name, now_seconds, page_bounds},
};

use super::{Engine, Page, with_tx};

impl Engine {
    /// Open an account for `cmd.user_id`.
    ///
    /// A non-zero opening balance is recorded as an income or expense entry
    /// and applied as a delta, like any other balance change.
    pub async fn open_account(&self, cmd: OpenAccountCmd) -> ResultEngine<Account> {
        let OpenAccountCmd {
            user_id,
            name,
            category_id,
            kind,
            balance,
        } = cmd;
        let name = normalize_required_name(&name, "account")?;
        let now = now_seconds();

        with_tx!(self, |unit| {
            let model = accounts::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name),
                category_id: ActiveValue::Set(category_id),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                balance_minor: ActiveValue::Set(0),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(unit.connection())
            .await?;

            if balance.is_zero() {
                Account::try_from(model)
            } else {
                journal::record_correction(&unit, user_id, model.id, balance, now).await?;
                unit.apply_delta(model.id, user_id, balance).await
            }
        })
    }

    /// Return an account owned by `user_id`.
    pub async fn account(&self, user_id: Uuid, account_id: i32) -> ResultEngine<Account> {
        guard::can_act_on_account(self.ledger.storage(), user_id, account_id).await
    }

    /// List the accounts of `user_id`, oldest first.
    pub async fn list_accounts(
        &self,
        user_id: Uuid,
        page: u64,
        size: u64,
    ) -> ResultEngine<Page<Account>> {
        let (offset, limit) = page_bounds(page, size)?;
        with_tx!(self, |unit| {
            let query = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()));
            let total = query.clone().count(unit.connection()).await?;
            let items = query
                .order_by_asc(accounts::Column::Id)
                .offset(offset)
                .limit(limit)
                .all(unit.connection())
                .await?
                .into_iter()
                .map(Account::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(Page::new(items, page, size, total))
        })
    }

    /// Change the name, category or kind of an account. The balance is not
    /// patchable.
    pub async fn update_account(
        &self,
        user_id: Uuid,
        account_id: i32,
        mut patch: AccountPatch,
    ) -> ResultEngine<Account> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput(
                "nothing to update".to_string(),
            ));
        }
        if let Some(name) = patch.name.as_deref() {
            patch.name = Some(normalize_required_name(name, "account")?);
        }

        with_tx!(self, |unit| {
            guard::can_act_on_account(&unit, user_id, account_id).await?;
            accounts::Entity::update_many()
                .set(accounts::ActiveModel::from_patch(
                    account_id,
                    &patch,
                    now_seconds(),
                ))
                .filter(accounts::Column::Id.eq(account_id))
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .exec(unit.connection())
                .await?;
            unit.account(account_id)
                .await?
                .ok_or_else(|| EngineError::NotFound("account".to_string()))
        })
    }

    /// Ledger entries of one account, newest first.
    pub async fn account_entries(
        &self,
        user_id: Uuid,
        account_id: i32,
        limit: u64,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        if limit == 0 {
            return Err(EngineError::InvalidInput(
                "limit must be > 0".to_string(),
            ));
        }
        with_tx!(self, |unit| {
            guard::can_act_on_account(&unit, user_id, account_id).await?;
            transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id))
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit)
                .all(unit.connection())
                .await?
                .into_iter()
                .map(LedgerEntry::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<TransferResult> {
        self.ledger.transfer(cmd).await
    }

    pub async fn correct(&self, cmd: CorrectionCmd) -> ResultEngine<Account> {
        self.ledger.correct(cmd).await
    }
}
