use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, Member, ResultEngine, members};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Registers a new member and issues the next member number.
    ///
    /// Numbers are `A-{seq:04}` from a global sequence and immutable once
    /// issued. A collision on the unique column aborts the registration.
    pub async fn register_member(
        &self,
        name: &str,
        phone: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Member> {
        let name = normalize_required_name(name, "member")?;
        let phone = normalize_optional_text(phone);

        with_tx!(self, |db_tx| {
            let number = self.next_member_number(&db_tx).await?;
            let member = Member::new(number, name, phone, created_at)?;
            members::ActiveModel::from(&member)
                .insert(&db_tx)
                .await
                .map_err(|err| super::numbers::map_number_conflict(err, &member.number))?;
            Ok(member)
        })
    }

    /// Suspends or reactivates a member. Members are never deleted; their
    /// ledger history must stay reconstructable.
    pub async fn set_member_active(&self, member_id: Uuid, active: bool) -> ResultEngine<Member> {
        with_tx!(self, |db_tx| {
            let model = members::Entity::find_by_id(member_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

            let update = members::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                active: ActiveValue::Set(active),
                ..Default::default()
            };
            let updated = update.update(&db_tx).await?;
            Member::try_from(updated)
        })
    }

    /// Return a member by id.
    pub async fn member(&self, member_id: Uuid) -> ResultEngine<Member> {
        let model = members::Entity::find_by_id(member_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;
        Member::try_from(model)
    }

    /// Return a member by its member number.
    pub async fn member_by_number(&self, number: &str) -> ResultEngine<Member> {
        let model = members::Entity::find()
            .filter(members::Column::Number.eq(number))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;
        Member::try_from(model)
    }

    /// Lists members, newest registrations first.
    pub async fn list_members(&self, active_only: bool, limit: u64) -> ResultEngine<Vec<Member>> {
        let mut query = members::Entity::find()
            .order_by_desc(members::Column::CreatedAt)
            .limit(limit);
        if active_only {
            query = query.filter(members::Column::Active.eq(true));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Member::try_from).collect()
    }

    async fn next_member_number(&self, db_tx: &DatabaseTransaction) -> ResultEngine<String> {
        let backend = db_tx.get_database_backend();
        // Compare the numeric suffix, not the raw text; lexicographic MAX
        // would stall at A-9999.
        let stmt = Statement::from_string(
            backend,
            "SELECT COALESCE(MAX(CAST(SUBSTR(number, 3) AS INTEGER)), 0) AS max_seq FROM members"
                .to_string(),
        );
        let row = db_tx.query_one(stmt).await?;
        let max_seq: i64 = row.and_then(|r| r.try_get("", "max_seq").ok()).unwrap_or(0);

        let seq = max_seq + 1;
        Ok(format!("A-{seq:04}"))
    }
}
