//! Protocol persistence and the visibility rules around it

use super::types::{
    CommandOutcome, ListScope, Protocol, ProtocolCommand, ProtocolSummary, SaveOutcome,
    SaveProtocol,
};
use crate::{ApplicationError, ApplicationResult};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    is_public: bool,
}

#[derive(sqlx::FromRow)]
struct ProtocolRow {
    id: i64,
    user_id: i64,
    name: String,
    data: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_public: bool,
}

impl From<SummaryRow> for ProtocolSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            visibility: row.is_public.into(),
        }
    }
}

impl From<ProtocolRow> for Protocol {
    fn from(row: ProtocolRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            data: row.data,
            created_at: row.created_at,
            updated_at: row.updated_at,
            visibility: row.is_public.into(),
        }
    }
}

/// Owner-scoped protocol store
///
/// Every statement carries the caller's id, so a record the caller may not
/// see and a record that does not exist produce the same not-found result.
#[derive(Debug, Clone)]
pub struct ProtocolStore {
    pool: SqlitePool,
}

impl ProtocolStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Public records first, then newest first
    pub async fn list(&self, user_id: i64, scope: ListScope) -> ApplicationResult<Vec<ProtocolSummary>> {
        let query = match scope {
            ListScope::Mine => {
                "SELECT id, name, created_at, is_public FROM protocols \
                 WHERE user_id = ? ORDER BY created_at DESC, id DESC"
            }
            ListScope::MineAndPublic => {
                "SELECT id, name, created_at, is_public FROM protocols \
                 WHERE user_id = ? OR is_public = 1 \
                 ORDER BY is_public DESC, created_at DESC, id DESC"
            }
        };

        let rows = sqlx::query_as::<_, SummaryRow>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ProtocolSummary::from).collect())
    }

    /// A protocol the caller owns or that is public
    pub async fn fetch(&self, user_id: i64, id: i64) -> ApplicationResult<Protocol> {
        let row = sqlx::query_as::<_, ProtocolRow>(
            "SELECT id, user_id, name, data, created_at, updated_at, is_public FROM protocols \
             WHERE id = ? AND (user_id = ? OR is_public = 1)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Protocol::from).ok_or_else(not_found)
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> ApplicationResult<()> {
        let result = sqlx::query("DELETE FROM protocols WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(user_id, protocol_id = id, "Protocol deleted");
        Ok(())
    }

    /// Make an owned protocol public; there is no way back to private
    pub async fn publish(&self, user_id: i64, id: i64) -> ApplicationResult<()> {
        let result = sqlx::query(
            "UPDATE protocols SET is_public = 1, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(user_id, protocol_id = id, "Protocol published");
        Ok(())
    }

    /// Update in place when the caller owns `save.id`, otherwise insert
    ///
    /// Saving over someone else's public record leaves it untouched and
    /// creates a private copy owned by the caller.
    pub async fn save(&self, user_id: i64, save: SaveProtocol) -> ApplicationResult<SaveOutcome> {
        if save.name.trim().is_empty() || save.data.trim().is_empty() {
            return Err(ApplicationError::validation("name and data required"));
        }

        let now = Utc::now();

        if let Some(id) = save.id {
            let result = sqlx::query(
                "UPDATE protocols SET name = ?, data = ?, updated_at = ? WHERE id = ? AND user_id = ?",
            )
            .bind(&save.name)
            .bind(&save.data)
            .bind(now)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                debug!(user_id, protocol_id = id, "Protocol updated");
                return Ok(SaveOutcome::Updated { id });
            }
        }

        let result = sqlx::query(
            "INSERT INTO protocols (user_id, name, data, is_public, created_at, updated_at) \
             VALUES (?, ?, ?, 0, ?, ?)",
        )
        .bind(user_id)
        .bind(&save.name)
        .bind(&save.data)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let new_id = result.last_insert_rowid();
        match save.id {
            Some(source) => {
                info!(user_id, protocol_id = new_id, source, "Protocol forked");
                Ok(SaveOutcome::Forked { id: new_id, source })
            }
            None => {
                info!(user_id, protocol_id = new_id, "Protocol created");
                Ok(SaveOutcome::Created { id: new_id })
            }
        }
    }

    /// Run whichever mutation a request selected
    pub async fn execute(&self, user_id: i64, command: ProtocolCommand) -> ApplicationResult<CommandOutcome> {
        match command {
            ProtocolCommand::Delete { id } => {
                self.delete(user_id, id).await?;
                Ok(CommandOutcome::Deleted)
            }
            ProtocolCommand::Publish { id } => {
                self.publish(user_id, id).await?;
                Ok(CommandOutcome::Published { id })
            }
            ProtocolCommand::Save(save) => Ok(CommandOutcome::Saved(self.save(user_id, save).await?)),
        }
    }
}

fn not_found() -> ApplicationError {
    ApplicationError::not_found("not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::memory_database;
    use crate::protocol::types::Visibility;
    use crate::users::{NewUser, UserStore};

    struct Fixture {
        protocols: ProtocolStore,
        alice: i64,
        bob: i64,
    }

    async fn fixture() -> Fixture {
        let database = memory_database().await;
        let users = UserStore::new(database.pool().clone());
        let mut ids = Vec::new();
        for email in ["alice@example.com", "bob@example.com"] {
            ids.push(
                users
                    .insert(&NewUser {
                        email: email.to_string(),
                        password_hash: String::new(),
                        is_admin: false,
                        is_approved: true,
                    })
                    .await
                    .unwrap(),
            );
        }
        Fixture {
            protocols: ProtocolStore::new(database.pool().clone()),
            alice: ids[0],
            bob: ids[1],
        }
    }

    fn save(id: Option<i64>, name: &str) -> SaveProtocol {
        SaveProtocol {
            id,
            name: name.to_string(),
            data: r#"{"columns":[]}"#.to_string(),
        }
    }

    #[tokio::test]
    async fn test_owner_save_updates_in_place() {
        let f = fixture().await;
        let created = f.protocols.save(f.alice, save(None, "v1")).await.unwrap();
        let id = created.id();
        assert!(matches!(created, SaveOutcome::Created { .. }));

        let updated = f.protocols.save(f.alice, save(Some(id), "v2")).await.unwrap();
        assert_eq!(updated, SaveOutcome::Updated { id });
        assert_eq!(f.protocols.fetch(f.alice, id).await.unwrap().name, "v2");
    }

    #[tokio::test]
    async fn test_non_owner_save_forks_public_record() {
        let f = fixture().await;
        let id = f.protocols.save(f.alice, save(None, "original")).await.unwrap().id();
        f.protocols.publish(f.alice, id).await.unwrap();

        let outcome = f.protocols.save(f.bob, save(Some(id), "edited")).await.unwrap();
        let fork = outcome.id();
        assert_eq!(outcome, SaveOutcome::Forked { id: fork, source: id });
        assert_ne!(fork, id);

        let original = f.protocols.fetch(f.alice, id).await.unwrap();
        assert_eq!(original.name, "original");
        assert_eq!(original.user_id, f.alice);

        let copy = f.protocols.fetch(f.bob, fork).await.unwrap();
        assert_eq!(copy.name, "edited");
        assert_eq!(copy.user_id, f.bob);
        assert_eq!(copy.visibility, Visibility::Private);
    }

    #[tokio::test]
    async fn test_blank_name_or_data_rejected() {
        let f = fixture().await;
        let blank = SaveProtocol {
            id: None,
            name: "   ".to_string(),
            data: "{}".to_string(),
        };
        assert!(matches!(
            f.protocols.save(f.alice, blank).await,
            Err(ApplicationError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_twice_reports_not_found() {
        let f = fixture().await;
        let id = f.protocols.save(f.alice, save(None, "p")).await.unwrap().id();

        f.protocols.delete(f.alice, id).await.unwrap();
        assert!(matches!(
            f.protocols.delete(f.alice, id).await,
            Err(ApplicationError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_only_owner_may_delete_or_publish() {
        let f = fixture().await;
        let id = f.protocols.save(f.alice, save(None, "p")).await.unwrap().id();

        assert!(f.protocols.delete(f.bob, id).await.is_err());
        assert!(f.protocols.publish(f.bob, id).await.is_err());
        assert!(f.protocols.fetch(f.alice, id).await.is_ok());
    }

    #[tokio::test]
    async fn test_private_and_missing_are_indistinguishable() {
        let f = fixture().await;
        let id = f.protocols.save(f.alice, save(None, "secret")).await.unwrap().id();

        let hidden = f.protocols.fetch(f.bob, id).await.unwrap_err();
        let missing = f.protocols.fetch(f.bob, id + 100).await.unwrap_err();
        assert_eq!(hidden.to_string(), missing.to_string());
        assert!(matches!(hidden, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_listing_scopes_and_order() {
        let f = fixture().await;
        let mine = f.protocols.save(f.alice, save(None, "mine")).await.unwrap().id();
        let theirs_public = f.protocols.save(f.bob, save(None, "bob public")).await.unwrap().id();
        f.protocols.publish(f.bob, theirs_public).await.unwrap();
        f.protocols.save(f.bob, save(None, "bob private")).await.unwrap();

        let account: Vec<i64> = f
            .protocols
            .list(f.alice, ListScope::Mine)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(account, vec![mine]);

        let all: Vec<i64> = f
            .protocols
            .list(f.alice, ListScope::MineAndPublic)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(all, vec![theirs_public, mine]);
    }

    #[tokio::test]
    async fn test_execute_dispatches_commands() {
        let f = fixture().await;
        let saved = f
            .protocols
            .execute(f.alice, ProtocolCommand::Save(save(None, "p")))
            .await
            .unwrap();
        let CommandOutcome::Saved(outcome) = saved else {
            panic!("expected a save outcome");
        };

        let published = f
            .protocols
            .execute(f.alice, ProtocolCommand::Publish { id: outcome.id() })
            .await
            .unwrap();
        assert_eq!(published, CommandOutcome::Published { id: outcome.id() });

        let deleted = f
            .protocols
            .execute(f.alice, ProtocolCommand::Delete { id: outcome.id() })
            .await
            .unwrap();
        assert_eq!(deleted, CommandOutcome::Deleted);
    }
}
