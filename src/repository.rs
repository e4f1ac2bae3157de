use crate::models::{Contact, ContactFilter, CreateContactRequest, UpdateContactRequest, User};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

const CONTACT_COLUMNS: &str =
    "id, user_id, firstname, lastname, email, phone, birthday, notes, created_at";

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing the
/// handlers to interact with the data layer without knowing the specific
/// implementation (Postgres, mock, etc.).
///
/// Ownership scoping is part of the contract: every contact read and mutation
/// takes the owner's id and must restrict itself to that owner's rows. The one
/// exception is `delete_contact`, which is only reachable through the
/// admin-gated remove operation and deletes by id alone.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's async task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Contact retrieval ---
    /// All contacts owned by `owner`, oldest first. A query error degrades to
    /// an empty list (logged).
    async fn get_contacts(&self, owner: Uuid) -> Vec<Contact>;
    /// Owned contacts matching the present filters (partial, case-insensitive,
    /// ANDed). Called only when at least one filter is present.
    async fn get_contacts_by_filter(&self, owner: Uuid, filter: &ContactFilter) -> Vec<Contact>;
    /// Owned contacts created within the last `days` days. `Some(vec)` even
    /// when no rows match; `None` only when the lookup itself failed. The
    /// handler maps `None` to 404 and an empty vec to an empty 200 list.
    async fn get_contacts_per_days(&self, owner: Uuid, days: u32) -> Option<Vec<Contact>>;
    /// Single owned contact by id.
    async fn get_contact_by_id(&self, id: i64, owner: Uuid) -> Option<Contact>;
    /// Duplicate pre-check for create: an owned contact with this email.
    async fn get_contact_by_email(&self, email: &str, owner: Uuid) -> Option<Contact>;

    // --- Contact mutation ---
    /// Inserts a new contact with owner = `owner`; the store assigns the id.
    async fn create_contact(&self, req: CreateContactRequest, owner: Uuid)
    -> sqlx::Result<Contact>;
    /// Partial update scoped to the owner. Uses COALESCE so absent fields
    /// retain their stored values. None when no such owned contact exists.
    async fn update_contact(
        &self,
        id: i64,
        owner: Uuid,
        req: UpdateContactRequest,
    ) -> Option<Contact>;
    /// Hard delete by id, no ownership scoping (admin override). True only if
    /// a row was removed.
    async fn delete_contact(&self, id: i64) -> bool;

    // --- User/Auth ---
    /// Identity resolution for the auth extractor.
    async fn get_user(&self, id: Uuid) -> Option<User>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL connection pool. All queries use bound parameters.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_contacts(&self, owner: Uuid) -> Vec<Contact> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = $1 ORDER BY id");
        match sqlx::query_as::<_, Contact>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
        {
            Ok(contacts) => contacts,
            Err(e) => {
                tracing::error!("get_contacts error: {:?}", e);
                vec![]
            }
        }
    }

    /// Flexible filtering via QueryBuilder for safe parameterization. The
    /// owner restriction is part of the base query and cannot be bypassed by
    /// any filter combination.
    async fn get_contacts_by_filter(&self, owner: Uuid, filter: &ContactFilter) -> Vec<Contact> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = "));
        builder.push_bind(owner);

        if let Some(firstname) = &filter.firstname {
            builder.push(" AND firstname ILIKE ");
            builder.push_bind(format!("%{}%", firstname));
        }
        if let Some(lastname) = &filter.lastname {
            builder.push(" AND lastname ILIKE ");
            builder.push_bind(format!("%{}%", lastname));
        }
        if let Some(email) = &filter.email {
            builder.push(" AND email ILIKE ");
            builder.push_bind(format!("%{}%", email));
        }

        builder.push(" ORDER BY id");

        match builder
            .build_query_as::<Contact>()
            .fetch_all(&self.pool)
            .await
        {
            Ok(contacts) => contacts,
            Err(e) => {
                tracing::error!("get_contacts_by_filter error: {:?}", e);
                vec![]
            }
        }
    }

    /// Recency lookup. Unlike the other listings, a failed query here is
    /// surfaced as None (the handler's 404), while zero matching rows pass
    /// through as Some(vec![]).
    async fn get_contacts_per_days(&self, owner: Uuid, days: u32) -> Option<Vec<Contact>> {
        // Bound as i64: the full u32 range is representable, so an oversized
        // window can never wrap negative and flip the cutoff into the future.
        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts \
             WHERE user_id = $1 AND created_at >= NOW() - ($2 * INTERVAL '1 day') \
             ORDER BY created_at DESC"
        );
        match sqlx::query_as::<_, Contact>(&sql)
            .bind(owner)
            .bind(i64::from(days))
            .fetch_all(&self.pool)
            .await
        {
            Ok(contacts) => Some(contacts),
            Err(e) => {
                tracing::error!("get_contacts_per_days error: {:?}", e);
                None
            }
        }
    }

    async fn get_contact_by_id(&self, id: i64, owner: Uuid) -> Option<Contact> {
        let sql =
            format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_contact_by_id error: {:?}", e);
                None
            })
    }

    async fn get_contact_by_email(&self, email: &str, owner: Uuid) -> Option<Contact> {
        let sql =
            format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE email = $1 AND user_id = $2");
        sqlx::query_as::<_, Contact>(&sql)
            .bind(email)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_contact_by_email error: {:?}", e);
                None
            })
    }

    /// Insert failures propagate to the handler as a 500; the duplicate
    /// pre-check happens at the handler layer, not here.
    async fn create_contact(
        &self,
        req: CreateContactRequest,
        owner: Uuid,
    ) -> sqlx::Result<Contact> {
        let sql = format!(
            "INSERT INTO contacts (user_id, firstname, lastname, email, phone, birthday, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {CONTACT_COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&sql)
            .bind(owner)
            .bind(req.firstname)
            .bind(req.lastname)
            .bind(req.email)
            .bind(req.phone)
            .bind(req.birthday)
            .bind(req.notes)
            .fetch_one(&self.pool)
            .await
    }

    /// COALESCE keeps the stored value for every field the payload omitted,
    /// so a body of `{"lastname": "X"}` changes lastname and nothing else.
    async fn update_contact(
        &self,
        id: i64,
        owner: Uuid,
        req: UpdateContactRequest,
    ) -> Option<Contact> {
        let sql = format!(
            "UPDATE contacts \
             SET firstname = COALESCE($3, firstname), \
                 lastname = COALESCE($4, lastname), \
                 email = COALESCE($5, email), \
                 phone = COALESCE($6, phone), \
                 birthday = COALESCE($7, birthday), \
                 notes = COALESCE($8, notes) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {CONTACT_COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(owner)
            .bind(req.firstname)
            .bind(req.lastname)
            .bind(req.email)
            .bind(req.phone)
            .bind(req.birthday)
            .bind(req.notes)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("update_contact error: {:?}", e);
                None
            })
    }

    async fn delete_contact(&self, id: i64) -> bool {
        match sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_contact error: {:?}", e);
                false
            }
        }
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or(None)
    }
}
