#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use contact_book::{
    AppConfig, AppState, RateLimiter,
    auth::AuthUser,
    models::{Contact, ContactFilter, CreateContactRequest, Role, UpdateContactRequest, User},
    repository::{Repository, RepositoryState},
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

// Stable identities for the seeded test users.
pub const ADMIN_ID: Uuid = Uuid::from_u128(1);
pub const MODERATOR_ID: Uuid = Uuid::from_u128(2);
pub const USER_ID: Uuid = Uuid::from_u128(3);
pub const OTHER_USER_ID: Uuid = Uuid::from_u128(4);

// --- Mock repository ---

/// In-memory `Repository` implementation backing handler and router tests.
/// Reproduces the ownership scoping and partial-update semantics of the
/// Postgres implementation over a mutex-guarded Vec, plus a switch to
/// simulate the recency lookup's failure sentinel.
pub struct MockRepo {
    contacts: Mutex<Vec<Contact>>,
    next_id: AtomicI64,
    users: HashMap<Uuid, User>,
    pub fail_per_days: bool,
}

impl Default for MockRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRepo {
    pub fn new() -> Self {
        let users = [
            (ADMIN_ID, "admin@example.com", "admin"),
            (MODERATOR_ID, "moderator@example.com", "moderator"),
            (USER_ID, "user@example.com", "user"),
            (OTHER_USER_ID, "other@example.com", "user"),
        ]
        .into_iter()
        .map(|(id, email, role)| {
            (
                id,
                User {
                    id,
                    email: email.to_string(),
                    role: role.to_string(),
                },
            )
        })
        .collect();

        Self {
            contacts: Mutex::new(vec![]),
            next_id: AtomicI64::new(1),
            users,
            fail_per_days: false,
        }
    }

    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        let next_id = contacts.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let repo = Self::new();
        *repo.contacts.lock().unwrap() = contacts;
        repo.next_id.store(next_id, Ordering::SeqCst);
        repo
    }

    fn owned(&self, owner: Uuid) -> Vec<Contact> {
        self.contacts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == owner)
            .cloned()
            .collect()
    }
}

fn matches_filter(value: &str, filter: &Option<String>) -> bool {
    match filter {
        Some(f) => value.to_lowercase().contains(&f.to_lowercase()),
        None => true,
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_contacts(&self, owner: Uuid) -> Vec<Contact> {
        self.owned(owner)
    }

    async fn get_contacts_by_filter(&self, owner: Uuid, filter: &ContactFilter) -> Vec<Contact> {
        self.owned(owner)
            .into_iter()
            .filter(|c| {
                matches_filter(&c.firstname, &filter.firstname)
                    && matches_filter(&c.lastname, &filter.lastname)
                    && matches_filter(&c.email, &filter.email)
            })
            .collect()
    }

    async fn get_contacts_per_days(&self, owner: Uuid, days: u32) -> Option<Vec<Contact>> {
        if self.fail_per_days {
            return None;
        }
        // Windows wider than the representable date range just match
        // everything, like the unbounded SQL interval subtraction would.
        let cutoff = Utc::now()
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);
        Some(
            self.owned(owner)
                .into_iter()
                .filter(|c| c.created_at >= cutoff)
                .collect(),
        )
    }

    async fn get_contact_by_id(&self, id: i64, owner: Uuid) -> Option<Contact> {
        self.owned(owner).into_iter().find(|c| c.id == id)
    }

    async fn get_contact_by_email(&self, email: &str, owner: Uuid) -> Option<Contact> {
        self.owned(owner).into_iter().find(|c| c.email == email)
    }

    async fn create_contact(
        &self,
        req: CreateContactRequest,
        owner: Uuid,
    ) -> sqlx::Result<Contact> {
        let contact = Contact {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: owner,
            firstname: req.firstname,
            lastname: req.lastname,
            email: req.email,
            phone: req.phone,
            birthday: req.birthday,
            notes: req.notes,
            created_at: Utc::now(),
        };
        self.contacts.lock().unwrap().push(contact.clone());
        Ok(contact)
    }

    async fn update_contact(
        &self,
        id: i64,
        owner: Uuid,
        req: UpdateContactRequest,
    ) -> Option<Contact> {
        let mut contacts = self.contacts.lock().unwrap();
        let contact = contacts
            .iter_mut()
            .find(|c| c.id == id && c.user_id == owner)?;

        if let Some(firstname) = req.firstname {
            contact.firstname = firstname;
        }
        if let Some(lastname) = req.lastname {
            contact.lastname = lastname;
        }
        if let Some(email) = req.email {
            contact.email = email;
        }
        if let Some(phone) = req.phone {
            contact.phone = phone;
        }
        if let Some(birthday) = req.birthday {
            contact.birthday = Some(birthday);
        }
        if let Some(notes) = req.notes {
            contact.notes = Some(notes);
        }
        Some(contact.clone())
    }

    async fn delete_contact(&self, id: i64) -> bool {
        let mut contacts = self.contacts.lock().unwrap();
        let before = contacts.len();
        contacts.retain(|c| c.id != id);
        contacts.len() < before
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).cloned()
    }
}

// --- Test utilities ---

pub fn sample_contact(id: i64, owner: Uuid, email: &str) -> Contact {
    Contact {
        id,
        user_id: owner,
        firstname: "Ada".to_string(),
        lastname: "Lovelace".to_string(),
        email: email.to_string(),
        phone: "+353000000".to_string(),
        birthday: None,
        notes: None,
        created_at: Utc::now(),
    }
}

pub fn create_payload(email: &str) -> CreateContactRequest {
    CreateContactRequest {
        firstname: "Grace".to_string(),
        lastname: "Hopper".to_string(),
        email: email.to_string(),
        phone: "+353111111".to_string(),
        birthday: None,
        notes: None,
    }
}

/// AppState over a mock repository. The default quota (2 per 5 s) is too
/// tight for multi-step tests, so functional tests pass a generous limiter
/// and the rate-limit tests pass the production default explicitly.
pub fn create_test_state(repo: MockRepo, limiter: RateLimiter) -> AppState {
    AppState {
        repo: Arc::new(repo) as RepositoryState,
        limiter: Arc::new(limiter),
        config: AppConfig::default(),
    }
}

pub fn generous_limiter() -> RateLimiter {
    RateLimiter::new(1000, std::time::Duration::from_secs(5))
}

pub fn admin_user() -> AuthUser {
    AuthUser {
        id: ADMIN_ID,
        role: Role::Admin,
    }
}

pub fn plain_user() -> AuthUser {
    AuthUser {
        id: USER_ID,
        role: Role::User,
    }
}

/// Binds the real router on an ephemeral port and serves it in the
/// background, returning the base address for reqwest calls.
pub async fn spawn_app(state: AppState) -> String {
    let router = contact_book::create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    address
}
