use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Contacts Router Module
///
/// The six contact operations, nested under `/contacts` by the root router.
///
/// Access control strategy: every handler here relies on the auth middleware
/// applied to this router in `create_router`, which guarantees a validated
/// `AuthUser` (id + role). Inside each handler, the operation's role
/// allow-list and the 2-per-5-seconds rate limit are checked, in that order,
/// before any data access.
pub fn contacts_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET / — list the caller's contacts, with optional firstname /
        // lastname / email query filters. Empty result is a 404 by contract.
        // POST / — create a contact owned by the caller; duplicate email for
        // the same owner is a 409.
        .route(
            "/",
            get(handlers::get_contacts).post(handlers::create_contact),
        )
        // GET /days/{days} — contacts created within the last N days. An
        // empty window is a 200 with an empty list, not a 404.
        .route("/days/{days}", get(handlers::get_contacts_by_days))
        // GET /contact/{contact_id} — single owned contact by id.
        .route("/contact/{contact_id}", get(handlers::get_contact_by_id))
        // PATCH/DELETE /{contact_id} — partial update (absent fields keep
        // their stored values) and hard delete (admin role only).
        .route(
            "/{contact_id}",
            patch(handlers::update_contact).delete(handlers::remove_contact),
        )
}
