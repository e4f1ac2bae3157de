use crate::{
    AppState, access,
    auth::AuthUser,
    error::ApiError,
    models::{Contact, ContactFilter, CreateContactRequest, UpdateContactRequest},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

// Route tags for the per-identity-per-route rate limit windows.
const ROUTE_LIST: &str = "contacts:list";
const ROUTE_DAYS: &str = "contacts:days";
const ROUTE_GET: &str = "contacts:get";
const ROUTE_CREATE: &str = "contacts:create";
const ROUTE_UPDATE: &str = "contacts:update";
const ROUTE_DELETE: &str = "contacts:delete";

/// Path parameter constraint: contact ids are server-assigned starting at 1,
/// so anything below that is a malformed request, not a missing resource.
fn require_positive_id(contact_id: i64) -> Result<(), ApiError> {
    if contact_id >= 1 {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "contact_id must be greater than or equal to 1".to_string(),
        ))
    }
}

/// get_contacts
///
/// Lists the caller's contacts, optionally filtered by firstname, lastname
/// and/or email (partial, case-insensitive, ANDed). An empty result is a 404
/// rather than an empty 200 list; this is a deliberate contract of the API,
/// not a framework default.
#[utoipa::path(
    get,
    path = "/contacts",
    params(ContactFilter),
    responses(
        (status = 200, description = "The caller's contacts", body = [Contact]),
        (status = 404, description = "No contacts found")
    )
)]
pub async fn get_contacts(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    access::ALLOWED_READ.check(&user)?;
    state.limiter.hit(user.id, ROUTE_LIST)?;

    let contacts = if filter.is_empty() {
        state.repo.get_contacts(user.id).await
    } else {
        state.repo.get_contacts_by_filter(user.id, &filter).await
    };

    if contacts.is_empty() {
        return Err(ApiError::NotFound("No contacts found".to_string()));
    }
    Ok(Json(contacts))
}

/// get_contacts_by_days
///
/// Lists the caller's contacts created within the last `days` days.
///
/// Unlike the main listing, an empty result passes through as an empty 200
/// list; only a failed lookup (the repository's None sentinel) becomes a 404.
/// Negative `days` values never reach the handler: the u32 path parameter
/// rejects them during deserialization.
#[utoipa::path(
    get,
    path = "/contacts/days/{days}",
    params(("days" = u32, Path, description = "Recency window in days")),
    responses(
        (status = 200, description = "Recently added contacts", body = [Contact]),
        (status = 404, description = "Lookup failed")
    )
)]
pub async fn get_contacts_by_days(
    user: AuthUser,
    State(state): State<AppState>,
    Path(days): Path<u32>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    access::ALLOWED_READ.check(&user)?;
    state.limiter.hit(user.id, ROUTE_DAYS)?;

    match state.repo.get_contacts_per_days(user.id, days).await {
        Some(contacts) => Ok(Json(contacts)),
        None => Err(ApiError::NotFound("Not Found".to_string())),
    }
}

/// get_contact_by_id
///
/// Fetches a single contact by id, scoped to the caller's ownership: a
/// contact that exists but belongs to someone else is indistinguishable from
/// one that does not exist.
#[utoipa::path(
    get,
    path = "/contacts/contact/{contact_id}",
    params(("contact_id" = i64, Path, minimum = 1, description = "Contact ID")),
    responses(
        (status = 200, description = "The contact", body = Contact),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not found or not owned by caller")
    )
)]
pub async fn get_contact_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(contact_id): Path<i64>,
) -> Result<Json<Contact>, ApiError> {
    access::ALLOWED_READ.check(&user)?;
    require_positive_id(contact_id)?;
    state.limiter.hit(user.id, ROUTE_GET)?;

    match state.repo.get_contact_by_id(contact_id, user.id).await {
        Some(contact) => Ok(Json(contact)),
        None => Err(ApiError::NotFound("Not Found".to_string())),
    }
}

/// create_contact
///
/// Creates a new contact owned by the caller. Duplicate prevention is an
/// explicit application-layer step: an existing owned contact with the same
/// email yields a 409 naming the offending address, and no second record is
/// created. Two concurrent creates racing past the check are left to storage;
/// this layer does not serialize them.
#[utoipa::path(
    post,
    path = "/contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Created", body = Contact),
        (status = 400, description = "Payload failed validation"),
        (status = 409, description = "Duplicate email for this owner")
    )
)]
pub async fn create_contact(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    access::ALLOWED_CREATE.check(&user)?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    state.limiter.hit(user.id, ROUTE_CREATE)?;

    if state
        .repo
        .get_contact_by_email(&payload.email, user.id)
        .await
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Contact with email:{} already exist!",
            payload.email
        )));
    }

    let contact = state.repo.create_contact(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// update_contact
///
/// Partially updates an owned contact: only fields present in the payload
/// overwrite stored values (COALESCE merge in the repository). Returns the
/// updated record, or 404 if no such owned contact exists.
#[utoipa::path(
    patch,
    path = "/contacts/{contact_id}",
    params(("contact_id" = i64, Path, minimum = 1, description = "Contact ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Updated", body = Contact),
        (status = 400, description = "Invalid id or payload"),
        (status = 404, description = "Not found or not owned by caller")
    )
)]
pub async fn update_contact(
    user: AuthUser,
    State(state): State<AppState>,
    Path(contact_id): Path<i64>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<Json<Contact>, ApiError> {
    access::ALLOWED_UPDATE.check(&user)?;
    require_positive_id(contact_id)?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    state.limiter.hit(user.id, ROUTE_UPDATE)?;

    match state.repo.update_contact(contact_id, user.id, payload).await {
        Some(contact) => Ok(Json(contact)),
        None => Err(ApiError::NotFound("Not Found".to_string())),
    }
}

/// remove_contact
///
/// Hard-deletes a contact by id. Admin-only, and intentionally not scoped to
/// the caller's ownership: this is the administrative override, consistent
/// with the remove operation being gated to the admin role alone.
#[utoipa::path(
    delete,
    path = "/contacts/{contact_id}",
    params(("contact_id" = i64, Path, minimum = 1, description = "Contact ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid id"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Not found")
    )
)]
pub async fn remove_contact(
    user: AuthUser,
    State(state): State<AppState>,
    Path(contact_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    access::ALLOWED_REMOVE.check(&user)?;
    require_positive_id(contact_id)?;
    state.limiter.hit(user.id, ROUTE_DELETE)?;

    if state.repo.delete_contact(contact_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Not Found".to_string()))
    }
}
