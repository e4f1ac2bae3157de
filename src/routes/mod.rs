/// Router Module Index
///
/// Splits the routing surface by access requirement, so the authentication
/// layer is applied explicitly at the module level (via Axum layers) rather
/// than per handler.

/// Routes accessible without credentials (health probe only).
pub mod public;

/// The contact resource routes. The whole module sits behind the auth
/// middleware; role allow-lists and rate limits are enforced per handler.
pub mod contacts;
