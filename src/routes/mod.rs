/// Router Module Index
///
/// Routes are split by what they expect of the caller. All of them sit behind the edge
/// gate; the gate itself decides which of them it actually inspects.

/// Health check and the auth pages (reachable only without a session cookie).
pub mod public;

/// The `/api` surface: auth proxy and navigation. Exempt from the edge gate, so each
/// handler authenticates on its own.
pub mod api;

/// Dashboard pages, one per entry of the route authorization table.
pub mod pages;
