// User-facing account data: sign-in registration, dashboard, settings and deletion.
// Identity itself comes from the external auth provider; these routes take its ids.

pub mod dashboard;
pub mod deletion;
pub mod handlers;
pub mod settings;
pub mod users;
