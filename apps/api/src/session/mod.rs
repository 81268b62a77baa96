// Multiple-choice interview session: load the question set from the workflow service,
// walk it one question at a time, then hand the results to the finisher.
// The walker is pure state; all I/O lives in the loader, finisher and handlers.

pub mod finisher;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod registry;
pub mod walker;

pub use registry::SessionRegistry;
pub use walker::SessionError;
