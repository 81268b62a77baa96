// CV intake: accept an uploaded PDF or pasted text, keep the original in object
// storage, persist the CV row and hand the text to the workflow service.
// PDF text extraction is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod extract;
pub mod handlers;
pub mod ingest;
