// Interview report: a read-only view over persisted interview, question and answer
// rows. Scores fall back to values derived from the answers when the workflow has not
// written them onto the interview yet.

pub mod builder;
pub mod handlers;
