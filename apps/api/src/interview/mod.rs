// Interview lifecycle routes outside the multiple-choice session: starting a new
// interview from a CV, and the free-text answer/finish flow. Question generation and
// scoring happen in the workflow service; these modules validate and forward.

pub mod free_text;
pub mod handlers;
pub mod ownership;
pub mod start;
