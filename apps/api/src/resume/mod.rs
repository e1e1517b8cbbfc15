// Resume endpoints: upload a resume file, analyze it against a target role.
// Both handlers are thin: they shape the request and delegate to the
// file service or a chat engine held in AppState.

pub mod analysis;
pub mod models;
pub mod prompts;
pub mod upload;
