//! Service layer for the notes API.
//! - `storage` owns the JSON file and serializes access to it.
//! - `notes` implements list/get/create/update/delete on top of it.
//! - Errors are typed so the HTTP layer can map them to status codes.

pub mod errors;
pub mod storage;
pub mod notes;
