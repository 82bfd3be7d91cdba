//! Browser glue for the upload task flow
//!
//! The fetch transport and the blob download trigger. Everything here
//! needs a browser environment; the state machine these feed lives in
//! `upload-flow`.

pub mod download;
pub mod http;

pub use download::trigger_download;
pub use http::{post_json, post_multipart};
