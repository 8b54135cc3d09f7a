//! Client for Trilium's external REST API (ETAPI).
//!
//! One method per remote capability; see [`TriliumClient`].

mod client;
pub mod error;
pub mod models;

#[cfg(test)]
pub(crate) mod mock_server;


pub use client::TriliumClient;
pub use error::{EtapiError, EtapiResult};
pub use models::{
    Attribute, AttributeType, Branch, CreateNoteParams, CreatedNote, Note, NoteWithBranch,
    SearchResult, UpdateNoteParams,
};

/// Install the ring crypto provider reqwest's rustls backend needs.
///
/// Safe to call more than once; later calls are no-ops.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
