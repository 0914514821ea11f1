//! Document retrieval: download cache and browser hand-off

pub mod cache;
pub mod opener;

pub use cache::DocumentCache;
pub use opener::{DisabledOpener, DocumentOpener, SystemBrowser};
