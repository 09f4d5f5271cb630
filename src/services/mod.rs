// SecretMarks services
// Stateless building blocks: crypto, URL normalization, fingerprints, tags, queries, settings.

pub mod bookmark_query;
pub mod crypto_service;
pub mod fingerprint;
pub mod settings_engine;
pub mod tags;
pub mod url_normalizer;
