//! `portadata-client` — zero-visibility storage client.
//!
//! Values are encrypted leaf by leaf with [`portadata_engine`] before they
//! leave the process and decrypted after retrieval; the remote store only
//! ever sees ciphertext. The encryption key lives in `PORTADATA_CRYPT_KEY`
//! and is never transmitted.
//!
//! Every public operation returns the uniform [`Outcome`] record instead of
//! an error type: callers branch on `success` and `error`.
//!
//! ```no_run
//! use portadata_client::DataClient;
//! use serde_json::json;
//!
//! let client = DataClient::new().expect("client construction");
//! let outcome = client.store("user-1", &json!({"name": "alice", "age": 30}));
//! assert!(outcome.success);
//! ```

pub mod config;
pub mod protocol;
pub mod remote;

pub use config::Config;
pub use portadata_engine::{generate_key, CRYPT_KEY_ENV};
pub use protocol::Outcome;
pub use remote::{HttpRemoteStore, RemoteStore, API_TOKEN_ENV};

use portadata_engine::{decrypt_tree, encrypt_tree, load_key, Key, WalkError};
use serde_json::{Map, Value};
use tracing::debug;

/// Client facade over the remote store.
///
/// Orchestrates, per operation: load key → transform tree → remote call →
/// transform response. The key is loaded fresh for every operation except
/// `destroy`, which carries no payload.
pub struct DataClient {
    remote: Box<dyn RemoteStore>,
}

impl DataClient {
    /// Build a client against the default hosted API.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP transport cannot be constructed.
    pub fn new() -> anyhow::Result<Self> {
        Self::from_config(Config::default())
    }

    /// Build a client from `PORTADATA_*` environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when configuration is invalid or the HTTP transport
    /// cannot be constructed.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(Config::from_env()?)
    }

    /// Build a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when `cfg` fails validation or the HTTP transport
    /// cannot be constructed.
    pub fn from_config(cfg: Config) -> anyhow::Result<Self> {
        cfg.validate()?;
        Ok(Self::with_remote(Box::new(HttpRemoteStore::new(&cfg)?)))
    }

    /// Build a client over an arbitrary [`RemoteStore`] implementation.
    pub fn with_remote(remote: Box<dyn RemoteStore>) -> Self {
        Self { remote }
    }

    /// Fetch a record (or one attribute of it) and decrypt the result.
    pub fn show(&self, key: &str, attribute: Option<&str>) -> Outcome {
        let crypt_key = match self.load_crypt_key() {
            Ok(k) => k,
            Err(outcome) => return outcome,
        };

        let outcome = self.remote.show(key, attribute);
        if !outcome.success {
            return outcome;
        }
        match decrypt_tree(&crypt_key, &outcome.value) {
            Ok(value) => Outcome { value, ..outcome },
            Err(e) => decrypt_failure(outcome.code, e),
        }
    }

    /// Encrypt `value` and store it under `key`.
    pub fn store(&self, key: &str, value: &Value) -> Outcome {
        let crypt_key = match self.load_crypt_key() {
            Ok(k) => k,
            Err(outcome) => return outcome,
        };

        let encrypted = match encrypt_tree(&crypt_key, value) {
            Ok(v) => v,
            Err(e) => return Outcome::failure(0, format!("encryption failed: {e}")),
        };
        debug!(key, "storing encrypted record");
        self.remote.store(key, &encrypted)
    }

    /// Update the record under `key`.
    ///
    /// When `attributes` is given the update is partial: only those attributes
    /// are merged into the existing record. Otherwise `value` replaces the
    /// record wholesale (a missing `value` replaces it with null, matching the
    /// store API's semantics).
    pub fn update(
        &self,
        key: &str,
        value: Option<&Value>,
        attributes: Option<&Map<String, Value>>,
    ) -> Outcome {
        let crypt_key = match self.load_crypt_key() {
            Ok(k) => k,
            Err(outcome) => return outcome,
        };

        let (tree, partial) = match attributes {
            Some(attrs) => (Value::Object(attrs.clone()), true),
            None => (value.cloned().unwrap_or(Value::Null), false),
        };
        let encrypted = match encrypt_tree(&crypt_key, &tree) {
            Ok(v) => v,
            Err(e) => return Outcome::failure(0, format!("encryption failed: {e}")),
        };
        debug!(key, partial, "updating encrypted record");
        self.remote.update(key, &encrypted, partial)
    }

    /// Destroy the record under `key`, or only the named attributes.
    ///
    /// Carries no payload, so no key is loaded.
    pub fn destroy(&self, key: &str, attributes: Option<&[String]>) -> Outcome {
        debug!(key, "destroying record");
        self.remote.destroy(key, attributes)
    }

    /// Produce a fresh base64 key for first-time setup; `None` when a key is
    /// already provisioned. See [`portadata_engine::generate_key`].
    pub fn generate_crypt_key(&self) -> Option<String> {
        generate_key()
    }

    fn load_crypt_key(&self) -> Result<Key, Outcome> {
        load_key().map_err(|e| Outcome::failure(0, e.to_string()))
    }
}

fn decrypt_failure(code: u16, e: WalkError) -> Outcome {
    Outcome::failure(code, format!("decryption failed: {e}"))
}
