//! Per-connection client identifiers.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier sent with each new connection: `<unix-millis>-<random base36>`.
///
/// A fresh id is generated for every connect attempt.
///
/// # Examples
///
/// ```
/// use execwatch_core::ClientId;
///
/// let id = ClientId::generate();
/// let (millis, suffix) = id.as_str().split_once('-').unwrap();
/// assert!(millis.parse::<i64>().is_ok());
/// assert_eq!(suffix.len(), 9);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{}", _0)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a new identifier from the current time and a random suffix.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("{}-{}", Utc::now().timestamp_millis(), suffix))
    }

    /// The identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
