use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hashbrown::HashSet;

use crate::automation::Cookie;

/// Length of the identity token at the front of a registration secret.
pub const IDENTITY_LEN: usize = 16;
/// Length of the registration key following the identity token.
pub const KEY_LEN: usize = 32;

/// Long-lived memory of one simulated participant.
#[derive(Debug, Clone)]
pub struct UserMemory {
    /// Entry point that (re-)establishes the participant's identity.
    pub registration_url: String,
    /// Ballot ids this participant already finalized. Only ever grows;
    /// membership stops the same ballot from being submitted twice.
    pub submitted_ballots: HashSet<String>,
}

impl UserMemory {
    /// Memory for a fresh participant entering through `registration_url`.
    pub fn new(registration_url: impl Into<String>) -> Self {
        Self {
            registration_url: registration_url.into(),
            submitted_ballots: HashSet::new(),
        }
    }
}

/// A suspended participant session circulating through the work queue.
///
/// Owned by at most one worker at a time; ownership moves with the state
/// through enqueue and dequeue, never by sharing.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// The participant's memory.
    pub memory: UserMemory,
    /// Cookie snapshot taken when the session was last suspended.
    pub cookies: Vec<Cookie>,
    /// Where the session left off.
    pub current_url: String,
    /// How many times a worker has picked this session up.
    pub visits: u64,
}

impl SessionState {
    /// A fresh session parked on its registration link.
    pub fn new(memory: UserMemory) -> Self {
        let current_url = memory.registration_url.clone();
        Self {
            memory,
            cookies: Vec::new(),
            current_url,
            visits: 0,
        }
    }
}

/// Encode the fixed-layout registration secret: the identity token followed
/// by the registration key, URL-safe base64 without padding.
pub fn registration_secret(identity: &[u8; IDENTITY_LEN], key: &[u8; KEY_LEN]) -> String {
    let mut secret = [0u8; IDENTITY_LEN + KEY_LEN];
    secret[..IDENTITY_LEN].copy_from_slice(identity);
    secret[IDENTITY_LEN..].copy_from_slice(key);
    URL_SAFE_NO_PAD.encode(secret)
}

/// The registration URL for a participant on the given server.
pub fn registration_url(
    server_url: &str,
    identity: &[u8; IDENTITY_LEN],
    key: &[u8; KEY_LEN],
) -> String {
    string_concat!(server_url, "/register/", registration_secret(identity, key))
}
