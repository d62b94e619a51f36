use meetsync_core::CredentialStore;

/// Session-token storage backed by the platform keychain (Keychain,
/// libsecret, Windows Credential Manager).
///
/// Failures degrade to "no token" with a logged warning rather than an
/// error: the bridge then connects with an empty token and the
/// conferencing client asks for a fresh interactive approval.
pub struct KeyringTokenStore {
    service: String,
    user: String,
}

impl KeyringTokenStore {
    pub fn new(service: &str, user: &str) -> Self {
        Self {
            service: service.to_string(),
            user: user.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(&self.service, &self.user)
    }
}

impl CredentialStore for KeyringTokenStore {
    fn get(&self) -> Option<String> {
        match self.entry().and_then(|entry| entry.get_password()) {
            Ok(token) => Some(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                tracing::warn!("keyring read failed: {e}");
                None
            }
        }
    }

    fn set(&self, token: &str) {
        if let Err(e) = self.entry().and_then(|entry| entry.set_password(token)) {
            tracing::warn!("keyring write failed: {e}");
        }
    }
}
