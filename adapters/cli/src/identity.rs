use std::env;

use reflex_core::PlayerName;
use reflex_system_reconciler::{IdentityError, IdentityProvider};

const USER_VARIABLES: [&str; 2] = ["USER", "USERNAME"];

/// Player identity taken from configuration, falling back to the login name.
#[derive(Debug)]
pub(crate) struct EnvIdentity {
    configured: Option<String>,
}

impl EnvIdentity {
    pub(crate) fn new(configured: Option<String>) -> Self {
        Self { configured }
    }
}

impl IdentityProvider for EnvIdentity {
    fn current_player(&self) -> Result<PlayerName, IdentityError> {
        let name = self
            .configured
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                USER_VARIABLES
                    .iter()
                    .filter_map(|key| env::var(key).ok())
                    .find(|name| !name.trim().is_empty())
            })
            .ok_or_else(|| IdentityError("no player name configured".to_owned()))?;
        Ok(PlayerName::new(name))
    }
}
