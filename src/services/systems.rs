//! Systems service.

use std::sync::Arc;
use tracing::instrument;

use crate::client::RequestExecutor;
use crate::errors::{PluralKitError, PluralKitResult};
use crate::transport::HttpRequest;
use crate::types::{Field, System, SystemGuildSettings};

pub use crate::types::system::SELF_REFERENCE;

/// Systems service for reading and updating systems.
pub struct SystemsService {
    executor: Arc<RequestExecutor>,
}

impl SystemsService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Fetches a system by ID, UUID or Discord account ID.
    ///
    /// An empty reference fetches the system owning the token.
    #[instrument(skip(self))]
    pub async fn get(&self, system_ref: &str) -> PluralKitResult<System> {
        let request = HttpRequest::get(format!("systems/{}", resolve(system_ref)));
        let response = self.executor.execute(request).await?;
        Ok(response.json()?)
    }

    /// Verifies `system` and sends its set fields.
    ///
    /// Returns the updated system as stored by the API.
    #[instrument(skip(self, system), fields(system = %system.reference()))]
    pub async fn patch(&self, system: &System) -> PluralKitResult<System> {
        let body = system.verify()?;
        let request =
            HttpRequest::patch(format!("systems/{}", system.reference())).with_json(&body)?;
        let response = self.executor.execute(request).await?;
        Ok(response.json()?)
    }

    /// Fetches the calling system's settings for a server.
    #[instrument(skip(self))]
    pub async fn guild_settings(&self, guild: &str) -> PluralKitResult<SystemGuildSettings> {
        if guild.is_empty() {
            return Err(PluralKitError::validation("Guild ID is required"));
        }

        let request = HttpRequest::get(format!("systems/{SELF_REFERENCE}/guilds/{guild}"));
        let response = self.executor.execute(request).await?;
        Ok(response.json()?)
    }

    /// Verifies `settings` and sends its set fields for its server.
    #[instrument(skip(self, settings))]
    pub async fn patch_guild_settings(
        &self,
        settings: &SystemGuildSettings,
    ) -> PluralKitResult<SystemGuildSettings> {
        let guild = match &settings.guild {
            Field::Value(guild) if !guild.is_empty() => guild,
            _ => return Err(PluralKitError::validation("Guild ID is required")),
        };

        let body = settings.verify()?;
        let request = HttpRequest::patch(format!("systems/{SELF_REFERENCE}/guilds/{guild}"))
            .with_json(&body)?;
        let response = self.executor.execute(request).await?;
        Ok(response.json()?)
    }
}

impl std::fmt::Debug for SystemsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemsService").finish_non_exhaustive()
    }
}

fn resolve(system_ref: &str) -> &str {
    if system_ref.trim().is_empty() {
        SELF_REFERENCE
    } else {
        system_ref
    }
}
