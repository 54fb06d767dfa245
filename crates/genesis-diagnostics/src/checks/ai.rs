use super::{Check, CheckContext};
use crate::error::{DiagnosticsError, DiagnosticsResult};
use crate::key::CheckKey;
use crate::result::{CheckDetails, CheckResult};
use genesis_store::{RecordStoreExt, Setting};
use serde::Deserialize;

/// Stored AI provider configuration
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiConfig {
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
}

/// AI assistant configured, with a credential, on a connected device
///
/// Reachability of the provider is not tested. Any failure degrades to a
/// warning: the rest of the application works without the assistant.
#[derive(Debug, Clone, Copy, Default)]
pub struct AiCheck;

#[async_trait::async_trait]
impl Check for AiCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Ai
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        let proxy_enabled = ctx.preferences.proxy_enabled;
        let stored = match ctx.store.table::<Setting>().get(&ctx.config.ai_config_key).await {
            Ok(stored) => stored,
            Err(e) if e.is_missing_table() => None,
            Err(e) => return Err(e.into()),
        };

        let Some(setting) = stored.filter(|s| !s.is_blank()) else {
            return Ok(CheckResult::warning("AI not configured").with_details(
                CheckDetails::Ai {
                    configured: false,
                    provider: None,
                    proxy_enabled,
                },
            ));
        };

        let config: AiConfig = setting.decode()?;
        let provider = config.provider.filter(|p| !p.trim().is_empty());
        let details = CheckDetails::Ai {
            configured: true,
            provider: provider.clone(),
            proxy_enabled,
        };

        if config.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Ok(CheckResult::warning("API key not configured").with_details(details));
        }

        if !ctx.environment.is_online() {
            return Ok(CheckResult::warning("No connection (offline mode)").with_details(details));
        }

        let name = provider.as_deref().map_or_else(|| "AI".to_string(), str::to_uppercase);
        Ok(CheckResult::success(format!("{name} configured")).with_details(details))
    }

    fn on_failure(&self, error: &DiagnosticsError) -> CheckResult {
        tracing::warn!(error = %error, "AI check failed, assuming offline mode");
        CheckResult::warning("AI offline mode")
    }
}
