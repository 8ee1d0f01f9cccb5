//! Install prompt broker.

use super::{lock, PwaManager};
use crate::error::PlatformError;
use crate::platform::{InstallPromptToken, UserChoice};
use std::sync::Arc;
use tracing::{error, info, warn};

impl PwaManager {
    /// Show the captured install prompt and wait for the user's answer.
    ///
    /// Returns `true` only if the user accepted. A missing prompt or any
    /// platform failure yields `false`; this never errors.
    pub async fn show_install_prompt(&self) -> bool {
        let Some(prompt) = self.install_prompt() else {
            warn!("Install prompt not available");
            return false;
        };

        match run_prompt(&prompt).await {
            Ok(UserChoice::Accepted) => {
                info!("User accepted the install prompt");
                true
            }
            Ok(UserChoice::Dismissed) => {
                info!("User dismissed the install prompt");
                if self.config.consume_prompt_on_dismiss {
                    self.consume_prompt(&prompt);
                }
                false
            }
            Err(e) => {
                error!(error = %e, "Install prompt failed");
                false
            }
        }
    }

    /// Drop `prompt` unless a newer one was captured while it was showing.
    fn consume_prompt(&self, prompt: &InstallPromptToken) {
        let consumed = {
            let mut current = lock(&self.deferred_prompt);
            match current.as_ref() {
                Some(held) if Arc::ptr_eq(held, prompt) => {
                    current.take();
                    true
                }
                _ => false,
            }
        };
        if consumed {
            self.notify_installability_change();
        }
    }
}

async fn run_prompt(prompt: &InstallPromptToken) -> Result<UserChoice, PlatformError> {
    prompt.prompt().await?;
    prompt.user_choice().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::PwaNotification;
    use crate::platform::Capabilities;
    use crate::sim::SimInstallPrompt;
    use pwakit_common::PwaConfig;

    fn manager(consume_prompt_on_dismiss: bool) -> Arc<PwaManager> {
        PwaManager::new(
            Capabilities::none(),
            PwaConfig {
                consume_prompt_on_dismiss,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_no_prompt_returns_false() {
        let manager = manager(false);
        assert!(!manager.show_install_prompt().await);
    }

    #[tokio::test]
    async fn test_accepted() {
        let manager = manager(false);
        let prompt = Arc::new(SimInstallPrompt::accepting());
        manager.capture_install_prompt(prompt.clone());

        assert!(manager.show_install_prompt().await);
        assert_eq!(prompt.prompt_calls(), 1);
    }

    #[tokio::test]
    async fn test_dismissed() {
        let manager = manager(false);
        manager.capture_install_prompt(Arc::new(SimInstallPrompt::dismissing()));

        assert!(!manager.show_install_prompt().await);
    }

    #[tokio::test]
    async fn test_failure_returns_false() {
        let manager = manager(false);
        manager.capture_install_prompt(Arc::new(SimInstallPrompt::failing(
            PlatformError::Aborted("prompt already shown".into()),
        )));

        assert!(!manager.show_install_prompt().await);
    }

    #[tokio::test]
    async fn test_dismissed_prompt_is_reused() {
        let manager = manager(false);
        let prompt = Arc::new(SimInstallPrompt::dismissing());
        manager.capture_install_prompt(prompt.clone());

        assert!(!manager.show_install_prompt().await);
        assert!(manager.can_install());
        assert!(!manager.show_install_prompt().await);
        assert_eq!(prompt.prompt_calls(), 2);
    }

    #[tokio::test]
    async fn test_dismissed_prompt_consumed_when_configured() {
        let manager = manager(true);
        let prompt = Arc::new(SimInstallPrompt::dismissing());
        manager.capture_install_prompt(prompt.clone());
        let mut rx = manager.subscribe();

        assert!(!manager.show_install_prompt().await);

        assert!(!manager.can_install());
        assert_eq!(
            rx.try_recv().unwrap(),
            PwaNotification::InstallabilityChanged { can_install: false }
        );
        assert!(!manager.show_install_prompt().await);
        assert_eq!(prompt.prompt_calls(), 1);
    }
}
