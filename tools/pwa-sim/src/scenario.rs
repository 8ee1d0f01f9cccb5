//! Scripted session against the simulated platform.

use pwakit_common::PwaConfig;
use pwakit_sw::sim::{SimInstallPrompt, SimulatedPlatform};
use pwakit_sw::{CacheInfo, PwaFacade, PwaManager, PwaNotification, PwaStatus, UserChoice};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Knobs for [`run`].
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    pub choice: UserChoice,
    pub offline_cycles: u32,
    pub stage_update: bool,
    pub sync_tag: String,
}

/// One step of the session and what it produced.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub action: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<PwaNotification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    pub status: PwaStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub config: PwaConfig,
    pub steps: Vec<Step>,
    pub caches_before_clear: Vec<CacheInfo>,
}

struct Recorder {
    facade: PwaFacade,
    notifications: tokio::sync::broadcast::Receiver<PwaNotification>,
    steps: Vec<Step>,
}

impl Recorder {
    fn record(&mut self, action: &str, result: Option<serde_json::Value>) {
        self.facade.refresh();
        let mut notifications = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            notifications.push(notification);
        }
        info!(action, count = notifications.len(), "Step complete");
        self.steps.push(Step {
            action: action.to_string(),
            notifications,
            result,
            status: self.facade.status(),
        });
    }
}

pub async fn run(config: PwaConfig, options: &ScenarioOptions) -> anyhow::Result<Transcript> {
    let platform = SimulatedPlatform::new();
    platform.caches().seed(
        "static-v1",
        &["/", "/dashboard", "/manifest.json", "/offline.html"],
    );
    platform.caches().seed("api-v1", &["/api/energy/today"]);

    let manager = PwaManager::new(platform.capabilities(), config.clone());
    platform.connect(manager.event_sink());
    let mut bridge = manager.event_bridge()?;

    let mut recorder = Recorder {
        notifications: manager.subscribe(),
        facade: PwaFacade::mount(Arc::clone(&manager)),
        steps: Vec::new(),
    };

    recorder.facade.register_service_worker().await?;
    recorder.record("register", None);

    platform.offer_install(Arc::new(SimInstallPrompt::new(Ok(options.choice))));
    bridge.drain().await;
    recorder.record("beforeinstallprompt", None);

    let accepted = recorder.facade.show_install_prompt().await;
    recorder.record("showInstallPrompt", Some(json!(accepted)));
    if accepted {
        platform.complete_install();
        bridge.drain().await;
        recorder.record("appinstalled", None);
    }

    for _ in 0..options.offline_cycles {
        platform.go_offline();
        bridge.drain().await;
        recorder.record("offline", None);
        platform.go_online();
        bridge.drain().await;
        recorder.record("online", None);
    }

    recorder
        .facade
        .request_background_sync(&options.sync_tag)
        .await?;
    recorder.record("requestBackgroundSync", Some(json!(options.sync_tag)));

    if options.stage_update {
        platform
            .container()
            .stage_update(&format!("{}?v=2", config.script_url));
    }
    let update_available = recorder.facade.check_for_updates().await;
    bridge.drain().await;
    bridge.join_update_checks().await;
    recorder.record("checkForUpdates", Some(json!(update_available)));

    if update_available && platform.activate_waiting() {
        bridge.drain().await;
        bridge.join_update_checks().await;
        recorder.record("controllerchange", None);
    }

    let caches_before_clear = recorder.facade.get_cache_info().await;
    recorder.facade.clear_all_caches().await?;
    let remaining = recorder.facade.get_cache_info().await;
    recorder.record("clearAllCaches", Some(json!(remaining)));

    recorder.facade.unregister_service_worker().await?;
    recorder.record("unregister", None);

    Ok(Transcript {
        config,
        steps: recorder.steps,
        caches_before_clear,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(choice: UserChoice) -> ScenarioOptions {
        ScenarioOptions {
            choice,
            offline_cycles: 1,
            stage_update: true,
            sync_tag: "outbox".to_string(),
        }
    }

    fn step<'a>(transcript: &'a Transcript, action: &str) -> &'a Step {
        transcript
            .steps
            .iter()
            .find(|s| s.action == action)
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepting_session() {
        let transcript = run(PwaConfig::default(), &options(UserChoice::Accepted))
            .await
            .unwrap();

        assert_eq!(
            step(&transcript, "showInstallPrompt").result,
            Some(json!(true))
        );
        let installed = step(&transcript, "appinstalled");
        assert!(installed.status.is_installed);
        assert!(!installed.status.can_install);

        let offline = step(&transcript, "offline");
        assert_eq!(
            offline.notifications,
            vec![PwaNotification::OnlineStatusChanged { is_online: false }]
        );
        assert!(!offline.status.is_online);

        assert_eq!(step(&transcript, "checkForUpdates").result, Some(json!(true)));
        assert!(transcript
            .steps
            .iter()
            .any(|s| s.action == "controllerchange"));
        assert_eq!(transcript.caches_before_clear.len(), 2);
        assert_eq!(step(&transcript, "clearAllCaches").result, Some(json!([])));
    }

    #[tokio::test]
    async fn test_dismissing_session() {
        let transcript = run(PwaConfig::default(), &options(UserChoice::Dismissed))
            .await
            .unwrap();

        let shown = step(&transcript, "showInstallPrompt");
        assert_eq!(shown.result, Some(json!(false)));
        assert!(shown.status.can_install);
        assert!(!transcript.steps.iter().any(|s| s.action == "appinstalled"));
    }

    #[test]
    fn test_step_serialization() {
        let step = Step {
            action: "online".to_string(),
            notifications: vec![PwaNotification::OnlineStatusChanged { is_online: true }],
            result: None,
            status: PwaStatus {
                is_installed: false,
                is_online: true,
                can_install: false,
            },
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["status"]["isOnline"], json!(true));
        assert_eq!(
            value["notifications"][0]["type"],
            json!("pwa-online-status-changed")
        );
        assert!(value.get("result").is_none());
    }
}
