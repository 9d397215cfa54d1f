//! Counter action
//!
//! Each key shows a number that goes up by one per press. The count is stored
//! in the action's settings so it survives restarts of the Stream Deck
//! application.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use deckplug_core::{InboundEvent, InboundPayload, Settings, Target};
use deckplug_runtime::{Client, Handler};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSettings {
    pub count: u64,
}

impl CounterSettings {
    fn to_settings(self) -> Settings {
        let mut settings = Settings::new();
        settings.insert("count".to_string(), json!(self.count));
        settings
    }
}

/// Handler behind the counter action
pub struct CounterHandler {
    client: Client,
    counts: Mutex<HashMap<String, u64>>,
}

impl CounterHandler {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Current count of an action instance
    pub fn count(&self, context: &str) -> Option<u64> {
        self.counts.lock().ok()?.get(context).copied()
    }

    fn update<F>(&self, context: &str, f: F) -> anyhow::Result<u64>
    where
        F: FnOnce(Option<u64>) -> Option<u64>,
    {
        let mut counts = self
            .counts
            .lock()
            .map_err(|_| anyhow!("counter state poisoned"))?;
        match f(counts.get(context).copied()) {
            Some(count) => {
                counts.insert(context.to_string(), count);
                Ok(count)
            }
            None => {
                counts.remove(context);
                Ok(0)
            }
        }
    }

    async fn show(&self, context: &str, count: u64) -> anyhow::Result<()> {
        let title = count.to_string();
        self.client
            .set_title(context, Some(&title), Target::HardwareAndSoftware, None)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Handler for CounterHandler {
    async fn handle(&self, event: Arc<InboundEvent>) -> anyhow::Result<()> {
        let context = event.context.as_str();

        match &event.payload {
            InboundPayload::WillAppear(_) | InboundPayload::DidReceiveSettings(_) => {
                let stored = event.settings_as::<CounterSettings>()?.unwrap_or_default();
                let count = self.update(context, |_| Some(stored.count))?;
                self.show(context, count).await
            }
            InboundPayload::KeyDown(_) => {
                let stored = event.settings_as::<CounterSettings>()?.map(|s| s.count);
                let count = self.update(context, |count| {
                    Some(count.or(stored).unwrap_or(0).saturating_add(1))
                })?;
                debug!(context, count, "Counter incremented");
                self.show(context, count).await?;
                self.client
                    .set_settings(context, CounterSettings { count }.to_settings())
                    .await?;
                Ok(())
            }
            InboundPayload::WillDisappear(_) => {
                self.update(context, |_| None)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "counter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckplug_core::{create_outbound_channel, ChannelConfig, EventName, OutboundReceiver};
    use serde_json::Value;
    use tokio_test::assert_ok;

    fn handler() -> (CounterHandler, OutboundReceiver) {
        let (sender, receiver) = create_outbound_channel(&ChannelConfig::testing());
        (CounterHandler::new(Client::new(sender, "PLUGIN-UUID")), receiver)
    }

    fn event(name: &str, context: &str, settings: Value) -> Arc<InboundEvent> {
        let text = json!({
            "event": name,
            "action": "com.example.counter.action",
            "context": context,
            "payload": {"settings": settings, "coordinates": {"column": 1, "row": 2}}
        })
        .to_string();
        Arc::new(InboundEvent::decode(&text).unwrap())
    }

    fn title(event: &deckplug_core::OutboundEvent) -> Value {
        let encoded: Value = serde_json::from_str(&event.encode().unwrap()).unwrap();
        encoded["payload"]["title"].clone()
    }

    #[tokio::test]
    async fn test_restores_count_on_appear() {
        let (counter, mut outbound) = handler();

        assert_ok!(
            counter
                .handle(event("willAppear", "k1", json!({"count": 41})))
                .await
        );

        let shown = outbound.recv().await.unwrap();
        assert!(shown.is(EventName::SetTitle));
        assert_eq!(title(&shown), json!("41"));
        assert_eq!(counter.count("k1"), Some(41));
    }

    #[tokio::test]
    async fn test_key_down_increments_and_persists() {
        let (counter, mut outbound) = handler();

        counter.handle(event("keyDown", "k1", json!({}))).await.unwrap();
        counter.handle(event("keyDown", "k1", json!({}))).await.unwrap();
        counter.handle(event("keyDown", "k2", json!({}))).await.unwrap();

        let mut titles = Vec::new();
        let mut saved = Vec::new();
        while let Ok(sent) = outbound.try_recv() {
            if sent.is(EventName::SetTitle) {
                titles.push(title(&sent));
            } else {
                assert!(sent.is(EventName::SetSettings));
                let encoded: Value = serde_json::from_str(&sent.encode().unwrap()).unwrap();
                saved.push(encoded["payload"]["count"].clone());
            }
        }
        assert_eq!(titles, vec![json!("1"), json!("2"), json!("1")]);
        assert_eq!(saved, vec![json!(1), json!(2), json!(1)]);
        assert_eq!(counter.count("k1"), Some(2));
    }

    #[tokio::test]
    async fn test_key_down_saturates_at_max() {
        let (counter, mut outbound) = handler();

        let result = counter
            .handle(event("keyDown", "k1", json!({"count": u64::MAX})))
            .await;
        assert_ok!(result);
        assert_eq!(counter.count("k1"), Some(u64::MAX));

        let shown = outbound.recv().await.unwrap();
        assert_eq!(title(&shown), json!(u64::MAX.to_string()));
    }

    #[tokio::test]
    async fn test_disappear_forgets_instance() {
        let (counter, _outbound) = handler();

        counter.handle(event("keyDown", "k1", json!({}))).await.unwrap();
        counter
            .handle(event("willDisappear", "k1", json!({})))
            .await
            .unwrap();
        assert_eq!(counter.count("k1"), None);
    }

    #[tokio::test]
    async fn test_bad_settings_fail_the_handler() {
        let (counter, _outbound) = handler();

        let result = counter
            .handle(event("willAppear", "k1", json!({"count": "many"})))
            .await;
        assert!(result.is_err());
    }
}
