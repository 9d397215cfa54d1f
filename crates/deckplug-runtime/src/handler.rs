//! Event handlers
//!
//! Handlers are registered before the engine starts and invoked once per
//! inbound event, each invocation on its own task. A failure is reported to
//! the dispatcher, which logs it and shows an alert on the originating key.

use std::future::Future;
use std::sync::Arc;

use deckplug_core::InboundEvent;

/// Application callback for inbound events
#[async_trait::async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, event: Arc<InboundEvent>) -> anyhow::Result<()>;

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[async_trait::async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Arc<InboundEvent>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, event: Arc<InboundEvent>) -> anyhow::Result<()> {
        (self)(event).await
    }
}

/// Ordered, append-only list of handlers
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: Handler>(&mut self, handler: H) {
        self.handlers.push(Arc::new(handler));
    }

    pub fn register_shared(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Snapshot handed to the dispatcher; no registrations after this point
    pub fn freeze(self) -> Arc<[Arc<dyn Handler>]> {
        self.handlers.into()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl Handler for Counting {
        async fn handle(&self, _event: Arc<InboundEvent>) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_registry_keeps_order_and_calls_handlers() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(Counting(Arc::clone(&hits)));
        registry.register(|event: Arc<InboundEvent>| async move {
            anyhow::ensure!(event.context == "c1", "wrong context");
            anyhow::Ok(())
        });
        assert_eq!(registry.len(), 2);
        assert!(registry.handlers[0].name().ends_with("Counting"));

        let event = Arc::new(InboundEvent::decode(r#"{"event":"keyDown","context":"c1"}"#).unwrap());
        for handler in registry.freeze().iter() {
            handler.handle(Arc::clone(&event)).await.unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closure_errors_propagate() {
        let mut registry = HandlerRegistry::new();
        registry.register(|_event: Arc<InboundEvent>| async move {
            Err::<(), _>(anyhow::anyhow!("boom"))
        });

        let event = Arc::new(InboundEvent::decode(r#"{"event":"keyUp"}"#).unwrap());
        let handlers = registry.freeze();
        let err = handlers[0].handle(event).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
