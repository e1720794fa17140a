use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

/// Admin access log line, recorded before the guarded operation runs.
///
/// Observer only: it takes the actor as an optional id and degrades to a
/// sentinel when the request carried no valid principal. It returns nothing
/// and cannot fail, so the guarded operation is never blocked or altered.
pub fn log_admin_access(actor: Option<Uuid>, path: &str, operation: &str) {
    let at = OffsetDateTime::now_utc();
    info!(
        actor = %actor_label(actor),
        at = %at,
        path = %path,
        operation = %operation,
        "admin access"
    );
}

fn actor_label(actor: Option<Uuid>) -> String {
    actor
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Test-only tracing layer that collects emitted events as field maps.
#[cfg(test)]
pub(crate) mod capture {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing_subscriber::{layer::Context, prelude::*, registry::Registry, Layer};

    #[derive(Clone, Default)]
    pub(crate) struct CapturedEvents(Arc<Mutex<Vec<HashMap<String, String>>>>);

    struct FieldMap(HashMap<String, String>);

    impl Visit for FieldMap {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0
                .insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for CapturedEvents {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = FieldMap(HashMap::new());
            event.record(&mut fields);
            self.0.lock().unwrap().push(fields.0);
        }
    }

    impl CapturedEvents {
        /// Events whose message field matches, e.g. "admin access".
        pub(crate) fn with_message(&self, message: &str) -> Vec<HashMap<String, String>> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.get("message").map(String::as_str) == Some(message))
                .cloned()
                .collect()
        }

        /// Installs this layer and runs `f` with it as the default subscriber.
        pub(crate) fn run<F: FnOnce()>(&self, f: F) {
            let subscriber = Registry::default().with(self.clone());
            tracing::subscriber::with_default(subscriber, f);
        }
    }
}
