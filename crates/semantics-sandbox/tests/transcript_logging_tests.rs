//! Level of transcript events under each trace setting

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use semantics_sandbox::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

const TRANSCRIPT: &str = "semantics_sandbox::transcript";

#[derive(Clone, Default)]
struct TranscriptLevels(Arc<Mutex<Vec<Level>>>);

impl<S: Subscriber> Layer<S> for TranscriptLevels {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target() == TRANSCRIPT {
            if let Ok(mut levels) = self.0.lock() {
                levels.push(*meta.level());
            }
        }
    }
}

fn levels_for(config: SandboxConfig) -> Vec<Level> {
    let recorder = TranscriptLevels::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut sandbox = Sandbox::with_config(config);
        sandbox.observe("n", &1);
        sandbox.copy_value(&ValueRecord::new("Size").with_field("width", 1));
    });

    let levels = recorder.0.lock().map(|l| l.clone()).unwrap_or_default();
    levels
}

#[test]
fn test_trace_emits_info() {
    let levels = levels_for(SandboxConfig::new().with_trace(true));
    assert_eq!(levels, vec![Level::INFO, Level::INFO]);
}

#[test]
fn test_default_emits_debug() {
    let levels = levels_for(SandboxConfig::new());
    assert_eq!(levels, vec![Level::DEBUG, Level::DEBUG]);
}

#[test]
fn test_events_emitted_when_transcript_disabled() {
    let levels = levels_for(SandboxConfig::with_transcript_capacity(0));
    assert_eq!(levels.len(), 2);
}
