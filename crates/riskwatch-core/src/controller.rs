//! The alarm controller: stateful orchestrator of the hazard pipeline.
//!
//! The controller owns the rolling window and the alarm state, classifies
//! every ingested reading, and drives the advisory workflow. It is the
//! single writer of [`AlarmState`]; presentation reads cloned snapshots.
//!
//! Concurrency model: readings arrive as a single logical stream and are
//! processed in arrival order. The advisory request is the only operation
//! that suspends, and it runs on a spawned task so new readings keep
//! flowing while it is in flight. At most one advisory request is ever
//! pending per controller; a Critical transition is never delayed by the
//! advisory path.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use riskwatch_types::{AlarmState, HazardLevel, Reading};

use crate::classifier::{HazardClassifier, TriggerConfig};
use crate::events::{AlarmEvent, EventReceiver, EventSender, event_channel};
use crate::traits::AdvisoryProvider;
use crate::window::{DEFAULT_WINDOW_CAPACITY, RollingWindow};

/// Compose the canned urgent message for an instantaneous breach.
///
/// Surfaced immediately on a Critical classification; latency matters
/// more than polish at this severity, so no advisory round trip happens.
pub fn urgent_message(context: &str) -> String {
    format!("⚠️ URGENT: {context} System actuators engaged. EVACUATE AREA IMMEDIATELY.")
}

/// Construction options for [`AlarmController`].
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Trigger thresholds for the classifier.
    pub triggers: TriggerConfig,
    /// Rolling window capacity.
    pub window_capacity: usize,
    /// Event broadcast buffer size.
    pub event_buffer: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            triggers: TriggerConfig::default(),
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            event_buffer: 64,
        }
    }
}

/// Stateful alarm orchestrator.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct AlarmController {
    inner: Arc<Inner>,
}

struct Inner {
    window: Mutex<RollingWindow>,
    alarm: Mutex<AlarmState>,
    classifier: HazardClassifier,
    provider: Arc<dyn AdvisoryProvider>,
    events: EventSender,
}

impl AlarmController {
    /// Create a controller with default options.
    pub fn new(provider: Arc<dyn AdvisoryProvider>) -> Self {
        Self::with_options(provider, ControllerOptions::default())
    }

    /// Create a controller with custom options.
    pub fn with_options(provider: Arc<dyn AdvisoryProvider>, options: ControllerOptions) -> Self {
        let (events, _) = event_channel(options.event_buffer);
        Self {
            inner: Arc::new(Inner {
                window: Mutex::new(RollingWindow::new(options.window_capacity)),
                alarm: Mutex::new(AlarmState::default()),
                classifier: HazardClassifier::new(options.triggers),
                provider,
                events,
            }),
        }
    }

    /// Ingest one reading and return its classification.
    ///
    /// Level and reason bookkeeping follow the classifier on every cycle,
    /// independent of popup visibility. A visible popup is only replaced
    /// on an Idle-to-popup transition; an ongoing event never rewrites the
    /// displayed text (no flicker) until the user dismisses it.
    pub async fn ingest(&self, reading: Reading) -> HazardLevel {
        let verdict = {
            let mut window = self.inner.window.lock().await;
            let verdict = self.inner.classifier.classify(&window.snapshot(), &reading);
            window.push(reading);
            verdict
        };

        let _ = self.inner.events.send(AlarmEvent::Ingested {
            reading,
            level: verdict.level,
        });

        let mut alarm = self.inner.alarm.lock().await;
        let level_changed = alarm.level != verdict.level;
        alarm.level = verdict.level;
        alarm.reason = verdict.reason.clone();

        match verdict.level {
            HazardLevel::Critical => {
                // Immediate and synchronous: the urgent message is canned,
                // never waiting on the advisory service.
                if !alarm.suppressed {
                    alarm.advisory = Some(urgent_message(&verdict.reason));
                    alarm.suppressed = true;
                }
            }
            HazardLevel::Trending if verdict.needs_advisory => {
                // Duplicate guard: an existing popup stays until dismissal,
                // and a second request is never issued while one is in
                // flight.
                if !alarm.suppressed && !alarm.advisory_pending {
                    alarm.advisory_pending = true;
                    self.spawn_advisory(reading, verdict.reason.clone());
                }
            }
            _ => {}
        }
        drop(alarm);

        if level_changed {
            let _ = self.inner.events.send(AlarmEvent::LevelChanged {
                level: verdict.level,
                reason: verdict.reason,
            });
        }

        verdict.level
    }

    /// Dismiss the popup: clears the visibility flag and the displayed
    /// advisory text. The hazard level is untouched; the next ingest
    /// recomputes it fresh.
    pub async fn dismiss(&self) {
        let mut alarm = self.inner.alarm.lock().await;
        alarm.suppressed = false;
        alarm.advisory = None;
        drop(alarm);

        let _ = self.inner.events.send(AlarmEvent::Dismissed);
    }

    /// Read-only snapshot of the current alarm state.
    pub async fn snapshot(&self) -> AlarmState {
        self.inner.alarm.lock().await.clone()
    }

    /// Subscribe to alarm events.
    pub fn subscribe(&self) -> EventReceiver {
        self.inner.events.subscribe()
    }

    fn spawn_advisory(&self, reading: Reading, context: String) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = inner.provider.advise(&reading, &context).await;

            let mut alarm = inner.alarm.lock().await;
            alarm.advisory_pending = false;
            if alarm.level == HazardLevel::Critical {
                // Urgent content preempts a late advisory.
                debug!("Discarding advisory; a critical alert took precedence");
                return;
            }
            alarm.advisory = Some(outcome.text.clone());
            alarm.suppressed = true;
            drop(alarm);

            let _ = inner.events.send(AlarmEvent::AdvisoryReady {
                text: outcome.text,
                source: outcome.source,
            });
        });
    }
}
