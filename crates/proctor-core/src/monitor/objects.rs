//! Object flag evaluator: stateless threshold check of every classified
//! object against the configured suspicious set.

use chrono::{DateTime, Utc};

use crate::events::{Event, EventKind};
use crate::perception::{normalize_class, ObjectObservation};
use crate::storage::ObjectsConfig;

#[derive(Debug, Clone, PartialEq)]
struct SuspiciousClass {
    /// Name as configured; carried into raised events.
    name: String,
    key: String,
    threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectFlagEvaluator {
    classes: Vec<SuspiciousClass>,
}

impl ObjectFlagEvaluator {
    pub fn from_config(config: &ObjectsConfig) -> Self {
        let classes = config
            .classes
            .iter()
            .map(|name| SuspiciousClass {
                name: name.clone(),
                key: normalize_class(name),
                threshold: config.threshold_for(name),
            })
            .collect();
        Self { classes }
    }

    /// One event per observation whose class is suspicious and whose score
    /// exceeds that class's threshold, in observation order.
    pub fn evaluate(&self, objects: &[ObjectObservation], now: DateTime<Utc>) -> Vec<Event> {
        objects
            .iter()
            .filter_map(|obs| {
                let key = normalize_class(&obs.object_class);
                self.classes
                    .iter()
                    .find(|c| c.key == key && obs.score > c.threshold)
                    .map(|c| Event::new(EventKind::suspicious_object(c.name.clone()), now))
            })
            .collect()
    }
}
