//! Integrity scoring.
//!
//! Reduces an event log to a score in `[floor, 100]`: start at 100 and
//! subtract a fixed deduction per event, never going below the floor.
//! Deductions are non-negative, so the result depends only on the multiset
//! of events, not on their order.
//!
//! | Event | Deduction |
//! |-------|-----------|
//! | Multiple faces detected | 15 |
//! | User absent | 10 |
//! | User looking away | 5 |
//! | Cell phone detected | 20 |
//! | Book detected | 15 |
//! | anything else | 0 |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::events::{Event, EventKind};
use crate::perception::normalize_class;
use crate::storage::ScoringConfig;

pub const MAX_SCORE: u32 = 100;

/// Per-kind deductions, keyed the way events are compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionTable {
    multiple_faces: u32,
    absent: u32,
    looking_away: u32,
    /// Normalized class name -> deduction.
    objects: BTreeMap<String, u32>,
}

impl DeductionTable {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            multiple_faces: config.multiple_faces,
            absent: config.absent,
            looking_away: config.looking_away,
            objects: config
                .objects
                .iter()
                .map(|(class, points)| (normalize_class(class), *points))
                .collect(),
        }
    }

    pub fn deduction(&self, kind: &EventKind) -> u32 {
        match kind {
            EventKind::MultipleFacesDetected => self.multiple_faces,
            EventKind::UserAbsent => self.absent,
            EventKind::UserLookingAway => self.looking_away,
            EventKind::SuspiciousObjectDetected { object_class } => self
                .objects
                .get(&normalize_class(object_class))
                .copied()
                .unwrap_or(0),
            EventKind::Unrecognized => 0,
        }
    }
}

impl Default for DeductionTable {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

/// One line of a score breakdown: all events sharing a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    pub label: String,
    pub count: u32,
    pub points_each: u32,
    pub subtotal: u32,
}

/// Complete scoring breakdown for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: u32,
    /// Sum of all deductions before clamping.
    pub total_deduction: u32,
    pub lines: Vec<DeductionLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityScorer {
    table: DeductionTable,
    floor: u32,
}

impl IntegrityScorer {
    pub fn new(table: DeductionTable, floor: u32) -> Self {
        Self {
            table,
            floor: floor.min(MAX_SCORE),
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(DeductionTable::from_config(config), config.floor)
    }

    pub fn table(&self) -> &DeductionTable {
        &self.table
    }

    pub fn score(&self, events: &[Event]) -> u32 {
        let total = self.total_deduction(events);
        MAX_SCORE.saturating_sub(total).max(self.floor)
    }

    pub fn breakdown(&self, events: &[Event]) -> ScoreBreakdown {
        let mut lines: Vec<DeductionLine> = Vec::new();
        for event in events {
            let label = event.kind.label();
            let points = self.table.deduction(&event.kind);
            match lines.iter_mut().find(|l| l.label == label) {
                Some(line) => {
                    line.count += 1;
                    line.subtotal = line.subtotal.saturating_add(points);
                }
                None => lines.push(DeductionLine {
                    label,
                    count: 1,
                    points_each: points,
                    subtotal: points,
                }),
            }
        }
        ScoreBreakdown {
            score: self.score(events),
            total_deduction: self.total_deduction(events),
            lines,
        }
    }

    fn total_deduction(&self, events: &[Event]) -> u32 {
        events
            .iter()
            .map(|e| self.table.deduction(&e.kind))
            .fold(0u32, u32::saturating_add)
    }
}

impl Default for IntegrityScorer {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}
