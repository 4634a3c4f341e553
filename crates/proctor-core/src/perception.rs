//! Perception boundary.
//!
//! Face-landmark estimation and object classification run outside this
//! crate. The monitor only sees their results through [`PerceptionPort`],
//! and frames through [`FrameSource`], so sessions can be driven by
//! deterministic fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PerceptionError;

pub const NOSE_TIP: &str = "noseTip";
pub const LEFT_EYE: &str = "leftEye";
pub const RIGHT_EYE: &str = "rightEye";

/// A named 2-D landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }
}

/// One anonymous face detected in the current frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

impl FaceObservation {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    pub fn keypoint(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|k| k.name == name)
    }

    /// Horizontal distance of the nose tip from the eye midpoint.
    ///
    /// `None` when any of the three landmarks is missing.
    pub fn horizontal_offset(&self) -> Option<f64> {
        let nose = self.keypoint(NOSE_TIP)?;
        let left = self.keypoint(LEFT_EYE)?;
        let right = self.keypoint(RIGHT_EYE)?;
        let eye_midpoint = (left.x + right.x) / 2.0;
        Some(nose.x - eye_midpoint)
    }
}

/// One classified object in the current frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectObservation {
    #[serde(rename = "class")]
    pub object_class: String,
    pub score: f64,
}

impl ObjectObservation {
    pub fn new(object_class: impl Into<String>, score: f64) -> Self {
        Self {
            object_class: object_class.into(),
            score,
        }
    }
}

/// One scheduler tick's worth of perception results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub faces: Vec<FaceObservation>,
    #[serde(default)]
    pub objects: Vec<ObjectObservation>,
}

impl Sample {
    pub fn new(faces: Vec<FaceObservation>, objects: Vec<ObjectObservation>) -> Self {
        Self { faces, objects }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Canonical form of an object class name: lowercase ASCII alphanumerics.
///
/// `"cell phone"`, `"cellPhone"` and `"cell_phone"` all become `"cellphone"`.
pub fn normalize_class(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Source of the current video frame.
pub trait FrameSource: Send {
    type Frame: Send + Sync;

    /// The most recent frame, or `None` while the stream is not ready.
    fn current_frame(&mut self) -> Option<Self::Frame>;
}

/// Face-landmark and object-classification capabilities.
#[async_trait]
pub trait PerceptionPort: Send + Sync {
    type Frame: Send + Sync;

    async fn estimate_faces(
        &self,
        frame: &Self::Frame,
    ) -> Result<Vec<FaceObservation>, PerceptionError>;

    async fn detect_objects(
        &self,
        frame: &Self::Frame,
    ) -> Result<Vec<ObjectObservation>, PerceptionError>;
}
