//! Persisted script artifact and its JSON serialization.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::{Action, Error, Result, Timeline};

/// Format version written into every artifact.
pub const SCRIPT_VERSION: &str = "1.0";

/// Position range advertised by every artifact.
pub const SCRIPT_RANGE: u8 = 100;

/// Descriptive labels attached to a generated script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptLabels {
    /// Human readable title.
    pub title: String,
    /// Longer free-form description.
    pub description: String,
    /// Author credited in the artifact.
    pub creator: String,
    /// Search tags.
    pub tags: Vec<String>,
}

impl Default for ScriptLabels {
    fn default() -> Self {
        Self {
            title: "30-Minute Slow Session".to_owned(),
            description: "Slow script with fluid motions, speed variations, and full-range cycles"
                .to_owned(),
            creator: "Auto-generated".to_owned(),
            tags: vec![
                "slow".to_owned(),
                "teasing".to_owned(),
                "30-minutes".to_owned(),
            ],
        }
    }
}

/// Summary attached to a finished timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Human readable title.
    pub title: String,
    /// Longer free-form description.
    pub description: String,
    /// Target session length in milliseconds.
    ///
    /// The final keyframe may land slightly past this value because the
    /// last segment is allowed to overshoot.
    pub duration: u64,
    /// Total absolute position distance divided by elapsed seconds, truncated.
    pub average_speed: u32,
    /// Author credited in the artifact.
    pub creator: String,
    /// Search tags.
    pub tags: Vec<String>,
}

impl Metadata {
    /// Derives the metadata for a timeline generated for `duration_ms`.
    #[must_use]
    pub fn describe(timeline: &Timeline, labels: ScriptLabels, duration_ms: u64) -> Self {
        Self {
            title: labels.title,
            description: labels.description,
            duration: duration_ms,
            average_speed: timeline.average_speed(),
            creator: labels.creator,
            tags: labels.tags,
        }
    }
}

/// Complete artifact persisted at the system boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Format version, always [`SCRIPT_VERSION`] for written artifacts.
    pub version: String,
    /// Whether consumers should mirror positions.
    pub inverted: bool,
    /// Position range, always [`SCRIPT_RANGE`] for written artifacts.
    pub range: u8,
    /// Derived summary of the timeline.
    pub metadata: Metadata,
    /// Ordered keyframes.
    pub actions: Vec<Action>,
}

impl Script {
    /// Packages a finalized timeline generated for `duration_ms` into an
    /// artifact.
    #[must_use]
    pub fn from_timeline(timeline: Timeline, labels: ScriptLabels, duration_ms: u64) -> Self {
        let metadata = Metadata::describe(&timeline, labels, duration_ms);
        Self {
            version: SCRIPT_VERSION.to_owned(),
            inverted: false,
            range: SCRIPT_RANGE,
            metadata,
            actions: timeline.into_actions(),
        }
    }

    /// Parses an artifact from a JSON document.
    ///
    /// Only the schema is checked here; ordering invariants are enforced by
    /// [`Script::timeline`], so analysis can still report exactly why a short
    /// or unsorted input is unusable.
    pub fn from_json_str(document: &str) -> Result<Self> {
        serde_json::from_str(document).map_err(|error| Error::MalformedArtifact(error.to_string()))
    }

    /// Reads an artifact from a reader containing a JSON document.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|error| {
            if error.is_io() {
                Error::Io(error.into())
            } else {
                Error::MalformedArtifact(error.to_string())
            }
        })
    }

    /// Writes the artifact as indented JSON.
    pub fn write_pretty<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self).map_err(|error| {
            if error.is_io() {
                Error::Io(error.into())
            } else {
                Error::MalformedArtifact(error.to_string())
            }
        })?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Validates the keyframes and returns them as a [`Timeline`].
    pub fn timeline(&self) -> Result<Timeline> {
        Timeline::new(self.actions.clone())
    }
}
