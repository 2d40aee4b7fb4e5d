//! Artifact tags.

use qovery_core::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of every artifact tag.
pub const TAG_LENGTH: usize = 7;

/// Name prefix of preview environments.
pub const PREVIEW_PREFIX: &str = "preview-";

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Tag of a published image: exactly seven characters from `[a-z0-9]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactTag(String);

impl ArtifactTag {
    /// Validate and wrap a tag.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let valid = value.len() == TAG_LENGTH
            && value
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
        if valid {
            Ok(Self(value))
        } else {
            Err(Error::configuration(format!(
                "invalid artifact tag '{value}': expected {TAG_LENGTH} characters from [a-z0-9]"
            )))
        }
    }

    /// The tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the preview environment deployed for this tag.
    #[must_use]
    pub fn preview_environment(&self) -> String {
        format!("{PREVIEW_PREFIX}{}", self.0)
    }
}

impl fmt::Display for ArtifactTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ArtifactTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ArtifactTag {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<ArtifactTag> for String {
    fn from(tag: ArtifactTag) -> Self {
        tag.0
    }
}

/// Source of fresh artifact tags.
pub trait TagGenerator: Send + Sync {
    /// Produce the tag for the next publish.
    fn generate(&self) -> Result<ArtifactTag>;
}

/// Uniformly random tags from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTag;

impl TagGenerator for RandomTag {
    fn generate(&self) -> Result<ArtifactTag> {
        let mut rng = rand::rng();
        let tag: String = (0..TAG_LENGTH)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        ArtifactTag::parse(tag)
    }
}

/// Always the same tag; for replaying a known publish.
#[derive(Debug, Clone)]
pub struct FixedTag(ArtifactTag);

impl FixedTag {
    /// Generator returning `tag` every time.
    #[must_use]
    pub fn new(tag: ArtifactTag) -> Self {
        Self(tag)
    }
}

impl TagGenerator for FixedTag {
    fn generate(&self) -> Result<ArtifactTag> {
        Ok(self.0.clone())
    }
}
