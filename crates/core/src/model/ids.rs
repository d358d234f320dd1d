use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Separator between the module key and the topic key of a [`TopicId`].
pub const TOPIC_ID_SEPARATOR: char = '-';

/// Composite identifier addressing one topic within one module.
///
/// Renders as `"<module>-<topic>"`. Module keys never contain the separator
/// (the catalog rejects them at load time), so parsing splits at the first `-`
/// and topic keys are free to contain dashes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicId {
    module: String,
    topic: String,
}

impl TopicId {
    /// Creates a new `TopicId`
    #[must_use]
    pub fn new(module: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            topic: topic.into(),
        }
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Storage key of the in-progress quiz draft for this topic.
    #[must_use]
    pub fn quiz_draft_key(&self) -> String {
        format!("quiz-{self}")
    }
}

impl fmt::Debug for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicId({self})")
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{TOPIC_ID_SEPARATOR}{}", self.module, self.topic)
    }
}

/// Error type for parsing a [`TopicId`] from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicIdError {
    raw: String,
}

impl fmt::Display for TopicIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse topic id from {:?}", self.raw)
    }
}

impl std::error::Error for TopicIdError {}

impl FromStr for TopicId {
    type Err = TopicIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(TOPIC_ID_SEPARATOR) {
            Some((module, topic)) if !module.is_empty() && !topic.is_empty() => {
                Ok(Self::new(module, topic))
            }
            _ => Err(TopicIdError { raw: s.to_string() }),
        }
    }
}

// Persisted as the plain composite string, e.g. `"technical-antennas"`.
impl Serialize for TopicId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TopicId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_id_display() {
        let id = TopicId::new("technical", "antennas");
        assert_eq!(id.to_string(), "technical-antennas");
    }

    #[test]
    fn test_topic_id_from_str_keeps_dashes_in_topic() {
        let id: TopicId = "regulatory-amateur-service".parse().unwrap();
        assert_eq!(id.module(), "regulatory");
        assert_eq!(id.topic(), "amateur-service");
    }

    #[test]
    fn test_topic_id_from_str_invalid() {
        assert!("overview".parse::<TopicId>().is_err());
        assert!("-antennas".parse::<TopicId>().is_err());
        assert!("technical-".parse::<TopicId>().is_err());
    }

    #[test]
    fn test_quiz_draft_key() {
        let id = TopicId::new("safety", "rf-exposure");
        assert_eq!(id.quiz_draft_key(), "quiz-safety-rf-exposure");
    }

    #[test]
    fn test_topic_id_serializes_as_string() {
        let id = TopicId::new("A", "t1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"A-t1\"");
        let back: TopicId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
