use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{TOPIC_ID_SEPARATOR, TopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog keys cannot be empty")]
    EmptyKey,

    #[error("module key {key:?} cannot contain '-'")]
    SeparatorInModuleKey { key: String },

    #[error("duplicate module key {key:?}")]
    DuplicateModule { key: String },

    #[error("duplicate topic key {key:?} in module {module:?}")]
    DuplicateTopic { module: String, key: String },

    #[error("quiz question needs at least 2 options, got {count}")]
    TooFewOptions { count: usize },

    #[error("correct option {correct} is out of bounds for {count} options")]
    CorrectOutOfBounds { correct: usize, count: usize },

    #[error("quiz topic {id} has no questions")]
    EmptyQuiz { id: TopicId },

    #[error("malformed catalog: {0}")]
    Malformed(String),
}

//
// ─── QUIZ QUESTIONS ────────────────────────────────────────────────────────────
//

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(rename = "q")]
    prompt: String,
    options: Vec<String>,
    correct: usize,
}

impl QuizQuestion {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if fewer than two options are given or the
    /// correct index does not address one of them.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: usize,
    ) -> Result<Self, CatalogError> {
        let question = Self {
            prompt: prompt.into(),
            options,
            correct,
        };
        question.validate()?;
        Ok(question)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let count = self.options.len();
        if count < 2 {
            return Err(CatalogError::TooFewOptions { count });
        }
        if self.correct >= count {
            return Err(CatalogError::CorrectOutOfBounds {
                correct: self.correct,
                count,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }
}

//
// ─── EXTENDED DATA ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationStatus {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub band: String,
    pub freq: String,
    pub power: String,
    pub status: AllocationStatus,
    pub maritime: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    #[serde(default)]
    pub hf_primary: Vec<FrequencyBand>,
    #[serde(default)]
    pub hf_secondary: Vec<FrequencyBand>,
    #[serde(default)]
    pub vhf_uhf: Vec<FrequencyBand>,
}

impl FrequencyTable {
    /// All rows in table order.
    pub fn rows(&self) -> impl Iterator<Item = &FrequencyBand> {
        self.hf_primary
            .iter()
            .chain(&self.hf_secondary)
            .chain(&self.vhf_uhf)
    }

    /// Bands where maritime mobile operation is permitted.
    pub fn maritime(&self) -> impl Iterator<Item = &FrequencyBand> {
        self.rows().filter(|row| row.maritime)
    }
}

/// Structured data attached to a topic next to its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendedData {
    FrequencyBands(FrequencyTable),
}

//
// ─── TOPICS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideKind {
    /// Step-by-step walkthrough of the online licensing process.
    Licensing,
}

/// What a topic is, decided once when the catalog is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TopicKind {
    #[default]
    Plain,
    Quiz {
        questions: Vec<QuizQuestion>,
    },
    EmbeddedGuide {
        guide: GuideKind,
    },
    PaginatedDocument {
        pages: Vec<String>,
    },
}

impl TopicKind {
    /// True for topics that open as an embedded sub-view instead of text.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(
            self,
            TopicKind::EmbeddedGuide { .. } | TopicKind::PaginatedDocument { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    key: String,
    title: String,
    content: String,
    #[serde(default)]
    kind: TopicKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extended: Option<ExtendedData>,
}

impl Topic {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        kind: TopicKind,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            content: content.into(),
            kind,
            extended: None,
        }
    }

    #[must_use]
    pub fn with_extended(mut self, extended: ExtendedData) -> Self {
        self.extended = Some(extended);
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn kind(&self) -> &TopicKind {
        &self.kind
    }

    #[must_use]
    pub fn extended(&self) -> Option<&ExtendedData> {
        self.extended.as_ref()
    }

    /// Quiz questions, empty unless this is a quiz topic.
    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        match &self.kind {
            TopicKind::Quiz { questions } => questions,
            _ => &[],
        }
    }

    #[must_use]
    pub fn has_quiz(&self) -> bool {
        !self.questions().is_empty()
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}

//
// ─── MODULES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    key: String,
    title: String,
    /// Presentational tag (icon name); ignored by the core.
    #[serde(default)]
    category: String,
    topics: Vec<Topic>,
}

impl Module {
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>, topics: Vec<Topic>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            category: String::new(),
            topics,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Topics in definition order.
    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    #[must_use]
    pub fn topic(&self, key: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.key == key)
    }

    pub fn topic_ids(&self) -> impl Iterator<Item = TopicId> + '_ {
        self.topics
            .iter()
            .map(|topic| TopicId::new(self.key.as_str(), topic.key.as_str()))
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The static module → topic content tree, in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    modules: Vec<Module>,
}

impl Catalog {
    /// Builds a catalog after checking every key and quiz invariant.
    ///
    /// # Errors
    ///
    /// Returns the first `CatalogError` found.
    pub fn new(modules: Vec<Module>) -> Result<Self, CatalogError> {
        let catalog = Self { modules };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The bundled HAREC catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled data is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        crate::builtin::catalog()
    }

    /// Parses and validates a JSON catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Malformed` for JSON errors, or the first
    /// invariant violation.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog =
            serde_json::from_str(raw).map_err(|err| CatalogError::Malformed(err.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut module_keys = HashSet::new();
        for module in &self.modules {
            if module.key.trim().is_empty() {
                return Err(CatalogError::EmptyKey);
            }
            if module.key.contains(TOPIC_ID_SEPARATOR) {
                return Err(CatalogError::SeparatorInModuleKey {
                    key: module.key.clone(),
                });
            }
            if !module_keys.insert(module.key.as_str()) {
                return Err(CatalogError::DuplicateModule {
                    key: module.key.clone(),
                });
            }

            let mut topic_keys = HashSet::new();
            for topic in &module.topics {
                if topic.key.trim().is_empty() {
                    return Err(CatalogError::EmptyKey);
                }
                if !topic_keys.insert(topic.key.as_str()) {
                    return Err(CatalogError::DuplicateTopic {
                        module: module.key.clone(),
                        key: topic.key.clone(),
                    });
                }
                if let TopicKind::Quiz { questions } = &topic.kind {
                    if questions.is_empty() {
                        return Err(CatalogError::EmptyQuiz {
                            id: TopicId::new(module.key.as_str(), topic.key.as_str()),
                        });
                    }
                    for question in questions {
                        question.validate()?;
                    }
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, key: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.key == key)
    }

    #[must_use]
    pub fn topic(&self, module: &str, topic: &str) -> Option<&Topic> {
        self.module(module)?.topic(topic)
    }

    #[must_use]
    pub fn resolve(&self, id: &TopicId) -> Option<&Topic> {
        self.topic(id.module(), id.topic())
    }

    #[must_use]
    pub fn contains(&self, id: &TopicId) -> bool {
        self.resolve(id).is_some()
    }

    /// Every topic id, modules and topics in definition order.
    pub fn topic_ids(&self) -> impl Iterator<Item = TopicId> + '_ {
        self.modules.iter().flat_map(Module::topic_ids)
    }

    /// Topic ids of one module in definition order; empty for unknown keys.
    #[must_use]
    pub fn module_topic_ids(&self, module: &str) -> Vec<TopicId> {
        self.module(module)
            .map(|module| module.topic_ids().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.modules.iter().map(|module| module.topics.len()).sum()
    }

    /// Next topic in definition order: the following topic of the same
    /// module, else the first topic of the following module.
    ///
    /// Returns `None` at the end of the catalog, for unknown ids, and when
    /// the following module has no topics.
    #[must_use]
    pub fn next_topic_after(&self, id: &TopicId) -> Option<TopicId> {
        let module_idx = self.modules.iter().position(|m| m.key == id.module())?;
        let module = &self.modules[module_idx];
        let topic_idx = module.topics.iter().position(|t| t.key == id.topic())?;

        if let Some(next) = module.topics.get(topic_idx + 1) {
            return Some(TopicId::new(module.key.as_str(), next.key.as_str()));
        }

        let next_module = self.modules.get(module_idx + 1)?;
        next_module
            .topics
            .first()
            .map(|topic| TopicId::new(next_module.key.as_str(), topic.key.as_str()))
    }

    /// Topics of a module whose title or content contains `term`,
    /// ignoring case. A blank term matches every topic.
    #[must_use]
    pub fn search(&self, module: &str, term: &str) -> Vec<&Topic> {
        let Some(module) = self.module(module) else {
            return Vec::new();
        };
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return module.topics.iter().collect();
        }
        module
            .topics
            .iter()
            .filter(|topic| topic.matches(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> QuizQuestion {
        QuizQuestion::new("Q?", vec!["a".into(), "b".into(), "c".into()], correct).unwrap()
    }

    fn plain(key: &str) -> Topic {
        Topic::new(key, key.to_uppercase(), format!("about {key}"), TopicKind::Plain)
    }

    fn sample() -> Catalog {
        Catalog::new(vec![
            Module::new("A", "Module A", vec![plain("t1"), plain("t2")]),
            Module::new("B", "Module B", vec![plain("t3")]),
        ])
        .unwrap()
    }

    #[test]
    fn question_rejects_single_option() {
        let err = QuizQuestion::new("Q", vec!["only".into()], 0).unwrap_err();
        assert_eq!(err, CatalogError::TooFewOptions { count: 1 });
    }

    #[test]
    fn question_rejects_correct_out_of_bounds() {
        let err = QuizQuestion::new("Q", vec!["a".into(), "b".into()], 2).unwrap_err();
        assert_eq!(err, CatalogError::CorrectOutOfBounds { correct: 2, count: 2 });
    }

    #[test]
    fn module_key_with_separator_is_rejected() {
        let err = Catalog::new(vec![Module::new("a-b", "Bad", vec![])]).unwrap_err();
        assert!(matches!(err, CatalogError::SeparatorInModuleKey { .. }));
    }

    #[test]
    fn duplicate_topic_is_rejected() {
        let err = Catalog::new(vec![Module::new("A", "A", vec![plain("t1"), plain("t1")])])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTopic { .. }));
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let topic = Topic::new("t1", "T", "", TopicKind::Quiz { questions: vec![] });
        let err = Catalog::new(vec![Module::new("A", "A", vec![topic])]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyQuiz { .. }));
    }

    #[test]
    fn topic_ids_follow_definition_order() {
        let ids: Vec<String> = sample().topic_ids().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["A-t1", "A-t2", "B-t3"]);
    }

    #[test]
    fn next_topic_walks_modules_in_order() {
        let catalog = sample();
        assert_eq!(
            catalog.next_topic_after(&TopicId::new("A", "t1")),
            Some(TopicId::new("A", "t2"))
        );
        assert_eq!(
            catalog.next_topic_after(&TopicId::new("A", "t2")),
            Some(TopicId::new("B", "t3"))
        );
        assert_eq!(catalog.next_topic_after(&TopicId::new("B", "t3")), None);
        assert_eq!(catalog.next_topic_after(&TopicId::new("Z", "t3")), None);
    }

    #[test]
    fn next_topic_stops_at_empty_following_module() {
        let catalog = Catalog::new(vec![
            Module::new("A", "A", vec![plain("t1")]),
            Module::new("B", "B", vec![]),
            Module::new("C", "C", vec![plain("t2")]),
        ])
        .unwrap();
        assert_eq!(catalog.next_topic_after(&TopicId::new("A", "t1")), None);
    }

    #[test]
    fn search_matches_title_or_content_ignoring_case() {
        let catalog = sample();
        let hits = catalog.search("A", "ABOUT T2");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key(), "t2");
        assert_eq!(catalog.search("A", "  ").len(), 2);
        assert!(catalog.search("missing", "t1").is_empty());
    }

    #[test]
    fn from_json_reads_tagged_topic_kinds() {
        let raw = r#"{
            "modules": [{
                "key": "m",
                "title": "M",
                "topics": [
                    {"key": "plain", "title": "P", "content": "text"},
                    {"key": "quiz", "title": "Q", "content": "text",
                     "kind": {"type": "quiz", "questions": [{"q": "?", "options": ["x", "y"], "correct": 1}]}},
                    {"key": "guide", "title": "G", "content": "text",
                     "kind": {"type": "embedded_guide", "guide": "licensing"}}
                ]
            }]
        }"#;
        let catalog = Catalog::from_json(raw).unwrap();
        let module = catalog.module("m").unwrap();
        assert_eq!(module.topics()[0].kind(), &TopicKind::Plain);
        assert_eq!(module.topics()[1].questions().len(), 1);
        assert!(module.topics()[2].kind().is_embedded());
    }

    #[test]
    fn from_json_validates_questions() {
        let raw = r#"{"modules": [{"key": "m", "title": "M", "topics": [
            {"key": "q", "title": "Q", "content": "",
             "kind": {"type": "quiz", "questions": [{"q": "?", "options": ["x", "y"], "correct": 5}]}}
        ]}]}"#;
        assert!(matches!(
            Catalog::from_json(raw),
            Err(CatalogError::CorrectOutOfBounds { .. })
        ));
        assert!(matches!(
            Catalog::from_json("not json"),
            Err(CatalogError::Malformed(_))
        ));
    }

    #[test]
    fn quiz_topic_exposes_questions() {
        let topic = Topic::new(
            "q",
            "Q",
            "",
            TopicKind::Quiz {
                questions: vec![question(0), question(2)],
            },
        );
        assert!(topic.has_quiz());
        assert_eq!(topic.questions()[1].correct(), 2);
        assert!(!plain("p").has_quiz());
    }

    #[test]
    fn module_topic_ids_keep_definition_order() {
        let catalog = sample();
        assert_eq!(
            catalog.module_topic_ids("A"),
            vec![TopicId::new("A", "t1"), TopicId::new("A", "t2")]
        );
        assert!(catalog.module_topic_ids("Z").is_empty());
    }

    #[test]
    fn builtin_catalog_loads_through_catalog() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.modules()[0].key(), "regulatory");
        assert!(catalog.contains(&TopicId::new("technical", "frequency-bands")));
    }
}
