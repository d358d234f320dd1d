//! Which content view is on screen, and where completing a topic leads.

use crate::model::{Catalog, TopicId};

/// A content view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    /// Catalog overview; nothing selected.
    #[default]
    Home,
    ModuleOverview(String),
    Topic(TopicId),
    Quiz(TopicId),
    /// Licensing walkthrough or paginated document.
    EmbeddedGuide(TopicId),
}

impl View {
    /// The topic this view is about, if any.
    #[must_use]
    pub fn topic_id(&self) -> Option<&TopicId> {
        match self {
            View::Topic(id) | View::Quiz(id) | View::EmbeddedGuide(id) => Some(id),
            View::Home | View::ModuleOverview(_) => None,
        }
    }
}

/// Navigation state machine over a static catalog.
///
/// Unknown module or topic keys never fail; they land on [`View::Home`].
/// State is not persisted, a fresh navigator always starts at home.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    view: View,
    before_quiz: Option<View>,
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn go_home(&mut self) -> &View {
        self.set(View::Home)
    }

    pub fn select_module(&mut self, catalog: &Catalog, module: &str) -> &View {
        let next = if catalog.module(module).is_some() {
            View::ModuleOverview(module.to_string())
        } else {
            View::Home
        };
        self.set(next)
    }

    pub fn select_topic(&mut self, catalog: &Catalog, module: &str, topic: &str) -> &View {
        self.open(catalog, &TopicId::new(module, topic))
    }

    /// Open a topic by id: the embedded view for guide/document topics,
    /// the text view otherwise.
    pub fn open(&mut self, catalog: &Catalog, id: &TopicId) -> &View {
        let next = match catalog.resolve(id) {
            Some(topic) if topic.kind().is_embedded() => View::EmbeddedGuide(id.clone()),
            Some(_) => View::Topic(id.clone()),
            None => View::Home,
        };
        self.set(next)
    }

    #[must_use]
    pub fn can_start_quiz(catalog: &Catalog, id: &TopicId) -> bool {
        catalog.resolve(id).is_some_and(|topic| topic.has_quiz())
    }

    /// Enter the quiz of a topic, remembering the current view for
    /// [`Navigator::exit_quiz`].
    ///
    /// Returns false and leaves the view alone when the topic has no quiz.
    pub fn start_quiz(&mut self, catalog: &Catalog, id: &TopicId) -> bool {
        if !Self::can_start_quiz(catalog, id) {
            return false;
        }
        if !matches!(self.view, View::Quiz(_)) {
            self.before_quiz = Some(self.view.clone());
        }
        self.view = View::Quiz(id.clone());
        true
    }

    /// Leave the quiz for the view that was active when it started.
    pub fn exit_quiz(&mut self) -> &View {
        let back = self.before_quiz.take().unwrap_or_default();
        self.set(back)
    }

    /// Move past a finished topic: next topic in the module, else first
    /// topic of the next module, else home.
    ///
    /// Recording the completion is the caller's job.
    pub fn complete_topic(&mut self, catalog: &Catalog, id: &TopicId) -> &View {
        match catalog.next_topic_after(id) {
            Some(next) => self.open(catalog, &next),
            None => self.go_home(),
        }
    }

    fn set(&mut self, view: View) -> &View {
        self.before_quiz = None;
        self.view = view;
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GuideKind, Module, QuizQuestion, Topic, TopicKind};

    fn plain(key: &str) -> Topic {
        Topic::new(key, key, "", TopicKind::Plain)
    }

    fn catalog() -> Catalog {
        let quiz = Topic::new(
            "q1",
            "Quiz",
            "",
            TopicKind::Quiz {
                questions: vec![QuizQuestion::new("?", vec!["a".into(), "b".into()], 0).unwrap()],
            },
        );
        let guide = Topic::new(
            "guide",
            "Guide",
            "",
            TopicKind::EmbeddedGuide {
                guide: GuideKind::Licensing,
            },
        );
        Catalog::new(vec![
            Module::new("A", "A", vec![plain("t1"), plain("t2")]),
            Module::new("B", "B", vec![plain("t3")]),
            Module::new("C", "C", vec![quiz, guide]),
        ])
        .unwrap()
    }

    #[test]
    fn starts_at_home() {
        assert_eq!(Navigator::new().view(), &View::Home);
    }

    #[test]
    fn select_topic_addresses_exact_pair() {
        let catalog = catalog();
        let mut nav = Navigator::new();
        for module in catalog.modules() {
            for topic in module.topics() {
                let view = nav.select_topic(&catalog, module.key(), topic.key()).clone();
                assert_eq!(
                    view.topic_id(),
                    Some(&TopicId::new(module.key(), topic.key()))
                );
                assert!(matches!(view, View::Topic(_) | View::EmbeddedGuide(_)));
            }
        }
    }

    #[test]
    fn guide_topics_open_embedded() {
        let catalog = catalog();
        let mut nav = Navigator::new();
        assert_eq!(
            nav.select_topic(&catalog, "C", "guide"),
            &View::EmbeddedGuide(TopicId::new("C", "guide"))
        );
    }

    #[test]
    fn unknown_keys_fall_back_home() {
        let catalog = catalog();
        let mut nav = Navigator::new();
        nav.select_module(&catalog, "A");
        assert_eq!(nav.select_module(&catalog, "nope"), &View::Home);
        nav.select_module(&catalog, "A");
        assert_eq!(nav.select_topic(&catalog, "A", "nope"), &View::Home);
        assert_eq!(nav.select_topic(&catalog, "nope", "t1"), &View::Home);
    }

    #[test]
    fn completing_walks_the_catalog_then_home() {
        let catalog = catalog();
        let mut nav = Navigator::new();
        assert_eq!(
            nav.complete_topic(&catalog, &TopicId::new("A", "t1")),
            &View::Topic(TopicId::new("A", "t2"))
        );
        assert_eq!(
            nav.complete_topic(&catalog, &TopicId::new("A", "t2")),
            &View::Topic(TopicId::new("B", "t3"))
        );
        assert_eq!(
            nav.complete_topic(&catalog, &TopicId::new("C", "guide")),
            &View::Home
        );
    }

    #[test]
    fn quiz_needs_questions() {
        let catalog = catalog();
        let mut nav = Navigator::new();
        nav.select_topic(&catalog, "A", "t1");
        assert!(!nav.start_quiz(&catalog, &TopicId::new("A", "t1")));
        assert_eq!(nav.view(), &View::Topic(TopicId::new("A", "t1")));
    }

    #[test]
    fn exit_quiz_returns_to_launching_view() {
        let catalog = catalog();
        let mut nav = Navigator::new();
        let id = TopicId::new("C", "q1");
        nav.open(&catalog, &id);
        assert!(nav.start_quiz(&catalog, &id));
        assert_eq!(nav.view(), &View::Quiz(id.clone()));
        assert_eq!(nav.exit_quiz(), &View::Topic(id));
    }

    #[test]
    fn exit_quiz_without_history_goes_home() {
        let mut nav = Navigator::new();
        assert_eq!(nav.exit_quiz(), &View::Home);
    }
}
