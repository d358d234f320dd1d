//! Line-oriented study shell.

use services::{ChatSession, QuizSessionError, StudyServices};
use study_core::View;
use study_core::model::{
    AccessibilityAction, FontSize, LetterSpacing, LineHeight, LicensingGuide, PageCursor,
    QuizError, ReadingSettingsPatch, Theme, TopicId, TopicKind,
};

use crate::render;

pub const HELP: &str = "\
Commands:
  home                     catalog overview
  module <m>               open a module
  topic <m-t> | <m> <t>    open a topic
  quiz                     start the quiz of the open topic
  answer <q> <o>           pick option <o> for question <q> (1-based)
  submit | retry | exit    finish, restart or leave the quiz
  complete                 mark the open topic done and move on
  bookmark                 toggle a bookmark on the open topic
  progress                 completion summary
  search <m> <term>        search a module
  page next|prev|<n>       move through a document
  guide [licence]          licensing walkthrough
  ask <question>           ask the study assistant
  prefs [<key> <value>]    show or change accessibility preferences
  quit";

/// Result of one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

pub struct Shell {
    services: StudyServices,
    guide: Option<LicensingGuide>,
    page: Option<(TopicId, PageCursor)>,
    chat: Option<ChatSession>,
}

impl Shell {
    #[must_use]
    pub fn new(services: StudyServices, guide: Option<LicensingGuide>) -> Self {
        Self {
            services,
            guide,
            page: None,
            chat: None,
        }
    }

    #[cfg(test)]
    fn services(&self) -> &StudyServices {
        &self.services
    }

    /// Run one input line.
    pub async fn execute(&mut self, line: &str) -> Reply {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        log::debug!("shell command {command:?}");

        let text = match command {
            "" => return Reply::text(String::new()),
            "help" | "?" => HELP.to_string(),
            "quit" | "q" => {
                return Reply {
                    text: "Bye!".into(),
                    quit: true,
                };
            }
            "home" => {
                self.services.study_mut().go_home();
                self.render_view()
            }
            "module" => {
                self.services.study_mut().select_module(rest);
                self.render_view()
            }
            "topic" => self.open_topic(rest),
            "quiz" => self.start_quiz().await,
            "answer" => self.answer(rest),
            "submit" => self.submit().await,
            "retry" => match self.services.study_mut().retry_quiz().await {
                Ok(()) => self.render_view(),
                Err(err) => err.to_string(),
            },
            "exit" => {
                if matches!(self.services.study().view(), View::Quiz(_)) {
                    self.services.study_mut().exit_quiz();
                    self.render_view()
                } else {
                    "No quiz is active.".into()
                }
            }
            "complete" => self.complete().await,
            "bookmark" => self.bookmark().await,
            "progress" => {
                let study = self.services.study();
                render::progress(study.catalog(), study.tracker())
            }
            "search" => self.search(rest),
            "page" => self.page(rest),
            "guide" => self.guide(rest),
            "ask" => self.ask(rest).await,
            "prefs" => self.prefs(rest).await,
            other => format!("Unknown command `{other}`. Type `help`."),
        };
        Reply::text(text)
    }

    fn current_topic(&self) -> Option<TopicId> {
        self.services.study().view().topic_id().cloned()
    }

    fn render_view(&mut self) -> String {
        let study = self.services.study();
        let catalog = study.catalog();
        match study.view().clone() {
            View::Home => render::home(catalog, study.tracker()),
            View::ModuleOverview(key) => match catalog.module(&key) {
                Some(module) => render::module(module, catalog, study.tracker()),
                None => render::home(catalog, study.tracker()),
            },
            View::Topic(id) => match catalog.resolve(&id) {
                Some(topic) => render::topic(&id, topic, study.tracker()),
                None => render::home(catalog, study.tracker()),
            },
            View::Quiz(_) => study.quiz().map(render::quiz).unwrap_or_default(),
            View::EmbeddedGuide(id) => {
                let Some(topic) = catalog.resolve(&id) else {
                    return render::home(catalog, study.tracker());
                };
                match topic.kind() {
                    TopicKind::PaginatedDocument { pages } => {
                        let cursor = match &self.page {
                            Some((open, cursor)) if *open == id => *cursor,
                            _ => PageCursor::new(pages.len()),
                        };
                        let text = render::document_page(topic.title(), pages, &cursor);
                        self.page = Some((id, cursor));
                        text
                    }
                    _ => {
                        let intro = render::topic(&id, topic, study.tracker());
                        match &self.guide {
                            Some(guide) => format!("{intro}\n\n{}", render::guide(guide)),
                            None => intro,
                        }
                    }
                }
            }
        }
    }

    fn open_topic(&mut self, args: &str) -> String {
        let mut parts = args.split_whitespace();
        let study = self.services.study_mut();
        match (parts.next(), parts.next()) {
            (Some(module), Some(topic)) => {
                study.select_topic(module, topic);
            }
            (Some(raw), None) => match raw.parse::<TopicId>() {
                Ok(id) => {
                    study.open(&id);
                }
                Err(_) => {
                    study.go_home();
                }
            },
            _ => return "Usage: topic <module-topic>".into(),
        }
        self.render_view()
    }

    async fn start_quiz(&mut self) -> String {
        let Some(id) = self.current_topic() else {
            return "Open a topic first.".into();
        };
        match self.services.study_mut().start_quiz(&id).await {
            Ok(session) => render::quiz(session),
            Err(err) => err.to_string(),
        }
    }

    fn answer(&mut self, args: &str) -> String {
        let mut numbers = args.split_whitespace().map(str::parse::<usize>);
        let (Some(Ok(question)), Some(Ok(option))) = (numbers.next(), numbers.next()) else {
            return "Usage: answer <question> <option>".into();
        };
        if question == 0 || option == 0 {
            return "Questions and options are numbered from 1.".into();
        }
        match self
            .services
            .study_mut()
            .answer(question - 1, option - 1)
        {
            Ok(()) => self.render_view(),
            Err(QuizSessionError::Quiz(QuizError::AlreadySubmitted)) => {
                "Quiz already submitted; `retry` to answer again.".into()
            }
            Err(err) => err.to_string(),
        }
    }

    async fn submit(&mut self) -> String {
        match self.services.study_mut().submit_quiz().await {
            Ok((result, _)) => format!("{}\n\n{}", self.render_view(), render::quiz_result(&result)),
            Err(QuizSessionError::Quiz(QuizError::Incomplete { answered, total })) => {
                format!("Answer every question first ({answered}/{total} answered).")
            }
            Err(err) => err.to_string(),
        }
    }

    async fn complete(&mut self) -> String {
        let Some(id) = self.current_topic() else {
            return "Open a topic first.".into();
        };
        self.services.study_mut().complete_topic(&id).await;
        format!("Completed {id}.\n\n{}", self.render_view())
    }

    async fn bookmark(&mut self) -> String {
        let Some(id) = self.current_topic() else {
            return "Open a topic first.".into();
        };
        if self.services.study_mut().toggle_bookmark(&id).await {
            format!("Bookmarked {id}.")
        } else {
            format!("Removed bookmark from {id}.")
        }
    }

    fn search(&self, args: &str) -> String {
        let (module, term) = args.split_once(' ').unwrap_or((args, ""));
        if module.is_empty() {
            return "Usage: search <module> <term>".into();
        }
        let catalog = self.services.study().catalog();
        if catalog.module(module).is_none() {
            return format!("No module `{module}`.");
        }
        render::topic_list(module, catalog.search(module, term))
    }

    fn page(&mut self, args: &str) -> String {
        let Some((_, cursor)) = self.page.as_mut() else {
            return "No document is open.".into();
        };
        match args {
            "next" | "n" => cursor.next(),
            "prev" | "p" => cursor.previous(),
            raw => match raw.parse::<usize>() {
                Ok(page) => cursor.go_to(page),
                Err(_) => return "Usage: page next|prev|<n>".into(),
            },
        }
        if !matches!(self.services.study().view(), View::EmbeddedGuide(_)) {
            self.page = None;
            return "No document is open.".into();
        }
        self.render_view()
    }

    fn guide(&self, args: &str) -> String {
        let Some(guide) = &self.guide else {
            return "The licensing guide is not available.".into();
        };
        if args.is_empty() {
            return render::guide(guide);
        }
        let wanted = args.to_lowercase();
        guide
            .licence_types
            .iter()
            .find(|licence| licence.name.to_lowercase().contains(&wanted))
            .map_or_else(
                || format!("No licence matching `{args}`. Known: {}", guide.licence_names().join(", ")),
                render::licence,
            )
    }

    async fn ask(&mut self, question: &str) -> String {
        if !self.services.assistant_enabled() {
            return "The study assistant is off. Set STUDY_AI_API_KEY to enable it.".into();
        }
        if question.is_empty() {
            return "Usage: ask <question>".into();
        }
        let topic = self
            .current_topic()
            .and_then(|id| self.services.study().catalog().resolve(&id))
            .map(|topic| topic.title().to_string());

        let mut lines = Vec::new();
        let reopen = match &self.chat {
            Some(chat) => chat.topic_title().map(str::to_string) != topic,
            None => true,
        };
        if reopen {
            let chat = self.services.open_chat();
            lines.extend(chat.messages().iter().map(render::chat_message));
            self.chat = Some(chat);
        }
        if let Some(chat) = self.chat.as_mut() {
            if let Some(reply) = chat.send(question).await {
                lines.push(render::chat_message(reply));
            }
        }
        lines.join("\n")
    }

    async fn prefs(&mut self, args: &str) -> String {
        if args.is_empty() {
            return render::prefs(self.services.accessibility().prefs());
        }
        let (key, value) = args.split_once(' ').unwrap_or((args, ""));
        let Some(action) = parse_pref(key, value.trim()) else {
            return "Usage: prefs motion|contrast|simple|focus on|off, theme default|calm, \
                    font medium|large, line normal|relaxed, spacing normal|wide, autosave <ms>"
                .into();
        };
        let prefs = self.services.update_accessibility(action).await;
        render::prefs(&prefs)
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_pref(key: &str, value: &str) -> Option<AccessibilityAction> {
    let reading = |patch: ReadingSettingsPatch| Some(AccessibilityAction::SetReadingSettings(patch));
    match key {
        "motion" => parse_switch(value).map(AccessibilityAction::SetReducedMotion),
        "contrast" => parse_switch(value).map(AccessibilityAction::SetHighContrast),
        "simple" => parse_switch(value).map(AccessibilityAction::SetSimplifiedUi),
        "focus" => parse_switch(value).map(AccessibilityAction::SetEnhancedFocus),
        "theme" => match value {
            "default" => Some(AccessibilityAction::SetTheme(Theme::Default)),
            "calm" => Some(AccessibilityAction::SetTheme(Theme::Calm)),
            _ => None,
        },
        "font" => {
            let size = match value {
                "medium" => FontSize::Medium,
                "large" => FontSize::Large,
                _ => return None,
            };
            reading(ReadingSettingsPatch {
                font_size: Some(size),
                ..ReadingSettingsPatch::default()
            })
        }
        "line" => {
            let height = match value {
                "normal" => LineHeight::Normal,
                "relaxed" => LineHeight::Relaxed,
                _ => return None,
            };
            reading(ReadingSettingsPatch {
                line_height: Some(height),
                ..ReadingSettingsPatch::default()
            })
        }
        "spacing" => {
            let spacing = match value {
                "normal" => LetterSpacing::Normal,
                "wide" => LetterSpacing::Wide,
                _ => return None,
            };
            reading(ReadingSettingsPatch {
                letter_spacing: Some(spacing),
                ..ReadingSettingsPatch::default()
            })
        }
        "autosave" => value
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .map(AccessibilityAction::SetAutoSaveFrequency),
        _ => None,
    }
}
