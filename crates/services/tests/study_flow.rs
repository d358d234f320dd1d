use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use services::{
    Assistant, AssistantError, ChatRole, Clock, StudyOptions, StudyServices,
};
use storage::repository::Storage;
use study_core::View;
use study_core::model::{AccessibilityAction, Catalog, TopicId};
use study_core::time::fixed_now;

struct EchoAssistant;

#[async_trait]
impl Assistant for EchoAssistant {
    async fn send_prompt(
        &self,
        _context: Option<&str>,
        message: &str,
    ) -> Result<String, AssistantError> {
        Ok(format!("echo: {message}"))
    }
}

async fn services(url: &str, delay_ms: u64) -> StudyServices {
    let storage = Storage::sqlite(url).await.expect("connect sqlite");
    StudyServices::with_assistant(
        storage,
        Clock::fixed(fixed_now()),
        Catalog::builtin().expect("bundled catalog"),
        StudyOptions {
            autosave_delay: Some(Duration::from_millis(delay_ms)),
            prefers_reduced_motion: false,
        },
        Arc::new(EchoAssistant),
    )
    .await
}

#[tokio::test]
async fn progress_survives_restart() {
    let url = "sqlite:file:memdb_study_restart?mode=memory&cache=shared";
    let mut first = services(url, 50).await;
    let study = first.study_mut();

    let id = TopicId::new("regulatory", "call-signs");
    study.open(&id);
    let next = study.complete_topic(&id).await.clone();
    assert_eq!(next, View::EmbeddedGuide(TopicId::new("elicensing", "comreg-guide")));
    assert!(study.toggle_bookmark(&id).await);
    let progress = study.overall_progress();
    assert!(progress > 0);

    let second = services(url, 50).await;
    assert_eq!(second.study().view(), &View::Home);
    assert!(second.study().tracker().is_completed(&id));
    assert!(second.study().tracker().is_bookmarked(&id));
    assert_eq!(second.study().overall_progress(), progress);
    drop(first);
}

#[tokio::test]
async fn quiz_draft_resumes_after_restart_and_retry_clears_it() {
    let url = "sqlite:file:memdb_study_quiz?mode=memory&cache=shared";
    let id = TopicId::new("technical", "frequency-bands");

    let mut first = services(url, 20).await;
    let study = first.study_mut();
    study.open(&id);
    study.start_quiz(&id).await.expect("topic has a quiz");
    study.answer(0, 1).unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(study.quiz().unwrap().save_status().last_saved.is_some());

    let mut second = services(url, 20).await;
    let resumed = second.study_mut();
    let session = resumed.start_quiz(&id).await.unwrap();
    assert_eq!(session.attempt().answers().get(0), Some(1));

    resumed.retry_quiz().await.unwrap();
    resumed.exit_quiz();
    let session = resumed.start_quiz(&id).await.unwrap();
    assert!(session.attempt().answers().is_empty());
    drop(first);
}

#[tokio::test]
async fn chat_is_grounded_in_open_topic() {
    let url = "sqlite:file:memdb_study_chat?mode=memory&cache=shared";
    let mut services = services(url, 50).await;
    services.study_mut().select_topic("technical", "antennas");

    let mut chat = services.open_chat();
    assert!(chat.topic_title().is_some());
    let reply = chat.send("What is a dipole?").await.cloned().unwrap();
    assert_eq!(reply.role, ChatRole::Model);
    assert_eq!(reply.text, "echo: What is a dipole?");
}

#[tokio::test]
async fn preference_changes_persist() {
    let url = "sqlite:file:memdb_study_prefs?mode=memory&cache=shared";
    let mut first = services(url, 50).await;
    first
        .update_accessibility(AccessibilityAction::SetHighContrast(true))
        .await;

    let second = services(url, 50).await;
    assert!(second.accessibility().prefs().high_contrast);
    drop(first);
}
