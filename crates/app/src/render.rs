//! Plain-text views for the study shell.

use std::fmt::Write as _;

use services::{AutoSaveStatus, ChatMessage, ChatRole, ProgressTracker, QuizSession};
use study_core::model::{
    AccessibilityPrefs, AllocationStatus, Catalog, ExtendedData, FrequencyTable, LicenceType,
    LicensingGuide, Module, OptionMark, PageCursor, QuizResult, Topic, TopicId, TopicKind,
};

pub fn home(catalog: &Catalog, tracker: &ProgressTracker) -> String {
    let mut out = String::from("HAREC Study Hub\n\n");
    for module in catalog.modules() {
        let _ = writeln!(
            out,
            "  {:<12} {:<40} {:>3}%",
            module.key(),
            module.title(),
            tracker.module_progress(catalog, module.key())
        );
    }
    let _ = write!(
        out,
        "\nOverall progress: {}%",
        tracker.overall_progress(catalog)
    );
    out
}

pub fn module(module: &Module, catalog: &Catalog, tracker: &ProgressTracker) -> String {
    let mut out = format!("{}\n", module.title());
    if !module.category().is_empty() {
        let _ = writeln!(out, "({})", module.category());
    }
    out.push('\n');
    for id in module.topic_ids() {
        let Some(topic) = catalog.resolve(&id) else {
            continue;
        };
        let _ = writeln!(out, "  {} {}", topic_line(&id, topic, tracker), topic.title());
    }
    let _ = write!(
        out,
        "\n{}% complete",
        tracker.module_progress(catalog, module.key())
    );
    out
}

pub fn topic_list<'a>(module: &str, topics: impl IntoIterator<Item = &'a Topic>) -> String {
    let mut out = String::new();
    for topic in topics {
        let _ = writeln!(out, "  {module}-{}  {}", topic.key(), topic.title());
    }
    if out.is_empty() {
        out.push_str("No matching topics.");
    }
    out.trim_end().to_string()
}

fn topic_line(id: &TopicId, topic: &Topic, tracker: &ProgressTracker) -> String {
    let done = if tracker.is_completed(id) { "[x]" } else { "[ ]" };
    let mark = if tracker.is_bookmarked(id) { '*' } else { ' ' };
    let kind = match topic.kind() {
        TopicKind::Quiz { .. } => "quiz",
        TopicKind::EmbeddedGuide { .. } => "guide",
        TopicKind::PaginatedDocument { .. } => "doc",
        TopicKind::Plain => "",
    };
    format!("{done}{mark} {:<28} {kind:<5}", id.to_string())
}

pub fn topic(id: &TopicId, topic: &Topic, tracker: &ProgressTracker) -> String {
    let mut out = format!("{}  [{id}]\n", topic.title());
    if tracker.is_bookmarked(id) {
        out.push_str("(bookmarked)\n");
    }
    let _ = write!(out, "\n{}\n", topic.content().trim());

    if let Some(ExtendedData::FrequencyBands(table)) = topic.extended() {
        out.push('\n');
        out.push_str(&frequency_table(table));
    }
    if let Some(score) = tracker.progress().quiz_score(id) {
        let _ = write!(
            out,
            "\nLast quiz score: {}/{} on {}\n",
            score.score,
            score.total,
            score.date.format("%Y-%m-%d")
        );
    }
    match topic.kind() {
        TopicKind::Quiz { questions } => {
            let _ = write!(out, "\nThis topic has a {}-question quiz; type `quiz`.", questions.len());
        }
        TopicKind::EmbeddedGuide { .. } => {
            out.push_str("\nType `guide` for the step-by-step licensing walkthrough.");
        }
        TopicKind::PaginatedDocument { .. } | TopicKind::Plain => {}
    }
    out.trim_end().to_string()
}

fn frequency_table(table: &FrequencyTable) -> String {
    let mut out = format!(
        "{:<8} {:<22} {:<10} {:<10} {}\n",
        "Band", "Frequency", "Power", "Status", "Maritime"
    );
    for row in table.rows() {
        let status = match row.status {
            AllocationStatus::Primary => "Primary",
            AllocationStatus::Secondary => "Secondary",
        };
        let _ = write!(
            out,
            "{:<8} {:<22} {:<10} {:<10} {}",
            row.band,
            row.freq,
            row.power,
            status,
            if row.maritime { "yes" } else { "no" }
        );
        if !row.notes.is_empty() {
            let _ = write!(out, "  ({})", row.notes);
        }
        out.push('\n');
    }
    out
}

pub fn document_page(title: &str, pages: &[String], cursor: &PageCursor) -> String {
    let Some(index) = cursor.index() else {
        return format!("{title}\n\n(This document has no pages.)");
    };
    let body = pages.get(index).map_or("", String::as_str);
    format!(
        "{title}  page {}/{}\n\n{}\n\n`page next`, `page prev` or `page <n>`",
        cursor.page(),
        cursor.total_pages(),
        body.trim()
    )
}

pub fn quiz(session: &QuizSession) -> String {
    let attempt = session.attempt();
    let mut out = format!("Quiz: {}\n", session.id());
    for (q_idx, question) in attempt.questions().iter().enumerate() {
        let _ = writeln!(out, "\n{}. {}", q_idx + 1, question.prompt());
        for (o_idx, option) in question.options().iter().enumerate() {
            let marker = match attempt.option_mark(q_idx, o_idx) {
                OptionMark::Selected => "(*)",
                OptionMark::Unselected | OptionMark::Neutral => "( )",
                OptionMark::Correct => "(+)",
                OptionMark::Incorrect => "(x)",
            };
            let _ = writeln!(out, "   {marker} {}. {option}", o_idx + 1);
        }
    }
    if !attempt.show_results() {
        let _ = write!(
            out,
            "\n{}/{} answered{}",
            attempt.answers().len(),
            attempt.total(),
            save_note(session.save_status())
        );
    }
    out.trim_end().to_string()
}

fn save_note(status: AutoSaveStatus) -> String {
    if status.is_saving {
        " - saving...".to_string()
    } else if let Some(at) = status.last_saved {
        format!(" - draft saved {}", at.format("%H:%M:%S"))
    } else {
        String::new()
    }
}

pub fn quiz_result(result: &QuizResult) -> String {
    format!(
        "Score: {}/{} ({}%) {}",
        result.score,
        result.total,
        result.percentage,
        result.band.label()
    )
}

pub fn progress(catalog: &Catalog, tracker: &ProgressTracker) -> String {
    let mut out = format!("Overall: {}%\n", tracker.overall_progress(catalog));
    for module in catalog.modules() {
        let done = tracker
            .progress()
            .module_completed_count(catalog, module.key());
        let _ = writeln!(
            out,
            "  {:<12} {}/{} topics ({}%)",
            module.key(),
            done,
            module.topics().len(),
            tracker.module_progress(catalog, module.key())
        );
    }
    let bookmarks = tracker.progress().bookmarked();
    if !bookmarks.is_empty() {
        out.push_str("\nBookmarks:\n");
        for id in bookmarks {
            let _ = writeln!(out, "  {id}");
        }
    }
    out.trim_end().to_string()
}

pub fn guide(guide: &LicensingGuide) -> String {
    let info = &guide.system_info;
    let mut out = format!(
        "{} ({})\nContact: {}\n\n",
        info.name, info.authority, info.contact_email
    );
    for line in &guide.general_process.overview {
        let _ = writeln!(out, "  - {line}");
    }
    let _ = write!(
        out,
        "\n{}\nPayment: {}\n{}\n\nAccount: {}\n",
        guide.general_process.account_requirement,
        guide.general_process.payment_methods.join(", "),
        guide.general_process.processing_note,
        guide.account_creation.description
    );
    for (idx, step) in guide.account_creation.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {step}", idx + 1);
    }
    out.push_str("\nLicences (`guide <name>` for steps):\n");
    for licence in &guide.licence_types {
        let reduced = if licence.has_reduced_fee() {
            format!(", reduced EUR {}", licence.fee.reduced)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "  {:<32} EUR {}{reduced}",
            licence.name, licence.fee.standard
        );
    }
    out.trim_end().to_string()
}

pub fn licence(licence: &LicenceType) -> String {
    let mut out = format!("{}\n{}\n\nRequirements:\n", licence.name, licence.description);
    for requirement in &licence.requirements {
        let _ = writeln!(out, "  - {requirement}");
    }
    let _ = writeln!(out, "\nFee: EUR {}", licence.fee.standard);
    if licence.has_reduced_fee() {
        let _ = writeln!(out, "Reduced fee: EUR {}", licence.fee.reduced);
        for condition in &licence.fee.reduced_conditions {
            let _ = writeln!(out, "  - {condition}");
        }
    }
    out.push_str("\nSteps:\n");
    for (idx, step) in licence.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}: {}", idx + 1, step.title, step.description);
        for note in &step.notes {
            let _ = writeln!(out, "       note: {note}");
        }
        for warning in &step.warnings {
            let _ = writeln!(out, "       warning: {warning}");
        }
    }
    for info in &licence.additional_info {
        let _ = writeln!(out, "  * {info}");
    }
    out.trim_end().to_string()
}

pub fn prefs(prefs: &AccessibilityPrefs) -> String {
    let on = |flag: bool| if flag { "on" } else { "off" };
    let reading = prefs.reading_settings;
    format!(
        "motion (reduce)  {}\ncontrast         {}\nsimple           {}\nfocus            {}\ntheme            {:?}\nfont             {:?}\nline             {:?}\nspacing          {:?}\nautosave         {} ms",
        on(prefs.reduce_motion),
        on(prefs.high_contrast),
        on(prefs.simplified_ui),
        on(prefs.enhanced_focus),
        prefs.theme,
        reading.font_size,
        reading.line_height,
        reading.letter_spacing,
        prefs.auto_save_frequency_ms
    )
    .to_lowercase()
}

pub fn chat_message(message: &ChatMessage) -> String {
    match message.role {
        ChatRole::Model => format!("EI-AI: {}", message.text),
        ChatRole::User => format!("you: {}", message.text),
    }
}
