use serde::{Deserialize, Serialize};

/// Default quiz auto-save debounce, in milliseconds.
pub const DEFAULT_AUTO_SAVE_FREQUENCY_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Calm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineHeight {
    #[default]
    Normal,
    Relaxed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterSpacing {
    #[default]
    Normal,
    Wide,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadingSettings {
    pub font_size: FontSize,
    pub line_height: LineHeight,
    pub letter_spacing: LetterSpacing,
}

/// Partial update for [`ReadingSettings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadingSettingsPatch {
    pub font_size: Option<FontSize>,
    pub line_height: Option<LineHeight>,
    pub letter_spacing: Option<LetterSpacing>,
}

/// Display and pacing preferences.
///
/// Persisted as one JSON blob; missing fields fall back to defaults so older
/// blobs keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct AccessibilityPrefs {
    pub reduce_motion: bool,
    pub high_contrast: bool,
    #[serde(rename = "simplifiedUI")]
    pub simplified_ui: bool,
    pub enhanced_focus: bool,
    pub theme: Theme,
    pub reading_settings: ReadingSettings,
    #[serde(rename = "autoSaveFrequency")]
    pub auto_save_frequency_ms: u64,
}

impl Default for AccessibilityPrefs {
    fn default() -> Self {
        Self {
            reduce_motion: false,
            high_contrast: false,
            simplified_ui: false,
            enhanced_focus: true,
            theme: Theme::Default,
            reading_settings: ReadingSettings::default(),
            auto_save_frequency_ms: DEFAULT_AUTO_SAVE_FREQUENCY_MS,
        }
    }
}

/// Partial update applied by [`AccessibilityAction::SetState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessibilityPatch {
    pub reduce_motion: Option<bool>,
    pub high_contrast: Option<bool>,
    #[serde(rename = "simplifiedUI")]
    pub simplified_ui: Option<bool>,
    pub enhanced_focus: Option<bool>,
    pub theme: Option<Theme>,
    pub reading_settings: Option<ReadingSettings>,
    #[serde(rename = "autoSaveFrequency")]
    pub auto_save_frequency_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessibilityAction {
    SetReducedMotion(bool),
    SetHighContrast(bool),
    SetSimplifiedUi(bool),
    SetEnhancedFocus(bool),
    SetTheme(Theme),
    SetReadingSettings(ReadingSettingsPatch),
    SetAutoSaveFrequency(u64),
    SetState(AccessibilityPatch),
}

impl AccessibilityPrefs {
    /// Apply one action and return the new preferences.
    #[must_use]
    pub fn reduce(self, action: AccessibilityAction) -> Self {
        match action {
            AccessibilityAction::SetReducedMotion(value) => Self {
                reduce_motion: value,
                ..self
            },
            AccessibilityAction::SetHighContrast(value) => Self {
                high_contrast: value,
                ..self
            },
            AccessibilityAction::SetSimplifiedUi(value) => Self {
                simplified_ui: value,
                ..self
            },
            AccessibilityAction::SetEnhancedFocus(value) => Self {
                enhanced_focus: value,
                ..self
            },
            AccessibilityAction::SetTheme(theme) => Self { theme, ..self },
            AccessibilityAction::SetReadingSettings(patch) => {
                let current = self.reading_settings;
                Self {
                    reading_settings: ReadingSettings {
                        font_size: patch.font_size.unwrap_or(current.font_size),
                        line_height: patch.line_height.unwrap_or(current.line_height),
                        letter_spacing: patch.letter_spacing.unwrap_or(current.letter_spacing),
                    },
                    ..self
                }
            }
            AccessibilityAction::SetAutoSaveFrequency(ms) => Self {
                auto_save_frequency_ms: ms,
                ..self
            },
            AccessibilityAction::SetState(patch) => Self {
                reduce_motion: patch.reduce_motion.unwrap_or(self.reduce_motion),
                high_contrast: patch.high_contrast.unwrap_or(self.high_contrast),
                simplified_ui: patch.simplified_ui.unwrap_or(self.simplified_ui),
                enhanced_focus: patch.enhanced_focus.unwrap_or(self.enhanced_focus),
                theme: patch.theme.unwrap_or(self.theme),
                reading_settings: patch.reading_settings.unwrap_or(self.reading_settings),
                auto_save_frequency_ms: patch
                    .auto_save_frequency_ms
                    .unwrap_or(self.auto_save_frequency_ms),
            },
        }
    }

    #[must_use]
    pub fn auto_save_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.auto_save_frequency_ms)
    }
}
