use serde::{Deserialize, Serialize};

use crate::tables::Choice;

/// Format the light layout pins the format selector to.
pub const LIGHT_FORMAT: &str = "psp8";

/// Classes hidden by the light layout.
pub const LIGHT_HIDDEN_CLASSES: [&str; 8] = [
    "hide",
    "name",
    "intro",
    "styled-longselect",
    "selection_bar",
    "help_button",
    "description",
    "menubar",
];

/// Page layout requested through the `layout` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Full,
    Light,
}

impl Layout {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("light") => Self::Light,
            _ => Self::Full,
        }
    }

    /// Whether the layout pins `key`, so user changes to it are ignored.
    pub const fn locks(self, key: PreferenceKey) -> bool {
        matches!((self, key), (Self::Light, PreferenceKey::Format))
    }
}

/// Keys of the small key-value store that remembers dropdown choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    Functional,
    Accuracy,
    Format,
}

impl PreferenceKey {
    pub const ALL: [Self; 3] = [Self::Functional, Self::Accuracy, Self::Format];

    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Functional => "selectedXCF",
            Self::Accuracy => "selectedACC",
            Self::Format => "selectedFMT",
        }
    }

    /// Id of the `<select>` element holding this choice.
    pub const fn select_id(self) -> &'static str {
        match self {
            Self::Functional => "XCF",
            Self::Accuracy => "ACC",
            Self::Format => "FMT",
        }
    }

    pub fn value(self, choice: &Choice) -> &str {
        match self {
            Self::Functional => &choice.functional,
            Self::Accuracy => &choice.accuracy,
            Self::Format => &choice.format,
        }
    }
}

/// Previously chosen values, any of which may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remembered {
    pub functional: Option<String>,
    pub accuracy: Option<String>,
    pub format: Option<String>,
}

impl Remembered {
    pub fn from_choice(choice: &Choice) -> Self {
        Self {
            functional: Some(choice.functional.clone()),
            accuracy: Some(choice.accuracy.clone()),
            format: Some(choice.format.clone()),
        }
    }

    /// Reads every key through `get`, treating empty values as absent.
    pub fn load(mut get: impl FnMut(&'static str) -> Option<String>) -> Self {
        let mut read = |key: PreferenceKey| get(key.storage_key()).filter(|value| !value.is_empty());
        Self {
            functional: read(PreferenceKey::Functional),
            accuracy: read(PreferenceKey::Accuracy),
            format: read(PreferenceKey::Format),
        }
    }

    pub fn set(&mut self, key: PreferenceKey, value: &str) {
        let slot = match key {
            PreferenceKey::Functional => &mut self.functional,
            PreferenceKey::Accuracy => &mut self.accuracy,
            PreferenceKey::Format => &mut self.format,
        };
        *slot = Some(value.to_string());
    }
}
