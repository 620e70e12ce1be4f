//! Request Form
//!
//! Pure state for the poster request form: which field has focus, the text
//! being edited, the theme selection, and the radius slider. Key handling
//! lives here so it can be tested without a terminal; the app only routes
//! events in and draws the result.

use crossterm::event::{KeyCode, KeyEvent};
use studio_core::{GenerationRequest, Radius, ThemeId};

/// Fields in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// City text input.
    City,
    /// Country text input.
    Country,
    /// Theme single-select.
    Theme,
    /// Radius slider.
    Radius,
    /// The generate button.
    Generate,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Self::City => Self::Country,
            Self::Country => Self::Theme,
            Self::Theme => Self::Radius,
            Self::Radius => Self::Generate,
            Self::Generate => Self::City,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::City => Self::Generate,
            Self::Country => Self::City,
            Self::Theme => Self::Country,
            Self::Radius => Self::Theme,
            Self::Generate => Self::Radius,
        }
    }
}

/// What a key press asked the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// Submit the request built from the current fields.
    Submit(GenerationRequest),
}

/// The request form's editable state.
#[derive(Debug)]
pub struct FormState {
    /// City text.
    pub city: String,
    /// Country text.
    pub country: String,
    /// Theme inventory, from the studio.
    pub themes: Vec<ThemeId>,
    /// Index of the selected theme.
    pub theme_index: usize,
    /// Radius slider position.
    pub radius: Radius,
    /// Field currently in focus.
    pub focus: Field,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// Empty form, city focused.
    #[must_use]
    pub fn new() -> Self {
        Self {
            city: String::new(),
            country: String::new(),
            themes: Vec::new(),
            theme_index: 0,
            radius: Radius::default(),
            focus: Field::City,
        }
    }

    /// Install the theme inventory, preselecting the studio's suggestion.
    pub fn set_themes(&mut self, themes: Vec<ThemeId>, default: Option<ThemeId>) {
        self.theme_index = default
            .and_then(|d| themes.iter().position(|t| *t == d))
            .unwrap_or(0);
        self.themes = themes;
    }

    /// The theme currently selected, if the inventory arrived.
    #[must_use]
    pub fn selected_theme(&self) -> Option<&ThemeId> {
        self.themes.get(self.theme_index)
    }

    /// Build the request from the current fields.
    ///
    /// `None` until a theme inventory is installed; empty city/country pass
    /// through, the engine reports what it thinks of them.
    #[must_use]
    pub fn build_request(&self) -> Option<GenerationRequest> {
        let theme = self.selected_theme()?.clone();
        Some(GenerationRequest::new(
            self.city.trim(),
            self.country.trim(),
            theme,
            self.radius,
        ))
    }

    /// Handle one key press, returning an action for the app to run.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormAction> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
            }
            KeyCode::Enter => {
                if self.focus == Field::Generate {
                    return self.build_request().map(FormAction::Submit);
                }
                self.focus = self.focus.next();
            }
            KeyCode::Char(c) => match self.focus {
                Field::City => self.city.push(c),
                Field::Country => self.country.push(c),
                Field::Theme if c == ' ' => self.cycle_theme(1),
                Field::Radius if c == ' ' => self.radius = self.radius.step_up(),
                _ => {}
            },
            KeyCode::Backspace => match self.focus {
                Field::City => {
                    self.city.pop();
                }
                Field::Country => {
                    self.country.pop();
                }
                _ => {}
            },
            KeyCode::Left => match self.focus {
                Field::Theme => self.cycle_theme(-1),
                Field::Radius => self.radius = self.radius.step_down(),
                _ => {}
            },
            KeyCode::Right => match self.focus {
                Field::Theme => self.cycle_theme(1),
                Field::Radius => self.radius = self.radius.step_up(),
                _ => {}
            },
            _ => {}
        }
        None
    }

    fn cycle_theme(&mut self, delta: isize) {
        if self.themes.is_empty() {
            return;
        }
        let len = self.themes.len() as isize;
        let next = (self.theme_index as isize + delta).rem_euclid(len);
        self.theme_index = next as usize;
    }
}
