//! Form field component for user input

use ratatui::{
    layout::{Alignment, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::tui::ui::Styles;

/// Type of form field
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldType {
    Text,
    /// Text parsed as `YYYY-MM-DD`
    Date,
    /// Cycles through fixed options
    Dropdown,
    Checkbox,
    /// Path to a local file, attached on Enter
    FilePath,
    Button,
}

/// Individual form field
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub field_type: FormFieldType,
    pub required: bool,
    pub is_focused: bool,
    /// Cursor position in characters
    pub cursor_position: usize,
    pub dropdown_options: Vec<String>,
    pub checked: bool,
    pub validation_error: Option<String>,
}

impl FormField {
    pub fn new(label: &str, field_type: FormFieldType) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            field_type,
            required: false,
            is_focused: false,
            cursor_position: 0,
            dropdown_options: Vec::new(),
            checked: false,
            validation_error: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_dropdown_options(mut self, options: Vec<String>) -> Self {
        self.dropdown_options = options;
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_error(mut self, error: Option<&str>) -> Self {
        self.validation_error = error.map(str::to_string);
        self
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor_position = self.value.chars().count();
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn is_editable(&self) -> bool {
        matches!(
            self.field_type,
            FormFieldType::Text | FormFieldType::Date | FormFieldType::FilePath
        )
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.is_editable() {
            return;
        }
        let at = self.byte_index(self.cursor_position);
        self.value.insert(at, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.is_editable() && self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.value.remove(at);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.is_editable() && self.cursor_position < self.char_count() {
            let at = self.byte_index(self.cursor_position);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.char_count();
    }

    /// Display columns between the start of the value and the cursor
    pub fn cursor_column(&self) -> u16 {
        let before = &self.value[..self.byte_index(self.cursor_position)];
        before.width() as u16
    }

    /// Next dropdown option after the current value, wrapping around
    pub fn next_option(&self) -> Option<&str> {
        if self.dropdown_options.is_empty() {
            return None;
        }
        let current = self.dropdown_options.iter().position(|o| *o == self.value);
        let next = match current {
            Some(i) => (i + 1) % self.dropdown_options.len(),
            None => 0,
        };
        self.dropdown_options.get(next).map(String::as_str)
    }

    fn title(&self) -> String {
        let mut title = self.label.clone();
        if self.required {
            title.push_str(" *");
        }
        if let Some(ref error) = self.validation_error {
            title = format!("{} - Error: {}", title, error);
        }
        title
    }

    /// Render the form field
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let border_style = if self.is_focused {
            Styles::active_border()
        } else if self.validation_error.is_some() {
            Styles::error()
        } else {
            Styles::inactive_border()
        };

        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(border_style);

        let paragraph = match self.field_type {
            FormFieldType::Checkbox => {
                let mark = if self.checked { "[x]" } else { "[ ]" };
                Paragraph::new(format!("{} {}", mark, self.placeholder)).style(Styles::default())
            }
            FormFieldType::Button => {
                let style = if self.is_focused {
                    Styles::selected()
                } else {
                    Styles::title()
                };
                Paragraph::new(self.value.clone())
                    .style(style)
                    .alignment(Alignment::Center)
            }
            FormFieldType::Dropdown => {
                let arrow = if self.is_focused { " (Space to change)" } else { "" };
                Paragraph::new(format!("{}{}", self.value, arrow)).style(Styles::default())
            }
            _ if self.value.is_empty() && !self.placeholder.is_empty() => {
                Paragraph::new(self.placeholder.clone()).style(Styles::inactive())
            }
            _ => Paragraph::new(self.value.clone()).style(Styles::default()),
        };

        f.render_widget(paragraph.block(block), area);

        if self.is_focused && self.is_editable() && area.width > 2 && area.height > 2 {
            let cursor_x = area.x + 1 + self.cursor_column();
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width - 1 {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}
