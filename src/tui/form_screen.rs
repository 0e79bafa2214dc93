//! Submission form screen
//!
//! Owns only view state: which item has focus, the text being edited, and the
//! per-row buffers for file paths that are typed but not yet attached. All form
//! values live in [`FormState`]. Row state is keyed by [`DocumentId`] so it stays
//! with its row when earlier rows are removed.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::Paragraph,
    Frame,
};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::documents::RowControl;
use crate::form::{FormState, TextField, INVALID_DATE_FORMAT};
use crate::models::{DocumentId, FileRef, FileType};
use crate::tui::components::{FormField, FormFieldType};
use crate::tui::ui::{grid_columns, Styles};

const DATE_FORMAT: &str = "%Y-%m-%d";
const ROW_HEIGHT: u16 = 3;

/// Actions the screen asks the application to perform
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    Submit,
    Quit,
    SetStatus(String),
    SetError(String),
    None,
}

/// Focusable items of the form, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusItem {
    Text(TextField),
    DateOfBirth,
    SameAsResidential,
    DocumentName(DocumentId),
    DocumentType(DocumentId),
    DocumentFile(DocumentId),
    DocumentControl(DocumentId),
    Submit,
}

impl FocusItem {
    fn document(&self) -> Option<DocumentId> {
        match *self {
            FocusItem::DocumentName(id)
            | FocusItem::DocumentType(id)
            | FocusItem::DocumentFile(id)
            | FocusItem::DocumentControl(id) => Some(id),
            _ => None,
        }
    }
}

/// One rendered line of the layout
enum Row {
    Fields(Vec<FocusItem>, &'static [u16]),
    Heading(&'static str),
}

pub struct FormScreen {
    pub focus: FocusItem,
    pub editor: FormField,
    /// Validation errors are shown once a submit has been attempted
    pub show_errors: bool,
    pub date_text: String,
    pub pending_paths: HashMap<DocumentId, String>,
    pub local_errors: HashMap<FocusItem, String>,
    scroll: usize,
}

impl FormScreen {
    pub fn new(form: &FormState) -> Self {
        let mut screen = Self {
            focus: FocusItem::Text(TextField::FirstName),
            editor: FormField::new("", FormFieldType::Text),
            show_errors: false,
            date_text: form.date_of_birth().format(DATE_FORMAT).to_string(),
            pending_paths: HashMap::new(),
            local_errors: HashMap::new(),
            scroll: 0,
        };
        screen.load_editor(form);
        screen
    }

    /// Start over after the form has been reset
    pub fn reset(&mut self, form: &FormState) {
        *self = Self::new(form);
    }

    /// Focusable items for the current form, in tab order
    pub fn focus_order(form: &FormState) -> Vec<FocusItem> {
        let mut order = vec![
            FocusItem::Text(TextField::FirstName),
            FocusItem::Text(TextField::LastName),
            FocusItem::Text(TextField::Email),
            FocusItem::DateOfBirth,
            FocusItem::Text(TextField::ResidentialStreet1),
            FocusItem::Text(TextField::ResidentialStreet2),
            FocusItem::SameAsResidential,
        ];
        if form.permanent_section_visible() {
            order.push(FocusItem::Text(TextField::PermanentStreet1));
            order.push(FocusItem::Text(TextField::PermanentStreet2));
        }
        for entry in form.documents().iter() {
            order.push(FocusItem::DocumentName(entry.id));
            order.push(FocusItem::DocumentType(entry.id));
            order.push(FocusItem::DocumentFile(entry.id));
            order.push(FocusItem::DocumentControl(entry.id));
        }
        order.push(FocusItem::Submit);
        order
    }

    fn rows(form: &FormState) -> Vec<Row> {
        const HALVES: &[u16] = &[6, 6];
        const DOCUMENT: &[u16] = &[3, 3, 4, 2];
        const FULL: &[u16] = &[12];

        let mut rows = vec![
            Row::Fields(
                vec![
                    FocusItem::Text(TextField::FirstName),
                    FocusItem::Text(TextField::LastName),
                ],
                HALVES,
            ),
            Row::Fields(vec![FocusItem::Text(TextField::Email), FocusItem::DateOfBirth], HALVES),
            Row::Fields(
                vec![
                    FocusItem::Text(TextField::ResidentialStreet1),
                    FocusItem::Text(TextField::ResidentialStreet2),
                ],
                HALVES,
            ),
            Row::Fields(vec![FocusItem::SameAsResidential], FULL),
        ];
        if form.permanent_section_visible() {
            rows.push(Row::Fields(
                vec![
                    FocusItem::Text(TextField::PermanentStreet1),
                    FocusItem::Text(TextField::PermanentStreet2),
                ],
                HALVES,
            ));
        }
        rows.push(Row::Heading("Upload Documents"));
        for entry in form.documents().iter() {
            rows.push(Row::Fields(
                vec![
                    FocusItem::DocumentName(entry.id),
                    FocusItem::DocumentType(entry.id),
                    FocusItem::DocumentFile(entry.id),
                    FocusItem::DocumentControl(entry.id),
                ],
                DOCUMENT,
            ));
        }
        rows.push(Row::Fields(vec![FocusItem::Submit], FULL));
        rows
    }

    /// Handle a key press against the form
    pub fn handle_key_event(&mut self, key: KeyEvent, form: &mut FormState) -> ScreenAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('s') => self.request_submit(),
                KeyCode::Char('c') => ScreenAction::Quit,
                _ => ScreenAction::None,
            };
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.move_focus(form, 1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(form, -1),
            KeyCode::Enter => return self.activate(form),
            KeyCode::Char(' ') if !self.editor.is_editable() => return self.activate(form),
            KeyCode::Char(c) => {
                self.editor.insert_char(c);
                self.commit_editor(form);
            }
            KeyCode::Backspace => {
                self.editor.delete_char();
                self.commit_editor(form);
            }
            KeyCode::Delete => {
                self.editor.delete_char_forward();
                self.commit_editor(form);
            }
            KeyCode::Left => self.editor.move_cursor_left(),
            KeyCode::Right => self.editor.move_cursor_right(),
            KeyCode::Home => self.editor.move_cursor_to_start(),
            KeyCode::End => self.editor.move_cursor_to_end(),
            _ => {}
        }
        ScreenAction::None
    }

    fn request_submit(&mut self) -> ScreenAction {
        self.show_errors = true;
        ScreenAction::Submit
    }

    fn move_focus(&mut self, form: &FormState, step: isize) {
        let order = Self::focus_order(form);
        let current = order.iter().position(|i| *i == self.focus).unwrap_or(0) as isize;
        let len = order.len() as isize;
        let next = (current + step).rem_euclid(len) as usize;
        self.set_focus(order[next], form);
    }

    pub fn set_focus(&mut self, item: FocusItem, form: &FormState) {
        self.focus = item;
        self.load_editor(form);
    }

    /// Keep focus on an existing item after the layout changed
    fn repair_focus(&mut self, form: &FormState, previous_index: usize) {
        let order = Self::focus_order(form);
        if !order.contains(&self.focus) {
            let index = previous_index.min(order.len().saturating_sub(1));
            self.focus = order[index];
        }
        self.load_editor(form);
    }

    fn forget_removed_rows(&mut self, form: &FormState) {
        let docs = form.documents();
        self.pending_paths.retain(|id, _| docs.position(*id).is_some());
        self.local_errors
            .retain(|item, _| item.document().map_or(true, |id| docs.position(id).is_some()));
    }

    fn activate(&mut self, form: &mut FormState) -> ScreenAction {
        match self.focus {
            FocusItem::Submit => return self.request_submit(),
            FocusItem::SameAsResidential => {
                form.toggle_same_as_residential();
                self.load_editor(form);
            }
            FocusItem::DocumentType(id) => {
                let next = self
                    .editor
                    .next_option()
                    .and_then(|label| FileType::options().into_iter().find(|t| t.label() == label))
                    .unwrap_or(FileType::Image);
                form.set_document_type(id, next);
                self.load_editor(form);
            }
            FocusItem::DocumentFile(id) => return self.attach_pending(form, id),
            FocusItem::DocumentControl(id) => self.activate_control(form, id),
            _ => self.move_focus(form, 1),
        }
        ScreenAction::None
    }

    fn activate_control(&mut self, form: &mut FormState, id: DocumentId) {
        let Some(position) = form.documents().position(id) else {
            return;
        };
        let Some(control) = form.documents().control_at(position) else {
            return;
        };
        let order_index = Self::focus_order(form)
            .iter()
            .position(|i| *i == self.focus)
            .unwrap_or(0);

        match form.activate_row_control(control) {
            Some(added) => {
                debug!("Appended document row {:?}", added);
                self.set_focus(FocusItem::DocumentName(added), form);
            }
            None => {
                if let RowControl::Remove(removed) = control {
                    debug!("Removed document row {:?}", removed);
                }
                self.forget_removed_rows(form);
                self.repair_focus(form, order_index);
            }
        }
    }

    fn attach_pending(&mut self, form: &mut FormState, id: DocumentId) -> ScreenAction {
        let path = self.pending_paths.get(&id).cloned().unwrap_or_default();
        let item = FocusItem::DocumentFile(id);
        if path.trim().is_empty() {
            self.local_errors.insert(item, "Type a file path first".to_string());
            self.load_editor(form);
            return ScreenAction::None;
        }

        let file_type = form
            .documents()
            .get(id)
            .map(|d| d.file_type.clone())
            .unwrap_or(FileType::Image);

        let result = match FileRef::from_path(path.trim()) {
            Ok(file) if file.matches(&file_type) => Ok(file),
            Ok(file) => Err(format!("Expected {} file, got {}", file_type.accept(), file.content_type)),
            Err(e) => Err(e.to_string()),
        };

        let action = match result {
            Ok(file) => {
                info!("Attached {} ({} bytes)", file.path.display(), file.size);
                let status = format!("Attached {}", file.name);
                form.attach_file(id, file);
                self.pending_paths.remove(&id);
                self.local_errors.remove(&item);
                ScreenAction::SetStatus(status)
            }
            Err(message) => {
                self.local_errors.insert(item, message.clone());
                ScreenAction::SetError(message)
            }
        };
        self.load_editor(form);
        action
    }

    /// Push the editor's text into the form
    fn commit_editor(&mut self, form: &mut FormState) {
        let value = self.editor.value.clone();
        match self.focus {
            FocusItem::Text(field) => form.set_text(field, &value),
            FocusItem::DateOfBirth => {
                self.date_text = value.clone();
                if form.set_date_of_birth_text(&value) {
                    self.local_errors.remove(&FocusItem::DateOfBirth);
                } else {
                    self.local_errors
                        .insert(FocusItem::DateOfBirth, INVALID_DATE_FORMAT.to_string());
                }
            }
            FocusItem::DocumentName(id) => {
                form.set_document_name(id, &value);
            }
            FocusItem::DocumentFile(id) => {
                self.pending_paths.insert(id, value);
                self.local_errors.remove(&FocusItem::DocumentFile(id));
            }
            _ => {}
        }
        self.editor.validation_error = self.error_for(self.focus, form);
    }

    fn load_editor(&mut self, form: &FormState) {
        self.editor = self.build_field(self.focus, form);
        self.editor.set_focus(true);
    }

    fn error_for(&self, item: FocusItem, form: &FormState) -> Option<String> {
        if let Some(local) = self.local_errors.get(&item) {
            return Some(local.clone());
        }
        if !self.show_errors {
            return None;
        }
        let error = match item {
            FocusItem::Text(field) => form.error_for(field.path()),
            FocusItem::DateOfBirth => form.error_for("dateOfBirth"),
            FocusItem::DocumentName(id) => form.document_errors(id).get("fileName").copied(),
            FocusItem::DocumentType(id) => form.document_errors(id).get("fileType").copied(),
            FocusItem::Submit => form.error_for("documents"),
            _ => None,
        };
        error.map(str::to_string)
    }

    fn build_field(&self, item: FocusItem, form: &FormState) -> FormField {
        let field = match item {
            FocusItem::Text(text) => {
                let (label, placeholder, required) = match text {
                    TextField::FirstName => ("First Name", "Enter your first name here..", true),
                    TextField::LastName => ("Last Name", "Enter your last name here..", true),
                    TextField::Email => ("Email", "ex: myname@example.com", true),
                    TextField::ResidentialStreet1 => ("Residential Address (Street 1)", "", true),
                    TextField::ResidentialStreet2 => ("Residential Address (Street 2)", "", false),
                    TextField::PermanentStreet1 => ("Permanent Address (Street 1)", "", false),
                    TextField::PermanentStreet2 => ("Permanent Address (Street 2)", "", false),
                };
                let field = FormField::new(label, FormFieldType::Text)
                    .with_placeholder(placeholder)
                    .with_value(form.text(text));
                if required {
                    field.required()
                } else {
                    field
                }
            }
            FocusItem::DateOfBirth => FormField::new("Date of Birth (YYYY-MM-DD, min. age 18)", FormFieldType::Date)
                .required()
                .with_placeholder("YYYY-MM-DD")
                .with_value(&self.date_text),
            FocusItem::SameAsResidential => {
                FormField::new("Same as Residential Address", FormFieldType::Checkbox)
                    .with_placeholder("Use the same address for permanent address")
                    .with_checked(form.same_as_residential())
            }
            FocusItem::DocumentName(id) => FormField::new("File Name", FormFieldType::Text)
                .required()
                .with_value(form.documents().get(id).map_or("", |d| d.file_name.as_str())),
            FocusItem::DocumentType(id) => {
                let value = form
                    .documents()
                    .get(id)
                    .map(|d| d.file_type.label().to_string())
                    .unwrap_or_default();
                FormField::new("Type of File", FormFieldType::Dropdown)
                    .required()
                    .with_dropdown_options(FileType::options().iter().map(|t| t.label().to_string()).collect())
                    .with_value(&value)
            }
            FocusItem::DocumentFile(id) => {
                let attached = form.documents().get(id).and_then(|d| d.file.as_ref());
                let pending = self.pending_paths.get(&id);
                let placeholder = match attached {
                    Some(file) => format!("{} ({} bytes)", file.name, file.size),
                    None => "No file chosen (type a path, Enter to attach)".to_string(),
                };
                FormField::new("File Upload", FormFieldType::FilePath)
                    .required()
                    .with_placeholder(&placeholder)
                    .with_value(pending.map_or("", String::as_str))
            }
            FocusItem::DocumentControl(id) => {
                let label = match form.documents().position(id).and_then(|p| form.documents().control_at(p)) {
                    Some(RowControl::Add) => "[+] Add",
                    _ => "[-] Remove",
                };
                FormField::new("", FormFieldType::Button).with_value(label)
            }
            FocusItem::Submit => FormField::new("", FormFieldType::Button).with_value(if form.is_submitting() {
                "Submitting..."
            } else {
                "Submit"
            }),
        };
        field.with_error(self.error_for(item, form).as_deref())
    }

    /// Field as displayed, using the live editor for the focused item
    fn display_field(&self, item: FocusItem, form: &FormState) -> FormField {
        if item == self.focus {
            let mut field = self.build_field(item, form);
            if field.is_editable() {
                field.value = self.editor.value.clone();
                field.cursor_position = self.editor.cursor_position;
            }
            field.set_focus(true);
            field
        } else {
            self.build_field(item, form)
        }
    }

    /// Draw the form, scrolled so the focused row is visible
    pub fn draw(&mut self, f: &mut Frame, area: Rect, form: &FormState) {
        let rows = Self::rows(form);
        let heights: Vec<u16> = rows
            .iter()
            .map(|r| match r {
                Row::Fields(..) => ROW_HEIGHT,
                Row::Heading(_) => 1,
            })
            .collect();

        let focused_row = rows
            .iter()
            .position(|r| matches!(r, Row::Fields(items, _) if items.contains(&self.focus)))
            .unwrap_or(0);

        if focused_row < self.scroll {
            self.scroll = focused_row;
        }
        while self.scroll < focused_row
            && heights[self.scroll..=focused_row].iter().sum::<u16>() > area.height
        {
            self.scroll += 1;
        }

        let mut y = area.y;
        for (row, height) in rows.iter().zip(&heights).skip(self.scroll) {
            if y + height > area.y + area.height {
                break;
            }
            let row_area = Rect::new(area.x, y, area.width, *height);
            match row {
                Row::Heading(text) => {
                    f.render_widget(Paragraph::new(Line::styled(*text, Styles::title())), row_area);
                }
                Row::Fields(items, spans) => {
                    for (item, cell) in items.iter().zip(grid_columns(row_area, spans)) {
                        self.display_field(*item, form).render(f, cell);
                    }
                }
            }
            y += height;
        }
    }
}
