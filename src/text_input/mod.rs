//! Editable text field.
//!
//! [`TextInput`] is an element holding raw text plus a caret and selection
//! ([`EditState`]). What it paints is the *display* text, derived from the
//! raw text by a [`Formatter`] whenever the raw text changes; masking,
//! phone and currency formats never touch what is stored, validated or
//! copied.
//!
//! Every mutation records the state before it in an [`UndoRing`]; caret
//! movement alone does not. After each caret move the horizontal (and for
//! multi-line inputs, vertical) scroll offset is adjusted so the caret stays
//! at least `padding` away from the content edges.
//!
//! Printable characters arrive as `TextInput` events, and again as
//! `KeyRepeat`s carrying the character while the key is held. Other key
//! events carry only editing commands.
//!
//! # Examples
//!
//! ```
//! use paneforge::text_input::{InputType, TextInput};
//!
//! let mut input = TextInput::new("phone", InputType::Phone);
//! input.insert_text("5551234567");
//! assert_eq!(input.text(), "5551234567");
//! assert_eq!(input.display_text(), "(555) 123-4567");
//! ```

mod edit;
mod format;
mod history;
mod kinds;
mod validate;

pub use edit::EditState;
pub use format::{CurrencyFormatter, FnFormatter, Formatter, IdentityFormatter, PasswordFormatter, PatternFormatter};
pub use history::{DEFAULT_UNDO_CAPACITY, EditSnapshot, UndoRing};
pub use kinds::InputType;
pub use validate::{ValidationResult, ValidationRule, ValidationState, Validator, rules};

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use crate::clipboard;
use crate::color::Color;
use crate::element::{Element, ElementBase};
use crate::geometry::{Point, PointF, Rect, RectF};
use crate::input::{Event, EventKind, KeyCode, Modifiers, MouseButton};
use crate::render::RenderContext;
use crate::style::{FontStyle, TextStyle};
use crate::text::FontMetrics;

/// Caret visibility flips this often while focused.
pub const CARET_BLINK_INTERVAL: Duration = Duration::from_millis(530);

const CARET_WIDTH: f64 = 1.0;

/// Colors, font and spacing of a [`TextInput`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextInputStyle {
    pub font: FontStyle,
    pub text_color: Color,
    pub placeholder_color: Color,
    pub background: Color,
    pub border_color: Color,
    pub focus_border_color: Color,
    pub warning_color: Color,
    pub invalid_color: Color,
    pub selection_color: Color,
    pub caret_color: Color,
    pub border_width: f64,
    /// Inset of the content from the border, and the caret scroll margin.
    pub padding: f64,
}

impl Default for TextInputStyle {
    fn default() -> Self {
        Self {
            font: FontStyle::default(),
            text_color: Color::BLACK,
            placeholder_color: Color::GRAY,
            background: Color::WHITE,
            border_color: Color::rgb(160, 160, 160),
            focus_border_color: Color::rgb(0, 120, 215),
            warning_color: Color::rgb(230, 160, 0),
            invalid_color: Color::rgb(210, 40, 40),
            selection_color: Color::rgba(0, 120, 215, 90),
            caret_color: Color::BLACK,
            border_width: 1.0,
            padding: 4.0,
        }
    }
}

impl TextInputStyle {
    #[must_use]
    pub fn with_font(mut self, font: FontStyle) -> Self {
        self.font = font;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    #[must_use]
    pub fn with_border_width(mut self, width: f64) -> Self {
        self.border_width = width.max(0.0);
        self
    }
}

type TextCallback = Box<dyn FnMut(&str)>;
type ValidationCallback = Box<dyn FnMut(&ValidationResult)>;
type CharFilter = Box<dyn Fn(char) -> bool>;

/// Single- or multi-line text field.
pub struct TextInput {
    base: ElementBase,
    input_type: InputType,
    edit: EditState,
    display: String,
    formatter: Box<dyn Formatter>,
    validator: Validator,
    validation: ValidationResult,
    validate_on_change: bool,
    validate_on_blur: bool,
    history: UndoRing,
    read_only: bool,
    max_length: Option<usize>,
    placeholder: Option<String>,
    style: TextInputStyle,
    scroll: PointF,
    /// Pixel x kept across vertical caret moves.
    preferred_x: Option<f64>,
    caret_visible: bool,
    blink_from: Option<Duration>,
    dragging: bool,
    char_filter: Option<CharFilter>,
    on_change: Option<TextCallback>,
    on_commit: Option<TextCallback>,
    on_cancel: Option<Box<dyn FnMut()>>,
    on_validation_changed: Option<ValidationCallback>,
}

impl fmt::Debug for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextInput")
            .field("id", &self.base.id())
            .field("input_type", &self.input_type)
            .field("text", &self.edit.text())
            .field("caret", &self.edit.caret())
            .field("selection", &self.edit.selection())
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl TextInput {
    /// Create an input with the preset formatter, validator and length
    /// limit of `input_type`.
    pub fn new(id: impl Into<String>, input_type: InputType) -> Self {
        let style = TextInputStyle::default();
        let metrics = FontMetrics::for_font(&style.font);
        let inset = style.padding + style.border_width;
        let lines = if input_type.is_multiline() { 4.0 } else { 1.0 };
        let height = (metrics.line_height() * lines + inset * 2.0).ceil() as u32;

        let mut base = ElementBase::new(id);
        base.set_bounds(Rect::new(0, 0, 200, height));
        base.set_focusable(true);

        let mut input = Self {
            base,
            input_type,
            edit: EditState::default(),
            display: String::new(),
            formatter: input_type.formatter(),
            validator: input_type.validator(),
            validation: ValidationResult::valid(),
            validate_on_change: true,
            validate_on_blur: true,
            history: UndoRing::default(),
            read_only: false,
            max_length: input_type.max_length(),
            placeholder: None,
            style,
            scroll: PointF::default(),
            preferred_x: None,
            caret_visible: true,
            blink_from: None,
            dragging: false,
            char_filter: None,
            on_change: None,
            on_commit: None,
            on_cancel: None,
            on_validation_changed: None,
        };
        input.refresh_display();
        input
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.base.set_bounds(bounds);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: TextInputStyle) -> Self {
        self.set_style(style);
        self
    }

    // ---- configuration ----

    #[must_use]
    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    /// Switch type, installing its formatter, validator and length limit.
    pub fn set_input_type(&mut self, input_type: InputType) {
        self.input_type = input_type;
        self.formatter = input_type.formatter();
        self.validator = input_type.validator();
        self.max_length = input_type.max_length();
        self.refresh_display();
        self.revalidate_if_needed();
        self.caret_moved();
    }

    #[must_use]
    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    pub fn set_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.formatter = formatter;
        self.refresh_display();
        self.caret_moved();
    }

    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn set_validator(&mut self, validator: Validator) {
        self.validator = validator;
        self.revalidate_if_needed();
    }

    pub fn add_rule(&mut self, rule: ValidationRule) {
        self.validator.add_rule(rule);
        self.revalidate_if_needed();
    }

    pub fn set_validate_on_change(&mut self, enabled: bool) {
        self.validate_on_change = enabled;
    }

    pub fn set_validate_on_blur(&mut self, enabled: bool) {
        self.validate_on_blur = enabled;
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Read-only inputs keep selection and copy but reject every mutation.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        self.base.request_redraw();
    }

    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Limit in code points. Existing text is not truncated.
    pub fn set_max_length(&mut self, max: Option<usize>) {
        self.max_length = max;
    }

    /// Text shown while empty; falls back to the formatter's hint.
    #[must_use]
    pub fn placeholder(&self) -> Option<String> {
        self.placeholder.clone().or_else(|| self.formatter.placeholder())
    }

    pub fn set_placeholder(&mut self, placeholder: Option<String>) {
        self.placeholder = placeholder;
        self.base.request_redraw();
    }

    #[must_use]
    pub fn style(&self) -> &TextInputStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: TextInputStyle) {
        self.style = style;
        self.caret_moved();
    }

    /// Extra per-character filter applied after the type's own.
    pub fn set_char_filter<F>(&mut self, filter: F)
    where
        F: Fn(char) -> bool + 'static,
    {
        self.char_filter = Some(Box::new(filter));
    }

    pub fn set_undo_capacity(&mut self, capacity: usize) {
        self.history.set_capacity(capacity);
    }

    // ---- callbacks ----

    /// Called with the raw text after every user mutation.
    pub fn set_on_change<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.on_change = Some(Box::new(callback));
    }

    /// Called with the raw text when Enter is pressed in a single-line input.
    pub fn set_on_commit<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.on_commit = Some(Box::new(callback));
    }

    /// Called when Escape is pressed.
    pub fn set_on_cancel<F>(&mut self, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.on_cancel = Some(Box::new(callback));
    }

    pub fn set_on_validation_changed<F>(&mut self, callback: F)
    where
        F: FnMut(&ValidationResult) + 'static,
    {
        self.on_validation_changed = Some(Box::new(callback));
    }

    // ---- text and selection ----

    /// Raw text.
    #[must_use]
    pub fn text(&self) -> String {
        self.edit.text()
    }

    /// Formatted text as painted.
    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display
    }

    /// Replace the text programmatically.
    ///
    /// Clears undo history and puts the caret at the end. Line breaks become
    /// spaces in single-line inputs. `on_change` is not called.
    pub fn set_text(&mut self, text: &str) {
        let text = normalize_line_breaks(text);
        if self.input_type.is_multiline() {
            self.edit.set_text(&text);
        } else {
            self.edit.set_text(&text.replace('\n', " "));
        }
        self.history.clear();
        self.refresh_display();
        self.revalidate_if_needed();
        self.caret_moved();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edit.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edit.is_empty()
    }

    #[must_use]
    pub fn caret(&self) -> usize {
        self.edit.caret()
    }

    /// Move the caret, collapsing the selection.
    pub fn set_caret(&mut self, pos: usize) {
        self.edit.set_caret(pos, false);
        self.caret_moved();
    }

    /// Normalised `(start, end)`.
    #[must_use]
    pub fn selection(&self) -> (usize, usize) {
        self.edit.selection()
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.edit.has_selection()
    }

    #[must_use]
    pub fn selected_text(&self) -> String {
        self.edit.selected_text()
    }

    /// Select from `anchor` to `caret`.
    pub fn select(&mut self, anchor: usize, caret: usize) {
        self.edit.select(anchor, caret);
        self.caret_moved();
    }

    pub fn select_all(&mut self) {
        self.edit.select_all();
        self.caret_moved();
    }

    #[must_use]
    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Current scroll of the content, in pixels.
    #[must_use]
    pub fn scroll_offset(&self) -> PointF {
        self.scroll
    }

    #[must_use]
    pub fn is_caret_visible(&self) -> bool {
        self.caret_visible
    }

    // ---- editing ----

    /// Type `text` at the caret, replacing the selection.
    ///
    /// Characters the input type or the custom filter rejects are dropped,
    /// and the result is cut to fit `max_length`. Returns whether the text
    /// changed.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if self.read_only {
            return false;
        }
        let accepted = self.filter_insert(text);
        if accepted.is_empty() {
            return false;
        }
        self.mutate(|edit| edit.insert(&accepted))
    }

    fn filter_insert(&self, text: &str) -> String {
        let raw: Vec<char> = self.edit.text().chars().collect();
        let (start, end) = self.edit.selection();
        let before: String = raw[..start].iter().collect();
        let after: String = raw[end..].iter().collect();
        let multiline = self.input_type.is_multiline();

        let mut accepted = String::new();
        let mut count = 0;
        for ch in normalize_line_breaks(text).chars() {
            let ch = match ch {
                '\n' | '\t' if !multiline => ' ',
                c => c,
            };
            let candidate = format!("{before}{accepted}{after}");
            let type_ok = self.input_type.accepts(ch, start + count, &candidate);
            let custom_ok = self.char_filter.as_ref().is_none_or(|f| f(ch));
            if type_ok && custom_ok {
                accepted.push(ch);
                count += 1;
            }
        }
        if let Some(max) = self.max_length {
            let remaining = max.saturating_sub(raw.len() - (end - start));
            if count > remaining {
                accepted = accepted.chars().take(remaining).collect();
            }
        }
        accepted
    }

    fn mutate(&mut self, f: impl FnOnce(&mut EditState) -> bool) -> bool {
        if self.read_only {
            return false;
        }
        let before = self.edit.snapshot();
        if !f(&mut self.edit) {
            return false;
        }
        self.history.push(before);
        self.text_changed();
        true
    }

    pub fn delete_backward(&mut self) -> bool {
        self.mutate(EditState::delete_backward)
    }

    pub fn delete_forward(&mut self) -> bool {
        self.mutate(EditState::delete_forward)
    }

    /// Copy the selected raw text. Returns whether anything was copied.
    pub fn copy(&self) -> bool {
        if !self.edit.has_selection() {
            return false;
        }
        clipboard::copy(&self.edit.selected_text());
        true
    }

    pub fn cut(&mut self) -> bool {
        if self.read_only || !self.copy() {
            return false;
        }
        self.mutate(EditState::delete_backward)
    }

    pub fn paste(&mut self) -> bool {
        match clipboard::paste() {
            Some(text) => self.insert_text(&text),
            None => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        let Some(previous) = self.history.undo(self.edit.snapshot()) else {
            return false;
        };
        self.edit.restore(&previous);
        self.text_changed();
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        let Some(next) = self.history.redo(self.edit.snapshot()) else {
            return false;
        };
        self.edit.restore(&next);
        self.text_changed();
        true
    }

    #[must_use]
    pub fn history(&self) -> &UndoRing {
        &self.history
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.read_only && self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.read_only && self.history.can_redo()
    }

    // ---- validation ----

    /// Run the validator, caching the result and notifying on change.
    pub fn validate(&mut self) -> ValidationResult {
        let result = self.validator.validate(&self.edit.text());
        if result != self.validation {
            self.validation = result.clone();
            if let Some(cb) = &mut self.on_validation_changed {
                cb(&result);
            }
            self.base.request_redraw();
        }
        result
    }

    /// Last cached validation result.
    #[must_use]
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    fn revalidate_if_needed(&mut self) {
        if self.validate_on_change {
            self.validate();
        }
    }

    // ---- derived state ----

    fn refresh_display(&mut self) {
        self.display = self.formatter.format(&self.edit.text());
        self.base.request_redraw();
    }

    fn text_changed(&mut self) {
        self.refresh_display();
        self.revalidate_if_needed();
        if let Some(cb) = &mut self.on_change {
            let text = self.edit.text();
            cb(&text);
        }
        self.caret_moved();
    }

    fn caret_moved(&mut self) {
        self.preferred_x = None;
        self.reset_blink();
        self.scroll_to_caret();
        self.base.request_redraw();
    }

    fn reset_blink(&mut self) {
        self.caret_visible = true;
        self.blink_from = None;
    }

    fn metrics(&self) -> FontMetrics {
        FontMetrics::for_font(&self.style.font)
    }

    /// Content area in local coordinates.
    #[must_use]
    pub fn content_rect(&self) -> RectF {
        let size = self.base.bounds().size();
        let inset = self.style.padding + self.style.border_width;
        RectF::new(
            inset,
            inset,
            (f64::from(size.width) - inset * 2.0).max(0.0),
            (f64::from(size.height) - inset * 2.0).max(0.0),
        )
    }

    fn display_lines(&self) -> Vec<&str> {
        self.display.split('\n').collect()
    }

    fn display_line_col(&self, index: usize) -> (usize, usize) {
        let lines = self.display_lines();
        let mut remaining = index;
        for (i, line) in lines.iter().enumerate() {
            let n = line.chars().count();
            if remaining <= n || i + 1 == lines.len() {
                return (i, remaining.min(n));
            }
            remaining -= n + 1;
        }
        (0, 0)
    }

    fn display_offset(&self, line: usize, col: usize) -> usize {
        let lines = self.display_lines();
        let before: usize = lines.iter().take(line).map(|l| l.chars().count() + 1).sum();
        before + col
    }

    fn to_display(&self, raw_index: usize) -> usize {
        self.formatter.display_index(&self.edit.text(), raw_index)
    }

    fn to_raw(&self, display_index: usize) -> usize {
        self.formatter
            .raw_index(&self.edit.text(), display_index)
            .min(self.edit.len())
    }

    /// Caret position relative to the unscrolled content origin.
    fn caret_offset(&self) -> PointF {
        let metrics = self.metrics();
        let (line, col) = self.display_line_col(self.to_display(self.edit.caret()));
        let lines = self.display_lines();
        let text = lines.get(line).copied().unwrap_or("");
        PointF::new(metrics.prefix_width(text, col), line as f64 * metrics.line_height())
    }

    /// Caret rectangle in local coordinates.
    #[must_use]
    pub fn caret_rect(&self) -> RectF {
        let content = self.content_rect();
        let offset = self.caret_offset();
        RectF::new(
            content.x + offset.x - self.scroll.x,
            content.y + offset.y - self.scroll.y,
            CARET_WIDTH,
            self.metrics().line_height(),
        )
    }

    fn scroll_to_caret(&mut self) {
        let content = self.content_rect();
        let pad = self.style.padding;
        let metrics = self.metrics();
        let caret = self.caret_offset();

        let visible_x = caret.x - self.scroll.x;
        if visible_x > content.width - pad {
            self.scroll.x = caret.x - (content.width - pad);
        } else if visible_x < pad {
            self.scroll.x = caret.x - pad;
        }
        let widest = self
            .display_lines()
            .iter()
            .map(|l| metrics.text_width(l))
            .fold(0.0, f64::max);
        let max_x = (widest + pad - content.width).max(0.0);
        self.scroll.x = self.scroll.x.clamp(0.0, max_x.max(caret.x));

        if self.input_type.is_multiline() {
            let lh = metrics.line_height();
            if caret.y < self.scroll.y {
                self.scroll.y = caret.y;
            } else if caret.y + lh > self.scroll.y + content.height {
                self.scroll.y = caret.y + lh - content.height;
            }
            self.scroll.y = self.scroll.y.max(0.0);
        } else {
            self.scroll.y = 0.0;
        }
    }

    /// Raw index under a local point: the line by y, then the largest
    /// prefix whose width fits.
    #[must_use]
    pub fn index_at_point(&self, local: Point) -> usize {
        let content = self.content_rect();
        let metrics = self.metrics();
        let x = f64::from(local.x) - content.x + self.scroll.x;
        let y = f64::from(local.y) - content.y + self.scroll.y;
        let lines = self.display_lines();
        let line = if self.input_type.is_multiline() {
            ((y / metrics.line_height()).floor().max(0.0) as usize).min(lines.len() - 1)
        } else {
            0
        };
        let col = metrics.index_at_x(lines[line], x);
        self.to_raw(self.display_offset(line, col))
    }

    fn move_vertical(&mut self, down: bool, extend: bool) {
        let metrics = self.metrics();
        let (line, col) = self.display_line_col(self.to_display(self.edit.caret()));
        let lines = self.display_lines();
        let target_x = self
            .preferred_x
            .unwrap_or_else(|| metrics.prefix_width(lines[line], col));
        let target = if !down && line == 0 {
            0
        } else if down && line + 1 >= lines.len() {
            self.edit.len()
        } else {
            let next = if down { line + 1 } else { line - 1 };
            let col = nearest_index(&metrics, lines[next], target_x);
            self.to_raw(self.display_offset(next, col))
        };
        self.edit.set_caret(target, extend);
        self.caret_moved();
        self.preferred_x = Some(target_x);
    }

    // ---- event handling ----

    fn handle_key(&mut self, event: &Event) -> bool {
        let mods = event.modifiers;
        let shift = mods.contains(Modifiers::SHIFT);
        let command = mods.intersects(Modifiers::CTRL | Modifiers::META);
        let multiline = self.input_type.is_multiline();
        match event.key {
            KeyCode::Left => {
                if command {
                    self.edit.move_word_left(shift);
                } else {
                    self.edit.move_left(shift);
                }
                self.caret_moved();
            }
            KeyCode::Right => {
                if command {
                    self.edit.move_word_right(shift);
                } else {
                    self.edit.move_right(shift);
                }
                self.caret_moved();
            }
            KeyCode::Up | KeyCode::Down if multiline => {
                self.move_vertical(event.key == KeyCode::Down, shift);
            }
            KeyCode::Home => {
                if command {
                    self.edit.move_doc_start(shift);
                } else {
                    self.edit.move_line_start(shift);
                }
                self.caret_moved();
            }
            KeyCode::End => {
                if command {
                    self.edit.move_doc_end(shift);
                } else {
                    self.edit.move_line_end(shift);
                }
                self.caret_moved();
            }
            KeyCode::Backspace => {
                if command {
                    self.mutate(EditState::delete_word_backward);
                } else {
                    self.mutate(EditState::delete_backward);
                }
            }
            KeyCode::Delete => {
                if command {
                    self.mutate(EditState::delete_word_forward);
                } else {
                    self.mutate(EditState::delete_forward);
                }
            }
            KeyCode::A if command => self.select_all(),
            KeyCode::C if command => {
                self.copy();
            }
            KeyCode::X if command => {
                self.cut();
            }
            KeyCode::V if command => {
                self.paste();
            }
            KeyCode::Z if command => {
                if shift {
                    self.redo();
                } else {
                    self.undo();
                }
            }
            KeyCode::Y if command => {
                self.redo();
            }
            KeyCode::Enter | KeyCode::NumpadEnter => {
                if multiline {
                    self.insert_text("\n");
                } else {
                    self.commit();
                }
            }
            KeyCode::Escape => match &mut self.on_cancel {
                Some(cb) => cb(),
                None => return false,
            },
            KeyCode::Tab if multiline && !command && !shift => {
                self.insert_text("\t");
            }
            // Typing keys produce a TextInput event; keep them from hotkeys.
            key => return key.is_printable() && !mods.has_command(),
        }
        true
    }

    fn commit(&mut self) {
        self.validate();
        if let Some(cb) = &mut self.on_commit {
            let text = self.edit.text();
            cb(&text);
        }
    }

    fn handle_pointer(&mut self, event: &Event) -> bool {
        match event.kind {
            EventKind::MouseDown if event.button == MouseButton::Left => {
                let index = self.index_at_point(event.local);
                self.edit.set_caret(index, event.shift());
                self.dragging = true;
                self.caret_moved();
                true
            }
            EventKind::MouseMove if self.dragging => {
                let index = self.index_at_point(event.local);
                self.edit.set_caret(index, true);
                self.caret_moved();
                true
            }
            EventKind::MouseUp if self.dragging => {
                self.dragging = false;
                true
            }
            EventKind::MouseDoubleClick => {
                let index = self.index_at_point(event.local);
                self.edit.select_word_at(index);
                self.caret_moved();
                true
            }
            _ => false,
        }
    }

    fn paint_selection(&self, ctx: &mut dyn RenderContext, metrics: &FontMetrics) {
        let (start, end) = self.edit.selection();
        let (ds, de) = (self.to_display(start), self.to_display(end));
        let lh = metrics.line_height();
        ctx.set_fill_color(self.style.selection_color);
        let mut line_start = 0;
        for (i, line) in self.display_lines().iter().enumerate() {
            let len = line.chars().count();
            let line_end = line_start + len;
            let from = ds.max(line_start);
            let to = de.min(line_end);
            if from < to {
                let x0 = metrics.prefix_width(line, from - line_start);
                let x1 = metrics.prefix_width(line, to - line_start);
                ctx.fill_rectangle(RectF::new(x0, i as f64 * lh, x1 - x0, lh));
            }
            line_start = line_end + 1;
        }
    }
}

/// `\r\n` and lone `\r` become `\n`.
fn normalize_line_breaks(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Index on `line` whose prefix width is closest to `x`.
fn nearest_index(metrics: &FontMetrics, line: &str, x: f64) -> usize {
    let widths = metrics.prefix_widths(line);
    let mut best = 0;
    for (i, w) in widths.iter().enumerate() {
        if (w - x).abs() < (widths[best] - x).abs() {
            best = i;
        }
    }
    best
}

impl Element for TextInput {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn render(&self, ctx: &mut dyn RenderContext) {
        let size = self.base.bounds().size();
        let local = RectF::new(0.0, 0.0, f64::from(size.width), f64::from(size.height));
        let style = &self.style;
        let focused = self.base.is_focused();

        ctx.set_fill_color(style.background);
        ctx.fill_rectangle(local);
        let border = if self.validation.is_valid() {
            if focused { style.focus_border_color } else { style.border_color }
        } else {
            self.validation
                .state
                .border_color(style.border_color, style.warning_color, style.invalid_color)
        };
        if style.border_width > 0.0 {
            let half = style.border_width / 2.0;
            ctx.set_stroke_color(border);
            ctx.set_stroke_width(style.border_width);
            ctx.draw_rectangle(RectF::new(
                half,
                half,
                local.width - style.border_width,
                local.height - style.border_width,
            ));
        }

        let content = self.content_rect();
        let metrics = self.metrics();
        let lh = metrics.line_height();

        ctx.push_state();
        ctx.clip_rect(content);
        ctx.translate(content.x - self.scroll.x, content.y - self.scroll.y);
        if self.edit.has_selection() {
            self.paint_selection(ctx, &metrics);
        }
        let mut text_style = TextStyle {
            font: style.font.clone(),
            color: style.text_color,
            ..TextStyle::default()
        };
        if self.display.is_empty() {
            if let Some(placeholder) = self.placeholder() {
                text_style.color = style.placeholder_color;
                ctx.set_text_style(text_style);
                ctx.draw_text(&placeholder, PointF::new(0.0, metrics.ascent()));
            }
        } else {
            ctx.set_text_style(text_style);
            for (i, line) in self.display_lines().iter().enumerate() {
                if !line.is_empty() {
                    ctx.draw_text(line, PointF::new(0.0, i as f64 * lh + metrics.ascent()));
                }
            }
        }
        ctx.pop_state();

        // The caret is drawn outside the content clip so it stays visible
        // on the right edge.
        if focused && self.caret_visible {
            ctx.set_fill_color(style.caret_color);
            ctx.fill_rectangle(self.caret_rect());
        }
    }

    fn on_event(&mut self, event: &Event) -> bool {
        match event.kind {
            // A held typing key repeats the character of its press.
            EventKind::KeyRepeat
                if event.character.is_some_and(|c| !c.is_control())
                    && !event.modifiers.intersects(Modifiers::CTRL | Modifiers::META) =>
            {
                self.insert_text(&event.text);
                true
            }
            EventKind::KeyDown | EventKind::KeyRepeat => self.handle_key(event),
            EventKind::TextInput => {
                if event.modifiers.intersects(Modifiers::CTRL | Modifiers::META) {
                    return false;
                }
                self.insert_text(&event.text);
                true
            }
            EventKind::FocusGained => {
                self.reset_blink();
                self.base.request_redraw();
                false
            }
            EventKind::FocusLost => {
                self.dragging = false;
                if self.validate_on_blur {
                    self.validate();
                }
                self.base.request_redraw();
                false
            }
            k if k.is_pointer() => self.handle_pointer(event),
            _ => false,
        }
    }

    fn tick(&mut self, now: Duration) {
        if !self.base.is_focused() {
            return;
        }
        match self.blink_from {
            None => self.blink_from = Some(now),
            Some(from) if now.saturating_sub(from) >= CARET_BLINK_INTERVAL => {
                self.caret_visible = !self.caret_visible;
                self.blink_from = Some(now);
                self.base.request_redraw();
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: Modifiers) -> Event {
        Event::key_down(code, mods)
    }

    fn typed(input: &mut TextInput, text: &str) {
        for ch in text.chars() {
            input.on_event(&Event::text_input(ch.to_string()));
        }
    }

    #[test]
    fn test_insertion_and_undo() {
        let mut input = TextInput::new("t", InputType::Text).with_text("foo");
        assert_eq!(input.caret(), 3);
        typed(&mut input, "bar");
        assert_eq!(input.text(), "foobar");
        assert_eq!(input.caret(), 6);
        assert_eq!(input.history().undo_depth(), 3);
        for _ in 0..3 {
            assert!(input.undo());
        }
        assert_eq!(input.text(), "foo");
        assert_eq!(input.caret(), 3);
        assert!(!input.undo());
    }

    #[test]
    fn test_undo_redo_restores_selection() {
        let mut input = TextInput::new("t", InputType::Text).with_text("hello world");
        input.select(0, 5);
        input.insert_text("bye");
        input.undo();
        assert_eq!(input.selection(), (0, 5));
        input.redo();
        assert_eq!(input.text(), "bye world");
        assert_eq!(input.caret(), 3);
    }

    #[test]
    fn test_caret_motion_is_not_a_checkpoint() {
        let mut input = TextInput::new("t", InputType::Text).with_text("abc");
        input.on_event(&key(KeyCode::Left, Modifiers::empty()));
        input.on_event(&key(KeyCode::Home, Modifiers::empty()));
        assert_eq!(input.caret(), 0);
        assert_eq!(input.history().undo_depth(), 0);
    }

    #[test]
    fn test_password_copy_yields_raw() {
        let mut input = TextInput::new("pw", InputType::Password);
        typed(&mut input, "secret");
        assert_eq!(input.display_text(), "******");
        input.on_event(&key(KeyCode::A, Modifiers::CTRL));
        input.on_event(&key(KeyCode::C, Modifiers::CTRL));
        assert_eq!(clipboard::paste().as_deref(), Some("secret"));
    }

    #[test]
    fn test_phone_filter_and_limit() {
        let mut input = TextInput::new("p", InputType::Phone);
        typed(&mut input, "555-123-4567 99");
        assert_eq!(input.text(), "5551234567");
        assert_eq!(input.display_text(), "(555) 123-4567");
        assert!(input.validation().is_valid());
    }

    #[test]
    fn test_read_only_allows_selection_and_copy() {
        let mut input = TextInput::new("r", InputType::Text).with_text("fixed");
        input.set_read_only(true);
        typed(&mut input, "x");
        assert!(!input.delete_backward());
        input.select_all();
        assert!(input.copy());
        assert!(!input.cut());
        assert_eq!(input.text(), "fixed");
        assert_eq!(clipboard::paste().as_deref(), Some("fixed"));
    }

    #[test]
    fn test_enter_commits_and_escape_cancels() {
        use std::cell::RefCell;
        use std::rc::Rc;
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut input = TextInput::new("c", InputType::Text).with_text("done");
        let l = Rc::clone(&log);
        input.set_on_commit(move |t| l.borrow_mut().push(format!("commit {t}")));
        assert!(!input.on_event(&key(KeyCode::Escape, Modifiers::empty())));
        let l = Rc::clone(&log);
        input.set_on_cancel(move || l.borrow_mut().push(String::from("cancel")));
        input.on_event(&key(KeyCode::Enter, Modifiers::empty()));
        input.on_event(&key(KeyCode::Escape, Modifiers::empty()));
        assert_eq!(*log.borrow(), ["commit done", "cancel"]);
    }

    #[test]
    fn test_multiline_vertical_motion_keeps_x() {
        let mut input = TextInput::new("m", InputType::Multiline).with_text("abcdef\nab\nabcdef");
        input.set_caret(5);
        input.on_event(&key(KeyCode::Down, Modifiers::empty()));
        assert_eq!(input.caret(), 9);
        input.on_event(&key(KeyCode::Down, Modifiers::empty()));
        assert_eq!(input.caret(), 15);
        input.on_event(&key(KeyCode::Down, Modifiers::empty()));
        assert_eq!(input.caret(), input.len());
        input.set_caret(2);
        input.on_event(&key(KeyCode::Up, Modifiers::empty()));
        assert_eq!(input.caret(), 0);
    }

    #[test]
    fn test_tab_in_multiline_inserts() {
        let mut single = TextInput::new("s", InputType::Text);
        assert!(!single.on_event(&key(KeyCode::Tab, Modifiers::empty())));
        let mut multi = TextInput::new("m", InputType::Multiline);
        assert!(multi.on_event(&key(KeyCode::Tab, Modifiers::empty())));
        assert_eq!(multi.text(), "\t");
    }

    #[test]
    fn test_line_breaks_normalized() {
        let multi = TextInput::new("m", InputType::Multiline).with_text("a\r\nb\rc\n");
        assert_eq!(multi.text(), "a\nb\nc\n");
        assert_eq!(multi.edit_state().line_count(), 4);
        assert_eq!(multi.edit_state().line_text(1), "b");

        let single = TextInput::new("s", InputType::Text).with_text("a\r\nb\rc");
        assert_eq!(single.text(), "a b c");

        let mut pasted = TextInput::new("p", InputType::Multiline);
        pasted.insert_text("x\ry\r\nz");
        assert_eq!(pasted.text(), "x\ny\nz");
    }

    #[test]
    fn test_key_repeat_types_its_character() {
        let held = Event::key_repeat(KeyCode::A, Modifiers::empty()).with_character('a');
        let mut input = TextInput::new("t", InputType::Text).with_text("a");
        assert!(input.on_event(&held));
        assert!(input.on_event(&held));
        assert_eq!(input.text(), "aaa");
        assert_eq!(input.history().undo_depth(), 2);

        let mut digits = TextInput::new("i", InputType::Integer);
        assert!(digits.on_event(&held));
        assert_eq!(digits.text(), "");

        // Repeats without a character stay editing commands.
        input.on_event(&Event::key_repeat(KeyCode::Backspace, Modifiers::empty()));
        assert_eq!(input.text(), "aa");

        let shortcut = Event::key_repeat(KeyCode::B, Modifiers::CTRL).with_character('b');
        assert!(!input.on_event(&shortcut));
        assert_eq!(input.text(), "aa");

        let mut fixed = TextInput::new("r", InputType::Text).with_text("x");
        fixed.set_read_only(true);
        fixed.on_event(&held);
        assert_eq!(fixed.text(), "x");
    }

    #[test]
    fn test_validation_callback_on_blur() {
        use std::cell::Cell;
        use std::rc::Rc;
        let changes = Rc::new(Cell::new(0));
        let mut input = TextInput::new("e", InputType::Email);
        input.set_validate_on_change(false);
        let c = Rc::clone(&changes);
        input.set_on_validation_changed(move |_| c.set(c.get() + 1));
        typed(&mut input, "nope");
        assert!(input.validation().is_valid());
        input.on_event(&Event::focus_lost());
        assert_eq!(input.validation().state, ValidationState::Invalid);
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn test_blink_resets_on_edit() {
        let mut input = TextInput::new("b", InputType::Text);
        input.base_mut().set_focused(true);
        input.tick(Duration::ZERO);
        input.tick(CARET_BLINK_INTERVAL);
        assert!(!input.is_caret_visible());
        typed(&mut input, "a");
        assert!(input.is_caret_visible());
    }

    #[test]
    fn test_click_hit_test() {
        let mut input = TextInput::new("h", InputType::Text)
            .with_style(TextInputStyle::default().with_font(FontStyle::new("Mono", 10.0)))
            .with_text("abcdef");
        // Content starts at x = 5; each glyph is 6px wide.
        assert_eq!(input.index_at_point(Point::new(5, 10)), 0);
        assert_eq!(input.index_at_point(Point::new(5 + 13, 10)), 2);
        assert_eq!(input.index_at_point(Point::new(500, 10)), 6);
        let mut down = Event::mouse_down(Point::ZERO, MouseButton::Left);
        down.local = Point::new(5 + 6, 10);
        input.on_event(&down);
        assert_eq!(input.caret(), 1);
        let mut drag = Event::mouse_move(Point::ZERO);
        drag.local = Point::new(5 + 24, 10);
        input.on_event(&drag);
        assert_eq!(input.selection(), (1, 4));
    }
}
