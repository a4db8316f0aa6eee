//! Login / signup / OTP overlay.
//!
//! Wraps the core `AuthDialog` with keyboard focus and rendering. Moving focus
//! away from a field blurs it, which is what triggers field validation.

use careerhub_core::api::RequestKind;
use careerhub_core::auth::{
    AuthDialog, AuthReply, DialogOutcome, Field, SubmitError, Tab, ValidationPolicy,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::OverlayUpdate;
use super::render_utils::{
    InputHint, InputLine, calculate_overlay_area, render_hints, render_input_line,
    render_overlay_container, render_separator,
};
use crate::common::{mask, truncate_with_ellipsis};
use crate::effects::UiEffect;

const POPUP_WIDTH: u16 = 60;
/// Label, input, and error line per field.
const FIELD_HEIGHT: u16 = 3;
const ACCENT: Color = Color::Cyan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The Login/Signup switcher. Not reachable during the OTP step.
    Tabs,
    Field(usize),
}

#[derive(Debug)]
pub struct AuthOverlayState {
    pub dialog: AuthDialog,
    pub focus: Focus,
}

impl AuthOverlayState {
    pub fn open(tab: Tab, policy: ValidationPolicy) -> Self {
        Self {
            dialog: AuthDialog::new(tab, policy),
            focus: Focus::Field(0),
        }
    }

    pub fn focused_field(&self) -> Option<Field> {
        match self.focus {
            Focus::Tabs => None,
            Focus::Field(index) => self.dialog.fields().get(index).copied(),
        }
    }

    /// Feeds a server reply to the dialog and fixes up focus for the new form.
    pub fn apply_reply(&mut self, kind: RequestKind, reply: AuthReply) -> DialogOutcome {
        let outcome = self.dialog.handle_response(kind, reply);
        if matches!(outcome, DialogOutcome::AwaitOtp { .. }) {
            self.focus = Focus::Field(0);
        }
        outcome
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.close(),
            KeyCode::Char('c') if ctrl => self.close(),
            KeyCode::Char('t') if ctrl => {
                self.switch_tab();
                OverlayUpdate::stay()
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                OverlayUpdate::stay()
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                OverlayUpdate::stay()
            }
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                match (self.focus, self.focused_field()) {
                    (Focus::Tabs, _) => self.switch_tab(),
                    (_, Some(Field::UserType)) => self.dialog.cycle_usertype(forward),
                    _ => {}
                }
                OverlayUpdate::stay()
            }
            KeyCode::Backspace => {
                if let Some(field) = self.editable_field() {
                    let mut value = self.dialog.value(field);
                    value.pop();
                    self.dialog.set_field(field, value);
                }
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if !ctrl => {
                if let Some(field) = self.editable_field() {
                    let mut value = self.dialog.value(field);
                    value.push(c);
                    self.dialog.set_field(field, value);
                }
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    fn close(&mut self) -> OverlayUpdate {
        self.dialog.close();
        OverlayUpdate::close()
    }

    fn switch_tab(&mut self) {
        let before = self.dialog.tab();
        self.dialog.select_tab(before.other());
        if self.dialog.tab() != before && self.focus != Focus::Tabs {
            self.focus = Focus::Field(0);
        }
    }

    fn editable_field(&self) -> Option<Field> {
        self.focused_field().filter(|field| *field != Field::UserType)
    }

    fn submit(&mut self) -> OverlayUpdate {
        if let Some(field) = self.focused_field() {
            self.dialog.blur(field);
        }
        match self.dialog.submit() {
            Ok(request) => OverlayUpdate::stay().with_ui_effects(vec![UiEffect::SubmitAuth { request }]),
            Err(SubmitError::InFlight) => OverlayUpdate::stay(),
            Err(SubmitError::Invalid(errors)) => {
                let fields = self.dialog.fields();
                if let Some(index) = errors
                    .iter()
                    .filter_map(|(field, _)| fields.iter().position(|f| *f == field))
                    .min()
                {
                    self.focus = Focus::Field(index);
                }
                OverlayUpdate::stay()
            }
        }
    }

    fn move_focus(&mut self, forward: bool) {
        if let Some(field) = self.focused_field() {
            self.dialog.blur(field);
        }
        let count = self.dialog.fields().len();
        let with_tabs = !self.dialog.is_otp();
        self.focus = match (self.focus, forward) {
            (Focus::Tabs, true) => Focus::Field(0),
            (Focus::Tabs, false) => Focus::Field(count.saturating_sub(1)),
            (Focus::Field(i), true) if i + 1 < count => Focus::Field(i + 1),
            (Focus::Field(i), false) if i > 0 => Focus::Field(i - 1),
            (Focus::Field(_), true) if with_tabs => Focus::Tabs,
            (Focus::Field(_), true) => Focus::Field(0),
            (Focus::Field(_), false) if with_tabs => Focus::Tabs,
            (Focus::Field(_), false) => Focus::Field(count.saturating_sub(1)),
        };
    }

    fn title(&self) -> &'static str {
        if self.dialog.is_otp() {
            "Verify OTP"
        } else {
            match self.dialog.tab() {
                Tab::Login => "Login",
                Tab::Signup => "Sign Up",
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let fields = self.dialog.fields();
        let field_count = u16::try_from(fields.len()).unwrap_or(u16::MAX);
        // Border, tab bar + separator, fields, status, hints.
        let height = 2 + 2 + field_count.saturating_mul(FIELD_HEIGHT) + 1 + 1;
        let popup = calculate_overlay_area(area, POPUP_WIDTH, height);
        render_overlay_container(frame, popup, self.title(), ACCENT);

        let inner = Rect::new(
            popup.x + 2,
            popup.y + 1,
            popup.width.saturating_sub(4),
            popup.height.saturating_sub(2),
        );
        if inner.height == 0 {
            return;
        }

        self.render_tab_bar(frame, Rect::new(inner.x, inner.y, inner.width, 1));
        render_separator(frame, inner, 1);

        let mut y = inner.y + 2;
        for (index, field) in fields.iter().enumerate() {
            if y + FIELD_HEIGHT > inner.y + inner.height {
                break;
            }
            let focused = self.focus == Focus::Field(index);
            self.render_field(frame, Rect::new(inner.x, y, inner.width, FIELD_HEIGHT), *field, focused);
            y += FIELD_HEIGHT;
        }

        let status_y = inner.y + inner.height.saturating_sub(2);
        if self.dialog.is_submitting() {
            frame.render_widget(
                Paragraph::new(Span::styled("Submitting...", Style::default().fg(Color::Yellow))),
                Rect::new(inner.x, status_y, inner.width, 1),
            );
        }

        let hints = if self.dialog.is_otp() {
            vec![
                InputHint::new("Enter", "verify"),
                InputHint::new("Esc", "close"),
            ]
        } else {
            vec![
                InputHint::new("Tab", "next"),
                InputHint::new("^T", "switch"),
                InputHint::new("Enter", "submit"),
                InputHint::new("Esc", "close"),
            ]
        };
        render_hints(frame, inner, &hints, ACCENT);
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let locked = self.dialog.is_otp();
        let mut spans = Vec::new();
        for tab in [Tab::Login, Tab::Signup] {
            let active = self.dialog.tab() == tab;
            let mut style = if active {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else if locked {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Gray)
            };
            if active && self.focus == Focus::Tabs {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!(" {} ", tab.label()), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_field(&self, frame: &mut Frame, area: Rect, field: Field, focused: bool) {
        let label_style = if focused {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(field.label(), label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let input_area = Rect::new(area.x, area.y + 1, area.width, 1);
        if field == Field::UserType {
            let value = self
                .dialog
                .form()
                .usertype
                .map_or("select with ← →", |t| t.label());
            let color = if self.dialog.form().usertype.is_some() {
                Color::White
            } else {
                Color::DarkGray
            };
            let arrows = if focused { ACCENT } else { Color::DarkGray };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("‹ ", Style::default().fg(arrows)),
                    Span::styled(value, Style::default().fg(color)),
                    Span::styled(" ›", Style::default().fg(arrows)),
                ])),
                input_area,
            );
        } else {
            let raw = self.dialog.value(field);
            let value = if field.is_secret() { mask(&raw) } else { raw };
            render_input_line(
                frame,
                input_area,
                &InputLine {
                    value: &value,
                    placeholder: placeholder(field),
                    prompt: "> ",
                    focused,
                    prompt_color: if focused { ACCENT } else { Color::DarkGray },
                    text_color: Color::White,
                    placeholder_color: Color::DarkGray,
                    cursor_color: ACCENT,
                },
            );
        }

        if let Some(error) = self.dialog.error(field) {
            let message = truncate_with_ellipsis(&error.to_string(), area.width as usize);
            frame.render_widget(
                Paragraph::new(Span::styled(message, Style::default().fg(Color::Red))),
                Rect::new(area.x, area.y + 2, area.width, 1),
            );
        }
    }
}

fn placeholder(field: Field) -> Option<&'static str> {
    match field {
        Field::Email => Some("you@example.com"),
        Field::AlumniDesc => Some("optional"),
        Field::Otp => Some("code from your email"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use careerhub_core::api::{AuthRequest, ServerMessage};
    use careerhub_core::auth::{FieldError, OTP_SENT_MESSAGE, UserType};
    use crossterm::event::KeyEventKind;

    use super::*;
    use crate::overlays::OverlayTransition;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(state: &mut AuthOverlayState, text: &str) {
        for c in text.chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn login_overlay() -> AuthOverlayState {
        AuthOverlayState::open(Tab::Login, ValidationPolicy::default())
    }

    #[test]
    fn test_arrows_cycle_usertype_on_first_field() {
        let mut state = login_overlay();
        assert_eq!(state.focused_field(), Some(Field::UserType));
        state.handle_key(key(KeyCode::Right));
        assert_eq!(state.dialog.form().usertype, Some(UserType::Outsider));
        state.handle_key(key(KeyCode::Left));
        assert_eq!(state.dialog.form().usertype, Some(UserType::Alumni));
    }

    #[test]
    fn test_tab_blurs_and_validates() {
        let mut state = login_overlay();
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.focused_field(), Some(Field::Email));
        assert_eq!(
            state.dialog.error(Field::UserType),
            Some(&FieldError::Required(Field::UserType))
        );

        type_text(&mut state, "nope");
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.dialog.error(Field::Email), Some(&FieldError::InvalidEmail));
    }

    #[test]
    fn test_focus_wraps_through_tab_bar() {
        let mut state = login_overlay();
        state.handle_key(key(KeyCode::BackTab));
        assert_eq!(state.focus, Focus::Tabs);
        state.handle_key(key(KeyCode::Right));
        assert_eq!(state.dialog.tab(), Tab::Signup);
        assert_eq!(state.focus, Focus::Tabs);
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.focused_field(), Some(Field::UserType));
    }

    #[test]
    fn test_ctrl_t_switches_and_resets_form() {
        let mut state = login_overlay();
        state.handle_key(key(KeyCode::Down));
        type_text(&mut state, "a@b.com");
        state.handle_key(ctrl('t'));
        assert_eq!(state.dialog.tab(), Tab::Signup);
        assert!(state.dialog.form().email.is_empty());
        assert_eq!(state.focus, Focus::Field(0));
    }

    #[test]
    fn test_invalid_submit_focuses_first_error() {
        let mut state = login_overlay();
        state.handle_key(key(KeyCode::Right));
        state.handle_key(key(KeyCode::Tab));
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.focused_field(), Some(Field::Password));

        let update = state.handle_key(key(KeyCode::Enter));
        assert!(update.effects.is_empty());
        assert_eq!(state.focused_field(), Some(Field::Email));
    }

    #[test]
    fn test_valid_submit_emits_effect() {
        let mut state = login_overlay();
        state.handle_key(key(KeyCode::Right));
        state.handle_key(key(KeyCode::Tab));
        type_text(&mut state, "a@b.com");
        state.handle_key(key(KeyCode::Tab));
        type_text(&mut state, "secret");

        let update = state.handle_key(key(KeyCode::Enter));
        assert_eq!(update.transition, OverlayTransition::Stay);
        assert!(matches!(
            update.effects.as_slice(),
            [UiEffect::SubmitAuth {
                request: AuthRequest::Login(_)
            }]
        ));
        // Second Enter while in flight does nothing.
        assert!(state.handle_key(key(KeyCode::Enter)).effects.is_empty());
    }

    #[test]
    fn test_otp_step_after_signup() {
        let mut state = AuthOverlayState::open(Tab::Signup, ValidationPolicy::default());
        state.handle_key(key(KeyCode::Right));
        state.handle_key(key(KeyCode::Tab));
        type_text(&mut state, "Asha");
        state.handle_key(key(KeyCode::Tab));
        type_text(&mut state, "asha@example.com");
        state.handle_key(key(KeyCode::Tab));
        type_text(&mut state, "Abcdef1!");
        state.handle_key(key(KeyCode::Tab));
        type_text(&mut state, "Abcdef1!");
        let update = state.handle_key(key(KeyCode::Enter));
        assert_eq!(update.effects.len(), 1);

        let outcome = state.apply_reply(
            RequestKind::Signup,
            AuthReply::Ok(ServerMessage::new(OTP_SENT_MESSAGE)),
        );
        assert!(matches!(outcome, DialogOutcome::AwaitOtp { .. }));
        assert_eq!(state.focused_field(), Some(Field::Otp));

        type_text(&mut state, "4321");
        assert_eq!(state.dialog.value(Field::Otp), "4321");
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.dialog.value(Field::Otp), "432");

        // Tab bar is locked during OTP entry.
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.focused_field(), Some(Field::Otp));
    }

    #[test]
    fn test_escape_closes() {
        let mut state = login_overlay();
        let update = state.handle_key(KeyEvent {
            code: KeyCode::Esc,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        });
        assert_eq!(update.transition, OverlayTransition::Close);
    }
}
