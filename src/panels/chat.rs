//! Chat panel: transcript, model selector and composer.
//!
//! The controller methods (`begin_send`, `apply_answer`, `apply_failure`,
//! `clear`) are plain state transitions with no I/O; `ui` renders the
//! panel and returns the request to dispatch, so the app shell owns the
//! actual network call.

use crate::backend::QueryRequest;
use crate::theme::Theme;
use crate::transcript::{ChatMessage, ChatModel, Role};
use eframe::egui::{self, RichText, ScrollArea};

const EXAMPLE_QUESTIONS: [&str; 3] = [
    "What is the main topic of the document?",
    "Summarize the key points",
    "What are the important details?",
];

pub struct ChatPanel {
    transcript: Vec<ChatMessage>,
    input_buffer: String,
    selected_model: ChatModel,
    is_loading: bool,
    scroll_to_bottom: bool,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPanel {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            input_buffer: String::new(),
            selected_model: ChatModel::default(),
            is_loading: false,
            scroll_to_bottom: false,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Stages a send: appends the user message, clears the input and sets
    /// the loading flag, returning the request to dispatch. Refuses
    /// whitespace-only input and refuses while a request is in flight.
    pub fn begin_send(&mut self) -> Option<QueryRequest> {
        if self.is_loading {
            return None;
        }
        let query = self.input_buffer.trim().to_string();
        if query.is_empty() {
            return None;
        }

        self.transcript.push(ChatMessage::user(query.clone()));
        self.input_buffer.clear();
        self.is_loading = true;
        self.scroll_to_bottom = true;
        Some(QueryRequest {
            query,
            model: self.selected_model.wire_name().to_string(),
        })
    }

    pub fn apply_answer(&mut self, answer: String, sources: Vec<String>, audit_id: String) {
        self.transcript
            .push(ChatMessage::assistant(answer, sources, audit_id));
        self.is_loading = false;
        self.scroll_to_bottom = true;
    }

    pub fn apply_failure(&mut self, message: String) {
        self.transcript
            .push(ChatMessage::error(format!("Error: {message}")));
        self.is_loading = false;
        self.scroll_to_bottom = true;
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, theme: &Theme) -> Option<QueryRequest> {
        self.render_header(ui, theme);
        ui.separator();

        let transcript_height = (ui.available_height() - 110.0).max(120.0);
        ScrollArea::vertical()
            .id_salt("chat_transcript")
            .max_height(transcript_height)
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if self.transcript.is_empty() && !self.is_loading {
                    render_empty_state(ui, theme);
                } else {
                    for message in &self.transcript {
                        render_message(ui, theme, message);
                    }
                    if self.is_loading {
                        ui.horizontal(|ui| {
                            ui.add(egui::Spinner::new());
                            ui.label(RichText::new("Thinking...").color(theme.text_muted));
                        });
                    }
                }
                if self.scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
        self.scroll_to_bottom = false;

        ui.separator();
        self.render_composer(ui)
    }

    fn render_header(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.heading("Ask Questions");
                ui.label(
                    RichText::new("Ask anything about your uploaded documents")
                        .small()
                        .color(theme.text_muted),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !self.transcript.is_empty() && ui.button("Clear").clicked() {
                    self.clear();
                }
                egui::ComboBox::from_id_salt("model_select")
                    .selected_text(self.selected_model.label())
                    .show_ui(ui, |ui| {
                        for model in ChatModel::ALL {
                            ui.selectable_value(&mut self.selected_model, model, model.label());
                        }
                    });
            });
        });
    }

    fn render_composer(&mut self, ui: &mut egui::Ui) -> Option<QueryRequest> {
        let input_enabled = !self.is_loading;
        let hint = if self.is_loading {
            "Waiting for response..."
        } else {
            "Type your question here..."
        };

        let mut send_now = false;
        ui.horizontal(|ui| {
            let composer = ui.add_enabled(
                input_enabled,
                egui::TextEdit::multiline(&mut self.input_buffer)
                    .id_salt("chat_composer")
                    .desired_rows(2)
                    .desired_width((ui.available_width() - 70.0).max(120.0))
                    .hint_text(hint),
            );
            // Plain Enter submits, Shift+Enter keeps the newline the
            // widget inserted (begin_send trims either way).
            if composer.has_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter) && i.modifiers.is_none())
            {
                send_now = true;
            }

            let clicked = ui
                .add_enabled(
                    input_enabled && !self.input_buffer.trim().is_empty(),
                    egui::Button::new("Send"),
                )
                .clicked();
            send_now |= clicked;
        });

        if send_now {
            self.begin_send()
        } else {
            None
        }
    }
}

fn role_color(theme: &Theme, role: Role) -> egui::Color32 {
    match role {
        Role::User => theme.accent_primary,
        Role::Assistant => theme.success,
        Role::Error => theme.danger,
    }
}

fn render_message(ui: &mut egui::Ui, theme: &Theme, message: &ChatMessage) {
    theme.card_frame().show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(message.role.label())
                    .strong()
                    .color(role_color(theme, message.role)),
            );
            ui.label(
                RichText::new(&message.timestamp)
                    .small()
                    .color(theme.text_muted),
            );
        });
        ui.label(&message.content);

        if !message.sources.is_empty() {
            ui.add_space(4.0);
            ui.label(RichText::new("Sources").small().strong());
            for source in &message.sources {
                ui.label(RichText::new(format!("• {source}")).small());
            }
        }
        if let Some(audit_id) = &message.audit_id {
            ui.label(
                RichText::new(format!("audit {audit_id}"))
                    .small()
                    .color(theme.text_muted),
            );
        }
    });
}

fn render_empty_state(ui: &mut egui::Ui, theme: &Theme) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.heading("Start a Conversation");
        ui.label(
            RichText::new("Upload documents and ask questions to get started")
                .color(theme.text_muted),
        );
        ui.add_space(12.0);
        ui.label(RichText::new("Example questions:").strong());
        for question in EXAMPLE_QUESTIONS {
            ui.label(RichText::new(question).color(theme.text_muted));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_with_input(text: &str) -> ChatPanel {
        let mut panel = ChatPanel::new();
        panel.input_buffer = text.to_string();
        panel
    }

    #[test]
    fn transcript_grows_by_two_per_completed_send() {
        let mut panel = ChatPanel::new();
        for n in 1..=3 {
            panel.input_buffer = format!("question {n}");
            let request = panel.begin_send().expect("send should be staged");
            assert_eq!(request.query, format!("question {n}"));
            panel.apply_answer(format!("answer {n}"), Vec::new(), format!("audit-{n}"));
            assert_eq!(panel.transcript().len(), 2 * n);
        }

        let roles: Vec<Role> = panel.transcript().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
        assert_eq!(panel.transcript()[4].content, "question 3");
    }

    #[test]
    fn whitespace_only_query_is_rejected() {
        let mut panel = panel_with_input("   \n\t  ");
        assert!(panel.begin_send().is_none());
        assert!(panel.transcript().is_empty());
        assert!(!panel.is_loading());
    }

    #[test]
    fn send_while_in_flight_is_a_no_op() {
        let mut panel = panel_with_input("first");
        assert!(panel.begin_send().is_some());

        panel.input_buffer = "second".to_string();
        assert!(panel.begin_send().is_none());
        assert_eq!(panel.transcript().len(), 1);
        assert_eq!(panel.input_buffer, "second");

        panel.apply_answer("done".to_string(), Vec::new(), "a1".to_string());
        assert!(panel.begin_send().is_some());
    }

    #[test]
    fn answer_fields_are_recorded_verbatim() {
        let mut panel = panel_with_input("What is the capital of France?");
        panel.begin_send().expect("send should be staged");
        panel.apply_answer(
            "Paris is the capital.".to_string(),
            vec!["doc1.txt".to_string()],
            "abc123".to_string(),
        );

        let answer = panel.transcript().last().expect("assistant turn expected");
        assert_eq!(answer.role, Role::Assistant);
        assert_eq!(answer.content, "Paris is the capital.");
        assert_eq!(answer.sources, vec!["doc1.txt".to_string()]);
        assert_eq!(answer.audit_id.as_deref(), Some("abc123"));
        assert!(!panel.is_loading());
    }

    #[test]
    fn failure_appends_error_turn_with_detail() {
        let mut panel = panel_with_input("anything");
        panel.begin_send().expect("send should be staged");
        panel.apply_failure("model unavailable".to_string());

        let error = panel.transcript().last().expect("error turn expected");
        assert_eq!(error.role, Role::Error);
        assert!(error.content.contains("model unavailable"));
        assert!(error.content.starts_with("Error: "));
        assert!(!panel.is_loading());
    }

    #[test]
    fn clear_empties_transcript() {
        let mut panel = panel_with_input("q");
        panel.begin_send().expect("send should be staged");
        panel.apply_answer("a".to_string(), Vec::new(), "x".to_string());
        assert_eq!(panel.transcript().len(), 2);

        panel.clear();
        assert!(panel.transcript().is_empty());
    }

    #[test]
    fn staged_request_carries_selected_model() {
        let mut panel = panel_with_input("q");
        panel.selected_model = ChatModel::Mistral;
        let request = panel.begin_send().expect("send should be staged");
        assert_eq!(request.model, "mistral");
    }

    #[test]
    fn input_is_cleared_and_query_trimmed_on_send() {
        let mut panel = panel_with_input("  hello there \n");
        let request = panel.begin_send().expect("send should be staged");
        assert_eq!(request.query, "hello there");
        assert!(panel.input_buffer.is_empty());
        assert_eq!(panel.transcript()[0].content, "hello there");
    }
}
