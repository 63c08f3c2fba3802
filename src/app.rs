//! Application shell: owns the panels, drains backend events each frame
//! and routes them to the panel controllers.

use crate::backend::BackendClient;
use crate::config::Config;
use crate::event::{AppEvent, BackendStatus};
use crate::panels::chat::ChatPanel;
use crate::panels::upload::UploadPanel;
use crate::theme::Theme;
use crate::transcript::UploadStatus;
use eframe::egui::{self, RichText};
use std::sync::mpsc;
use tokio::runtime::Handle;

pub struct RagDeskApp {
    rx: mpsc::Receiver<AppEvent>,
    backend: BackendClient,
    chat: ChatPanel,
    upload: UploadPanel,
    upload_status: UploadStatus,
    backend_status: BackendStatus,
    theme: Theme,
}

impl RagDeskApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &Config,
        runtime: Handle,
        tx: mpsc::Sender<AppEvent>,
        rx: mpsc::Receiver<AppEvent>,
    ) -> Self {
        let theme = Theme::default();
        theme.apply_visuals(&cc.egui_ctx);

        let backend = BackendClient::new(
            config.backend_url.clone(),
            tx,
            runtime,
            cc.egui_ctx.clone(),
        );
        backend.start();

        Self {
            rx,
            backend,
            chat: ChatPanel::new(),
            upload: UploadPanel::new(),
            upload_status: UploadStatus::Idle,
            backend_status: BackendStatus::Checking,
            theme,
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    tracing::warn!("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::QueryCompleted {
                answer,
                sources,
                audit_id,
            } => self.chat.apply_answer(answer, sources, audit_id),
            AppEvent::QueryFailed(message) => self.chat.apply_failure(message),
            AppEvent::UploadCompleted {
                file_name,
                vector_id,
            } => self
                .upload
                .apply_uploaded(file_name, vector_id, &mut self.upload_status),
            AppEvent::UploadFailed(message) => {
                self.upload.apply_failed(message, &mut self.upload_status)
            }
            AppEvent::BackendStatus(status) => self.backend_status = status,
        }
    }

    fn status_chip(&self) -> (&'static str, egui::Color32) {
        match self.backend_status {
            BackendStatus::Checking => ("Checking backend...", self.theme.warning),
            BackendStatus::Connected => ("Backend connected", self.theme.success),
            BackendStatus::Unreachable => ("Backend unreachable", self.theme.danger),
        }
    }

    fn render_top_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar")
            .frame(self.theme.top_bar_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("RAG Knowledge Base").strong().size(16.0));
                    ui.label(
                        RichText::new("Upload documents and ask questions")
                            .small()
                            .color(self.theme.text_muted),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let (label, color) = self.status_chip();
                        ui.label(RichText::new(label).small().color(color));
                    });
                });
            });
    }

    fn render_upload_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("upload_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                if let Some((file_name, path)) =
                    self.upload.ui(ui, &self.theme, &mut self.upload_status)
                {
                    self.backend.dispatch_upload(file_name, path);
                }
            });
    }

    fn render_chat_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(request) = self.chat.ui(ui, &self.theme) {
                self.backend.dispatch_query(request);
            }
        });
    }
}

impl eframe::App for RagDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.render_top_bar(ctx);
        self.render_upload_panel(ctx);
        self.render_chat_panel(ctx);
    }
}
