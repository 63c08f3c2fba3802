//! Upload panel: pick or drop a file, send it to the ingestion endpoint,
//! keep a client-side log of what was uploaded this run.

use crate::theme::Theme;
use crate::transcript::{display_timestamp, UploadStatus, UploadedFileRecord};
use eframe::egui::{self, RichText};
use std::path::PathBuf;

/// Shown as a hint next to the pickers; never enforced, and drops are
/// never filtered, matching the backend's own lack of a type gate.
pub const ACCEPTED_EXTENSIONS: &str = ".txt, .md, .csv, .json";

#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

pub struct UploadPanel {
    selected: Option<SelectedFile>,
    uploaded: Vec<UploadedFileRecord>,
    is_uploading: bool,
    path_input: String,
}

impl Default for UploadPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadPanel {
    pub fn new() -> Self {
        Self {
            selected: None,
            uploaded: Vec::new(),
            is_uploading: false,
            path_input: String::new(),
        }
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn uploaded(&self) -> &[UploadedFileRecord] {
        &self.uploaded
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    /// Records a chosen file and resets any prior status. The file is not
    /// read or validated here; a bad path surfaces when the upload runs.
    pub fn select_path(&mut self, path: PathBuf, status: &mut UploadStatus) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let size_bytes = std::fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
        self.selected = Some(SelectedFile {
            name,
            path,
            size_bytes,
        });
        *status = UploadStatus::Idle;
    }

    /// Stages an upload: refuses with a validation status when nothing is
    /// selected, refuses silently while one is already in flight.
    pub fn begin_upload(&mut self, status: &mut UploadStatus) -> Option<(String, PathBuf)> {
        if self.is_uploading {
            return None;
        }
        let Some(selected) = self.selected.as_ref() else {
            *status = UploadStatus::Error("Please select a file first".to_string());
            return None;
        };

        self.is_uploading = true;
        *status = UploadStatus::Idle;
        Some((selected.name.clone(), selected.path.clone()))
    }

    pub fn apply_uploaded(&mut self, file_name: String, vector_id: String, status: &mut UploadStatus) {
        *status = UploadStatus::Success(format!("{file_name} uploaded successfully"));
        self.uploaded.push(UploadedFileRecord {
            name: file_name,
            id: vector_id,
            timestamp: display_timestamp(),
        });
        self.selected = None;
        self.is_uploading = false;
    }

    pub fn apply_failed(&mut self, message: String, status: &mut UploadStatus) {
        *status = UploadStatus::Error(format!("Upload failed: {message}"));
        self.is_uploading = false;
    }

    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        theme: &Theme,
        status: &mut UploadStatus,
    ) -> Option<(String, PathBuf)> {
        ui.heading("Upload Documents");
        ui.label(
            RichText::new("Add text files to your knowledge base")
                .small()
                .color(theme.text_muted),
        );
        ui.add_space(8.0);

        self.render_drop_zone(ui, theme, status);
        ui.add_space(8.0);
        self.render_path_entry(ui, status);

        if let Some(selected) = &self.selected {
            ui.add_space(8.0);
            theme.card_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&selected.name).strong());
                    ui.label(
                        RichText::new(format_size(selected.size_bytes))
                            .small()
                            .color(theme.text_muted),
                    );
                });
            });
        }

        ui.add_space(8.0);
        let upload_label = if self.is_uploading {
            "Uploading..."
        } else {
            "Upload to knowledge base"
        };
        let upload_clicked = ui
            .add_enabled(
                self.selected.is_some() && !self.is_uploading,
                egui::Button::new(upload_label),
            )
            .clicked();

        self.render_status(ui, theme, status);
        self.render_uploaded_list(ui, theme);

        if upload_clicked {
            self.begin_upload(status)
        } else {
            None
        }
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui, theme: &Theme, status: &mut UploadStatus) {
        let hovering_files = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        theme.drop_zone_frame(hovering_files).show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label("Drag & drop a file here");
                ui.label(
                    RichText::new(format!("Accepted: {ACCEPTED_EXTENSIONS}"))
                        .small()
                        .color(theme.text_muted),
                );
            });
        });

        let dropped = ui.ctx().input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().find_map(|file| file.path) {
            self.select_path(path, status);
        }
    }

    fn render_path_entry(&mut self, ui: &mut egui::Ui, status: &mut UploadStatus) {
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .desired_width((ui.available_width() - 70.0).max(80.0))
                    .hint_text("path/to/document.txt"),
            );
            let choose_clicked = ui
                .add_enabled(
                    !self.path_input.trim().is_empty(),
                    egui::Button::new("Choose"),
                )
                .clicked();
            if choose_clicked {
                let path = PathBuf::from(self.path_input.trim());
                self.select_path(path, status);
                self.path_input.clear();
            }
        });
    }

    fn render_status(&self, ui: &mut egui::Ui, theme: &Theme, status: &UploadStatus) {
        match status {
            UploadStatus::Idle => {}
            UploadStatus::Success(message) => {
                ui.add_space(4.0);
                ui.label(RichText::new(message).color(theme.success));
            }
            UploadStatus::Error(message) => {
                ui.add_space(4.0);
                ui.label(RichText::new(message).color(theme.danger));
            }
        }
    }

    fn render_uploaded_list(&self, ui: &mut egui::Ui, theme: &Theme) {
        if self.uploaded.is_empty() {
            return;
        }

        ui.add_space(12.0);
        ui.label(RichText::new("Uploaded files").strong());
        for record in &self.uploaded {
            ui.horizontal(|ui| {
                ui.label(&record.name);
                ui.label(
                    RichText::new(&record.timestamp)
                        .small()
                        .color(theme.text_muted),
                );
            });
        }
    }
}

fn format_size(size_bytes: u64) -> String {
    format!("({:.2} KB)", size_bytes as f64 / 1024.0)
}
