use std::path::Path;

use eframe::egui;
use vidpng_core::{
    media_type_for_path, AppViewModel, DownloadView, FileEntry, Msg, VIDEO_EXTENSIONS,
};

const GOOD: egui::Color32 = egui::Color32::from_rgb(0, 180, 0);
const BAD: egui::Color32 = egui::Color32::from_rgb(220, 50, 50);
const NOTICE: egui::Color32 = egui::Color32::from_rgb(200, 120, 0);

/// Renders the whole window from the view model, collecting user actions.
pub fn render(ui: &mut egui::Ui, view: &AppViewModel, actions: &mut Vec<Msg>) {
    ui.vertical_centered(|ui| {
        ui.heading("Batch video → APNG");
        ui.label("Drop videos anywhere in the window, or browse below.");
    });
    ui.add_space(10.0);

    render_file_list(ui, view, actions);
    ui.add_space(8.0);
    render_fps_field(ui, view, actions);
    ui.add_space(8.0);

    ui.vertical_centered(|ui| {
        let button = egui::Button::new("🎞 Convert").min_size([160.0, 36.0].into());
        if ui
            .add_enabled(view.file_list.submit_enabled, button)
            .clicked()
        {
            actions.push(Msg::SubmitClicked);
        }
    });

    ui.add_space(10.0);
    render_status(ui, view, actions);
}

fn render_file_list(ui: &mut egui::Ui, view: &AppViewModel, actions: &mut Vec<Msg>) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            if ui.button("📁 Add videos…").clicked() {
                if let Some(paths) = rfd::FileDialog::new()
                    .add_filter("Video", VIDEO_EXTENSIONS)
                    .pick_files()
                {
                    let files = paths
                        .iter()
                        .filter_map(|path| entry_from_path(path))
                        .collect();
                    actions.push(Msg::FilesPicked(files));
                }
            }
            if view.file_list.clear_visible && ui.button("🗑 Clear list").clicked() {
                actions.push(Msg::ClearFiles);
            }
        });
        ui.add_space(4.0);

        if view.file_list.placeholder {
            ui.weak("No files selected yet.");
        } else {
            for row in &view.file_list.rows {
                ui.horizontal(|ui| {
                    if ui
                        .small_button("❌")
                        .on_hover_text("Remove this file")
                        .clicked()
                    {
                        actions.push(Msg::RemoveFileAt(row.index));
                    }
                    ui.label(&row.label);
                });
            }
        }

        if let Some(stats) = view.last_drop {
            if stats.rejected > 0 {
                ui.colored_label(
                    NOTICE,
                    format!("{} non-video item(s) were discarded.", stats.rejected),
                );
            }
        }
    });
}

fn render_fps_field(ui: &mut egui::Ui, view: &AppViewModel, actions: &mut Vec<Msg>) {
    ui.horizontal(|ui| {
        let mut custom = view.fps.enabled;
        if ui.checkbox(&mut custom, "Custom frame rate").changed() {
            actions.push(Msg::CustomFpsToggled(custom));
        }
        if view.fps.enabled {
            let mut value = view.fps.value.clone();
            let response = ui.add(egui::TextEdit::singleline(&mut value).desired_width(60.0));
            if response.changed() {
                actions.push(Msg::FpsInputChanged(value));
            }
            ui.label("fps");
        }
    });
}

fn render_status(ui: &mut egui::Ui, view: &AppViewModel, actions: &mut Vec<Msg>) {
    ui.group(|ui| {
        ui.label(&view.status.message);

        if let Some(percent) = view.status.progress_percent {
            ui.add(egui::ProgressBar::new(percent / 100.0).text(format!("{percent:.1}%")));
        }

        if !view.status.failures.is_empty() {
            ui.add_space(4.0);
            ui.label("Failed files:");
            for line in &view.status.failures {
                ui.colored_label(BAD, line);
            }
        }

        match &view.status.download {
            DownloadView::Hidden => {}
            DownloadView::Available { task_id } => {
                if ui
                    .button(format!("⬇ Download results (task {task_id})"))
                    .clicked()
                {
                    actions.push(Msg::DownloadClicked);
                }
            }
            DownloadView::NothingToDownload => {
                ui.weak("No files converted successfully, nothing to download.");
            }
            DownloadView::InFlight => {
                ui.label("Fetching result archive…");
            }
            DownloadView::Saved { path } => {
                ui.colored_label(GOOD, format!("Archive saved to {}", path.display()));
            }
            DownloadView::Failed { message } => {
                ui.colored_label(BAD, format!("Download failed: {message}"));
            }
        }
    });
}

/// Validation alerts block the window until acknowledged.
pub fn render_alert(ctx: &egui::Context, view: &AppViewModel, actions: &mut Vec<Msg>) {
    if let Some(alert) = &view.alert {
        egui::Window::new("Check your input")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(alert);
                ui.add_space(6.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        actions.push(Msg::AlertDismissed);
                    }
                });
            });
    }
}

/// Turns files dropped onto the window into an intake message, counting
/// everything outside the video family as discarded.
pub fn intake_dropped_files(ctx: &egui::Context, actions: &mut Vec<Msg>) {
    let dropped = ctx.input(|input| input.raw.dropped_files.clone());
    if dropped.is_empty() {
        return;
    }

    let mut accepted = Vec::new();
    let mut rejected = 0usize;
    for file in dropped {
        match file.path.as_deref().and_then(entry_from_path) {
            Some(entry) => accepted.push(entry),
            None => rejected += 1,
        }
    }
    actions.push(Msg::FilesDropped { accepted, rejected });
}

fn entry_from_path(path: &Path) -> Option<FileEntry> {
    let media_type = media_type_for_path(path)?;
    let name = path.file_name()?.to_string_lossy().to_string();
    let size_bytes = std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    Some(FileEntry::new(name, size_bytes, media_type, path))
}
