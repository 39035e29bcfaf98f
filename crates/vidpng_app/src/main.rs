mod app;
mod effects;
mod logging;
mod settings;
mod ui;

fn main() -> anyhow::Result<()> {
    logging::initialize(logging::LogDestination::Both);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([680.0, 760.0])
            .with_min_inner_size([480.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "vidpng — batch video to APNG",
        options,
        Box::new(|cc| Box::new(app::VidpngApp::new(cc))),
    )
    .map_err(|err| anyhow::anyhow!("eframe shell exited with an error: {err}"))
}
