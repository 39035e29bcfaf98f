use std::sync::mpsc;

use eframe::egui;
use vidpng_core::{update, AppState, Msg};

use crate::effects::EffectRunner;
use crate::settings::ClientSettings;
use crate::ui;

pub struct VidpngApp {
    state: AppState,
    msg_rx: mpsc::Receiver<Msg>,
    effects: EffectRunner,
}

impl VidpngApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = ClientSettings::load();
        let (msg_tx, msg_rx) = mpsc::channel();
        let effects = EffectRunner::new(&settings, msg_tx, cc.egui_ctx.clone())
            .expect("start conversion engine");
        Self {
            state: AppState::new(),
            msg_rx,
            effects,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.effects.run(effects);
    }
}

impl eframe::App for VidpngApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Engine completions queued since the last frame, then whatever the
        // user does during this one.
        let mut actions: Vec<Msg> = self.msg_rx.try_iter().collect();
        ui::intake_dropped_files(ctx, &mut actions);

        let view = self.state.view();
        egui::CentralPanel::default().show(ctx, |panel| {
            egui::ScrollArea::vertical().show(panel, |panel| {
                ui::render(panel, &view, &mut actions);
            });
        });
        ui::render_alert(ctx, &view, &mut actions);

        for msg in actions {
            self.dispatch(msg);
        }
    }
}
