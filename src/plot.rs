use eframe::egui;
use egui::plot::{Legend, Line, Plot, PlotPoints};

/// Opens a window with a line plot of `points` (x = RPM, y = magnitude).
pub fn plot_band(title: &str, points: Vec<[f64; 2]>) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(1200.0, 400.0)),
        ..Default::default()
    };
    let title = title.to_owned();
    eframe::run_native(
        "FFT Analysis",
        options,
        Box::new(move |_cc| Box::new(BandPlotApp::new(title, points))),
    )
}

struct BandPlotApp {
    title: String,
    points: Vec<[f64; 2]>,
}

impl BandPlotApp {
    fn new(title: String, points: Vec<[f64; 2]>) -> Self {
        Self { title, points }
    }
}

impl eframe::App for BandPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(&self.title);
            ui.label("x: RPM, y: magnitude");
            let plot = Plot::new("spectrum").legend(Legend::default());
            plot.show(ui, |plot_ui| {
                plot_ui.line(Line::new(PlotPoints::from(self.points.clone())).name("magnitude"));
            });
        });
    }
}
