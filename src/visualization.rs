//! Visualization utilities for TSP runs.
//!
//! Renders run results as text (city names, per-iteration tours) and
//! generates SVG plots of a tour.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::instance::TspInstance;
use crate::solution::{RunResult, Tour};

/// Tour as `A -> B -> C -> A`
pub fn format_tour(instance: &TspInstance, tour: &Tour) -> String {
    tour.names(instance).join(" -> ")
}

/// Text report of a run: optional per-iteration listing, then the best tour.
pub fn render_report(instance: &TspInstance, result: &RunResult, show_history: bool) -> String {
    let mut report = String::new();

    if show_history {
        for record in &result.history {
            report.push_str(&format!("Iteration {}:\n", record.iteration));
            for (ant, tour) in record.tours.iter().enumerate() {
                report.push_str(&format!(
                    "  Ant {:>3}: {} (length {:.2})\n",
                    ant + 1,
                    format_tour(instance, tour),
                    instance.tour_length(tour.as_slice())
                ));
            }
        }
        report.push('\n');
    }

    report.push_str("========== Best Tour ==========\n");
    report.push_str(&format!("Instance: {} ({} cities)\n", instance.name, instance.dimension));
    report.push_str(&format!("Tour: {}\n", format_tour(instance, &result.best_tour)));
    report.push_str(&format!("Length: {:.2}\n", result.best_length));
    report.push_str(&format!("Iterations: {}\n", result.iterations()));
    report.push_str(&format!("Time: {:.4}s\n", result.computation_time));

    report
}

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// City radius
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 6.0,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG visualization of a tour
    pub fn generate_svg(&self, instance: &TspInstance, tour: &Tour, length: f64) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = instance.statistics().bounds;

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .city {{ fill: #3498db; stroke: #2c3e50; stroke-width: 2; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 2; }}
    .edge {{ stroke: #34495e; stroke-width: 2; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<defs>
<marker id="arrow" markerWidth="10" markerHeight="10" refX="9" refY="3" orient="auto" markerUnits="strokeWidth">
<path d="M0,0 L0,6 L9,3 z" fill="#34495e"/>
</marker>
</defs>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | Length: {:.2}</text>
"##,
            self.margin,
            escape(&instance.name),
            length
        ));

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        for (from, to) in tour.edges() {
            let (x1, y1) = transform(instance.cities[from].x, instance.cities[from].y);
            let (x2, y2) = transform(instance.cities[to].x, instance.cities[to].y);

            svg.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge" marker-end="url(#arrow)"/>
"#,
                x1, y1, x2, y2
            ));
        }

        let start = tour.start();
        for (idx, city) in instance.cities.iter().enumerate() {
            let (x, y) = transform(city.x, city.y);
            let class = if Some(idx) == start { "start" } else { "city" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));
            svg.push_str(&format!(
                r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                x,
                y - self.node_radius - 3.0,
                escape(&city.name)
            ));
        }

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Per-iteration convergence data as CSV (`iteration,best_length`)
pub fn export_convergence_data(instance: &TspInstance, result: &RunResult) -> String {
    let mut data = String::from("iteration,best_length\n");
    for (iteration, best) in result.iteration_bests(instance) {
        data.push_str(&format!("{},{:.4}\n", iteration, best));
    }
    data
}
