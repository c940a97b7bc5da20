use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::Serialize;

use crate::analysis::AnalysisReport;

pub const REPORT_TITLE: &str = "Hair Analysis Results";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayValue {
    Label { text: String },
    /// A score shown as `value/scale` with a 0-100 progress bar.
    Gauge { text: String, progress: u8 },
}

impl DisplayValue {
    pub fn text(&self) -> &str {
        match self {
            DisplayValue::Label { text } | DisplayValue::Gauge { text, .. } => text,
        }
    }

    pub fn progress(&self) -> Option<u8> {
        match self {
            DisplayValue::Gauge { progress, .. } => Some(*progress),
            DisplayValue::Label { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: &'static str,
    pub rows: IndexMap<&'static str, DisplayValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub title: &'static str,
    pub sections: Vec<Section>,
}

impl DisplayModel {
    pub fn get(&self, row: &str) -> Option<&DisplayValue> {
        self.sections.iter().find_map(|section| section.rows.get(row))
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        for section in &self.sections {
            let _ = writeln!(out, "\n{}", section.heading);
            for (label, value) in &section.rows {
                match value {
                    DisplayValue::Label { text } => {
                        let _ = writeln!(out, "  {:<16} {}", label, text);
                    }
                    DisplayValue::Gauge { text, progress } => {
                        let filled = usize::from(*progress) / 5;
                        let _ = writeln!(
                            out,
                            "  {:<16} {:<6} [{}{}] {}%",
                            label,
                            text,
                            "#".repeat(filled),
                            "-".repeat(20 - filled),
                            progress
                        );
                    }
                }
            }
        }
        out
    }
}

fn label(text: impl Into<String>) -> DisplayValue {
    DisplayValue::Label { text: text.into() }
}

fn gauge(value: u8, scale: u8) -> DisplayValue {
    let progress = (u16::from(value) * 100 / u16::from(scale)).min(100) as u8;
    DisplayValue::Gauge {
        text: format!("{}/{}", value, scale),
        progress,
    }
}

/// Pure mapping from a report to what the results screen shows.
pub fn present(report: &AnalysisReport) -> DisplayModel {
    let mut basics = IndexMap::new();
    basics.insert("Hair Type", label(report.hair_type.label()));
    basics.insert("Texture", label(report.texture.label()));
    basics.insert("Thickness", label(report.thickness.label()));
    basics.insert("Porosity", label(report.porosity.label()));

    let mut health = IndexMap::new();
    health.insert("Health Score", gauge(report.health_score, 10));
    health.insert("Moisture Level", gauge(report.moisture_level, 10));
    health.insert("Density", gauge(report.density, 10));
    health.insert("Damage Level", gauge(report.damage, 5));

    let mut additional = IndexMap::new();
    additional.insert("Scalp Condition", label(report.scalp_condition.label()));
    additional.insert("Protein Balance", label(report.protein_balance.label()));
    if !report.concerns.is_empty() {
        let concerns: Vec<&str> = report.concerns.iter().map(|c| c.label()).collect();
        additional.insert("Concerns", label(concerns.join(", ")));
    }

    DisplayModel {
        title: REPORT_TITLE,
        sections: vec![
            Section {
                heading: "Basic Characteristics",
                rows: basics,
            },
            Section {
                heading: "Health Indicators",
                rows: health,
            },
            Section {
                heading: "Additional Information",
                rows: additional,
            },
        ],
    }
}
