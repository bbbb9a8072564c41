// ── SVG charts ──
//
// Dashboard charts drawn with plotters into an in-memory SVG document.
// Text is emitted as SVG <text> elements, so no font files are needed.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::aggregate::KpiSnapshot;
use crate::display::{Labelled, Locale, NEUTRAL_COLOR};
use crate::error::CoreError;
use crate::model::Gender;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;
const MARGIN: i32 = 24;
const TITLE_HEIGHT: i32 = 48;
const LEGEND_X: i32 = 380;
const SWATCH: i32 = 14;

/// One pie wedge.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

/// One bar per category, drawn side by side with the other series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: &'static str,
    pub values: Vec<f64>,
}

/// A rendered chart and the file name it is written under.
#[derive(Debug, Clone)]
pub struct ChartFile {
    pub file_name: &'static str,
    pub svg: String,
}

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

fn render_err(err: impl std::fmt::Display) -> CoreError {
    CoreError::Internal(format!("chart rendering failed: {err}"))
}

/// `#rrggbb` to a plotters colour; anything else is neutral grey.
fn rgb(hex: &str) -> RGBColor {
    let channel = |range: std::ops::Range<usize>| {
        hex.strip_prefix('#')
            .filter(|h| h.len() == 6)
            .and_then(|h| h.get(range))
            .and_then(|c| u8::from_str_radix(c, 16).ok())
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
        _ => RGBColor(0x6b, 0x72, 0x80),
    }
}

fn text_style(size: u32) -> TextStyle<'static> {
    ("sans-serif", size).into_font().color(&BLACK)
}

fn render<F>(title: &str, draw: F) -> Result<String, CoreError>
where
    F: FnOnce(&Area<'_>) -> Result<(), CoreError>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        root.draw(&Text::new(title.to_owned(), (MARGIN, MARGIN / 2), text_style(20)))
            .map_err(render_err)?;
        draw(&root)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

fn legend_entry(root: &Area<'_>, row: i32, color: &str, label: &str) -> Result<(), CoreError> {
    let y = TITLE_HEIGHT + row * (SWATCH + 10);
    root.draw(&Rectangle::new(
        [(LEGEND_X, y), (LEGEND_X + SWATCH, y + SWATCH)],
        rgb(color).filled(),
    ))
    .map_err(render_err)?;
    root.draw(&Text::new(
        label.to_owned(),
        (LEGEND_X + SWATCH + 8, y),
        text_style(13),
    ))
    .map_err(render_err)
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn point_on(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 + (radius * angle.sin()).round() as i32,
    )
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::as_conversions
)]
fn wedge(center: (i32, i32), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = (sweep / TAU * 180.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let angle = start + sweep * i as f64 / steps as f64;
        points.push(point_on(center, radius, angle));
    }
    points
}

/// Pie chart with a legend on the right.
///
/// Zero-valued slices are listed in the legend but not drawn. A chart whose
/// slices are all zero draws a grey disc with `empty_label`.
pub fn pie_chart(title: &str, slices: &[Slice], empty_label: &str) -> Result<String, CoreError> {
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    let center = (MARGIN + 150, TITLE_HEIGHT + 140);
    let radius = 130.0;

    render(title, |root| {
        let visible: Vec<&Slice> = slices.iter().filter(|s| s.value > 0.0).collect();
        match visible.as_slice() {
            [] => {
                root.draw(&Circle::new(center, 130, rgb(NEUTRAL_COLOR).filled()))
                    .map_err(render_err)?;
                legend_entry(root, 0, NEUTRAL_COLOR, empty_label)?;
                return Ok(());
            }
            [only] => {
                root.draw(&Circle::new(center, 130, rgb(only.color).filled()))
                    .map_err(render_err)?;
            }
            many => {
                let mut start = -FRAC_PI_2;
                for slice in many {
                    let sweep = slice.value / total * TAU;
                    root.draw(&Polygon::new(
                        wedge(center, radius, start, sweep),
                        rgb(slice.color).filled(),
                    ))
                    .map_err(render_err)?;
                    start += sweep;
                }
            }
        }

        for (row, slice) in (0..).zip(slices) {
            let share = if total > 0.0 { slice.value / total * 100.0 } else { 0.0 };
            let label = format!("{} ({}, {share:.1}%)", slice.label, slice.value);
            legend_entry(root, row, slice.color, &label)?;
        }
        Ok(())
    })
}

/// Grouped bar chart: one group per category, one bar per series.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::as_conversions
)]
pub fn bar_chart(
    title: &str,
    categories: &[String],
    series: &[Series],
) -> Result<String, CoreError> {
    let left = MARGIN + 16;
    let right = LEGEND_X - MARGIN;
    let top = TITLE_HEIGHT + 8;
    let bottom = i32::try_from(HEIGHT).unwrap_or(360) - 48;
    let max = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0_f64, f64::max)
        .max(1.0);

    render(title, |root| {
        root.draw(&PathElement::new(vec![(left, bottom), (right, bottom)], BLACK.stroke_width(1)))
            .map_err(render_err)?;
        root.draw(&Text::new(format!("{max}"), (MARGIN / 2, top), text_style(11)))
            .map_err(render_err)?;

        let groups = i32::try_from(categories.len().max(1)).unwrap_or(1);
        let bars = i32::try_from(series.len().max(1)).unwrap_or(1);
        let group_width = (right - left) / groups;
        let bar_width = (group_width - 16) / bars;
        let scale = f64::from(bottom - top) / max;

        for (g, category) in (0..).zip(categories) {
            let group_left = left + g * group_width + 8;
            for (b, s) in (0..).zip(series) {
                let value = s.values.get(category_index(g)).copied().unwrap_or(0.0);
                let height = (value.max(0.0) * scale).round() as i32;
                let x0 = group_left + b * bar_width;
                root.draw(&Rectangle::new(
                    [(x0, bottom - height), (x0 + bar_width - 4, bottom)],
                    rgb(s.color).filled(),
                ))
                .map_err(render_err)?;
            }
            root.draw(&Text::new(
                category.clone(),
                (group_left, bottom + 8),
                text_style(12),
            ))
            .map_err(render_err)?;
        }

        for (row, s) in (0..).zip(series) {
            let total: f64 = s.values.iter().sum();
            legend_entry(root, row, s.color, &format!("{} ({total})", s.label))?;
        }
        Ok(())
    })
}

fn category_index(g: i32) -> usize {
    usize::try_from(g).unwrap_or(0)
}

// ── Dashboard charts ─────────────────────────────────────────────────

/// The four dashboard charts for a KPI snapshot.
pub fn dashboard_charts(kpis: &KpiSnapshot, locale: Locale) -> Result<Vec<ChartFile>, CoreError> {
    let es = locale == Locale::Es;
    let no_data = if es { "Sin datos" } else { "No data" };

    let status: Vec<Slice> = kpis
        .status
        .iter()
        .map(|share| Slice {
            label: share.status.label(locale).into_owned(),
            value: count(share.count),
            color: share.color,
        })
        .collect();

    let ownership: Vec<Slice> = kpis
        .ownership
        .iter()
        .map(|share| Slice {
            label: share.owner.clone().unwrap_or_else(|| no_data.to_owned()),
            value: count(share.count),
            color: share.color,
        })
        .collect();

    let vaccination = [Series {
        label: (if es { "Vacunas" } else { "Vaccines" }).to_owned(),
        color: "#10b981",
        values: vec![
            count(kpis.vaccination.up_to_date),
            count(kpis.vaccination.pending),
        ],
    }];
    let vaccination_categories = if es {
        ["Al día".to_owned(), "Pendientes".to_owned()]
    } else {
        ["Up to date".to_owned(), "Pending".to_owned()]
    };

    let years = if es { "años" } else { "years" };
    let buckets: Vec<String> = kpis
        .gender_age
        .iter()
        .map(|row| format!("{} {years}", row.bucket))
        .collect();
    let gender_age = [
        Series {
            label: Gender::Male.label(locale).into_owned(),
            color: Gender::Male.attrs().color,
            values: kpis.gender_age.iter().map(|r| count(r.male)).collect(),
        },
        Series {
            label: Gender::Female.label(locale).into_owned(),
            color: Gender::Female.attrs().color,
            values: kpis.gender_age.iter().map(|r| count(r.female)).collect(),
        },
    ];

    let (status_title, ownership_title, vaccination_title, gender_age_title) = if es {
        (
            "Estado de salud",
            "Propiedad",
            "Estado de vacunación",
            "Género por edad",
        )
    } else {
        ("Health status", "Ownership", "Vaccination status", "Gender by age")
    };

    Ok(vec![
        ChartFile {
            file_name: "status.svg",
            svg: pie_chart(status_title, &status, no_data)?,
        },
        ChartFile {
            file_name: "ownership.svg",
            svg: pie_chart(ownership_title, &ownership, no_data)?,
        },
        ChartFile {
            file_name: "vaccination.svg",
            svg: bar_chart(vaccination_title, &vaccination_categories, &vaccination)?,
        },
        ChartFile {
            file_name: "gender-age.svg",
            svg: bar_chart(gender_age_title, &buckets, &gender_age)?,
        },
    ])
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn count(n: usize) -> f64 {
    n as f64
}

/// Write each chart into `dir`, creating it if needed.
pub fn write_charts(dir: &Path, charts: &[ChartFile]) -> Result<Vec<PathBuf>, CoreError> {
    std::fs::create_dir_all(dir)?;
    charts
        .iter()
        .map(|chart| -> Result<PathBuf, CoreError> {
            let path = dir.join(chart.file_name);
            std::fs::write(&path, &chart.svg)?;
            debug!(path = %path.display(), "wrote chart");
            Ok(path)
        })
        .collect()
}
