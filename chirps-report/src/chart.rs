//! Bar chart of accumulated precipitation per year with threshold bands.
//!
//! [`ChartLayout`] decides what goes on the picture (bar colours, bands,
//! reference lines, extreme annotations); the `render*` functions only draw it.

use crate::{error::ChartError, row_set::RowSet};
use chirps_core::Thresholds;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::path::Path;

pub const CHART_SIZE: (u32, u32) = (1200, 700);
pub const TITLE: &str = "Annual Precipitation - CHIRPS";
pub const X_DESC: &str = "Year";
pub const Y_DESC: &str = "Accumulated precipitation (mm)";

/// Headroom above the highest bar (or the exit line) for the top band.
const BAND_HEADROOM: f64 = 1.05;
/// Extra room above the top band for annotation labels.
const LABEL_HEADROOM: f64 = 1.12;
const BAR_HALF_WIDTH: f64 = 0.4;
const MARGIN: u32 = 20;
const Y_LABEL_AREA: u32 = 70;
/// Horizontal pixels available to the plot itself.
const PLOT_WIDTH_PX: f64 = (CHART_SIZE.0 - 2 * MARGIN - Y_LABEL_AREA) as f64;
/// Approximate advance of one 14 px sans-serif character.
const LABEL_CHAR_PX: f64 = 8.0;

const BELOW_STRIKE_COLOR: RGBColor = RGBColor(214, 96, 77);
const ABOVE_STRIKE_COLOR: RGBColor = RGBColor(67, 147, 195);
const STRIKE_COLOR: RGBColor = RGBColor(178, 24, 43);
const EXIT_COLOR: RGBColor = RGBColor(27, 120, 55);
const MEAN_COLOR: RGBColor = RGBColor(40, 40, 40);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarClass {
    BelowStrike,
    AtOrAboveStrike,
}

impl BarClass {
    pub fn classify(value: f64, thresholds: &Thresholds) -> Self {
        if value < thresholds.strike {
            BarClass::BelowStrike
        } else {
            BarClass::AtOrAboveStrike
        }
    }

    pub fn color(&self) -> RGBColor {
        match self {
            BarClass::BelowStrike => BELOW_STRIKE_COLOR,
            BarClass::AtOrAboveStrike => ABOVE_STRIKE_COLOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub year: i32,
    pub value: f64,
    pub class: BarClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandKind {
    /// `[0, strike)`
    BelowStrike,
    /// `[strike, exit)`
    StrikeToExit,
    /// `[exit, max(max, exit) * 1.05]`
    AboveExit,
}

impl BandKind {
    fn color(&self) -> RGBColor {
        match self {
            BandKind::BelowStrike => RGBColor(244, 165, 130),
            BandKind::StrikeToExit => RGBColor(255, 255, 191),
            BandKind::AboveExit => RGBColor(166, 217, 106),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub kind: BandKind,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Strike,
    Exit,
    Mean,
}

impl ReferenceKind {
    fn color(&self) -> RGBColor {
        match self {
            ReferenceKind::Strike => STRIKE_COLOR,
            ReferenceKind::Exit => EXIT_COLOR,
            ReferenceKind::Mean => MEAN_COLOR,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ReferenceKind::Strike => "Strike",
            ReferenceKind::Exit => "Exit",
            ReferenceKind::Mean => "Mean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    pub kind: ReferenceKind,
    pub value: f64,
}

impl ReferenceLine {
    pub fn label(&self) -> String {
        format!("{} ({:.1} mm)", self.kind.name(), self.value)
    }
}

/// Label pointing at one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub year: i32,
    pub value: f64,
    pub label: String,
    /// Top-left corner of the label, in data coordinates
    pub label_at: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub bars: Vec<Bar>,
    pub bands: [Band; 3],
    pub reference_lines: [ReferenceLine; 3],
    pub max: Annotation,
    pub min: Annotation,
    pub x_range: (f64, f64),
    pub y_max: f64,
}

impl ChartLayout {
    pub fn new(rows: &RowSet, thresholds: &Thresholds) -> Result<Self, ChartError> {
        let summary = rows.summary().ok_or(ChartError::Empty)?;

        let bars = rows
            .iter()
            .map(|record| Bar {
                year: record.year,
                value: record.accumulated,
                class: BarClass::classify(record.accumulated, thresholds),
            })
            .collect::<Vec<_>>();

        let band_top = summary.max.accumulated.max(thresholds.exit) * BAND_HEADROOM;
        let bands = [
            Band {
                kind: BandKind::BelowStrike,
                lower: 0.0,
                upper: thresholds.strike,
            },
            Band {
                kind: BandKind::StrikeToExit,
                lower: thresholds.strike,
                upper: thresholds.exit,
            },
            Band {
                kind: BandKind::AboveExit,
                lower: thresholds.exit,
                upper: band_top,
            },
        ];
        let reference_lines = [
            ReferenceLine {
                kind: ReferenceKind::Strike,
                value: thresholds.strike,
            },
            ReferenceLine {
                kind: ReferenceKind::Exit,
                value: thresholds.exit,
            },
            ReferenceLine {
                kind: ReferenceKind::Mean,
                value: summary.mean,
            },
        ];

        let first_year = bars.first().map(|b| b.year).unwrap_or(summary.min.year);
        let last_year = bars.last().map(|b| b.year).unwrap_or(summary.max.year);
        let x_range = (first_year as f64 - 1.0, last_year as f64 + 1.0);
        let y_max = band_top.max(thresholds.strike) * LABEL_HEADROOM;
        let midpoint = (x_range.0 + x_range.1) / 2.0;
        let x_span = x_range.1 - x_range.0;

        let annotate = |prefix: &str, year: i32, value: f64, lift: f64| {
            let label = format!("{prefix}: {value:.1} mm ({year})");
            let width = label_width(&label, x_span);
            let gap = 0.01 * x_span;
            let x = year as f64;
            // labels right of the middle go on the left of their bar
            let preferred = if x > midpoint {
                x - BAR_HALF_WIDTH - gap - width
            } else {
                x + BAR_HALF_WIDTH + gap
            };
            Annotation {
                year,
                value,
                label,
                label_at: (
                    preferred.min(x_range.1 - width).max(x_range.0),
                    (value + lift * y_max).min(y_max),
                ),
            }
        };
        let max = annotate("Max", summary.max.year, summary.max.accumulated, 0.08);
        let min = annotate("Min", summary.min.year, summary.min.accumulated, 0.15);

        Ok(ChartLayout {
            bars,
            bands,
            reference_lines,
            max,
            min,
            x_range,
            y_max,
        })
    }
}

/// Estimated width of `label` in x-axis units for a plot spanning `x_span`.
pub fn label_width(label: &str, x_span: f64) -> f64 {
    label.chars().count() as f64 * LABEL_CHAR_PX / PLOT_WIDTH_PX * x_span
}

/// Render to `path`, picking SVG or PNG from the extension.
///
/// PNG output rasterises text itself and is only available with the `ttf`
/// feature; without it a `.png` path is refused instead of drawn.
pub fn render(layout: &ChartLayout, path: &Path) -> Result<(), ChartError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "svg" => render_svg(layout, path),
        #[cfg(feature = "ttf")]
        "png" => render_png(layout, path),
        #[cfg(not(feature = "ttf"))]
        "png" => Err(ChartError::FontsUnavailable(path.display().to_string())),
        _ => Err(ChartError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn render_svg(layout: &ChartLayout, path: &Path) -> Result<(), ChartError> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    draw(layout, root)
}

#[cfg(feature = "ttf")]
pub fn render_png(layout: &ChartLayout, path: &Path) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    draw(layout, root)
}

/// Render to an in-memory SVG document.
pub fn render_svg_string(layout: &ChartLayout) -> Result<String, ChartError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw(layout, root)?;
    }
    Ok(svg)
}

fn draw_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

fn draw<DB>(layout: &ChartLayout, root: DrawingArea<DB, Shift>) -> Result<(), ChartError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(draw_error)?;
    let (x0, x1) = layout.x_range;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, font(24.0))
        .margin(MARGIN)
        .x_label_area_size(45)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x0..x1, 0f64..layout.y_max)
        .map_err(draw_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .x_labels(layout.bars.len().clamp(2, 20))
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .label_style(font(14.0))
        .draw()
        .map_err(draw_error)?;

    chart
        .draw_series(layout.bands.iter().map(|band| {
            Rectangle::new(
                [(x0, band.lower), (x1, band.upper)],
                band.kind.color().mix(0.35).filled(),
            )
        }))
        .map_err(draw_error)?;

    chart
        .draw_series(layout.bars.iter().map(|bar| {
            let x = bar.year as f64;
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, bar.value)],
                bar.class.color().filled(),
            )
        }))
        .map_err(draw_error)?;

    for line in &layout.reference_lines {
        let color = line.kind.color();
        let style = ShapeStyle {
            color: color.to_rgba(),
            filled: false,
            stroke_width: 2,
        };
        chart
            .draw_series(LineSeries::new(
                vec![(x0, line.value), (x1, line.value)],
                style,
            ))
            .map_err(draw_error)?
            .label(line.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], color));
    }

    for annotation in [&layout.max, &layout.min] {
        let target = (annotation.year as f64, annotation.value);
        let head = 0.02 * layout.y_max;
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![annotation.label_at, (target.0, target.1 + head)],
                BLACK.stroke_width(1),
            )))
            .map_err(draw_error)?;
        // arrow head resting on the top of the bar
        chart
            .draw_series(std::iter::once(Polygon::new(
                vec![
                    target,
                    (target.0 - 0.2, target.1 + head),
                    (target.0 + 0.2, target.1 + head),
                ],
                BLACK.filled(),
            )))
            .map_err(draw_error)?;
        chart
            .draw_series(std::iter::once(Text::new(
                annotation.label.clone(),
                annotation.label_at,
                font(14.0).color(&BLACK),
            )))
            .map_err(draw_error)?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(font(14.0))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(draw_error)?;

    root.present().map_err(draw_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirps_core::AnnualRecord;

    fn rows() -> RowSet {
        RowSet::from_records(&[
            AnnualRecord::new(2019, 200.0),
            AnnualRecord::new(2020, 900.0),
            AnnualRecord::new(2021, 1300.0),
        ])
    }

    fn thresholds() -> Thresholds {
        Thresholds::new(230.0, 1000.0).unwrap()
    }

    #[test]
    fn test_bar_colours_follow_strike() {
        let layout = ChartLayout::new(&rows(), &thresholds()).unwrap();
        let classes: Vec<(i32, BarClass)> = layout.bars.iter().map(|b| (b.year, b.class)).collect();
        assert_eq!(
            classes,
            vec![
                (2019, BarClass::BelowStrike),
                (2020, BarClass::AtOrAboveStrike),
                (2021, BarClass::AtOrAboveStrike),
            ]
        );
        assert_eq!(layout.bars[0].class.color(), BELOW_STRIKE_COLOR);
        assert_eq!(layout.bars[2].class.color(), ABOVE_STRIKE_COLOR);
    }

    #[test]
    fn test_value_equal_to_strike_is_above() {
        assert_eq!(
            BarClass::classify(230.0, &thresholds()),
            BarClass::AtOrAboveStrike
        );
        assert_eq!(
            BarClass::classify(229.99, &thresholds()),
            BarClass::BelowStrike
        );
    }

    #[test]
    fn test_extreme_annotations() {
        let layout = ChartLayout::new(&rows(), &thresholds()).unwrap();
        assert_eq!((layout.max.year, layout.max.value), (2021, 1300.0));
        assert_eq!((layout.min.year, layout.min.value), (2019, 200.0));
        assert!(layout.max.label.contains("1300.0"));
        assert!(layout.min.label.contains("2019"));
        // labels sit above the bar they point at
        assert!(layout.max.label_at.1 > layout.max.value);
        assert!(layout.min.label_at.1 > layout.min.value);
        assert!(layout.max.label_at.1 <= layout.y_max);
        assert_annotations_in_bounds(&layout);
        // the max label is drawn left of the last bar
        assert!(layout.max.label_at.0 < 2021.0);
    }

    fn assert_annotations_in_bounds(layout: &ChartLayout) {
        let (x0, x1) = layout.x_range;
        for annotation in [&layout.max, &layout.min] {
            let (x, y) = annotation.label_at;
            let width = label_width(&annotation.label, x1 - x0);
            assert!(x >= x0, "{} starts at {x}, before {x0}", annotation.label);
            assert!(
                x + width <= x1 + 1e-9,
                "{} ends at {}, after {x1}",
                annotation.label,
                x + width
            );
            assert!((0.0..=layout.y_max).contains(&y));
        }
    }

    #[test]
    fn test_annotations_stay_inside_short_ranges() {
        for years in 1..=3 {
            let records: Vec<AnnualRecord> = (0..years)
                .map(|i| AnnualRecord::new(2000 + i, 100.0 * (i + 1) as f64))
                .collect();
            let layout = ChartLayout::new(&RowSet::from_records(&records), &thresholds()).unwrap();
            assert_annotations_in_bounds(&layout);
        }
    }

    #[test]
    fn test_annotations_stay_inside_long_range() {
        let records: Vec<AnnualRecord> = (1981..=2024)
            .map(|year| AnnualRecord::new(year, 300.0 + ((year * 37) % 900) as f64))
            .collect();
        let layout = ChartLayout::new(&RowSet::from_records(&records), &thresholds()).unwrap();
        assert_annotations_in_bounds(&layout);
    }

    #[test]
    fn test_bands_and_reference_lines() {
        let layout = ChartLayout::new(&rows(), &thresholds()).unwrap();
        assert_eq!((layout.bands[0].lower, layout.bands[0].upper), (0.0, 230.0));
        assert_eq!((layout.bands[1].lower, layout.bands[1].upper), (230.0, 1000.0));
        assert_eq!(layout.bands[2].lower, 1000.0);
        assert!((layout.bands[2].upper - 1365.0).abs() < 1e-9);
        assert!(layout.y_max > layout.bands[2].upper);

        let values: Vec<(ReferenceKind, f64)> = layout
            .reference_lines
            .iter()
            .map(|l| (l.kind, l.value))
            .collect();
        assert_eq!(values[0], (ReferenceKind::Strike, 230.0));
        assert_eq!(values[1], (ReferenceKind::Exit, 1000.0));
        assert_eq!(values[2].0, ReferenceKind::Mean);
        assert!((values[2].1 - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_exit_above_all_values_keeps_band_visible() {
        let rows = RowSet::from_records(&[AnnualRecord::new(2000, 100.0)]);
        let layout = ChartLayout::new(&rows, &thresholds()).unwrap();
        assert_eq!(layout.bands[2].lower, 1000.0);
        assert!(layout.bands[2].upper > layout.bands[2].lower);
        assert!((layout.bands[2].upper - 1050.0).abs() < 1e-9);
        assert!(layout.y_max > layout.bands[2].upper);
    }

    #[test]
    fn test_empty_rows_cannot_be_charted() {
        let result = ChartLayout::new(&RowSet::default(), &thresholds());
        assert!(matches!(result, Err(ChartError::Empty)));
    }

    #[test]
    fn test_render_svg_string() {
        let layout = ChartLayout::new(&rows(), &thresholds()).unwrap();
        let svg = render_svg_string(&layout).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(TITLE));
        assert!(svg.contains("Max: 1300.0 mm (2021)"));
    }

    #[test]
    fn test_render_by_extension() {
        let layout = ChartLayout::new(&rows(), &thresholds()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let svg_path = dir.path().join("chart.svg");
        render(&layout, &svg_path).unwrap();
        assert!(std::fs::read_to_string(&svg_path).unwrap().contains("<svg"));

        let result = render(&layout, &dir.path().join("chart.gif"));
        assert!(matches!(result, Err(ChartError::UnsupportedFormat(_))));
    }

    #[cfg(not(feature = "ttf"))]
    #[test]
    fn test_png_without_fonts_is_refused() {
        let layout = ChartLayout::new(&rows(), &thresholds()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let png_path = dir.path().join("chart.png");
        let result = render(&layout, &png_path);
        assert!(matches!(result, Err(ChartError::FontsUnavailable(_))));
        assert!(!png_path.exists());
    }

    #[cfg(feature = "ttf")]
    #[test]
    fn test_render_png() {
        let layout = ChartLayout::new(&rows(), &thresholds()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let png_path = dir.path().join("chart.png");
        render(&layout, &png_path).unwrap();
        let bytes = std::fs::read(&png_path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}
