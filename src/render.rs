use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::config::PlotConfig;
use crate::errors::BenchplotError;
use crate::types::{Row, UnifiedTable};

/// Categorical palette for the `lang` hue, cycled when there are more languages.
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

const AXES_BG: RGBColor = RGBColor(234, 234, 242);
const LEGEND_WIDTH: u32 = 120;
const POINT_RADIUS: i32 = 3;
const FONT: &str = "sans-serif";

pub fn hue_color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

/// Choose the backend from the output file extension.
pub fn image_format(path: &Path) -> Result<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("svg") => Ok(ImageFormat::Svg),
        Some("png") => Ok(ImageFormat::Png),
        _ => Err(BenchplotError::UnsupportedOutput {
            path: path.to_path_buf(),
        }
        .into()),
    }
}

/// Layout of the faceted plot, computed before anything is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetGrid {
    /// One grid row per `size`, first-appearance order.
    pub rows: Vec<String>,
    /// One grid column per `prog`, first-appearance order.
    pub cols: Vec<String>,
    /// Point colours, one per `lang`.
    pub hues: Vec<String>,
    pub x: usize,
    pub y: usize,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

fn lookup_column(table: &UnifiedTable, name: &str) -> Result<usize> {
    table.column_index(name).ok_or_else(|| {
        BenchplotError::MissingColumn {
            name: name.to_string(),
            available: table.columns.join(", "),
        }
        .into()
    })
}

/// Shared axis range over all finite values, padded by 5% each side.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        return (lo - 0.5)..(hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

fn point(row: &Row, x: usize, y: usize) -> Option<(f64, f64)> {
    let (px, py) = (row.values[x], row.values[y]);
    (px.is_finite() && py.is_finite()).then_some((px, py))
}

pub fn facet_grid(table: &UnifiedTable, x_name: &str, y_name: &str) -> Result<FacetGrid> {
    let x = lookup_column(table, x_name)?;
    let y = lookup_column(table, y_name)?;

    let points: Vec<(f64, f64)> = table.rows.iter().filter_map(|r| point(r, x, y)).collect();

    Ok(FacetGrid {
        rows: table.distinct(|r| r.size.as_str()),
        cols: table.distinct(|r| r.prog.as_str()),
        hues: table.distinct(|r| r.lang.as_str()),
        x,
        y,
        x_range: padded_range(points.iter().map(|p| p.0)),
        y_range: padded_range(points.iter().map(|p| p.1)),
    })
}

/// Pixel size of the legend-free grid and of the whole canvas.
///
/// Facet dimensions come straight from config, so every product is checked.
pub fn canvas_size(grid: &FacetGrid, plot: &PlotConfig) -> std::result::Result<(u32, (u32, u32)), String> {
    plot.check_facet_size()?;

    let overflow = || "plot dimensions overflow".to_string();
    let n_cols = u32::try_from(grid.cols.len().max(1)).map_err(|_| overflow())?;
    let n_rows = u32::try_from(grid.rows.len().max(1)).map_err(|_| overflow())?;

    let grid_width = n_cols.checked_mul(plot.facet_width).ok_or_else(overflow)?;
    let width = grid_width.checked_add(LEGEND_WIDTH).ok_or_else(overflow)?;
    let height = n_rows.checked_mul(plot.facet_height).ok_or_else(overflow)?;
    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(overflow());
    }
    Ok((grid_width, (width, height)))
}

/// Finite points of one `lang` inside the (`size`, `prog`) facet, in table order.
pub fn facet_points(
    table: &UnifiedTable,
    grid: &FacetGrid,
    size: &str,
    prog: &str,
    lang: &str,
) -> Vec<(f64, f64)> {
    table
        .rows
        .iter()
        .filter(|r| r.size == size && r.prog == prog && r.lang == lang)
        .filter_map(|r| point(r, grid.x, grid.y))
        .collect()
}

/// Draw the faceted scatter grid to `plot.output` and return that path.
///
/// The output extension, plot columns and canvas size are validated before
/// the file is created.
pub fn render(table: &UnifiedTable, plot: &PlotConfig) -> Result<PathBuf> {
    let format = image_format(&plot.output)?;
    let grid = facet_grid(table, &plot.x, &plot.y)?;
    let path = plot.output.clone();

    let render_err = |detail: String| BenchplotError::Render {
        path: path.clone(),
        detail,
    };

    let (grid_width, size) = canvas_size(&grid, plot).map_err(render_err)?;
    debug!(?format, width = size.0, height = size.1, "rendering");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| render_err(e.to_string()))?;
    }

    let drawn = match format {
        ImageFormat::Svg => {
            let root = SVGBackend::new(&path, size).into_drawing_area();
            draw(root, grid_width, table, &grid, plot).map_err(|e| e.to_string())
        }
        ImageFormat::Png => {
            let root = BitMapBackend::new(&path, size).into_drawing_area();
            draw(root, grid_width, table, &grid, plot).map_err(|e| e.to_string())
        }
    };
    drawn.map_err(render_err)?;

    info!(path = %path.display(), facets = grid.rows.len() * grid.cols.len(), "plot written");
    Ok(path)
}

fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    grid_width: u32,
    table: &UnifiedTable,
    grid: &FacetGrid,
    plot: &PlotConfig,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (grid_area, legend_area) = root.split_horizontally(grid_width as i32);

    if !grid.rows.is_empty() && !grid.cols.is_empty() {
        let panels = grid_area.split_evenly((grid.rows.len(), grid.cols.len()));
        for (i, panel) in panels.iter().enumerate() {
            let size = &grid.rows[i / grid.cols.len()];
            let prog = &grid.cols[i % grid.cols.len()];
            draw_facet(panel, table, grid, plot, size, prog)?;
        }
    }

    // Legend
    legend_area.draw(&Text::new("lang", (10, 20), (FONT, 16).into_font()))?;
    for (i, lang) in grid.hues.iter().enumerate() {
        let y = 48 + i as i32 * 22;
        legend_area.draw(&Circle::new((16, y), 5, hue_color(i).filled()))?;
        legend_area.draw(&Text::new(lang.as_str(), (28, y - 7), (FONT, 14).into_font()))?;
    }

    root.present()
}

fn draw_facet<DB: DrawingBackend>(
    panel: &DrawingArea<DB, Shift>,
    table: &UnifiedTable,
    grid: &FacetGrid,
    plot: &PlotConfig,
    size: &str,
    prog: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let mut chart = ChartBuilder::on(panel)
        .caption(format!("size = {} | prog = {}", size, prog), (FONT, 14).into_font())
        .margin(8)
        .x_label_area_size(32)
        .y_label_area_size(56)
        .build_cartesian_2d(grid.x_range.clone(), grid.y_range.clone())?;

    chart.plotting_area().fill(&AXES_BG)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(plot.x.as_str())
        .y_desc(plot.y.as_str())
        .label_style((FONT, 11).into_font())
        .draw()?;

    for (h, lang) in grid.hues.iter().enumerate() {
        let color = hue_color(h);
        chart.draw_series(
            facet_points(table, grid, size, prog, lang)
                .into_iter()
                .map(|p| Circle::new(p, POINT_RADIUS, color.filled())),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn row(index: usize, lang: &str, prog: &str, size: &str, iter: f64, time: f64) -> Row {
        Row {
            index,
            values: vec![iter, time],
            lang: lang.to_string(),
            prog: prog.to_string(),
            size: size.to_string(),
            col: "0".to_string(),
        }
    }

    fn sample_table() -> UnifiedTable {
        let mut rows = Vec::new();
        for lang in ["go", "rust"] {
            for prog in ["native", "ecs"] {
                for size in ["1000", "5000"] {
                    for i in 0..3 {
                        let time = 100.0 + i as f64 * 10.0 + if lang == "go" { 5.0 } else { 0.0 };
                        rows.push(row(rows.len(), lang, prog, size, i as f64, time));
                    }
                }
            }
        }
        UnifiedTable {
            columns: vec!["Iter".to_string(), "Time".to_string()],
            rows,
        }
    }

    fn plot_config(output: PathBuf) -> PlotConfig {
        PlotConfig {
            output,
            ..PlotConfig::default()
        }
    }

    // --- image_format ---

    #[test]
    fn format_from_extension() {
        assert_eq!(image_format(Path::new("a.svg")).unwrap(), ImageFormat::Svg);
        assert_eq!(image_format(Path::new("out/a.PNG")).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn unsupported_extension() {
        for bad in ["plot.pdf", "plot", "plot.svg.bak"] {
            let err = image_format(Path::new(bad)).unwrap_err();
            assert!(err.to_string().contains("Unsupported output file"), "{bad}");
        }
    }

    // --- facet_grid ---

    #[test]
    fn grid_keys_follow_first_appearance() {
        let grid = facet_grid(&sample_table(), "Iter", "Time").unwrap();
        assert_eq!(grid.rows, vec!["1000", "5000"]);
        assert_eq!(grid.cols, vec!["native", "ecs"]);
        assert_eq!(grid.hues, vec!["go", "rust"]);
        assert_eq!((grid.x, grid.y), (0, 1));
    }

    #[test]
    fn ranges_are_shared_and_padded() {
        let grid = facet_grid(&sample_table(), "Iter", "Time").unwrap();
        // Iter spans 0..=2, Time spans 100..=125
        assert!((grid.x_range.start - -0.1).abs() < 1e-9);
        assert!((grid.x_range.end - 2.1).abs() < 1e-9);
        assert!((grid.y_range.start - 98.75).abs() < 1e-9);
        assert!((grid.y_range.end - 126.25).abs() < 1e-9);
    }

    #[test]
    fn nan_points_ignored_for_ranges() {
        let mut table = sample_table();
        table.rows[0].values[1] = f64::NAN;
        table.rows[1].values[1] = f64::INFINITY;
        let grid = facet_grid(&table, "Iter", "Time").unwrap();
        assert!(grid.y_range.end.is_finite());
    }

    #[test]
    fn degenerate_ranges() {
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(padded_range([3.0, 3.0].into_iter()), 2.5..3.5);
    }

    #[test]
    fn missing_column_lists_available() {
        let err = facet_grid(&sample_table(), "Iter", "Nanos").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Column 'Nanos' not found"), "{msg}");
        assert!(msg.contains("Iter, Time"), "{msg}");
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(hue_color(0), hue_color(PALETTE.len()));
        assert_ne!(hue_color(0), hue_color(1));
    }

    // --- facet_points ---

    #[test]
    fn every_row_lands_in_exactly_one_facet() {
        let table = sample_table();
        let grid = facet_grid(&table, "Iter", "Time").unwrap();

        let mut total = 0;
        for size in &grid.rows {
            for prog in &grid.cols {
                for lang in &grid.hues {
                    let points = facet_points(&table, &grid, size, prog, lang);
                    assert_eq!(points.len(), 3, "{size}/{prog}/{lang}");
                    total += points.len();
                }
            }
        }
        assert_eq!(total, table.len());
    }

    #[test]
    fn facet_points_use_x_and_y_columns() {
        let table = sample_table();
        let grid = facet_grid(&table, "Iter", "Time").unwrap();
        assert_eq!(
            facet_points(&table, &grid, "1000", "native", "go"),
            vec![(0.0, 105.0), (1.0, 115.0), (2.0, 125.0)]
        );
        assert_eq!(
            facet_points(&table, &grid, "5000", "ecs", "rust"),
            vec![(0.0, 100.0), (1.0, 110.0), (2.0, 120.0)]
        );
    }

    #[test]
    fn swapped_axes() {
        let table = sample_table();
        let grid = facet_grid(&table, "Time", "Iter").unwrap();
        assert_eq!(
            facet_points(&table, &grid, "1000", "native", "rust")[1],
            (110.0, 1.0)
        );
    }

    #[test]
    fn non_finite_rows_not_plotted() {
        let mut table = sample_table();
        // rows 0..3 are go/native/1000
        table.rows[0].values[1] = f64::NAN;
        table.rows[2].values[0] = f64::INFINITY;
        let grid = facet_grid(&table, "Iter", "Time").unwrap();
        assert_eq!(
            facet_points(&table, &grid, "1000", "native", "go"),
            vec![(1.0, 115.0)]
        );
        assert_eq!(facet_points(&table, &grid, "1000", "native", "rust").len(), 3);
    }

    #[test]
    fn unknown_facet_is_empty() {
        let table = sample_table();
        let grid = facet_grid(&table, "Iter", "Time").unwrap();
        assert!(facet_points(&table, &grid, "10000", "native", "go").is_empty());
    }

    // --- canvas_size ---

    #[test]
    fn canvas_adds_legend_column() {
        let grid = facet_grid(&sample_table(), "Iter", "Time").unwrap();
        let plot = PlotConfig::default();
        assert_eq!(canvas_size(&grid, &plot).unwrap(), (800, (920, 600)));
    }

    #[test]
    fn canvas_rejects_zero_facet() {
        let grid = facet_grid(&sample_table(), "Iter", "Time").unwrap();
        let plot = PlotConfig {
            facet_width: 0,
            ..PlotConfig::default()
        };
        assert!(canvas_size(&grid, &plot).unwrap_err().contains("facet_width"));
    }

    #[test]
    fn canvas_rejects_huge_facet() {
        let grid = facet_grid(&sample_table(), "Iter", "Time").unwrap();
        let plot = PlotConfig {
            facet_height: u32::MAX / 2,
            ..PlotConfig::default()
        };
        assert!(canvas_size(&grid, &plot).is_err());
    }

    // --- render ---

    #[test]
    fn huge_facet_width_is_error_not_panic() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let out = tmp.path().join("plot.svg");
        let mut cfg = plot_config(out.clone());
        cfg.facet_width = u32::MAX / 2;
        let err = render(&sample_table(), &cfg).unwrap_err();
        assert!(err.to_string().starts_with("Failed to render plot"));
        assert!(!out.exists());
    }

    #[test]
    fn zero_facet_height_writes_nothing() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let out = tmp.path().join("plot.svg");
        let mut cfg = plot_config(out.clone());
        cfg.facet_height = 0;
        assert!(render(&sample_table(), &cfg).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn invalid_output_writes_nothing() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let out = tmp.path().join("plot.pdf");
        assert!(render(&sample_table(), &plot_config(out.clone())).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn missing_column_writes_nothing() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let out = tmp.path().join("plot.svg");
        let mut cfg = plot_config(out.clone());
        cfg.y = "Nanos".to_string();
        assert!(render(&sample_table(), &cfg).is_err());
        assert!(!out.exists());
    }

    #[test]
    #[ignore = "text layout needs a system sans-serif font"]
    fn svg_contains_every_facet() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let out = tmp.path().join("nested").join("plot.svg");
        let path = render(&sample_table(), &plot_config(out.clone())).unwrap();
        assert_eq!(path, out);

        let svg = fs::read_to_string(&out).unwrap();
        assert!(svg.contains("<svg"));
        for size in ["1000", "5000"] {
            for prog in ["native", "ecs"] {
                assert!(svg.contains(&format!("size = {} | prog = {}", size, prog)));
            }
        }
        // 24 data points plus one legend marker per language
        assert_eq!(svg.matches("<circle").count(), 24 + 2);
    }

    #[test]
    #[ignore = "text layout needs a system sans-serif font"]
    fn png_written() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let out = tmp.path().join("plot.png");
        render(&sample_table(), &plot_config(out.clone())).unwrap();
        let bytes = fs::read(&out).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}
