//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual comparison of salary vs inflation in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! X is the period index (evenly spaced), Y is the value. Each series draws a
//! connecting line with its `line` char, then its observations with `point`.
//! Missing values (`None`) break the line.

use crate::domain::{EnrichedRecord, Period};

/// One plotted series.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub point: char,
    pub line: char,
    pub values: Vec<Option<f64>>,
}

/// "Evolución de los Salarios": nominal salary vs inflation-adjusted salary.
pub fn render_salary_plot(records: &[EnrichedRecord], width: usize, height: usize) -> String {
    let periods: Vec<Period> = records.iter().map(|r| r.periodo).collect();
    let series = [
        Series {
            label: "salario_ajustado".to_string(),
            point: '+',
            line: '-',
            values: records.iter().map(|r| Some(r.salario_ajustado)).collect(),
        },
        Series {
            label: "salario".to_string(),
            point: 'o',
            line: '.',
            values: records.iter().map(|r| Some(r.salario)).collect(),
        },
    ];
    render_series_plot("Salarios", &periods, &series, width, height)
}

/// "Evolución de los Índices": salary index vs inflation rate (percent).
///
/// The final period has no salary index, so it is left out of this chart.
pub fn render_index_plot(records: &[EnrichedRecord], width: usize, height: usize) -> String {
    let window = &records[..records.len().saturating_sub(1)];
    let periods: Vec<Period> = window.iter().map(|r| r.periodo).collect();
    let series = [
        Series {
            label: "indice_inflacion".to_string(),
            point: '+',
            line: '-',
            values: window.iter().map(|r| Some(r.indice_inflacion)).collect(),
        },
        Series {
            label: "indice_salarial".to_string(),
            point: 'o',
            line: '.',
            values: window.iter().map(|r| r.indice_salarial).collect(),
        },
    ];
    render_series_plot("Indices %", &periods, &series, width, height)
}

/// Render any set of series sharing the same period axis.
pub fn render_series_plot(title: &str, periods: &[Period], series: &[Series], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((first, last)) = periods.first().zip(periods.last()) else {
        return format!("{title}: (no data)\n");
    };

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let n = periods.len();

    let mut grid = vec![vec![' '; width]; height];

    // Lines first (so points can overlay).
    for s in series {
        let mut prev: Option<(usize, usize)> = None;
        for (i, v) in s.values.iter().enumerate().take(n) {
            let Some(v) = v.filter(|v| v.is_finite()) else {
                prev = None;
                continue;
            };
            let cell = (map_x(i, n, width), map_y(v, y_min, y_max, height));
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, cell.0, cell.1, s.line);
            }
            prev = Some(cell);
        }
    }

    for s in series {
        for (i, v) in s.values.iter().enumerate().take(n) {
            if let Some(v) = v.filter(|v| v.is_finite()) {
                grid[map_y(v, y_min, y_max, height)][map_x(i, n, width)] = s.point;
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{title}: {first}..{last} | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    let legend: Vec<String> = series.iter().map(|s| format!("{} {}", s.point, s.label)).collect();
    out.push_str(&legend.join("   "));
    out.push('\n');

    out
}

fn y_range(series: &[Series]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in series.iter().flat_map(|s| s.values.iter().flatten()) {
        if v.is_finite() {
            min_y = min_y.min(*v);
            max_y = max_y.max(*v);
        }
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: open a unit band around the value.
        Some((min_y - 0.5, max_y + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u.clamp(0.0, 1.0) * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let periods = [p("2021-03"), p("2021-04")];
        let series = [
            Series {
                label: "salario_ajustado".to_string(),
                point: '+',
                line: '-',
                values: vec![Some(100.0), Some(100.0)],
            },
            Series {
                label: "salario".to_string(),
                point: 'o',
                line: '.',
                values: vec![Some(100.0), Some(110.0)],
            },
        ];

        let txt = render_series_plot("Salarios", &periods, &series, 10, 5);
        let expected = concat!(
            "Salarios: 2021-03..2021-04 | y=[99.50, 110.50]\n",
            "        .o\n",
            "      ..  \n",
            "    ..    \n",
            "  ..      \n",
            "o--------+\n",
            "+ salario_ajustado   o salario\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_input_renders_placeholder() {
        assert_eq!(render_series_plot("Salarios", &[], &[], 40, 10), "Salarios: (no data)\n");
        assert_eq!(render_index_plot(&[], 40, 10), "Indices %: (no data)\n");
    }

    #[test]
    fn index_plot_skips_last_period() {
        let record = |period: &str, rate: f64, idx: Option<f64>| EnrichedRecord {
            periodo: p(period),
            salario: 1.0,
            cantidad_de_ingresos: 1,
            indice_inflacion: rate,
            salario_ajustado: 1.0,
            indice_salarial: idx,
            check_infla: None,
        };
        let records = [
            record("2021-03", 10.0, Some(5.0)),
            record("2021-04", 15.0, Some(4.0)),
            record("2021-05", 12.0, None),
        ];
        let txt = render_index_plot(&records, 20, 6);
        assert!(txt.starts_with("Indices %: 2021-03..2021-04 |"));
        // Header + 6 grid rows + legend.
        assert_eq!(txt.lines().count(), 8);
    }

    #[test]
    fn single_point_plots_without_panicking() {
        let periods = [p("2021-03")];
        let series = [Series {
            label: "salario".to_string(),
            point: 'o',
            line: '.',
            values: vec![Some(42.0)],
        }];
        let txt = render_series_plot("Salarios", &periods, &series, 10, 5);
        assert!(txt.contains('o'));
    }
}
