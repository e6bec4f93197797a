//! ASCII plotting of a smoothed series for terminal output.
//!
//! Fixed-size grid, deterministic output. Each party is drawn as a line with
//! its own glyph; parties that are zero across the whole series are left out.
//! Where lines cross, the party earlier in taxonomy order keeps the cell.

use chrono::NaiveDate;

use crate::domain::{Party, SmoothedPoint};

/// Render a smoothed series. Degenerate dates leave a gap in every line.
pub fn render_series_plot(series: &[SmoothedPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<&SmoothedPoint> = series.iter().filter(|p| !p.outcome.is_degenerate()).collect();
    let span = series.first().zip(series.last()).filter(|_| !points.is_empty());
    let Some((first, last)) = span else {
        return "Plot: no data\n".to_string();
    };

    let (d_min, d_max) = day_range(first.date, last.date);
    let drawn: Vec<Party> = Party::ALL
        .into_iter()
        .filter(|&party| points.iter().any(|p| *p.shares().get(party) > 0.0))
        .collect();

    let (y_min, y_max) = y_range(&points, &drawn).unwrap_or((0.0, 100.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for &party in &drawn {
        let line: Vec<Option<(f64, f64)>> = series
            .iter()
            .map(|p| {
                (!p.outcome.is_degenerate()).then(|| (days_since(first.date, p.date), *p.shares().get(party)))
            })
            .collect();
        draw_series(&mut grid, &line, (d_min, d_max), (y_min, y_max), glyph(party));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {} | share=[{y_min:.2}, {y_max:.2}]%\n",
        first.date, last.date
    ));
    let legend: Vec<String> = drawn
        .iter()
        .map(|&p| format!("{}={}", glyph(p), p.acronym()))
        .collect();
    out.push_str(&legend.join(" "));
    out.push('\n');

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn glyph(party: Party) -> char {
    match party {
        Party::Liberal => 'L',
        Party::Conservative => 'C',
        Party::Ndp => 'N',
        Party::Bloc => 'B',
        Party::Green => 'G',
        Party::Ppc => 'P',
        Party::Other => 'O',
    }
}

fn days_since(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

fn day_range(first: NaiveDate, last: NaiveDate) -> (f64, f64) {
    let span = days_since(first, last);
    if span > 0.0 { (0.0, span) } else { (0.0, 1.0) }
}

fn y_range(points: &[&SmoothedPoint], parties: &[Party]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        let shares = p.shares();
        for &party in parties {
            let v = *shares.get(party);
            min_y = min_y.min(v);
            max_y = max_y.max(v);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// `None` entries break the line.
fn draw_series(grid: &mut [Vec<char>], line: &[Option<(f64, f64)>], x_range: (f64, f64), y_range: (f64, f64), ch: char) {
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);

    let mut prev = None;
    for point in line {
        let Some((t, y)) = *point else {
            prev = None;
            continue;
        };
        let x = map_x(t, x_range.0, x_range.1, width);
        let yy = map_y(y, y_range.0, y_range.1, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None => draw_line(grid, x, yy, x, yy, ch),
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish). Occupied cells are left alone.
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
    use crate::domain::{PartyShares, ShareOutcome};

    fn point(day: u32, liberal: f64, conservative: f64) -> SmoothedPoint {
        SmoothedPoint {
            date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            outcome: ShareOutcome::Normalized(PartyShares {
                liberal,
                conservative,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = vec![point(1, 40.0, 60.0), point(2, 60.0, 40.0)];

        let txt = render_series_plot(&series, 10, 5);
        let expected = concat!(
            "Plot: 2025-04-01 .. 2025-04-02 | share=[39.00, 61.00]%\n",
            "L=LPC C=CPC\n",
            "CC      LL\n",
            "  CC  LL  \n",
            "    LL    \n",
            "  LL  CC  \n",
            "LL      CC\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn degenerate_date_breaks_every_line() {
        let series = vec![
            point(1, 40.0, 60.0),
            SmoothedPoint {
                date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
                outcome: ShareOutcome::Degenerate,
            },
            point(3, 60.0, 40.0),
        ];

        let txt = render_series_plot(&series, 10, 5);
        let expected = concat!(
            "Plot: 2025-04-01 .. 2025-04-03 | share=[39.00, 61.00]%\n",
            "L=LPC C=CPC\n",
            "C        L\n",
            "          \n",
            "          \n",
            "          \n",
            "L        C\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn degenerate_only_series_has_no_data() {
        let series = vec![SmoothedPoint {
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            outcome: ShareOutcome::Degenerate,
        }];
        assert_eq!(render_series_plot(&series, 20, 8), "Plot: no data\n");
    }

    #[test]
    fn single_point_does_not_panic() {
        let txt = render_series_plot(&[point(1, 50.0, 50.0)], 12, 6);
        // Equal shares share a cell; the liberal glyph wins.
        assert!(txt.contains('L'));
        assert_eq!(txt.lines().count(), 2 + 6);
    }
}
