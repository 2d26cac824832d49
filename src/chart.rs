//! SVG rendering of a [`Comparison`]

use std::path::Path;

use plotters::{prelude::*, style::RGBAColor};
use tracing as trc;

use crate::compare::{Comparison, PhaseDelta};

/// The width in pixels to allocate for each phase
static PHASE_WIDTH: u32 = 180;

/// The height in pixels of the chart
static CHART_HEIGHT: u32 = 480;

/// Deltas smaller than this many percent are drawn as neutral
static NEUTRAL_PERCENT: f64 = 2.;

/// Dark green
static FASTER: RGBColor = RGBColor(0, 170, 0);

/// The color to annotate a delta with
fn delta_color(delta: &PhaseDelta) -> &'static RGBColor {
    if delta.baseline_us == 0 || delta.percent.abs() < NEUTRAL_PERCENT {
        &BLACK
    } else if delta.percent > 0. {
        &RED
    } else {
        &FASTER
    }
}

/// The top of the y axis, leaving headroom for the annotations
fn y_max(comparison: &Comparison) -> f64 {
    let tallest = comparison
        .phases
        .iter()
        .map(|d| d.current_us.max(d.baseline_us))
        .max()
        .unwrap_or(0)
        .max(1);
    tallest as f64 * 1.25
}

/// One bar per phase, offset within each phase's slot
fn bars<'a>(
    comparison: &'a Comparison,
    offset: f64,
    color: RGBAColor,
    pick: fn(&PhaseDelta) -> u64,
) -> impl Iterator<Item = Rectangle<(f64, f64)>> + 'a {
    comparison.phases.iter().enumerate().map(move |(i, d)| {
        let x = i as f64 + offset;
        Rectangle::new([(x, 0.), (x + 0.35, pick(d) as f64)], color.filled())
    })
}

/// Draw baseline and current bars side by side for every phase
#[trc::instrument(skip(comparison))]
pub fn render_svg(comparison: &Comparison, path: &Path) -> eyre::Result<()> {
    let phase_count = comparison.phases.len();
    let root = SVGBackend::new(path, (PHASE_WIDTH * phase_count as u32, CHART_HEIGHT))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = y_max(comparison);
    let mut chart = ChartBuilder::on(&root)
        .caption("Startup Phases vs Baseline", ("Sans", 20))
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 20)
        .margin(5)
        .build_cartesian_2d(0f64..phase_count as f64, 0f64..y_max)?;

    chart
        .configure_mesh()
        .axis_desc_style(("Sans", 15))
        .y_desc("Microseconds")
        .disable_x_mesh()
        .light_line_style(&TRANSPARENT)
        .x_label_formatter(&|_| String::new())
        .y_label_formatter(&|y| format!("{:.0} \u{b5}s", y))
        .draw()?;

    let baseline_color = RED.mix(0.4);
    chart
        .draw_series(bars(comparison, 0.1, baseline_color, |d| d.baseline_us))?
        .label("Baseline")
        .legend(move |(x, y)| {
            Rectangle::new([(x, y - 5), (x + 10, y + 5)], baseline_color.filled())
        });

    let current_color = BLUE.mix(0.6);
    chart
        .draw_series(bars(comparison, 0.55, current_color, |d| d.current_us))?
        .label("Current")
        .legend(move |(x, y)| {
            Rectangle::new([(x, y - 5), (x + 10, y + 5)], current_color.filled())
        });

    // Phase name and delta above each pair of bars
    for (i, delta) in comparison.phases.iter().enumerate() {
        let drawing_area = chart.plotting_area();
        let x = i as f64 + 0.05;
        drawing_area.draw(&Text::new(
            delta.phase.label().to_string(),
            (x, y_max * 0.97),
            TextStyle::from(("Sans", 12).into_font()).color(&BLACK),
        ))?;
        drawing_area.draw(&Text::new(
            format!("{:+.2}%", delta.percent),
            (x, y_max * 0.91),
            TextStyle::from(("Sans", 16).into_font()).color(delta_color(delta)),
        ))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    trc::info!("Comparison chart written");

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metrics::{MetricsSnapshot, Phase};

    fn delta(current_us: u64, baseline_us: u64) -> PhaseDelta {
        PhaseDelta {
            phase: Phase::TotalTime,
            current_us,
            baseline_us,
            percent: crate::compare::percent_delta(current_us, baseline_us),
        }
    }

    #[test]
    fn colors_follow_delta_direction() {
        assert_eq!(delta_color(&delta(150, 100)).rgb(), RED.rgb());
        assert_eq!(delta_color(&delta(50, 100)).rgb(), FASTER.rgb());
        assert_eq!(delta_color(&delta(101, 100)).rgb(), BLACK.rgb());
        assert_eq!(delta_color(&delta(500, 0)).rgb(), BLACK.rgb());
    }

    #[test]
    fn y_axis_has_headroom() {
        let current = MetricsSnapshot {
            total_time: 800,
            ..Default::default()
        };
        let baseline = MetricsSnapshot {
            total_time: 1000,
            ..Default::default()
        };
        assert_eq!(y_max(&Comparison::new(&current, &baseline)), 1250.);

        let empty = Comparison::new(&MetricsSnapshot::new(), &MetricsSnapshot::new());
        assert!(y_max(&empty) > 0.);
    }
}
