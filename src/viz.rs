//! Distribution charts for batch scoring runs, drawn with Plotters.

use plotters::prelude::*;

use crate::batch::BatchSummary;
use crate::interpret::segment_info;

/// One color per segment label; labels beyond the palette wrap around.
const SEGMENT_COLORS: [RGBColor; 7] = [RED, BLUE, GREEN, YELLOW, MAGENTA, CYAN, BLACK];

/// Bar chart of scored customers per segment, with segment names on the
/// x-axis.
pub fn create_segment_chart(summary: &BatchSummary, output_path: &str) -> crate::Result<()> {
    let n = summary.segment_counts.len();
    let max_count = summary.segment_counts.iter().copied().max().unwrap_or(1).max(1) as f64;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Customers per Segment", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(90)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..(max_count * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("Segment")
        .y_desc("Customers")
        .x_labels(n)
        .x_label_formatter(&|x| {
            let nearest = x.round();
            if (x - nearest).abs() > 0.01 || nearest < 0.0 {
                return String::new();
            }
            segment_info(nearest as usize).name.to_string()
        })
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (label, &count) in summary.segment_counts.iter().enumerate() {
        let color = &SEGMENT_COLORS[label % SEGMENT_COLORS.len()];

        chart.draw_series(std::iter::once(Rectangle::new(
            [(label as f64 - 0.4, 0.0), (label as f64 + 0.4, count as f64)],
            color.filled(),
        )))?;
    }

    root.present()?;
    println!("Segment distribution chart saved to: {}", output_path);

    Ok(())
}

/// Histogram of churn percentages in ten 10% bins.
pub fn create_churn_histogram(churn_pcts: &[f64], output_path: &str) -> crate::Result<()> {
    let mut bins = [0usize; 10];
    for &pct in churn_pcts {
        let bin = ((pct / 10.0) as usize).min(9);
        bins[bin] += 1;
    }
    let max_count = bins.iter().copied().max().unwrap_or(1).max(1) as f64;

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Churn Risk Distribution", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..100f64, 0f64..(max_count * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("Churn Probability (%)")
        .y_desc("Customers")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (bin, &count) in bins.iter().enumerate() {
        let x0 = bin as f64 * 10.0;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(x0 + 0.5, 0.0), (x0 + 9.5, count as f64)],
            BLUE.filled(),
        )))?;
    }

    root.present()?;
    println!("Churn distribution chart saved to: {}", output_path);

    Ok(())
}

/// Write both batch charts: the segment bars at `output_path` and the churn
/// histogram next to it with a `_churn.png` suffix.
pub fn render_batch_charts(summary: &BatchSummary, output_path: &str) -> crate::Result<()> {
    create_segment_chart(summary, output_path)?;

    let churn_path = output_path.replace(".png", "_churn.png");
    create_churn_histogram(&summary.churn_pcts, &churn_path)?;

    Ok(())
}
