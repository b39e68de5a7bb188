// src/utils/charting.rs

use chrono::NaiveDate;
use plotters::prelude::*;
use thiserror::Error;

use crate::models::PriceSeries;

pub const CHART_SIZE: (u32, u32) = (1000, 400);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to plot")]
    EmptySeries,
    #[error("failed to draw chart: {0}")]
    Drawing(String),
}

fn drawing_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Draws the closing price over time as a standalone SVG document.
pub fn render_close_chart(ticker: &str, series: &PriceSeries) -> Result<String, RenderError> {
    let points: Vec<(NaiveDate, f64)> = series
        .records()
        .iter()
        .filter_map(|bar| bar.close.filter(|c| c.is_finite()).map(|c| (bar.date, c)))
        .collect();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(RenderError::EmptySeries);
    };

    let max_value = points.iter().map(|(_, c)| *c).fold(f64::MIN, f64::max);
    let min_value = points.iter().map(|(_, c)| *c).fold(f64::MAX, f64::min);

    let y_range = if (max_value - min_value).abs() < f64::EPSILON {
        // Flat series; give the axis some room.
        (min_value - 1.0)..(max_value + 1.0)
    } else {
        let pad = (max_value - min_value) * 0.05;
        (min_value - pad)..(max_value + pad)
    };

    let (first, last) = (first.0, last.0);
    let x_range = if first == last {
        first.pred_opt().unwrap_or(first)..last.succ_opt().unwrap_or(last)
    } else {
        first..last
    };

    let mut svg = String::new();
    {
        let root_area = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root_area.fill(&WHITE).map_err(drawing_err)?;

        let mut chart = ChartBuilder::on(&root_area)
            .caption(format!("{} Closing Price", ticker), ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing_err)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Price")
            .light_line_style(BLACK.mix(0.05))
            .bold_line_style(BLACK.mix(0.3))
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
            .draw()
            .map_err(drawing_err)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
            .map_err(drawing_err)?
            .label("Closing Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing_err)?;

        root_area.present().map_err(drawing_err)?;
    }

    Ok(svg)
}
