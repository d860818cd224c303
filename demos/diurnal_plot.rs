//! demos/diurnal_plot.rs
//!
//! Reads a year of hub height wind speeds for a location and plots the
//! diurnal profile with `plotlars`.
//!
//! To run this example (a mirror or a populated cache is needed):
//! ALBATROSS_MIRROR_URL=https://... cargo run --example diurnal_plot --features examples

use std::error::Error;

use albatross::{get_diurnal_stats, Field, LatLon, RequestParams, WindToolkit};
use plotlars::{Legend, Line, Plot, Rgb, Text, TimeSeriesPlot};
use polars::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("Reading wind data from the WIND Toolkit...");

    let client = WindToolkit::new().await?;
    let location = LatLon(39.913561, -105.222422); // NWTC, Boulder

    let mut params = RequestParams::new();
    params.register(Field::WindSpeed, &[100])?;

    let point = client
        .point_data()
        .location(location)
        .year(2012)
        .params(params.as_slice())
        .call()
        .await?;

    let stats = get_diurnal_stats(&point.data, None)?;
    println!("{}", stats);

    println!("Generating diurnal plot...");
    plot_diurnal(&stats);
    println!("Plot shown in browser.");

    Ok(())
}

fn plot_diurnal(stats: &DataFrame) {
    TimeSeriesPlot::builder()
        .data(stats)
        .x("hour")
        .y("Mean")
        .additional_series(vec!["10th Percentile", "Median", "90th Percentile"])
        .colors(vec![
            Rgb(235, 117, 0),
            Rgb(69, 157, 230),
            Rgb(30, 30, 30),
            Rgb(69, 157, 230),
        ])
        .lines(vec![Line::Solid, Line::Dash, Line::Dot, Line::Dash])
        .plot_title(Text::from("Diurnal wind speed").font("Arial").size(18))
        .legend(&Legend::new().x(0.05).y(0.9))
        .x_title("Hour")
        .y_title("Wind speed (m/s)")
        .build()
        .plot();
}
