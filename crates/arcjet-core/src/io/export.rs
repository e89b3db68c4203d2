use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::error::Result;
use crate::reduce::TimeSeries;

/// Header of the exported table, in column order.
pub fn export_header(series: &TimeSeries) -> Vec<String> {
    let mut header = vec!["TIME".to_string(), "INDEX".to_string()];
    header.extend(series.physical.iter().map(|c| c.name.clone()));
    header.extend(series.pixel.iter().map(|c| format!("{}_PX", c.name)));
    header.push("INLIER".into());
    header.push("CONFIG".into());
    header
}

fn cell(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        String::new()
    }
}

/// Write one row per retained frame. Missing samples are empty cells.
pub fn export_csv(series: &TimeSeries, path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    wtr.write_record(export_header(series))?;

    let config = series.config.summary();
    for i in 0..series.len() {
        let mut row = Vec::with_capacity(series.physical.len() + series.pixel.len() + 4);
        row.push(cell(series.time[i]));
        row.push(series.indices[i].to_string());
        row.extend(series.physical.iter().map(|c| cell(c.values[i])));
        row.extend(series.pixel.iter().map(|c| cell(c.values[i])));
        row.push(if series.inlier[i] { "1" } else { "0" }.to_string());
        row.push(config.clone());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;

    info!(path = %path.display(), rows = series.len(), "Exported time series");
    Ok(())
}
