//! JSON rendering

use serde::Serialize;

use super::RunRecord;
use crate::stats::StatsSummary;
use crate::Result;

#[derive(Serialize)]
struct SeriesDocument<'a> {
    runs: &'a [RunRecord],
    throughput: &'a StatsSummary,
}

/// Pretty JSON: one object for a single run, an array for several, or a
/// `{runs, throughput}` document for a repeated series
pub fn render(records: &[RunRecord], series: Option<&StatsSummary>) -> Result<String> {
    let json = match (records, series) {
        (runs, Some(throughput)) => {
            serde_json::to_string_pretty(&SeriesDocument { runs, throughput })?
        }
        ([single], None) => serde_json::to_string_pretty(single)?,
        (runs, None) => serde_json::to_string_pretty(runs)?,
    };
    Ok(json)
}
