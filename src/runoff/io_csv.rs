// Primitives for reading CSV files.

use crate::runoff::*;

/// Reads every row of the file, header included, as strings.
///
/// Rows may have different lengths: a short or long ballot is reported by
/// the tabulation as a malformed ballot, with its line number.
pub fn read_csv_table(path: &str) -> RcvResult<Vec<Vec<String>>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let mut res: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, &line);
        res.push(line.iter().map(|s| s.to_string()).collect());
    }
    Ok(res)
}
