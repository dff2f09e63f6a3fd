use log::{debug, info, warn};

use instant_runoff::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde::Serialize;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Cell at row {row}, column {col} cannot be read: {content}"))]
    ExcelWrongCellType {
        row: usize,
        col: usize,
        content: String,
    },
    #[snafu(display("Unknown input type {input_type:?} (expected csv or xlsx)"))]
    UnknownInputType { input_type: String },
    #[snafu(display(
        "Unknown elimination policy {policy:?} (expected strongest-loser or weakest-winner)"
    ))]
    UnknownPolicy { policy: String },
    #[snafu(display("{source}"))]
    Tally { source: TallyError },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error handling JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type RcvResult<T> = Result<T, RcvError>;

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct OutputConfig {
    pub input: String,
    pub policy: String,
    pub threshold: String,
}

fn result_stats_to_json(rs: &ElectionResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        if let Some(elim_stats) = &round_stat.eliminated {
            let examined: Vec<JSValue> = elim_stats
                .examined
                .iter()
                .map(|rank_stats| {
                    let mut counts: JSMap<String, JSValue> = JSMap::new();
                    for (name, count) in rank_stats.counts.iter() {
                        counts.insert(name.clone(), json!(count.to_string()));
                    }
                    json!({"rank": rank_stats.rank + 1, "counts": counts})
                })
                .collect();
            tally_results.push(json!({
                "eliminated": elim_stats.name,
                "examinedRanks": examined
            }));
        }
        if let Some(winner_name) = &round_stat.elected {
            tally_results.push(json!({ "elected": winner_name }));
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

fn build_summary_js(input: &str, rules: &TallyRules, rv: &ElectionResult) -> JSValue {
    let c = OutputConfig {
        input: io_common::simplify_file_name(input),
        policy: rules.elimination_policy.to_string(),
        threshold: rv.threshold.to_string(),
    };
    json!({
        "config": c,
        "results": result_stats_to_json(rv) })
}

fn validate_rules(args: &Args) -> RcvResult<TallyRules> {
    let elimination_policy = match args.policy.as_deref() {
        None | Some("strongest-loser") => EliminationPolicy::StrongestLoser,
        Some("weakest-winner") => EliminationPolicy::WeakestWinner,
        Some(x) => return UnknownPolicySnafu { policy: x }.fail(),
    };
    Ok(TallyRules {
        elimination_policy,
        strip_label_prefix: !args.raw_labels,
    })
}

fn read_table(path: &str, input_type: Option<&str>) -> RcvResult<Vec<Vec<String>>> {
    let input_type = input_type
        .map(|s| s.to_string())
        .unwrap_or_else(|| io_common::input_type_from_path(path));
    info!("Attempting to read {} file {:?}", input_type, path);
    match input_type.as_str() {
        "csv" => io_csv::read_csv_table(path),
        "xlsx" => io_xlsx::read_excel_table(path),
        x => UnknownInputTypeSnafu { input_type: x }.fail(),
    }
}

fn write_summary(out: &str, pretty_js: &str) -> RcvResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty_js).context(WritingJsonSnafu { path: out })?;
    }
    Ok(())
}

fn read_summary(path: &str) -> RcvResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> RcvResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("Summary matches the reference {:?}", reference_path);
    Ok(())
}

pub fn run_election(args: &Args) -> RcvResult<()> {
    println!("Starting the ranked choice vote count.");
    let rules = validate_rules(args)?;
    info!("rules: {:?}", rules);

    let table = read_table(&args.input, args.input_type.as_deref())?;
    debug!("read {} rows", table.len());

    let mut election = Election::from_table_with_rules(&table, &rules).context(TallySnafu {})?;
    let result = tabulate(&mut election, &rules).context(TallySnafu {})?;
    println!("Winner found!\nThe winner is {}", result.winner);

    let result_js = build_summary_js(&args.input, &rules, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out) = &args.out {
        write_summary(out, &pretty_js_stats)?;
    }

    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &pretty_js_stats)?;
    }

    Ok(())
}
