use anyhow::Result;
use serde::Serialize;
use std::{collections::BTreeMap, io::Write};
use strum::IntoEnumIterator;

use crate::{
    eval_objects::stat_vector::{Counters, StatCategory, StatVector},
    techniques::aggregator::{Aggregator, FileOutcome, FileReport},
};

pub const FILE_SEPARATOR: &str = "------------------------------------------";
pub const TOTAL_SEPARATOR: &str = "...........................................";
pub const TOTAL_NAME: &str = "TOTAL";

/// Divides, with zero for an empty denominator.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    100.0 * ratio(numerator as f64, denominator as f64)
}

/// Percentage of traces in the fitting bucket, on the gold or the no-gold axis.
pub fn fitting_rate(stats: &StatVector, has_gold: bool) -> f64 {
    percentage(
        stats.get(StatCategory::fitting(has_gold)).traces,
        stats.get(StatCategory::all(has_gold)).traces,
    )
}

/// Ratios derived from the counters of one bucket. Percentages are in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub identical: f64,
    pub same_cost: f64,
    pub average_result_cost: f64,
    pub average_gold_cost: f64,
    pub average_cost_difference: f64,
    pub average_trace_time: f64,
    pub total_time: f64,
}

impl DerivedMetrics {
    pub fn derive(counters: &Counters) -> Self {
        let traces = counters.traces as f64;
        let precision = percentage(counters.correct_synchronous, counters.predicted_synchronous);
        let recall = percentage(counters.correct_synchronous, counters.expected_synchronous);

        Self {
            accuracy: percentage(
                counters.correct_synchronous + counters.correct_log,
                counters.events,
            ),
            precision: precision,
            recall: recall,
            f1: ratio(2.0 * precision * recall, precision + recall),
            identical: percentage(counters.identical_traces, counters.traces),
            same_cost: percentage(counters.identical_cost, counters.traces),
            average_result_cost: ratio(counters.result_cost as f64, traces),
            average_gold_cost: ratio(counters.gold_cost as f64, traces),
            average_cost_difference: ratio(cost_difference(counters) as f64, traces),
            average_trace_time: ratio(counters.elapsed_time, traces),
            total_time: counters.elapsed_time,
        }
    }
}

fn cost_difference(counters: &Counters) -> i128 {
    counters.result_cost as i128 - counters.gold_cost as i128
}

/**
 * Formats a value with the given number of significant digits, dropping trailing zeros.
 * Fixed-point output keeps at least one fractional digit (`0.5`, `1.0`);
 * very small or large values switch to exponent notation (`1.5e-05`, `1.23457e+06`).
 */
pub fn significant_digits(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if !value.is_finite() {
        return value.to_string();
    }

    //the exponent after rounding to the requested precision
    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exponent) => (mantissa, exponent),
            Err(_) => return scientific,
        },
        None => return scientific,
    };

    if exponent < -4 || exponent >= digits as i32 {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, value);
        let trimmed = trim_fraction(&fixed);
        if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            format!("{}.0", trimmed)
        }
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Something that can be written as part of the human-readable report.
pub trait Reportable {
    fn report(&self, f: &mut impl Write) -> Result<()>;
}

/// Writes the statistics block of a file or of the total.
pub fn write_stats(f: &mut impl Write, name: &str, stats: &StatVector) -> Result<()> {
    writeln!(f, "{}", name)?;

    writeln!(f, "With reference solution")?;
    write_fitting(f, stats, true)?;
    for category in [StatCategory::GoldFitting, StatCategory::GoldAll] {
        if stats.is_empty(category) {
            continue;
        }
        write_gold_category(f, category, stats.get(category))?;
    }

    if !stats.is_empty(StatCategory::NoGoldAll) {
        writeln!(f, "With NO reference solution")?;
        write_fitting(f, stats, false)?;
        for category in [StatCategory::NoGoldFitting, StatCategory::NoGoldAll] {
            write_costs_and_times(f, category, stats.get(category))?;
        }
    }

    Ok(())
}

fn write_fitting(f: &mut impl Write, stats: &StatVector, has_gold: bool) -> Result<()> {
    writeln!(
        f,
        "   Fitting: {:.2}% ({}/{})",
        fitting_rate(stats, has_gold),
        stats.get(StatCategory::fitting(has_gold)).traces,
        stats.get(StatCategory::all(has_gold)).traces
    )?;
    Ok(())
}

fn write_gold_category(f: &mut impl Write, category: StatCategory, c: &Counters) -> Result<()> {
    let m = DerivedMetrics::derive(c);
    writeln!(
        f,
        "   {}_Acc: {:.2}% (({}+{})/{})",
        category, m.accuracy, c.correct_synchronous, c.correct_log, c.events
    )?;
    writeln!(
        f,
        "   {}_P: {:.2}% ({}/{})",
        category, m.precision, c.correct_synchronous, c.predicted_synchronous
    )?;
    writeln!(
        f,
        "   {}_R: {:.2}% ({}/{})",
        category, m.recall, c.correct_synchronous, c.expected_synchronous
    )?;
    writeln!(f, "   {}_F1: {:.2}%", category, m.f1)?;
    writeln!(
        f,
        "   {}_Identical: {:.2}% ({}/{})",
        category, m.identical, c.identical_traces, c.traces
    )?;
    writeln!(
        f,
        "   {}_SameCost: {:.2}% ({}/{})",
        category, m.same_cost, c.identical_cost, c.traces
    )?;
    write_costs_and_times(f, category, c)
}

fn write_costs_and_times(f: &mut impl Write, category: StatCategory, c: &Counters) -> Result<()> {
    let m = DerivedMetrics::derive(c);
    writeln!(
        f,
        "   {}_AvgCostSol: {:.2} ({}/{})",
        category, m.average_result_cost, c.result_cost, c.traces
    )?;
    writeln!(
        f,
        "   {}_AvgCostRef: {:.2} ({}/{})",
        category, m.average_gold_cost, c.gold_cost, c.traces
    )?;
    writeln!(
        f,
        "   {}_AvgCostDiff: {:.2} ({}/{})",
        category,
        m.average_cost_difference,
        cost_difference(c),
        c.traces
    )?;
    let average_trace_time = if category.has_gold() {
        significant_digits(m.average_trace_time, 6)
    } else {
        format!("{:.6}", m.average_trace_time)
    };
    writeln!(
        f,
        "   {}_AvgTraceTime: {} ({:.1}/{})",
        category, average_trace_time, c.elapsed_time, c.traces
    )?;
    writeln!(
        f,
        "   {}_TotalTime: {:.1} ({} traces)",
        category, m.total_time, c.traces
    )?;
    Ok(())
}

impl Reportable for FileReport {
    fn report(&self, f: &mut impl Write) -> Result<()> {
        writeln!(f, "{}", FILE_SEPARATOR)?;
        match &self.outcome {
            FileOutcome::Evaluated(evaluation) => {
                for id in &evaluation.unsolved {
                    writeln!(f, "{} - UNSOLVED instance {}", self.name, id)?;
                }
                write_stats(f, &self.name, &evaluation.stats)
            }
            FileOutcome::Failed { error, unsolved } => {
                for id in unsolved {
                    writeln!(f, "{} - UNSOLVED instance {}", self.name, id)?;
                }
                writeln!(f, "{} - FAILED: {:#}", self.name, error)?;
                Ok(())
            }
            FileOutcome::Skipped(e) => {
                writeln!(f, "{} - skipped: {}", self.name, e)?;
                Ok(())
            }
        }
    }
}

impl Reportable for Aggregator {
    fn report(&self, f: &mut impl Write) -> Result<()> {
        for file in self.get_files() {
            file.report(f)?;
        }

        writeln!(f, "{}", TOTAL_SEPARATOR)?;
        write_stats(f, TOTAL_NAME, self.get_total())?;
        writeln!(
            f,
            "Files: {} evaluated, {} failed, {} skipped",
            self.number_of_evaluated_files(),
            self.number_of_failed_files(),
            self.number_of_skipped_files()
        )?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonStats<'a> {
    counters: &'a StatVector,
    gold_fitting_rate: f64,
    no_gold_fitting_rate: f64,
    metrics: BTreeMap<String, DerivedMetrics>,
}

impl<'a> JsonStats<'a> {
    fn new(stats: &'a StatVector) -> Self {
        Self {
            counters: stats,
            gold_fitting_rate: fitting_rate(stats, true),
            no_gold_fitting_rate: fitting_rate(stats, false),
            metrics: StatCategory::iter()
                .filter(|category| !stats.is_empty(*category))
                .map(|category| {
                    (
                        category.to_string(),
                        DerivedMetrics::derive(stats.get(category)),
                    )
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum JsonOutcome<'a> {
    Evaluated {
        unsolved: &'a [String],
        stats: JsonStats<'a>,
    },
    Failed {
        unsolved: &'a [String],
        error: String,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Serialize)]
struct JsonFile<'a> {
    name: &'a str,
    #[serde(flatten)]
    outcome: JsonOutcome<'a>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: Vec<JsonFile<'a>>,
    total: JsonStats<'a>,
}

/// Writes the report as a JSON document.
pub fn write_json_report(f: &mut impl Write, aggregator: &Aggregator) -> Result<()> {
    let files = aggregator
        .get_files()
        .iter()
        .map(|file| JsonFile {
            name: &file.name,
            outcome: match &file.outcome {
                FileOutcome::Evaluated(evaluation) => JsonOutcome::Evaluated {
                    unsolved: &evaluation.unsolved,
                    stats: JsonStats::new(&evaluation.stats),
                },
                FileOutcome::Failed { error, unsolved } => JsonOutcome::Failed {
                    unsolved: unsolved,
                    error: format!("{:#}", error),
                },
                FileOutcome::Skipped(e) => JsonOutcome::Skipped {
                    reason: e.to_string(),
                },
            },
        })
        .collect();

    let report = JsonReport {
        files: files,
        total: JsonStats::new(aggregator.get_total()),
    };
    serde_json::to_writer_pretty(&mut *f, &report)?;
    writeln!(f)?;
    Ok(())
}
