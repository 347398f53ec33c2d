//! Human-readable and JSON rendering of engine results.

use std::fmt::Write;

use clap::ValueEnum;
use rpa_core::{InversionResult, RateSchedule, TaxSummary};
use serde::Serialize;

use crate::batch::BatchTotals;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

fn line(
    out: &mut String,
    label: &str,
    value: impl std::fmt::Display,
) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{label:<22}{value:>14}");
}

pub fn render_summary(
    summary: &TaxSummary,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        return to_json(summary);
    }

    let mut out = String::new();
    line(&mut out, "Gross amount", summary.gross_amount);
    line(
        &mut out,
        format!("INSS ({}%)", summary.contribution.rate_percent).as_str(),
        summary.contribution.amount,
    );
    line(
        &mut out,
        format!("IRRF ({}%)", summary.income_tax.rate_percent).as_str(),
        summary.income_tax.amount,
    );
    line(
        &mut out,
        format!("ISS ({}%)", summary.service_tax.rate_percent).as_str(),
        summary.service_tax.amount,
    );
    line(&mut out, "Total tax", summary.total_tax);
    line(&mut out, "Net amount", summary.net_amount);
    line(
        &mut out,
        "Total tax %",
        format!("{}%", summary.total_tax_percent),
    );
    Ok(out)
}

pub fn render_inversion(
    result: &InversionResult,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        return to_json(result);
    }

    let mut out = String::new();
    line(&mut out, "Target net amount", result.target_net_amount);
    line(&mut out, "Gross amount found", result.gross_amount_found);
    line(&mut out, "Actual net amount", result.actual_net_amount);
    line(&mut out, "Difference", result.net_difference);
    line(&mut out, "Iterations", result.iterations_used);
    line(
        &mut out,
        "Converged",
        if result.converged { "yes" } else { "no" },
    );
    if let Some(warning) = &result.warning {
        let _ = writeln!(out, "warning: {warning}");
    }
    out.push('\n');
    out.push_str(&render_summary(&result.summary, OutputFormat::Text)?);
    Ok(out)
}

pub fn render_totals(
    totals: &BatchTotals,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        return to_json(totals);
    }

    let mut out = String::new();
    line(&mut out, "Payments", totals.count);
    line(&mut out, "Total gross", totals.total_gross);
    line(&mut out, "Total tax", totals.total_tax);
    line(&mut out, "Total net", totals.total_net);
    Ok(out)
}

pub fn render_schedule(
    schedule: &RateSchedule,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        return to_json(schedule);
    }

    let mut out = String::new();
    line(&mut out, "Minimum wage", schedule.minimum_wage);
    line(&mut out, "Contribution ceiling", schedule.contribution_ceiling);
    line(&mut out, "Contribution rate", schedule.contribution_rate);
    line(&mut out, "Per-dependent", schedule.dependent_deduction);
    let _ = writeln!(out, "\n{:>12}{:>10}{:>12}", "up to", "rate", "subtract");
    for bracket in schedule.brackets.iter() {
        let upper = bracket
            .upper_bound
            .map_or_else(|| "-".to_string(), |upper| upper.to_string());
        let _ = writeln!(
            out,
            "{upper:>12}{:>10}{:>12}",
            bracket.rate.to_string(),
            bracket.subtracted_amount.to_string()
        );
    }
    Ok(out)
}
