use std::fmt::Write;

use serde::Serialize;

use crate::core::{
    CalcError, CalcResult, ChartDataPoint, CompoundResult, ErrorKind, FurusatoResult,
    IncomeSimulation, MonthlyBreakdownEntry, SanityIssue, format_percent, format_yen,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompoundResponse<'a> {
    future_value: f64,
    total_investment: f64,
    total_interest: f64,
    yearly: &'a [ChartDataPoint],
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly_breakdown: Option<&'a [MonthlyBreakdownEntry]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FurusatoResponse<'a> {
    #[serde(flatten)]
    result: &'a FurusatoResult,
    #[serde(skip_serializing_if = "no_issues")]
    sanity_issues: &'a [SanityIssue],
}

fn no_issues(issues: &&[SanityIssue]) -> bool {
    issues.is_empty()
}

#[derive(Debug, Serialize)]
struct SweepResponse<'a> {
    rows: &'a [IncomeSimulation],
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&CalcError> for ErrorResponse {
    fn from(err: &CalcError) -> Self {
        Self {
            error: err.user_message(),
            kind: err.kind(),
            field: err.field().map(str::to_string),
        }
    }
}

fn to_json<T: Serialize>(body: &T) -> CalcResult<String> {
    serde_json::to_string_pretty(body)
        .map_err(|e| CalcError::calculation(format!("結果をJSONに変換できませんでした: {e}")))
}

pub(super) fn compound_json(
    result: &CompoundResult,
    yearly: &[ChartDataPoint],
    monthly: Option<&[MonthlyBreakdownEntry]>,
) -> CalcResult<String> {
    to_json(&CompoundResponse {
        future_value: result.future_value,
        total_investment: result.total_investment,
        total_interest: result.total_interest,
        yearly,
        monthly_breakdown: monthly,
    })
}

pub(super) fn compound_text(
    result: &CompoundResult,
    yearly: &[ChartDataPoint],
    monthly: Option<&[MonthlyBreakdownEntry]>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "将来価値: {}", format_yen(result.future_value));
    let _ = writeln!(out, "投資元本: {}", format_yen(result.total_investment));
    let _ = writeln!(out, "運用益:   {}", format_yen(result.total_interest));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:>8} {:>16} {:>16} {:>16}",
        "経過", "投資元本", "運用益", "評価額"
    );
    for point in yearly {
        let _ = writeln!(
            out,
            "{:>6}年目 {:>16} {:>16} {:>16}",
            point.year,
            format_yen(point.investment as f64),
            format_yen(point.interest as f64),
            format_yen(point.total as f64),
        );
    }
    if let Some(entries) = monthly {
        let _ = writeln!(out);
        for entry in entries {
            let _ = writeln!(
                out,
                "{:>5}ヶ月目 {:>16} {:>16} {:>16}",
                entry.month,
                format_yen(entry.investment),
                format_yen(entry.interest),
                format_yen(entry.total),
            );
        }
    }
    out.trim_end().to_string()
}

pub(super) fn furusato_json(result: &FurusatoResult, issues: &[SanityIssue]) -> CalcResult<String> {
    to_json(&FurusatoResponse {
        result,
        sanity_issues: issues,
    })
}

pub(super) fn furusato_text(result: &FurusatoResult, issues: &[SanityIssue]) -> String {
    let mut out = String::new();
    for (label, value) in [
        ("控除上限額", format_yen(result.deduction_limit as f64)),
        ("おすすめ寄附額", format_yen(result.recommended_donation as f64)),
        ("自己負担額", format_yen(result.self_burden as f64)),
        ("所得税還付額", format_yen(result.income_tax_reduction)),
        ("住民税軽減額", format_yen(result.resident_tax_reduction)),
        ("合計節税額", format_yen(result.total_tax_reduction)),
        ("課税所得", format_yen(result.taxable_income)),
        ("所得税率", format_percent(result.income_tax_rate)),
        ("住民税率", format_percent(result.resident_tax_rate)),
    ] {
        let _ = writeln!(out, "{label}: {value}");
    }
    for warning in &result.warnings {
        let _ = writeln!(out, "注意: {warning}");
    }
    for issue in issues {
        let _ = writeln!(out, "入力確認: {}", issue.message);
    }
    out.trim_end().to_string()
}

pub(super) fn sweep_json(rows: &[IncomeSimulation]) -> CalcResult<String> {
    to_json(&SweepResponse { rows })
}

pub(super) fn sweep_text(rows: &[IncomeSimulation]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>14} {:>12} {:>8}", "年収", "控除上限額", "上限/年収");
    for row in rows {
        let _ = writeln!(
            out,
            "{:>14} {:>12} {:>8}",
            format_yen(row.income),
            format_yen(row.deduction_limit as f64),
            format_percent(row.effective_rate),
        );
    }
    out.trim_end().to_string()
}

pub(super) fn error_json(err: &CalcError) -> String {
    let body = ErrorResponse::from(err);
    serde_json::to_string(&body).unwrap_or_else(|_| format!("{{\"error\":{:?}}}", body.error))
}
