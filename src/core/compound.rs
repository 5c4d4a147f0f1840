use log::{debug, trace};

use super::error::{CalcError, CalcResult};
use super::types::{ChartDataPoint, CompoundInput, CompoundResult, MonthlyBreakdownEntry};
use super::validation::validate_compound_input;

/// Largest integer an IEEE double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

const MONTHS_PER_YEAR: u32 = 12;

/// Projects the account month by month.
///
/// Each month the running total grows by `annual_rate / 12` and then receives
/// the monthly contribution, so returns compound on principal and on every
/// earlier contribution. The recurrence is authoritative; the closed-form
/// helpers below only agree with it when there are no contributions.
pub fn calculate_compound(input: &CompoundInput) -> CalcResult<CompoundResult> {
    validate_compound_input(input)?;

    let months = input.total_months();
    let monthly_rate = input.annual_rate / f64::from(MONTHS_PER_YEAR);
    debug!(
        "compound projection: principal={} annual_rate={} months={} contribution={}",
        input.principal, input.annual_rate, months, input.monthly_contribution
    );

    let (monthly_breakdown, _, _) = (1..=months).try_fold(
        (
            Vec::with_capacity(months as usize),
            input.principal,
            input.principal,
        ),
        |(mut entries, value, investment), month| {
            let total = value * (1.0 + monthly_rate) + input.monthly_contribution;
            let investment = investment + input.monthly_contribution;
            guard_total(total, month)?;
            entries.push(MonthlyBreakdownEntry {
                month,
                investment,
                interest: total - investment,
                total,
            });
            Ok::<_, CalcError>((entries, total, investment))
        },
    )?;

    let (future_value, total_investment, total_interest) = match monthly_breakdown.last() {
        Some(last) => (last.total, last.investment, last.interest),
        None => (input.principal, input.principal, 0.0),
    };
    trace!(
        "compound projection done: future_value={future_value} investment={total_investment}"
    );

    Ok(CompoundResult {
        future_value,
        total_investment,
        total_interest,
        monthly_breakdown,
    })
}

fn guard_total(total: f64, month: u32) -> CalcResult<()> {
    if !total.is_finite() {
        return Err(CalcError::calculation(format!(
            "{month}ヶ月目の計算結果が無限大または無効な値になりました"
        )));
    }
    if total < 0.0 {
        return Err(CalcError::calculation(format!(
            "{month}ヶ月目の評価額が負の値になりました"
        )));
    }
    if total > MAX_SAFE_INTEGER {
        return Err(CalcError::calculation(format!(
            "{month}ヶ月目の評価額が計算可能な範囲を超えました"
        )));
    }
    Ok(())
}

/// One rounded point per completed year, for charts and tables.
///
/// Lossy: never derive totals from this view.
pub fn chart_data(result: &CompoundResult) -> Vec<ChartDataPoint> {
    let whole_years = result.monthly_breakdown.len() / MONTHS_PER_YEAR as usize;
    (1..=whole_years)
        .filter_map(|year| {
            let entry = result
                .monthly_breakdown
                .get(year * MONTHS_PER_YEAR as usize - 1)?;
            Some(ChartDataPoint {
                year: year as u32,
                investment: entry.investment.round() as i64,
                interest: entry.interest.round() as i64,
                total: entry.total.round() as i64,
            })
        })
        .collect()
}

/// Closed-form lump sum growth, `P * (1 + r/n)^(n*t)`.
pub fn lump_sum_future_value(principal: f64, annual_rate: f64, years: f64, frequency: u32) -> f64 {
    let n = f64::from(frequency.max(1));
    principal * (1.0 + annual_rate / n).powf(n * years)
}

/// Closed-form future value of a level monthly payment stream.
pub fn annuity_future_value(monthly_payment: f64, annual_rate: f64, years: f64) -> f64 {
    if annual_rate == 0.0 {
        return monthly_payment * 12.0 * years;
    }
    let monthly_rate = annual_rate / 12.0;
    let total_months = years * 12.0;
    monthly_payment * (((1.0 + monthly_rate).powf(total_months) - 1.0) / monthly_rate)
}
