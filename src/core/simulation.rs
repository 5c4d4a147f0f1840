use log::debug;

use super::error::{CalcError, CalcResult};
use super::furusato::calculate_furusato;
use super::types::{FurusatoInput, IncomeRange, IncomeSimulation};

const MAX_SWEEP_POINTS: f64 = 10_000.0;

/// Runs the furusato engine across an income range, keeping every other
/// field of `base` fixed. Incomes the engine rejects are skipped.
pub fn simulate_by_income(
    base: &FurusatoInput,
    range: IncomeRange,
) -> CalcResult<Vec<IncomeSimulation>> {
    validate_range(range)?;

    let points = ((range.max - range.min) / range.step).floor() as u64 + 1;
    let mut results = Vec::with_capacity(points as usize);
    for i in 0..points {
        let income = range.min + range.step * i as f64;
        let input = FurusatoInput {
            annual_income: income,
            ..base.clone()
        };
        match calculate_furusato(&input) {
            Ok(result) => results.push(IncomeSimulation {
                income,
                deduction_limit: result.deduction_limit,
                effective_rate: if income > 0.0 {
                    result.deduction_limit as f64 / income
                } else {
                    0.0
                },
            }),
            Err(err) => debug!("income sweep skipped {income}: {err}"),
        }
    }
    Ok(results)
}

fn validate_range(range: IncomeRange) -> CalcResult<()> {
    if !(range.step.is_finite() && range.step > 0.0) {
        return Err(CalcError::validation(
            "step",
            "刻み幅は0より大きい値で入力してください",
        ));
    }
    if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
        return Err(CalcError::validation(
            "min",
            "年収の範囲は下限が上限以下になるように入力してください",
        ));
    }
    if (range.max - range.min) / range.step > MAX_SWEEP_POINTS {
        return Err(CalcError::validation(
            "step",
            "刻み幅が小さすぎます（最大10,000点まで）",
        ));
    }
    Ok(())
}
