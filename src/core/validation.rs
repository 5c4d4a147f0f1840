use log::warn;
use serde::Serialize;

use super::error::{CalcError, CalcResult};
use super::format::format_number;
use super::types::{CompoundInput, FurusatoInput, IncomeType};

pub const MAX_PRINCIPAL: f64 = 1_000_000_000.0;
pub const MIN_ANNUAL_RATE: f64 = -0.1;
pub const MAX_ANNUAL_RATE: f64 = 1.0;
pub const MAX_YEARS: f64 = 100.0;
pub const MAX_MONTHLY_CONTRIBUTION: f64 = 10_000_000.0;
pub const MAX_COMPOUND_FREQUENCY: u32 = 365;

/// Upper bounds applied to furusato inputs before calculation.
///
/// The small-business mutual aid (iDeCo) cap depends on employment type, so
/// both the absolute field bound and the per-income-type contribution caps
/// are configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationLimits {
    pub max_annual_income: f64,
    pub max_social_insurance_premium: f64,
    pub max_dependents: u32,
    pub max_life_insurance_premium: f64,
    pub max_earthquake_insurance_premium: f64,
    pub max_housing_loan_deduction: f64,
    pub max_medical_expense_deduction: f64,
    pub max_small_business_mutual_aid_premium: f64,
    pub ideco_cap_salary: f64,
    pub ideco_cap_business: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_annual_income: 100_000_000.0,
            max_social_insurance_premium: 10_000_000.0,
            max_dependents: 20,
            max_life_insurance_premium: 1_000_000.0,
            max_earthquake_insurance_premium: 1_000_000.0,
            max_housing_loan_deduction: 5_000_000.0,
            max_medical_expense_deduction: 10_000_000.0,
            max_small_business_mutual_aid_premium: 1_000_000.0,
            ideco_cap_salary: 276_000.0,
            ideco_cap_business: 816_000.0,
        }
    }
}

impl ValidationLimits {
    pub fn ideco_cap(&self, income_type: IncomeType) -> f64 {
        match income_type {
            IncomeType::Salary => self.ideco_cap_salary,
            IncomeType::Business => self.ideco_cap_business,
        }
    }
}

pub fn validate_numeric(
    value: f64,
    field: &str,
    label: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::validation(
            field,
            format!("{label}は有効な数値を入力してください"),
        ));
    }
    if let Some(min) = min {
        if value < min {
            return Err(CalcError::validation(
                field,
                format!("{label}は{}以上で入力してください", format_number(min)),
            ));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(CalcError::validation(
                field,
                format!("{label}は{}以下で入力してください", format_number(max)),
            ));
        }
    }
    Ok(())
}

pub fn validate_compound_input(input: &CompoundInput) -> CalcResult<()> {
    for (field, label, value, min, max) in [
        ("principal", "元本", input.principal, 0.0, MAX_PRINCIPAL),
        (
            "annualRate",
            "年利率",
            input.annual_rate,
            MIN_ANNUAL_RATE,
            MAX_ANNUAL_RATE,
        ),
        (
            "monthlyContribution",
            "月額積立額",
            input.monthly_contribution,
            0.0,
            MAX_MONTHLY_CONTRIBUTION,
        ),
    ] {
        validate_numeric(value, field, label, Some(min), Some(max))?;
    }

    validate_numeric(input.years, "years", "期間", None, Some(MAX_YEARS))?;
    if input.years <= 0.0 {
        return Err(CalcError::validation(
            "years",
            "期間は0より大きい値で入力してください",
        ));
    }
    let months = input.years * 12.0;
    if (months - months.round()).abs() > 1e-9 {
        return Err(CalcError::validation(
            "years",
            "期間は月単位（1/12年刻み）で入力してください",
        ));
    }
    if months.round() < 1.0 {
        return Err(CalcError::validation(
            "years",
            "期間は1ヶ月以上で入力してください",
        ));
    }

    if input.compound_frequency == 0 || input.compound_frequency > MAX_COMPOUND_FREQUENCY {
        return Err(CalcError::validation(
            "compoundFrequency",
            format!("複利回数は1以上{MAX_COMPOUND_FREQUENCY}以下で入力してください"),
        ));
    }
    Ok(())
}

pub fn validate_furusato_input(input: &FurusatoInput, limits: &ValidationLimits) -> CalcResult<()> {
    for (field, label, value, max) in [
        (
            "annualIncome",
            "年収",
            input.annual_income,
            limits.max_annual_income,
        ),
        (
            "socialInsurancePremium",
            "社会保険料控除額",
            input.social_insurance_premium,
            limits.max_social_insurance_premium,
        ),
        (
            "lifeInsurancePremium",
            "生命保険料控除",
            input.life_insurance_premium,
            limits.max_life_insurance_premium,
        ),
        (
            "earthquakeInsurancePremium",
            "地震保険料控除",
            input.earthquake_insurance_premium,
            limits.max_earthquake_insurance_premium,
        ),
        (
            "housingLoanDeduction",
            "住宅ローン控除",
            input.housing_loan_deduction,
            limits.max_housing_loan_deduction,
        ),
        (
            "medicalExpenseDeduction",
            "医療費控除",
            input.medical_expense_deduction,
            limits.max_medical_expense_deduction,
        ),
        (
            "smallBusinessMutualAidPremium",
            "小規模企業共済等掛金控除",
            input.small_business_mutual_aid_premium,
            limits.max_small_business_mutual_aid_premium,
        ),
    ] {
        validate_numeric(value, field, label, Some(0.0), Some(max))?;
    }

    if input.dependents > limits.max_dependents {
        return Err(CalcError::validation(
            "dependents",
            format!("扶養親族数は{}以下で入力してください", limits.max_dependents),
        ));
    }
    Ok(())
}

/// Converts a raw, possibly negative dependents count from an outer surface.
pub fn validate_dependents(raw: i64, limits: &ValidationLimits) -> CalcResult<u32> {
    if raw < 0 {
        return Err(CalcError::validation(
            "dependents",
            "扶養親族数は0以上で入力してください",
        ));
    }
    match u32::try_from(raw) {
        Ok(count) if count <= limits.max_dependents => Ok(count),
        _ => Err(CalcError::validation(
            "dependents",
            format!("扶養親族数は{}以下で入力してください", limits.max_dependents),
        )),
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The form should refuse to submit.
    Blocking,
    Advisory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanityIssue {
    pub field: &'static str,
    pub message: String,
    pub severity: Severity,
}

impl SanityIssue {
    fn blocking(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            severity: Severity::Blocking,
        }
    }

    fn advisory(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            severity: Severity::Advisory,
        }
    }
}

const SOCIAL_INSURANCE_MAX_SHARE: f64 = 0.30;
const SOCIAL_INSURANCE_MIN_SHARE: f64 = 0.05;
const LIFE_INSURANCE_PREMIUM_SOFT_CAP: f64 = 80_000.0;
const EARTHQUAKE_INSURANCE_PREMIUM_CAP: f64 = 50_000.0;
const HOUSING_LOAN_MAX_SHARE: f64 = 0.10;
const MEDICAL_EXPENSE_MAX_SHARE: f64 = 0.20;
const LOW_INCOME_THRESHOLD: f64 = 2_000_000.0;
const INCOME_PER_DEPENDENT: f64 = 1_500_000.0;

/// Cross-field plausibility rules for furusato form input.
///
/// The engine never consults these; whether a blocking issue actually stops
/// submission is up to the caller.
pub fn check_furusato_sanity(input: &FurusatoInput, limits: &ValidationLimits) -> Vec<SanityIssue> {
    let income = input.annual_income;
    let mut issues = Vec::new();

    if input.social_insurance_premium > income * SOCIAL_INSURANCE_MAX_SHARE {
        issues.push(SanityIssue::blocking(
            "socialInsurancePremium",
            "社会保険料控除額が年収に対して高すぎます（年収の30%以下を目安に入力してください）",
        ));
    } else if income > 0.0 && input.social_insurance_premium < income * SOCIAL_INSURANCE_MIN_SHARE
    {
        issues.push(SanityIssue::advisory(
            "socialInsurancePremium",
            "社会保険料控除額が年収に対して低すぎる可能性があります（通常は年収の約15%です）",
        ));
    }

    if input.life_insurance_premium > LIFE_INSURANCE_PREMIUM_SOFT_CAP {
        issues.push(SanityIssue::advisory(
            "lifeInsurancePremium",
            "生命保険料が年間8万円を超えています（控除額の上限は12万円です）",
        ));
    }

    if input.earthquake_insurance_premium > EARTHQUAKE_INSURANCE_PREMIUM_CAP {
        issues.push(SanityIssue::blocking(
            "earthquakeInsurancePremium",
            "地震保険料控除は年間5万円が上限です",
        ));
    }

    let ideco_cap = limits.ideco_cap(input.income_type);
    if input.small_business_mutual_aid_premium > ideco_cap {
        issues.push(SanityIssue::blocking(
            "smallBusinessMutualAidPremium",
            format!(
                "iDeCoの年間拠出限度額（{}円）を超えています",
                format_number(ideco_cap)
            ),
        ));
    }

    if input.housing_loan_deduction > income * HOUSING_LOAN_MAX_SHARE {
        issues.push(SanityIssue::advisory(
            "housingLoanDeduction",
            "住宅ローン控除額が年収に対して高すぎる可能性があります",
        ));
    }

    if input.medical_expense_deduction > income * MEDICAL_EXPENSE_MAX_SHARE {
        issues.push(SanityIssue::advisory(
            "medicalExpenseDeduction",
            "医療費控除額が年収に対して高すぎる可能性があります",
        ));
    }

    if income < LOW_INCOME_THRESHOLD {
        issues.push(SanityIssue::advisory(
            "annualIncome",
            "年収が200万円未満のため、ふるさと納税の控除効果が限定的です",
        ));
    }

    if input.dependents > 0 && income < f64::from(input.dependents) * INCOME_PER_DEPENDENT {
        issues.push(SanityIssue::advisory(
            "dependents",
            format!(
                "扶養親族{}人に対して年収が低い可能性があります",
                input.dependents
            ),
        ));
    }

    for issue in &issues {
        warn!("sanity check on {}: {}", issue.field, issue.message);
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FamilyType;

    fn base_furusato() -> FurusatoInput {
        FurusatoInput::new(
            5_000_000.0,
            IncomeType::Salary,
            FamilyType::Single,
            0,
            750_000.0,
        )
    }

    fn field_of(err: CalcError) -> String {
        err.field().unwrap_or_default().to_string()
    }

    #[test]
    fn validate_numeric_rejects_nan_and_infinity() {
        let err = validate_numeric(f64::NAN, "principal", "元本", Some(0.0), None)
            .expect_err("NaN must fail");
        assert_eq!(err.to_string(), "元本は有効な数値を入力してください");

        let err = validate_numeric(f64::INFINITY, "principal", "元本", None, None)
            .expect_err("infinity must fail");
        assert_eq!(field_of(err), "principal");
    }

    #[test]
    fn validate_numeric_formats_bounds_with_separators() {
        let err = validate_numeric(-1.0, "annualIncome", "年収", Some(0.0), Some(1e8))
            .expect_err("below min");
        assert_eq!(err.to_string(), "年収は0以上で入力してください");

        let err = validate_numeric(2e8, "annualIncome", "年収", Some(0.0), Some(1e8))
            .expect_err("above max");
        assert_eq!(err.to_string(), "年収は100,000,000以下で入力してください");
    }

    #[test]
    fn compound_validation_accepts_boundaries() {
        let input = CompoundInput::new(MAX_PRINCIPAL, MIN_ANNUAL_RATE, MAX_YEARS)
            .with_monthly_contribution(MAX_MONTHLY_CONTRIBUTION);
        validate_compound_input(&input).expect("boundaries are inclusive");
    }

    #[test]
    fn compound_validation_rejects_each_bad_field() {
        let base = CompoundInput::new(1_000_000.0, 0.05, 10.0);

        let mut input = base.clone();
        input.principal = -1.0;
        assert_eq!(field_of(validate_compound_input(&input).unwrap_err()), "principal");

        let mut input = base.clone();
        input.annual_rate = 1.5;
        assert_eq!(field_of(validate_compound_input(&input).unwrap_err()), "annualRate");

        let mut input = base.clone();
        input.monthly_contribution = -10.0;
        assert_eq!(
            field_of(validate_compound_input(&input).unwrap_err()),
            "monthlyContribution"
        );

        let mut input = base.clone();
        input.years = 0.0;
        assert_eq!(field_of(validate_compound_input(&input).unwrap_err()), "years");

        let mut input = base.clone();
        input.years = 1.01;
        assert_eq!(field_of(validate_compound_input(&input).unwrap_err()), "years");

        let mut input = base.clone();
        input.years = 1e-11;
        let err = validate_compound_input(&input).unwrap_err();
        assert_eq!(err.to_string(), "期間は1ヶ月以上で入力してください");

        let mut input = base;
        input.compound_frequency = 0;
        assert_eq!(
            field_of(validate_compound_input(&input).unwrap_err()),
            "compoundFrequency"
        );
    }

    #[test]
    fn compound_validation_accepts_partial_years_in_whole_months() {
        let input = CompoundInput::new(100_000.0, 0.03, 2.5);
        validate_compound_input(&input).expect("30 months is fine");
    }

    #[test]
    fn furusato_validation_rejects_negative_income() {
        let mut input = base_furusato();
        input.annual_income = -1_000_000.0;
        let err = validate_furusato_input(&input, &ValidationLimits::default())
            .expect_err("negative income");
        assert_eq!(field_of(err.clone()), "annualIncome");
        assert!(err.is_validation());
    }

    #[test]
    fn furusato_validation_respects_configured_mutual_aid_bound() {
        let mut input = base_furusato();
        input.small_business_mutual_aid_premium = 900_000.0;
        validate_furusato_input(&input, &ValidationLimits::default()).expect("under 1M bound");

        let limits = ValidationLimits {
            max_small_business_mutual_aid_premium: 816_000.0,
            ..ValidationLimits::default()
        };
        let err = validate_furusato_input(&input, &limits).expect_err("over configured bound");
        assert_eq!(field_of(err), "smallBusinessMutualAidPremium");
    }

    #[test]
    fn validate_dependents_rejects_negative_and_excessive_counts() {
        let limits = ValidationLimits::default();
        assert_eq!(validate_dependents(2, &limits), Ok(2));
        let err = validate_dependents(-1, &limits).expect_err("negative dependents");
        assert_eq!(field_of(err), "dependents");
        assert!(validate_dependents(21, &limits).is_err());
    }

    #[test]
    fn sanity_passes_typical_salary_earner() {
        let issues = check_furusato_sanity(&base_furusato(), &ValidationLimits::default());
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn sanity_flags_social_insurance_share() {
        let mut input = base_furusato();
        input.annual_income = 3_000_000.0;
        input.social_insurance_premium = 1_000_000.0;
        let issues = check_furusato_sanity(&input, &ValidationLimits::default());
        assert!(issues.iter().any(|i| i.severity == Severity::Blocking
            && i.message.contains("社会保険料控除額が年収に対して高すぎます")));

        let mut input = base_furusato();
        input.social_insurance_premium = 1_500_000.0;
        let issues = check_furusato_sanity(&input, &ValidationLimits::default());
        assert!(issues.is_empty(), "exactly 30% is allowed");

        let mut input = base_furusato();
        input.social_insurance_premium = 200_000.0;
        let issues = check_furusato_sanity(&input, &ValidationLimits::default());
        assert!(issues.iter().any(|i| i.message.contains("低すぎる")));
    }

    #[test]
    fn sanity_ideco_cap_depends_on_income_type() {
        let mut input = base_furusato();
        input.small_business_mutual_aid_premium = 816_000.0;
        let issues = check_furusato_sanity(&input, &ValidationLimits::default());
        assert!(issues.iter().any(|i| i.message.contains("iDeCoの年間拠出限度額")));

        input.income_type = IncomeType::Business;
        let issues = check_furusato_sanity(&input, &ValidationLimits::default());
        assert!(issues.is_empty(), "business cap is 816,000: {issues:?}");
    }

    #[test]
    fn sanity_reports_multiple_issues_in_field_order() {
        let mut input = base_furusato();
        input.annual_income = 3_000_000.0;
        input.social_insurance_premium = 1_100_000.0;
        input.life_insurance_premium = 900_000.0;
        input.earthquake_insurance_premium = 60_000.0;
        let issues = check_furusato_sanity(&input, &ValidationLimits::default());
        let fields: Vec<_> = issues.iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                "socialInsurancePremium",
                "lifeInsurancePremium",
                "earthquakeInsurancePremium"
            ]
        );
    }

    #[test]
    fn sanity_flags_low_income_and_dependents() {
        let mut input = base_furusato();
        input.annual_income = 2_500_000.0;
        input.dependents = 2;
        input.social_insurance_premium = 300_000.0;
        let issues = check_furusato_sanity(&input, &ValidationLimits::default());
        assert!(issues.iter().any(|i| i.message.contains("扶養親族2人に対して年収が低い")));

        let mut input = base_furusato();
        input.annual_income = 1_800_000.0;
        input.social_insurance_premium = 200_000.0;
        let issues = check_furusato_sanity(&input, &ValidationLimits::default());
        assert!(issues.iter().any(|i| i.message.contains("ふるさと納税の控除効果が限定的")));
    }

    #[test]
    fn sanity_flags_housing_and_medical_shares() {
        let mut input = base_furusato();
        input.annual_income = 4_000_000.0;
        input.social_insurance_premium = 600_000.0;
        input.housing_loan_deduction = 500_000.0;
        input.medical_expense_deduction = 900_000.0;
        let issues = check_furusato_sanity(&input, &ValidationLimits::default());
        assert!(issues.iter().all(|i| i.severity == Severity::Advisory));
        assert!(issues.iter().any(|i| i.field == "housingLoanDeduction"));
        assert!(issues.iter().any(|i| i.field == "medicalExpenseDeduction"));
    }
}
