use log::{debug, trace, warn};

use super::error::{CalcError, CalcResult};
use super::format::format_number;
use super::types::{
    DeductionBreakdown, FamilyType, FurusatoInput, FurusatoResult, HousingLoanCombination,
    IncomeType,
};
use super::validation::{ValidationLimits, validate_furusato_input};

/// Statutory constants used by the furusato calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FurusatoConfig {
    pub basic_deduction: f64,
    pub dependent_deduction: f64,
    pub life_insurance_deduction_max: f64,
    pub earthquake_insurance_deduction_max: f64,
    pub resident_tax_rate: f64,
    /// Share of resident tax available to the special furusato credit.
    pub resident_tax_special_share: f64,
    /// Base rate of the special credit before the income tax share is removed.
    pub special_credit_base_rate: f64,
    pub self_burden: u64,
    /// Fraction of the ceiling suggested as a donation.
    pub safety_factor: f64,
    /// Reconstruction special income tax multiplier.
    pub reconstruction_surtax: f64,
    /// Income tax refund is capped at this share of the donation.
    pub income_tax_reduction_cap: f64,
}

impl Default for FurusatoConfig {
    fn default() -> Self {
        Self {
            basic_deduction: 480_000.0,
            dependent_deduction: 380_000.0,
            life_insurance_deduction_max: 120_000.0,
            earthquake_insurance_deduction_max: 50_000.0,
            resident_tax_rate: 0.10,
            resident_tax_special_share: 0.20,
            special_credit_base_rate: 0.90,
            self_burden: 2_000,
            safety_factor: 0.9,
            reconstruction_surtax: 1.021,
            income_tax_reduction_cap: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    pub floor: f64,
    /// `None` for the top bracket.
    pub ceiling: Option<f64>,
    pub rate: f64,
    /// Quick-calculation deduction for this bracket.
    pub deduction: f64,
}

impl TaxBracket {
    fn contains(&self, taxable_income: f64) -> bool {
        taxable_income > self.floor && self.ceiling.is_none_or(|ceiling| taxable_income <= ceiling)
    }
}

pub const INCOME_TAX_BRACKETS: [TaxBracket; 7] = [
    TaxBracket {
        floor: 0.0,
        ceiling: Some(1_950_000.0),
        rate: 0.05,
        deduction: 0.0,
    },
    TaxBracket {
        floor: 1_950_000.0,
        ceiling: Some(3_300_000.0),
        rate: 0.10,
        deduction: 97_500.0,
    },
    TaxBracket {
        floor: 3_300_000.0,
        ceiling: Some(6_950_000.0),
        rate: 0.20,
        deduction: 427_500.0,
    },
    TaxBracket {
        floor: 6_950_000.0,
        ceiling: Some(9_000_000.0),
        rate: 0.23,
        deduction: 636_000.0,
    },
    TaxBracket {
        floor: 9_000_000.0,
        ceiling: Some(18_000_000.0),
        rate: 0.33,
        deduction: 1_536_000.0,
    },
    TaxBracket {
        floor: 18_000_000.0,
        ceiling: Some(40_000_000.0),
        rate: 0.40,
        deduction: 2_796_000.0,
    },
    TaxBracket {
        floor: 40_000_000.0,
        ceiling: None,
        rate: 0.45,
        deduction: 4_796_000.0,
    },
];

/// Marginal bracket for `taxable_income`. Zero (or less) falls in the lowest
/// bracket.
pub fn income_tax_bracket(taxable_income: f64) -> &'static TaxBracket {
    if taxable_income <= 0.0 {
        return &INCOME_TAX_BRACKETS[0];
    }
    INCOME_TAX_BRACKETS
        .iter()
        .find(|bracket| bracket.contains(taxable_income))
        .unwrap_or(&INCOME_TAX_BRACKETS[INCOME_TAX_BRACKETS.len() - 1])
}

pub fn salary_income_deduction(annual_income: f64) -> f64 {
    match annual_income {
        x if x <= 1_625_000.0 => 550_000.0,
        x if x <= 1_800_000.0 => x * 0.4 - 100_000.0,
        x if x <= 3_600_000.0 => x * 0.3 + 80_000.0,
        x if x <= 6_600_000.0 => x * 0.2 + 440_000.0,
        x if x <= 8_500_000.0 => x * 0.1 + 1_100_000.0,
        _ => 1_950_000.0,
    }
}

pub fn life_insurance_deduction(premium: f64, config: &FurusatoConfig) -> f64 {
    match premium {
        p if p <= 0.0 => 0.0,
        p if p <= 20_000.0 => p,
        p if p <= 40_000.0 => p * 0.5 + 10_000.0,
        p if p <= 80_000.0 => p * 0.25 + 20_000.0,
        p => (p * 0.125 + 30_000.0).min(config.life_insurance_deduction_max),
    }
}

pub fn earthquake_insurance_deduction(premium: f64, config: &FurusatoConfig) -> f64 {
    premium.min(config.earthquake_insurance_deduction_max)
}

/// Spousal deduction, phased out by the filer's provisional taxable income.
///
/// A spouse with income gets a flat 360,000 rather than the sliding special
/// spousal deduction table.
pub fn spouse_deduction(family_type: FamilyType, provisional_taxable_income: f64) -> f64 {
    let full_amount = match family_type {
        FamilyType::Single | FamilyType::MarriedHighIncome => return 0.0,
        FamilyType::MarriedNoIncome => 380_000.0,
        FamilyType::MarriedWithIncome => 360_000.0,
    };
    match provisional_taxable_income {
        x if x > 10_000_000.0 => 0.0,
        x if x > 9_500_000.0 => 130_000.0,
        x if x > 9_000_000.0 => 260_000.0,
        _ => full_amount,
    }
}

/// General dependents only; no age tiers.
pub fn dependent_deduction(dependents: u32, config: &FurusatoConfig) -> f64 {
    f64::from(dependents) * config.dependent_deduction
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxableIncome {
    pub taxable_income: f64,
    pub breakdown: DeductionBreakdown,
}

pub fn taxable_income(input: &FurusatoInput, config: &FurusatoConfig) -> TaxableIncome {
    let income = match input.income_type {
        IncomeType::Salary => {
            (input.annual_income - salary_income_deduction(input.annual_income)).max(0.0)
        }
        IncomeType::Business => input.annual_income,
    };

    let mut breakdown = DeductionBreakdown {
        basic_deduction: config.basic_deduction,
        social_insurance_deduction: input.social_insurance_premium,
        life_insurance_deduction: life_insurance_deduction(input.life_insurance_premium, config),
        earthquake_insurance_deduction: earthquake_insurance_deduction(
            input.earthquake_insurance_premium,
            config,
        ),
        medical_expense_deduction: input.medical_expense_deduction,
        small_business_mutual_aid_deduction: input.small_business_mutual_aid_premium,
        ..DeductionBreakdown::default()
    };

    // Spousal phase-out is keyed on income before the spousal and dependent
    // deductions themselves.
    let provisional = (income - breakdown.total_income_deductions()).max(0.0);
    breakdown.spouse_deduction = spouse_deduction(input.family_type, provisional);
    breakdown.dependent_deduction = dependent_deduction(input.dependents, config);

    let taxable_income = (income - breakdown.total_income_deductions()).max(0.0);
    trace!("income={income} provisional={provisional} taxable={taxable_income}");

    TaxableIncome {
        taxable_income,
        breakdown,
    }
}

/// Donation ceiling above which the self-burden exceeds the fixed floor.
///
/// The housing-loan credit is applied to income tax first and whatever is
/// left reduces the resident tax the formula is based on.
pub fn deduction_ceiling(
    taxable_income: f64,
    housing_loan_deduction: f64,
    config: &FurusatoConfig,
) -> CalcResult<u64> {
    if taxable_income <= 0.0 {
        return Ok(config.self_burden);
    }

    let rate = income_tax_bracket(taxable_income).rate;
    let gross_income_tax = taxable_income * rate;
    let remaining_credit = (housing_loan_deduction - gross_income_tax).max(0.0);
    let resident_tax = (taxable_income * config.resident_tax_rate - remaining_credit).max(0.0);

    let effective_rate = rate * config.reconstruction_surtax;
    let numerator = resident_tax * config.resident_tax_special_share + effective_rate;
    let denominator = config.special_credit_base_rate - effective_rate;
    if denominator <= 0.0 {
        return Err(CalcError::calculation(
            "所得税率が高すぎるため、ふるさと納税の控除上限額を計算できません",
        ));
    }

    let limit = (numerator / denominator + config.self_burden as f64).floor();
    if !limit.is_finite() {
        return Err(CalcError::calculation(
            "計算結果が無限大または無効な値になりました",
        ));
    }
    Ok((limit as u64).max(config.self_burden))
}

pub fn housing_loan_combination(
    input: &FurusatoInput,
    config: &FurusatoConfig,
) -> CalcResult<HousingLoanCombination> {
    let taxable = taxable_income(input, config).taxable_income;
    let normal_deduction_limit = deduction_ceiling(taxable, 0.0, config)?;
    if input.housing_loan_deduction <= 0.0 {
        return Ok(HousingLoanCombination {
            normal_deduction_limit,
            adjusted_deduction_limit: normal_deduction_limit,
            reduction_amount: 0,
            conflict_warning: None,
        });
    }

    let adjusted_deduction_limit =
        deduction_ceiling(taxable, input.housing_loan_deduction, config)?;
    let reduction_amount = normal_deduction_limit.saturating_sub(adjusted_deduction_limit);
    let conflict_warning = (reduction_amount > 0).then(|| {
        format!(
            "住宅ローン控除の影響により、ふるさと納税の控除上限額が{}円減額されています。",
            format_number(reduction_amount as f64)
        )
    });

    Ok(HousingLoanCombination {
        normal_deduction_limit,
        adjusted_deduction_limit,
        reduction_amount,
        conflict_warning,
    })
}

pub fn calculate_furusato(input: &FurusatoInput) -> CalcResult<FurusatoResult> {
    calculate_furusato_with(input, &FurusatoConfig::default(), &ValidationLimits::default())
}

pub fn calculate_furusato_with(
    input: &FurusatoInput,
    config: &FurusatoConfig,
    limits: &ValidationLimits,
) -> CalcResult<FurusatoResult> {
    validate_furusato_input(input, limits)?;
    debug!(
        "furusato calculation: income={} type={:?} family={:?} dependents={}",
        input.annual_income, input.income_type, input.family_type, input.dependents
    );

    let TaxableIncome {
        taxable_income,
        mut breakdown,
    } = taxable_income(input, config);
    breakdown.housing_loan_deduction = input.housing_loan_deduction;
    let income_tax_rate = income_tax_bracket(taxable_income).rate;
    trace!("taxable_income={taxable_income} marginal_rate={income_tax_rate}");

    let housing = housing_loan_combination(input, config)?;
    let deduction_limit = housing.adjusted_deduction_limit;
    let recommended_donation = (deduction_limit as f64 * config.safety_factor).floor() as u64;

    let donation = deduction_limit as f64;
    let self_burden = config.self_burden as f64;
    let income_tax_reduction = ((donation - self_burden)
        * income_tax_rate
        * config.reconstruction_surtax)
        .min(donation * config.income_tax_reduction_cap);
    let resident_tax_reduction = donation - self_burden - income_tax_reduction;
    let total_tax_reduction = income_tax_reduction + resident_tax_reduction;
    if ![income_tax_reduction, resident_tax_reduction, total_tax_reduction]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(CalcError::calculation(
            "計算結果が無限大または無効な値になりました",
        ));
    }

    let mut warnings = Vec::new();
    if let Some(message) = housing.conflict_warning {
        warnings.push(message);
    }
    if taxable_income == 0.0 {
        warnings.push("課税所得が0円のため、ふるさと納税の控除効果はありません。".to_string());
    }
    if deduction_limit <= config.self_burden {
        warnings.push("所得が低いため、ふるさと納税の控除効果が限定的です。".to_string());
    }
    for message in &warnings {
        warn!("furusato warning: {message}");
    }

    Ok(FurusatoResult {
        deduction_limit,
        recommended_donation,
        self_burden: config.self_burden,
        income_tax_reduction,
        resident_tax_reduction,
        total_tax_reduction,
        taxable_income,
        income_tax_rate,
        resident_tax_rate: config.resident_tax_rate,
        has_housing_loan_conflict: housing.reduction_amount > 0,
        warnings,
        deduction_breakdown: breakdown,
    })
}
