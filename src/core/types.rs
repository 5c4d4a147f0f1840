use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    Salary,
    Business,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyType {
    Single,
    /// Spouse qualifies for the full spousal deduction.
    MarriedNoIncome,
    /// Spouse qualifies for the special spousal deduction (flat approximation).
    MarriedWithIncome,
    /// Spouse earns too much for either deduction.
    MarriedHighIncome,
}

fn default_compound_frequency() -> u32 {
    12
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundInput {
    pub principal: f64,
    /// Decimal fraction, 0.05 for 5%.
    pub annual_rate: f64,
    pub years: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    #[serde(default = "default_compound_frequency")]
    pub compound_frequency: u32,
}

impl CompoundInput {
    pub fn new(principal: f64, annual_rate: f64, years: f64) -> Self {
        Self {
            principal,
            annual_rate,
            years,
            monthly_contribution: 0.0,
            compound_frequency: default_compound_frequency(),
        }
    }

    pub fn with_monthly_contribution(mut self, monthly_contribution: f64) -> Self {
        self.monthly_contribution = monthly_contribution;
        self
    }

    pub fn total_months(&self) -> u32 {
        (self.years * 12.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdownEntry {
    pub month: u32,
    pub investment: f64,
    pub interest: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundResult {
    pub future_value: f64,
    pub total_investment: f64,
    pub total_interest: f64,
    pub monthly_breakdown: Vec<MonthlyBreakdownEntry>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataPoint {
    pub year: u32,
    pub investment: i64,
    pub interest: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurusatoInput {
    pub annual_income: f64,
    pub income_type: IncomeType,
    pub family_type: FamilyType,
    pub dependents: u32,
    pub social_insurance_premium: f64,
    #[serde(default)]
    pub life_insurance_premium: f64,
    #[serde(default)]
    pub earthquake_insurance_premium: f64,
    /// Housing-loan tax credit, applied against tax rather than income.
    #[serde(default)]
    pub housing_loan_deduction: f64,
    #[serde(default)]
    pub medical_expense_deduction: f64,
    /// Small-business mutual aid and iDeCo premiums.
    #[serde(default)]
    pub small_business_mutual_aid_premium: f64,
}

impl FurusatoInput {
    pub fn new(
        annual_income: f64,
        income_type: IncomeType,
        family_type: FamilyType,
        dependents: u32,
        social_insurance_premium: f64,
    ) -> Self {
        Self {
            annual_income,
            income_type,
            family_type,
            dependents,
            social_insurance_premium,
            life_insurance_premium: 0.0,
            earthquake_insurance_premium: 0.0,
            housing_loan_deduction: 0.0,
            medical_expense_deduction: 0.0,
            small_business_mutual_aid_premium: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionBreakdown {
    pub basic_deduction: f64,
    pub social_insurance_deduction: f64,
    pub spouse_deduction: f64,
    pub dependent_deduction: f64,
    pub life_insurance_deduction: f64,
    pub earthquake_insurance_deduction: f64,
    pub medical_expense_deduction: f64,
    pub small_business_mutual_aid_deduction: f64,
    // Tax credits, not income deductions.
    pub housing_loan_deduction: f64,
    pub furusato_deduction: f64,
}

impl DeductionBreakdown {
    pub fn total_income_deductions(&self) -> f64 {
        self.basic_deduction
            + self.social_insurance_deduction
            + self.spouse_deduction
            + self.dependent_deduction
            + self.life_insurance_deduction
            + self.earthquake_insurance_deduction
            + self.medical_expense_deduction
            + self.small_business_mutual_aid_deduction
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FurusatoResult {
    pub deduction_limit: u64,
    pub recommended_donation: u64,
    pub self_burden: u64,
    pub income_tax_reduction: f64,
    pub resident_tax_reduction: f64,
    pub total_tax_reduction: f64,
    pub taxable_income: f64,
    pub income_tax_rate: f64,
    pub resident_tax_rate: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub has_housing_loan_conflict: bool,
    pub deduction_breakdown: DeductionBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HousingLoanCombination {
    pub normal_deduction_limit: u64,
    pub adjusted_deduction_limit: u64,
    pub reduction_amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_warning: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSimulation {
    pub income: f64,
    pub deduction_limit: u64,
    pub effective_rate: f64,
}
