mod compound;
mod error;
mod format;
mod furusato;
mod simulation;
mod types;
pub mod validation;

pub use compound::{
    MAX_SAFE_INTEGER, annuity_future_value, calculate_compound, chart_data,
    lump_sum_future_value,
};
pub use error::{CalcError, CalcResult, ErrorKind};
pub use format::{format_number, format_percent, format_yen};
pub use furusato::{
    FurusatoConfig, INCOME_TAX_BRACKETS, TaxBracket, TaxableIncome, calculate_furusato,
    calculate_furusato_with, deduction_ceiling, dependent_deduction,
    earthquake_insurance_deduction, housing_loan_combination, income_tax_bracket,
    life_insurance_deduction, salary_income_deduction, spouse_deduction, taxable_income,
};
pub use simulation::simulate_by_income;
pub use types::{
    ChartDataPoint, CompoundInput, CompoundResult, DeductionBreakdown, FamilyType,
    FurusatoInput, FurusatoResult, HousingLoanCombination, IncomeRange, IncomeSimulation,
    IncomeType, MonthlyBreakdownEntry,
};
pub use validation::{SanityIssue, Severity, ValidationLimits, check_furusato_sanity};
