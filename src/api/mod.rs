//! Command-line surface over the calculation engines.

mod payload;
mod render;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use crate::core::{
    CalcError, CalcResult, CompoundInput, FamilyType, FurusatoConfig, FurusatoInput,
    IncomeRange, IncomeType, Severity, ValidationLimits, calculate_compound,
    calculate_furusato_with, chart_data, check_furusato_sanity, simulate_by_income,
    validation::validate_dependents,
};

pub use payload::{CompoundPayload, FurusatoPayload};
pub use render::ErrorResponse;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliIncomeType {
    Salary,
    Business,
}

impl From<CliIncomeType> for IncomeType {
    fn from(value: CliIncomeType) -> Self {
        match value {
            CliIncomeType::Salary => IncomeType::Salary,
            CliIncomeType::Business => IncomeType::Business,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliFamilyType {
    Single,
    MarriedNoIncome,
    MarriedWithIncome,
    MarriedHighIncome,
}

impl From<CliFamilyType> for FamilyType {
    fn from(value: CliFamilyType) -> Self {
        match value {
            CliFamilyType::Single => FamilyType::Single,
            CliFamilyType::MarriedNoIncome => FamilyType::MarriedNoIncome,
            CliFamilyType::MarriedWithIncome => FamilyType::MarriedWithIncome,
            CliFamilyType::MarriedHighIncome => FamilyType::MarriedHighIncome,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "kakeibo-calc",
    about = "Compound interest projections and furusato-nozei deduction limits"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    #[arg(long, global = true, help = "Print results as JSON")]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Month-by-month compound growth with optional monthly contributions
    Compound(CompoundArgs),
    /// Furusato-nozei donation ceiling and tax savings
    Furusato(FurusatoArgs),
    /// Furusato ceiling across a range of annual incomes
    Sweep(SweepArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CompoundArgs {
    #[arg(long, default_value_t = 1_000_000.0)]
    pub principal: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        allow_negative_numbers = true,
        help = "Expected annual return in percent, e.g. 5"
    )]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 10.0)]
    pub years: f64,
    #[arg(long, default_value_t = 0.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 12)]
    pub compound_frequency: u32,
    #[arg(long, help = "Include the full monthly breakdown, not just year ends")]
    pub monthly: bool,
    #[arg(long, help = "camelCase JSON object overriding the flags above")]
    pub payload: Option<String>,
}

/// Everything the furusato engine needs except the annual income.
#[derive(Args, Debug, Clone)]
pub struct HouseholdArgs {
    #[arg(long, value_enum, default_value_t = CliIncomeType::Salary)]
    pub income_type: CliIncomeType,
    #[arg(long, value_enum, default_value_t = CliFamilyType::Single)]
    pub family_type: CliFamilyType,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub dependents: i64,
    #[arg(long, default_value_t = 0.0, help = "Social insurance premiums paid (yen)")]
    pub social_insurance: f64,
    #[arg(long, default_value_t = 0.0, help = "Life insurance premiums paid (yen)")]
    pub life_insurance: f64,
    #[arg(long, default_value_t = 0.0, help = "Earthquake insurance premiums paid (yen)")]
    pub earthquake_insurance: f64,
    #[arg(long, default_value_t = 0.0, help = "Housing-loan tax credit (yen)")]
    pub housing_loan: f64,
    #[arg(long, default_value_t = 0.0, help = "Medical expense deduction (yen)")]
    pub medical_expense: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Small-business mutual aid / iDeCo premiums (yen)"
    )]
    pub small_business_mutual_aid: f64,
    #[arg(
        long,
        default_value_t = 1_000_000.0,
        help = "Upper bound accepted for small-business mutual aid premiums"
    )]
    pub max_mutual_aid: f64,
    #[arg(long, default_value_t = 276_000.0, help = "iDeCo annual cap for employees")]
    pub ideco_cap_salary: f64,
    #[arg(
        long,
        default_value_t = 816_000.0,
        help = "iDeCo annual cap for the self-employed"
    )]
    pub ideco_cap_business: f64,
    #[arg(long, help = "Calculate even when a sanity rule would block the form")]
    pub allow_sanity_errors: bool,
    #[arg(long, help = "camelCase JSON object overriding the flags")]
    pub payload: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct FurusatoArgs {
    #[arg(long, help = "Annual gross income (yen)")]
    pub annual_income: f64,
    #[command(flatten)]
    pub household: HouseholdArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    #[arg(long, default_value_t = 3_000_000.0)]
    pub min: f64,
    #[arg(long, default_value_t = 10_000_000.0)]
    pub max: f64,
    #[arg(long, default_value_t = 500_000.0)]
    pub step: f64,
    #[command(flatten)]
    pub household: HouseholdArgs,
}

pub fn run(cli: Cli) -> CalcResult<String> {
    match cli.command {
        Command::Compound(args) => run_compound(args, cli.json),
        Command::Furusato(args) => run_furusato(args, cli.json),
        Command::Sweep(args) => run_sweep(args, cli.json),
    }
}

fn run_compound(mut args: CompoundArgs, json: bool) -> CalcResult<String> {
    if let Some(raw) = args.payload.take() {
        payload::parse_compound(&raw)?.apply(&mut args);
    }
    let input = build_compound_input(&args);
    info!("running compound projection over {} years", input.years);

    let result = calculate_compound(&input)?;
    let yearly = chart_data(&result);
    let monthly = args.monthly.then_some(result.monthly_breakdown.as_slice());
    if json {
        render::compound_json(&result, &yearly, monthly)
    } else {
        Ok(render::compound_text(&result, &yearly, monthly))
    }
}

fn run_furusato(mut args: FurusatoArgs, json: bool) -> CalcResult<String> {
    if let Some(raw) = args.household.payload.take() {
        payload::parse_furusato(&raw)?.apply(&mut args.annual_income, &mut args.household);
    }
    let limits = build_limits(&args.household);
    let input = build_furusato_input(args.annual_income, &args.household, &limits)?;

    let issues = check_furusato_sanity(&input, &limits);
    if !args.household.allow_sanity_errors {
        if let Some(blocking) = issues.iter().find(|i| i.severity == Severity::Blocking) {
            return Err(CalcError::validation(blocking.field, blocking.message.clone()));
        }
    }

    info!("running furusato calculation");
    let result = calculate_furusato_with(&input, &FurusatoConfig::default(), &limits)?;
    if json {
        render::furusato_json(&result, &issues)
    } else {
        Ok(render::furusato_text(&result, &issues))
    }
}

fn run_sweep(mut args: SweepArgs, json: bool) -> CalcResult<String> {
    let mut annual_income = 0.0;
    if let Some(raw) = args.household.payload.take() {
        payload::parse_furusato(&raw)?.apply(&mut annual_income, &mut args.household);
    }
    let limits = build_limits(&args.household);
    let base = build_furusato_input(annual_income, &args.household, &limits)?;
    let range = IncomeRange {
        min: args.min,
        max: args.max,
        step: args.step,
    };

    info!(
        "sweeping incomes {}..={} step {}",
        range.min, range.max, range.step
    );
    let rows = simulate_by_income(&base, range)?;
    if json {
        render::sweep_json(&rows)
    } else {
        Ok(render::sweep_text(&rows))
    }
}

fn build_compound_input(args: &CompoundArgs) -> CompoundInput {
    CompoundInput {
        principal: args.principal,
        annual_rate: args.annual_rate / 100.0,
        years: args.years,
        monthly_contribution: args.monthly_contribution,
        compound_frequency: args.compound_frequency,
    }
}

fn build_limits(household: &HouseholdArgs) -> ValidationLimits {
    ValidationLimits {
        max_small_business_mutual_aid_premium: household.max_mutual_aid,
        ideco_cap_salary: household.ideco_cap_salary,
        ideco_cap_business: household.ideco_cap_business,
        ..ValidationLimits::default()
    }
}

fn build_furusato_input(
    annual_income: f64,
    household: &HouseholdArgs,
    limits: &ValidationLimits,
) -> CalcResult<FurusatoInput> {
    let dependents = validate_dependents(household.dependents, limits)?;
    Ok(FurusatoInput {
        annual_income,
        income_type: household.income_type.into(),
        family_type: household.family_type.into(),
        dependents,
        social_insurance_premium: household.social_insurance,
        life_insurance_premium: household.life_insurance,
        earthquake_insurance_premium: household.earthquake_insurance,
        housing_loan_deduction: household.housing_loan,
        medical_expense_deduction: household.medical_expense,
        small_business_mutual_aid_premium: household.small_business_mutual_aid,
    })
}

pub fn render_error(err: &CalcError, json: bool) -> String {
    if json {
        render::error_json(err)
    } else {
        err.user_message()
    }
}
