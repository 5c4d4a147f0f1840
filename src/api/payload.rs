use serde::Deserialize;

use super::{CliFamilyType, CliIncomeType, CompoundArgs, HouseholdArgs};
use crate::core::{CalcError, CalcResult};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ApiIncomeType {
    Salary,
    Business,
}

impl From<ApiIncomeType> for CliIncomeType {
    fn from(value: ApiIncomeType) -> Self {
        match value {
            ApiIncomeType::Salary => CliIncomeType::Salary,
            ApiIncomeType::Business => CliIncomeType::Business,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ApiFamilyType {
    Single,
    #[serde(alias = "married-no-income", alias = "marriedNoIncome")]
    MarriedNoIncome,
    #[serde(alias = "married-with-income", alias = "marriedWithIncome")]
    MarriedWithIncome,
    #[serde(alias = "married-high-income", alias = "marriedHighIncome")]
    MarriedHighIncome,
}

impl From<ApiFamilyType> for CliFamilyType {
    fn from(value: ApiFamilyType) -> Self {
        match value {
            ApiFamilyType::Single => CliFamilyType::Single,
            ApiFamilyType::MarriedNoIncome => CliFamilyType::MarriedNoIncome,
            ApiFamilyType::MarriedWithIncome => CliFamilyType::MarriedWithIncome,
            ApiFamilyType::MarriedHighIncome => CliFamilyType::MarriedHighIncome,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompoundPayload {
    principal: Option<f64>,
    /// Decimal fraction, same unit as the engine input.
    annual_rate: Option<f64>,
    years: Option<f64>,
    monthly_contribution: Option<f64>,
    compound_frequency: Option<u32>,
}

impl CompoundPayload {
    pub fn apply(self, args: &mut CompoundArgs) {
        if let Some(v) = self.principal {
            args.principal = v;
        }
        if let Some(v) = self.annual_rate {
            args.annual_rate = v * 100.0;
        }
        if let Some(v) = self.years {
            args.years = v;
        }
        if let Some(v) = self.monthly_contribution {
            args.monthly_contribution = v;
        }
        if let Some(v) = self.compound_frequency {
            args.compound_frequency = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FurusatoPayload {
    annual_income: Option<f64>,
    income_type: Option<ApiIncomeType>,
    family_type: Option<ApiFamilyType>,
    dependents: Option<i64>,
    social_insurance_premium: Option<f64>,
    life_insurance_premium: Option<f64>,
    earthquake_insurance_premium: Option<f64>,
    housing_loan_deduction: Option<f64>,
    medical_expense_deduction: Option<f64>,
    small_business_mutual_aid_premium: Option<f64>,
}

impl FurusatoPayload {
    pub fn apply(self, annual_income: &mut f64, household: &mut HouseholdArgs) {
        if let Some(v) = self.annual_income {
            *annual_income = v;
        }
        if let Some(v) = self.income_type {
            household.income_type = v.into();
        }
        if let Some(v) = self.family_type {
            household.family_type = v.into();
        }
        if let Some(v) = self.dependents {
            household.dependents = v;
        }
        if let Some(v) = self.social_insurance_premium {
            household.social_insurance = v;
        }
        if let Some(v) = self.life_insurance_premium {
            household.life_insurance = v;
        }
        if let Some(v) = self.earthquake_insurance_premium {
            household.earthquake_insurance = v;
        }
        if let Some(v) = self.housing_loan_deduction {
            household.housing_loan = v;
        }
        if let Some(v) = self.medical_expense_deduction {
            household.medical_expense = v;
        }
        if let Some(v) = self.small_business_mutual_aid_premium {
            household.small_business_mutual_aid = v;
        }
    }
}

pub(super) fn parse_compound(json: &str) -> CalcResult<CompoundPayload> {
    serde_json::from_str(json).map_err(invalid_payload)
}

pub(super) fn parse_furusato(json: &str) -> CalcResult<FurusatoPayload> {
    serde_json::from_str(json).map_err(invalid_payload)
}

fn invalid_payload(err: serde_json::Error) -> CalcError {
    CalcError::validation("payload", format!("入力JSONの形式が正しくありません: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn furusato_payload_parses_camel_case_fields() {
        let payload = parse_furusato(
            r#"{
              "annualIncome": 6000000,
              "incomeType": "business",
              "familyType": "married_with_income",
              "dependents": 2,
              "socialInsurancePremium": 900000,
              "housingLoanDeduction": 300000
            }"#,
        )
        .expect("payload parses");
        assert_eq!(payload.annual_income, Some(6_000_000.0));
        assert_eq!(payload.income_type, Some(ApiIncomeType::Business));
        assert_eq!(payload.family_type, Some(ApiFamilyType::MarriedWithIncome));
        assert_eq!(payload.dependents, Some(2));
        assert_eq!(payload.housing_loan_deduction, Some(300_000.0));
        assert_eq!(payload.medical_expense_deduction, None);
    }

    #[test]
    fn negative_dependents_survive_parsing_for_validation() {
        let payload = parse_furusato(r#"{"dependents": -1}"#).expect("payload parses");
        assert_eq!(payload.dependents, Some(-1));
    }

    #[test]
    fn malformed_payload_is_a_validation_error() {
        let err = parse_furusato("{\"annualIncome\": \"lots\"}").expect_err("bad type");
        assert_eq!(err.field(), Some("payload"));

        let err = parse_compound("not json").expect_err("not json");
        assert!(err.is_validation());
    }

    #[test]
    fn compound_payload_rate_is_a_fraction() {
        let payload = parse_compound(r#"{"annualRate": 0.07, "years": 15}"#).expect("parses");
        assert_eq!(payload.annual_rate, Some(0.07));
        assert_eq!(payload.years, Some(15.0));
        assert_eq!(payload.principal, None);
    }
}
