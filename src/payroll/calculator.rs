//! Payslip calculation.
//!
//! A pure function from base salary and the deduction rule table to a salary
//! breakdown. Arithmetic is exact `Decimal` math with no intermediate rounding,
//! so `net_salary == gross_salary - total_deductions` holds on the returned values.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::AppError;

pub const EMPLOYEE_TAX: &str = "Employee Tax";
pub const PENSION: &str = "Pension";
pub const MEDICAL_INSURANCE: &str = "MedicalInsurance";
pub const OTHERS: &str = "Others";
pub const HOUSING: &str = "Housing";
pub const TRANSPORT: &str = "Transport";

/// The six rates a payslip is computed from, as fractions of base salary.
///
/// Rates missing from the rule table fall back to [`DeductionRates::default`].
/// Those defaults (30% tax, 50% medical, 50% other) are far above what the
/// 0-100 percentage rules normally hold; they are kept as-is, and with them
/// any positive salary fails with excessive deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeductionRates {
    pub employee_tax: Decimal,
    pub pension: Decimal,
    pub medical_insurance: Decimal,
    pub others: Decimal,
    pub housing: Decimal,
    pub transport: Decimal,
}

impl Default for DeductionRates {
    fn default() -> Self {
        Self {
            employee_tax: Decimal::new(30, 2),
            pension: Decimal::new(6, 2),
            medical_insurance: Decimal::new(50, 2),
            others: Decimal::new(50, 2),
            housing: Decimal::new(14, 2),
            transport: Decimal::new(14, 2),
        }
    }
}

impl DeductionRates {
    /// Builds the rate set from a `name -> fraction` rule table.
    pub fn from_rules(rules: &HashMap<String, Decimal>) -> Self {
        let defaults = Self::default();
        let rate = |name: &str, fallback: Decimal| rules.get(name).copied().unwrap_or(fallback);

        Self {
            employee_tax: rate(EMPLOYEE_TAX, defaults.employee_tax),
            pension: rate(PENSION, defaults.pension),
            medical_insurance: rate(MEDICAL_INSURANCE, defaults.medical_insurance),
            others: rate(OTHERS, defaults.others),
            housing: rate(HOUSING, defaults.housing),
            transport: rate(TRANSPORT, defaults.transport),
        }
    }
}

/// Every amount that ends up on a payslip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryBreakdown {
    pub base_salary: Decimal,
    pub housing_amount: Decimal,
    pub transport_amount: Decimal,
    pub employee_tax_amount: Decimal,
    pub pension_amount: Decimal,
    pub medical_insurance_amount: Decimal,
    pub other_taxed_amount: Decimal,
    pub gross_salary: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("Base salary must be non-negative, got {0}")]
    NegativeBaseSalary(Decimal),

    #[error("Total deductions ({total_deductions}) exceed gross salary ({gross_salary})")]
    ExcessiveDeductions {
        total_deductions: Decimal,
        gross_salary: Decimal,
    },

    #[error("Salary amounts overflow for base salary {0}")]
    Overflow(Decimal),
}

impl CalculationError {
    /// Attaches the employee the calculation was run for.
    pub fn for_employee(self, employee_code: &str) -> AppError {
        match self {
            CalculationError::NegativeBaseSalary(base) => AppError::Validation(format!(
                "Base salary must be non-negative for employee {employee_code}, got {base}"
            )),
            CalculationError::ExcessiveDeductions {
                total_deductions,
                gross_salary,
            } => AppError::ExcessiveDeductions {
                employee_code: employee_code.to_string(),
                total_deductions,
                gross_salary,
            },
            CalculationError::Overflow(base) => AppError::Validation(format!(
                "Base salary {base} of employee {employee_code} is too large to compute a payslip"
            )),
        }
    }
}

pub fn calculate_payslip(
    base_salary: Decimal,
    rates: &DeductionRates,
) -> Result<SalaryBreakdown, CalculationError> {
    if base_salary < Decimal::ZERO {
        return Err(CalculationError::NegativeBaseSalary(base_salary));
    }

    let overflow = || CalculationError::Overflow(base_salary);
    let share = |rate: Decimal| base_salary.checked_mul(rate).ok_or_else(overflow);
    let sum = |amounts: &[Decimal]| {
        amounts
            .iter()
            .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(*amount))
            .ok_or_else(overflow)
    };

    let housing_amount = share(rates.housing)?;
    let transport_amount = share(rates.transport)?;
    let gross_salary = sum(&[base_salary, housing_amount, transport_amount])?;

    let employee_tax_amount = share(rates.employee_tax)?;
    let pension_amount = share(rates.pension)?;
    let medical_insurance_amount = share(rates.medical_insurance)?;
    let other_taxed_amount = share(rates.others)?;
    let total_deductions = sum(&[
        employee_tax_amount,
        pension_amount,
        medical_insurance_amount,
        other_taxed_amount,
    ])?;

    if total_deductions > gross_salary {
        return Err(CalculationError::ExcessiveDeductions {
            total_deductions,
            gross_salary,
        });
    }

    Ok(SalaryBreakdown {
        base_salary,
        housing_amount,
        transport_amount,
        employee_tax_amount,
        pension_amount,
        medical_insurance_amount,
        other_taxed_amount,
        gross_salary,
        total_deductions,
        net_salary: gross_salary - total_deductions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn safe_rates() -> DeductionRates {
        DeductionRates {
            employee_tax: dec!(0.10),
            pension: dec!(0.03),
            medical_insurance: dec!(0.02),
            others: dec!(0.01),
            housing: dec!(0.14),
            transport: dec!(0.14),
        }
    }

    #[test]
    fn computes_breakdown_with_safe_rates() {
        let breakdown = calculate_payslip(dec!(100000), &safe_rates()).unwrap();

        assert_eq!(breakdown.housing_amount, dec!(14000));
        assert_eq!(breakdown.transport_amount, dec!(14000));
        assert_eq!(breakdown.gross_salary, dec!(128000));
        assert_eq!(breakdown.employee_tax_amount, dec!(10000));
        assert_eq!(breakdown.pension_amount, dec!(3000));
        assert_eq!(breakdown.medical_insurance_amount, dec!(2000));
        assert_eq!(breakdown.other_taxed_amount, dec!(1000));
        assert_eq!(breakdown.total_deductions, dec!(16000));
        assert_eq!(breakdown.net_salary, dec!(112000));
    }

    #[test]
    fn default_rates_exceed_gross_for_positive_salary() {
        let err = calculate_payslip(dec!(100000), &DeductionRates::default()).unwrap_err();
        assert_eq!(
            err,
            CalculationError::ExcessiveDeductions {
                total_deductions: dec!(136000),
                gross_salary: dec!(128000),
            }
        );
    }

    #[test]
    fn zero_salary_is_always_payable() {
        let breakdown = calculate_payslip(Decimal::ZERO, &DeductionRates::default()).unwrap();
        assert_eq!(breakdown.gross_salary, Decimal::ZERO);
        assert_eq!(breakdown.net_salary, Decimal::ZERO);
    }

    #[test]
    fn negative_salary_is_rejected() {
        let err = calculate_payslip(dec!(-1), &safe_rates()).unwrap_err();
        assert_eq!(err, CalculationError::NegativeBaseSalary(dec!(-1)));
    }

    #[test]
    fn huge_salary_overflows_without_panicking() {
        let base = Decimal::from_str_exact("70000000000000000000000000000").unwrap();
        let err = calculate_payslip(base, &safe_rates()).unwrap_err();
        assert_eq!(err, CalculationError::Overflow(base));
        assert!(matches!(err.for_employee("EMP-9"), AppError::Validation(_)));
    }

    #[test]
    fn deductions_equal_to_gross_are_allowed() {
        let rates = DeductionRates {
            employee_tax: dec!(0.5),
            pension: dec!(0.5),
            medical_insurance: dec!(0.14),
            others: dec!(0.14),
            housing: dec!(0.14),
            transport: dec!(0.14),
        };
        let breakdown = calculate_payslip(dec!(2500.50), &rates).unwrap();
        assert_eq!(breakdown.net_salary, Decimal::ZERO);
    }

    #[test]
    fn from_rules_falls_back_per_missing_name() {
        let mut rules = HashMap::new();
        rules.insert(EMPLOYEE_TAX.to_string(), dec!(0.1));
        rules.insert(HOUSING.to_string(), dec!(0.2));
        rules.insert("Unrelated".to_string(), dec!(0.9));

        let rates = DeductionRates::from_rules(&rules);
        let defaults = DeductionRates::default();

        assert_eq!(rates.employee_tax, dec!(0.1));
        assert_eq!(rates.housing, dec!(0.2));
        assert_eq!(rates.pension, defaults.pension);
        assert_eq!(rates.medical_insurance, defaults.medical_insurance);
        assert_eq!(rates.others, defaults.others);
        assert_eq!(rates.transport, defaults.transport);
    }

    #[test]
    fn for_employee_carries_code_and_totals() {
        let err = CalculationError::ExcessiveDeductions {
            total_deductions: dec!(10),
            gross_salary: dec!(5),
        }
        .for_employee("EMP-3");
        match err {
            AppError::ExcessiveDeductions {
                employee_code,
                total_deductions,
                gross_salary,
            } => {
                assert_eq!(employee_code, "EMP-3");
                assert_eq!(total_deductions, dec!(10));
                assert_eq!(gross_salary, dec!(5));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Rates in basis points, 0 to 100%.
    fn rate() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000).prop_map(|bp| Decimal::new(bp, 4))
    }

    fn rate_set() -> impl Strategy<Value = DeductionRates> {
        (rate(), rate(), rate(), rate(), rate(), rate()).prop_map(
            |(employee_tax, pension, medical_insurance, others, housing, transport)| {
                DeductionRates {
                    employee_tax,
                    pension,
                    medical_insurance,
                    others,
                    housing,
                    transport,
                }
            },
        )
    }

    proptest! {
        #[test]
        fn net_is_gross_minus_deductions_when_rates_fit(
            cents in 0i64..=1_000_000_000,
            rates in rate_set(),
        ) {
            let base = Decimal::new(cents, 2);
            let deduction_rate = rates.employee_tax + rates.pension + rates.medical_insurance + rates.others;
            let allowance_rate = Decimal::ONE + rates.housing + rates.transport;
            prop_assume!(deduction_rate <= allowance_rate);

            let breakdown = calculate_payslip(base, &rates).unwrap();
            prop_assert_eq!(breakdown.net_salary, breakdown.gross_salary - breakdown.total_deductions);
            prop_assert!(breakdown.net_salary >= Decimal::ZERO);
            prop_assert_eq!(
                breakdown.gross_salary,
                base + breakdown.housing_amount + breakdown.transport_amount
            );
        }

        #[test]
        fn excessive_rates_fail_for_positive_salary(
            cents in 1i64..=1_000_000_000,
            rates in rate_set(),
        ) {
            let base = Decimal::new(cents, 2);
            let deduction_rate = rates.employee_tax + rates.pension + rates.medical_insurance + rates.others;
            let allowance_rate = Decimal::ONE + rates.housing + rates.transport;
            prop_assume!(deduction_rate > allowance_rate);

            let is_excessive = matches!(
                calculate_payslip(base, &rates),
                Err(CalculationError::ExcessiveDeductions { .. })
            );
            prop_assert!(is_excessive);
        }
    }
}
