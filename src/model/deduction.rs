use rust_decimal::Decimal;

/// A named deduction or allowance rule.
///
/// `rate` is a fraction of base salary (0.05 for 5%). The API exchanges it as a
/// 0-100 percentage, see [`Deduction::percentage`] and [`rate_from_percentage`].
#[derive(Debug, Clone)]
pub struct Deduction {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub rate: Decimal,
}

impl Deduction {
    pub fn percentage(&self) -> Decimal {
        (self.rate * Decimal::ONE_HUNDRED).normalize()
    }
}

#[derive(Debug, Clone)]
pub struct DeductionDraft {
    pub code: String,
    pub name: String,
    pub rate: Decimal,
}

pub fn rate_from_percentage(percentage: Decimal) -> Decimal {
    percentage / Decimal::ONE_HUNDRED
}
