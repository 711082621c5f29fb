use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (received income,
/// discount amounts, totals) to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "R$ 12.34");
/// ```
///
/// Form input goes through [`parse_amount_or_zero`], which never fails:
///
/// ```rust
/// use engine::{MoneyCents, parse_amount_or_zero};
///
/// assert_eq!(parse_amount_or_zero("10,5"), MoneyCents::new(1050));
/// assert_eq!(parse_amount_or_zero("abc"), MoneyCents::ZERO);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Addition clamped at the `i64` bounds.
    #[must_use]
    pub const fn saturating_add(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0.saturating_add(rhs.0))
    }

    /// Subtraction clamped at the `i64` bounds.
    #[must_use]
    pub const fn saturating_sub(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }

    /// Converts a floating amount (legacy rows store plain numbers) to cents.
    ///
    /// Follows the same policy as [`parse_amount_or_zero`]: NaN, infinities,
    /// negative and out-of-range values become zero.
    #[must_use]
    pub fn from_f64_or_zero(value: f64) -> Self {
        if !value.is_finite() || value < 0.0 {
            return Self::ZERO;
        }
        let cents = (value * 100.0).round();
        if cents >= i64::MAX as f64 {
            return Self::ZERO;
        }
        Self(cents as i64)
    }

    /// Plain decimal rendering without currency symbol (`-12.34`).
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {}", self.to_decimal_string())
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, MoneyCents::saturating_add)
    }
}

/// Normalizes raw form input into a non-negative amount.
///
/// This is the single place where bad numeric input is handled, and it never
/// fails:
/// - leading whitespace and an optional `+`/`-` sign are accepted
/// - the longest numeric prefix is used (`"12abc"` is 12), with `.` or `,`
///   as decimal separator and an optional exponent (`"1.5e2"` is 150)
/// - extra fractional digits are rounded half away from zero to cents
/// - empty, non-numeric, negative or overflowing input yields zero
pub fn parse_amount_or_zero(raw: &str) -> MoneyCents {
    match parse_leading_amount(raw) {
        Some(amount) if !amount.is_negative() => amount,
        _ => MoneyCents::ZERO,
    }
}

fn parse_leading_amount(raw: &str) -> Option<MoneyCents> {
    let trimmed = raw.trim_start();
    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let (int_digits, after) = split_digits(rest);
    let (frac_digits, after) = match after.strip_prefix(['.', ',']) {
        Some(frac) => split_digits(frac),
        None => ("", after),
    };

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let exponent = parse_exponent(after);
    let digits: Vec<i64> = int_digits
        .bytes()
        .chain(frac_digits.bytes())
        .map(|b| i64::from(b - b'0'))
        .collect();

    // Index one past the hundredths digit once the exponent has moved the point.
    let cents_end = i64::try_from(int_digits.len()).ok()? + exponent + 2;
    let kept = usize::try_from(cents_end.max(0)).ok()?.min(digits.len());

    let mut cents = digits[..kept]
        .iter()
        .try_fold(0_i64, |acc, digit| acc.checked_mul(10)?.checked_add(*digit))?;
    let padding = u32::try_from(cents_end - kept as i64).unwrap_or(0);
    cents = cents.checked_mul(10_i64.checked_pow(padding)?)?;

    let round_up = usize::try_from(cents_end)
        .ok()
        .and_then(|idx| digits.get(idx))
        .is_some_and(|digit| *digit >= 5);
    cents = cents.checked_add(i64::from(round_up))?;

    Some(MoneyCents(if negative { -cents } else { cents }))
}

fn split_digits(s: &str) -> (&str, &str) {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    s.split_at(len)
}

/// Reads an `e`/`E` exponent. A marker without digits is not part of the
/// number, so it counts as zero.
fn parse_exponent(s: &str) -> i64 {
    let Some(rest) = s.strip_prefix(['e', 'E']) else {
        return 0;
    };
    let (negative, rest) = if let Some(stripped) = rest.strip_prefix('-') {
        (true, stripped)
    } else {
        (false, rest.strip_prefix('+').unwrap_or(rest))
    };
    let (digits, _) = split_digits(rest);
    if digits.is_empty() {
        return 0;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(MAX_EXPONENT).min(MAX_EXPONENT);
    if negative { -magnitude } else { magnitude }
}

const MAX_EXPONENT: i64 = 1_000;
