//! Value objects for the order domain.

use std::str::FromStr;

use common::ProductId;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::OrderError;

/// Money amount represented in cents to avoid floating point issues.
///
/// On the wire an amount is a decimal number of currency units (`4.50`).
/// Incoming amounts are rounded half away from zero to two decimals, so
/// everything computed afterwards stays in whole cents. Arithmetic is
/// checked: an amount that does not fit is an error, never a wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money {
    /// Amount in cents (e.g., 450 = 4.50)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Rounds a decimal amount of units to cents, half away from zero.
    ///
    /// Returns `None` when the amount does not fit.
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()
            .map(Self::from_cents)
    }

    /// Returns the amount as a decimal number of units.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole units.
    pub fn units(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after whole units).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity, or `None` on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(quantity))
            .map(Money::from_cents)
    }

    /// Adds two amounts, or `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.cents.checked_add(other.cents).map(Money::from_cents)
    }

    /// Adds two amounts, clamping at the bounds.
    pub fn saturating_add(&self, other: Money) -> Money {
        Money::from_cents(self.cents.saturating_add(other.cents))
    }

    /// Sums amounts, or `None` if the sum does not fit.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.units(), self.cents_part())
        }
    }
}

impl Serialize for Money {
    // Both operands are exact, so the quotient is the closest float to the amount.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.cents as f64 / 100.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl MoneyVisitor {
    fn round<E: de::Error>(amount: Decimal) -> Result<Money, E> {
        Money::from_decimal(amount)
            .ok_or_else(|| E::custom(format!("amount {amount} is too large")))
    }
}

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a decimal amount such as 4.50")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Self::round(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Self::round(Decimal::from(v))
    }

    // The shortest representation of the float is the literal the client sent.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        let amount = Decimal::from_str(v.trim())
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))?;
        Self::round(amount)
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    #[serde(alias = "EFECTIVO")]
    Cash,
    #[serde(alias = "TARJETA")]
    Card,
    #[serde(alias = "TRANSFERENCIA")]
    Transfer,
    #[serde(alias = "APPLE PAY")]
    ApplePay,
    #[serde(rename = "PAYPAL")]
    PayPal,
    #[serde(alias = "OTRO")]
    Other,
}

impl PaymentType {
    /// Returns the wire name of the payment type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "CASH",
            PaymentType::Card => "CARD",
            PaymentType::Transfer => "TRANSFER",
            PaymentType::ApplePay => "APPLE_PAY",
            PaymentType::PayPal => "PAYPAL",
            PaymentType::Other => "OTHER",
        }
    }

    /// Every name the payment type is accepted under, wire name first.
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            PaymentType::Cash => &["CASH", "EFECTIVO"],
            PaymentType::Card => &["CARD", "TARJETA"],
            PaymentType::Transfer => &["TRANSFER", "TRANSFERENCIA"],
            PaymentType::ApplePay => &["APPLE_PAY", "APPLE PAY"],
            PaymentType::PayPal => &["PAYPAL"],
            PaymentType::Other => &["OTHER", "OTRO"],
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string is not a known payment type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown payment type: {0}")]
pub struct ParsePaymentTypeError(pub String);

impl FromStr for PaymentType {
    type Err = ParsePaymentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(' ', "_").as_str() {
            "CASH" | "EFECTIVO" => Ok(PaymentType::Cash),
            "CARD" | "TARJETA" => Ok(PaymentType::Card),
            "TRANSFER" | "TRANSFERENCIA" => Ok(PaymentType::Transfer),
            "APPLE_PAY" => Ok(PaymentType::ApplePay),
            "PAYPAL" => Ok(PaymentType::PayPal),
            "OTHER" | "OTRO" => Ok(PaymentType::Other),
            _ => Err(ParsePaymentTypeError(s.to_string())),
        }
    }
}

/// A requested (product, quantity) pair, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    #[serde(alias = "productId")]
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LineRequest {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// One product line of a placed order.
///
/// The unit price is a snapshot taken when the order was placed; later price
/// changes on the product never reach it. There are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineItem {
    product_id: ProductId,
    quantity: u32,
    unit_price: Money,
    subtotal: Money,
}

impl OrderLineItem {
    /// Creates a line item, computing its subtotal.
    pub fn new(
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, OrderError> {
        let subtotal = unit_price
            .checked_multiply(quantity)
            .ok_or(OrderError::AmountOverflow { product_id })?;
        Ok(Self {
            product_id,
            quantity,
            unit_price,
            subtotal,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Returns `unit_price * quantity`.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.units(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(450).to_string(), "4.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(550);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(1550)));
        assert_eq!(b.checked_multiply(3), Some(Money::from_cents(1650)));
        assert_eq!(Money::checked_sum([a, b, b]), Some(Money::from_cents(2100)));
    }

    #[test]
    fn test_money_overflow_is_detected() {
        let huge = Money::from_cents(3_000_000_000);
        assert_eq!(huge.checked_multiply(4_000_000_000), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]), None);
        assert_eq!(
            Money::from_cents(i64::MAX).saturating_add(Money::from_cents(1)),
            Money::from_cents(i64::MAX)
        );
    }

    #[test]
    fn test_money_serializes_as_decimal_units() {
        assert_eq!(serde_json::to_string(&Money::from_cents(900)).unwrap(), "9.0");
        assert_eq!(serde_json::to_string(&Money::from_cents(450)).unwrap(), "4.5");
        assert_eq!(serde_json::to_string(&Money::from_cents(1299)).unwrap(), "12.99");
    }

    #[test]
    fn test_money_parses_decimals_rounding_half_up() {
        let parse = |json: &str| serde_json::from_str::<Money>(json).unwrap().cents();
        assert_eq!(parse("4.50"), 450);
        assert_eq!(parse("4.505"), 451);
        assert_eq!(parse("4.504"), 450);
        assert_eq!(parse("0.125"), 13);
        assert_eq!(parse("-4.505"), -451);
        assert_eq!(parse("9"), 900);
        assert_eq!(parse("\"12.345\""), 1235);
    }

    #[test]
    fn test_money_rejects_unparseable_amounts() {
        assert!(serde_json::from_str::<Money>("\"cheap\"").is_err());
        assert!(serde_json::from_str::<Money>("1e300").is_err());
        assert!(serde_json::from_str::<Money>("true").is_err());
    }

    #[test]
    fn test_line_item_subtotal() {
        let item = OrderLineItem::new(ProductId::new(1), 2, Money::from_cents(450)).unwrap();
        assert_eq!(item.subtotal().cents(), 900);
    }

    #[test]
    fn test_line_item_rejects_overflowing_subtotal() {
        let result = OrderLineItem::new(
            ProductId::new(1),
            4_000_000_000,
            Money::from_cents(3_000_000_000),
        );
        assert_eq!(
            result,
            Err(OrderError::AmountOverflow {
                product_id: ProductId::new(1)
            })
        );
    }

    #[test]
    fn test_line_request_accepts_camel_case() {
        let line: LineRequest = serde_json::from_str(r#"{"productId": 3, "quantity": 2}"#).unwrap();
        assert_eq!(line, LineRequest::new(ProductId::new(3), 2));
    }

    #[test]
    fn test_payment_type_parsing() {
        assert_eq!("cash".parse(), Ok(PaymentType::Cash));
        assert_eq!("Apple Pay".parse(), Ok(PaymentType::ApplePay));
        assert_eq!("TRANSFERENCIA".parse(), Ok(PaymentType::Transfer));
        assert!("BITCOIN".parse::<PaymentType>().is_err());
    }

    #[test]
    fn test_payment_type_names_all_parse_back() {
        for payment in [
            PaymentType::Cash,
            PaymentType::Card,
            PaymentType::Transfer,
            PaymentType::ApplePay,
            PaymentType::PayPal,
            PaymentType::Other,
        ] {
            assert_eq!(payment.names()[0], payment.as_str());
            for name in payment.names() {
                assert_eq!(name.parse(), Ok(payment));
            }
        }
    }

    #[test]
    fn test_payment_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentType::PayPal).unwrap(),
            "\"PAYPAL\""
        );
        let legacy: PaymentType = serde_json::from_str("\"EFECTIVO\"").unwrap();
        assert_eq!(legacy, PaymentType::Cash);
        for payment in [
            PaymentType::Cash,
            PaymentType::Card,
            PaymentType::Transfer,
            PaymentType::ApplePay,
            PaymentType::PayPal,
            PaymentType::Other,
        ] {
            let json = serde_json::to_string(&payment).unwrap();
            assert_eq!(json, format!("\"{}\"", payment.as_str()));
        }
    }
}
