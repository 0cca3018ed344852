use super::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

#[test]
fn test_money_creation() {
    let money = Money::new(Decimal::new(100, 2), Currency::Zar);
    assert_eq!(money.amount, Decimal::new(100, 2));
    assert_eq!(money.currency, Currency::Zar);
}

#[test]
fn test_money_zero() {
    let money = Money::zero(Currency::Zar);
    assert_eq!(money.amount, Decimal::ZERO);
    assert!(money.is_zero());
    assert!(!money.is_negative());
}

#[test]
fn test_money_negative() {
    let money = Money::new(Decimal::new(-100, 2), Currency::Zar);
    assert!(money.is_negative());
}

#[rstest]
#[case(dec!(0), "R 0.00")]
#[case(dec!(5), "R 5.00")]
#[case(dec!(1234.5), "R 1,234.50")]
#[case(dec!(1234567.891), "R 1,234,567.89")]
#[case(dec!(999.995), "R 1,000.00")]
#[case(dec!(100000), "R 100,000.00")]
#[case(dec!(-42.125), "R -42.13")]
#[case(dec!(-0.001), "R 0.00")]
fn test_display(#[case] amount: Decimal, #[case] expected: &str) {
    assert_eq!(Money::new(amount, Currency::Zar).to_string(), expected);
}

#[test]
fn test_format_does_not_mutate_amount() {
    let money = Money::new(dec!(10.005), Currency::Usd);
    assert_eq!(money.to_string(), "$ 10.01");
    assert_eq!(money.amount, dec!(10.005));
}

#[test]
fn test_currency_display() {
    assert_eq!(format!("{}", Currency::Zar), "ZAR");
    assert_eq!(format!("{}", Currency::Usd), "USD");
    assert_eq!(format!("{}", Currency::Eur), "EUR");
    assert_eq!(format!("{}", Currency::Gbp), "GBP");
}

#[test]
fn test_currency_from_str() {
    assert_eq!(Currency::from_str("ZAR").unwrap(), Currency::Zar);
    assert_eq!(Currency::from_str("zar").unwrap(), Currency::Zar);
    assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
    assert!(Currency::from_str("INVALID").is_err());
}
