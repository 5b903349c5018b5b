//! Per-token pricing for known models.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// (input, output) USD per token. Unknown models cost zero.
pub fn model_cost(model: &str) -> (Decimal, Decimal) {
    let model = model.to_ascii_lowercase();
    if model.starts_with("gemini-2.5-pro") {
        (dec!(0.00000125), dec!(0.00001))
    } else if model.starts_with("gemini-2.5-flash-lite") {
        (dec!(0.0000001), dec!(0.0000004))
    } else if model.starts_with("gemini-2.5-flash") {
        (dec!(0.0000003), dec!(0.0000025))
    } else if model.contains("opus") {
        (dec!(0.000015), dec!(0.000075))
    } else if model.contains("sonnet") {
        (dec!(0.000003), dec!(0.000015))
    } else if model.contains("haiku") {
        (dec!(0.0000008), dec!(0.000004))
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    }
}

/// USD cost of a single call at the given (input, output) per-token rates.
pub fn call_cost(rates: (Decimal, Decimal), input_tokens: u32, output_tokens: u32) -> Decimal {
    let (input, output) = rates;
    input * Decimal::from(input_tokens) + output * Decimal::from(output_tokens)
}
