//! Display currencies and Brazilian-style price formatting.
//!
//! Listing prices are stored in BRL centavos. Conversion uses fixed
//! BRL-based rates; there is no live exchange-rate feed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Label shown when a listing has no asking price.
pub const PRICE_ON_REQUEST: &str = "Sob consulta";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Brl,
    Usd,
    Cny,
    Rub,
}

impl Currency {
    /// Units of this currency per 1 BRL.
    #[must_use]
    pub fn rate_from_brl(self) -> Decimal {
        match self {
            Currency::Brl => Decimal::ONE,
            Currency::Usd => Decimal::new(19, 2),
            Currency::Cny => Decimal::new(142, 2),
            Currency::Rub => Decimal::new(185, 1),
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Brl => "R$",
            Currency::Usd => "$",
            Currency::Cny => "¥",
            Currency::Rub => "₽",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
            Currency::Cny => "CNY",
            Currency::Rub => "RUB",
        };
        f.write_str(code)
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            "CNY" => Ok(Currency::Cny),
            "RUB" => Ok(Currency::Rub),
            other => Err(format!("unsupported currency \"{other}\"")),
        }
    }
}

/// Interface languages. Each one implies a default display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    #[default]
    Pt,
    En,
    Zh,
    Ru,
}

impl Language {
    /// Picks a language from a BCP 47 tag such as `en-US`. Anything
    /// unrecognised falls back to Portuguese.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "en" => Language::En,
            "zh" => Language::Zh,
            "ru" => Language::Ru,
            _ => Language::Pt,
        }
    }

    #[must_use]
    pub fn default_currency(self) -> Currency {
        match self {
            Language::Pt => Currency::Brl,
            Language::En => Currency::Usd,
            Language::Zh => Currency::Cny,
            Language::Ru => Currency::Rub,
        }
    }
}

/// A formatted price split into symbol and number, e.g. `R$` + `30.000.000,00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceParts {
    pub symbol: &'static str,
    pub value: String,
}

impl std::fmt::Display for PriceParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.symbol, self.value)
    }
}

/// Converts a BRL price in centavos into `currency` and formats it with
/// `.` thousands separators and a `,` decimal mark, always two decimals.
#[must_use]
pub fn format_price_parts(price_minor_brl: i64, currency: Currency) -> PriceParts {
    let brl = Decimal::new(price_minor_brl, 2);
    let converted = (brl * currency.rate_from_brl())
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    PriceParts {
        symbol: currency.symbol(),
        value: group_brazilian(&format!("{converted:.2}")),
    }
}

/// Rewrites `1234567.89` as `1.234.567,89`.
fn group_brazilian(plain: &str) -> String {
    let (sign, digits) = plain
        .strip_prefix('-')
        .map_or(("", plain), |rest| ("-", rest));
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped},{frac_part}")
}
