use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code used by expenses and reports.
///
/// The code is stored as three upper-case ASCII letters, so the type is `Copy`
/// and cheap to use as a map key. Any well formed code is accepted, including
/// codes outside [`Currency::SUPPORTED`]: those simply have no exchange rate
/// and convert as identity (see [`convert`]).
///
/// ```rust
/// use engine::Currency;
///
/// let eur: Currency = " eur ".parse().unwrap();
/// assert_eq!(eur, Currency::EUR);
/// assert_eq!(eur.to_string(), "EUR");
/// assert!("EURO".parse::<Currency>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const USD: Currency = Currency(*b"USD");
    pub const EUR: Currency = Currency(*b"EUR");
    pub const CNY: Currency = Currency(*b"CNY");
    pub const JPY: Currency = Currency(*b"JPY");
    pub const KRW: Currency = Currency(*b"KRW");
    pub const SGD: Currency = Currency(*b"SGD");
    pub const HKD: Currency = Currency(*b"HKD");
    pub const TWD: Currency = Currency(*b"TWD");
    pub const THB: Currency = Currency(*b"THB");
    pub const MYR: Currency = Currency(*b"MYR");
    pub const IDR: Currency = Currency(*b"IDR");
    pub const PHP: Currency = Currency(*b"PHP");
    pub const VND: Currency = Currency(*b"VND");
    pub const INR: Currency = Currency(*b"INR");
    pub const GBP: Currency = Currency(*b"GBP");
    pub const AUD: Currency = Currency(*b"AUD");
    pub const CAD: Currency = Currency(*b"CAD");

    /// Currencies offered when recording an expense or picking a base currency.
    pub const SUPPORTED: [Currency; 17] = [
        Currency::USD,
        Currency::EUR,
        Currency::CNY,
        Currency::JPY,
        Currency::KRW,
        Currency::SGD,
        Currency::HKD,
        Currency::TWD,
        Currency::THB,
        Currency::MYR,
        Currency::IDR,
        Currency::PHP,
        Currency::VND,
        Currency::INR,
        Currency::GBP,
        Currency::AUD,
        Currency::CAD,
    ];

    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("???")
    }

    /// Human readable name, only known for the supported currencies.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        let name = match &self.0 {
            b"USD" => "US Dollar",
            b"EUR" => "Euro",
            b"CNY" => "Chinese Yuan",
            b"JPY" => "Japanese Yen",
            b"KRW" => "South Korean Won",
            b"SGD" => "Singapore Dollar",
            b"HKD" => "Hong Kong Dollar",
            b"TWD" => "Taiwan Dollar",
            b"THB" => "Thai Baht",
            b"MYR" => "Malaysian Ringgit",
            b"IDR" => "Indonesian Rupiah",
            b"PHP" => "Philippine Peso",
            b"VND" => "Vietnamese Dong",
            b"INR" => "Indian Rupee",
            b"GBP" => "British Pound",
            b"AUD" => "Australian Dollar",
            b"CAD" => "Canadian Dollar",
            _ => return None,
        };
        Some(name)
    }

    #[must_use]
    pub fn is_supported(self) -> bool {
        Self::SUPPORTED.contains(&self)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        let bytes: [u8; 3] = code
            .as_bytes()
            .try_into()
            .map_err(|_| EngineError::InvalidCurrency(format!("unsupported currency: {code}")))?;
        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(EngineError::InvalidCurrency(format!(
                "unsupported currency: {code}"
            )));
        }
        Ok(Currency(bytes))
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Currency {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.code().to_string()
    }
}

/// Exchange rates expressed against a single anchor currency.
///
/// Each entry reads as "units of that currency per one unit of `anchor`", the
/// shape returned by `latest?from=<anchor>` style rate services. The anchor is
/// fixed by whoever fetched the table and is independent of the base currency
/// the user reports in, so switching base currency does not need a refetch.
///
/// A rate that is zero, negative or not finite is treated as missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    anchor: Currency,
    rates: BTreeMap<Currency, f64>,
}

impl RateTable {
    /// Empty table: every conversion degrades to identity.
    #[must_use]
    pub fn new(anchor: Currency) -> Self {
        Self {
            anchor,
            rates: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_rates(anchor: Currency, rates: impl IntoIterator<Item = (Currency, f64)>) -> Self {
        Self {
            anchor,
            rates: rates.into_iter().collect(),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn rate_for(mut self, currency: Currency, rate: f64) -> Self {
        self.rates.insert(currency, rate);
        self
    }

    #[must_use]
    pub fn anchor(&self) -> Currency {
        self.anchor
    }

    /// Usable rate for `currency`, if any.
    #[must_use]
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.rates
            .get(&currency)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, f64)> + '_ {
        self.rates.iter().map(|(currency, rate)| (*currency, *rate))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Converts `amount` from `from` into `to` going through the table's anchor.
///
/// Never fails:
/// - same currency returns `amount` untouched;
/// - no usable rate for `from` returns `amount` unconverted;
/// - no usable rate for `to` returns the anchor-denominated amount.
///
/// ```rust
/// use engine::{Currency, RateTable, convert};
///
/// let rates = RateTable::new(Currency::USD).rate_for(Currency::EUR, 0.5);
/// assert_eq!(convert(10.0, Currency::EUR, Currency::USD, &rates), 20.0);
/// assert_eq!(convert(10.0, Currency::USD, Currency::EUR, &rates), 5.0);
/// ```
#[must_use]
pub fn convert(amount: f64, from: Currency, to: Currency, rates: &RateTable) -> f64 {
    if from == to {
        return amount;
    }

    let anchor = rates.anchor();
    let in_anchor = if from == anchor {
        amount
    } else {
        match rates.rate(from) {
            Some(rate) => amount / rate,
            None => return amount,
        }
    };

    if to == anchor {
        return in_anchor;
    }
    match rates.rate(to) {
        Some(rate) => in_anchor * rate,
        None => in_anchor,
    }
}
