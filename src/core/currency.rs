//! Supported currency codes and their display metadata

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Static reference table: code and human readable description.
const SUPPORTED: &[(&str, &str)] = &[
    ("AED", "United Arab Emirates Dirham"),
    ("ARS", "Argentine Peso"),
    ("AUD", "Australian Dollar"),
    ("AZN", "Azerbaijani Manat"),
    ("BGN", "Bulgarian Lev"),
    ("BHD", "Bahraini Dinar"),
    ("BND", "Brunei Dollar"),
    ("BRL", "Brazilian Real"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("CLP", "Chilean Peso"),
    ("CNY", "Chinese Yuan"),
    ("CZK", "Czech Koruna"),
    ("DKK", "Danish Krone"),
    ("EGP", "Egyptian Pound"),
    ("EUR", "Euro"),
    ("FJD", "Fiji Dollar"),
    ("GBP", "Pound Sterling"),
    ("HKD", "Hong Kong Dollar"),
    ("HUF", "Hungarian Forint"),
    ("IDR", "Indonesian Rupiah"),
    ("ILS", "Israeli New Shekel"),
    ("INR", "Indian Rupee"),
    ("JPY", "Japanese Yen"),
    ("KRW", "South Korean Won"),
    ("KWD", "Kuwaiti Dinar"),
    ("LKR", "Sri Lankan Rupee"),
    ("MAD", "Moroccan Dirham"),
    ("MGA", "Malagasy Ariary"),
    ("MXN", "Mexican Peso"),
    ("MYR", "Malaysian Ringgit"),
    ("NOK", "Norwegian Krone"),
    ("NZD", "New Zealand Dollar"),
    ("OMR", "Omani Rial"),
    ("PEN", "Peruvian Sol"),
    ("PGK", "Papua New Guinean Kina"),
    ("PHP", "Philippine Peso"),
    ("PKR", "Pakistani Rupee"),
    ("PLN", "Polish Złoty"),
    ("RUB", "Russian Ruble"),
    ("SAR", "Saudi Riyal"),
    ("SBD", "Solomon Islands Dollar"),
    ("SCR", "Seychelles Rupee"),
    ("SEK", "Swedish Krona"),
    ("SGD", "Singapore Dollar"),
    ("THB", "Thai Baht"),
    ("TOP", "Tongan Paʻanga"),
    ("TRY", "Turkish Lira"),
    ("TWD", "New Taiwan Dollar"),
    ("TZS", "Tanzanian Shilling"),
    ("USD", "United States Dollar"),
    ("VEF", "Venezuelan Bolívar"),
    ("VND", "Vietnamese Dồng"),
    ("VUV", "Vanuatu Vatu"),
    ("WST", "Samoan Tala"),
    ("XOF", "CFA Franc BCEAO"),
    ("ZAR", "South African Rand"),
];

/// A currency code from the supported table.
///
/// Can only be obtained by parsing, so holding one means the code is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(&'static str);

impl CurrencyCode {
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn description(&self) -> &'static str {
        SUPPORTED
            .iter()
            .find(|(code, _)| *code == self.0)
            .map_or("", |(_, description)| description)
    }

    /// Relative path of the flag image served alongside the UI.
    pub fn flag(&self) -> String {
        format!("flags/{}.svg", self.0.to_lowercase())
    }

    pub fn all() -> impl Iterator<Item = CurrencyCode> {
        SUPPORTED.iter().map(|(code, _)| CurrencyCode(code))
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        SUPPORTED
            .iter()
            .find(|(code, _)| *code == wanted)
            .map(|(code, _)| CurrencyCode(code))
            .ok_or_else(|| anyhow!("Unsupported currency code: {}", s))
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for CurrencyCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Entry of the currency picker list.
#[derive(Debug, Clone, Serialize)]
pub struct SelectOption {
    pub value: CurrencyCode,
    pub label: String,
    pub flag: String,
}

pub fn select_options() -> Vec<SelectOption> {
    CurrencyCode::all()
        .map(|code| SelectOption {
            value: code,
            label: format!("{} - {}", code, code.description()),
            flag: code.flag(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_code_is_case_insensitive() {
        let code: CurrencyCode = " usd ".parse().unwrap();
        assert_eq!(code.as_str(), "USD");
        assert_eq!(code.description(), "United States Dollar");
        assert_eq!(code.flag(), "flags/usd.svg");
    }

    #[test]
    fn test_parse_unknown_code() {
        let result = "XYZ".parse::<CurrencyCode>();
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Unsupported currency code: XYZ"
        );
    }

    #[test]
    fn test_supported_table_has_unique_codes() {
        let mut codes: Vec<_> = CurrencyCode::all().map(|c| c.as_str()).collect();
        assert_eq!(codes.len(), 57);
        codes.dedup();
        assert_eq!(codes.len(), 57);
    }

    #[test]
    fn test_select_option_labels() {
        let options = select_options();
        let eur = options.iter().find(|o| o.value.as_str() == "EUR").unwrap();
        assert_eq!(eur.label, "EUR - Euro");
    }

    #[test]
    fn test_deserialize_rejects_unknown() {
        let ok: CurrencyCode = serde_json::from_str(r#""gbp""#).unwrap();
        assert_eq!(ok.as_str(), "GBP");
        assert!(serde_json::from_str::<CurrencyCode>(r#""ABC""#).is_err());
    }
}
