//! Currency display table.
//!
//! A currency is a display label plus a symbol; there is no conversion.
//! The two fields on [`ProposalData`](super::ProposalData) only ever change
//! together, through a lookup here — no state can exist where code and
//! symbol disagree with this table.

/// One entry in the fixed lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
}

/// Supported currencies, in picker order.
pub const CURRENCIES: &[Currency] = &[
    Currency { code: "USD", symbol: "$", name: "US Dollar" },
    Currency { code: "EUR", symbol: "€", name: "Euro" },
    Currency { code: "GBP", symbol: "£", name: "British Pound" },
    Currency { code: "CAD", symbol: "CA$", name: "Canadian Dollar" },
    Currency { code: "AUD", symbol: "AU$", name: "Australian Dollar" },
    Currency { code: "JPY", symbol: "¥", name: "Japanese Yen" },
    Currency { code: "CHF", symbol: "CHF", name: "Swiss Franc" },
    Currency { code: "CNY", symbol: "¥", name: "Chinese Yuan" },
    Currency { code: "INR", symbol: "₹", name: "Indian Rupee" },
    Currency { code: "BRL", symbol: "R$", name: "Brazilian Real" },
    Currency { code: "MXN", symbol: "MX$", name: "Mexican Peso" },
    Currency { code: "SGD", symbol: "S$", name: "Singapore Dollar" },
    Currency { code: "HKD", symbol: "HK$", name: "Hong Kong Dollar" },
    Currency { code: "NOK", symbol: "kr", name: "Norwegian Krone" },
    Currency { code: "SEK", symbol: "kr", name: "Swedish Krona" },
    Currency { code: "DKK", symbol: "kr", name: "Danish Krone" },
    Currency { code: "NZD", symbol: "NZ$", name: "New Zealand Dollar" },
    Currency { code: "ZAR", symbol: "R", name: "South African Rand" },
];

impl Currency {
    /// Find a currency by its 3-letter code. Case-sensitive: codes are
    /// stored upper-case and the picker only offers table entries.
    pub fn lookup(code: &str) -> Option<&'static Currency> {
        CURRENCIES.iter().find(|c| c.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_eur() {
        let c = Currency::lookup("EUR").unwrap();
        assert_eq!(c.code, "EUR");
        assert_eq!(c.symbol, "€");
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(Currency::lookup("BTC").is_none());
        assert!(Currency::lookup("usd").is_none());
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in CURRENCIES.iter().enumerate() {
            for b in &CURRENCIES[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
