//! Currency codes, display metadata and flag lookup

use std::collections::HashMap;

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Template for flag images when no local image is known for a country.
pub const FLAG_URL_TEMPLATE: &str = "https://flagcdn.com/w40/{country}.png";

/// ISO 4217 codes accepted by the strict validator.
pub const ISO_CURRENCIES: &[&str] = &[
    "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", "AWG", "AZN", "BAM", "BBD", "BDT",
    "BGN", "BHD", "BIF", "BMD", "BND", "BOB", "BRL", "BSD", "BTN", "BWP", "BYN", "BZD", "CAD",
    "CDF", "CHF", "CLP", "CNY", "COP", "CRC", "CUP", "CVE", "CZK", "DJF", "DKK", "DOP", "DZD",
    "EGP", "ERN", "ETB", "EUR", "FJD", "FKP", "GBP", "GEL", "GHS", "GIP", "GMD", "GNF", "GTQ",
    "GYD", "HKD", "HNL", "HTG", "HUF", "IDR", "ILS", "INR", "IQD", "IRR", "ISK", "JMD", "JOD",
    "JPY", "KES", "KGS", "KHR", "KMF", "KPW", "KRW", "KWD", "KYD", "KZT", "LAK", "LBP", "LKR",
    "LRD", "LSL", "LYD", "MAD", "MDL", "MGA", "MKD", "MMK", "MNT", "MOP", "MRU", "MUR", "MVR",
    "MWK", "MXN", "MYR", "MZN", "NAD", "NGN", "NIO", "NOK", "NPR", "NZD", "OMR", "PAB", "PEN",
    "PGK", "PHP", "PKR", "PLN", "PYG", "QAR", "RON", "RSD", "RUB", "RWF", "SAR", "SBD", "SCR",
    "SDG", "SEK", "SGD", "SHP", "SLE", "SOS", "SRD", "SSP", "STN", "SYP", "SZL", "THB", "TJS",
    "TMT", "TND", "TOP", "TRY", "TTD", "TWD", "TZS", "UAH", "UGX", "USD", "UYU", "UZS", "VES",
    "VND", "VUV", "WST", "XAF", "XCD", "XOF", "XPF", "YER", "ZAR", "ZMW", "ZWL",
];

// (code, english name, narrow symbol)
const CURRENCY_DISPLAY: &[(&str, &str, &str)] = &[
    ("AED", "United Arab Emirates Dirham", "AED"),
    ("AUD", "Australian Dollar", "$"),
    ("BRL", "Brazilian Real", "R$"),
    ("CAD", "Canadian Dollar", "$"),
    ("CHF", "Swiss Franc", "CHF"),
    ("CNY", "Chinese Yuan", "¥"),
    ("CZK", "Czech Koruna", "Kč"),
    ("DKK", "Danish Krone", "kr"),
    ("EUR", "Euro", "€"),
    ("GBP", "British Pound", "£"),
    ("HKD", "Hong Kong Dollar", "$"),
    ("HUF", "Hungarian Forint", "Ft"),
    ("IDR", "Indonesian Rupiah", "Rp"),
    ("ILS", "Israeli New Shekel", "₪"),
    ("INR", "Indian Rupee", "₹"),
    ("JPY", "Japanese Yen", "¥"),
    ("KRW", "South Korean Won", "₩"),
    ("MXN", "Mexican Peso", "$"),
    ("MYR", "Malaysian Ringgit", "RM"),
    ("NGN", "Nigerian Naira", "₦"),
    ("NOK", "Norwegian Krone", "kr"),
    ("NZD", "New Zealand Dollar", "$"),
    ("PHP", "Philippine Peso", "₱"),
    ("PLN", "Polish Zloty", "zł"),
    ("RON", "Romanian Leu", "lei"),
    ("SEK", "Swedish Krona", "kr"),
    ("SGD", "Singapore Dollar", "$"),
    ("THB", "Thai Baht", "฿"),
    ("TRY", "Turkish Lira", "₺"),
    ("UAH", "Ukrainian Hryvnia", "₴"),
    ("USD", "US Dollar", "$"),
    ("VND", "Vietnamese Dong", "₫"),
    ("ZAR", "South African Rand", "R"),
];

const FLAG_COUNTRY_BY_CURRENCY: &[(&str, &str)] = &[
    ("AED", "AE"),
    ("AUD", "AU"),
    ("BRL", "BR"),
    ("CAD", "CA"),
    ("CHF", "CH"),
    ("CNY", "CN"),
    ("DKK", "DK"),
    ("EUR", "EU"),
    ("GBP", "GB"),
    ("HKD", "HK"),
    ("INR", "IN"),
    ("JPY", "JP"),
    ("KRW", "KR"),
    ("MXN", "MX"),
    ("NOK", "NO"),
    ("NZD", "NZ"),
    ("SEK", "SE"),
    ("SGD", "SG"),
    ("TRY", "TR"),
    ("USD", "US"),
    ("ZAR", "ZA"),
];

/// Trims and uppercases a currency code. Returns `None` for blank input.
pub fn normalize_currency_code(code: &str) -> Option<String> {
    let normalized = code.trim().to_uppercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Strict check against the ISO 4217 list, used for user-supplied codes.
pub fn is_supported(code: &str) -> bool {
    normalize_currency_code(code).is_some_and(|c| ISO_CURRENCIES.contains(&c.as_str()))
}

/// Source of human readable currency names and symbols.
///
/// Implementations return `None` when they cannot describe a code; callers
/// degrade to the code itself.
pub trait CurrencyLocalizer: Send + Sync {
    fn display_name(&self, code: &str) -> Option<String>;
    fn symbol(&self, code: &str) -> Option<String>;
}

pub fn display_name_or_code(localizer: &dyn CurrencyLocalizer, code: &str) -> String {
    localizer
        .display_name(code)
        .unwrap_or_else(|| code.to_string())
}

pub fn symbol_or_code(localizer: &dyn CurrencyLocalizer, code: &str) -> String {
    localizer.symbol(code).unwrap_or_else(|| code.to_string())
}

/// English names and narrow symbols for commonly traded currencies.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticLocalizer;

impl StaticLocalizer {
    fn lookup(code: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
        CURRENCY_DISPLAY.iter().find(|(c, _, _)| *c == code)
    }
}

impl CurrencyLocalizer for StaticLocalizer {
    fn display_name(&self, code: &str) -> Option<String> {
        Self::lookup(code).map(|(_, name, _)| name.to_string())
    }

    fn symbol(&self, code: &str) -> Option<String> {
        Self::lookup(code).map(|(_, _, symbol)| symbol.to_string())
    }
}

pub trait FlagResolver: Send + Sync {
    fn flag_url(&self, code: &str) -> String;
}

/// Maps a currency to its country flag.
///
/// Local images registered with [`FlagTable::with_local`] win over the
/// templated remote URL. Unknown currencies get the US flag.
#[derive(Debug, Default, Clone)]
pub struct FlagTable {
    local: HashMap<String, String>,
}

impl FlagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, country: &str, image: &str) -> Self {
        self.local
            .insert(country.to_lowercase(), image.to_string());
        self
    }

    fn country_for(code: &str) -> &'static str {
        FLAG_COUNTRY_BY_CURRENCY
            .iter()
            .find(|(c, _)| *c == code)
            .map_or("US", |(_, country)| country)
    }
}

impl FlagResolver for FlagTable {
    fn flag_url(&self, code: &str) -> String {
        let country = Self::country_for(code).to_lowercase();
        match self.local.get(&country) {
            Some(image) => image.clone(),
            None => FLAG_URL_TEMPLATE.replace("{country}", &country),
        }
    }
}
