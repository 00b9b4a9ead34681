// Rust guideline compliant 2026-03-01

//! Fixed vocabularies of the feed.
//!
//! These sets must be reproduced exactly for wire-compatible behavior;
//! none of them implies an ordering.

/// Country to currency mapping. The currency of a transaction is derived
/// deterministically from the chosen country via this table.
///
/// `"Turkey" -> "Lira"` is spelled out (not `TRY`) on purpose: it matches
/// the original feed byte for byte.
pub const COUNTRY_CURRENCIES: &[(&str, &str)] = &[
    ("United States", "USD"),
    ("Canada", "CAD"),
    ("United Kingdom", "GBP"),
    ("Germany", "EUR"),
    ("France", "EUR"),
    ("Japan", "JPY"),
    ("Australia", "AUD"),
    ("India", "INR"),
    ("Brazil", "BRL"),
    ("China", "CNY"),
    ("South Africa", "ZAR"),
    ("United Arab Emirates", "AED"),
    ("Saudi Arabia", "SAR"),
    ("Singapore", "SGD"),
    ("South Korea", "KRW"),
    ("Russia", "RUB"),
    ("Turkey", "Lira"),
];

/// Currency for `country`, or `None` if the country is not in the table.
#[must_use]
pub fn currency_for(country: &str) -> Option<&'static str> {
    COUNTRY_CURRENCIES
        .iter()
        .find(|(c, _)| *c == country)
        .map(|(_, cur)| *cur)
}

/// Merchant categories a synthetic transaction may carry.
pub const MERCHANT_CATEGORIES: &[&str] = &[
    "Electronics",
    "Groceries",
    "Clothing",
    "Restaurants",
    "Travel",
    "Healthcare",
    "Automotive",
    "Entertainment",
    "Utilities",
    "Education",
    "Books",
    "Furniture",
    "Sports",
    "Beauty",
    "Jewelry",
    "Toys",
    "Hardware",
    "Software",
    "Music",
    "Movies",
    "Pet Supplies",
    "Home Improvement",
    "Office Supplies",
    "Gifts",
    "Food Delivery",
    "Subscription Services",
    "Online Services",
    "Fitness",
    "Insurance",
    "Real Estate",
    "Legal Services",
    "Financial Services",
    "Charity",
    "Other",
];

/// Channels through which a synthetic transaction may occur.
pub const TRANSACTION_TYPES: &[&str] = &[
    "POS",
    "Online",
    "ATM Withdrawal",
    "Mobile Payment",
    "Recurring Payment",
];

/// Default trusted-country set for the geographical heuristic rule.
///
/// Transactions from any other country are flagged unless an earlier rule
/// matched first.
pub const TRUSTED_COUNTRIES: &[&str] = &[
    "United States",
    "Canada",
    "United Kingdom",
    "Germany",
    "France",
    "Japan",
    "Australia",
    "India",
];
