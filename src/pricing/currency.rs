//! Country name to pricing currency lookup.
//!
//! The table lists the currency each country is *priced in* on the source
//! pricing page, which is not always its local currency: many markets are
//! billed in USD or EUR.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// Country names exactly as they appear in the pricing table, with the
/// currency each one is priced in. One entry per country.
pub const COUNTRY_CURRENCIES: &[(&str, &str)] = &[
    // Priced in USD
    ("United States", "USD"),
    ("Afghanistan", "USD"),
    ("Albania", "USD"),
    ("Algeria", "USD"),
    ("Angola", "USD"),
    ("Anguilla", "USD"),
    ("Antigua and Barbuda", "USD"),
    ("Argentina", "USD"),
    ("Armenia", "USD"),
    ("Aruba", "USD"),
    ("Azerbaijan", "USD"),
    ("Bahamas", "USD"),
    ("Bahrain", "USD"),
    ("Barbados", "USD"),
    ("Belarus", "USD"),
    ("Belize", "USD"),
    ("Benin", "USD"),
    ("Bermuda", "USD"),
    ("Bhutan", "USD"),
    ("Bolivia", "USD"),
    ("Botswana", "USD"),
    ("British Virgin Islands", "USD"),
    ("Brunei", "USD"),
    ("Burkina Faso", "USD"),
    ("Cambodia", "USD"),
    ("Cameroon", "USD"),
    ("Cape Verde", "USD"),
    ("Cayman Islands", "USD"),
    ("Chad", "USD"),
    ("Comoros", "USD"),
    ("Congo, Democratic Republic of the (Kinshasa)", "USD"),
    ("Congo, Republic of the (Brazzaville)", "USD"),
    ("Costa Rica", "USD"),
    ("Cote D'Ivoire", "USD"),
    ("Djibouti", "USD"),
    ("Dominica", "USD"),
    ("Dominican Republic", "USD"),
    ("Ecuador", "USD"),
    ("El Salvador", "USD"),
    ("Equatorial Guinea", "USD"),
    ("Eritrea", "USD"),
    ("Eswatini", "USD"),
    ("Fiji", "USD"),
    ("Gabon", "USD"),
    ("Gambia", "USD"),
    ("Georgia", "USD"),
    ("Ghana", "USD"),
    ("Grenada", "USD"),
    ("Guatemala", "USD"),
    ("Guinea", "USD"),
    ("Guinea-Bissau", "USD"),
    ("Guyana", "USD"),
    ("Haiti", "USD"),
    ("Honduras", "USD"),
    ("Iraq", "USD"),
    ("Jamaica", "USD"),
    ("Jordan", "USD"),
    ("Kuwait", "USD"),
    ("Kyrgyzstan", "USD"),
    ("Laos", "USD"),
    ("Lebanon", "USD"),
    ("Liberia", "USD"),
    ("Libya", "USD"),
    ("Macau", "USD"),
    ("Madagascar", "USD"),
    ("Malawi", "USD"),
    ("Maldives", "USD"),
    ("Mali", "USD"),
    ("Mauritania", "USD"),
    ("Mauritius", "USD"),
    ("Micronesia", "USD"),
    ("Moldova", "USD"),
    ("Mongolia", "USD"),
    ("Montserrat", "USD"),
    ("Morocco", "USD"),
    ("Mozambique", "USD"),
    ("Myanmar", "USD"),
    ("Namibia", "USD"),
    ("Nauru", "USD"),
    ("Nepal", "USD"),
    ("Nicaragua", "USD"),
    ("Niger", "USD"),
    ("North Macedonia", "USD"),
    ("Oman", "USD"),
    ("Palau", "USD"),
    ("Panama", "USD"),
    ("Papua New Guinea", "USD"),
    ("Paraguay", "USD"),
    ("Qatar", "USD"),
    ("Rwanda", "USD"),
    ("Samoa", "USD"),
    ("São Tomé and Príncipe", "USD"),
    ("Senegal", "USD"),
    ("Seychelles", "USD"),
    ("Sierra Leone", "USD"),
    ("Solomon Islands", "USD"),
    ("Somalia", "USD"),
    ("Somolia", "USD"), // misspelled on the pricing page
    ("Sri Lanka", "USD"),
    ("St. Kitts and Nevis", "USD"),
    ("St. Lucia", "USD"),
    ("St. Vincent and the Grenadines", "USD"),
    ("Suriname", "USD"),
    ("Tajikistan", "USD"),
    ("Tonga", "USD"),
    ("Trinidad and Tobago", "USD"),
    ("Tunisia", "USD"),
    ("Turkmenistan", "USD"),
    ("Turks and Caicos Islands", "USD"),
    ("Uganda", "USD"),
    ("Ukraine", "USD"),
    ("Uruguay", "USD"),
    ("Uzbekistan", "USD"),
    ("Vanuatu", "USD"),
    ("Venezuela", "USD"),
    ("Yemen", "USD"),
    ("Zambia", "USD"),
    ("Zimbabwe", "USD"),
    // Priced in EUR
    ("Austria", "EUR"),
    ("Belgium", "EUR"),
    ("Bosnia and Herzegovina", "EUR"),
    ("Central African Republic", "EUR"),
    ("Croatia", "EUR"),
    ("Cyprus", "EUR"),
    ("Estonia", "EUR"),
    ("Finland", "EUR"),
    ("France", "EUR"),
    ("Germany", "EUR"),
    ("Greece", "EUR"),
    ("Ireland", "EUR"),
    ("Italy", "EUR"),
    ("Kosovo", "EUR"),
    ("Latvia", "EUR"),
    ("Lithuania", "EUR"),
    ("Luxembourg", "EUR"),
    ("Malta", "EUR"),
    ("Monaco", "EUR"),
    ("Montenegro", "EUR"),
    ("Netherlands", "EUR"),
    ("Portugal", "EUR"),
    ("San Marino", "EUR"),
    ("Serbia", "EUR"),
    ("Slovakia", "EUR"),
    ("Slovenia", "EUR"),
    ("Spain", "EUR"),
    ("Togo", "EUR"),
    ("Vatican City", "EUR"),
    // Priced in GBP
    ("United Kingdom", "GBP"),
    ("Gibraltar", "GBP"),
    // Local currencies
    ("Australia", "AUD"),
    ("Bangladesh", "BDT"),
    ("Brazil", "BRL"),
    ("Bulgaria", "BGN"),
    ("Canada", "CAD"),
    ("Chile", "CLP"),
    ("Colombia", "COP"),
    ("Czech Republic", "CZK"),
    ("Denmark", "DKK"),
    ("Egypt", "EGP"),
    ("Hong Kong", "HKD"),
    ("Hungary", "HUF"),
    ("Iceland", "ISK"),
    ("India", "INR"),
    ("Indonesia", "IDR"),
    ("Israel", "ILS"),
    ("Japan", "JPY"),
    ("Kazakhstan", "KZT"),
    ("Kenya", "KES"),
    ("Liechtenstein", "CHF"),
    ("Malaysia", "MYR"),
    ("Mexico", "MXN"),
    ("New Zealand", "NZD"),
    ("Nigeria", "NGN"),
    ("Norway", "NOK"),
    ("Pakistan", "PKR"),
    ("Peru", "PEN"),
    ("Philippines", "PHP"),
    ("Poland", "PLN"),
    ("Romania", "RON"),
    ("Saudi Arabia", "SAR"),
    ("Singapore", "SGD"),
    ("South Africa", "ZAR"),
    ("South Korea", "KRW"),
    ("Sweden", "SEK"),
    ("Switzerland", "CHF"),
    ("Taiwan", "TWD"),
    ("Tanzania", "TZS"),
    ("Thailand", "THB"),
    ("Turkey", "TRY"),
    ("United Arab Emirates (UAE)", "AED"),
    ("Vietnam", "VND"),
];

static LOOKUP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| COUNTRY_CURRENCIES.iter().copied().collect());

/// Returns the pricing currency for a country name.
///
/// Exact match only: no case folding, whitespace trimming or diacritic
/// normalization.
pub fn resolve(country: &str) -> Option<&'static str> {
    LOOKUP.get(country).copied()
}

/// Returns every distinct currency code in the table, sorted.
pub fn currencies() -> Vec<&'static str> {
    COUNTRY_CURRENCIES.iter().map(|(_, code)| *code).collect::<BTreeSet<_>>().into_iter().collect()
}

/// Returns true if the code is one of the table's currencies.
pub fn is_known_currency(code: &str) -> bool {
    COUNTRY_CURRENCIES.iter().any(|(_, c)| *c == code)
}
