//! Country dial codes used by the phone entry step.

use serde::Deserialize;

/// One selectable dial code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCode {
    pub name: String,
    /// ISO 3166-1 alpha-2.
    pub code: String,
    /// Flag image URL.
    pub flag: String,
    pub dial_code: String,
}

impl CountryCode {
    /// Regional-indicator emoji for `code`, or an empty string when it is not two letters.
    pub fn flag_emoji(&self) -> String {
        if self.code.len() != 2 || !self.code.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return String::new();
        }

        self.code
            .to_ascii_uppercase()
            .chars()
            .filter_map(|ch| char::from_u32(0x1F1E6 + (ch as u32 - 'A' as u32)))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCountry {
    #[serde(default)]
    pub name: RawCountryName,
    #[serde(default)]
    pub cca2: String,
    #[serde(default)]
    pub idd: RawIdd,
    #[serde(default)]
    pub flags: RawFlags,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCountryName {
    #[serde(default)]
    pub common: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawIdd {
    pub root: Option<String>,
    #[serde(default)]
    pub suffixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawFlags {
    #[serde(default)]
    pub svg: String,
}

/// Builds the dial-code catalog: entries without a root are skipped, the rest
/// are sorted by dial code and only the first country per dial code is kept.
pub fn build_catalog(raw: Vec<RawCountry>) -> Vec<CountryCode> {
    let mut parsed: Vec<CountryCode> = raw
        .into_iter()
        .filter_map(|country| {
            let root = country.idd.root.filter(|root| !root.is_empty())?;
            let suffix = country.idd.suffixes.into_iter().next().unwrap_or_default();

            Some(CountryCode {
                name: country.name.common,
                code: country.cca2,
                flag: country.flags.svg,
                dial_code: format!("{root}{suffix}"),
            })
        })
        .collect();

    parsed.sort_by(|a, b| a.dial_code.cmp(&b.dial_code));
    parsed.dedup_by(|later, earlier| later.dial_code == earlier.dial_code);
    parsed
}

/// True when `dial_code` appears in the catalog.
pub fn is_known_dial_code(catalog: &[CountryCode], dial_code: &str) -> bool {
    catalog.iter().any(|country| country.dial_code == dial_code)
}
