//! Region → temperature symbol.
//!
//! Only three regions get Fahrenheit. This is a fixed list, not a
//! locale-aware unit table, and stays that way for compatibility.

pub const CELSIUS: &str = "°C";
pub const FAHRENHEIT: &str = "°F";

const FAHRENHEIT_REGIONS: [&str; 3] = ["US", "LR", "MM"];

/// Temperature symbol for a region code such as "US" or "DE".
pub fn unit_symbol(region: &str) -> &'static str {
    if FAHRENHEIT_REGIONS.contains(&region) {
        FAHRENHEIT
    } else {
        CELSIUS
    }
}

/// Extract the region part of a POSIX or BCP 47 locale tag.
///
/// `en_US.UTF-8` → `US`, `pt-BR` → `BR`, `C` → `None`.
pub fn region_from_locale(tag: &str) -> Option<String> {
    let base = tag.split(&['.', '@'][..]).next().unwrap_or_default();
    let region = base.split(&['_', '-'][..]).nth(1)?;

    if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(region.to_ascii_uppercase())
    } else {
        None
    }
}

/// Region of the running process, from `LC_ALL`, `LC_MESSAGES` or `LANG`.
pub fn detect_region() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter(|value| !value.is_empty())
        .find_map(|value| region_from_locale(&value))
}
