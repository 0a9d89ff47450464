//! Static lookup tables: country aliases and place spelling fixes.
//!
//! Both tables are plain `(key, value)` data so operators can extend them
//! without touching the resolver.

use serde::Serialize;

// ─── Country aliases ────────────────────────────────────────────

/// Lowercase, whitespace-stripped country tokens → ISO 3166-1 alpha-2 (lowercase).
///
/// Only used to narrow provider results. Countries missing here are still
/// geocoded, just without a `countrycodes` restriction.
pub const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("egypt", "eg"),
    ("misr", "eg"),
    ("france", "fr"),
    ("unitedstates", "us"),
    ("unitedstatesofamerica", "us"),
    ("usa", "us"),
    ("us", "us"),
    ("america", "us"),
    ("unitedkingdom", "gb"),
    ("uk", "gb"),
    ("greatbritain", "gb"),
    ("england", "gb"),
    ("scotland", "gb"),
    ("wales", "gb"),
    ("ireland", "ie"),
    ("spain", "es"),
    ("españa", "es"),
    ("espana", "es"),
    ("portugal", "pt"),
    ("italy", "it"),
    ("italia", "it"),
    ("greece", "gr"),
    ("croatia", "hr"),
    ("malta", "mt"),
    ("cyprus", "cy"),
    ("turkey", "tr"),
    ("türkiye", "tr"),
    ("germany", "de"),
    ("netherlands", "nl"),
    ("norway", "no"),
    ("sweden", "se"),
    ("iceland", "is"),
    ("jordan", "jo"),
    ("israel", "il"),
    ("saudiarabia", "sa"),
    ("uae", "ae"),
    ("unitedarabemirates", "ae"),
    ("oman", "om"),
    ("sudan", "sd"),
    ("djibouti", "dj"),
    ("southafrica", "za"),
    ("mozambique", "mz"),
    ("tanzania", "tz"),
    ("kenya", "ke"),
    ("seychelles", "sc"),
    ("mauritius", "mu"),
    ("maldives", "mv"),
    ("srilanka", "lk"),
    ("india", "in"),
    ("thailand", "th"),
    ("indonesia", "id"),
    ("malaysia", "my"),
    ("philippines", "ph"),
    ("vietnam", "vn"),
    ("japan", "jp"),
    ("china", "cn"),
    ("southkorea", "kr"),
    ("palau", "pw"),
    ("micronesia", "fm"),
    ("papuanewguinea", "pg"),
    ("australia", "au"),
    ("newzealand", "nz"),
    ("fiji", "fj"),
    ("canada", "ca"),
    ("mexico", "mx"),
    ("méxico", "mx"),
    ("belize", "bz"),
    ("honduras", "hn"),
    ("costarica", "cr"),
    ("cuba", "cu"),
    ("bahamas", "bs"),
    ("caymanislands", "ky"),
    ("bonaire", "bq"),
    ("curacao", "cw"),
    ("curaçao", "cw"),
    ("brazil", "br"),
    ("brasil", "br"),
    ("ecuador", "ec"),
    ("georgia", "ge"),
];

/// Trim, lowercase and collapse internal whitespace.
pub fn normalize_country(country: &str) -> String {
    country
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Look up the ISO alpha-2 hint for a free-text country name.
pub fn country_hint(country: &str) -> Option<&'static str> {
    let key: String = normalize_country(country)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    if key.is_empty() {
        return None;
    }
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, code)| *code)
}

/// One row of the alias table, as exposed by the HTTP API.
#[derive(Debug, Clone, Serialize)]
pub struct CountryAlias {
    pub name: &'static str,
    pub code: String,
}

/// The full alias table with uppercase codes (for pick lists / API).
pub fn country_alias_list() -> Vec<CountryAlias> {
    COUNTRY_ALIASES
        .iter()
        .map(|&(name, code)| CountryAlias {
            name,
            code: code.to_uppercase(),
        })
        .collect()
}

// ─── Place spellings ────────────────────────────────────────────

/// Whole-phrase variants (lowercase, hyphens as spaces) → canonical place.
pub const PLACE_PHRASES: &[(&str, &str)] = &[
    ("sharm el sheik", "Sharm El Sheikh"),
    ("sharm el sheikh", "Sharm El Sheikh"),
    ("sharm elsheikh", "Sharm El Sheikh"),
    ("sharm elsheik", "Sharm El Sheikh"),
    ("sharm al sheikh", "Sharm El Sheikh"),
    ("sharm", "Sharm El Sheikh"),
    ("hurgada", "Hurghada"),
    ("hurghada", "Hurghada"),
    ("al ghardaqa", "Hurghada"),
    ("marsa allam", "Marsa Alam"),
    ("marsa alam", "Marsa Alam"),
    ("elgouna", "El Gouna"),
    ("el gouna", "El Gouna"),
    ("akaba", "Aqaba"),
    ("koh tao", "Ko Tao"),
    ("ko tao", "Ko Tao"),
    ("koh lanta", "Ko Lanta"),
    ("ko lanta", "Ko Lanta"),
    ("gili t", "Gili Trawangan"),
    ("gili trawangan", "Gili Trawangan"),
    ("cozumel island", "Cozumel"),
];

/// Single-word misspellings → canonical word, applied when no phrase matched.
pub const PLACE_WORD_FIXES: &[(&str, &str)] = &[
    ("sheik", "Sheikh"),
    ("shaikh", "Sheikh"),
    ("hurgada", "Hurghada"),
];

/// Canonicalize a user-typed place before it is sent to the provider.
///
/// Idempotent: feeding the output back in returns it unchanged.
pub fn normalize_place(place: &str) -> String {
    let collapsed = place.split_whitespace().collect::<Vec<_>>().join(" ");
    let key = collapsed
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if let Some((_, canonical)) = PLACE_PHRASES.iter().find(|(variant, _)| *variant == key) {
        return (*canonical).to_string();
    }

    collapsed
        .split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            PLACE_WORD_FIXES
                .iter()
                .find(|(variant, _)| *variant == lower)
                .map_or_else(|| word.to_string(), |(_, fixed)| (*fixed).to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}
