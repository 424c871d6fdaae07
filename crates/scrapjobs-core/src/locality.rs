//! Remote-work locality detection.
//!
//! Job boards rarely expose "where can I work from" as structured data, so it
//! is inferred from the description: every occurrence of the word "remote"
//! opens a window of [`WINDOW`] words on either side, and known regions,
//! countries, and time zones inside that window are collected.

use std::collections::BTreeSet;

/// Words inspected on each side of a "remote" mention.
pub const WINDOW: usize = 5;

/// `(lowercase words, display form, case-sensitive)`.
///
/// Short codes are matched case-sensitively so "US" is a country but "us" is
/// a pronoun.
const LOCALITIES: &[(&[&str], &str, bool)] = &[
    (&["north", "america"], "North America", false),
    (&["south", "america"], "South America", false),
    (&["latin", "america"], "Latin America", false),
    (&["united", "states"], "United States", false),
    (&["united", "kingdom"], "United Kingdom", false),
    (&["worldwide"], "Worldwide", false),
    (&["anywhere"], "Anywhere", false),
    (&["global"], "Global", false),
    (&["europe"], "Europe", false),
    (&["european"], "Europe", false),
    (&["americas"], "Americas", false),
    (&["asia"], "Asia", false),
    (&["africa"], "Africa", false),
    (&["oceania"], "Oceania", false),
    (&["canada"], "Canada", false),
    (&["mexico"], "Mexico", false),
    (&["brazil"], "Brazil", false),
    (&["argentina"], "Argentina", false),
    (&["germany"], "Germany", false),
    (&["france"], "France", false),
    (&["spain"], "Spain", false),
    (&["portugal"], "Portugal", false),
    (&["italy"], "Italy", false),
    (&["netherlands"], "Netherlands", false),
    (&["poland"], "Poland", false),
    (&["ireland"], "Ireland", false),
    (&["sweden"], "Sweden", false),
    (&["switzerland"], "Switzerland", false),
    (&["india"], "India", false),
    (&["japan"], "Japan", false),
    (&["singapore"], "Singapore", false),
    (&["australia"], "Australia", false),
    (&["us"], "US", true),
    (&["usa"], "USA", true),
    (&["uk"], "UK", true),
    (&["eu"], "EU", true),
    (&["emea"], "EMEA", true),
    (&["apac"], "APAC", true),
    (&["latam"], "LATAM", true),
    (&["utc"], "UTC", true),
    (&["gmt"], "GMT", true),
    (&["cet"], "CET", true),
    (&["cest"], "CEST", true),
    (&["est"], "EST", true),
    (&["edt"], "EDT", true),
    (&["cst"], "CST", true),
    (&["pst"], "PST", true),
    (&["pdt"], "PDT", true),
];

/// Returns the localities mentioned near "remote", space-joined and sorted,
/// or `None` if the description mentions none.
pub fn remote_locality(description: &str) -> Option<String> {
    let words: Vec<&str> = description
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut found = BTreeSet::new();
    for (i, word) in words.iter().enumerate() {
        if !word.eq_ignore_ascii_case("remote") && !word.eq_ignore_ascii_case("remotely") {
            continue;
        }
        let start = i.saturating_sub(WINDOW);
        let end = (i + WINDOW + 1).min(words.len());
        collect_localities(&words[start..end], &mut found);
    }

    if found.is_empty() {
        None
    } else {
        Some(found.into_iter().collect::<Vec<_>>().join(" "))
    }
}

fn collect_localities(window: &[&str], found: &mut BTreeSet<&'static str>) {
    for pos in 0..window.len() {
        for (pattern, display, case_sensitive) in LOCALITIES {
            let Some(candidate) = window.get(pos..pos + pattern.len()) else {
                continue;
            };
            let matched = candidate.iter().zip(pattern.iter()).all(|(word, expected)| {
                if *case_sensitive {
                    *word == expected.to_ascii_uppercase()
                } else {
                    word.eq_ignore_ascii_case(expected)
                }
            });
            if matched {
                found.insert(*display);
            }
        }
    }
}
