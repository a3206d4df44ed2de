//! Small value generators shared by the document shapes.

use chrono::{DateTime, Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER_ALNUM: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `n` random ASCII letters, mixed case.
pub fn letters<R: Rng>(rng: &mut R, n: usize) -> String {
    sample_from(rng, LETTERS, n)
}

/// `prefix` followed by `n` lowercase letters or digits.
pub fn tagged<R: Rng>(rng: &mut R, prefix: &str, n: usize) -> String {
    format!("{prefix}{}", sample_from(rng, LOWER_ALNUM, n))
}

fn sample_from<R: Rng>(rng: &mut R, alphabet: &[u8], n: usize) -> String {
    (0..n)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// A version 4 UUID drawn from `rng`.
pub fn uuid_v4<R: Rng>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

/// Pick one entry of `items`; empty slices yield `""`.
pub fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Second-precision UTC timestamp up to `max_minutes` before `anchor`.
pub fn timestamp_before<R: Rng>(rng: &mut R, anchor: DateTime<Utc>, max_minutes: i64) -> String {
    let back = rng.random_range(0..=max_minutes.max(0));
    (anchor - Duration::minutes(back))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// RFC 3339 date somewhere in the `years` years before `anchor`.
pub fn date_before<R: Rng>(rng: &mut R, anchor: DateTime<Utc>, years: i64) -> String {
    let span = Duration::days(365 * years.max(0)).num_seconds();
    let back = rng.random_range(0..=span);
    (anchor - Duration::seconds(back)).to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// `https://site<...>.com/page<...>`.
pub fn url<R: Rng>(rng: &mut R) -> String {
    format!(
        "https://{}.com/{}",
        tagged(rng, "site", 5),
        tagged(rng, "page", 10)
    )
}

/// A full URL, an internal path or an empty referrer.
pub fn referrer<R: Rng>(rng: &mut R) -> String {
    match rng.random_range(0..3) {
        0 => url(rng),
        1 => "/internal/path".to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
pub fn is_uuid_v4(s: &str) -> bool {
    uuid::Uuid::parse_str(s).is_ok_and(|u| u.get_version_num() == 4)
}
