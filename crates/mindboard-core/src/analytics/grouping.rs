//! Generic grouping reductions: counts, means and percentages by key
//!
//! Category axes need a fixed, non-alphabetic order, so every reduction
//! accepts an optional explicit key order.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Count of rows sharing a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCount<K> {
    pub key: K,
    pub count: usize,
}

/// Mean of a value over rows sharing a key (rounded to 3 decimals)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMean<K> {
    pub key: K,
    pub mean: f64,
}

/// Share of rows sharing a key, in percent (rounded to 2 decimals)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyShare<K> {
    pub key: K,
    pub count: usize,
    pub percent: f64,
}

/// Round half away from zero to `digits` decimals
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Keys in output order: the explicit order first, then unlisted keys by first appearance
fn ordered_keys<K: Eq + Hash + Clone>(seen: &[K], order: Option<&[K]>) -> Vec<K> {
    match order {
        Some(order) => {
            let mut keys = order.to_vec();
            keys.extend(seen.iter().filter(|k| !order.contains(k)).cloned());
            keys
        }
        None => seen.to_vec(),
    }
}

/// Group rows by key, keeping first-appearance order
fn group<'a, T, K, F>(rows: &'a [T], key_fn: F) -> (Vec<K>, HashMap<K, Vec<&'a T>>)
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut seen = Vec::new();
    let mut groups: HashMap<K, Vec<&T>> = HashMap::new();
    for row in rows {
        let key = key_fn(row);
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                seen.push(key);
                Vec::new()
            })
            .push(row);
    }
    (seen, groups)
}

/// Count rows per key.
///
/// With an explicit `order`, every ordered key is reported in that order,
/// zero-filled when absent; keys outside the order follow in first-seen
/// order. Without one, keys appear in first-seen order.
pub fn count_by_key<T, K, F>(rows: &[T], key_fn: F, order: Option<&[K]>) -> Vec<KeyCount<K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let (seen, groups) = group(rows, key_fn);
    ordered_keys(&seen, order)
        .into_iter()
        .map(|key| {
            let count = groups.get(&key).map_or(0, Vec::len);
            KeyCount { key, count }
        })
        .collect()
}

/// Mean of `value_fn` per key, rounded to 3 decimals.
///
/// A group with no members has no mean and is omitted (a gap, never 0).
pub fn mean_by_key<T, K, F, V>(
    rows: &[T],
    key_fn: F,
    value_fn: V,
    order: Option<&[K]>,
) -> Vec<KeyMean<K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
    V: Fn(&T) -> f64,
{
    let (seen, groups) = group(rows, key_fn);
    ordered_keys(&seen, order)
        .into_iter()
        .filter_map(|key| {
            let members = groups.get(&key).filter(|m| !m.is_empty())?;
            let sum: f64 = members.iter().map(|row| value_fn(row)).sum();
            let mean = round_to(sum / members.len() as f64, 3);
            mean.is_finite().then_some(KeyMean { key, mean })
        })
        .collect()
}

/// Percentage of rows per key (2 decimals), same ordering rules as `count_by_key`.
///
/// With no rows every share is 0.
pub fn percent_by_key<T, K, F>(rows: &[T], key_fn: F, order: Option<&[K]>) -> Vec<KeyShare<K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let total = rows.len();
    count_by_key(rows, key_fn, order)
        .into_iter()
        .map(|kc| KeyShare {
            percent: if total == 0 {
                0.0
            } else {
                round_to(kc.count as f64 / total as f64 * 100.0, 2)
            },
            key: kc.key,
            count: kc.count,
        })
        .collect()
}
