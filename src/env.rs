//! Environment-variable configuration helpers.
//!
//! Size-like values accept `k`/`m`/`g` suffixes (optionally followed by `b`),
//! e.g. `HOTLAYOUT_HOT_SET_CUTOFF=512k`.

fn read_scaled(var: &str) -> Option<(f64, usize)> {
    let raw = std::env::var(var).ok()?;
    if raw.is_empty() {
        return None;
    }

    let mut value = raw.as_str();
    if value.len() > 1 && (value.ends_with('b') || value.ends_with('B')) {
        value = &value[..value.len() - 1];
    }

    let factor = match value.as_bytes().last().copied() {
        Some(b'g') | Some(b'G') => 1024 * 1024 * 1024,
        Some(b'm') | Some(b'M') => 1024 * 1024,
        Some(b'k') | Some(b'K') => 1024,
        _ => 1,
    };

    if factor != 1 {
        value = &value[..value.len() - 1];
    }

    value.parse::<f64>().ok().map(|x| (x, factor))
}

pub fn read_uint_from_env(var: &str) -> Option<usize> {
    read_scaled(var).map(|(value, factor)| value as usize * factor)
}

pub fn read_float_from_env(var: &str) -> Option<f64> {
    read_scaled(var).map(|(value, _)| value)
}
