//! Host specification expansion.
//!
//! The configuration gives target hosts as a comma separated string where each token is either
//! a plain address or an IPv4 range `A.B.C.D-N`, meaning the last octet goes from `D` to `N`
//! inclusive.

use tracing::warn;

/// Expands a comma separated host specification into the ordered list of addresses to visit.
///
/// Tokens without a dash are kept as is (whitespace included, callers trim them at point of
/// use). Range tokens whose base is not a four octets address, or whose bounds are not numbers,
/// contribute nothing.
pub fn expand_host_spec(spec: &str) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();

    for token in spec.split(',') {
        if !token.contains('-') {
            hosts.push(token.to_string());
            continue;
        }

        match expand_range(token) {
            Some(range) => hosts.extend(range),
            None => {
                warn!("host range {:?} is malformed, skipping it", token.trim());
            }
        }
    }

    hosts
}

fn expand_range(token: &str) -> Option<Vec<String>> {
    let mut parts = token.split('-');
    let base = parts.next()?.trim();
    let last = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }

    let octets: Vec<u8> = base
        .split('.')
        .map(|octet| octet.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .ok()?;
    if octets.len() != 4 {
        return None;
    }
    let last = last.parse::<u8>().ok()?;

    Some(
        (octets[3]..=last)
            .map(|i| format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], i))
            .collect(),
    )
}
