//! IP uncloaking helper.
//!
//! The service hides viewer IPs from moderators below a rank threshold by
//! cloaking octets: a cloaked octet is the base-32 rendering of the value
//! (digits, then lowercase `a`–`v`), which never collides with a plain
//! decimal octet for values above 9. Plain decimal groups and the trailing
//! wildcard marker pass through untouched.

/// Derive the uncloaked form of a cloaked IP.
///
/// Pure projection: groups that already look like decimal octets are kept,
/// cloaked groups are decoded from base 32, and anything unrecognizable is
/// left as-is. The caller decides what to do with partially decoded results.
pub fn uncloak_ip(ip: &str) -> String {
    ip.split('.')
        .map(uncloak_group)
        .collect::<Vec<_>>()
        .join(".")
}

fn uncloak_group(group: &str) -> String {
    if group == "*" || group.bytes().all(|b| b.is_ascii_digit()) {
        return group.to_owned();
    }
    match u32::from_str_radix(group, 32) {
        Ok(octet) if octet <= 255 => octet.to_string(),
        _ => group.to_owned(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ip_passes_through() {
        assert_eq!(uncloak_ip("10.0.0.1"), "10.0.0.1");
    }

    #[test]
    fn cloaked_octets_are_decoded() {
        // 'a' = 10, 'vv' = 31 * 32 + 31 = 1023 (out of range, kept)
        assert_eq!(uncloak_ip("a.b.c.d"), "10.11.12.13");
        assert_eq!(uncloak_ip("192.168.7v.1"), "192.168.255.1");
    }

    #[test]
    fn wildcard_suffix_is_preserved() {
        assert_eq!(uncloak_ip("a.b.*"), "10.11.*");
    }

    #[test]
    fn unrecognizable_groups_are_kept() {
        assert_eq!(uncloak_ip("zz.1.2.3"), "zz.1.2.3");
        assert_eq!(uncloak_ip("vv.1.2.3"), "vv.1.2.3");
    }
}
