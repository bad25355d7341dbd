const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];
const OUTLOOK_DOMAINS: &[&str] = &["outlook.com", "hotmail.com", "live.com"];
const ICLOUD_DOMAINS: &[&str] = &["icloud.com", "me.com", "mac.com"];
const YAHOO_DOMAINS: &[&str] = &["yahoo.com", "ymail.com", "rocketmail.com"];

/// Canonical form of a syntactically valid address.
///
/// Lowercases the whole address and strips provider specific aliases
/// (Gmail dots and `+tag`, Outlook/iCloud `+tag`, Yahoo `-tag`). Applying it
/// twice yields the same result as applying it once.
pub fn normalize_email(address: &str) -> String {
    let address = address.trim().to_lowercase();

    let Some((local, domain)) = address.rsplit_once('@') else {
        return address;
    };

    let (canonical_local, canonical_domain) = if GMAIL_DOMAINS.contains(&domain) {
        (strip_tag(local, '+').replace('.', ""), "gmail.com")
    } else if OUTLOOK_DOMAINS.contains(&domain) || ICLOUD_DOMAINS.contains(&domain) {
        (strip_tag(local, '+').to_owned(), domain)
    } else if YAHOO_DOMAINS.contains(&domain) {
        (strip_tag(local, '-').to_owned(), domain)
    } else {
        (local.to_owned(), domain)
    };

    // An alias-only local part would leave nothing behind, keep it as typed.
    if canonical_local.is_empty() {
        return format!("{local}@{canonical_domain}");
    }

    format!("{canonical_local}@{canonical_domain}")
}

fn strip_tag(local: &str, separator: char) -> &str {
    local.split(separator).next().unwrap_or(local)
}
