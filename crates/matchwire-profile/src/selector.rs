//! Maps a provider identity to a registry profile.

use matchwire_core::constants::MAX_PROVIDER_NAME_LEN;

use crate::registry::ProfileId;

/// Profile compiled in through a `profile-*` cargo feature, if any.
///
/// When set, startup uses it directly and never consults the provider.
pub const BUILD_PROFILE: Option<ProfileId> = if cfg!(feature = "profile-default") {
    Some(ProfileId::Default)
} else if cfg!(feature = "profile-minimal") {
    Some(ProfileId::Minimal)
} else if cfg!(feature = "profile-psm2") {
    Some(ProfileId::Psm2)
} else if cfg!(feature = "profile-sockets") {
    Some(ProfileId::Sockets)
} else if cfg!(feature = "profile-bgq") {
    Some(ProfileId::Bgq)
} else if cfg!(feature = "profile-rxm") {
    Some(ProfileId::Rxm)
} else {
    None
};

const EXACT_NAMES: [(&str, ProfileId); 5] = [
    ("psm2", ProfileId::Psm2),
    ("sockets", ProfileId::Sockets),
    ("bgq", ProfileId::Bgq),
    ("minimal", ProfileId::Minimal),
    ("default", ProfileId::Default),
];

// Layered providers report names such as "verbs;ofi_rxm".
const CONTAINS_NAMES: [(&str, ProfileId); 1] = [("ofi_rxm", ProfileId::Rxm)];

fn truncate(name: &str) -> &str {
    if name.len() <= MAX_PROVIDER_NAME_LEN {
        return name;
    }
    let mut end = MAX_PROVIDER_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Selects the profile for `provider_name`.
///
/// Exact family names win, then naming-convention substrings; anything else,
/// including no name at all, resolves to [`ProfileId::Default`]. Never fails.
pub fn select(provider_name: Option<&str>) -> ProfileId {
    let Some(name) = provider_name else {
        return ProfileId::Default;
    };
    let name = truncate(name);

    if let Some((_, id)) = EXACT_NAMES.iter().find(|(family, _)| *family == name) {
        return *id;
    }
    if let Some((_, id)) = CONTAINS_NAMES.iter().find(|(family, _)| name.contains(family)) {
        return *id;
    }

    tracing::debug!("No capability profile for provider '{}', using default", name);
    ProfileId::Default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_names() {
        assert_eq!(select(Some("psm2")), ProfileId::Psm2);
        assert_eq!(select(Some("sockets")), ProfileId::Sockets);
        assert_eq!(select(Some("bgq")), ProfileId::Bgq);
        assert_eq!(select(Some("minimal")), ProfileId::Minimal);
    }

    #[test]
    fn test_substring_family() {
        assert_eq!(select(Some("ofi_rxm")), ProfileId::Rxm);
        assert_eq!(select(Some("verbs;ofi_rxm")), ProfileId::Rxm);
        assert_eq!(select(Some("tcp;ofi_rxm")), ProfileId::Rxm);
    }

    #[test]
    fn test_fallback_to_default() {
        assert_eq!(select(None), ProfileId::Default);
        assert_eq!(select(Some("unknown-xyz")), ProfileId::Default);
        assert_eq!(select(Some("")), ProfileId::Default);
        // Exact names are not prefixes.
        assert_eq!(select(Some("sockets-v2")), ProfileId::Default);
        assert_eq!(select(Some("PSM2")), ProfileId::Default);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let first = select(Some("sockets-v2"));
        for _ in 0..100 {
            assert_eq!(select(Some("sockets-v2")), first);
        }
    }

    #[test]
    fn test_long_names_are_truncated() {
        let hidden = format!("{}ofi_rxm", "x".repeat(MAX_PROVIDER_NAME_LEN));
        assert_eq!(select(Some(&hidden)), ProfileId::Default);

        let visible = format!("ofi_rxm{}", "x".repeat(MAX_PROVIDER_NAME_LEN));
        assert_eq!(select(Some(&visible)), ProfileId::Rxm);

        let multibyte = "é".repeat(MAX_PROVIDER_NAME_LEN);
        assert_eq!(select(Some(&multibyte)), ProfileId::Default);
    }
}
