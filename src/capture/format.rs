//! Recording format selection
//!
//! The recorder asks the host which container/codec combinations it can
//! encode and takes the first one from an ordered preference list. Modern
//! efficient codecs come first, the list then falls back toward maximal
//! compatibility.

/// Default MIME type preference list, highest preference first.
pub const DEFAULT_MIME_TYPES: [&str; 7] = [
    "video/webm;codecs=vp9",
    "video/webm",
    "video/vp8",
    "video/webm;codecs=vp8",
    "video/webm;codecs=daala",
    "video/webm;codecs=h264",
    "video/mpeg",
];

/// Default preference list as owned strings, for configuration defaults
pub fn default_mime_types() -> Vec<String> {
    DEFAULT_MIME_TYPES.iter().map(|m| m.to_string()).collect()
}

/// Pick the first candidate the probe reports as supported.
///
/// Candidates are checked in order and probing stops at the first hit.
pub fn select_mime_type<'a, I, F>(candidates: I, mut is_supported: F) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
    F: FnMut(&str) -> bool,
{
    candidates.into_iter().find(|candidate| {
        let supported = is_supported(*candidate);
        tracing::debug!(mime_type = %candidate, supported, "Probed recording format");
        supported
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_first_supported() {
        let selected = select_mime_type(["fmt-a", "fmt-b"], |m| m == "fmt-b");
        assert_eq!(selected, Some("fmt-b"));
    }

    #[test]
    fn test_none_supported() {
        let selected = select_mime_type(DEFAULT_MIME_TYPES, |_| false);
        assert_eq!(selected, None);
    }

    #[test]
    fn test_preference_order_wins_over_probe_order() {
        // Both vp8 variants are supported; the earlier list entry must win.
        let selected = select_mime_type(DEFAULT_MIME_TYPES, |m| {
            m == "video/webm;codecs=vp8" || m == "video/vp8" || m == "video/mpeg"
        });
        assert_eq!(selected, Some("video/vp8"));
    }

    #[test]
    fn test_stops_probing_after_hit() {
        let mut probed = Vec::new();
        let selected = select_mime_type(DEFAULT_MIME_TYPES, |m| {
            probed.push(m.to_string());
            m == "video/webm"
        });
        assert_eq!(selected, Some("video/webm"));
        assert_eq!(probed, vec!["video/webm;codecs=vp9", "video/webm"]);
    }

    #[test]
    fn test_empty_candidates() {
        let candidates: Vec<&str> = Vec::new();
        assert_eq!(select_mime_type(candidates, |_| true), None);
    }
}
