// tests/properties.rs

use std::path::PathBuf;
use std::time::{Duration, Instant};

use proptest::prelude::*;

use livereload::watch::{is_watched, should_trigger, DebounceGate, ExtensionFilter};

fn extension() -> impl Strategy<Value = String> {
    "\\.[a-z]{1,4}"
}

proptest! {
    #[test]
    fn watched_iff_some_extension_is_a_suffix(
        stem in "[a-zA-Z0-9_/]{0,12}",
        tail in "[a-z.]{0,6}",
        exts in proptest::collection::vec(extension(), 1..4),
    ) {
        let path = PathBuf::from(format!("/{stem}{tail}"));
        let expected = exts.iter().any(|e| path.to_string_lossy().ends_with(e.as_str()));
        prop_assert_eq!(is_watched(&path, &exts), expected);
        prop_assert_eq!(ExtensionFilter::new(exts.clone()).is_watched(&path), expected);
    }

    #[test]
    fn empty_extension_set_means_the_default(name in "[a-z]{1,8}", ext in extension()) {
        let filter = ExtensionFilter::new(Vec::<String>::new());
        let path = PathBuf::from(format!("/app/{name}{ext}"));
        prop_assert_eq!(filter.is_watched(&path), ext == ".go");
    }

    #[test]
    fn matching_is_case_sensitive(name in "[a-z]{1,8}") {
        let exts = vec![".go".to_string()];
        let upper = PathBuf::from(format!("/app/{name}.GO"));
        let lower = PathBuf::from(format!("/app/{name}.go"));
        prop_assert!(!is_watched(&upper, &exts));
        prop_assert!(is_watched(&lower, &exts));
    }

    #[test]
    fn second_event_is_accepted_iff_the_window_elapsed(
        window_ms in 0u64..2_000,
        gap_ms in 0u64..4_000,
    ) {
        let window = Duration::from_millis(window_ms);
        let t1 = Instant::now();
        let t2 = t1 + Duration::from_millis(gap_ms);

        prop_assert_eq!(should_trigger(t2, Some(t1), window), gap_ms >= window_ms);

        let mut gate = DebounceGate::new(window);
        prop_assert!(gate.admit(t1));
        prop_assert_eq!(gate.admit(t2), gap_ms >= window_ms);
    }

    #[test]
    fn suppressed_events_do_not_extend_the_window(
        window_ms in 1u64..1_000,
        burst in proptest::collection::vec(0u64..1_000, 1..20),
    ) {
        let window = Duration::from_millis(window_ms);
        let t0 = Instant::now();
        let mut gate = DebounceGate::new(window);
        prop_assert!(gate.admit(t0));

        // Everything strictly inside the window is dropped ...
        for offset in burst.iter().map(|o| o % window_ms) {
            prop_assert!(!gate.admit(t0 + Duration::from_millis(offset)));
        }
        // ... and the window is still measured from the first trigger.
        prop_assert!(gate.admit(t0 + window));
    }
}
