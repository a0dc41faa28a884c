//! Tests for interface filtering.

use super::filter::{FilterChain, FilteredFetcher, InterfaceFilter, NameRegexFilter};
use super::{AdapterSnapshot, AddressFetcher, FetchError, StaticFetcher};

fn adapter(name: &str) -> AdapterSnapshot {
    AdapterSnapshot::new(name, vec!["10.0.0.1".parse().unwrap()])
}

fn regex(pattern: &str) -> NameRegexFilter {
    NameRegexFilter::new(pattern).unwrap()
}

mod name_regex_filter {
    use super::*;

    #[test]
    fn anchored_prefix() {
        let filter = regex(r"^eth");

        assert!(filter.matches("eth0"));
        assert!(!filter.matches("veth0"));
        assert!(!filter.matches("wlan0"));
    }

    #[test]
    fn unanchored_matches_anywhere() {
        assert!(regex("eth").matches("veth1a2b"));
    }

    #[test]
    fn invalid_pattern_is_error() {
        assert!(NameRegexFilter::new("[unclosed").is_err());
    }

    #[test]
    fn displays_source_pattern() {
        let filter = regex(r"^en\d+");

        assert_eq!(filter.as_str(), r"^en\d+");
        assert_eq!(filter.to_string(), r"^en\d+");
    }
}

mod filter_chain {
    use super::*;

    #[test]
    fn empty_chain_admits_everything() {
        let chain = FilterChain::new();

        assert!(chain.is_empty());
        assert!(chain.matches("anything"));
    }

    #[test]
    fn exclude_rejects_matching() {
        let chain = FilterChain::new().exclude(regex("^docker"));

        assert!(!chain.matches("docker0"));
        assert!(chain.matches("eth0"));
    }

    #[test]
    fn any_include_admits() {
        let chain = FilterChain::new()
            .include(regex("^eth"))
            .include(regex("^wlan"));

        assert!(chain.matches("eth0"));
        assert!(chain.matches("wlan0"));
        assert!(!chain.matches("tun0"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let chain = FilterChain::new()
            .include(regex("^eth"))
            .exclude(regex("^eth1$"));

        assert!(chain.matches("eth0"));
        assert!(!chain.matches("eth1"));
    }

    #[test]
    fn len_counts_both_kinds() {
        let chain = FilterChain::new()
            .include(regex("a"))
            .exclude(regex("b"))
            .exclude(regex("c"));

        assert_eq!(chain.len(), 3);
        assert!(!chain.is_empty());
    }

    #[test]
    fn debug_shows_patterns() {
        let chain = FilterChain::new().exclude(regex("^docker"));
        assert!(format!("{chain:?}").contains("^docker"));
    }
}

mod filtered_fetcher {
    use super::*;

    struct FailingFetcher;

    impl AddressFetcher for FailingFetcher {
        fn fetch(&self) -> Result<Vec<AdapterSnapshot>, FetchError> {
            Err(FetchError::unavailable("boom"))
        }
    }

    #[test]
    fn drops_filtered_interfaces_and_keeps_order() {
        let inner = StaticFetcher::new(vec![
            adapter("wlan0"),
            adapter("docker0"),
            adapter("veth9"),
            adapter("eth0"),
        ]);
        let chain = FilterChain::new()
            .exclude(regex("^docker"))
            .exclude(regex("^veth"));
        let fetcher = FilteredFetcher::new(inner, chain);

        let names: Vec<_> = fetcher
            .fetch()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();

        assert_eq!(names, ["wlan0", "eth0"]);
        assert_eq!(fetcher.filter().len(), 2);
    }

    #[test]
    fn propagates_inner_errors() {
        let fetcher = FilteredFetcher::new(FailingFetcher, FilterChain::new());
        assert!(fetcher.fetch().is_err());
    }
}
