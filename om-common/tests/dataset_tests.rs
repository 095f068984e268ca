//! Dataset loading and the shaping helpers that run over it

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use om_common::aggregate::{group_count, shares, FlagBuckets};
use om_common::compare::compared_provider;
use om_common::risk::{find_state, state_risk_table};
use om_common::search::{check_provider, global_search, lookup_providers, LookupOutcome, SearchKind};
use om_common::watchlist::{merge_watchlist, Source, UnifiedTier, WatchlistQuery};
use om_common::{Dataset, Error};
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

fn write(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

/// A small but complete data directory
fn fixture_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let d = tmp.path();

    write(d, "stats.json", r#"{"records": 1000, "totalPaid": 5000000000, "providers": 4, "procedures": 3, "minMonth": "2018-01", "maxMonth": "2024-12"}"#);
    write(
        d,
        "top-providers-1000.json",
        r#"[
          {"npi": "1111111111", "name": "ACME HOME CARE", "specialty": "Home Health", "city": "Phoenix", "state": "AZ", "totalPaid": 900000000, "totalClaims": 1000, "flags": "outlier_spending|explosive_growth", "flagCount": 2},
          {"npi": "2222222222", "name": "Sunrise Clinic", "specialty": "Clinic", "city": "Albany", "state": "NY", "totalPaid": 500000000, "totalClaims": 800},
          {"npi": "3333333333", "name": "Plain Dental", "specialty": "Dentist", "city": "Austin", "state": "TX", "totalPaid": 100000000, "totalClaims": 50}
        ]"#,
    );
    write(
        d,
        "smart-watchlist.json",
        r#"[
          {"npi": "1111111111", "name": "ACME HOME CARE", "state": "AZ", "city": "Phoenix", "totalPaid": 900000000, "flagCount": 3, "flags": ["code_specific_outlier", "billing_swing", "massive_new_entrant"]},
          {"npi": "4444444444", "name": "", "state": "MN", "totalPaid": 20000000, "flagCount": 1, "flags": ["billing_swing"]}
        ]"#,
    );
    write(
        d,
        "expanded-watchlist.json",
        r#"[
          {"npi": "1111111111", "name": "ACME HOME CARE", "flags": "outlier_spending", "flag_count": 1},
          {"npi": "5555555555", "name": "Legacy Labs", "state": "NJ", "totalPaid": 3000000, "flags": "outlier_spending|unusual_cost", "flag_count": 2},
          {"npi": "6666666666", "name": null, "flags": "outlier_spending"}
        ]"#,
    );
    write(
        d,
        "ml-scores.json",
        r#"{"topProviders": [
              {"npi": "2222222222", "mlScore": 0.91},
              {"npi": "7777777777", "mlScore": 0.55, "state": "FL"},
              {"npi": "8888888888", "mlScore": 0.31}
           ],
           "smallProviderFlags": [{"npi": "9999999999", "score": 0.62, "name": "Tiny Therapy", "city": "Miami"}]}"#,
    );
    write(d, "ml-provider-names.json", r#"{"7777777777": "Gulf Transport"}"#);
    write(
        d,
        "states-summary.json",
        r#"[
          {"state": "AZ", "total_payments": 900000000, "provider_count": 10},
          {"state": "NY", "total_payments": 500000000, "provider_count": 20},
          {"state": "Unknown", "total_payments": 1, "provider_count": 1}
        ]"#,
    );
    write(
        d,
        "leie-matched.json",
        r#"[
          {"lastName": "DOE", "firstName": "JANE", "state": "AZ", "exclType": "1128a1", "exclTypeDesc": "Program-related conviction"},
          {"busName": "BAD BILLING LLC", "state": "AZ", "exclType": "1128b4", "specialty": "Clinic"},
          {"lastName": "ROE", "firstName": "RICH", "midName": "Q", "state": "TX", "exclType": "1128a1"}
        ]"#,
    );
    write(d, "providers/1111111111.json", r#"{"npi": "1111111111", "name": "ACME HOME CARE", "monthly": [{"month": "2020-01", "payments": 10}]}"#);
    write(d, "providers/2222222222.json", r#"{"npi": 2222222222, "topProcedures": [{"code": "T1019", "payments": 5}]}"#);
    write(d, "providers/not-an-npi.json", "{}");
    write(d, "states/AZ.json", r#"{"state": "AZ", "summary": {"total_payments": 900000000}, "top_providers": [], "yearly_trends": [{"year": 2020, "total_payments": 5}]}"#);
    write(d, "procedures/T1019.json", "{ this is not json");

    tmp
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_tolerates_missing_files() {
    let tmp = TempDir::new().unwrap();
    let ds = Dataset::load(tmp.path()).unwrap();
    assert!(ds.top_providers.is_empty());
    assert!(ds.leie_index.is_empty());
    assert_eq!(ds.stats.total_paid, 0.0);
}

#[test]
fn test_load_missing_directory_is_empty_dataset() {
    let ds = Dataset::load("/nonexistent/openmedicaid-data-dir").unwrap();
    assert!(ds.states.is_empty());
}

#[test]
fn test_unreadable_fixture_is_io_error() {
    let tmp = TempDir::new().unwrap();
    // a directory where a fixture file should be
    fs::create_dir_all(tmp.path().join("stats.json")).unwrap();
    assert!(matches!(Dataset::load(tmp.path()), Err(Error::Io(_))));
}

#[test]
fn test_malformed_fixture_names_the_file() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "states-summary.json", "[{\"state\": ");
    match Dataset::load(tmp.path()) {
        Err(Error::Json { path, .. }) => assert!(path.ends_with("states-summary.json")),
        other => panic!("expected JSON error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_lookups_and_lazy_details() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();

    assert_eq!(ds.top_provider("2222222222").unwrap().name, "Sunrise Clinic");
    assert!(ds.smart_entry("4444444444").is_some());
    assert_eq!(ds.ml_entry("9999999999").unwrap().ml_score, 0.62);
    assert_eq!(ds.state_summary("ny").unwrap().state, "NY");

    let detail = ds.provider_detail("2222222222").unwrap();
    assert_eq!(detail.npi, "2222222222");
    assert_eq!(detail.procedures[0].code, "T1019");

    let az = ds.state_detail("az").unwrap();
    assert_eq!(az.yearly_trends[0].year, "2020");
    assert_eq!(az.yearly_trends[0].payments, 5.0);

    // malformed detail file reads as absent
    assert!(ds.procedure_detail("T1019").is_none());
    assert!(ds.provider_detail("3333333333").is_none());
}

#[test]
fn test_provider_detail_npis_sorted_and_filtered() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();
    assert_eq!(ds.provider_detail_npis(), vec!["1111111111", "2222222222"]);
}

#[test]
fn test_provider_detail_npis_falls_back_to_top_providers() {
    let tmp = fixture_dir();
    fs::remove_dir_all(tmp.path().join("providers")).unwrap();
    let ds = Dataset::load(tmp.path()).unwrap();
    assert_eq!(ds.provider_detail_npis().len(), 3);
}

// ============================================================================
// Watchlist
// ============================================================================

#[test]
fn test_merge_watchlist_sources_and_fallbacks() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();
    let merged = merge_watchlist(&ds);

    let npis: Vec<&str> = merged.iter().map(|e| e.npi.as_str()).collect();
    // smart x2, legacy x1 (the nameless zero-spend legacy row is dropped),
    // ML-only x3 (2222 0.91, 7777 0.55, 9999 0.62; 8888 is below 0.5)
    assert_eq!(merged.len(), 6);
    assert!(!npis.contains(&"6666666666"));
    assert!(!npis.contains(&"8888888888"));

    let acme = merged.iter().find(|e| e.npi == "1111111111").unwrap();
    assert_eq!(acme.source, Source::Smart);
    assert_eq!(acme.tier, UnifiedTier::Critical);
    assert_eq!(acme.total_claims, 1000.0);

    let nameless = merged.iter().find(|e| e.npi == "4444444444").unwrap();
    assert_eq!(nameless.name, "NPI: 4444444444");

    let gulf = merged.iter().find(|e| e.npi == "7777777777").unwrap();
    assert_eq!(gulf.source, Source::Ml);
    assert_eq!(gulf.name, "Gulf Transport");
    assert_eq!(gulf.tier, UnifiedTier::MlFlag);

    // default order is tier order
    let tiers: Vec<UnifiedTier> = merged.iter().map(|e| e.tier).collect();
    let mut sorted = tiers.clone();
    sorted.sort();
    assert_eq!(tiers, sorted);
}

#[test]
fn test_watchlist_tabs_and_filters() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();
    let merged = merge_watchlist(&ds);

    let stat = WatchlistQuery { tab: Some("stat".into()), ..Default::default() }.apply(&merged);
    assert!(stat.iter().all(|e| e.flag_count > 0));

    let ml = WatchlistQuery { tab: Some("ml".into()), ..Default::default() }.apply(&merged);
    assert!(ml.iter().all(|e| e.source == Source::Ml));
    assert_eq!(ml[0].npi, "2222222222");

    let az = WatchlistQuery { state: Some("AZ".into()), ..Default::default() }.apply(&merged);
    assert_eq!(az.len(), 1);

    let q = WatchlistQuery { q: Some("phoenix".into()), ..Default::default() }.apply(&merged);
    assert_eq!(q[0].npi, "1111111111");
}

#[test]
fn test_flag_buckets_sum_to_watchlist_length() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();

    let buckets = FlagBuckets::from_counts(ds.smart_watchlist.iter().map(|e| e.effective_flag_count()));
    assert_eq!(buckets.critical + buckets.high + buckets.moderate, ds.smart_watchlist.len());
}

// ============================================================================
// Aggregation over the matched exclusions
// ============================================================================

#[test]
fn test_matched_exclusion_shares() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();

    let by_state = group_count(ds.leie_matched.iter(), |m| m.state.clone());
    assert_eq!(by_state[0].key, "AZ");
    assert_eq!(by_state[0].count, 2);

    let total: f64 = shares(&by_state).iter().map(|s| s.percent).sum();
    assert!((total - 100.0).abs() < 1e-9);

    assert_eq!(ds.leie_matched[0].display_name(), "Doe, Jane");
    assert_eq!(ds.leie_matched[1].display_name(), "Bad Billing Llc");
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_global_search_order_and_cap() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();

    let results = global_search(&ds, "ny");
    // Albany matches as a city, NY as an exact state code
    assert!(results[0].kind == SearchKind::Provider);
    assert!(results.iter().any(|r| r.kind == SearchKind::State && r.href == "/states/NY"));
    assert!(results.len() <= 8);

    let unknown = global_search(&ds, "unknown");
    assert!(unknown.iter().all(|r| r.kind != SearchKind::State));

    let code = global_search(&ds, "t1019");
    assert_eq!(code[0].kind, SearchKind::Procedure);
}

#[test]
fn test_check_returns_flagged_before_unflagged() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();

    let results = check_provider(&ds, "in");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].npi, "9999999999");
    assert_eq!(results[1].npi, "3333333333");
    let first_clean = results.iter().position(|r| !r.flagged).unwrap_or(results.len());
    assert!(results[first_clean..].iter().all(|r| !r.flagged));
    assert!(results[..first_clean].iter().all(|r| r.flagged));

    // every result comes from the fixtures
    for r in &results {
        assert!(
            ds.top_provider(&r.npi).is_some() || ds.smart_entry(&r.npi).is_some() || ds.ml_entry(&r.npi).is_some()
        );
    }
}

#[test]
fn test_check_npi_fragment() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();

    let results = check_provider(&ds, "33333");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].npi, "3333333333");
    assert!(!results[0].flagged);

    let ml = check_provider(&ds, "Miami");
    assert_eq!(ml[0].npi, "9999999999");
    assert!(ml[0].ml_only);
}

#[test]
fn test_lookup_merges_and_sorts() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();

    match lookup_providers(&ds, "c") {
        LookupOutcome::Matches(m) => {
            assert_eq!(m[0].npi, "1111111111");
            assert!(m[0].flagged);
            assert!(m.windows(2).all(|w| w[0].total_paid >= w[1].total_paid));
        }
        other => panic!("expected matches, got {:?}", other),
    }
}

// ============================================================================
// Comparison, trends and state risk
// ============================================================================

#[test]
fn test_compared_provider_sources() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();

    // detail file wins and its monthly series feeds the per-year totals
    let acme = compared_provider(&ds, "1111111111").unwrap();
    assert_eq!(acme.name, "ACME HOME CARE");
    assert_eq!(acme.yearly.get("2020"), Some(&10.0));
    assert_eq!(acme.flag_count, 2);

    // detail file without a name borrows it from the top providers
    let sunrise = compared_provider(&ds, "2222222222").unwrap();
    assert_eq!(sunrise.name, "Sunrise Clinic");
    assert_eq!(sunrise.ml_score, Some(0.91));

    // top providers only
    let dental = compared_provider(&ds, "3333333333").unwrap();
    assert_eq!(dental.total_paid, 100000000.0);
    assert_eq!(dental.cost_per_claim, Some(2000000.0));
    assert!(dental.yearly.is_empty());

    assert!(compared_provider(&ds, "5555555555").is_none());
}

#[test]
fn test_state_risk_from_fixture() {
    let tmp = fixture_dir();
    let ds = Dataset::load(tmp.path()).unwrap();
    let watchlist = merge_watchlist(&ds);
    let table = state_risk_table(&ds, &watchlist);

    assert!(table.iter().all(|r| r.state != "Unknown"));
    assert!(table.windows(2).all(|w| w[0].flagged_count >= w[1].flagged_count));

    let (_, az) = find_state(&table, "AZ").unwrap();
    assert_eq!(az.stat_flags, 1);
    assert_eq!(az.state_spending, 900000000.0);
    assert_eq!(az.flagged_share, 100.0);
}

/// Collects the messages of INFO events
#[derive(Clone, Default)]
struct InfoMessages(Arc<Mutex<Vec<String>>>);

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for InfoMessages {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::INFO {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(visitor.0);
    }
}

#[test]
fn test_load_logs_summary_once() {
    let tmp = fixture_dir();
    let messages = InfoMessages::default();
    let subscriber = tracing_subscriber::registry().with(messages.clone());

    let ds = tracing::subscriber::with_default(subscriber, || Dataset::load(tmp.path())).unwrap();
    assert_eq!(ds.top_providers.len(), 3);

    let logged = messages.0.lock().unwrap();
    let loaded: Vec<&String> = logged.iter().filter(|m| m.starts_with("Loaded")).collect();
    assert_eq!(loaded.len(), 1, "{:?}", logged);
    assert!(loaded[0].contains("3 top providers"));
}
