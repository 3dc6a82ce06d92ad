use std::collections::{BTreeSet, HashMap};

use contactql::normalize::extract_digits;
use contactql::{
    EmailExtractor, Identity, IdentityKey, IdentityResolver, Location, LocationResolver,
    MergeEngine, PhoneNormalizer, RawRecord,
};

fn ann(industry: &str, created_at: &str) -> RawRecord {
    RawRecord::new()
        .with("firstname", "Ann")
        .with("lastname", "Lee")
        .with("industry", industry)
        .with("created_at", created_at)
}

/// A mixed batch: repeated people, email-only records, anonymous and broken rows.
fn mixed_batch() -> Vec<RawRecord> {
    vec![
        ann("Meat", "2024-01-01").with("record_id", "1"),
        RawRecord::new()
            .with("raw_email", "Bob <bob_ray7@x.com>")
            .with("country", "London")
            .with("industry", "Milling")
            .with("created_at", "2023-03-01")
            .with("record_id", "2"),
        ann("Milling", "2023-06-01").with("phone", "087 123 4567").with("record_id", "3"),
        RawRecord::new()
            .with("firstname", "Bob")
            .with("lastname", "Ray")
            .with("industry", "Dairy products")
            .with("created_at", "2024-02-01")
            .with("record_id", "4"),
        RawRecord::new()
            .with("phone", "0123")
            .with("created_at", "2024-05-01")
            .with("record_id", "5"),
        ann("Meat", "2022-01-01").with("company", "Acme").with("record_id", "6"),
        ann("Poultry and fish", "whenever").with("record_id", "7"),
        RawRecord::new()
            .with("raw_email", "<sales@x.com>")
            .with("created_at", "2024-01-01")
            .with("record_id", "8"),
        RawRecord::new()
            .with("firstname", "Cat")
            .with("lastname", "Fox")
            .with("created_at", "2021-07-07")
            .with("record_id", "9"),
    ]
}

#[test]
fn test_ann_lee_history_scenario() {
    let outcome = MergeEngine::default().merge(vec![
        ann("Meat", "2024-01-01"),
        ann("Milling", "2023-06-01"),
        ann("Meat", "2022-01-01"),
    ]);

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.identity.as_str(), "Ann Lee");

    let serialized = record.industry().unwrap();
    assert!(serialized.starts_with(';'));
    let values: Vec<&str> = serialized[1..].split(';').collect();
    assert_eq!(values.len(), 2);
    assert_eq!(
        values.iter().copied().collect::<BTreeSet<_>>(),
        BTreeSet::from(["Meat", "Milling"])
    );
}

#[test]
fn test_email_extraction_scenario() {
    assert_eq!(EmailExtractor::default().extract(Some("hi <a.b@x.com> bye")), "a.b@x.com");
}

#[test]
fn test_identity_from_email_scenario() {
    let record = RawRecord::new()
        .with("firstname", "")
        .with("lastname", "")
        .with("raw_email", "<jane_doe42@x.com>");
    assert_eq!(
        IdentityResolver::default().resolve(&record).unwrap(),
        Identity::Named(IdentityKey::new("Jane Doe"))
    );
}

#[test]
fn test_location_scenarios() {
    let resolver = LocationResolver::default();
    assert_eq!(resolver.resolve(Some("Dublin")), Location::new("Ireland", "Dublin"));
    assert_eq!(
        resolver.resolve(Some("Atlantis")),
        Location::new("Unknown", "Not recognized")
    );
    assert_eq!(resolver.resolve(None), Location::new("Nan", "Nan"));
    for country in ["England", "Ireland"] {
        assert_eq!(resolver.resolve(Some(country)), Location::new(country, "Unknown"));
    }
}

#[test]
fn test_phone_scenario() {
    let phone = PhoneNormalizer::default().normalize(Some("07911 123456"), Some("Scotland"));
    assert_eq!(phone, "(+44) 7911 123456");
    assert_eq!(extract_digits(&phone), "447911123456");
}

#[test]
fn test_scotland_phone_through_merge_scenario() {
    let outcome = MergeEngine::default().merge(vec![ann("Meat", "2024-01-01")
        .with("country", "Scotland")
        .with("phone", "07911 123456")]);
    assert_eq!(outcome.records[0].get("phone"), Some("(+44) 7911 123456"));
}

#[test]
fn test_padded_names_merge_into_one_identity() {
    let outcome = MergeEngine::default().merge(vec![
        RawRecord::new()
            .with("firstname", "Ann ")
            .with("lastname", "Lee")
            .with("created_at", "2024-01-01"),
        ann("Milling", "2023-01-01"),
    ]);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].identity.as_str(), "Ann Lee");
    assert_eq!(outcome.records[0].source_records, 2);
}

#[test]
fn test_one_canonical_record_per_distinct_identity() {
    let outcome = MergeEngine::default().merge(mixed_batch());

    let identities: BTreeSet<&str> = outcome.records.iter().map(|r| r.identity.as_str()).collect();
    assert_eq!(identities, BTreeSet::from(["Ann Lee", "Bob Ray", "Cat Fox"]));
    assert_eq!(outcome.records.len(), identities.len());
    assert!(outcome.records.iter().all(|r| !r.identity.as_str().is_empty()));
}

#[test]
fn test_report_accounts_for_every_input() {
    let outcome = MergeEngine::default().merge(mixed_batch());
    let report = &outcome.report;

    assert_eq!(report.input_records, 9);
    assert_eq!(report.dropped_anonymous, 1);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.canonical_records, 3);
    assert_eq!(report.merged_records(), 6);

    let rejected_ids: Vec<Option<&str>> = report
        .rejected
        .iter()
        .map(|r| r.record_id.as_deref())
        .collect();
    assert_eq!(rejected_ids, vec![Some("7"), Some("8")]);

    let sources: usize = outcome.records.iter().map(|r| r.source_records).sum();
    assert_eq!(sources, report.merged_records());
}

#[test]
fn test_canonical_records_ordered_by_recency() {
    let outcome = MergeEngine::default().merge(mixed_batch());
    let order: Vec<&str> = outcome.records.iter().map(|r| r.identity.as_str()).collect();
    assert_eq!(order, vec!["Bob Ray", "Ann Lee", "Cat Fox"]);
}

#[test]
fn test_backfill_never_overwrites_present_values() {
    let batch = mixed_batch();
    let outcome = MergeEngine::default().merge(batch);

    let bob = outcome.records.iter().find(|r| r.identity.as_str() == "Bob Ray").unwrap();
    // The newest Bob record had no place; "Nan" is a value, not a gap.
    assert_eq!(bob.get("country"), Some("Nan"));
    assert_eq!(bob.get("record_id"), Some("4"));
    assert_eq!(bob.get("email"), Some("bob_ray7@x.com"));
    assert_eq!(bob.get("raw_email"), Some("Bob <bob_ray7@x.com>"));

    let ann = outcome.records.iter().find(|r| r.identity.as_str() == "Ann Lee").unwrap();
    assert_eq!(ann.get("record_id"), Some("1"));
    assert_eq!(ann.get("company"), Some("Acme"));
    assert_eq!(ann.get("phone"), Some("Nan"));
}

#[test]
fn test_industry_history_matches_distinct_inputs() {
    let batch = mixed_batch();
    let outcome = MergeEngine::default().merge(batch);

    let mut expected: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    expected.insert("Ann Lee", BTreeSet::from(["Meat", "Milling"]));
    expected.insert("Bob Ray", BTreeSet::from(["Milling", "Dairy products"]));
    expected.insert("Cat Fox", BTreeSet::new());

    for record in &outcome.records {
        let history: BTreeSet<&str> = record.industry_history.iter().map(String::as_str).collect();
        assert_eq!(history.len(), record.industry_history.len(), "duplicate in history");
        assert_eq!(&history, &expected[record.identity.as_str()]);
    }

    let bob = outcome.records.iter().find(|r| r.identity.as_str() == "Bob Ray").unwrap();
    assert_eq!(bob.industry(), Some(";Milling;Dairy products"));
}
