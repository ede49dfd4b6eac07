use super::*;

#[test]
fn test_categories_serialize_kebab_case() {
    let json = serde_json::to_string(&FindingCategory::PromoteToFk).unwrap();
    assert_eq!(json, "\"promote-to-fk\"");
    assert_eq!(FindingCategory::SamplerUnavailable.to_string(), "sampler-unavailable");
}

#[test]
fn test_new_finding_takes_category_severity() {
    let f = Finding::new(
        "primary_keys",
        FindingCategory::MissingPk,
        vec!["orders".into()],
        "no primary key",
    );
    assert_eq!(f.severity, Severity::Warning);
    assert_eq!(f.primary_table(), "orders");
    assert_eq!(f.to_string(), "warning missing-pk [orders]: no primary key");
}

#[test]
fn test_unverified_keeps_reason() {
    let f = Finding::unverified("sharding", vec!["events".into()], "R002 timed out");
    assert_eq!(f.category, FindingCategory::SamplerUnavailable);
    assert_eq!(f.message, "could not verify: sampler unavailable");
    assert_eq!(f.evidence["reason"], "R002 timed out");
}

#[test]
fn test_report_counts() {
    let report = ReviewReport {
        findings: vec![
            Finding::new("a", FindingCategory::LongChain, vec![], "x"),
            Finding::new("a", FindingCategory::Circular, vec![], "y"),
            Finding::new("a", FindingCategory::Circular, vec![], "z"),
        ],
        checks: vec!["a".into()],
    };
    assert_eq!(report.count(Severity::Info), 1);
    assert_eq!(report.count(Severity::Warning), 2);
    assert_eq!(report.by_category(FindingCategory::Circular).len(), 2);
}
