use std::collections::BTreeMap;

use harvester_core::{
    AddressError, CatalogEntry, CodeOverrides, SectionAddress, ShortCodeTable, SplitDestination,
    Testament, WorkMapping,
};
use pretty_assertions::assert_eq;

fn table() -> ShortCodeTable {
    [("genesis", "gn"), ("atos", "at"), ("nicodemos", "nicodemos")]
        .into_iter()
        .collect()
}

#[test]
fn plan_covers_every_section_in_order() {
    let mapping = WorkMapping::new(table());
    let entry = CatalogEntry::new("Gênesis", "genesis", 3).in_testament(Testament::Old);
    let plans = mapping.plan("ave-maria", "biblia-ave-maria", &entry).unwrap();

    assert_eq!(plans.len(), 1);
    let plan = &plans[0];
    assert_eq!(plan.title, "Gênesis");
    assert_eq!(plan.short_code, "gn");
    let addresses: Vec<_> = plan.sections.iter().map(|s| s.address.clone()).collect();
    assert_eq!(
        addresses,
        vec![
            SectionAddress::new("ave-maria", "gn", 1),
            SectionAddress::new("ave-maria", "gn", 2),
            SectionAddress::new("ave-maria", "gn", 3),
        ]
    );
    let locator = &plan.sections[1].locator;
    assert_eq!(locator.version, "biblia-ave-maria");
    assert_eq!(locator.work_id, "genesis");
    assert_eq!(locator.section, 2);
    assert_eq!(locator.testament, Some(Testament::Old));
}

#[test]
fn source_ids_change_requests_but_not_storage() {
    let mut overrides = CodeOverrides::default();
    overrides
        .source_ids
        .insert("atos".into(), "atos-dos-apostolos".into());
    let mapping = WorkMapping::new(table()).with_overrides(overrides);
    let plans = mapping
        .plan("pastoral", "pastoral", &CatalogEntry::new("Atos", "atos", 1))
        .unwrap();
    let section = &plans[0].sections[0];
    assert_eq!(section.locator.work_id, "atos-dos-apostolos");
    assert_eq!(section.address, SectionAddress::new("pastoral", "at", 1));
}

#[test]
fn unknown_slug_is_a_mapping_error() {
    let mapping = WorkMapping::new(table());
    let err = mapping
        .plan("acf", "acf", &CatalogEntry::new("Tobias", "tobias", 14))
        .unwrap_err();
    assert_eq!(err, AddressError::UnknownSlug { slug: "tobias".into() });
}

#[test]
fn split_entry_fans_out_to_renumbered_destinations() {
    let mut splits = BTreeMap::new();
    splits.insert(
        "nicodemos".to_string(),
        vec![
            SplitDestination {
                short_code: "evangelho-nicodemos".into(),
                title: Some("Evangelho de Nicodemos".into()),
                version: Some("unknown".into()),
                first_section: 1,
                last_section: 2,
            },
            SplitDestination {
                short_code: "descida-cristo-inferno".into(),
                title: None,
                version: None,
                first_section: 3,
                last_section: 4,
            },
        ],
    );
    let mapping = WorkMapping::new(table()).with_splits(splits);
    let entry = CatalogEntry::new("Nicodemos", "nicodemos", 4);
    let plans = mapping.plan("grego", "grego", &entry).unwrap();

    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].title, "Evangelho de Nicodemos");
    assert_eq!(
        plans[0].sections[1].address,
        SectionAddress::new("unknown", "evangelho-nicodemos", 2)
    );
    assert_eq!(plans[1].title, "Nicodemos");
    let second: Vec<_> = plans[1]
        .sections
        .iter()
        .map(|s| (s.locator.section, s.address.section))
        .collect();
    assert_eq!(second, vec![(3, 1), (4, 2)]);
    assert_eq!(plans[1].sections[0].address.version, "grego");
}

#[test]
fn split_with_empty_range_is_rejected() {
    let mut splits = BTreeMap::new();
    splits.insert(
        "genesis".to_string(),
        vec![SplitDestination {
            short_code: "gn".into(),
            title: None,
            version: None,
            first_section: 5,
            last_section: 9,
        }],
    );
    let mapping = WorkMapping::new(table()).with_splits(splits);
    let err = mapping
        .plan("acf", "acf", &CatalogEntry::new("Gênesis", "genesis", 3))
        .unwrap_err();
    assert!(matches!(err, AddressError::EmptySplit { .. }));
}
