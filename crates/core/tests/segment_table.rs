use codeheap_core::codeheap::SegmentTable;
use codeheap_core::model::{SegmentBounds, SegmentKind, UNKNOWN_SEGMENT};

fn two_segment_table() -> SegmentTable {
    let mut table = SegmentTable::new();
    table.add_segment("extra-hot", 0x1000, 0x2000);
    table.add_segment("non-profiled nmethods", 0x3000, 0x4000);
    table
}

#[test]
fn aliases_resolve_to_canonical_segments() {
    let mut table = SegmentTable::new();
    assert_eq!(table.add_segment("extra-hot", 0x10, 0x20), Some(SegmentKind::Hot));
    assert_eq!(
        table.add_segment("non-profiled nmethods", 0x30, 0x40),
        Some(SegmentKind::NonProfiled)
    );
    assert_eq!(table.add_segment("profiled nmethods", 0x50, 0x60), Some(SegmentKind::Profiled));
    assert_eq!(table.add_segment("non-nmethods", 0x70, 0x80), Some(SegmentKind::NonMethod));
    assert_eq!(table.segments().len(), 4);
}

#[test]
fn unsegmented_labels_map_to_fallback_buckets() {
    let mut table = SegmentTable::new();
    assert_eq!(table.add_segment("CodeCache", 0x100, 0x200), Some(SegmentKind::NonProfiled));
    assert_eq!(table.add_segment("ExtraHotCache", 0x300, 0x400), Some(SegmentKind::Hot));
    assert_eq!(table.classify(0x150), Some(SegmentKind::NonProfiled));
    assert_eq!(table.classify(0x350), Some(SegmentKind::Hot));
}

#[test]
fn unknown_label_is_dropped() {
    let mut table = SegmentTable::new();
    assert_eq!(table.add_segment("mystery heap", 0x100, 0x200), None);
    assert!(table.is_empty());
    assert_eq!(table.classify(0x150), None);
}

#[test]
fn later_announcement_overwrites_bounds() {
    let mut table = SegmentTable::new();
    table.add_segment("extra-hot", 0x1000, 0x2000);
    table.add_segment("ExtraHotCache", 0x8000, 0x9000);

    assert_eq!(table.bounds(SegmentKind::Hot), Some(SegmentBounds::new(0x8000, 0x9000)));
    assert_eq!(table.classify(0x1500), None);
    assert_eq!(table.classify(0x8500), Some(SegmentKind::Hot));
}

#[test]
fn bounds_are_inclusive_on_both_ends() {
    let table = two_segment_table();
    assert_eq!(table.classify(0x1000), Some(SegmentKind::Hot));
    assert_eq!(table.classify(0x2000), Some(SegmentKind::Hot));
    assert_eq!(table.classify(0x0fff), None);
    assert_eq!(table.classify(0x2001), None);
}

#[test]
fn overlapping_ranges_resolve_in_fixed_order() {
    let mut table = SegmentTable::new();
    table.add_segment("non-nmethods", 0x0, 0xffff);
    table.add_segment("profiled nmethods", 0x0, 0xffff);
    table.add_segment("non-profiled nmethods", 0x1000, 0x1fff);
    table.add_segment("extra-hot", 0x1800, 0x18ff);

    assert_eq!(table.classify(0x1810), Some(SegmentKind::Hot));
    assert_eq!(table.classify(0x1010), Some(SegmentKind::NonProfiled));
    assert_eq!(table.classify(0x2010), Some(SegmentKind::Profiled));
}

#[test]
fn segment_name_for_reports_label_or_unknown() {
    let table = two_segment_table();
    assert_eq!(table.segment_name_for(0x1200), "extra-hot");
    assert_eq!(table.segment_name_for(0x3200), "non-profiled nmethods");
    assert_eq!(table.segment_name_for(0x2800), UNKNOWN_SEGMENT);
}

#[test]
fn add_method_appends_in_order_and_rejects_strays() {
    let mut table = two_segment_table();
    assert_eq!(table.add_method(0x1200, "java.lang.Object.hashCode"), Some(SegmentKind::Hot));
    assert_eq!(table.add_method(0x1300, "java.lang.Enum.ordinal"), Some(SegmentKind::Hot));
    assert_eq!(table.add_method(0x3100, "Main.run"), Some(SegmentKind::NonProfiled));
    assert_eq!(table.add_method(0x9999, "Lost.method"), None);

    assert_eq!(
        table.methods(SegmentKind::Hot),
        ["java.lang.Object.hashCode", "java.lang.Enum.ordinal"]
    );
    assert_eq!(table.methods(SegmentKind::NonProfiled), ["Main.run"]);
    assert!(table.methods(SegmentKind::Profiled).is_empty());
    assert_eq!(table.method_count(), 3);
}

#[test]
fn method_lists_include_empty_registered_segments() {
    let mut table = two_segment_table();
    table.add_method(0x1200, "java.lang.Object.hashCode");

    let lists = table.method_lists();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[&SegmentKind::Hot].len(), 1);
    assert!(lists[&SegmentKind::NonProfiled].is_empty());
}
