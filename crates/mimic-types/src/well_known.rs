//! Fixed clinical code allow-lists.
//!
//! Event rows are only extracted for the chart and lab item codes listed
//! here. The lists cover liver function, coagulation, haematology and
//! electrolyte measurements across both the CareVue and MetaVision item
//! ranges. They are part of the extraction policy and are not configurable.
//!
//! # Examples
//!
//! ```
//! use mimic_types::well_known;
//!
//! assert!(well_known::is_clinical_item("50862"));
//! assert!(!well_known::is_clinical_item("5086"));
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

// =============================================================================
// Chart items (CHARTEVENTS / D_ITEMS)
// =============================================================================

/// Chart item codes kept by the streaming filter.
///
/// Each line groups the CareVue and MetaVision codes of one measurement.
#[rustfmt::skip]
pub const CHART_ITEM_IDS: &[&str] = &[
    "772", "1521", "227456",
    "769", "220644",
    "770", "220587",
    "225651",
    "225690",
    "1522",
    "789", "1524", "220603",
    "3747", "1523",
    "791", "1525",
    "227444",
    "811", "3744", "1529", "220621", "225664", "226537",
    "226730",
    "814", "220228",
    "829", "3792", "1535",
    "821", "1532",
    "837", "3803", "1536", "220645", "226534",
    "4375",
    "827", "1534",
    "828", "3789",
    "3793",
    "833",
    "3801",
    "849", "1539", "220650",
    "1542",
    "763",
];

// =============================================================================
// Lab items (LABEVENTS / D_LABITEMS)
// =============================================================================

/// Lab item codes kept by the streaming filter.
#[rustfmt::skip]
pub const LAB_ITEM_IDS: &[&str] = &[
    "50862", "51025",
    "50863",
    "50861",
    "50878",
    "50893",
    "50907",
    "50902", "51030",
    "50912",
    "51114", "51200", "51347", "51368", "51419", "51444",
    "50809", "50931", "51478",
    "50811", "51222",
    "50971",
    "50813",
    "51248",
    "51250",
    "50960", "51037",
    "51256",
    "50970",
    "51265",
    "51493",
    "50883", "50884", "50885",
    "50976",
    "51006",
    "51516",
    "51464",
    "50889",
];

static CLINICAL_ITEMS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    CHART_ITEM_IDS
        .iter()
        .chain(LAB_ITEM_IDS.iter())
        .copied()
        .collect()
});

/// Returns the union of the chart and lab item allow-lists.
pub fn clinical_items() -> &'static HashSet<&'static str> {
    &CLINICAL_ITEMS
}

/// Returns true if `itemid` is on the chart or lab item allow-list.
///
/// Matching is exact: `"12"` does not match `"112"`.
pub fn is_clinical_item(itemid: &str) -> bool {
    CLINICAL_ITEMS.contains(itemid)
}
