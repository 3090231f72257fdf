use crate::types::{FilterSelection, MapRecord, Record, SuitabilityCategory, SummaryMetrics};
use std::collections::HashSet;

/// Fallback coordinate for municipalities missing from the lookup table.
/// Roughly the center of the department; good enough for a display heuristic.
pub const DEFAULT_COORDINATE: (f64, f64) = (11.3, -72.5);

/// Approximate coordinates for the ten known Guajira municipalities.
/// Not real geodata; display only.
const COORDINATES: [(&str, f64, f64); 10] = [
    ("Riohacha", 11.5444, -72.9072),
    ("Maicao", 11.3778, -72.2389),
    ("Uribia", 11.7139, -72.2658),
    ("Manaure", 11.7750, -72.4444),
    ("Albania", 11.1600, -72.5917),
    ("Barrancas", 10.9575, -72.7958),
    ("Fonseca", 10.8861, -72.8486),
    ("San Juan", 10.7711, -72.9603),
    ("Villanueva", 10.6053, -72.9800),
    ("Urumita", 10.5589, -73.0153),
];

pub fn coordinates_for(municipality_name: &str) -> (f64, f64) {
    COORDINATES
        .iter()
        .find(|(name, _, _)| *name == municipality_name)
        .map(|(_, lat, lon)| (*lat, *lon))
        .unwrap_or(DEFAULT_COORDINATE)
}

/// Joins the approximate coordinate onto each record for geographic rendering.
pub fn build_map_view(records: &[Record]) -> Vec<MapRecord> {
    records
        .iter()
        .map(|record| {
            let (lat, lon) = coordinates_for(&record.municipality_name);
            MapRecord {
                record: record.clone(),
                lat,
                lon,
            }
        })
        .collect()
}

pub fn compute_metrics(records: &[Record]) -> SummaryMetrics {
    let municipalities: HashSet<&str> = records
        .iter()
        .map(|r| r.municipality_name.as_str())
        .collect();
    let categories: HashSet<SuitabilityCategory> = records.iter().map(|r| r.category).collect();
    SummaryMetrics {
        municipality_count: municipalities.len(),
        total_area_ha: records.iter().map(|r| r.area_ha).sum(),
        category_count: categories.len(),
    }
}

/// Groups records by category and sums their areas, in severity order.
/// Categories with no records are omitted.
pub fn area_by_category(records: &[Record]) -> Vec<(SuitabilityCategory, f64)> {
    SuitabilityCategory::ALL
        .iter()
        .filter_map(|&category| {
            let total: f64 = records
                .iter()
                .filter(|r| r.category == category)
                .map(|r| r.area_ha)
                .sum();
            let present = records.iter().any(|r| r.category == category);
            present.then_some((category, total))
        })
        .collect()
}

pub fn apply_filter(records: &[Record], filter: FilterSelection) -> Vec<Record> {
    records
        .iter()
        .filter(|r| filter.matches(r.category))
        .cloned()
        .collect()
}

pub fn apply_map_filter(records: &[MapRecord], filter: FilterSelection) -> Vec<MapRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r.record.category))
        .cloned()
        .collect()
}

/// Distinct categories present in the data, in severity order. Drives the
/// dropdown options.
pub fn categories_present(records: &[Record]) -> Vec<SuitabilityCategory> {
    SuitabilityCategory::ALL
        .iter()
        .copied()
        .filter(|&category| records.iter().any(|r| r.category == category))
        .collect()
}

/// Formats a hectare count with thousands separators: 49000.0 -> "49,000".
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fallback_records;

    #[test]
    fn fallback_metrics_round_trip() {
        let records = fallback_records();
        let metrics = compute_metrics(&records);
        assert_eq!(metrics.municipality_count, 5);
        assert_eq!(metrics.category_count, 4);
        assert_eq!(metrics.total_area_ha, 49000.0);
    }

    #[test]
    fn unknown_municipality_gets_default_coordinate() {
        assert_eq!(coordinates_for("Dibulla"), DEFAULT_COORDINATE);
        assert_eq!(coordinates_for("Riohacha"), (11.5444, -72.9072));
    }

    #[test]
    fn map_view_joins_coordinates() {
        let map = build_map_view(&fallback_records());
        assert_eq!(map.len(), 5);
        let riohacha = map
            .iter()
            .find(|r| r.record.municipality_name == "Riohacha")
            .unwrap();
        assert_eq!((riohacha.lat, riohacha.lon), (11.5444, -72.9072));
    }

    #[test]
    fn category_filter_selects_only_matching_records() {
        let records = fallback_records();
        let filtered = apply_filter(
            &records,
            FilterSelection::Category(SuitabilityCategory::Medium),
        );
        assert_eq!(filtered.len(), 2);
        assert!(filtered
            .iter()
            .all(|r| r.category == SuitabilityCategory::Medium));

        let all = apply_filter(&records, FilterSelection::All);
        assert_eq!(all.len(), records.len());
    }

    #[test]
    fn bar_totals_sum_to_total_area() {
        let records = fallback_records();
        let grouped = area_by_category(&records);
        let bar_sum: f64 = grouped.iter().map(|(_, total)| total).sum();
        assert_eq!(bar_sum, compute_metrics(&records).total_area_ha);
    }

    #[test]
    fn grouping_omits_absent_categories() {
        let records = apply_filter(
            &fallback_records(),
            FilterSelection::Category(SuitabilityCategory::Low),
        );
        let grouped = area_by_category(&records);
        assert_eq!(grouped, vec![(SuitabilityCategory::Low, 8000.0)]);
    }

    #[test]
    fn categories_present_are_in_severity_order() {
        let present = categories_present(&fallback_records());
        assert_eq!(
            present,
            vec![
                SuitabilityCategory::NotSuitable,
                SuitabilityCategory::Low,
                SuitabilityCategory::Medium,
                SuitabilityCategory::High,
            ]
        );
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_grouped(49000.0), "49,000");
        assert_eq!(format_grouped(1234567.0), "1,234,567");
        assert_eq!(format_grouped(800.0), "800");
        assert_eq!(format_grouped(0.0), "0");
    }
}
