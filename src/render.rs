use crate::processing::{
    apply_filter, apply_map_filter, area_by_category, format_grouped, DEFAULT_COORDINATE,
};
use crate::types::{FilterSelection, MapRecord, Record, SuitabilityCategory};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

const NO_DATA_TITLE: &str = "No hay datos para mostrar";
const NO_DATA_SLICE: &str = "Sin datos";
/// Maximum marker diameter on the map, in pixels.
const MAP_SIZE_MAX: f64 = 15.0;
const MAP_ZOOM: f64 = 7.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown filter value '{value}'")]
    UnknownFilter { value: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableArtifact {
    Rows { rows: Vec<TableRow> },
    Placeholder { message: String },
}

#[derive(Debug, Serialize)]
pub struct TableRow {
    pub municipality: String,
    pub category: String,
    pub area: String,
}

/// The four artifacts produced per interaction. Map, bar and pie are Plotly
/// figure specs (`data` + `layout`) the frontend passes to `Plotly.newPlot`.
#[derive(Debug, Serialize)]
pub struct Artifacts {
    pub map: Value,
    pub bar: Value,
    pub pie: Value,
    pub table: TableArtifact,
}

pub fn parse_filter(value: &str) -> Result<FilterSelection, RenderError> {
    if value == "all" {
        return Ok(FilterSelection::All);
    }
    SuitabilityCategory::parse(value)
        .map(FilterSelection::Category)
        .ok_or_else(|| RenderError::UnknownFilter {
            value: value.to_string(),
        })
}

/// Computes all four artifacts for one filter selection. Each branch is
/// empty-safe on its own; an empty filtered set degrades to placeholders,
/// never an error.
pub fn render_dashboard(
    records: &[Record],
    map_records: &[MapRecord],
    table_row_cap: Option<usize>,
    filter: &str,
) -> Result<Artifacts, RenderError> {
    let selection = parse_filter(filter)?;
    let filtered = apply_filter(records, selection);
    let filtered_map = apply_map_filter(map_records, selection);
    tracing::debug!("Filter '{}' matched {} records", filter, filtered.len());

    Ok(Artifacts {
        map: map_figure(&filtered_map),
        bar: bar_figure(&filtered),
        pie: pie_figure(&filtered),
        table: table_artifact(&filtered, table_row_cap),
    })
}

/// The degraded response for the interaction failure boundary: three
/// error-titled empty figures plus an error message in the table slot.
pub fn error_artifacts(err: &RenderError) -> Artifacts {
    let message = format!("Error: {err}");
    let figure = json!({
        "data": [],
        "layout": { "title": { "text": message }, "height": 300 },
    });
    Artifacts {
        map: figure.clone(),
        bar: figure.clone(),
        pie: figure,
        table: TableArtifact::Placeholder { message },
    }
}

/// One scattermapbox trace per category present, marker size proportional to
/// area (capped at MAP_SIZE_MAX like plotly's size_max).
fn map_figure(records: &[MapRecord]) -> Value {
    if records.is_empty() {
        return json!({
            "data": [],
            "layout": {
                "title": { "text": NO_DATA_TITLE },
                "mapbox": {
                    "style": "open-street-map",
                    "center": { "lat": DEFAULT_COORDINATE.0, "lon": DEFAULT_COORDINATE.1 },
                    "zoom": MAP_ZOOM,
                },
                "height": 400,
                "margin": { "r": 0, "t": 30, "l": 0, "b": 0 },
            },
        });
    }

    let max_area = records
        .iter()
        .map(|r| r.record.area_ha)
        .fold(0.0_f64, f64::max)
        .max(1.0);
    // Plotly's area-mode scaling: sizeref = 2 * max(size) / size_max^2.
    let sizeref = 2.0 * max_area / (MAP_SIZE_MAX * MAP_SIZE_MAX);

    let traces: Vec<Value> = SuitabilityCategory::ALL
        .iter()
        .filter_map(|&category| {
            let group: Vec<&MapRecord> = records
                .iter()
                .filter(|r| r.record.category == category)
                .collect();
            if group.is_empty() {
                return None;
            }
            let hover: Vec<String> = group
                .iter()
                .map(|r| {
                    format!(
                        "{}<br>{}<br>{} ha",
                        r.record.municipality_name,
                        category.label(),
                        format_grouped(r.record.area_ha)
                    )
                })
                .collect();
            Some(json!({
                "type": "scattermapbox",
                "name": category.label(),
                "lat": group.iter().map(|r| r.lat).collect::<Vec<_>>(),
                "lon": group.iter().map(|r| r.lon).collect::<Vec<_>>(),
                "text": hover,
                "hoverinfo": "text",
                "marker": {
                    "size": group.iter().map(|r| r.record.area_ha).collect::<Vec<_>>(),
                    "sizemode": "area",
                    "sizeref": sizeref,
                    "sizemin": 4,
                    "color": category.color(),
                },
            }))
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "mapbox": {
                "style": "open-street-map",
                "center": { "lat": DEFAULT_COORDINATE.0, "lon": DEFAULT_COORDINATE.1 },
                "zoom": MAP_ZOOM,
            },
            "height": 400,
            "margin": { "r": 0, "t": 30, "l": 0, "b": 0 },
        },
    })
}

fn bar_figure(records: &[Record]) -> Value {
    let grouped = area_by_category(records);
    if grouped.is_empty() {
        return json!({
            "data": [],
            "layout": { "title": { "text": NO_DATA_TITLE }, "height": 400 },
        });
    }

    json!({
        "data": [{
            "type": "bar",
            "x": grouped.iter().map(|(c, _)| c.label()).collect::<Vec<_>>(),
            "y": grouped.iter().map(|(_, total)| total).collect::<Vec<_>>(),
            "marker": {
                "color": grouped.iter().map(|(c, _)| c.color()).collect::<Vec<_>>(),
            },
        }],
        "layout": {
            "showlegend": false,
            "height": 400,
            "yaxis": { "title": { "text": "Área (ha)" } },
        },
    })
}

/// A zero-row pie is rejected by the renderer, so an empty filtered set gets
/// a single placeholder slice with value 1 instead.
fn pie_figure(records: &[Record]) -> Value {
    let grouped = area_by_category(records);
    if grouped.is_empty() {
        return json!({
            "data": [{
                "type": "pie",
                "labels": [NO_DATA_SLICE],
                "values": [1],
            }],
            "layout": { "height": 300 },
        });
    }

    json!({
        "data": [{
            "type": "pie",
            "labels": grouped.iter().map(|(c, _)| c.label()).collect::<Vec<_>>(),
            "values": grouped.iter().map(|(_, total)| total).collect::<Vec<_>>(),
            "marker": {
                "colors": grouped.iter().map(|(c, _)| c.color()).collect::<Vec<_>>(),
            },
        }],
        "layout": { "height": 300 },
    })
}

fn table_artifact(records: &[Record], row_cap: Option<usize>) -> TableArtifact {
    if records.is_empty() {
        return TableArtifact::Placeholder {
            message: format!("{NO_DATA_TITLE} con el filtro seleccionado"),
        };
    }
    let cap = row_cap.unwrap_or(usize::MAX);
    let rows = records
        .iter()
        .take(cap)
        .map(|r| TableRow {
            municipality: r.municipality_name.clone(),
            category: r.category.label().to_string(),
            area: format_grouped(r.area_ha),
        })
        .collect();
    TableArtifact::Rows { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fallback_records;
    use crate::processing::build_map_view;
    use crate::types::Record;

    fn render(filter: &str) -> Artifacts {
        let records = fallback_records();
        let map_records = build_map_view(&records);
        render_dashboard(&records, &map_records, Some(20), filter).unwrap()
    }

    #[test]
    fn every_valid_filter_yields_four_artifacts() {
        for filter in ["all", "not-suitable", "low", "medium", "high"] {
            let artifacts = render(filter);
            assert!(artifacts.map.get("data").is_some(), "map for {filter}");
            assert!(artifacts.bar.get("data").is_some(), "bar for {filter}");
            assert!(artifacts.pie.get("data").is_some(), "pie for {filter}");
        }
    }

    #[test]
    fn category_filter_restricts_map_traces() {
        let artifacts = render("medium");
        let traces = artifacts.map["data"].as_array().unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0]["name"], "Aptitud media");
        assert_eq!(traces[0]["lat"].as_array().unwrap().len(), 2);
        assert_eq!(traces[0]["text"][0], "Maicao<br>Aptitud media<br>12,000 ha");

        let all = render("all");
        let all_traces = all.map["data"].as_array().unwrap();
        let total_points: usize = all_traces
            .iter()
            .map(|t| t["lat"].as_array().unwrap().len())
            .sum();
        assert_eq!(total_points, 5);
    }

    #[test]
    fn unfiltered_bar_values_sum_to_total_area() {
        let artifacts = render("all");
        let values = artifacts.bar["data"][0]["y"].as_array().unwrap();
        let sum: f64 = values.iter().map(|v| v.as_f64().unwrap()).sum();
        assert_eq!(sum, 49000.0);
    }

    #[test]
    fn empty_filter_result_degrades_to_placeholders() {
        // A dataset with no high-suitability rows makes that filter empty.
        let records: Vec<Record> = fallback_records()
            .into_iter()
            .filter(|r| r.category != SuitabilityCategory::High)
            .collect();
        let map_records = build_map_view(&records);
        let artifacts = render_dashboard(&records, &map_records, Some(20), "high").unwrap();

        assert_eq!(artifacts.map["data"].as_array().unwrap().len(), 0);
        assert_eq!(artifacts.map["layout"]["title"]["text"], NO_DATA_TITLE);
        assert_eq!(artifacts.bar["layout"]["title"]["text"], NO_DATA_TITLE);
        assert_eq!(artifacts.pie["data"][0]["labels"][0], NO_DATA_SLICE);
        assert_eq!(artifacts.pie["data"][0]["values"][0], 1);
        assert!(matches!(artifacts.table, TableArtifact::Placeholder { .. }));
    }

    #[test]
    fn table_caps_rows() {
        let records: Vec<Record> = (0..25)
            .map(|i| Record {
                municipality_code: format!("{:05}", 44001 + i),
                department_code: "44".to_string(),
                municipality_name: format!("Municipio {i}"),
                category: SuitabilityCategory::Low,
                area_ha: 100.0,
            })
            .collect();
        let map_records = build_map_view(&records);

        let capped = render_dashboard(&records, &map_records, Some(20), "low").unwrap();
        match capped.table {
            TableArtifact::Rows { rows } => assert_eq!(rows.len(), 20),
            TableArtifact::Placeholder { .. } => panic!("expected rows"),
        }

        let uncapped = render_dashboard(&records, &map_records, None, "low").unwrap();
        match uncapped.table {
            TableArtifact::Rows { rows } => assert_eq!(rows.len(), 25),
            TableArtifact::Placeholder { .. } => panic!("expected rows"),
        }
    }

    #[test]
    fn table_rows_carry_formatted_areas() {
        let artifacts = render("high");
        match artifacts.table {
            TableArtifact::Rows { rows } => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].municipality, "Riohacha");
                assert_eq!(rows[0].area, "15,000");
            }
            TableArtifact::Placeholder { .. } => panic!("expected rows"),
        }
    }

    #[test]
    fn unknown_filter_is_a_render_error() {
        let records = fallback_records();
        let map_records = build_map_view(&records);
        let err = render_dashboard(&records, &map_records, Some(20), "bogus").unwrap_err();
        assert!(matches!(err, RenderError::UnknownFilter { .. }));
    }

    #[test]
    fn error_artifacts_carry_the_message() {
        let err = RenderError::UnknownFilter {
            value: "bogus".to_string(),
        };
        let artifacts = error_artifacts(&err);
        let title = artifacts.bar["layout"]["title"]["text"].as_str().unwrap();
        assert!(title.starts_with("Error:"));
        assert!(matches!(artifacts.table, TableArtifact::Placeholder { .. }));
    }
}
