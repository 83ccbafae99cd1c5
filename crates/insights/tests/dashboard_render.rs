//! End-to-end rendering tests: file on disk → session → dashboard view.

use std::fs;

use insights::prelude::*;
use tempfile::TempDir;

const SALES_CSV: &str = "\
Order Date,Region,State,City,Category,Sub-Category,Segment,Sales,Profit,Quantity
01/05/2023,South,Kentucky,Henderson,Furniture,Bookcases,Consumer,261.96,41.91,2
01/17/2023,South,Kentucky,Henderson,Furniture,Chairs,Consumer,731.94,219.58,3
02/03/2023,West,California,Los Angeles,Office Supplies,Labels,Corporate,14.62,6.87,2
03/11/2023,West,California,San Diego,Technology,Phones,Home Office,907.15,90.72,6
04/02/2023,East,New York,New York City,Technology,Machines,Home Office,1706.18,85.31,9
";

fn context() -> (TempDir, DashboardContext) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sales.csv");
    fs::write(&path, SALES_CSV).unwrap();
    let dataset = Dataset::open(&DatasetSource::Path(path), DatePolicy::Strict).unwrap();
    (dir, DashboardContext::new(dataset))
}

#[test]
fn test_full_dashboard() {
    let (_dir, ctx) = context();
    let view = render_dashboard(&ctx, &RenderOptions::default());

    assert_eq!(view.title, "Market Insights Dashboard");
    assert_eq!(view.source_name.as_deref(), Some("sales.csv"));
    assert_eq!(view.upload_name, None);
    assert_eq!(view.row_count, 5);

    let months = &view.panel("monthly_trend").unwrap().data.as_ref().unwrap()["points"];
    let labels: Vec<&str> = months
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p[0].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["2023-01", "2023-02", "2023-03", "2023-04"]);

    let summary = view.panel("category_summary").unwrap();
    assert!(summary.collapsible);
    assert!(summary.html.contains("Office Supplies"));
}

#[test]
fn test_cascaded_options_follow_region() {
    let (_dir, mut ctx) = context();
    ctx.apply(ControlId::Regions, &ControlValue::Selection(vec!["West".to_string()]))
        .unwrap();
    let view = render_dashboard(&ctx, &RenderOptions::default());

    let cities = view
        .controls
        .iter()
        .find_map(|c| match c {
            insights_core::ControlDef::MultiSelect { id: ControlId::Cities, options, .. } => Some(options.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(cities, vec!["Los Angeles", "San Diego"]);
    assert_eq!(view.row_count, 2);
}

#[test]
fn test_date_controls_carry_bounds() {
    let (_dir, ctx) = context();
    let view = render_dashboard(&ctx, &RenderOptions::default());
    let json = serde_json::to_value(&view.controls).unwrap();
    let start = json.as_array().unwrap().iter().find(|c| c["id"] == "start_date").unwrap();
    assert_eq!(start["type"], "date_picker");
    assert_eq!(start["value"], "2023-01-05");
    assert_eq!(start["min"], "2023-01-05");
    assert_eq!(start["max"], "2023-04-02");
}

#[test]
fn test_text_rendering_mentions_every_chart() {
    let (_dir, ctx) = context();
    let text = render_dashboard(&ctx, &RenderOptions::default()).render_text();
    for title in [
        "Sales by Category",
        "Sales Distribution by Region",
        "Monthly Sales Trend",
        "Sales by Segment",
        "Relationship between Sales and Profit",
        "Filtered Data",
    ] {
        assert!(text.contains(title), "missing {title}");
    }
}
