//! WebAssembly module for the Anar trade calculator
//!
//! Provides client-side computation for:
//! - Live gross and totals while grades are edited
//! - Grade sheet editing with best/lowest row highlights
//! - Full profit/loss results and safe buy advice
//! - Alerts and CSV export
//! - Weighted average price and real-trade margins
//!
//! Structured values cross the boundary as JSON strings.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use shared::alerts;
use shared::coerce::{lenient_count, lenient_decimal};
use shared::engine::{aggregator, cost, GradeTotals};
use shared::export;
use shared::models::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    log("Anar calculator module initialized");
}

fn log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// Wall-clock time from the browser
fn now() -> DateTime<Utc> {
    #[cfg(target_arch = "wasm32")]
    {
        let millis = js_sys::Date::now() as i64;
        if let Some(at) = Utc.timestamp_millis_opt(millis).single() {
            return at;
        }
    }
    Utc::now()
}

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| {
        let message = format!("Invalid {} JSON: {}", what, e);
        log(&message);
        JsValue::from_str(&message)
    })
}

fn render<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Grade row with gross refreshed from boxes and rate
#[wasm_bindgen]
pub fn recompute_gross(grade_json: &str) -> Result<String, JsValue> {
    let mut grade: GradeEntry = parse(grade_json, "grade")?;
    aggregator::recompute_gross(&mut grade);
    render(&grade)
}

/// `{total_boxes, gross_sale}` for a list of grades
#[wasm_bindgen]
pub fn grade_totals(grades_json: &str) -> Result<String, JsValue> {
    let mut grades: Vec<GradeEntry> = parse(grades_json, "grades")?;
    for grade in grades.iter_mut() {
        aggregator::recompute_gross(grade);
    }
    render(&aggregator::totals(&grades))
}

/// One edit to the grade sheet, tagged by `action`
#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum SheetEdit {
    Add,
    SetNote {
        id: String,
        #[serde(default)]
        note: String,
    },
    SetBoxes {
        id: String,
        #[serde(default, deserialize_with = "lenient_count")]
        boxes: u32,
    },
    SetRate {
        id: String,
        #[serde(default, deserialize_with = "lenient_decimal")]
        rate: Decimal,
    },
    Remove {
        id: String,
    },
    FillSample,
    Clear,
}

#[derive(Serialize)]
struct SheetView {
    sheet: GradeSheet,
    totals: GradeTotals,
    extremes: Option<GrossExtremes>,
    /// Id of the row an `add` created
    added: Option<String>,
    /// False when the edit named a row that does not exist
    changed: bool,
}

impl SheetView {
    fn new(sheet: GradeSheet, added: Option<String>, changed: bool) -> Self {
        Self {
            totals: aggregator::totals(&sheet.entries),
            extremes: sheet.gross_extremes(),
            sheet,
            added,
            changed,
        }
    }
}

/// A fresh sheet holding the sample grades
#[wasm_bindgen]
pub fn new_grade_sheet() -> Result<String, JsValue> {
    render(&SheetView::new(GradeSheet::seeded(), None, true))
}

/// Apply one edit to a sheet and return the updated view
#[wasm_bindgen]
pub fn edit_grade_sheet(sheet_json: &str, edit_json: &str) -> Result<String, JsValue> {
    let mut sheet: GradeSheet = parse(sheet_json, "grade sheet")?;
    let edit: SheetEdit = parse(edit_json, "sheet edit")?;

    let mut added = None;
    let changed = match edit {
        SheetEdit::Add => {
            added = Some(sheet.add_grade());
            true
        }
        SheetEdit::SetNote { id, note } => sheet.set_note(&id, note),
        SheetEdit::SetBoxes { id, boxes } => sheet.set_boxes(&id, boxes),
        SheetEdit::SetRate { id, rate } => sheet.set_rate(&id, rate),
        SheetEdit::Remove { id } => sheet.remove_grade(&id),
        SheetEdit::FillSample => {
            sheet.fill_sample();
            true
        }
        SheetEdit::Clear => {
            sheet.clear();
            true
        }
    };

    render(&SheetView::new(sheet, added, changed))
}

/// Cost per box in rupees, as a decimal string
#[wasm_bindgen]
pub fn cost_per_box(settings_json: &str) -> Result<String, JsValue> {
    let settings: CostSettings = parse(settings_json, "settings")?;
    Ok(cost::cost_per_box(&settings).to_string())
}

#[derive(Deserialize)]
struct ComputeRequest {
    #[serde(default)]
    grades: Vec<GradeEntry>,
    #[serde(default)]
    settings: CostSettings,
    #[serde(default)]
    context: CalculationContext,
}

/// `{grades, settings, context}` -> CalculationResult
#[wasm_bindgen]
pub fn compute_result(request_json: &str) -> Result<String, JsValue> {
    let request: ComputeRequest = parse(request_json, "calculation request")?;
    let result = shared::compute_result_at(
        &request.grades,
        &request.settings,
        &request.context,
        Uuid::new_v4(),
        now(),
    );
    render(&result)
}

#[wasm_bindgen]
pub fn compute_safe_buy(result_json: &str) -> Result<String, JsValue> {
    let result: CalculationResult = parse(result_json, "result")?;
    render(&shared::compute_safe_buy(&result))
}

/// Current rate measured against the safe buy advice
#[wasm_bindgen]
pub fn safe_buy_comparison(result_json: &str) -> Result<String, JsValue> {
    let result: CalculationResult = parse(result_json, "result")?;
    let advice = shared::compute_safe_buy(&result);
    render(&SafeBuyComparison::new(&result, &advice))
}

#[derive(Deserialize)]
struct AlertsRequest {
    result: Option<CalculationResult>,
    #[serde(default)]
    grades: Vec<GradeEntry>,
}

#[wasm_bindgen]
pub fn evaluate_alerts(request_json: &str) -> Result<String, JsValue> {
    let request: AlertsRequest = parse(request_json, "alerts request")?;
    render(&alerts::evaluate_alerts(
        request.result.as_ref(),
        &request.grades,
    ))
}

/// CSV text of a result's grade table
#[wasm_bindgen]
pub fn export_grades_csv(result_json: &str) -> Result<String, JsValue> {
    let result: CalculationResult = parse(result_json, "result")?;
    export::grades_csv(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Suggested download name for a CSV export taken now
#[wasm_bindgen]
pub fn export_filename() -> String {
    export::export_filename(now())
}

#[derive(Serialize)]
struct WeightedAverage {
    summary: AverageSummary,
    spread: Option<PriceSpread>,
}

/// `[{price, weight}]` -> `{summary, spread}`, or an error when nothing is valid
#[wasm_bindgen]
pub fn weighted_average(entries_json: &str) -> Result<String, JsValue> {
    let entries: Vec<PriceEntry> = parse(entries_json, "price entries")?;
    let summary = AverageSummary::from_entries(&entries)
        .ok_or_else(|| JsValue::from_str("Please enter valid price and weight values"))?;
    let spread = PriceSpread::from_entries(&entries, summary.average_price);
    render(&WeightedAverage { summary, spread })
}

#[wasm_bindgen]
pub fn default_settings() -> Result<String, JsValue> {
    render(&CostSettings::default())
}

#[wasm_bindgen]
pub fn default_grades() -> Result<String, JsValue> {
    render(&shared::models::default_grades())
}

/// Per-kg margin and total for a real trade
#[wasm_bindgen]
pub fn trade_profit(kg_loaded: f64, farmer_price_per_kg: f64, broker_net_per_kg: f64) -> Result<String, JsValue> {
    let to_decimal = |v: f64| Decimal::try_from(v).unwrap_or(Decimal::ZERO);
    render(&shared::models::trade_profit(
        to_decimal(kg_loaded),
        to_decimal(farmer_price_per_kg),
        to_decimal(broker_net_per_kg),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn num(value: &Value) -> Decimal {
        value.as_str().and_then(|s| s.parse().ok()).unwrap()
    }

    #[test]
    fn test_compute_result_from_json() {
        let request = r#"{
            "grades": [
                {"note": "4 dana", "boxes": "1", "rate": 1890},
                {"note": "10 dana", "boxes": 1, "rate": "1700"}
            ],
            "settings": {"commission": 6, "transport": 75, "packing": 75,
                         "farmer_rate_kg": 131, "kg_per_box": 10}
        }"#;
        let result: Value = serde_json::from_str(&compute_result(request).unwrap()).unwrap();
        assert_eq!(result["total_boxes"], 2);
        assert_eq!(num(&result["gross_sale"]), Decimal::from(3590));
        assert_eq!(num(&result["profit"]), Decimal::new(4546, 1));
    }

    #[test]
    fn test_cost_per_box_defaults() {
        let settings = default_settings().unwrap();
        let per_box: Decimal = cost_per_box(&settings).unwrap().parse().unwrap();
        assert_eq!(per_box, Decimal::from(1460));
    }

    #[test]
    fn test_grade_totals_lenient() {
        let json = r#"[{"boxes": "abc", "rate": 10}, {"boxes": 2, "rate": 5}]"#;
        let totals: Value = serde_json::from_str(&grade_totals(json).unwrap()).unwrap();
        assert_eq!(totals["total_boxes"], 2);
        assert_eq!(num(&totals["gross_sale"]), Decimal::from(10));
    }

    #[test]
    fn test_trade_profit() {
        let profit: Value = serde_json::from_str(&trade_profit(100.0, 120.0, 135.0).unwrap()).unwrap();
        assert_eq!(num(&profit["farmer_broker_net"]), Decimal::from(15));
        assert_eq!(num(&profit["total_profit_loss"]), Decimal::from(1500));
    }

    #[test]
    fn test_weighted_average() {
        let json = r#"[{"price": 100, "weight": 10}, {"price": 130, "weight": 20}, {"price": 0, "weight": 5}]"#;
        let out: Value = serde_json::from_str(&weighted_average(json).unwrap()).unwrap();
        assert_eq!(num(&out["summary"]["average_price"]), Decimal::from(120));
        assert_eq!(out["summary"]["valid_entries"], 2);
    }

    #[test]
    fn test_export_filename_shape() {
        let name = export_filename();
        assert!(name.starts_with("anar-calculation-"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_grade_sheet_edits() {
        let view: Value = serde_json::from_str(&new_grade_sheet().unwrap()).unwrap();
        assert_eq!(view["totals"]["total_boxes"], 5);
        assert_eq!(num(&view["totals"]["gross_sale"]), Decimal::from(8040));
        let small = view["sheet"]["entries"][4]["id"].as_str().unwrap().to_string();
        assert_eq!(view["extremes"]["lowest"], small.as_str());

        let edit = json!({"action": "set_boxes", "id": small, "boxes": "3"}).to_string();
        let view: Value = serde_json::from_str(&edit_grade_sheet(&view["sheet"].to_string(), &edit).unwrap()).unwrap();
        assert_eq!(view["changed"], true);
        assert_eq!(num(&view["sheet"]["entries"][4]["gross"]), Decimal::from(3900));
        assert_eq!(view["extremes"]["highest"], small.as_str());

        let edit = json!({"action": "remove", "id": "grade-missing"}).to_string();
        let view: Value = serde_json::from_str(&edit_grade_sheet(&view["sheet"].to_string(), &edit).unwrap()).unwrap();
        assert_eq!(view["changed"], false);

        let edit = json!({"action": "add"}).to_string();
        let view: Value = serde_json::from_str(&edit_grade_sheet(&view["sheet"].to_string(), &edit).unwrap()).unwrap();
        assert!(view["added"].as_str().unwrap().starts_with("grade-"));
        assert_eq!(view["sheet"]["entries"].as_array().unwrap().len(), 6);

        let edit = json!({"action": "clear"}).to_string();
        let view: Value = serde_json::from_str(&edit_grade_sheet(&view["sheet"].to_string(), &edit).unwrap()).unwrap();
        assert!(view["extremes"].is_null());
        assert_eq!(view["totals"]["total_boxes"], 0);
    }
}
