//! CLI presentation: text and json formatters for plans and explanations.

use crate::emit::ActivationPlan;
use crate::fragment::Origin;
use crate::value::Value;
use comfy_table::Table;
use owo_colors::OwoColorize;

pub fn format_plan_text(plan: &ActivationPlan) -> String {
    let mut out = String::new();
    if plan.is_empty() {
        out.push_str("No modules enabled.");
    } else {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["#", "Module", "Config Key", "Options"]);
        for record in plan.records() {
            table.add_row(vec![
                record.position().to_string(),
                record.module().to_string(),
                record.config_key().to_string(),
                compact_json(&Value::Tree(record.options().clone())),
            ]);
        }
        out.push_str(&table.to_string());
    }
    out.push_str(&format!("\n{} {}", "Fingerprint:".bold(), plan.fingerprint()));
    out
}

pub fn format_plan_json(plan: &ActivationPlan) -> Result<String, serde_json::Error> {
    plan.to_json_pretty()
}

/// `origin` is `None` for subtrees assembled from several layers.
pub fn format_explain_text(key: &str, value: &Value, origin: Option<Origin>) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Key", "Value", "Origin"]);
    table.add_row(vec![
        key.to_string(),
        compact_json(value),
        origin.map_or_else(|| "(merged)".to_string(), |o| o.to_string()),
    ]);
    table.to_string()
}

pub fn format_explain_json(
    key: &str,
    value: &Value,
    origin: Option<Origin>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "key": key,
        "value": value,
        "origin": origin,
    }))
}

pub fn format_check_ok(plan: &ActivationPlan) -> String {
    format!(
        "{} {} module(s) resolved, fingerprint {}",
        "ok:".green().bold(),
        plan.len(),
        plan.fingerprint()
    )
}

fn compact_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<unprintable>".to_string())
}
