//! Output formatting for stores and preset listings, as markdown or JSON.

use serde_json::{Value, json};

use crate::presets::Preset;
use crate::store::Store;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// Preset listing with the active selection marked.
pub fn format_presets(presets: &[Preset], active: Option<&str>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "active": active,
                "presets": presets,
            });
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        }
        OutputFormat::Markdown => format_presets_markdown(presets, active),
    }
}

fn format_presets_markdown(presets: &[Preset], active: Option<&str>) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Presets ({})\n\n", presets.len()));

    let marker = |selected: bool| if selected { " *(active)*" } else { "" };
    md.push_str(&format!("- **default**{}\n", marker(active.is_none())));
    for preset in presets {
        md.push_str(&format!(
            "- **{}** `{}` (order {}){}",
            preset.name,
            preset.file_id,
            preset.order_index,
            marker(active == Some(preset.file_id.as_str()))
        ));
        if preset.marked_for_delete {
            md.push_str(" [pending delete]");
        }
        md.push('\n');
    }
    md
}

/// Store entries in key order.
pub fn format_store(title: &str, store: &Store, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let entries: serde_json::Map<String, Value> = store
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            let value = json!({ "store": title, "entries": entries });
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        }
        OutputFormat::Markdown => {
            let mut md = String::new();
            md.push_str(&format!("## Store: {}\n", title));
            if store.is_empty() {
                md.push_str("\n*(empty)*\n");
                return md;
            }
            md.push('\n');
            md.push_str("| key | value |\n|---|---|\n");
            for (key, value) in store.iter() {
                md.push_str(&format!(
                    "| `{}` | {} |\n",
                    key,
                    value.replace('|', "\\|")
                ));
            }
            md
        }
    }
}
