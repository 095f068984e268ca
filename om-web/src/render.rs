//! Tera template rendering
//!
//! Templates are embedded at compile time and registered once. Display
//! formatting lives in filters backed by `om_common::format` and
//! `om_common::reference`, so templates receive raw numbers and codes.

use std::collections::HashMap;

use om_common::format::{
    decile_class, format_cpc, format_excl_date, format_money, format_money_full, format_number,
    format_percent, title_case, truncate_name, RiskLevel,
};
use om_common::reference::{flag_info, hcpcs_description, hcpcs_label, state_name};
use serde::Serialize;
use tera::{Context, Tera, Value};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("pager.html", include_str!("../templates/pager.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("watchlist.html", include_str!("../templates/watchlist.html")),
    ("providers.html", include_str!("../templates/providers.html")),
    ("provider.html", include_str!("../templates/provider.html")),
    ("procedures.html", include_str!("../templates/procedures.html")),
    ("procedure.html", include_str!("../templates/procedure.html")),
    ("states.html", include_str!("../templates/states.html")),
    ("state.html", include_str!("../templates/state.html")),
    ("exclusions.html", include_str!("../templates/exclusions.html")),
    ("matched.html", include_str!("../templates/matched.html")),
    ("check.html", include_str!("../templates/check.html")),
    ("lookup.html", include_str!("../templates/lookup.html")),
    ("timeline.html", include_str!("../templates/timeline.html")),
    ("trends.html", include_str!("../templates/trends.html")),
    ("risk.html", include_str!("../templates/risk.html")),
    ("compare.html", include_str!("../templates/compare.html")),
    ("ml_analysis.html", include_str!("../templates/ml_analysis.html")),
    ("specialties.html", include_str!("../templates/specialties.html")),
    ("specialty.html", include_str!("../templates/specialty.html")),
    ("hotspots.html", include_str!("../templates/hotspots.html")),
    ("hotspot.html", include_str!("../templates/hotspot.html")),
    ("insights.html", include_str!("../templates/insights.html")),
    ("insight.html", include_str!("../templates/insight.html")),
    ("downloads.html", include_str!("../templates/downloads.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
];

pub struct Renderer {
    tera: Tera,
    site_url: String,
}

impl Renderer {
    pub fn new(site_url: &str) -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        register_filters(&mut tera);
        Ok(Self {
            tera,
            site_url: site_url.to_string(),
        })
    }

    /// Render `template` with the fields of `page` plus the site globals
    pub fn render<T: Serialize>(&self, template: &str, page: &T) -> tera::Result<String> {
        let mut context = Context::from_serialize(page)?;
        context.insert("site_url", &self.site_url);
        context.insert("version", env!("CARGO_PKG_VERSION"));
        self.tera.render(template, &context)
    }
}

fn register_filters(tera: &mut Tera) {
    tera.register_filter("money", money);
    tera.register_filter("money_full", money_full);
    tera.register_filter("number", number);
    tera.register_filter("percent", percent);
    tera.register_filter("cpc", cpc);
    tera.register_filter("excl_date", excl_date);
    tera.register_filter("state_name", state_name_filter);
    tera.register_filter("hcpcs_label", hcpcs_label_filter);
    tera.register_filter("hcpcs_desc", hcpcs_desc_filter);
    tera.register_filter("flag_label", flag_label_filter);
    tera.register_filter("flag_tone", flag_tone_filter);
    tera.register_filter("flag_desc", flag_desc_filter);
    tera.register_filter("title_case", title_case_filter);
    tera.register_filter("truncate_name", truncate_name_filter);
    tera.register_filter("risk_class", risk_class);
    tera.register_filter("risk_label", risk_label);
    tera.register_filter("tier_class", tier_class);
    tera.register_filter("decile_class", decile_class_filter);
}

type Args = HashMap<String, Value>;

/// Numeric filter input; null and missing values count as zero
fn as_number(value: &Value, filter: &str) -> tera::Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| tera::Error::msg(format!("{}: number out of range", filter))),
        Value::Null => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| tera::Error::msg(format!("{}: expected a number, got {:?}", filter, s))),
        other => Err(tera::Error::msg(format!("{}: expected a number, got {}", filter, other))),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn text(s: String) -> tera::Result<Value> {
    Ok(Value::String(s))
}

fn money(value: &Value, _: &Args) -> tera::Result<Value> {
    text(format_money(as_number(value, "money")?))
}

fn money_full(value: &Value, _: &Args) -> tera::Result<Value> {
    text(format_money_full(as_number(value, "money_full")?))
}

fn number(value: &Value, _: &Args) -> tera::Result<Value> {
    text(format_number(as_number(value, "number")?))
}

fn percent(value: &Value, _: &Args) -> tera::Result<Value> {
    text(format_percent(as_number(value, "percent")?))
}

fn cpc(value: &Value, _: &Args) -> tera::Result<Value> {
    let n = match value {
        Value::Null => None,
        v => Some(as_number(v, "cpc")?),
    };
    text(format_cpc(n))
}

fn excl_date(value: &Value, _: &Args) -> tera::Result<Value> {
    text(format_excl_date(&as_text(value)))
}

fn state_name_filter(value: &Value, _: &Args) -> tera::Result<Value> {
    text(state_name(&as_text(value)))
}

fn hcpcs_label_filter(value: &Value, _: &Args) -> tera::Result<Value> {
    text(hcpcs_label(&as_text(value)))
}

fn hcpcs_desc_filter(value: &Value, _: &Args) -> tera::Result<Value> {
    text(hcpcs_description(&as_text(value)).to_string())
}

fn flag_label_filter(value: &Value, _: &Args) -> tera::Result<Value> {
    text(flag_info(&as_text(value)).label)
}

fn flag_tone_filter(value: &Value, _: &Args) -> tera::Result<Value> {
    text(flag_info(&as_text(value)).tone.to_string())
}

fn flag_desc_filter(value: &Value, _: &Args) -> tera::Result<Value> {
    text(flag_info(&as_text(value)).description)
}

fn title_case_filter(value: &Value, _: &Args) -> tera::Result<Value> {
    text(title_case(&as_text(value)))
}

/// `{{ name | truncate_name(len=28) }}`, 35 characters by default
fn truncate_name_filter(value: &Value, args: &Args) -> tera::Result<Value> {
    let len = args.get("len").and_then(Value::as_u64).unwrap_or(35) as usize;
    text(truncate_name(&as_text(value), len))
}

fn risk_level(value: &Value) -> tera::Result<RiskLevel> {
    let count = as_number(value, "risk")?.max(0.0) as u32;
    Ok(RiskLevel::from_flag_count(count))
}

fn risk_class(value: &Value, _: &Args) -> tera::Result<Value> {
    text(risk_level(value)?.css_class().to_string())
}

fn risk_label(value: &Value, _: &Args) -> tera::Result<Value> {
    text(risk_level(value)?.label().to_string())
}

/// CSS class for a serialized unified tier (`"Critical"`, `"ML Flag"`, ...)
fn tier_class(value: &Value, _: &Args) -> tera::Result<Value> {
    let class = match as_text(value).as_str() {
        "Critical" => "tier-critical",
        "High" => "tier-high",
        "Elevated" => "tier-elevated",
        "ML Flag" => "tier-ml",
        _ => "tier-low",
    };
    text(class.to_string())
}

fn decile_class_filter(value: &Value, _: &Args) -> tera::Result<Value> {
    text(decile_class(&as_text(value)).to_string())
}
