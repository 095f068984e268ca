//! Reference tables: procedure code descriptions, state names and the
//! catalog of statistical flags shown on provider pages.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Short descriptions for the procedure codes the site discusses most
static HCPCS_DESCRIPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
    ("T1019", "Personal care services, per 15 min"),
    ("T1015", "Clinic visit/encounter, all-inclusive"),
    ("T2016", "Habilitation, residential, waiver; per diem"),
    ("99213", "Office/outpatient visit, est. patient, low-mod complexity"),
    ("S5125", "Attendant care services, per 15 min"),
    ("99214", "Office/outpatient visit, est. patient, mod-high complexity"),
    ("99284", "Emergency dept visit, high complexity"),
    ("H2016", "Comprehensive community support services, per 15 min"),
    ("99283", "Emergency dept visit, moderate complexity"),
    ("H2015", "Comprehensive community support services, per 15 min"),
    ("99285", "Emergency dept visit, high/urgent complexity"),
    ("90837", "Psychotherapy, 60 minutes"),
    ("S5102", "Day care services, adult; per 15 min"),
    ("90834", "Psychotherapy, 45 minutes"),
    ("T2021", "Day habilitation, waiver; per 15 min"),
    ("H2017", "Psychosocial rehabilitation services, per 15 min"),
    ("T1017", "Targeted case management, per 15 min"),
    ("T1020", "Personal care services, per diem"),
    ("90999", "Unlisted dialysis procedure"),
    ("A0427", "Ambulance, ALS emergency transport Level 1"),
    ("92507", "Speech/hearing/language treatment"),
    ("H2019", "Therapeutic behavioral services, per 15 min"),
    ("T2033", "Residential care, NOS; per diem"),
    ("T1000", "Private duty/independent nursing service(s)"),
    ("H2014", "Skills training & development, per 15 min"),
    ("H0004", "Behavioral health counseling & therapy, per 15 min"),
    ("S5140", "Foster care, adult; per diem"),
    ("H0020", "Alcohol/drug services; methadone administration"),
    ("97530", "Therapeutic activities, each 15 min"),
    ("A0429", "Ambulance, BLS emergency transport"),
    ("H0019", "Behavioral health; residential, per diem"),
    ("T1040", "Medicaid certified CCBHC services"),
    ("99509", "Home visit, assistance w/ ADLs"),
    ("00003", "Anesthesia services"),
    ("T2023", "Community transition, waiver; per service"),
    ("T1016", "Case management, each 15 min"),
    ("97153", "Adaptive behavior treatment by protocol, per 15 min"),
    ("97110", "Therapeutic exercises, each 15 min"),
    ("S9124", "Nursing care, in the home; per hour"),
    ("S5130", "Homemaker service, NOS; per 15 min"),
    ("H2036", "Alcohol/drug treatment, per hour"),
    ("T2031", "Waiver services, not otherwise specified"),
    ("H0036", "Community psychiatric supportive treatment, per 15 min"),
    ("G0463", "Hospital outpatient clinic visit"),
    ("S5126", "Attendant care services, per diem"),
    ("H0018", "Behavioral health; short-term residential, per diem"),
    ("T2046", "Habilitation, residential, waiver; per month"),
    ("U0003", "Infectious disease detection (COVID-19)"),
    ("A0100", "Non-emergency transportation; per trip"),
    ("H2022", "Community-based wrap-around services, per diem"),
    ("A0110", "Non-emergency taxi transport"),
    ("A0120", "Non-emergency mini-bus transport"),
    ("A0434", "Ambulance, specialty care transport"),
    ("T1021", "Home health aide visit, per 15 min"),
    ("S5110", "Home care training, family; per 15 min"),
    ("H0044", "Supported housing, per diem"),
    ("H2010", "Comprehensive medication services, per 15 min"),
    ("T2003", "Non-emergency transport; encounter/trip"),
    ("T2017", "Habilitation, residential, waiver; 15 min"),
    ("T1024", "Evaluation & treatment, integrated specialty team"),
    ("T2028", "Specialized supply, NOS; per unit"),
    ("T2040", "Financial management, self-directed; per month"),
    ("T1028", "Assessment of home, physical & family environments"),
    ("K0606", "Automated external defibrillator"),
    ("99211", "Office/outpatient visit, minimal complexity"),
    ("99212", "Office/outpatient visit, low complexity"),
    ("99215", "Office/outpatient visit, high complexity"),
    ("99282", "Emergency dept visit, low complexity"),
    ("99281", "Emergency dept visit, minimal complexity"),
    ("90832", "Psychotherapy, 30 minutes"),
    ("90847", "Family psychotherapy with patient, 50 min"),
    ("90846", "Family psychotherapy without patient, 50 min"),
    ("96372", "Therapeutic injection, subcutaneous/intramuscular"),
    ("99202", "Office/outpatient visit, new patient, low complexity"),
    ("99203", "Office/outpatient visit, new patient, low-mod complexity"),
    ("99204", "Office/outpatient visit, new patient, mod-high complexity"),
    ("99205", "Office/outpatient visit, new patient, high complexity"),
    ("87635", "COVID-19 SARS-CoV-2 amplified probe detection"),
    ("91300", "COVID-19 vaccine (Pfizer), first dose"),
    ("91301", "COVID-19 vaccine (Moderna), first dose"),
    ("91302", "COVID-19 vaccine (AstraZeneca), first dose"),
    ("91303", "COVID-19 vaccine (J&J/Janssen), single dose"),
    ("0001A", "COVID-19 vaccine admin, Pfizer, 1st dose"),
    ("0002A", "COVID-19 vaccine admin, Pfizer, 2nd dose"),
    ("0003A", "COVID-19 vaccine admin, Pfizer, 3rd dose"),
    ("0011A", "COVID-19 vaccine admin, Moderna, 1st dose"),
    ("0012A", "COVID-19 vaccine admin, Moderna, 2nd dose"),
    ("0031A", "COVID-19 vaccine admin, J&J, single dose"),
    ("J2326", "Nusinersen (Spinraza), 12 mg intrathecal injection"),
    ("J1426", "Casimersen (Amondys 45) injection, 10 mg"),
    ("J7170", "Emicizumab-kxwh (Hemlibra) injection, 0.5 mg"),
    ("J1428", "Eteplirsen (Exondys 51) injection, 10 mg"),
    ("J7175", "Factor X (human), per IU"),
    ("J0219", "Atezolizumab (Tecentriq) injection, 10 mg"),
    ("J1303", "Ravulizumab (Ultomiris) injection, 10 mg"),
    ("J3032", "Voretigene neparvovec (Luxturna) injection"),
    ("J0179", "Avelumab (Bavencio) injection, 10 mg"),
    ("J9299", "Nivolumab (Opdivo) injection, 1 mg"),
    ("J0222", "Patisiran (Onpattro) injection, 0.1 mg"),
    ("J2350", "Ocrelizumab (Ocrevus) injection, 1 mg"),
    ("S5121", "Attendant care services, in-home, per 15 min"),
    ("W1793", "State-defined waiver service"),
    ("S9977", "Home infusion therapy, unspecified"),
    ("81416", "Exome sequence analysis"),
    ("D2740", "Crown, porcelain/ceramic substrate"),
    ("97151", "Behavior identification assessment"),
    ("97154", "Group adaptive behavior treatment, per 15 min"),
    ("0128", "Insertion of brain-computer interface"),
    ]
    .into_iter()
    .collect()
});

/// Description for a procedure code, or an empty string when unknown.
pub fn hcpcs_description(code: &str) -> &'static str {
    HCPCS_DESCRIPTIONS.get(code).copied().unwrap_or("")
}

/// Code and description joined by an em dash (`\u{2014}`) when the code is known, otherwise the bare code.
pub fn hcpcs_label(code: &str) -> String {
    match HCPCS_DESCRIPTIONS.get(code) {
        Some(desc) => format!("{} \u{2014} {}", code, desc),
        None => code.to_string(),
    }
}

static STATE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("AL", "Alabama"), ("AK", "Alaska"), ("AZ", "Arizona"), ("AR", "Arkansas"),
        ("CA", "California"), ("CO", "Colorado"), ("CT", "Connecticut"), ("DE", "Delaware"),
        ("DC", "District of Columbia"), ("FL", "Florida"), ("GA", "Georgia"), ("HI", "Hawaii"),
        ("ID", "Idaho"), ("IL", "Illinois"), ("IN", "Indiana"), ("IA", "Iowa"),
        ("KS", "Kansas"), ("KY", "Kentucky"), ("LA", "Louisiana"), ("ME", "Maine"),
        ("MD", "Maryland"), ("MA", "Massachusetts"), ("MI", "Michigan"), ("MN", "Minnesota"),
        ("MS", "Mississippi"), ("MO", "Missouri"), ("MT", "Montana"), ("NE", "Nebraska"),
        ("NV", "Nevada"), ("NH", "New Hampshire"), ("NJ", "New Jersey"), ("NM", "New Mexico"),
        ("NY", "New York"), ("NC", "North Carolina"), ("ND", "North Dakota"), ("OH", "Ohio"),
        ("OK", "Oklahoma"), ("OR", "Oregon"), ("PA", "Pennsylvania"), ("PR", "Puerto Rico"),
        ("RI", "Rhode Island"), ("SC", "South Carolina"), ("SD", "South Dakota"),
        ("TN", "Tennessee"), ("TX", "Texas"), ("UT", "Utah"), ("VT", "Vermont"),
        ("VA", "Virginia"), ("WA", "Washington"), ("WV", "West Virginia"), ("WI", "Wisconsin"),
        ("WY", "Wyoming"),
    ]
    .into_iter()
    .collect()
});

/// Full state name for a two-letter code; unknown codes are returned as-is.
pub fn state_name(code: &str) -> String {
    STATE_NAMES
        .get(code)
        .map(|name| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Display metadata for a statistical flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagInfo {
    pub label: String,
    pub description: String,
    /// Colour family used by the stylesheet (`tone-red`, `tone-amber`, ...)
    pub tone: &'static str,
}

static FLAG_INFO: Lazy<HashMap<&'static str, (&'static str, &'static str, &'static str)>> =
    Lazy::new(|| {
        [
            ("outlier_spending", ("Unusually High Spending",
                "This provider's total payments are significantly above the median for their specialty.",
                "tone-red")),
            ("unusual_cost_per_claim", ("High Cost Per Claim",
                "Average payment per claim is much higher than peers billing the same procedures.",
                "tone-amber")),
            ("unusual_cost", ("High Cost Per Claim",
                "Average payment per claim is much higher than peers billing the same procedures.",
                "tone-amber")),
            ("beneficiary_stuffing", ("High Claims Per Patient",
                "Filing an unusually high number of claims per beneficiary compared to peers.",
                "tone-blue")),
            ("bene_stuffing", ("High Claims Per Patient",
                "Filing an unusually high number of claims per beneficiary compared to peers.",
                "tone-blue")),
            ("spending_spike", ("Spending Spike",
                "Experienced a dramatic increase in billing over a short period.",
                "tone-purple")),
            ("explosive_growth", ("Explosive Growth",
                "Billing increased over 500% year-over-year, far beyond normal growth patterns.",
                "tone-red")),
            ("instant_high_volume", ("Instant High Volume",
                "New provider billing over $1M in their first year of Medicaid participation.",
                "tone-amber")),
            ("procedure_concentration", ("Single-Code Billing",
                "Billing almost exclusively for 1-2 procedure codes despite high total volume.",
                "tone-orange")),
            ("billing_consistency", ("Suspiciously Consistent",
                "Monthly billing amounts show almost no natural variation (CV < 0.1).",
                "tone-cyan")),
            ("extreme_beneficiary_stuffing", ("Extreme Claims Per Patient",
                "Filing over 100 claims per beneficiary, far exceeding any normal treatment pattern.",
                "tone-red")),
            ("code_specific_outlier", ("Code-Specific Cost Outlier",
                "Billing over 3\u{00d7} the national median for specific procedure codes.",
                "tone-red")),
            ("billing_swing", ("Major Billing Swing",
                "Experienced over 200% change in year-over-year billing with >$1M absolute change.",
                "tone-purple")),
            ("massive_new_entrant", ("Massive New Entrant",
                "Started billing recently but already receiving millions in Medicaid payments.",
                "tone-amber")),
            ("rate_outlier_multi_code", ("Multi-Code Rate Outlier",
                "Billing above the 90th percentile across multiple procedure codes simultaneously.",
                "tone-orange")),
        ]
        .into_iter()
        .collect()
    });

/// Display metadata for a flag key; unknown keys get a readable fallback.
pub fn flag_info(flag: &str) -> FlagInfo {
    match FLAG_INFO.get(flag) {
        Some((label, description, tone)) => FlagInfo {
            label: label.to_string(),
            description: description.to_string(),
            tone: *tone,
        },
        None => FlagInfo {
            label: humanize_flag(flag),
            description: "Statistical anomaly detected in billing patterns.".to_string(),
            tone: "tone-slate",
        },
    }
}

/// Short label for a flag key.
pub fn flag_label(flag: &str) -> String {
    flag_info(flag).label
}

/// `rate_outlier` -> `Rate Outlier`
fn humanize_flag(flag: &str) -> String {
    flag.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize flags from either the pipe-separated legacy format or a list.
///
/// Items are trimmed, empty items dropped and duplicates removed while the
/// first occurrence keeps its position.
pub fn parse_flags<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        for flag in item.as_ref().split('|').map(str::trim) {
            if !flag.is_empty() && seen.insert(flag.to_string()) {
                out.push(flag.to_string());
            }
        }
    }
    out
}

/// Procedure codes offered by the global search box
pub const COMMON_CODES: &[(&str, &str)] = &[
    ("T1019", "Personal care services"),
    ("T2016", "Residential habilitation"),
    ("99213", "Office visit (established, low)"),
    ("99214", "Office visit (established, mod)"),
    ("A0427", "ALS emergency transport"),
    ("H2015", "Comprehensive community support"),
    ("H2016", "Comprehensive community support (per diem)"),
    ("T1015", "Clinic visit/encounter"),
    ("S5125", "Attendant care (per 15 min)"),
    ("T2022", "Case management (per month)"),
];

/// Editorial background for a handful of heavily billed codes.
pub fn procedure_context(code: &str) -> Option<&'static str> {
    let note = match code {
        "T1019" => "Personal care services (T1019) is the #1 spending code in all of Medicaid. Services are provided in private homes, making them difficult to verify. The HHS OIG identifies personal care as the highest fraud-risk Medicaid category.",
        "T2016" => "Residential habilitation (T2016) is a per-diem code for waiver-based residential care. Typical rates range from $200-400/day. Per diem codes cover an entire day of care, so high values may reflect bundled services.",
        "A0427" => "ALS emergency ambulance transport (A0427) has a national median of about $163/trip.",
        "99213" => "Office visit for an established patient with low complexity (99213) is one of the most commonly billed codes in all of healthcare. Due to its volume, even small per-claim anomalies can represent significant spending.",
        "99214" => "Office visit for an established patient with moderate complexity (99214) is the higher-level counterpart to 99213. Upcoding from 99213 to 99214 is a well-documented fraud pattern.",
        "H2015" => "Comprehensive community support services (H2015) covers intensive community-based behavioral health services and is closely monitored for billing anomalies.",
        "H2016" => "Comprehensive community support per diem (H2016) covers a full day of community-based behavioral health services, an area investigators have flagged for limited verification mechanisms.",
        _ => return None,
    };
    Some(note)
}

/// Readable name of an ML model feature column; unknown columns pass through.
pub fn feature_label(feature: &str) -> &str {
    match feature {
        "total_paid" => "Total Payments",
        "total_claims" => "Total Claims",
        "total_benes" => "Total Beneficiaries",
        "code_count" => "Unique Procedure Codes",
        "active_months" => "Active Months",
        "cpc" => "Cost Per Claim",
        "cpb" => "Cost Per Beneficiary",
        "cpb_claims" => "Claims Per Beneficiary",
        "paid_per_mo" => "Payments Per Month",
        "claims_per_mo" => "Claims Per Month",
        "top_code_conc" => "Top Code Concentration",
        "self_bill_ratio" => "Self-Billing Ratio",
        "short_burst" => "Short Burst Billing",
        "low_code_high" => "Low Codes / High Spend",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hcpcs_label_known_and_unknown() {
        assert_eq!(hcpcs_label("T1019"), "T1019 \u{2014} Personal care services, per 15 min");
        assert_eq!(hcpcs_label("ZZZZZ"), "ZZZZZ");
        assert_eq!(hcpcs_description("ZZZZZ"), "");
    }

    #[test]
    fn test_state_name_fallback() {
        assert_eq!(state_name("NY"), "New York");
        assert_eq!(state_name("XX"), "XX");
    }

    #[test]
    fn test_flag_info_known() {
        let info = flag_info("billing_swing");
        assert_eq!(info.label, "Major Billing Swing");
        assert_eq!(info.tone, "tone-purple");
    }

    #[test]
    fn test_flag_info_unknown_is_humanized() {
        let info = flag_info("weird_new_test");
        assert_eq!(info.label, "Weird New Test");
        assert_eq!(info.tone, "tone-slate");
    }

    #[test]
    fn test_parse_flags_pipe_and_list() {
        assert_eq!(
            parse_flags(&["outlier_spending| explosive_growth |"]),
            vec!["outlier_spending", "explosive_growth"]
        );
        assert_eq!(
            parse_flags(&["a|b", "b", "c"]),
            vec!["a", "b", "c"]
        );
        assert!(parse_flags::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_feature_label() {
        assert_eq!(feature_label("self_bill_ratio"), "Self-Billing Ratio");
        assert_eq!(feature_label("new_column"), "new_column");
    }
}
