use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::ReferenceDataError;

/// Test name → body-system category (loaded from categories.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub test_name: String,
    pub category: String,
}

/// Controlled translation for an English phrase (loaded from glossary.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub english: String,
    /// Language code → phrase.
    pub translations: BTreeMap<String, String>,
}

/// Unit to assume when a report leaves the unit column blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultUnit {
    pub test_name: String,
    pub unit: String,
}

/// Read-only lookup tables shared by extraction, classification and translation.
///
/// Built once at startup and passed by reference; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    categories: HashMap<String, String>,
    glossary: Vec<GlossaryEntry>,
    default_units: HashMap<String, String>,
}

impl ReferenceTables {
    pub fn new(
        categories: Vec<CategoryEntry>,
        glossary: Vec<GlossaryEntry>,
        default_units: Vec<DefaultUnit>,
    ) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|c| (c.test_name.trim().to_lowercase(), c.category))
                .collect(),
            glossary,
            default_units: default_units
                .into_iter()
                .map(|d| (d.test_name.trim().to_lowercase(), d.unit))
                .collect(),
        }
    }

    /// Load tables from `categories.json`, `glossary.json` and `default_units.json`.
    pub fn load(dir: &std::path::Path) -> Result<Self, ReferenceDataError> {
        let categories: Vec<CategoryEntry> = read_json(dir, "categories.json")?;
        let glossary: Vec<GlossaryEntry> = read_json(dir, "glossary.json")?;
        let default_units: Vec<DefaultUnit> = read_json(dir, "default_units.json")?;

        tracing::info!(
            dir = %dir.display(),
            categories = categories.len(),
            glossary = glossary.len(),
            default_units = default_units.len(),
            "Loaded reference tables"
        );

        Ok(Self::new(categories, glossary, default_units))
    }

    /// Tables compiled into the binary.
    pub fn builtin() -> Self {
        let categories = [
            ("fasting blood sugar", "blood sugar"),
            ("post prandial blood sugar", "blood sugar"),
            ("random blood sugar", "blood sugar"),
            ("hba1c", "blood sugar"),
            ("total cholesterol", "cholesterol"),
            ("ldl", "cholesterol"),
            ("hdl", "cholesterol"),
            ("triglycerides", "cholesterol"),
            ("creatinine", "kidney"),
            ("bun", "kidney"),
            ("sgpt", "liver"),
            ("sgot", "liver"),
        ]
        .into_iter()
        .map(|(test_name, category)| CategoryEntry {
            test_name: test_name.into(),
            category: category.into(),
        })
        .collect();

        let glossary = [
            (
                "fasting blood sugar",
                "उपासाचा रक्तातील साखर",
                "उपवास के समय की रक्त शर्करा",
            ),
            ("slightly high", "थोडी जास्त आहे", "थोड़ी अधिक है"),
            ("normal", "सामान्य आहे", "सामान्य है"),
            (
                "please show this report to your doctor",
                "कृपया ही चाचणी तुमच्या डॉक्टरांना दाखवा.",
                "कृपया यह जांच अपने डॉक्टर को दिखाएँ।",
            ),
        ]
        .into_iter()
        .map(|(english, mr, hi)| GlossaryEntry {
            english: english.into(),
            translations: BTreeMap::from([("mr".into(), mr.into()), ("hi".into(), hi.into())]),
        })
        .collect();

        let default_units = [
            ("Haemoglobin", "g/dL"),
            ("RBC Count", "millions/µL"),
            ("PCV", "%"),
            ("MCV", "fL"),
            ("MCH", "pg"),
            ("MCHC", "g/dL"),
            ("RDW-CV", "%"),
            ("Platelet Count", "cells/µL"),
            ("WBC Count", "cells/µL"),
            ("Neutrophils", "%"),
            ("Lymphocytes", "%"),
            ("Monocytes", "%"),
            ("Eosinophils", "%"),
            ("Basophils", "%"),
        ]
        .into_iter()
        .map(|(test_name, unit)| DefaultUnit {
            test_name: test_name.into(),
            unit: unit.into(),
        })
        .collect();

        Self::new(categories, glossary, default_units)
    }

    /// Category for a test name (case-insensitive, exact match after trimming).
    pub fn category_for(&self, test_name: &str) -> Option<&str> {
        self.categories
            .get(&test_name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Default unit for a test name (case-insensitive, exact match after trimming).
    pub fn default_unit_for(&self, test_name: &str) -> Option<&str> {
        self.default_units
            .get(&test_name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Glossary entries in declaration order.
    pub fn glossary(&self) -> &[GlossaryEntry] {
        &self.glossary
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    dir: &std::path::Path,
    filename: &str,
) -> Result<T, ReferenceDataError> {
    let path = dir.join(filename);
    let json = std::fs::read_to_string(&path)
        .map_err(|e| ReferenceDataError::Load(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| ReferenceDataError::Parse(filename.into(), e.to_string()))
}
