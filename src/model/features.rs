//! Feature Vector Module
//! The twelve model inputs, their UI ranges and a fixed naming/ordering contract.

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 12;

/// Input names in the order the model was fit on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "LotArea",
    "OverallQual",
    "YearRemodAdd",
    "TotalBsmtSF",
    "1stFlrSF",
    "GrLivArea",
    "FullBath",
    "TotRmsAbvGrd",
    "GarageYrBlt",
    "GarageCars",
    "GarageArea",
    "YrSold",
];

/// How an input is edited on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Slider,
    Number,
}

/// UI metadata for one input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
    pub kind: InputKind,
}

pub const FEATURE_SPECS: [FeatureSpec; FEATURE_COUNT] = [
    FeatureSpec {
        name: "LotArea",
        label: "Lot area (sq ft)",
        help: "Total lot surface",
        min: 200.0,
        max: 5000.0,
        default: 300.0,
        step: 50.0,
        kind: InputKind::Number,
    },
    FeatureSpec {
        name: "OverallQual",
        label: "Overall construction quality",
        help: "1 to 10 rating of materials and finish",
        min: 1.0,
        max: 10.0,
        default: 6.0,
        step: 1.0,
        kind: InputKind::Slider,
    },
    FeatureSpec {
        name: "YearRemodAdd",
        label: "Remodel year",
        help: "Year of the last major renovation",
        min: 1950.0,
        max: 2023.0,
        default: 2000.0,
        step: 1.0,
        kind: InputKind::Number,
    },
    FeatureSpec {
        name: "TotalBsmtSF",
        label: "Total basement area (sq ft)",
        help: "Total basement surface",
        min: 0.0,
        max: 500.0,
        default: 100.0,
        step: 50.0,
        kind: InputKind::Number,
    },
    FeatureSpec {
        name: "1stFlrSF",
        label: "First floor area (sq ft)",
        help: "First floor surface",
        min: 50.0,
        max: 4000.0,
        default: 1200.0,
        step: 50.0,
        kind: InputKind::Number,
    },
    FeatureSpec {
        name: "GrLivArea",
        label: "Living area (sq ft)",
        help: "Above-grade living surface",
        min: 500.0,
        max: 5000.0,
        default: 1500.0,
        step: 50.0,
        kind: InputKind::Number,
    },
    FeatureSpec {
        name: "FullBath",
        label: "Full bathrooms",
        help: "Bathrooms with tub or shower, sink and toilet",
        min: 0.0,
        max: 4.0,
        default: 1.0,
        step: 1.0,
        kind: InputKind::Slider,
    },
    FeatureSpec {
        name: "TotRmsAbvGrd",
        label: "Rooms above grade",
        help: "All rooms above grade except bathrooms",
        min: 0.0,
        max: 15.0,
        default: 1.0,
        step: 1.0,
        kind: InputKind::Slider,
    },
    FeatureSpec {
        name: "GarageYrBlt",
        label: "Garage construction year",
        help: "Year the garage was built",
        min: 1990.0,
        max: 2025.0,
        default: 2000.0,
        step: 1.0,
        kind: InputKind::Number,
    },
    FeatureSpec {
        name: "GarageCars",
        label: "Garage capacity (cars)",
        help: "Number of cars the garage holds",
        min: 0.0,
        max: 4.0,
        default: 2.0,
        step: 1.0,
        kind: InputKind::Slider,
    },
    FeatureSpec {
        name: "GarageArea",
        label: "Garage area (sq ft)",
        help: "Garage surface",
        min: 0.0,
        max: 1500.0,
        default: 500.0,
        step: 25.0,
        kind: InputKind::Number,
    },
    FeatureSpec {
        name: "YrSold",
        label: "Year sold",
        help: "Year of the sale",
        min: 2006.0,
        max: 2025.0,
        default: 2010.0,
        step: 1.0,
        kind: InputKind::Number,
    },
];

/// Index of a feature in [`FEATURE_NAMES`].
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}

/// Format a whole number with thousands separators: `12345` -> `"12,345"`.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// One record of model inputs, always in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl Default for FeatureVector {
    fn default() -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, spec) in values.iter_mut().zip(FEATURE_SPECS.iter()) {
            *slot = spec.default;
        }
        Self { values }
    }
}

impl FeatureVector {
    pub fn names() -> [&'static str; FEATURE_COUNT] {
        FEATURE_NAMES
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }

    /// Mutable slot for the form widgets.
    pub fn value_mut(&mut self, index: usize) -> Option<&mut f64> {
        self.values.get_mut(index)
    }

    fn at(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(f64::NAN)
    }

    /// Labeled values for the result card, in three groups of three.
    pub fn summary_rows(&self) -> Vec<(String, String)> {
        vec![
            ("Lot area".into(), format!("{} sq ft", group_thousands(self.at("LotArea")))),
            ("Overall quality".into(), format!("{}/10", self.at("OverallQual"))),
            ("Remodel year".into(), format!("{}", self.at("YearRemodAdd"))),
            ("Living area".into(), format!("{} sq ft", group_thousands(self.at("GrLivArea")))),
            ("Bathrooms".into(), format!("{}", self.at("FullBath"))),
            ("Rooms".into(), format!("{}", self.at("TotRmsAbvGrd"))),
            ("Basement area".into(), format!("{} sq ft", group_thousands(self.at("TotalBsmtSF")))),
            ("Garage capacity".into(), format!("{} cars", self.at("GarageCars"))),
            ("Garage area".into(), format!("{} sq ft", group_thousands(self.at("GarageArea")))),
        ]
    }

    /// Input rows of the downloadable report.
    pub fn report_rows(&self) -> Vec<(String, String)> {
        vec![
            ("Lot area".into(), format!("{} sq ft", self.at("LotArea"))),
            ("Overall quality".into(), format!("{}/10", self.at("OverallQual"))),
            ("Remodel year".into(), format!("{}", self.at("YearRemodAdd"))),
            ("Living area".into(), format!("{} sq ft", self.at("GrLivArea"))),
            ("Full bathrooms".into(), format!("{}", self.at("FullBath"))),
            ("Rooms".into(), format!("{}", self.at("TotRmsAbvGrd"))),
            ("Basement area".into(), format!("{} sq ft", self.at("TotalBsmtSF"))),
            ("Garage capacity".into(), format!("{}", self.at("GarageCars"))),
            ("Garage area".into(), format!("{} sq ft", self.at("GarageArea"))),
            ("Year sold".into(), format!("{}", self.at("YrSold"))),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable_and_ordered() {
        assert_eq!(
            FeatureVector::names(),
            [
                "LotArea",
                "OverallQual",
                "YearRemodAdd",
                "TotalBsmtSF",
                "1stFlrSF",
                "GrLivArea",
                "FullBath",
                "TotRmsAbvGrd",
                "GarageYrBlt",
                "GarageCars",
                "GarageArea",
                "YrSold",
            ]
        );
        for (spec, name) in FEATURE_SPECS.iter().zip(FEATURE_NAMES.iter()) {
            assert_eq!(spec.name, *name);
        }
    }

    #[test]
    fn defaults_lie_within_ranges() {
        let vector = FeatureVector::default();
        for (value, spec) in vector.values().iter().zip(FEATURE_SPECS.iter()) {
            assert!(*value >= spec.min && *value <= spec.max, "{}", spec.name);
            assert_eq!(*value, spec.default);
        }
        assert_eq!(vector.get("GrLivArea"), Some(1500.0));
        assert_eq!(vector.get("Nope"), None);
    }

    #[test]
    fn form_slot_updates_named_value() {
        let mut vector = FeatureVector::default();
        *vector.value_mut(9).unwrap() = 3.0;
        assert_eq!(vector.get("GarageCars"), Some(3.0));
        assert!(vector.value_mut(FEATURE_COUNT).is_none());
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1500.0), "1,500");
        assert_eq!(group_thousands(1234567.4), "1,234,567");
        assert_eq!(group_thousands(-2500.0), "-2,500");
    }

    #[test]
    fn summary_uses_units() {
        let rows = FeatureVector::default().summary_rows();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0], ("Lot area".to_string(), "300 sq ft".to_string()));
        assert_eq!(rows[1].1, "6/10");
        assert_eq!(rows[3].1, "1,500 sq ft");
        assert_eq!(rows[7].1, "2 cars");
        assert_eq!(FeatureVector::default().report_rows().len(), 10);
    }
}
