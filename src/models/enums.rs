use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value:?}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AbnormalFlag {
    Normal => "normal",
    Low => "low",
    High => "high",
    CriticalLow => "critical_low",
    CriticalHigh => "critical_high",
    Unknown => "unknown",
});

impl AbnormalFlag {
    /// True for `low` and `critical_low`.
    pub fn is_below(&self) -> bool {
        matches!(self, Self::Low | Self::CriticalLow)
    }
}

str_enum!(Severity {
    Normal => "normal",
    Borderline => "borderline",
    Abnormal => "abnormal",
    Critical => "critical",
    Unknown => "unknown",
});

impl Severity {
    /// Borderline, abnormal and critical results all count as "outside the range".
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::Borderline | Self::Abnormal | Self::Critical)
    }
}

str_enum!(ColumnRole {
    TestName => "test_name",
    Value => "value",
    Unit => "unit",
    RefRange => "ref_range",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn abnormal_flag_round_trip() {
        for (variant, s) in [
            (AbnormalFlag::Normal, "normal"),
            (AbnormalFlag::Low, "low"),
            (AbnormalFlag::High, "high"),
            (AbnormalFlag::CriticalLow, "critical_low"),
            (AbnormalFlag::CriticalHigh, "critical_high"),
            (AbnormalFlag::Unknown, "unknown"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AbnormalFlag::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn severity_round_trip() {
        for (variant, s) in [
            (Severity::Normal, "normal"),
            (Severity::Borderline, "borderline"),
            (Severity::Abnormal, "abnormal"),
            (Severity::Critical, "critical"),
            (Severity::Unknown, "unknown"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Severity::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&AbnormalFlag::CriticalHigh).unwrap();
        assert_eq!(json, "\"critical_high\"");
        let role: ColumnRole = serde_json::from_str("\"ref_range\"").unwrap();
        assert_eq!(role, ColumnRole::RefRange);
    }

    #[test]
    fn out_of_range_tiers() {
        assert!(!Severity::Normal.is_out_of_range());
        assert!(!Severity::Unknown.is_out_of_range());
        assert!(Severity::Borderline.is_out_of_range());
        assert!(Severity::Critical.is_out_of_range());
        assert!(AbnormalFlag::CriticalLow.is_below());
        assert!(!AbnormalFlag::High.is_below());
    }

    #[test]
    fn invalid_enum_returns_error() {
        let err = Severity::from_str("severe").unwrap_err();
        assert_eq!(err.field, "Severity");
        assert!(AbnormalFlag::from_str("").is_err());
    }
}
