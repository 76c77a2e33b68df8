use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// Values are persisted as their string form (`serde(try_from/into)`), so
/// the JSON columns stay stable if a variant is renamed in Rust.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted string value, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($s),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = DatabaseError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Sex {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(MaritalStatus {
    Single => "single",
    Married => "married",
    Partnered => "partnered",
    Divorced => "divorced",
    Widowed => "widowed",
});

str_enum!(AddressType {
    Residence => "residence",
    Domicile => "domicile",
    Work => "work",
});

str_enum!(DiabetesType {
    None => "none",
    Type1 => "type_1",
    Type2 => "type_2",
    Gestational => "gestational",
});

str_enum!(PathologyStatus {
    Active => "active",
    Resolved => "resolved",
    Monitoring => "monitoring",
});

str_enum!(SmokingStatus {
    Never => "never",
    Former => "former",
    Current => "current",
});

str_enum!(WorkType {
    Sedentary => "sedentary",
    Standing => "standing",
    Manual => "manual",
    Mixed => "mixed",
    Driving => "driving",
});

str_enum!(Frequency {
    Rarely => "rarely",
    Occasionally => "occasionally",
    Weekly => "weekly",
    Daily => "daily",
    Constant => "constant",
});

str_enum!(DeliveryType {
    Vaginal => "vaginal",
    Cesarean => "cesarean",
    Instrumental => "instrumental",
});

str_enum!(PainCharacter {
    Dull => "dull",
    Sharp => "sharp",
    Burning => "burning",
    Throbbing => "throbbing",
    Stabbing => "stabbing",
    Cramping => "cramping",
});

str_enum!(Side {
    Left => "left",
    Right => "right",
    Bilateral => "bilateral",
});

str_enum!(CoughKind {
    Dry => "dry",
    Productive => "productive",
});

str_enum!(StoolConsistency {
    Hard => "hard",
    Normal => "normal",
    Loose => "loose",
    Variable => "variable",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Sex::from_str(" Female ").unwrap(), Sex::Female);
        assert_eq!(DiabetesType::from_str("TYPE_2").unwrap(), DiabetesType::Type2);
    }

    #[test]
    fn rejects_unknown_value() {
        let err = Frequency::from_str("hourly").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn serializes_as_string_value() {
        let json = serde_json::to_string(&MaritalStatus::Widowed).unwrap();
        assert_eq!(json, "\"widowed\"");
        let back: MaritalStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MaritalStatus::Widowed);
    }

    #[test]
    fn values_list_matches_variants() {
        assert_eq!(Frequency::VALUES.len(), 5);
        assert!(Frequency::VALUES.contains(&Frequency::Daily.as_str()));
    }
}
