//! Serde helpers for the loosely typed payloads the runner emits

use serde::{Deserialize, Deserializer};

/// Implements case-insensitive deserialization for a fieldless enum.
///
/// The first form rejects unknown strings. The second form maps any unknown
/// string onto a fallback variant so that new runner states never fail a
/// whole event payload.
///
/// Usage:
/// ```ignore
/// impl_case_insensitive_deserialize!(
///     MyEnum,
///     Variant1 => "variant1",
///     Variant2 => "variant2"
/// );
///
/// impl_case_insensitive_deserialize!(
///     MyEnum,
///     fallback = Unknown,
///     Variant1 => "variant1"
/// );
/// ```
#[macro_export]
macro_rules! impl_case_insensitive_deserialize {
    ($enum_type:ty, fallback = $fallback:ident, $($variant:ident => $str_val:expr),+ $(,)?) => {
        impl<'de> serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                match s.to_lowercase().as_str() {
                    $(
                        $str_val => Ok(Self::$variant),
                    )+
                    _ => Ok(Self::$fallback),
                }
            }
        }
    };
    ($enum_type:ty, $($variant:ident => $str_val:expr),+ $(,)?) => {
        impl<'de> serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                match s.to_lowercase().as_str() {
                    $(
                        $str_val => Ok(Self::$variant),
                    )+
                    _ => Err(serde::de::Error::custom(format!(
                        "unknown variant '{}', expected one of: {}",
                        s,
                        [$($str_val),+].join(", ")
                    ))),
                }
            }
        }
    };
}

/// Deserializes a stack-frame coordinate that may arrive as a number, `null`
/// or garbage. Anything that is not a JSON unsigned integer becomes `None`.
pub fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    enum Strict {
        First,
        Second,
    }

    impl_case_insensitive_deserialize!(
        Strict,
        First => "first",
        Second => "second"
    );

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    enum Loose {
        Known,
        Other,
    }

    impl_case_insensitive_deserialize!(
        Loose,
        fallback = Other,
        Known => "known"
    );

    #[derive(Debug, Deserialize)]
    struct Frame {
        #[serde(default, deserialize_with = "super::lenient_coordinate")]
        line: Option<u32>,
    }

    #[test]
    fn test_case_insensitive_deserialize() {
        let result: Strict = serde_json::from_str(r#""FiRsT""#).unwrap();
        assert_eq!(result, Strict::First);

        let result: Result<Strict, _> = serde_json::from_str(r#""invalid""#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("expected one of: first, second"));
    }

    #[test]
    fn test_fallback_variant() {
        let result: Loose = serde_json::from_str(r#""KNOWN""#).unwrap();
        assert_eq!(result, Loose::Known);

        let result: Loose = serde_json::from_str(r#""pending""#).unwrap();
        assert_eq!(result, Loose::Other);
    }

    #[test]
    fn test_lenient_coordinate() {
        let frame: Frame = serde_json::from_str(r#"{"line": 12}"#).unwrap();
        assert_eq!(frame.line, Some(12));

        let frame: Frame = serde_json::from_str(r#"{"line": "7"}"#).unwrap();
        assert_eq!(frame.line, None);

        let frame: Frame = serde_json::from_str(r#"{"line": 4.5}"#).unwrap();
        assert_eq!(frame.line, None);

        let frame: Frame = serde_json::from_str(r#"{"line": "NaN"}"#).unwrap();
        assert_eq!(frame.line, None);

        let frame: Frame = serde_json::from_str(r#"{"line": -3}"#).unwrap();
        assert_eq!(frame.line, None);

        let frame: Frame = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(frame.line, None);
    }
}
