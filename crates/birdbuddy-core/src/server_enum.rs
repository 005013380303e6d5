//! Closed enumerations over server-provided string tags.
//!
//! Every enum declared with `server_enum!` has an `Unknown(String)` variant
//! that keeps the raw value, so new server-side tags survive a round trip.

/// Declare a string-tagged enum with an `Unknown(String)` catch-all.
///
/// Generates `as_str`, `Display`, `From<String>`/`From<&str>`, `Into<String>`
/// and serde support through those conversions. Unknown values are logged at
/// WARN with the given label.
macro_rules! server_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($label:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $value:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
            /// A value this client does not recognize.
            Unknown(String),
        }

        impl $name {
            /// The raw server value.
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Unknown(raw) => raw.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $( $value => $name::$variant, )+
                    other => {
                        tracing::warn!(value = other, concat!("Unexpected ", $label));
                        $name::Unknown(other.to_string())
                    }
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    server_enum! {
        /// Test enum.
        pub enum Color ("color") {
            Red => "RED",
            Green => "GREEN",
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(Color::from("RED"), Color::Red);
        assert_eq!(Color::Green.as_str(), "GREEN");
        assert_eq!(Color::Red.to_string(), "RED");
    }

    #[test]
    fn test_unknown_value_keeps_raw() {
        let color = Color::from("MAUVE");
        assert_eq!(color, Color::Unknown("MAUVE".to_string()));
        assert_eq!(color.as_str(), "MAUVE");
    }

    #[test]
    fn test_serde_through_strings() {
        let parsed: Vec<Color> = serde_json::from_str(r#"["GREEN", "TEAL"]"#).unwrap();
        assert_eq!(parsed, vec![Color::Green, Color::Unknown("TEAL".to_string())]);
        let out = serde_json::to_string(&parsed).unwrap();
        assert_eq!(out, r#"["GREEN","TEAL"]"#);
    }
}
