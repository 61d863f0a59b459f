use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Sender {
    User => "user",
    Bot => "bot",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn sender_round_trip() {
        for (variant, s) in [(Sender::User, "user"), (Sender::Bot, "bot")] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Sender::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_sender_returns_error() {
        assert!(Sender::from_str("admin").is_err());
        assert!(Sender::from_str("BOT").is_err());
        assert!(Sender::from_str("").is_err());
    }
}
