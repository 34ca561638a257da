//! Fixed classification vocabularies for audio products
//!
//! Each enum parses from and renders to its exact wire label; matching is
//! case-sensitive because the labels are also the values written to disk.

use serde_json::Value;
use std::fmt;

/// Order in which enum values are listed in a tool schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrder {
    /// Alphabetical, as emitted for CSV enrichment
    Sorted,
    /// Listing order used for JSON enrichment
    Listed,
}

macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// All variants in listing order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire label
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Exact, case-sensitive match against the wire label
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Labels in the requested order
            pub fn labels(order: ValueOrder) -> Vec<&'static str> {
                let mut labels: Vec<&'static str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                if order == ValueOrder::Sorted {
                    labels.sort_unstable();
                }
                labels
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum! {
    /// Physical form factor
    ProductType {
        Earphone => "Earphone",
        Headphone => "Headphone",
        Neckband => "Neckband",
        Tws => "TWS",
    }
}

label_enum! {
    /// How the product connects to a device
    Connectivity {
        Wired => "Wired",
        Wireless => "Wireless",
    }
}

label_enum! {
    /// Intended use
    UseCase {
        General => "General",
        Music => "Music",
        Gaming => "Gaming",
        Studio => "Studio",
        Travel => "Travel",
    }
}

/// Normalize a raw `Use Cases` value into a list of strings.
///
/// A bare string becomes a one-element list, duplicates are dropped keeping
/// first occurrence, non-string array items are ignored.
pub fn normalize_use_cases(value: &Value) -> Vec<String> {
    let items: Vec<&str> = match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(arr) => arr.iter().filter_map(|v| v.as_str()).collect(),
        _ => Vec::new(),
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.iter().any(|existing| existing == item) {
            out.push(item.to_string());
        }
    }
    out
}
