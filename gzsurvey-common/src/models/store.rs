// File: gzsurvey-common/src/models/store.rs

/// A physical branch, keyed by the 4-character prefix printed on its receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLocation {
    pub prefix: &'static str,
    pub brand: &'static str,
    pub branch: &'static str,
}

pub const STORE_LOCATIONS: &[StoreLocation] = &[
    StoreLocation { prefix: "MDKA", brand: "Mendokoro", branch: "Molito (Alabang)" },
    StoreLocation { prefix: "MDKB", brand: "Mendokoro", branch: "Bonifacio Global City" },
    StoreLocation { prefix: "MDKC", brand: "Mendokoro", branch: "Cebu" },
    StoreLocation { prefix: "MDKK", brand: "Mendokoro", branch: "Katipunan" },
    StoreLocation { prefix: "MDKM", brand: "Mendokoro", branch: "Salcedo Village (Makati)" },
    StoreLocation { prefix: "MDKP", brand: "Mendokoro", branch: "Pasay" },
    StoreLocation { prefix: "YSKA", brand: "Ramen Yushoken", branch: "Molito (Alabang)" },
    StoreLocation { prefix: "YSKC", brand: "Ramen Yushoken", branch: "Cebu" },
    StoreLocation { prefix: "YSKO", brand: "Ramen Yushoken", branch: "Ortigas" },
    StoreLocation { prefix: "YSKP", brand: "Ramen Yushoken", branch: "Pasay" },
    StoreLocation { prefix: "MRDR", brand: "Marudori", branch: "Rockwell" },
    StoreLocation { prefix: "MRDV", brand: "Marudori", branch: "Vertis North" },
    StoreLocation { prefix: "KZCF", brand: "Kazu Café", branch: "Makati" },
    StoreLocation { prefix: "KZNM", brand: "Kazunori", branch: "Makati" },
];

/// Brand/branch scope sentinel meaning "every brand" or "every branch".
pub const SCOPE_ALL: &str = "All";

/// Case-insensitive prefix lookup.
pub fn store_for_prefix(prefix: &str) -> Option<&'static StoreLocation> {
    STORE_LOCATIONS
        .iter()
        .find(|s| s.prefix.eq_ignore_ascii_case(prefix))
}

/// True for a brand that appears in the store table, or the `All` sentinel.
pub fn is_known_brand(brand: &str) -> bool {
    brand == SCOPE_ALL || STORE_LOCATIONS.iter().any(|s| s.brand == brand)
}
