//! The credit package catalog.
//!
//! Fixed catalog; prices are in cents. The webhook trusts the credits
//! figure from session metadata, which is set from this catalog at
//! checkout time, so both ends agree by construction.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CreditPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub credits: i32,
    /// Price in USD cents.
    pub price: i64,
    pub price_per_credit: f64,
    pub popular: bool,
}

pub const CREDIT_PACKAGES: [CreditPackage; 3] = [
    CreditPackage {
        id: "credits_25",
        name: "25 Credits",
        credits: 25,
        price: 999,
        price_per_credit: 0.40,
        popular: false,
    },
    CreditPackage {
        id: "credits_100",
        name: "100 Credits",
        credits: 100,
        price: 2999,
        price_per_credit: 0.30,
        popular: true,
    },
    CreditPackage {
        id: "credits_500",
        name: "500 Credits",
        credits: 500,
        price: 9999,
        price_per_credit: 0.20,
        popular: false,
    },
];

pub fn package_by_id(package_id: &str) -> Option<&'static CreditPackage> {
    CREDIT_PACKAGES.iter().find(|p| p.id == package_id)
}
