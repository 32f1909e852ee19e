//! Complaint categories.

use crate::identifiers::CategoryId;
use serde::{Deserialize, Serialize};

/// Reference data describing what a complaint is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Categories every deployment starts with, as `(name, description)`
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Road & Infrastructure", "Potholes, damaged roads, bridges and footpaths"),
    ("Water Supply Issues", "No supply, contamination, leaking pipelines"),
    ("Electricity Problems", "Outages, faulty street lights, exposed wiring"),
    ("Sanitation & Drainage", "Blocked drains, garbage collection, public toilets"),
    ("Health & Hygiene", "Health centres, disease outbreaks, stagnant water"),
    ("Public Safety", "Unsafe structures, stray animals, law and order"),
    ("Education Facilities", "School buildings, teachers, mid-day meals"),
    ("Welfare Scheme Issues", "Pensions, ration cards, housing schemes"),
    ("Pollution & Environment", "Air, water and noise pollution, tree felling"),
    ("Corruption or Misuse", "Bribery, misuse of public funds or property"),
    ("Others", "Anything not covered by another category"),
];

/// Build the default category set with ids assigned in order from 1
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .zip(1_i64..)
        .map(|((name, description), id)| Category {
            id: CategoryId::new(id),
            name: (*name).to_string(),
            description: Some((*description).to_string()),
            is_active: true,
        })
        .collect()
}
