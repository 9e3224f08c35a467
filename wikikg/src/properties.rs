//! Wikidata property identifiers and default terminal categories

use crate::client::Qid;
use std::collections::HashSet;

/// Property identifier, e.g. `P31`
pub type Pid = &'static str;

pub const INSTANCE_OF: Pid = "P31";
pub const SUBCLASS_OF: Pid = "P279";

pub const COUNTRY: Pid = "P17";
pub const COUNTRY_OF_CITIZENSHIP: Pid = "P27";

/// Categories at which an upward classification walk stops by default
pub const ENTITY_TYPES_TERMINAL_NODES: &[&str] = &[
    "Q5",         // human
    "Q783794",    // company
    "Q43229",     // organization
    "Q95074",     // fictional character
    "Q6256",      // country
    "Q2221906",   // geographic location
    "Q115095765", // location
    "Q35120",     // entity
    "Q315",       // language
    "Q17376908",  // languoid
    "Q838948",    // work of art
];

/// `ENTITY_TYPES_TERMINAL_NODES` as an owned set
pub fn default_terminal_categories() -> HashSet<Qid> {
    ENTITY_TYPES_TERMINAL_NODES
        .iter()
        .map(|qid| qid.to_string())
        .collect()
}
