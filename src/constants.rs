//! # Constants and type definitions for satvis
//!
//! This module centralizes the **numerical tolerances**, **reference radii**, and
//! **common type definitions** shared by the visibility engine.
//!
//! ## Overview
//!
//! - Tolerance used by the domain checks of the visibility function
//! - Reference radius of the Earth, the default occluding body
//! - Unit type aliases (distances, angles, epochs)
//! - [`AgentId`], the identifier carried by every sensor and target

use serde::{Deserialize, Serialize};

// -------------------------------------------------------------------------------------------------
// Numerical constants
// -------------------------------------------------------------------------------------------------

/// Relative tolerance of the visibility domain checks.
///
/// Magnitudes slightly below the occluder radius, and direction cosines slightly
/// outside `[-1, 1]`, are clamped when they miss by less than this amount.
pub const DOMAIN_EPS: f64 = 1e-13;

/// Earth equatorial radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6378.1363;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Sample time, in whatever unit the caller's time vector uses
pub type Epoch = f64;

// -------------------------------------------------------------------------------------------------
// Identifiers
// -------------------------------------------------------------------------------------------------

/// Identifier of a sensor or a target.
///
/// This can be:
/// - A catalog number (e.g. `Int(25544)`)
/// - A free-form name (e.g. `"Sens A"`)
///
/// Integer identifiers order before string identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentId {
    /// Integer catalog number
    Int(u32),
    /// String-based name
    String(String),
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentId::Int(n) => write!(f, "{n}"),
            AgentId::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for AgentId {
    fn from(value: u32) -> Self {
        AgentId::Int(value)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        AgentId::String(value.to_string())
    }
}

impl From<String> for AgentId {
    fn from(value: String) -> Self {
        AgentId::String(value)
    }
}

#[cfg(test)]
mod constants_test {
    use super::*;

    #[test]
    fn test_agent_id_ordering() {
        let mut ids: Vec<AgentId> = vec!["b".into(), 7.into(), "a".into(), 2.into()];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                AgentId::Int(2),
                AgentId::Int(7),
                AgentId::String("a".into()),
                AgentId::String("b".into())
            ]
        );
    }

    #[test]
    fn test_agent_id_display() {
        assert_eq!(AgentId::Int(25544).to_string(), "25544");
        assert_eq!(AgentId::from("Sens A").to_string(), "Sens A");
    }
}
