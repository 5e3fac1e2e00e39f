// Physics Engine - Impact Effect Formulas
// Kinetic energy, crater scaling and blast/shock/thermal radii for a single impact

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

// =============================================================================
// PHYSICAL CONSTANTS (SI Units)
// =============================================================================

/// Megatons of TNT per joule (fixed equivalence used for all reporting)
pub const MEGATONS_TNT_PER_JOULE: f64 = 2.1e-16;

/// Surface gravity used by every target profile (m/s²)
pub const SURFACE_GRAVITY: f64 = 9.81;

/// Crater diameter scales with (KE / (g·ρ))^CRATER_EXPONENT
pub const CRATER_EXPONENT: f64 = 0.25;

/// Air blast leading constant (km per J^(1/3)).
/// Heuristic fit tuned for display balance, not a validated scaling law.
pub const AIR_BLAST_COEFFICIENT: f64 = 0.0018;

/// Shock wave leading constant (km per J^(1/3)), kept below the air blast one
pub const SHOCK_WAVE_COEFFICIENT: f64 = 0.0015;

/// Fraction of kinetic energy radiated as heat
pub const THERMAL_FRACTION: f64 = 0.2;

/// Thermal fluence threshold (J/m²) defining the edge of the thermal zone
pub const THERMAL_FLUENCE_THRESHOLD: f64 = 150_000.0;

// =============================================================================
// TARGET MATERIALS
// =============================================================================

/// Surface struck by the impactor.
///
/// Parsing from a key never fails: anything unrecognized becomes `Rock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetMaterial {
    Water,
    #[default]
    Rock,
    Ice,
    Sand,
    Forest,
}

impl TargetMaterial {
    pub const ALL: [TargetMaterial; 5] = [
        TargetMaterial::Water,
        TargetMaterial::Rock,
        TargetMaterial::Ice,
        TargetMaterial::Sand,
        TargetMaterial::Forest,
    ];

    /// Resolve a form/JSON key. Keys are exact lowercase names; any other
    /// spelling (including "WATER" or " water") is unknown and becomes `Rock`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "water" => TargetMaterial::Water,
            "rock" => TargetMaterial::Rock,
            "ice" => TargetMaterial::Ice,
            "sand" => TargetMaterial::Sand,
            "forest" => TargetMaterial::Forest,
            _ => TargetMaterial::Rock,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            TargetMaterial::Water => "water",
            TargetMaterial::Rock => "rock",
            TargetMaterial::Ice => "ice",
            TargetMaterial::Sand => "sand",
            TargetMaterial::Forest => "forest",
        }
    }

    pub fn profile(&self) -> &'static MaterialProfile {
        match self {
            TargetMaterial::Water => &MATERIAL_PROFILES[0],
            TargetMaterial::Rock => &MATERIAL_PROFILES[1],
            TargetMaterial::Ice => &MATERIAL_PROFILES[2],
            TargetMaterial::Sand => &MATERIAL_PROFILES[3],
            TargetMaterial::Forest => &MATERIAL_PROFILES[4],
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.profile().display_name
    }
}

impl From<String> for TargetMaterial {
    fn from(key: String) -> Self {
        TargetMaterial::from_key(&key)
    }
}

impl From<&str> for TargetMaterial {
    fn from(key: &str) -> Self {
        TargetMaterial::from_key(key)
    }
}

impl From<TargetMaterial> for String {
    fn from(material: TargetMaterial) -> Self {
        material.key().to_string()
    }
}

impl fmt::Display for TargetMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Target surface properties used by the crater scaling law
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialProfile {
    pub density_kg_m3: f64,
    pub gravity_m_s2: f64,
    pub crater_coefficient_k: f64,
    pub display_name: &'static str,
}

/// Indexed in `TargetMaterial::ALL` order
const MATERIAL_PROFILES: [MaterialProfile; 5] = [
    MaterialProfile {
        density_kg_m3: 1000.0,
        gravity_m_s2: SURFACE_GRAVITY,
        crater_coefficient_k: 2.1,
        display_name: "Water/Ocean",
    },
    MaterialProfile {
        density_kg_m3: 2500.0,
        gravity_m_s2: SURFACE_GRAVITY,
        crater_coefficient_k: 1.8,
        display_name: "Rock/Solid Ground",
    },
    MaterialProfile {
        density_kg_m3: 900.0,
        gravity_m_s2: SURFACE_GRAVITY,
        crater_coefficient_k: 2.5,
        display_name: "Ice/Glacier",
    },
    MaterialProfile {
        density_kg_m3: 1600.0,
        gravity_m_s2: SURFACE_GRAVITY,
        crater_coefficient_k: 2.8,
        display_name: "Desert Sand",
    },
    MaterialProfile {
        density_kg_m3: 1200.0,
        gravity_m_s2: SURFACE_GRAVITY,
        crater_coefficient_k: 2.2,
        display_name: "Forest/Vegetation",
    },
];

/// Profile lookup by raw key, falling back to rock
pub fn profile_for_key(key: &str) -> &'static MaterialProfile {
    TargetMaterial::from_key(key).profile()
}

// =============================================================================
// EFFECT FORMULAS
// =============================================================================
// Inputs are SI (kg, m/s) and must be strictly positive; the calculator
// validates before calling in.

/// Kinetic energy: 0.5 * m * v² (J)
pub fn kinetic_energy(mass_kg: f64, velocity_m_s: f64) -> f64 {
    0.5 * mass_kg * velocity_m_s * velocity_m_s
}

/// Final crater diameter (km): k * (KE / (g * ρ))^0.25
pub fn crater_diameter_km(mass_kg: f64, velocity_m_s: f64, material: TargetMaterial) -> f64 {
    let props = material.profile();
    let ke = kinetic_energy(mass_kg, velocity_m_s);
    let diameter_m = props.crater_coefficient_k
        * (ke / (props.gravity_m_s2 * props.density_kg_m3)).powf(CRATER_EXPONENT);
    diameter_m / 1000.0
}

/// Air blast radius (km), E^(1/3) scaling
pub fn air_blast_radius_km(mass_kg: f64, velocity_m_s: f64) -> f64 {
    let ke = kinetic_energy(mass_kg, velocity_m_s);
    AIR_BLAST_COEFFICIENT * ke.cbrt()
}

/// Shock wave radius (km) with a caller-chosen leading constant
pub fn shock_wave_radius_km_with(mass_kg: f64, velocity_m_s: f64, k: f64) -> f64 {
    let ke = kinetic_energy(mass_kg, velocity_m_s);
    k * ke.cbrt()
}

/// Shock wave radius (km) with the default constant
pub fn shock_wave_radius_km(mass_kg: f64, velocity_m_s: f64) -> f64 {
    shock_wave_radius_km_with(mass_kg, velocity_m_s, SHOCK_WAVE_COEFFICIENT)
}

/// Thermal radiation radius (km) where fluence drops to `fluence_threshold`
pub fn thermal_radiation_radius_km_with(
    mass_kg: f64,
    velocity_m_s: f64,
    thermal_fraction: f64,
    fluence_threshold: f64, // J/m²
) -> f64 {
    let ke = kinetic_energy(mass_kg, velocity_m_s);
    let thermal_energy = thermal_fraction * ke;
    let radius_m = (thermal_energy / (4.0 * PI * fluence_threshold)).sqrt();
    radius_m / 1000.0
}

pub fn thermal_radiation_radius_km(mass_kg: f64, velocity_m_s: f64) -> f64 {
    thermal_radiation_radius_km_with(
        mass_kg,
        velocity_m_s,
        THERMAL_FRACTION,
        THERMAL_FLUENCE_THRESHOLD,
    )
}

/// Joules to megatons of TNT
pub fn joules_to_megatons(joules: f64) -> f64 {
    joules * MEGATONS_TNT_PER_JOULE
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MASS: f64 = 1.0e9; // kg
    const VELOCITY: f64 = 20_000.0; // m/s

    #[test]
    fn test_kinetic_energy() {
        let ke = kinetic_energy(1.0e6, 20_000.0);
        assert!((ke - 2.0e14).abs() < 1.0);
    }

    #[test]
    fn test_unknown_material_falls_back_to_rock() {
        assert_eq!(TargetMaterial::from_key("lava"), TargetMaterial::Rock);
        assert_eq!(TargetMaterial::from_key(""), TargetMaterial::Rock);
        assert_eq!(profile_for_key("lava"), TargetMaterial::Rock.profile());

        let lava = crater_diameter_km(MASS, VELOCITY, TargetMaterial::from_key("lava"));
        let rock = crater_diameter_km(MASS, VELOCITY, TargetMaterial::Rock);
        assert_eq!(lava, rock);
    }

    #[test]
    fn test_material_keys_match_exactly() {
        assert_eq!(TargetMaterial::from_key("water"), TargetMaterial::Water);
        assert_eq!(TargetMaterial::from_key("WATER"), TargetMaterial::Rock);
        assert_eq!(TargetMaterial::from_key(" ice"), TargetMaterial::Rock);
        assert_eq!(TargetMaterial::from_key("Sand"), TargetMaterial::Rock);
        for material in TargetMaterial::ALL {
            assert_eq!(TargetMaterial::from_key(material.key()), material);
        }
    }

    #[test]
    fn test_crater_ordering_across_materials() {
        let crater = |m| crater_diameter_km(MASS, VELOCITY, m);
        let rock = crater(TargetMaterial::Rock);

        assert!(crater(TargetMaterial::Water) > rock);
        for material in TargetMaterial::ALL {
            if material != TargetMaterial::Rock {
                assert!(crater(material) > rock, "{:?} should exceed rock", material);
            }
        }
        // Ice: lowest density with a high coefficient
        assert!(crater(TargetMaterial::Ice) > crater(TargetMaterial::Sand));
        assert!(crater(TargetMaterial::Sand) > crater(TargetMaterial::Forest));
        assert!(crater(TargetMaterial::Forest) > crater(TargetMaterial::Water));
    }

    #[test]
    fn test_crater_monotonic_in_energy() {
        let small = crater_diameter_km(MASS, VELOCITY, TargetMaterial::Sand);
        let large = crater_diameter_km(MASS * 2.0, VELOCITY, TargetMaterial::Sand);
        assert!(large > small);
    }

    #[test]
    fn test_shock_smaller_than_air_blast() {
        let air = air_blast_radius_km(MASS, VELOCITY);
        let shock = shock_wave_radius_km(MASS, VELOCITY);
        assert!(shock < air);
        assert!((shock / air - SHOCK_WAVE_COEFFICIENT / AIR_BLAST_COEFFICIENT).abs() < 1e-12);
    }

    #[test]
    fn test_thermal_radius_known_value() {
        // KE = 2e17 J -> thermal 4e16 J -> r = sqrt(4e16 / (4π * 1.5e5)) m
        let expected_m = (4.0e16 / (4.0 * PI * 150_000.0)).sqrt();
        let r = thermal_radiation_radius_km(MASS, VELOCITY);
        assert!((r - expected_m / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_material_serde_uses_keys() {
        let json = serde_json::to_string(&TargetMaterial::Forest).unwrap();
        assert_eq!(json, "\"forest\"");
        let parsed: TargetMaterial = serde_json::from_str("\"basalt\"").unwrap();
        assert_eq!(parsed, TargetMaterial::Rock);
    }
}
