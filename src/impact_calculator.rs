// Impact Calculator - Metrics, severity and narrative insights
// Turns (mass, velocity, target) into the rounded metrics record every renderer consumes

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ImpactError;
use crate::physics_engine::{
    air_blast_radius_km, crater_diameter_km, joules_to_megatons, kinetic_energy,
    shock_wave_radius_km, thermal_radiation_radius_km, TargetMaterial,
};
use crate::render::Color;

// =============================================================================
// INPUT
// =============================================================================

/// Raw impact parameters as supplied by the form / JSON boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactInput {
    pub mass_tons: f64,
    pub velocity_kms: f64,
    #[serde(default)]
    pub target_material: TargetMaterial,
}

impl ImpactInput {
    pub fn new(
        mass_tons: f64,
        velocity_kms: f64,
        target_material: TargetMaterial,
    ) -> Result<Self, ImpactError> {
        let input = Self {
            mass_tons,
            velocity_kms,
            target_material,
        };
        input.validate()?;
        Ok(input)
    }

    /// Parse `{mass_tons, velocity_kms, target_material}` and validate it
    pub fn from_json(json: &str) -> Result<Self, ImpactError> {
        let input: ImpactInput = serde_json::from_str(json)?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), ImpactError> {
        if !(self.mass_tons.is_finite() && self.mass_tons > 0.0) {
            return Err(ImpactError::InvalidMass(self.mass_tons));
        }
        if !(self.velocity_kms.is_finite() && self.velocity_kms > 0.0) {
            return Err(ImpactError::InvalidVelocity(self.velocity_kms));
        }
        Ok(())
    }
}

// =============================================================================
// SEVERITY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    High,
    Extreme,
}

impl Severity {
    /// Exclusive upper bounds: 1.0 Mt is Moderate, not Low
    pub fn from_energy(energy_megatons: f64) -> Self {
        if energy_megatons < 0.1 {
            Severity::VeryLow
        } else if energy_megatons < 1.0 {
            Severity::Low
        } else if energy_megatons < 10.0 {
            Severity::Moderate
        } else if energy_megatons < 100.0 {
            Severity::High
        } else {
            Severity::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::VeryLow => "Very Low",
            Severity::Low => "Low",
            Severity::Moderate => "Moderate",
            Severity::High => "High",
            Severity::Extreme => "Extreme",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// METRICS
// =============================================================================

/// Derived impact record. Numeric fields are rounded to 3 decimals and are
/// the only values downstream consumers (animation, chart) may use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub mass_tons: f64,
    pub velocity_kms: f64,
    pub energy_megatons_tnt: f64,
    pub crater_km: f64, // diameter
    pub air_km: f64,    // radii from here on
    pub shock_km: f64,
    pub thermal_km: f64,
    pub severity: Severity,
    pub target_material: String, // display name
}

impl ImpactMetrics {
    /// Parse a metrics record handed over as JSON (e.g. embedded in a page)
    pub fn from_json(json: &str) -> Result<Self, ImpactError> {
        let metrics: ImpactMetrics = serde_json::from_str(json)?;
        if !metrics.is_well_formed() {
            return Err(ImpactError::MalformedInput(
                <serde_json::Error as serde::de::Error>::custom(
                    "metrics contain negative or non-finite values",
                ),
            ));
        }
        Ok(metrics)
    }

    pub fn is_well_formed(&self) -> bool {
        [
            self.mass_tons,
            self.velocity_kms,
            self.energy_megatons_tnt,
            self.crater_km,
            self.air_km,
            self.shock_km,
            self.thermal_km,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Largest of the three atmospheric effect radii (km)
    pub fn largest_effect_km(&self) -> f64 {
        self.air_km.max(self.shock_km).max(self.thermal_km)
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Full calculation pipeline: units, energy, radii, severity, rounding
pub fn calculate_all_metrics(
    mass_tons: f64,
    velocity_kms: f64,
    target_material: TargetMaterial,
) -> Result<ImpactMetrics, ImpactError> {
    ImpactInput::new(mass_tons, velocity_kms, target_material)?;

    let mass = mass_tons * 1000.0; // tons -> kg
    let velocity = velocity_kms * 1000.0; // km/s -> m/s

    let ke_joules = kinetic_energy(mass, velocity);
    let energy_megatons_tnt = joules_to_megatons(ke_joules);
    let crater_km = crater_diameter_km(mass, velocity, target_material);
    let air_km = air_blast_radius_km(mass, velocity);
    let shock_km = shock_wave_radius_km(mass, velocity);
    let thermal_km = thermal_radiation_radius_km(mass, velocity);

    let severity = Severity::from_energy(energy_megatons_tnt);

    tracing::debug!(
        mass_kg = mass,
        velocity_m_s = velocity,
        ke_joules,
        severity = severity.label(),
        "impact metrics calculated"
    );

    Ok(ImpactMetrics {
        mass_tons: round3(mass_tons),
        velocity_kms: round3(velocity_kms),
        energy_megatons_tnt: round3(energy_megatons_tnt),
        crater_km: round3(crater_km),
        air_km: round3(air_km),
        shock_km: round3(shock_km),
        thermal_km: round3(thermal_km),
        severity,
        target_material: target_material.display_name().to_string(),
    })
}

pub fn calculate(input: &ImpactInput) -> Result<ImpactMetrics, ImpactError> {
    calculate_all_metrics(input.mass_tons, input.velocity_kms, input.target_material)
}

// =============================================================================
// INSIGHTS
// =============================================================================

/// Narrative lines explaining the metrics. Deterministic for equal input.
pub fn generate_insights(metrics: &ImpactMetrics) -> Vec<String> {
    let mut insights = Vec::with_capacity(7);

    insights.push(format!(
        "Kinetic energy rises strongly with speed (E ∝ v²). At {} km/s, even modest mass ({} t) can yield {} Mt TNT.",
        metrics.velocity_kms, metrics.mass_tons, metrics.energy_megatons_tnt
    ));

    // Strict comparison keeps the earlier entry on ties
    let effects = [
        (metrics.air_km, "Air blast radius"),
        (metrics.shock_km, "Shock wave radius"),
        (metrics.thermal_km, "Thermal radiation radius"),
    ];
    let largest = effects
        .iter()
        .skip(1)
        .fold(effects[0], |max, curr| if curr.0 > max.0 { *curr } else { max });
    insights.push(format!(
        "{} is the largest zone here. Atmospheric pressure waves travel farther than intense heat, so blast/shock often extend beyond thermal effects.",
        largest.1
    ));

    if metrics.shock_km >= metrics.thermal_km {
        insights.push("Shock wave ≥ Thermal: Pressure waves attenuate more slowly with distance, while thermal radiation drops roughly with 1/r² and is absorbed by the atmosphere.".to_string());
    } else {
        insights.push("Thermal ≥ Shock: A large fraction of energy coupled into heat can drive a wider thermal zone in this scenario.".to_string());
    }

    if metrics.air_km >= metrics.crater_km {
        insights.push("Air blast ≫ Crater: Cratering is local to the impact point, but blast effects propagate through the atmosphere over much larger distances.".to_string());
    }

    insights.push("Scaling note: Crater size grows sub‑linearly with energy (~E^1/4), while blast/thermal radii grow a bit faster (~E^1/3), so radii can outpace crater size.".to_string());

    insights.push(format!(
        "Target: {}. Softer materials (water, ice) create larger craters, while dense rock produces smaller, deeper craters.",
        metrics.target_material
    ));

    insights.push(format!(
        "Overall severity rated as '{}'. Reducing speed or mass reduces energy fastest (speed has the biggest effect).",
        metrics.severity
    ));

    insights
}

// =============================================================================
// HEADLINE RESULT
// =============================================================================

/// Which single metric the result page headlines (form codes 1-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultOption {
    Energy,
    Crater,
    AirBlast,
    ShockWave,
    Thermal,
}

impl ResultOption {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ResultOption::Energy),
            2 => Some(ResultOption::Crater),
            3 => Some(ResultOption::AirBlast),
            4 => Some(ResultOption::ShockWave),
            5 => Some(ResultOption::Thermal),
            _ => None,
        }
    }

    pub fn headline(&self, metrics: &ImpactMetrics) -> String {
        match self {
            ResultOption::Energy => format!(
                "Kinetic Energy: {} Megatons of TNT",
                metrics.energy_megatons_tnt
            ),
            ResultOption::Crater => format!("Crater Diameter: {} km", metrics.crater_km),
            ResultOption::AirBlast => format!("Air Blast Radius: {} km", metrics.air_km),
            ResultOption::ShockWave => format!("Shock Wave Radius: {} km", metrics.shock_km),
            ResultOption::Thermal => {
                format!("Thermal Radiation Radius: {} km", metrics.thermal_km)
            }
        }
    }
}

pub const INVALID_OPTION_HEADLINE: &str = "Invalid Option Selected";

/// Missing code means the energy headline; unknown codes get the invalid notice
pub fn headline_for_code(code: Option<i64>, metrics: &ImpactMetrics) -> String {
    match code {
        None => ResultOption::Energy.headline(metrics),
        Some(code) => ResultOption::from_code(code)
            .map(|option| option.headline(metrics))
            .unwrap_or_else(|| INVALID_OPTION_HEADLINE.to_string()),
    }
}

/// Everything a result view needs from one calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    pub headline: String,
    pub metrics: ImpactMetrics,
    pub insights: Vec<String>,
    pub chart: EffectChart,
}

impl ImpactReport {
    pub fn compute(input: &ImpactInput, option: Option<i64>) -> Result<Self, ImpactError> {
        let metrics = calculate(input)?;
        Ok(Self {
            headline: headline_for_code(option, &metrics),
            insights: generate_insights(&metrics),
            chart: effect_chart(&metrics),
            metrics,
        })
    }
}

// =============================================================================
// COMPANION CHART SERIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectBar {
    pub label: String,
    pub value_km: f64,
    pub fill: Color,
    pub stroke: Color,
    pub explanation: String,
    pub short_explanation: String,
}

/// Horizontal bar chart of the four effect sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectChart {
    pub title: String,
    pub axis_label: String,
    pub bars: Vec<EffectBar>,
}

pub fn effect_chart(metrics: &ImpactMetrics) -> EffectChart {
    let rows = [
        (
            "Crater diameter",
            metrics.crater_km,
            Color::PURPLE,
            "Crater diameter is local to the impact point and grows sub‑linearly with energy (~E^1/4).",
            "Local; grows slowly with energy",
        ),
        (
            "Air blast radius",
            metrics.air_km,
            Color::ROYAL_BLUE,
            "Air blast radius extends far as pressure waves propagate through the atmosphere.",
            "Pressure waves travel far",
        ),
        (
            "Shock wave radius",
            metrics.shock_km,
            Color::CRIMSON,
            "Shock wave radius often exceeds thermal as pressure attenuates slower than heat.",
            "Pressure drops slower than heat",
        ),
        (
            "Thermal radiation radius",
            metrics.thermal_km,
            Color::DARK_ORANGE,
            "Thermal radiation radius falls off roughly with 1/r² and is absorbed by the air.",
            "Heat ~1/r² and absorbed by air",
        ),
    ];

    EffectChart {
        title: format!(
            "Energy: {} Mt | Severity: {}",
            metrics.energy_megatons_tnt, metrics.severity
        ),
        axis_label: "Distance/Size (km)".to_string(),
        bars: rows
            .into_iter()
            .map(|(label, value_km, color, explanation, short)| EffectBar {
                label: label.to_string(),
                value_km,
                fill: color.with_alpha(0.6),
                stroke: color,
                explanation: explanation.to_string(),
                short_explanation: short.to_string(),
            })
            .collect(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
