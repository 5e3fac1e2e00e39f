// Ring Renderer - Effect radii as expanding, eased, pulsing rings
// km -> px scaling is fixed per session; ring geometry is recomputed every frame

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::config::AnimationConfig;
use crate::impact_calculator::ImpactMetrics;
use crate::particles::Vec2;
use crate::render::{Color, DrawSurface, Glow, RenderCommand, Stroke, TextAlign};

const MARKER_SPACING_PX: f64 = 15.0;
const MAX_MARKERS: usize = 8;
const MARKER_LABEL_EVERY: usize = 4;
const MIN_LABELLED_RADIUS_PX: f64 = 16.0;

// =============================================================================
// SCALING
// =============================================================================

/// km -> px mapping, computed once from the session's metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingScale {
    pub max_effect_km: f64,
    pub max_visual_radius: f64, // px
}

impl RingScale {
    pub fn new(metrics: &ImpactMetrics, config: &AnimationConfig) -> Self {
        let max_effect_km = metrics.largest_effect_km().max(1.0);
        let max_visual_radius =
            config.canvas_width.min(config.ground_y()) * config.visual_radius_fraction;
        Self {
            max_effect_km,
            max_visual_radius,
        }
    }

    pub fn km_to_px(&self, km: f64) -> f64 {
        (km / self.max_effect_km) * self.max_visual_radius
    }
}

/// Ease-out cubic: fast start, gentle settle
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// ±10% sinusoidal pulse over the last 5% of expansion
pub fn pulse_factor(expansion: f64) -> f64 {
    if expansion >= 0.95 {
        let pulse_phase = (expansion - 0.95) * 20.0;
        1.0 + (pulse_phase * PI * 4.0).sin() * 0.1
    } else {
        1.0
    }
}

// =============================================================================
// RINGS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingKind {
    Thermal,
    Shock,
    Air,
}

/// Derived per frame from the metrics, never stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub kind: RingKind,
    pub name: &'static str,
    pub radius_km: f64,
    pub fill: Color,
    pub stroke: Color,
}

impl Ring {
    /// Draw order: thermal first, air on top
    pub fn all(metrics: &ImpactMetrics) -> [Ring; 3] {
        [
            Ring {
                kind: RingKind::Thermal,
                name: "Thermal",
                radius_km: metrics.thermal_km,
                fill: Color::DARK_ORANGE.with_alpha(0.12),
                stroke: Color::DARK_ORANGE.with_alpha(0.9),
            },
            Ring {
                kind: RingKind::Shock,
                name: "Shock",
                radius_km: metrics.shock_km,
                fill: Color::CRIMSON.with_alpha(0.10),
                stroke: Color::CRIMSON.with_alpha(0.9),
            },
            Ring {
                kind: RingKind::Air,
                name: "Air",
                radius_km: metrics.air_km,
                fill: Color::ROYAL_BLUE.with_alpha(0.10),
                stroke: Color::ROYAL_BLUE.with_alpha(0.9),
            },
        ]
    }
}

pub struct RingRenderer {
    center: Vec2,
    scale: RingScale,
}

impl RingRenderer {
    pub fn new(center: Vec2, scale: RingScale) -> Self {
        Self { center, scale }
    }

    pub fn scale(&self) -> &RingScale {
        &self.scale
    }

    /// Pixel radius of a ring at raw expansion `expansion` (easing and pulse applied)
    pub fn radius_px(&self, radius_km: f64, expansion: f64) -> f64 {
        self.scale.km_to_px(radius_km) * ease_out_cubic(expansion) * pulse_factor(expansion)
    }

    pub fn draw_rings(&self, rings: &[Ring], expansion: f64, surface: &mut impl DrawSurface) {
        let eased = ease_out_cubic(expansion);
        let settled = expansion > 0.8;

        for ring in rings {
            let radius = self.radius_px(ring.radius_km, expansion);

            surface.submit(RenderCommand::Circle {
                x: self.center.x,
                y: self.center.y,
                radius,
                fill: Some(ring.fill),
                stroke: Some(Stroke::new(ring.stroke, if settled { 2.5 } else { 1.5 })),
                glow: Some(Glow::new(ring.stroke, if settled { 8.0 } else { 4.0 })),
            });

            if radius > 20.0 && expansion > 0.3 {
                self.draw_distance_markers(radius, ring.radius_km, eased, surface);
            }
        }
    }

    /// Ruler ticks around a ring with a distance label on every 4th tick
    fn draw_distance_markers(
        &self,
        radius: f64,
        radius_km: f64,
        eased: f64,
        surface: &mut impl DrawSurface,
    ) {
        let count = ((radius / MARKER_SPACING_PX).floor() as usize).min(MAX_MARKERS);
        if count == 0 {
            return;
        }
        let interval = 2.0 * PI / count as f64;
        let tick = Stroke::new(Color::WHITE.with_alpha(0.6), 1.0);

        for i in 0..count {
            let angle = i as f64 * interval;
            let inner = self.center.add(&Vec2::from_polar(angle, radius - 5.0));
            let outer = self.center.add(&Vec2::from_polar(angle, radius + 5.0));
            surface.submit(RenderCommand::Line {
                x1: inner.x,
                y1: inner.y,
                x2: outer.x,
                y2: outer.y,
                stroke: tick,
                glow: None,
            });

            if i % MARKER_LABEL_EVERY == 0 {
                let at = self.center.add(&Vec2::from_polar(angle, radius + 12.0));
                surface.submit(RenderCommand::Text {
                    x: at.x,
                    y: at.y,
                    text: format!("{:.1}km", radius_km * eased),
                    font_px: 9.0,
                    color: Color::WHITE.with_alpha(0.8),
                    align: TextAlign::Center,
                    outline: Some(Stroke::new(Color::BLACK.with_alpha(0.5), 2.0)),
                });
            }
        }
    }

    /// Name/radius/progress label per ring on a box sized to the text
    pub fn draw_ring_labels(&self, rings: &[Ring], expansion: f64, surface: &mut impl DrawSurface) {
        const FONT_PX: f64 = 11.0;
        const BOX_PADDING: f64 = 4.0;
        const BOX_HEIGHT: f64 = 16.0;

        for (index, ring) in rings.iter().enumerate() {
            let radius = (self.scale.km_to_px(ring.radius_km) * expansion).max(0.0);
            if radius < MIN_LABELLED_RADIUS_PX {
                continue;
            }

            // 45°, 165°, 285°
            let angle = (index as f64 * 120.0 + 45.0).to_radians();
            let lx = self.center.x + radius * angle.cos() + 8.0;
            let ly = self.center.y - radius * angle.sin();

            let text = format!(
                "{}: {:.1} km ({}%)",
                ring.name,
                ring.radius_km * expansion,
                (expansion * 100.0).round()
            );
            let text_width = surface.measure_text(&text, FONT_PX);

            let (box_x, box_y) = (lx - 2.0, ly - 8.0);
            let box_w = text_width + BOX_PADDING * 2.0;
            surface.submit(RenderCommand::FillRect {
                x: box_x,
                y: box_y,
                width: box_w,
                height: BOX_HEIGHT,
                color: Color::BLACK.with_alpha(0.4),
            });
            surface.submit(RenderCommand::StrokeRect {
                x: box_x,
                y: box_y,
                width: box_w,
                height: BOX_HEIGHT,
                stroke: Stroke::new(ring.stroke, 1.0),
            });
            surface.submit(RenderCommand::Text {
                x: lx,
                y: ly,
                text,
                font_px: FONT_PX,
                color: Color::WHITE,
                align: TextAlign::Left,
                outline: Some(Stroke::new(Color::BLACK.with_alpha(0.7), 2.0)),
            });

            if expansion > 0.1 && expansion < 0.9 {
                let speed = (expansion * PI * 2.0).sin().abs() * 100.0;
                surface.submit(RenderCommand::Text {
                    x: lx,
                    y: ly + 12.0,
                    text: format!("Speed: {:.0}%", speed),
                    font_px: 9.0,
                    color: Color::WHITE.with_alpha(0.7),
                    align: TextAlign::Left,
                    outline: Some(Stroke::new(Color::BLACK.with_alpha(0.5), 1.0)),
                });
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact_calculator::{calculate_all_metrics, Severity};
    use crate::physics_engine::TargetMaterial;
    use crate::render::FrameBuffer;
    use proptest::prelude::*;

    fn metrics(air: f64, shock: f64, thermal: f64) -> ImpactMetrics {
        ImpactMetrics {
            mass_tons: 1.0,
            velocity_kms: 1.0,
            energy_megatons_tnt: 1.0,
            crater_km: 0.5,
            air_km: air,
            shock_km: shock,
            thermal_km: thermal,
            severity: Severity::Moderate,
            target_material: "Rock/Solid Ground".to_string(),
        }
    }

    fn renderer(m: &ImpactMetrics) -> RingRenderer {
        let config = AnimationConfig::default();
        RingRenderer::new(Vec2::new(400.0, 336.0), RingScale::new(m, &config))
    }

    #[test]
    fn test_largest_ring_fills_visual_radius() {
        let m = metrics(10.0, 8.0, 4.0);
        let scale = RingScale::new(&m, &AnimationConfig::default());
        // min(800, 338) * 0.45
        assert!((scale.max_visual_radius - 152.1).abs() < 1e-9);
        assert!((scale.km_to_px(10.0) - 152.1).abs() < 1e-9);
    }

    #[test]
    fn test_small_effects_clamped_to_one_km() {
        let m = metrics(0.5, 0.25, 0.1);
        let scale = RingScale::new(&m, &AnimationConfig::default());
        assert_eq!(scale.max_effect_km, 1.0);
        assert!(scale.km_to_px(0.5) < scale.max_visual_radius);
    }

    #[test]
    fn test_scale_uses_rounded_metrics() {
        let m = calculate_all_metrics(1_000_000.0, 20.0, TargetMaterial::Rock).unwrap();
        let scale = RingScale::new(&m, &AnimationConfig::default());
        assert_eq!(scale.max_effect_km, m.largest_effect_km());
    }

    #[test]
    fn test_easing_and_pulse() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);

        assert_eq!(pulse_factor(0.5), 1.0);
        assert!((pulse_factor(1.0) - 1.0).abs() < 1e-9);
        let peak = pulse_factor(0.95 + 0.05 / 8.0);
        assert!((peak - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_markers_bounded() {
        let m = metrics(10.0, 1.0, 0.1);
        let r = renderer(&m);
        let mut frame = FrameBuffer::new();
        r.draw_rings(&Ring::all(&m)[2..], 1.0, &mut frame);

        let ticks = frame
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::Line { .. }))
            .count();
        assert_eq!(ticks, MAX_MARKERS);
        // Labels on ticks 0 and 4
        assert_eq!(frame.texts(), vec!["10.0km", "10.0km"]);
    }

    #[test]
    fn test_no_markers_early_in_expansion() {
        let m = metrics(10.0, 8.0, 4.0);
        let r = renderer(&m);
        let mut frame = FrameBuffer::new();
        r.draw_rings(&Ring::all(&m), 0.2, &mut frame);
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn test_label_box_matches_text_width() {
        let m = metrics(10.0, 8.0, 4.0);
        let r = renderer(&m);
        let mut frame = FrameBuffer::new();
        r.draw_ring_labels(&Ring::all(&m), 1.0, &mut frame);

        let cmds = frame.commands();
        let mut checked = 0;
        for pair in cmds.windows(3) {
            if let (
                RenderCommand::FillRect { width, .. },
                RenderCommand::StrokeRect { .. },
                RenderCommand::Text { text, font_px, .. },
            ) = (&pair[0], &pair[1], &pair[2])
            {
                let expected = frame.measure_text(text, *font_px) + 8.0;
                assert!((width - expected).abs() < 1e-9);
                checked += 1;
            }
        }
        assert_eq!(checked, 3);
        assert!(frame.texts().contains(&"Air: 10.0 km (100%)"));
    }

    proptest! {
        #[test]
        fn prop_ring_ratio_matches_km_ratio(
            air in 0.01f64..500.0,
            shock in 0.01f64..500.0,
            thermal in 0.01f64..500.0,
            expansion in 0.01f64..=1.0,
        ) {
            let m = metrics(air, shock, thermal);
            let r = renderer(&m);
            let px_air = r.radius_px(air, expansion);
            let px_shock = r.radius_px(shock, expansion);
            let px_thermal = r.radius_px(thermal, expansion);
            prop_assert!((px_air / px_shock - air / shock).abs() < 1e-9 * (air / shock).max(1.0));
            prop_assert!((px_thermal / px_air - thermal / air).abs() < 1e-9 * (thermal / air).max(1.0));
        }
    }
}
