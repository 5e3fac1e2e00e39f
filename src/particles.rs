// Particle System - Explosion debris and crater ejecta
// Two independent populations: burst spawn, per-frame Euler integration, lifetime culling

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::render::{Color, DrawSurface, Glow, RenderCommand};

// =============================================================================
// 2D VECTOR (canvas pixels, y down)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Unit vector at `angle` radians scaled by `length`
    pub fn from_polar(angle: f64, length: f64) -> Self {
        Self {
            x: angle.cos() * length,
            y: angle.sin() * length,
        }
    }

    pub fn add(&self, other: &Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn scale(&self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
        }
    }

    pub fn distance(&self, other: &Vec2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

// =============================================================================
// PARTICLES
// =============================================================================

/// Per-frame physics (pixels, frames)
const EXPLOSION_GRAVITY: f64 = 0.03;
const EJECTA_GRAVITY: f64 = 0.06;
const EJECTA_DRAG: f64 = 0.99; // vx multiplier
const DEBRIS_JITTER: f64 = 0.1; // peak-to-peak vx turbulence, large debris only

const EXPLOSION_SIZE: f64 = 1.5;

/// Subtype draw bounds: 30% large debris, 40% medium dust, 30% fine
const LARGE_DEBRIS_BOUND: f64 = 0.3;
const MEDIUM_DUST_BOUND: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Explosion,
    LargeDebris,
    MediumDust,
    FineParticles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub life: u32, // frames remaining
    pub color: Color,
    pub size: f64, // radius, px
    pub kind: ParticleKind,
}

impl Particle {
    /// One Euler step; returns false once the particle has expired
    fn integrate(&mut self, gravity: f64) -> bool {
        self.position = self.position.add(&self.velocity);
        self.velocity.y += gravity;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }
}

pub struct ParticleSystem {
    explosion: Vec<Particle>,
    ejecta: Vec<Particle>,
    rng: StdRng,
}

impl ParticleSystem {
    /// Seeded systems replay identical bursts
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            explosion: Vec::new(),
            ejecta: Vec::new(),
            rng,
        }
    }

    pub fn explosion(&self) -> &[Particle] {
        &self.explosion
    }

    pub fn ejecta(&self) -> &[Particle] {
        &self.ejecta
    }

    pub fn len(&self) -> usize {
        self.explosion.len() + self.ejecta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explosion.is_empty() && self.ejecta.is_empty()
    }

    /// Drop both populations
    pub fn clear(&mut self) {
        self.explosion.clear();
        self.ejecta.clear();
    }

    /// Full-circle burst at the impact point
    pub fn spawn_explosion(&mut self, origin: Vec2, count: usize) {
        self.explosion.reserve(count);
        for i in 0..count {
            let angle = self.rng.gen_range(0.0..2.0 * PI);
            let speed = self.rng.gen_range(0.8..2.6);
            let color = if i % 2 == 1 {
                Color::rgba(255, 180, 0, 0.75)
            } else {
                Color::rgba(255, 100, 0, 0.75)
            };
            self.explosion.push(Particle {
                position: origin,
                velocity: Vec2::from_polar(angle, speed),
                life: self.rng.gen_range(40..65),
                color,
                size: EXPLOSION_SIZE,
                kind: ParticleKind::Explosion,
            });
        }
    }

    /// Ejecta thrown up from a disk of `crater_radius` px. Count scales with
    /// the radius and is capped at `max_count`. Returns the number spawned.
    pub fn spawn_crater_ejecta(&mut self, origin: Vec2, crater_radius: f64, max_count: usize) -> usize {
        let count = ((crater_radius * 3.0).floor().max(0.0) as usize).min(max_count);
        self.ejecta.reserve(count);

        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..2.0 * PI);
            let distance = self.rng.gen::<f64>() * crater_radius;
            let position = origin.add(&Vec2::from_polar(angle, distance));

            let draw: f64 = self.rng.gen();
            let (kind, color, size, vy) = if draw < LARGE_DEBRIS_BOUND {
                (
                    ParticleKind::LargeDebris,
                    self.shade((160.0, 40.0), (82.0, 20.0), (45.0, 15.0), 0.9),
                    2.0 + self.rng.gen::<f64>() * 3.0,
                    -3.0 - self.rng.gen::<f64>() * 4.0,
                )
            } else if draw < MEDIUM_DUST_BOUND {
                (
                    ParticleKind::MediumDust,
                    self.shade((139.0, 50.0), (69.0, 30.0), (19.0, 20.0), 0.7),
                    1.0 + self.rng.gen::<f64>() * 2.0,
                    -2.0 - self.rng.gen::<f64>() * 3.0,
                )
            } else {
                (
                    ParticleKind::FineParticles,
                    self.shade((205.0, 30.0), (133.0, 40.0), (63.0, 20.0), 0.6),
                    0.5 + self.rng.gen::<f64>(),
                    -1.0 - self.rng.gen::<f64>() * 2.0,
                )
            };

            let vx = angle.cos() * (0.8 + self.rng.gen::<f64>() * 2.0);
            self.ejecta.push(Particle {
                position,
                velocity: Vec2::new(vx, vy),
                life: self.rng.gen_range(80..140),
                color,
                size,
                kind,
            });
        }

        count
    }

    /// Random color with each channel in [base, base + spread)
    fn shade(&mut self, r: (f64, f64), g: (f64, f64), b: (f64, f64), alpha: f64) -> Color {
        Color::from_channels(
            r.0 + self.rng.gen::<f64>() * r.1,
            g.0 + self.rng.gen::<f64>() * g.1,
            b.0 + self.rng.gen::<f64>() * b.1,
            alpha,
        )
    }

    pub fn update_explosion(&mut self) {
        self.explosion.retain_mut(|p| p.integrate(EXPLOSION_GRAVITY));
    }

    pub fn update_ejecta(&mut self) {
        let rng = &mut self.rng;
        self.ejecta.retain_mut(|p| {
            let alive = p.integrate(EJECTA_GRAVITY);
            p.velocity.x *= EJECTA_DRAG;
            if p.kind == ParticleKind::LargeDebris {
                p.velocity.x += (rng.gen::<f64>() - 0.5) * DEBRIS_JITTER;
            }
            alive
        });
    }

    pub fn draw_explosion(&self, surface: &mut impl DrawSurface) {
        for p in &self.explosion {
            surface.submit(RenderCommand::Circle {
                x: p.position.x,
                y: p.position.y,
                radius: p.size,
                fill: Some(p.color),
                stroke: None,
                glow: None,
            });
        }
    }

    pub fn draw_ejecta(&self, surface: &mut impl DrawSurface) {
        for p in &self.ejecta {
            let glow = (p.kind == ParticleKind::LargeDebris).then(|| Glow::new(p.color, 3.0));
            surface.submit(RenderCommand::Circle {
                x: p.position.x,
                y: p.position.y,
                radius: p.size,
                fill: Some(p.color),
                stroke: None,
                glow,
            });
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
