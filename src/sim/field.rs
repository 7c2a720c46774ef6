//! Torpedo run field generation
//!
//! Builds the obstacle course once per round: two wall bands with one gap
//! each, a static hazard guarding every gap, an oscillating hazard at
//! mid-height, two turbo patrols near the top and a couple of hazards placed
//! by rejection sampling.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, circle_hits_any, circle_rect_overlap, circles_collide};
use crate::tuning::TorpedoTuning;

/// Vertical clearance between a gap hazard and its band
const GAP_HAZARD_CLEARANCE: f32 = 12.0;

/// A circular hazard, optionally patrolling horizontally
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub position: Vec2,
    pub radius: f32,
    /// Signed horizontal speed (px per step), 0 for static hazards
    pub horizontal_speed: f32,
    /// Turbo hazards bounce off the screen margins only, never off walls
    pub turbo: bool,
}

impl Hazard {
    pub fn fixed(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            radius,
            horizontal_speed: 0.0,
            turbo: false,
        }
    }

    pub fn patrol(position: Vec2, radius: f32, horizontal_speed: f32, turbo: bool) -> Self {
        Self {
            position,
            radius,
            horizontal_speed,
            turbo,
        }
    }

    #[inline]
    pub fn moves(&self) -> bool {
        self.horizontal_speed != 0.0
    }
}

/// A complete obstacle course
///
/// Hazards are ordered: gap guards, oscillator, turbo patrols, then the
/// sampled hazards that could be placed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TorpedoField {
    pub start: Vec2,
    pub target: Vec2,
    pub walls: Vec<Rect>,
    pub hazards: Vec<Hazard>,
    /// Areas kept free of sampled hazards (gap approaches, start, target)
    pub reserved: Vec<Rect>,
}

impl TorpedoField {
    /// Open water: start and target only
    pub fn open(width: f32, height: f32, tuning: &TorpedoTuning) -> Self {
        Self {
            start: Vec2::new(width / 2.0, height - tuning.start_inset),
            target: Vec2::new(width / 2.0, tuning.target_inset),
            ..Self::default()
        }
    }
}

fn random_sign<R: Rng>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Uniform x keeping a circle of `radius` on screen (centered if it cannot fit)
fn random_x<R: Rng>(rng: &mut R, width: f32, radius: f32) -> f32 {
    if width > 2.0 * radius {
        rng.random_range(radius..=width - radius)
    } else {
        width / 2.0
    }
}

/// Left edge of a band's gap
fn pick_gap_x<R: Rng>(rng: &mut R, width: f32, tuning: &TorpedoTuning) -> f32 {
    let side_pad = tuning.hazard_radius * 2.0;
    let max_x = width - side_pad - tuning.gap_width;
    if max_x > side_pad {
        rng.random_range(side_pad..=max_x)
    } else {
        ((width - tuning.gap_width) / 2.0).max(0.0)
    }
}

/// Rejection-sample one static hazard; `None` once the attempt budget is spent
fn sample_hazard<R: Rng>(
    rng: &mut R,
    field: &TorpedoField,
    width: f32,
    tuning: &TorpedoTuning,
) -> Option<Hazard> {
    let r = tuning.hazard_radius;
    let min_y = field.target.y + tuning.target_radius + 2.0 * r;
    let max_y = field.start.y - tuning.torpedo_radius - 3.0 * r;
    if min_y > max_y {
        return None;
    }

    for _ in 0..tuning.placement_attempts {
        let candidate = Vec2::new(random_x(rng, width, r), rng.random_range(min_y..=max_y));
        if circle_hits_any(candidate, r + tuning.placement_safety, &field.walls) {
            continue;
        }
        if field
            .reserved
            .iter()
            .any(|zone| circle_rect_overlap(candidate, r, zone))
        {
            continue;
        }
        if field
            .hazards
            .iter()
            .any(|h| circles_collide(candidate, r, h.position, h.radius))
        {
            continue;
        }
        return Some(Hazard::fixed(candidate, r));
    }
    None
}

/// Generate a field for the given viewport
pub fn generate_field<R: Rng>(
    width: f32,
    height: f32,
    tuning: &TorpedoTuning,
    rng: &mut R,
) -> TorpedoField {
    let r = tuning.hazard_radius;
    let safety = tuning.placement_safety;
    let mut field = TorpedoField::open(width, height, tuning);

    for fraction in tuning.band_fractions {
        let top = height * fraction;
        let gap_x = pick_gap_x(rng, width, tuning);
        let gap_end = gap_x + tuning.gap_width;

        let left = Rect::new(0.0, top, gap_x, tuning.wall_thickness);
        let right = Rect::new(gap_end, top, (width - gap_end).max(0.0), tuning.wall_thickness);
        field
            .walls
            .extend([left, right].into_iter().filter(|w| w.width() > 0.0));

        field.reserved.push(Rect::new(
            gap_x - safety,
            top - 3.0 * r,
            tuning.gap_width + 2.0 * safety,
            tuning.wall_thickness + 6.0 * r,
        ));

        // Guard sits on the target side of the band, on one of the gap edges
        let edge_x = if rng.random_bool(0.5) { gap_x } else { gap_end };
        field.hazards.push(Hazard::fixed(
            Vec2::new(edge_x, top - r - GAP_HAZARD_CLEARANCE),
            r,
        ));
    }

    let keep_clear = tuning.torpedo_radius + r + safety;
    field.reserved.push(Rect {
        min: field.start - Vec2::splat(keep_clear),
        max: field.start + Vec2::splat(keep_clear),
    });
    let keep_clear = tuning.target_radius + r + safety;
    field.reserved.push(Rect {
        min: field.target - Vec2::splat(keep_clear),
        max: field.target + Vec2::splat(keep_clear),
    });

    field.hazards.push(Hazard::patrol(
        Vec2::new(width / 2.0, height / 2.0),
        r,
        tuning.oscillator_speed * random_sign(rng),
        false,
    ));

    for fraction in tuning.turbo_fractions {
        let position = Vec2::new(random_x(rng, width, r), height * fraction);
        let speed = tuning.turbo_speed * random_sign(rng);
        field.hazards.push(Hazard::patrol(position, r, speed, true));
    }

    for index in 0..tuning.random_hazards {
        match sample_hazard(rng, &field, width, tuning) {
            Some(hazard) => field.hazards.push(hazard),
            None => log::warn!(
                "Torpedo field: sampled hazard {} omitted after {} attempts",
                index,
                tuning.placement_attempts
            ),
        }
    }

    log::debug!(
        "Torpedo field: {} walls, {} hazards",
        field.walls.len(),
        field.hazards.len()
    );
    field
}
