//! Player versus obstacle hit tests
//!
//! Two models: the extent test (the player's bounding box must sit inside the
//! gap while overlapping a pillar horizontally) and the circle test (closest
//! point on each pillar rectangle within the radius).

use glam::Vec2;

use super::state::{Obstacle, PlayerState};

/// Whether the player's horizontal extent overlaps the obstacle's columns
#[inline]
pub fn overlaps_horizontally(player: &PlayerState, obstacle: &Obstacle, width: f32) -> bool {
    player.right() > obstacle.x && player.left() < obstacle.trailing_edge(width)
}

/// Extent model: a hit when overlapping horizontally and not fully inside the gap
pub fn extent_hits_obstacle(
    player: &PlayerState,
    obstacle: &Obstacle,
    width: f32,
    gap: f32,
) -> bool {
    if !overlaps_horizontally(player, obstacle, width) {
        return false;
    }
    let gap_top = obstacle.gap_y;
    let gap_bottom = obstacle.gap_y + gap;
    player.top() < gap_top || player.bottom() > gap_bottom
}

/// Circle model: a hit when the player's circle touches either pillar
///
/// The top pillar spans `[0, gap_y]`, the bottom pillar `[gap_y + gap, floor]`.
pub fn circle_hits_obstacle(
    player: &PlayerState,
    obstacle: &Obstacle,
    width: f32,
    gap: f32,
    floor: f32,
) -> bool {
    let center = player.center();
    let top = (
        Vec2::new(obstacle.x, 0.0),
        Vec2::new(obstacle.x + width, obstacle.gap_y),
    );
    let bottom = (
        Vec2::new(obstacle.x, obstacle.gap_y + gap),
        Vec2::new(obstacle.x + width, floor.max(obstacle.gap_y + gap)),
    );
    circle_touches_rect(center, player.r, top.0, top.1)
        || circle_touches_rect(center, player.r, bottom.0, bottom.1)
}

/// Closest-point test between a circle and an axis-aligned rectangle
#[inline]
fn circle_touches_rect(center: Vec2, radius: f32, min: Vec2, max: Vec2) -> bool {
    let closest = center.clamp(min, max);
    center.distance_squared(closest) <= radius * radius
}
