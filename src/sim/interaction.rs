//! Pointer proximity tests for food and hazards
//!
//! The resolver owns nothing: it borrows a pool for one pass and reports which
//! entities changed state so the tick can raise events and spawn effects.

use glam::Vec2;

use super::food::FoodPool;
use super::hazard::HazardPool;
use crate::consts::*;

/// Mark every roaming food within the eat radius as eaten
///
/// Each qualifying food transitions independently; the bite radius keeps
/// simultaneous hits rare in practice. Slots in `recycled` were respawned this
/// frame and sit out until the next one. Returns the positions they were
/// eaten at, in pool order.
pub fn resolve_food(food: &mut FoodPool, pointer: Vec2, recycled: &[usize]) -> Vec<Vec2> {
    let radius_sq = EAT_RADIUS * EAT_RADIUS;
    let mut eaten = Vec::new();
    for (index, f) in food.iter_mut().enumerate() {
        if f.is_eaten() || recycled.contains(&index) {
            continue;
        }
        if f.pos.distance_squared(pointer) < radius_sq {
            eaten.push(f.pos);
            f.eat(pointer);
        }
    }
    eaten
}

/// Detonate at most one armed hazard near the pointer
///
/// `cooldown` is decremented once per call; a detonation is only accepted at
/// zero and re-arms the cooldown. The first hazard in pool order wins.
/// Returns the detonation point.
pub fn resolve_hazards(hazards: &mut HazardPool, cooldown: &mut u32, pointer: Vec2) -> Option<Vec2> {
    *cooldown = cooldown.saturating_sub(1);
    if *cooldown > 0 {
        return None;
    }

    let radius_sq = HAZARD_RADIUS * HAZARD_RADIUS;
    let hit = hazards
        .iter_mut()
        .filter(|h| !h.is_exploding())
        .find(|h| h.pos.distance_squared(pointer) < radius_sq)?;

    hit.detonate();
    *cooldown = HAZARD_COOLDOWN_FRAMES;
    Some(hit.pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazard::Hazard;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn hazard_at(pos: Vec2) -> Hazard {
        let mut h = Hazard::spawn(Vec2::new(800.0, 600.0), Vec2::ZERO, &mut Pcg32::seed_from_u64(1));
        h.pos = pos;
        h
    }

    #[test]
    fn test_food_under_pointer_is_eaten() {
        let mut rng = Pcg32::seed_from_u64(5);
        let size = Vec2::new(800.0, 600.0);
        let mut pool = FoodPool::filled(3, size, &mut rng);
        let positions = [Vec2::new(100.0, 100.0), Vec2::new(400.0, 300.0), Vec2::new(130.0, 100.0)];
        for (f, p) in pool.iter_mut().zip(positions) {
            f.pos = p;
        }

        let eaten = resolve_food(&mut pool, Vec2::new(110.0, 100.0), &[]);
        assert_eq!(eaten, vec![Vec2::new(100.0, 100.0), Vec2::new(130.0, 100.0)]);
        assert!(pool.as_slice()[0].is_eaten());
        assert!(!pool.as_slice()[1].is_eaten());

        // Already eaten food never re-triggers
        assert!(resolve_food(&mut pool, Vec2::new(110.0, 100.0), &[]).is_empty());
    }

    #[test]
    fn test_recycled_slot_skipped_for_a_frame() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut pool = FoodPool::filled(2, Vec2::new(800.0, 600.0), &mut rng);
        for f in pool.iter_mut() {
            f.pos = Vec2::new(100.0, 100.0);
        }

        let eaten = resolve_food(&mut pool, Vec2::new(100.0, 100.0), &[1]);
        assert_eq!(eaten.len(), 1);
        assert!(pool.as_slice()[0].is_eaten());
        assert!(!pool.as_slice()[1].is_eaten());
    }

    #[test]
    fn test_single_detonation_per_frame() {
        let mut pool = HazardPool::default();
        pool.push(hazard_at(Vec2::new(100.0, 100.0)));
        pool.push(hazard_at(Vec2::new(110.0, 100.0)));
        let mut cooldown = 0;

        let hit = resolve_hazards(&mut pool, &mut cooldown, Vec2::new(105.0, 100.0));
        assert_eq!(hit, Some(Vec2::new(100.0, 100.0)));
        assert_eq!(pool.armed_count(), 1);
        assert_eq!(cooldown, HAZARD_COOLDOWN_FRAMES);
    }

    #[test]
    fn test_cooldown_blocks_repeat_detonation() {
        let mut pool = HazardPool::default();
        pool.push(hazard_at(Vec2::new(100.0, 100.0)));
        pool.push(hazard_at(Vec2::new(100.0, 100.0)));
        let pointer = Vec2::new(100.0, 100.0);
        let mut cooldown = 0;

        assert!(resolve_hazards(&mut pool, &mut cooldown, pointer).is_some());
        // Pointer stays on the second hazard for the whole window
        for _ in 1..HAZARD_COOLDOWN_FRAMES {
            assert!(resolve_hazards(&mut pool, &mut cooldown, pointer).is_none());
        }
        assert_eq!(pool.armed_count(), 1);
        assert!(resolve_hazards(&mut pool, &mut cooldown, pointer).is_some());
    }

    #[test]
    fn test_out_of_range_hazard_ignored() {
        let mut pool = HazardPool::default();
        pool.push(hazard_at(Vec2::new(100.0, 100.0)));
        let mut cooldown = 0;
        let far = Vec2::new(100.0 + HAZARD_RADIUS + 1.0, 100.0);
        assert!(resolve_hazards(&mut pool, &mut cooldown, far).is_none());
        assert_eq!(cooldown, 0);
    }
}
