//! Proximity connection lines
//!
//! Pure geometry over the pools: returns plain segments the scene tessellates.

use glam::Vec2;

use super::vertex::colors;
use crate::consts::{CONNECTION_DISTANCE, POINTER_CONNECTION_DISTANCE};
use crate::fade_with_distance;
use crate::sim::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Food to food
    Link,
    /// Pointer to food
    Attraction,
    /// Pointer to hazard
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub from: Vec2,
    pub to: Vec2,
    pub kind: ConnectionKind,
    /// 1 at zero distance, 0 at the cutoff
    pub opacity: f32,
}

impl Connection {
    pub fn width(&self) -> f32 {
        match self.kind {
            ConnectionKind::Link => 1.5 + 1.5 * self.opacity,
            ConnectionKind::Attraction | ConnectionKind::Danger => 2.0 + 1.5 * self.opacity,
        }
    }

    pub fn color(&self) -> [f32; 4] {
        let mut c = match self.kind {
            ConnectionKind::Link => colors::FOOD_LINK,
            ConnectionKind::Attraction => colors::POINTER_LINK,
            ConnectionKind::Danger => colors::DANGER_LINK,
        };
        c[3] *= self.opacity;
        c
    }
}

/// Collect all connections for the current frame, in draw order
pub fn collect(world: &World, pointer: Vec2) -> Vec<Connection> {
    let mut out = Vec::new();
    let food: Vec<Vec2> = world.food.roaming().map(|f| f.pos).collect();

    // O(n²) over a fixed pool
    for (i, &a) in food.iter().enumerate() {
        for &b in &food[i + 1..] {
            let d = a.distance(b);
            if d < CONNECTION_DISTANCE {
                out.push(Connection {
                    from: a,
                    to: b,
                    kind: ConnectionKind::Link,
                    opacity: fade_with_distance(d, CONNECTION_DISTANCE),
                });
            }
        }
    }

    let pointer_links = food
        .iter()
        .map(|&p| (p, ConnectionKind::Attraction))
        .chain(world.hazards.armed().map(|h| (h.pos, ConnectionKind::Danger)));
    for (p, kind) in pointer_links {
        let d = pointer.distance(p);
        if d < POINTER_CONNECTION_DISTANCE {
            out.push(Connection {
                from: pointer,
                to: p,
                kind,
                opacity: fade_with_distance(d, POINTER_CONNECTION_DISTANCE),
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{TickInput, tick};

    fn empty_world() -> World {
        let mut world = World::new(1000.0, 1000.0, 8);
        // Spread food on a coarse grid so no pair is within range
        for (i, f) in world.food.iter_mut().enumerate() {
            f.pos = Vec2::new(50.0 + (i % 8) as f32 * 190.0, 50.0 + (i / 8) as f32 * 190.0);
        }
        world
    }

    #[test]
    fn test_food_pair_link() {
        let mut world = empty_world();
        // Off the grid so only this pair is in range
        world.food.get_mut(0).pos = Vec2::new(3000.0, 3000.0);
        world.food.get_mut(1).pos = Vec2::new(3090.0, 3000.0);

        let links: Vec<_> = collect(&world, Vec2::splat(-200.0))
            .into_iter()
            .filter(|c| c.kind == ConnectionKind::Link)
            .collect();
        assert_eq!(links.len(), 1);
        assert!((links[0].opacity - 0.5).abs() < 1e-5);
        assert!((links[0].width() - 2.25).abs() < 1e-5);
        assert!((links[0].color()[3] - 0.275).abs() < 1e-5);
    }

    #[test]
    fn test_eaten_food_has_no_connections() {
        let mut world = empty_world();
        let eaten = Vec2::new(3000.0, 3000.0);
        let other = Vec2::new(3090.0, 3000.0);
        let pointer = Vec2::new(3000.0, 3100.0);
        world.food.get_mut(0).pos = eaten;
        world.food.get_mut(1).pos = other;
        let before = collect(&world, pointer);
        assert!(before.iter().any(|c| c.kind == ConnectionKind::Link));
        assert!(before.iter().any(|c| c.kind == ConnectionKind::Attraction && c.to == eaten));

        world.food.get_mut(0).eat(pointer);
        let after = collect(&world, pointer);
        assert!(after.iter().all(|c| c.from != eaten && c.to != eaten));
        assert!(after.iter().all(|c| c.kind != ConnectionKind::Link));
        assert!(after.iter().any(|c| c.kind == ConnectionKind::Attraction && c.to == other));
    }

    #[test]
    fn test_pointer_reaches_further_than_links() {
        let world = empty_world();
        let target = world.food.as_slice()[0].pos;
        // 200 px is past the link cutoff but inside the pointer cutoff
        let pointer = target + Vec2::new(200.0, 0.0);
        let attractions = collect(&world, pointer)
            .into_iter()
            .filter(|c| c.kind == ConnectionKind::Attraction && c.to == target)
            .count();
        assert_eq!(attractions, 1);
    }

    #[test]
    fn test_no_danger_lines_without_hazards() {
        let mut world = World::new(800.0, 600.0, 2);
        for i in 0..60 {
            let p = Vec2::new(400.0 + (i as f32).sin() * 100.0, 300.0);
            tick(&mut world, &TickInput { pointer: p, hazard_target: 0 });
            assert!(collect(&world, p).iter().all(|c| c.kind != ConnectionKind::Danger));
        }
    }

    #[test]
    fn test_danger_lines_skip_exploding_hazards() {
        let mut world = World::new(800.0, 600.0, 2);
        tick(&mut world, &TickInput { pointer: Vec2::splat(-200.0), hazard_target: 1 });
        let hazard = world.hazards.as_slice()[0].pos;
        let pointer = hazard + Vec2::new(100.0, 0.0);
        assert_eq!(
            collect(&world, pointer).iter().filter(|c| c.kind == ConnectionKind::Danger).count(),
            1
        );

        world.hazards.iter_mut().for_each(|h| h.detonate());
        assert!(collect(&world, pointer).iter().all(|c| c.kind != ConnectionKind::Danger));
    }
}
