//! Ring layout for the multi-directional tapping task
//!
//! Targets sit evenly on a circle whose diameter is the condition's movement
//! amplitude. Presentation order skips across the circle so consecutive
//! targets are (nearly) opposite each other.

use crate::geometry::Point;
use crate::types::Target;
use std::f64::consts::PI;

/// Place `count` targets of diameter `width` on a circle of diameter `distance` around `center`
///
/// Target `i` sits at angle `2πi / count`, starting on the positive x axis.
pub fn layout_ring(count: usize, distance: f64, width: f64, center: Point) -> Vec<Target> {
    let radius = distance / 2.0;
    (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64;
            Target {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
                w: width,
                distance,
            }
        })
        .collect()
}

/// Step between consecutive targets: half the ring, rounded up
pub fn skip_step(count: usize) -> usize {
    count.div_ceil(2)
}

/// Index presented after `current` on a ring of `count` targets
pub fn next_position(current: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (current + skip_step(count)) % count
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_four_target_ring() {
        let targets = layout_ring(4, 200.0, 30.0, Point::new(100.0, 100.0));
        let expected = [(200.0, 100.0), (100.0, 200.0), (0.0, 100.0), (100.0, 0.0)];

        assert_eq!(targets.len(), 4);
        for (target, (x, y)) in targets.iter().zip(expected) {
            assert!((target.x - x).abs() < EPS, "x {} != {}", target.x, x);
            assert!((target.y - y).abs() < EPS, "y {} != {}", target.y, y);
            assert_eq!(target.w, 30.0);
            assert_eq!(target.distance, 200.0);
        }
    }

    #[test]
    fn test_opposite_targets_are_one_amplitude_apart() {
        let targets = layout_ring(24, 300.0, 55.0, Point::new(310.0, 200.0));
        for i in 0..12 {
            let d = crate::geometry::distance(targets[i].center(), targets[i + 12].center());
            assert!((d - 300.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_skip_sequence_even_count() {
        let mut position = 0;
        let mut visited = vec![position];
        for _ in 0..5 {
            position = next_position(position, 6);
            visited.push(position);
        }
        assert_eq!(skip_step(6), 3);
        assert_eq!(visited, vec![0, 3, 0, 3, 0, 3]);
    }

    #[test]
    fn test_skip_sequence_odd_count_visits_all() {
        let mut position = 0;
        let mut visited = vec![position];
        for _ in 0..4 {
            position = next_position(position, 5);
            visited.push(position);
        }
        assert_eq!(visited, vec![0, 3, 1, 4, 2]);
    }
}
