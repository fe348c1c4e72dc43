//! Motion model: where an entity is at a given instant.
//!
//! Paths are piecewise-linear between keyframes. Before the first keyframe an
//! entity holds at the first point; after the last it either holds or, for
//! looping paths, wraps back into the keyframed span.

use std::borrow::Cow;

use crate::types::{Motion, PathMotion, PathPoint, Vec2};

use super::math::lerp_vec;

/// Stable sort by `at_ms`. Keyframes sharing a timestamp keep their order.
pub fn sort_points(points: &mut [PathPoint]) {
    points.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
}

fn is_sorted(points: &[PathPoint]) -> bool {
    points.windows(2).all(|w| w[0].at_ms <= w[1].at_ms)
}

impl Motion {
    /// Canonical form: non-finite keyframes dropped, the rest sorted by time.
    /// Applying it twice is the same as applying it once.
    pub fn normalized(&self) -> Motion {
        match self {
            Motion::None => Motion::None,
            Motion::Path(path) => {
                let mut points: Vec<PathPoint> =
                    path.points.iter().copied().filter(PathPoint::is_finite).collect();
                sort_points(&mut points);
                Motion::Path(PathMotion {
                    points,
                    looping: path.looping,
                    align_rotation: path.align_rotation,
                })
            }
        }
    }

    /// Keyframes of a path motion; empty for `None`.
    pub fn points(&self) -> &[PathPoint] {
        match self {
            Motion::None => &[],
            Motion::Path(path) => &path.points,
        }
    }
}

/// Position of something with `motion` at `time_ms`, or `fallback` when the
/// motion carries no keyframes.
pub fn evaluate(motion: &Motion, fallback: Vec2, time_ms: f64) -> Vec2 {
    match motion {
        Motion::None => fallback,
        Motion::Path(path) => evaluate_path(path, time_ms).unwrap_or(fallback),
    }
}

fn evaluate_path(path: &PathMotion, time_ms: f64) -> Option<Vec2> {
    let points = sorted(&path.points);
    let first = points.first()?;
    let last = points.last()?;

    if !time_ms.is_finite() || time_ms <= first.at_ms {
        return Some(first.position());
    }

    let mut t = time_ms;
    if t >= last.at_ms {
        let span = last.at_ms - first.at_ms;
        if !path.looping || span <= 0.0 {
            return Some(last.position());
        }
        t = first.at_ms + (t - first.at_ms) % span;
    }

    Some(interpolate(&points, t))
}

/// `points` sorted, `t` within `[first.at_ms, last.at_ms]`.
fn interpolate(points: &[PathPoint], t: f64) -> Vec2 {
    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.at_ms <= t && t <= b.at_ms {
            let span = b.at_ms - a.at_ms;
            let ratio = if span > 0.0 { (t - a.at_ms) / span } else { 0.0 };
            return lerp_vec(a.position(), b.position(), ratio);
        }
    }
    // Single keyframe.
    points.last().map_or(Vec2::ORIGIN, PathPoint::position)
}

/// `points` in time order, borrowed when they already are.
pub(crate) fn sorted(points: &[PathPoint]) -> Cow<'_, [PathPoint]> {
    if is_sorted(points) {
        Cow::Borrowed(points)
    } else {
        let mut owned = points.to_vec();
        sort_points(&mut owned);
        Cow::Owned(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_point_path(looping: bool) -> Motion {
        Motion::Path(PathMotion {
            points: vec![PathPoint::new(0.0, 0.0, 0.0), PathPoint::new(100.0, 0.0, 1000.0)],
            looping,
            align_rotation: false,
        })
    }

    #[test]
    fn interpolates_between_keyframes() {
        let motion = two_point_path(false);
        assert_eq!(evaluate(&motion, Vec2::ORIGIN, 500.0), Vec2::new(50.0, 0.0));
        assert_eq!(evaluate(&motion, Vec2::ORIGIN, -5.0), Vec2::new(0.0, 0.0));
        assert_eq!(evaluate(&motion, Vec2::ORIGIN, 2000.0), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn looping_path_wraps_past_the_last_keyframe() {
        let motion = two_point_path(true);
        assert_eq!(
            evaluate(&motion, Vec2::ORIGIN, 1200.0),
            evaluate(&motion, Vec2::ORIGIN, 200.0)
        );
        assert_eq!(evaluate(&motion, Vec2::ORIGIN, 1000.0), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn looping_with_zero_span_holds() {
        let motion = Motion::Path(PathMotion {
            points: vec![PathPoint::new(3.0, 4.0, 100.0), PathPoint::new(7.0, 8.0, 100.0)],
            looping: true,
            align_rotation: false,
        });
        assert_eq!(evaluate(&motion, Vec2::ORIGIN, 500.0), Vec2::new(7.0, 8.0));
    }

    #[test]
    fn empty_path_and_none_use_fallback() {
        let fallback = Vec2::new(9.0, -9.0);
        assert_eq!(evaluate(&Motion::None, fallback, 10.0), fallback);
        assert_eq!(
            evaluate(&Motion::Path(PathMotion::default()), fallback, 10.0),
            fallback
        );
    }

    #[test]
    fn duplicate_timestamps_resolve_by_array_order() {
        let motion = Motion::Path(PathMotion {
            points: vec![
                PathPoint::new(0.0, 0.0, 0.0),
                PathPoint::new(10.0, 0.0, 500.0),
                PathPoint::new(20.0, 0.0, 500.0),
                PathPoint::new(30.0, 0.0, 1000.0),
            ],
            looping: false,
            align_rotation: false,
        });
        assert_eq!(evaluate(&motion, Vec2::ORIGIN, 500.0), Vec2::new(10.0, 0.0));
        assert_eq!(evaluate(&motion, Vec2::ORIGIN, 750.0), Vec2::new(25.0, 0.0));
    }

    #[test]
    fn unsorted_points_are_sorted_before_lookup() {
        let motion = Motion::Path(PathMotion {
            points: vec![PathPoint::new(100.0, 0.0, 1000.0), PathPoint::new(0.0, 0.0, 0.0)],
            looping: false,
            align_rotation: false,
        });
        assert_eq!(evaluate(&motion, Vec2::ORIGIN, 250.0), Vec2::new(25.0, 0.0));
    }

    #[test]
    fn normalization_is_idempotent() {
        let motion = Motion::Path(PathMotion {
            points: vec![
                PathPoint::new(1.0, 1.0, 300.0),
                PathPoint::new(f64::NAN, 0.0, 50.0),
                PathPoint::new(2.0, 2.0, 100.0),
                PathPoint::new(3.0, 3.0, 100.0),
            ],
            looping: true,
            align_rotation: true,
        });
        let once = motion.normalized();
        assert_eq!(once.normalized(), once);
        let times: Vec<f64> = once.points().iter().map(|p| p.at_ms).collect();
        assert_eq!(times, vec![100.0, 100.0, 300.0]);
        assert_eq!(once.points()[0].x, 2.0);
    }
}
