//! Falling balls.

use std::time::Duration;

use mirrorplay_shared::{BallColor, Vec2};

use super::animation::PopAnimation;

/// Unique ball identifier within one engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(pub u64);

/// Links an interactive ball to its mirrored twin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairId(pub u32);

/// A falling ball.
///
/// The hit flag is one-way: once set, the ball stops moving, ignores
/// further hit tests and is on its way out through the pop animation.
#[derive(Clone, Debug)]
pub struct Ball {
    id: BallId,
    position: Vec2,
    velocity: f32,
    radius: f32,
    color: BallColor,
    pair: Option<PairId>,
    mirror: bool,
    hit: bool,
    pop: Option<PopAnimation>,
}

impl Ball {
    /// Creates an interactive ball.
    #[must_use]
    pub fn new(id: BallId, position: Vec2, velocity: f32, radius: f32, color: BallColor) -> Self {
        Self {
            id,
            position,
            velocity,
            radius,
            color,
            pair: None,
            mirror: false,
            hit: false,
            pop: None,
        }
    }

    /// Attaches a pair id.
    #[must_use]
    pub fn with_pair(mut self, pair: PairId) -> Self {
        self.pair = Some(pair);
        self
    }

    /// Builds the non-interactive twin at `x`, sharing color, velocity and pair.
    #[must_use]
    pub fn twin(&self, id: BallId, x: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, self.position.y),
            mirror: true,
            hit: false,
            pop: None,
            ..self.clone()
        }
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> BallId {
        self.id
    }

    /// Center in view coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Fall speed in view pixels per tick.
    #[must_use]
    pub const fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Unscaled radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Palette color.
    #[must_use]
    pub const fn color(&self) -> BallColor {
        self.color
    }

    /// Pair id shared with a twin, if any.
    #[must_use]
    pub const fn pair(&self) -> Option<PairId> {
        self.pair
    }

    /// True for the visual-only twin.
    #[must_use]
    pub const fn is_mirror(&self) -> bool {
        self.mirror
    }

    /// True once caught.
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        self.hit
    }

    /// Current pop scale, 1.0 until the ball is caught.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.pop.as_ref().map_or(1.0, PopAnimation::scale)
    }

    /// Top edge (`y - radius`).
    #[must_use]
    pub fn top(&self) -> f32 {
        self.position.y - self.radius
    }

    /// Sets the hit flag and starts the pop animation.
    ///
    /// Returns false if the ball was already hit; nothing changes then.
    pub fn mark_hit(&mut self, pop_duration: Duration) -> bool {
        if self.hit {
            return false;
        }
        self.hit = true;
        self.pop = Some(PopAnimation::new(pop_duration));
        true
    }

    /// Constant-velocity fall. Hit balls stay where they were caught.
    pub fn fall(&mut self) {
        if !self.hit {
            self.position.y += self.velocity;
        }
    }

    /// Advances the pop animation. Returns true once it has finished.
    pub fn advance_pop(&mut self, dt: Duration) -> bool {
        self.pop.as_mut().is_some_and(|pop| pop.advance(dt))
    }

    /// True once the pop animation has played out.
    #[must_use]
    pub fn is_popped(&self) -> bool {
        self.pop.as_ref().is_some_and(PopAnimation::is_complete)
    }

    /// Touch test against the scaled radius.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let r = self.radius * self.scale();
        self.position.distance_squared(point) <= r * r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball() -> Ball {
        Ball::new(BallId(1), Vec2::new(100.0, -40.0), 10.0, 40.0, BallColor::Red)
    }

    #[test]
    fn test_fall_stops_when_hit() {
        let mut ball = ball();
        ball.fall();
        assert_eq!(ball.position().y, -30.0);

        assert!(ball.mark_hit(Duration::from_millis(300)));
        ball.fall();
        assert_eq!(ball.position().y, -30.0);
    }

    #[test]
    fn test_hit_is_one_way() {
        let mut ball = ball();
        assert!(ball.mark_hit(Duration::from_millis(300)));
        ball.advance_pop(Duration::from_millis(100));
        let scale = ball.scale();
        assert!(!ball.mark_hit(Duration::from_millis(300)));
        assert_eq!(ball.scale(), scale);
        assert!(ball.is_hit());
    }

    #[test]
    fn test_twin_shares_pair_and_color() {
        let ball = ball().with_pair(PairId(7));
        let twin = ball.twin(BallId(2), 300.0);
        assert!(twin.is_mirror());
        assert!(!ball.is_mirror());
        assert_eq!(twin.pair(), Some(PairId(7)));
        assert_eq!(twin.color(), ball.color());
        assert_eq!(twin.velocity(), ball.velocity());
        assert_eq!(twin.position(), Vec2::new(300.0, -40.0));
    }

    #[test]
    fn test_contains_uses_scaled_radius() {
        let ball = Ball::new(BallId(1), Vec2::new(0.0, 0.0), 0.0, 40.0, BallColor::Blue);
        assert!(ball.contains(Vec2::new(40.0, 0.0)));
        assert!(!ball.contains(Vec2::new(40.1, 0.0)));
    }

    #[test]
    fn test_popped_after_duration() {
        let mut ball = ball();
        assert!(!ball.advance_pop(Duration::from_secs(1)));
        ball.mark_hit(Duration::from_millis(300));
        assert!(!ball.advance_pop(Duration::from_millis(200)));
        assert!(ball.advance_pop(Duration::from_millis(100)));
        assert!(ball.is_popped());
    }
}
