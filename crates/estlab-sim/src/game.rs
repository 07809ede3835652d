//! The goal-scoring game.
//!
//! Goals arrive as a Poisson process with rate `lambda` per game. One game is
//! simulated by drawing exponential gaps between goals until the elapsed time passes
//! the end of the game (`1.0`). The number of goals scored is itself an estimate of
//! `lambda`: its expectation is `lambda` and its variance is `lambda`, so the RMSE
//! over many games approaches `sqrt(lambda)`.

use rand::Rng;
use rand_distr::{Distribution as _, Exp};

use crate::SimError;

/// Upper bound on the number of goals in a single game.
///
/// A game whose gap loop runs this long is reported as
/// [`SimError::SimulationDivergence`] instead of running on.
pub const MAX_GAME_EVENTS: usize = 10_000;

/// Simulates one game and returns the number of goals scored.
///
/// # Errors
///
/// * [`SimError::InvalidParameter`] if `lambda` is not finite and positive
/// * [`SimError::SimulationDivergence`] if the game does not end within
///   [`MAX_GAME_EVENTS`] goals
///
/// # Examples
///
/// ```
/// use estlab_sim::game::simulate_game;
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64;
///
/// let mut rng = Pcg64::seed_from_u64(3);
/// let goals = simulate_game(2.0, &mut rng).unwrap();
/// assert!(goals < 100);
/// assert!(simulate_game(0.0, &mut rng).is_err());
/// ```
pub fn simulate_game<R>(lambda: f64, rng: &mut R) -> Result<u32, SimError>
where
    R: Rng + ?Sized,
{
    simulate_game_capped(lambda, MAX_GAME_EVENTS, rng)
}

/// Same as [`simulate_game`] with an explicit event cap.
pub fn simulate_game_capped<R>(
    lambda: f64,
    max_events: usize,
    rng: &mut R,
) -> Result<u32, SimError>
where
    R: Rng + ?Sized,
{
    if !(lambda.is_finite() && lambda > 0.0) {
        return Err(SimError::invalid_parameter(
            "lambda",
            format!("must be finite and positive, got {lambda}"),
        ));
    }
    let gap =
        Exp::new(lambda).map_err(|e| SimError::invalid_parameter("lambda", e.to_string()))?;

    let mut elapsed = 0.0;
    let mut goals = 0_u32;
    for _ in 0..=max_events {
        elapsed += gap.sample(rng);
        if elapsed > 1.0 {
            return Ok(goals);
        }
        goals += 1;
    }
    Err(SimError::SimulationDivergence { lambda, max_events })
}
