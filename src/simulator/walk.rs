use super::random::RandomSource;
use crate::model::price::{round2, PriceState};

pub const DEFAULT_VOLATILITY: f64 = 0.02;

/// Maps a unit draw onto `[-volatility, +volatility)`.
pub fn change_fraction(unit: f64, volatility: f64) -> f64 {
    (unit * 2.0 - 1.0) * volatility
}

/// One random-walk step from `current.price`. The arithmetic runs unrounded;
/// each stored field is rounded exactly once.
pub fn step(current: &PriceState, change_percent: f64) -> PriceState {
    let change_amount = current.price * change_percent;
    let new_price = current.price + change_amount;
    PriceState {
        price: round2(new_price),
        change: round2(change_amount),
        percent_change: round2(change_percent * 100.0),
    }
}

pub fn random_step(
    current: &PriceState,
    volatility: f64,
    random: &mut dyn RandomSource,
) -> PriceState {
    step(current, change_fraction(random.next_unit(), volatility))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::random::ChaChaSource;

    #[test]
    fn three_quarter_draw_is_plus_one_percent() {
        assert_eq!(change_fraction(0.75, DEFAULT_VOLATILITY), 0.01);
        assert_eq!(change_fraction(0.5, DEFAULT_VOLATILITY), 0.0);
        assert_eq!(change_fraction(0.0, DEFAULT_VOLATILITY), -0.02);
    }

    #[test]
    fn step_from_tsla_base() {
        let next = step(&PriceState::seeded(250.0), 0.01);
        assert_eq!(next.price, 252.5);
        assert_eq!(next.change, 2.5);
        assert_eq!(next.percent_change, 1.0);
    }

    #[test]
    fn random_steps_stay_within_volatility_band() {
        let mut random = ChaChaSource::seeded(42);
        let mut state = PriceState::seeded(123.45);
        for _ in 0..500 {
            let before = state.price;
            state = random_step(&state, DEFAULT_VOLATILITY, &mut random);
            assert!(state.change.abs() <= 0.02 * before + 0.01);
            assert!(state.percent_change.abs() <= 2.0);
            let expected = round2(before * state.percent_change / 100.0);
            // percent_change is itself rounded, so allow its error scaled by price.
            assert!((expected - state.change).abs() <= 0.01 + before * 5e-5 + 1e-9);
        }
    }
}
