//! Reply text and cosmetic template variation.
//!
//! A few replies have two equivalent phrasings; which one is sent is
//! chosen by an injected [`VariantPicker`] so it can never leak into
//! state or data, and tests can pin it.

use rand::Rng;

pub(crate) const CITY_PROMPT: &str = "Please enter a city name:";

pub(crate) const NEW_CITY_PROMPT: &str = "Please enter a new city:";

pub(crate) const CITY_RETRY: &str =
    "Sorry, I couldn't recognize that city. Please enter another city name:";

pub(crate) const DIFFERENCE_PROMPT: &str =
    "Please enter another city to compare the time difference:";

pub(crate) const TIME_SPEC_PROMPT: &str =
    "Please enter the time and the city you are converting from using the format 'HH:MM AM/PM City'";

pub(crate) const TIME_SPEC_RETRY: &str =
    "I couldn't read that. Please use the format 'HH:MM AM/PM City', e.g. '09:30 PM London'.";

pub(crate) const WHATS_NEXT: &str = "What do you want to do next?";

pub(crate) const TIMEOUT_NOTICE: &str =
    "Looks like you've been away for a while. Tap Restart whenever you want to continue.";

pub(crate) const CONVERSION_PROMPTS: [&str; 2] = [
    "What city would you like to convert the time to?",
    "Please enter the city you want to convert the time to:",
];

/// Chooses among equivalent reply phrasings.
pub trait VariantPicker: Send + Sync {
    /// Pick an index in `0..n`.
    fn pick(&self, n: usize) -> usize;
}

/// Production picker: uniformly random.
pub struct RandomPicker;

impl VariantPicker for RandomPicker {
    fn pick(&self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        rand::rng().random_range(0..n)
    }
}

/// Select one variant, clamping out-of-range picks to the first.
pub(crate) fn choose<T: Clone>(picker: &dyn VariantPicker, variants: &[T]) -> Option<T> {
    let index = picker.pick(variants.len());
    variants.get(index).or_else(|| variants.first()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(usize);

    impl VariantPicker for Fixed {
        fn pick(&self, _n: usize) -> usize {
            self.0
        }
    }

    #[test]
    fn choose_honors_the_picker() {
        assert_eq!(choose(&Fixed(1), &CONVERSION_PROMPTS), Some(CONVERSION_PROMPTS[1]));
    }

    #[test]
    fn out_of_range_picks_clamp_to_first() {
        assert_eq!(choose(&Fixed(9), &CONVERSION_PROMPTS), Some(CONVERSION_PROMPTS[0]));
    }

    #[test]
    fn random_picker_stays_in_range() {
        let picker = RandomPicker;
        for _ in 0..100 {
            assert!(picker.pick(2) < 2);
        }
    }
}
