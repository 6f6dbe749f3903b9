//! Synthetic performances for exercising the scorer: a real performance with
//! every note knocked off pitch and stretched or squeezed in time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scoring::types::{PerformanceEvent, Pitch};

/// Perturbed notes that fall below this pitch become rests.
pub const LOWEST_PITCH: i32 = 35;

pub fn deform<R: Rng + ?Sized>(events: &[PerformanceEvent], rng: &mut R) -> Vec<PerformanceEvent> {
    events
        .iter()
        .map(|event| {
            // both draws happen for every event so one seed gives one stream
            let offset: i32 = rng.gen_range(-5..5);
            let stretch: f64 = rng.gen_range(0.75..1.25);
            let pitch = match event.pitch {
                Pitch::Midi(midi) if midi + offset >= LOWEST_PITCH => Pitch::Midi(midi + offset),
                _ => Pitch::Rest,
            };
            PerformanceEvent {
                pitch,
                duration: event.duration * stretch,
            }
        })
        .collect()
}

pub fn deform_seeded(events: &[PerformanceEvent], seed: u64) -> Vec<PerformanceEvent> {
    let mut rng = StdRng::seed_from_u64(seed);
    deform(events, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn melody() -> Vec<PerformanceEvent> {
        (0..64)
            .map(|i| PerformanceEvent {
                pitch: Pitch::Midi(60 + (i % 12)),
                duration: 0.25 + (i % 4) as f64 * 0.25,
            })
            .collect()
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let events = melody();
        assert_eq!(deform_seeded(&events, 0), deform_seeded(&events, 0));
        assert_eq!(deform_seeded(&events, 99), deform_seeded(&events, 99));
    }

    #[test]
    fn test_different_seeds_differ() {
        let events = melody();
        let baseline = deform_seeded(&events, 0);
        for seed in 1..20 {
            assert_ne!(deform_seeded(&events, seed), baseline, "seed {} matched seed 0", seed);
        }
    }

    #[test]
    fn test_perturbation_bounds() {
        let events = melody();
        let deformed = deform_seeded(&events, 3);
        for (original, changed) in events.iter().zip(&deformed) {
            let (Pitch::Midi(before), Pitch::Midi(after)) = (original.pitch, changed.pitch) else {
                panic!("melody stays above the rest cutoff");
            };
            assert!((-5..=4).contains(&(after - before)));
            let ratio = changed.duration / original.duration;
            assert!((0.75..1.25).contains(&ratio), "ratio {}", ratio);
        }
    }

    #[test]
    fn test_low_notes_become_rests() {
        let events = vec![
            PerformanceEvent {
                pitch: Pitch::Midi(30),
                duration: 1.0,
            },
            PerformanceEvent {
                pitch: Pitch::Rest,
                duration: 1.0,
            },
        ];
        let deformed = deform_seeded(&events, 5);
        assert!(deformed.iter().all(|e| e.pitch == Pitch::Rest));
    }
}
