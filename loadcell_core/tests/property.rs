use loadcell_core::{ChannelSeries, stats};
use proptest::prelude::*;

proptest! {
    #[test]
    fn series_never_exceeds_capacity(capacity in 1usize..64, appends in 0usize..256) {
        let mut series = ChannelSeries::new(capacity);
        for i in 0..appends {
            let t = i as f64;
            series.append(t, t, t);
            prop_assert!(series.len() <= capacity);
        }
        prop_assert_eq!(series.len(), appends.min(capacity));
    }

    #[test]
    fn eviction_drops_oldest_first(capacity in 1usize..32, overflow in 1usize..64) {
        let total = capacity + overflow;
        let mut series = ChannelSeries::new(capacity);
        for i in 0..total {
            series.append(i as f64, i as f64, i as f64);
        }
        let w = series.window(f64::MAX);
        // The survivors are exactly the most recent `capacity` appends.
        let expected: Vec<f64> = (overflow..total).map(|i| i as f64).collect();
        prop_assert_eq!(w.elapsed, expected);
    }

    #[test]
    fn window_members_are_a_contiguous_recent_suffix(
        n in 1usize..128,
        window in 0.0f64..200.0,
    ) {
        let mut series = ChannelSeries::new(256);
        for i in 0..n {
            series.append(i as f64, 0.0, 0.0);
        }
        let w = series.window(window);
        let latest = (n - 1) as f64;
        let tmin = (latest - window).max(0.0);
        prop_assert!(!w.is_empty());
        prop_assert_eq!(*w.elapsed.last().unwrap(), latest);
        for pair in w.elapsed.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], 1.0);
        }
        prop_assert!(w.elapsed.iter().all(|&t| t >= tmin));
        // Nothing just below the cut survives.
        if tmin >= 1.0 {
            prop_assert!(w.elapsed[0] - 1.0 < tmin);
        }
    }

    #[test]
    fn stats_stay_within_bounds(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..128)) {
        let s = stats::compute(&values).unwrap();
        let tolerance = 1.0e-6;
        prop_assert_eq!(s.sample_count, values.len());
        prop_assert_eq!(s.current, *values.last().unwrap());
        prop_assert!(s.min <= s.max);
        prop_assert!(s.mean >= s.min - tolerance);
        prop_assert!(s.mean <= s.max + tolerance);
    }
}
