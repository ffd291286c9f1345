use crate::models::DevnetIteration;

/// Drop iterations shorter than `min_duration_minutes`, treating them as
/// failed or aborted runs. A duration exactly equal to the minimum is kept.
/// Zero disables the filter.
pub fn filter_min_duration(
    iterations: Vec<DevnetIteration>,
    min_duration_minutes: u64,
) -> Vec<DevnetIteration> {
    if min_duration_minutes == 0 {
        return iterations;
    }

    let min_minutes = min_duration_minutes as f64;
    iterations
        .into_iter()
        .filter(|iteration| iteration.duration_minutes() >= min_minutes)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn iteration_lasting(minutes: i64) -> DevnetIteration {
        let start: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        let end = start + Duration::minutes(minutes);
        DevnetIteration {
            id: format!("pqdevnet-{minutes}"),
            start_time: start,
            end_time: end,
            duration_hours: minutes as f64 / 60.0,
            start_slot: 0,
            end_slot: 100,
            clients: vec!["zeam".to_string()],
            notes: String::new(),
        }
    }

    #[test]
    fn drops_iterations_below_the_minimum() {
        let iterations = vec![iteration_lasting(15), iteration_lasting(120)];
        let kept = filter_min_duration(iterations, 30);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "pqdevnet-120");
    }

    #[test]
    fn duration_exactly_at_the_minimum_is_kept() {
        let iterations = vec![iteration_lasting(30)];
        let kept = filter_min_duration(iterations, 30);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn zero_disables_the_filter() {
        let iterations = vec![iteration_lasting(1), iteration_lasting(2)];
        assert_eq!(filter_min_duration(iterations, 0).len(), 2);
    }

    #[test]
    fn survivors_are_unchanged() {
        let original = iteration_lasting(90);
        let kept = filter_min_duration(vec![original.clone(), iteration_lasting(5)], 60);
        assert_eq!(kept, vec![original]);
    }
}
