use std::collections::HashSet;

use tracing::debug;

use crate::errors::EngineError;
use crate::models::Portion;

/// Target sum for the portions of a finalized basket.
pub const PORTION_TOTAL: u32 = 100;

/// Drop zero portions and nudge the rest, one point at a time, until they sum
/// to exactly 100.
///
/// Each pass hands one point to (or takes one from) each of the largest
/// holders in turn, then recurses on the result. Holders at 1 are never
/// reduced. Ties go to the entry listed first. Input order is preserved.
///
/// Fails with [`EngineError::EmptyBasket`] when nothing positive is left and
/// with [`EngineError::PortionSum`] when the total can't be reached.
pub fn correct(portions: &[Portion]) -> Result<Vec<Portion>, EngineError> {
    let positive: Vec<Portion> = portions.iter().filter(|p| p.portion > 0).cloned().collect();
    if positive.is_empty() {
        return Err(EngineError::EmptyBasket);
    }

    let corrected = redistribute(positive)?;
    debug_assert_eq!(sum(&corrected), PORTION_TOTAL as i64);
    Ok(corrected)
}

fn redistribute(portions: Vec<Portion>) -> Result<Vec<Portion>, EngineError> {
    let total = sum(&portions);
    let excess = total - PORTION_TOTAL as i64;
    if excess == 0 {
        return Ok(portions);
    }

    let mut order: Vec<usize> = (0..portions.len()).collect();
    order.sort_by(|&a, &b| portions[b].portion.cmp(&portions[a].portion));

    let adjusted: HashSet<usize> = order
        .into_iter()
        .filter(|&i| excess < 0 || portions[i].portion > 1)
        .take(excess.unsigned_abs() as usize)
        .collect();
    if adjusted.is_empty() {
        return Err(EngineError::PortionSum { sum: total });
    }

    debug!("Correcting portion sum {} across {} holders", total, adjusted.len());

    let next = portions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if !adjusted.contains(&i) {
                return p.clone();
            }
            let portion = if excess > 0 { p.portion - 1 } else { p.portion + 1 };
            Portion::new(p.asset_id.clone(), portion)
        })
        .collect();

    redistribute(next)
}

/// Check that `portions` can be published: non-empty, unique assets, and a
/// total of exactly 100.
pub fn assert_portions(portions: &[Portion]) -> Result<(), EngineError> {
    if portions.is_empty() {
        return Err(EngineError::EmptyBasket);
    }

    let mut seen = HashSet::new();
    if let Some(dup) = portions.iter().find(|p| !seen.insert(p.asset_id.as_str())) {
        return Err(EngineError::Validation(format!(
            "Asset {} appears more than once in basket",
            dup.asset_id
        )));
    }

    let total = sum(portions);
    if total != PORTION_TOTAL as i64 {
        return Err(EngineError::PortionSum { sum: total });
    }
    Ok(())
}

fn sum(portions: &[Portion]) -> i64 {
    portions.iter().map(|p| p.portion as i64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn portions(values: &[u32]) -> Vec<Portion> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Portion::new(format!("asset-{}", i), v))
            .collect()
    }

    fn values(portions: &[Portion]) -> Vec<u32> {
        portions.iter().map(|p| p.portion).collect()
    }

    #[test]
    fn test_correct_leaves_exact_sum_untouched() {
        let input = portions(&[57, 29, 14]);
        assert_eq!(correct(&input).unwrap(), input);
    }

    #[test]
    fn test_correct_takes_excess_from_largest_holders() {
        let corrected = correct(&portions(&[34, 34, 34])).unwrap();
        assert_eq!(values(&corrected), vec![33, 33, 34]);

        let corrected = correct(&portions(&[10, 60, 35])).unwrap();
        // 5 over: one point each from 60, 35, 10 then 60, 35
        assert_eq!(values(&corrected), vec![9, 58, 33]);
    }

    #[test]
    fn test_correct_gives_shortfall_to_largest_holders() {
        let corrected = correct(&portions(&[33, 33, 33])).unwrap();
        assert_eq!(values(&corrected), vec![34, 33, 33]);

        let corrected = correct(&portions(&[50, 20])).unwrap();
        // 30 short across two holders
        assert_eq!(values(&corrected), vec![65, 35]);
    }

    #[test]
    fn test_correct_drops_zero_portions() {
        let corrected = correct(&portions(&[0, 60, 40, 0])).unwrap();
        assert_eq!(corrected.len(), 2);
        assert_eq!(corrected[0].asset_id, "asset-1");
    }

    #[test]
    fn test_correct_never_reduces_below_one() {
        let corrected = correct(&portions(&[1, 1, 1, 100])).unwrap();
        assert_eq!(values(&corrected), vec![1, 1, 1, 97]);
    }

    #[test]
    fn test_correct_rejects_unreachable_totals() {
        assert_eq!(correct(&[]), Err(EngineError::EmptyBasket));
        assert_eq!(correct(&portions(&[0, 0])), Err(EngineError::EmptyBasket));
        assert_eq!(
            correct(&portions(&[1; 101])),
            Err(EngineError::PortionSum { sum: 101 })
        );
    }

    #[test]
    fn test_correct_random_inputs_sum_to_100_and_idempotent() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let count = rng.random_range(1..30);
            let input: Vec<u32> = (0..count).map(|_| rng.random_range(0..60)).collect();
            let input = portions(&input);
            if input.iter().all(|p| p.portion == 0) {
                continue;
            }

            let once = correct(&input).unwrap();
            assert_eq!(once.iter().map(|p| p.portion).sum::<u32>(), 100);
            assert!(once.iter().all(|p| p.portion > 0));
            assert_eq!(correct(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_assert_portions() {
        assert!(assert_portions(&portions(&[50, 50])).is_ok());
        assert_eq!(
            assert_portions(&portions(&[50, 49])),
            Err(EngineError::PortionSum { sum: 99 })
        );
        assert_eq!(assert_portions(&[]), Err(EngineError::EmptyBasket));

        let duplicated = vec![Portion::new("a", 50), Portion::new("a", 50)];
        assert!(matches!(assert_portions(&duplicated), Err(EngineError::Validation(_))));
    }
}
