//! Local spot-price appraisal, used whenever the external model call does
//! not produce a usable estimate.
//!
//! Prices are hand-maintained approximations of world precious-metal spot
//! prices, expressed in forint per gram.

use crate::models::appraisal::{
    AppraisalEstimate, AppraisalRequest, Confidence, Karat, Metal,
};

const GOLD_PRICE_PER_GRAM: f64 = 25_000.0; // ~24K
const WHITE_GOLD_PRICE_PER_GRAM: f64 = 24_000.0;
const SILVER_PRICE_PER_GRAM: f64 = 350.0;
const PLATINUM_PRICE_PER_GRAM: f64 = 13_000.0;
const OTHER_PRICE_PER_GRAM: f64 = 5_000.0;

/// Conservative discount applied to the point estimate for the lower bound.
const LOWER_BOUND_RATIO: f64 = 0.85;

/// Disclosure attached to every locally computed estimate.
pub const FALLBACK_NOTES: &str =
    "Alapszámítás a világpiaci árak alapján. Pontos becsléshez szakértői vizsgálat szükséges.";

/// Deterministic estimate from weight, material and karat alone.
///
/// Never fails: unknown material prices as "egyeb", unknown karat leaves
/// the base price unmodified, and negative weights clamp to zero so both
/// amounts stay non-negative.
pub fn fallback_estimate(request: &AppraisalRequest) -> AppraisalEstimate {
    let raw_value = request.weight_grams.max(0.0)
        * price_per_gram(request.material.as_ref(), request.karat.as_ref());

    AppraisalEstimate {
        market_value: raw_value.round() as i64,
        lower_bound: (raw_value * LOWER_BOUND_RATIO).round() as i64,
        confidence: Some(Confidence::Low),
        notes: Some(FALLBACK_NOTES.to_string()),
    }
}

fn price_per_gram(material: Option<&Metal>, karat: Option<&Karat>) -> f64 {
    let base = match material {
        Some(Metal::Gold) => GOLD_PRICE_PER_GRAM,
        Some(Metal::WhiteGold) => WHITE_GOLD_PRICE_PER_GRAM,
        Some(Metal::Silver) => SILVER_PRICE_PER_GRAM,
        Some(Metal::Platinum) => PLATINUM_PRICE_PER_GRAM,
        Some(Metal::Other) | Some(Metal::Unrecognized(_)) | None => OTHER_PRICE_PER_GRAM,
    };

    if material.is_some_and(Metal::is_gold) {
        if let Some(purity) = karat.and_then(purity_fraction) {
            return base * purity;
        }
    }

    base
}

/// Stated purity as a fraction of 24 parts. Absent for unknown karats, in
/// which case the metal's unadjusted rate applies.
fn purity_fraction(karat: &Karat) -> Option<f64> {
    match karat {
        Karat::K8 => Some(0.333),
        Karat::K9 => Some(0.375),
        Karat::K10 => Some(0.417),
        Karat::K14 => Some(0.583),
        Karat::K18 => Some(0.75),
        Karat::K21 => Some(0.875),
        Karat::K22 => Some(0.917),
        Karat::Unknown | Karat::Unrecognized(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appraisal::Hallmark;

    fn request(weight: f64, material: Option<Metal>, karat: Option<Karat>) -> AppraisalRequest {
        AppraisalRequest {
            weight: weight.to_string(),
            weight_grams: weight,
            material,
            karat,
            hallmark: Hallmark::Undetermined,
            length_mm: None,
            width_mm: None,
            thickness_mm: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn ten_grams_of_18k_gold() {
        let estimate = fallback_estimate(&request(10.0, Some(Metal::Gold), Some(Karat::K18)));
        assert_eq!(estimate.market_value, 187_500);
        assert_eq!(estimate.lower_bound, 159_375);
        assert_eq!(estimate.confidence, Some(Confidence::Low));
        assert_eq!(estimate.notes.as_deref(), Some(FALLBACK_NOTES));
    }

    #[test]
    fn five_grams_without_material_uses_the_other_bucket() {
        let estimate = fallback_estimate(&request(5.0, None, None));
        assert_eq!(estimate.market_value, 25_000);
        assert_eq!(estimate.lower_bound, 21_250);
    }

    #[test]
    fn unrecognized_material_prices_the_same_as_other() {
        let unrecognized = fallback_estimate(&request(
            7.0,
            Some(Metal::Unrecognized("titán".into())),
            None,
        ));
        let other = fallback_estimate(&request(7.0, Some(Metal::Other), None));
        assert_eq!(unrecognized.market_value, other.market_value);
        assert_eq!(unrecognized.lower_bound, other.lower_bound);
    }

    #[test]
    fn higher_karat_strictly_increases_the_estimate() {
        let k10 = fallback_estimate(&request(10.0, Some(Metal::Gold), Some(Karat::K10)));
        let k14 = fallback_estimate(&request(10.0, Some(Metal::Gold), Some(Karat::K14)));
        let k18 = fallback_estimate(&request(10.0, Some(Metal::Gold), Some(Karat::K18)));
        assert!(k10.market_value < k14.market_value);
        assert!(k14.market_value < k18.market_value);
    }

    #[test]
    fn unknown_karat_leaves_the_gold_rate_unadjusted() {
        let estimate = fallback_estimate(&request(2.0, Some(Metal::Gold), Some(Karat::Unknown)));
        assert_eq!(estimate.market_value, 50_000);
    }

    #[test]
    fn karat_is_ignored_for_non_gold_metals() {
        let estimate = fallback_estimate(&request(5.0, Some(Metal::Silver), Some(Karat::K18)));
        assert_eq!(estimate.market_value, 1_750);
    }

    #[test]
    fn white_gold_applies_its_own_base_rate() {
        let estimate = fallback_estimate(&request(4.0, Some(Metal::WhiteGold), Some(Karat::K14)));
        assert_eq!(estimate.market_value, (4.0 * 24_000.0 * 0.583_f64).round() as i64);
    }

    #[test]
    fn rounding_happens_on_both_amounts_independently() {
        // 0.5 g of silver: raw 175, lower 148.75 → 149.
        let estimate = fallback_estimate(&request(0.5, Some(Metal::Silver), None));
        assert_eq!(estimate.market_value, 175);
        assert_eq!(estimate.lower_bound, 149);
    }

    #[test]
    fn zero_and_negative_weights_produce_zero_estimates() {
        for weight in [0.0, -3.0] {
            let estimate = fallback_estimate(&request(weight, Some(Metal::Gold), None));
            assert_eq!(estimate.market_value, 0);
            assert_eq!(estimate.lower_bound, 0);
        }
    }

    #[test]
    fn estimates_are_deterministic() {
        let a = fallback_estimate(&request(3.21, Some(Metal::Platinum), None));
        let b = fallback_estimate(&request(3.21, Some(Metal::Platinum), None));
        assert_eq!(a, b);
    }

    #[test]
    fn lower_bound_never_exceeds_market_value() {
        let materials = [
            None,
            Some(Metal::Gold),
            Some(Metal::WhiteGold),
            Some(Metal::Silver),
            Some(Metal::Platinum),
            Some(Metal::Unrecognized("zománc".into())),
        ];
        let karats = [None, Some(Karat::K8), Some(Karat::K22), Some(Karat::Unknown)];

        for weight in [0.01, 0.5, 1.0, 10.0, 250.0] {
            for material in &materials {
                for karat in &karats {
                    let estimate =
                        fallback_estimate(&request(weight, material.clone(), karat.clone()));
                    assert!(estimate.lower_bound <= estimate.market_value);
                    assert!(estimate.market_value >= 0);
                }
            }
        }
    }
}
