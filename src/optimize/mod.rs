// Purchase optimization: allocation, substitution, bulk discounts
use futures::future::join_all;
use std::collections::BTreeMap;

use crate::config::ANALYSIS;
use crate::data::{guarded, DiscountSchedule, MaterialRepository};
use crate::domain::{Material, MaterialCategory};
use crate::errors::Result;
use crate::models::{BulkDiscount, OptimizationResult, Substitution};

/// Compute the full purchase recommendation for a requirement map.
///
/// Requirement ids that do not resolve to a known material are logged and
/// skipped; the result always covers the resolvable remainder. Material
/// resolution and the per-material substitution search fan out
/// concurrently and join before the savings totals are computed.
pub async fn optimize_purchase(
    requirements: &BTreeMap<String, f64>,
    materials: &dyn MaterialRepository,
    discounts: &dyn DiscountSchedule,
) -> Result<OptimizationResult> {
    // Resolve every requirement to a Material, concurrently
    let resolutions = join_all(requirements.iter().map(|(id, quantity)| async move {
        match guarded(id, || materials.material(id)).await {
            Ok(material) => Some((material, *quantity)),
            Err(e) => {
                log::warn!("skipping requirement {id}: {e}");
                None
            }
        }
    }))
    .await;
    let resolved: Vec<(Material, f64)> = resolutions.into_iter().flatten().collect();

    let recommended_quantities = allocate_quantities(&resolved);

    // Substitution search fans out one same-category lookup per material
    let searches = join_all(resolved.iter().map(|(material, quantity)| async move {
        match guarded(&material.id, || materials.materials_in_category(material.category)).await
        {
            Ok(alternatives) => find_substitutions(material, *quantity, &alternatives),
            Err(e) => {
                log::warn!("substitution search for {} skipped: {}", material.id, e);
                Vec::new()
            }
        }
    }))
    .await;
    let substitution_suggestions: Vec<Substitution> = searches.into_iter().flatten().collect();

    let bulk_discount_opportunities = find_bulk_discounts(&resolved, discounts).await;

    let expected_savings = total_savings(
        &recommended_quantities,
        &substitution_suggestions,
        &bulk_discount_opportunities,
    );

    Ok(OptimizationResult {
        recommended_quantities,
        expected_savings,
        substitution_suggestions,
        bulk_discount_opportunities,
    })
}

/// Quantity allocation as a linear program: minimize sum(price_i * qty_i)
/// subject to qty_i >= required_i. The constraints are independent lower
/// bounds and prices are non-negative, so the cost-minimal feasible point
/// is exactly the requirement vector; no tableau needed.
pub fn allocate_quantities(resolved: &[(Material, f64)]) -> BTreeMap<String, f64> {
    resolved
        .iter()
        .map(|(material, required)| (material.id.clone(), *required))
        .collect()
}

/// Cheaper same-category alternatives at the required quantity, kept when
/// the fractional saving clears the configured threshold. Alternatives are
/// reported in discovery order.
pub fn find_substitutions(
    original: &Material,
    quantity: f64,
    alternatives: &[Material],
) -> Vec<Substitution> {
    let original_cost = original.price_per_unit * quantity;
    if original_cost <= 0.0 {
        return Vec::new();
    }

    alternatives
        .iter()
        .filter(|alt| alt.id != original.id && alt.price_per_unit < original.price_per_unit)
        .filter_map(|alt| {
            let substitute_cost = alt.price_per_unit * quantity;
            let savings = ((original_cost - substitute_cost) / original_cost).max(0.0);
            if savings > ANALYSIS.optimizer.min_substitution_savings {
                Some(Substitution {
                    original: original.id.clone(),
                    substitute: alt.id.clone(),
                    savings_percent: savings * 100.0,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Group requirements by category, sum quantities, and report the best
/// discount tier each group qualifies for.
async fn find_bulk_discounts(
    resolved: &[(Material, f64)],
    discounts: &dyn DiscountSchedule,
) -> Vec<BulkDiscount> {
    let mut groups: BTreeMap<MaterialCategory, (Vec<String>, f64)> = BTreeMap::new();
    for (material, quantity) in resolved {
        let entry = groups.entry(material.category).or_default();
        entry.0.push(material.id.clone());
        entry.1 += quantity;
    }

    let mut opportunities = Vec::new();
    for (category, (materials, total_quantity)) in groups {
        let tiers = match guarded(&category.to_string(), || {
            discounts.volume_discounts(category, total_quantity)
        })
        .await
        {
            Ok(tiers) => tiers,
            Err(e) => {
                log::warn!("discount lookup for {category} skipped: {e}");
                continue;
            }
        };

        let best = tiers
            .iter()
            .filter(|t| total_quantity >= t.minimum_volume)
            .max_by(|a, b| {
                a.discount_percent
                    .partial_cmp(&b.discount_percent)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        if let Some(tier) = best {
            opportunities.push(BulkDiscount {
                materials,
                quantity: total_quantity,
                discount_percent: tier.discount_percent,
            });
        }
    }

    opportunities
}

/// Substitution savings weighted by each original's required quantity, plus
/// bulk savings for every group whose quantity still meets its deal's
/// threshold.
pub fn total_savings(
    quantities: &BTreeMap<String, f64>,
    substitutions: &[Substitution],
    deals: &[BulkDiscount],
) -> f64 {
    let substitution_savings: f64 = substitutions
        .iter()
        .map(|s| {
            quantities.get(&s.original).copied().unwrap_or(0.0) * s.savings_percent / 100.0
        })
        .sum();

    let bulk_savings: f64 = deals
        .iter()
        .map(|deal| {
            let group_quantity: f64 = deal
                .materials
                .iter()
                .map(|id| quantities.get(id).copied().unwrap_or(0.0))
                .sum();
            if group_quantity >= deal.quantity {
                group_quantity * deal.discount_percent / 100.0
            } else {
                0.0
            }
        })
        .sum();

    substitution_savings + bulk_savings
}
