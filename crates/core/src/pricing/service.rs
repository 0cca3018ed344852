//! Effective-dated price resolution.

use chrono::NaiveDate;
use routebill_shared::types::RouteId;
use rust_decimal::Decimal;

use super::error::PricingError;
use super::types::{
    BillingPeriod, CurrentPrices, NewRoutePricing, PriceResolution, PricingOverlap, RoutePricing,
};

/// Service for route price lookup and pricing validation.
pub struct PricingService;

impl PricingService {
    /// Resolves the unit price of a route on `as_of`.
    ///
    /// Candidates are the route's rows whose interval covers `as_of`. The row
    /// with the latest `effective_from` wins; ties go to the highest pricing ID
    /// so the answer does not depend on row order. Returns `None` when the
    /// route is unpriced on that date.
    #[must_use]
    pub fn resolve_price(
        rows: &[RoutePricing],
        route_id: RouteId,
        period: BillingPeriod,
        as_of: NaiveDate,
    ) -> Option<Decimal> {
        Self::winner(rows, route_id, as_of).map(|row| row.price_for(period))
    }

    /// Like [`Self::resolve_price`], but also reports the winning row and any
    /// other rows that cover the same date.
    #[must_use]
    pub fn resolve(
        rows: &[RoutePricing],
        route_id: RouteId,
        period: BillingPeriod,
        as_of: NaiveDate,
    ) -> Option<PriceResolution> {
        let winner = Self::winner(rows, route_id, as_of)?;

        let mut conflicts: Vec<_> = Self::candidates(rows, route_id, as_of)
            .filter(|row| row.id != winner.id)
            .map(|row| row.id)
            .collect();
        conflicts.sort_unstable();
        conflicts.dedup();

        Some(PriceResolution {
            pricing_id: winner.id,
            effective_from: winner.effective_from,
            price: winner.price_for(period),
            conflicts,
        })
    }

    /// Weekly and monthly prices of a route on `as_of`.
    #[must_use]
    pub fn current_prices(
        rows: &[RoutePricing],
        route_id: RouteId,
        as_of: NaiveDate,
    ) -> CurrentPrices {
        let winner = Self::winner(rows, route_id, as_of);
        CurrentPrices {
            weekly: winner.map(|row| row.weekly_price),
            monthly: winner.map(|row| row.monthly_price),
        }
    }

    /// Lists every pair of a route's pricing rows whose intervals overlap.
    ///
    /// Pairs are ordered by `effective_from`, then by ID.
    #[must_use]
    pub fn find_overlaps(rows: &[RoutePricing], route_id: RouteId) -> Vec<PricingOverlap> {
        let mut route_rows: Vec<&RoutePricing> =
            rows.iter().filter(|row| row.route_id == route_id).collect();
        route_rows.sort_by_key(|row| (row.effective_from, row.id));

        let mut overlaps = Vec::new();
        for (i, first) in route_rows.iter().enumerate() {
            for second in &route_rows[i + 1..] {
                if first.overlaps(second) {
                    overlaps.push(PricingOverlap {
                        first: first.id,
                        second: second.id,
                    });
                }
            }
        }
        overlaps
    }

    /// Validates a new pricing row before it is written.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::EffectiveToBeforeFrom` if the interval is inverted.
    /// Returns `PricingError::NegativePrice` if either price is negative.
    pub fn validate_pricing(input: &NewRoutePricing) -> Result<(), PricingError> {
        if input
            .effective_to
            .is_some_and(|to| to < input.effective_from)
        {
            return Err(PricingError::EffectiveToBeforeFrom);
        }

        if input.weekly_price < Decimal::ZERO || input.monthly_price < Decimal::ZERO {
            return Err(PricingError::NegativePrice);
        }

        Ok(())
    }

    fn candidates(
        rows: &[RoutePricing],
        route_id: RouteId,
        as_of: NaiveDate,
    ) -> impl Iterator<Item = &RoutePricing> {
        rows.iter()
            .filter(move |row| row.route_id == route_id && row.covers(as_of))
    }

    fn winner(rows: &[RoutePricing], route_id: RouteId, as_of: NaiveDate) -> Option<&RoutePricing> {
        Self::candidates(rows, route_id, as_of).max_by_key(|row| (row.effective_from, row.id))
    }
}
