//! Deal pipeline aggregation.
//!
//! # Responsibility
//! - Partition deal collections by stage and sum stage values on demand.
//! - Build the board projection shown by the presentation layer.
//!
//! # Invariants
//! - Every deal lands in exactly one stage group, so the per-stage sums add
//!   up to the total value of the collection.
//! - Grouping preserves the input order within each stage.
//! - Nothing here touches storage or holds state between calls.

use crate::model::activity::Activity;
use crate::model::deal::{Deal, DealId, DealStage};
use serde::Serialize;

/// Sum of `value` over deals currently in `stage`.
pub fn total_value_by_stage(deals: &[Deal], stage: DealStage) -> f64 {
    deals
        .iter()
        .filter(|deal| deal.stage == stage)
        .map(|deal| deal.value)
        .sum()
}

/// Deals partitioned into the four stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DealsByStage {
    pub lead: Vec<Deal>,
    pub proposal: Vec<Deal>,
    pub negotiation: Vec<Deal>,
    pub closed: Vec<Deal>,
}

impl DealsByStage {
    pub fn stage(&self, stage: DealStage) -> &[Deal] {
        match stage {
            DealStage::Lead => &self.lead,
            DealStage::Proposal => &self.proposal,
            DealStage::Negotiation => &self.negotiation,
            DealStage::Closed => &self.closed,
        }
    }

    fn stage_mut(&mut self, stage: DealStage) -> &mut Vec<Deal> {
        match stage {
            DealStage::Lead => &mut self.lead,
            DealStage::Proposal => &mut self.proposal,
            DealStage::Negotiation => &mut self.negotiation,
            DealStage::Closed => &mut self.closed,
        }
    }

    pub fn len(&self) -> usize {
        DealStage::ALL
            .iter()
            .map(|stage| self.stage(*stage).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups deals by stage, keeping input order inside each group.
pub fn deals_by_stage(deals: &[Deal]) -> DealsByStage {
    let mut groups = DealsByStage::default();
    for deal in deals {
        groups.stage_mut(deal.stage).push(deal.clone());
    }
    groups
}

/// Keeps deals whose title contains `term`, ignoring case.
///
/// A blank term keeps every deal.
pub fn filter_deals_by_title(deals: &[Deal], term: &str) -> Vec<Deal> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return deals.to_vec();
    }
    deals
        .iter()
        .filter(|deal| deal.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Activities logged against one deal, in input order.
pub fn activities_for_deal(activities: &[Activity], deal_id: DealId) -> Vec<Activity> {
    activities
        .iter()
        .filter(|activity| activity.deal_id == Some(deal_id))
        .cloned()
        .collect()
}

/// One board column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageColumn {
    pub stage: DealStage,
    pub title: &'static str,
    pub deal_count: usize,
    pub total_value: f64,
    pub deals: Vec<Deal>,
}

/// Pipeline board: one column per stage in `DealStage::ALL` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineBoard {
    pub columns: Vec<StageColumn>,
    pub total_value: f64,
}

impl PipelineBoard {
    /// Filters `deals` by title term, then partitions the result.
    pub fn build(deals: &[Deal], term: &str) -> Self {
        let filtered = filter_deals_by_title(deals, term);
        let total_value = filtered.iter().map(|deal| deal.value).sum();
        let mut groups = deals_by_stage(&filtered);
        let columns = DealStage::ALL
            .iter()
            .map(|stage| {
                let deals = std::mem::take(groups.stage_mut(*stage));
                StageColumn {
                    stage: *stage,
                    title: stage.display_name(),
                    deal_count: deals.len(),
                    total_value: deals.iter().map(|deal| deal.value).sum(),
                    deals,
                }
            })
            .collect();
        Self {
            columns,
            total_value,
        }
    }

    pub fn column(&self, stage: DealStage) -> Option<&StageColumn> {
        self.columns.iter().find(|column| column.stage == stage)
    }
}
