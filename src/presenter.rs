use serde::Serialize;

use crate::db::models::{Blueprint, Opportunity, Priority, RoiEstimate, WorkflowStep};

/// Icon for the ROI badge, picked by keyword matching on the metric text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoiBadgeIcon {
    /// Time-type metrics ("hours saved").
    Clock,
    /// Decrease-type metrics ("cost reduction").
    ArrowDown,
    /// Everything else.
    TrendingUp,
}

pub fn badge_icon(metric: &str) -> RoiBadgeIcon {
    let metric = metric.to_lowercase();
    if metric.contains("saved") {
        RoiBadgeIcon::Clock
    } else if metric.contains("reduction") {
        RoiBadgeIcon::ArrowDown
    } else {
        RoiBadgeIcon::TrendingUp
    }
}

/// One rendered opportunity card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityCard {
    pub title: String,
    pub description: String,
    pub roi_estimate: RoiEstimate,
    pub roi_badge: RoiBadgeIcon,
    /// "{value} {metric} / {timeframe}"
    pub roi_label: String,
    pub workflow_steps: Vec<WorkflowStep>,
    pub priority: Priority,
}

impl From<&Opportunity> for OpportunityCard {
    fn from(opp: &Opportunity) -> Self {
        let roi = &opp.roi_estimate;
        Self {
            title: opp.title.clone(),
            description: opp.description.clone(),
            roi_badge: badge_icon(&roi.metric),
            roi_label: format!("{} {} / {}", roi.value, roi.metric, roi.timeframe),
            roi_estimate: roi.clone(),
            workflow_steps: opp.workflow_steps.clone(),
            priority: opp.priority,
        }
    }
}

/// Read-side view of a blueprint's dashboard. Card order is the generator's
/// order, which is display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub blueprint_id: String,
    pub initiative: String,
    pub opportunities: Vec<OpportunityCard>,
    /// Set when generation has not completed for this blueprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

pub fn dashboard_view(blueprint: &Blueprint) -> DashboardView {
    let cards: Vec<OpportunityCard> = blueprint
        .opportunities
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(OpportunityCard::from)
        .collect();

    let empty_message = cards.is_empty().then(|| {
        "No opportunities have been generated for this blueprint yet.".to_string()
    });

    DashboardView {
        blueprint_id: blueprint.id.clone(),
        initiative: blueprint.initiative.clone(),
        opportunities: cards,
        empty_message,
    }
}
