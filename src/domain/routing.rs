//! Routing strategy for inbound calls

use crate::domain::business::BusinessContext;
use serde::{Deserialize, Serialize};

/// Which leg should take an inbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Connect the caller to the AI voice agent
    Ai,
    /// Dial a human operator
    Human,
}

/// How inbound calls are routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Every call goes straight to the AI agent
    AlwaysAi,
    /// Try the business owner's line first, fall back to the AI agent
    HumanFirst,
}

impl RoutingStrategy {
    pub fn decide(&self, _context: &BusinessContext) -> RouteDecision {
        match self {
            RoutingStrategy::AlwaysAi => RouteDecision::Ai,
            // TODO: dial the owner's phone with a timeout and only hand the
            // call to the agent on no-answer
            RoutingStrategy::HumanFirst => RouteDecision::Ai,
        }
    }
}

impl Default for RoutingStrategy {
    fn default() -> Self {
        RoutingStrategy::AlwaysAi
    }
}
