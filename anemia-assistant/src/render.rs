use anemia_core::{DecisionCategory, DecisionResult, DecisionStatus, Severity, Stage};
use std::fmt::Write;

use crate::session::StepOutcome;

fn severity_tag(severity: Option<Severity>) -> &'static str {
    match severity {
        Some(Severity::Urgent) => "[URGENT] ",
        Some(Severity::Treatment) => "[TREATMENT] ",
        Some(Severity::Info) => "[INFO] ",
        None => "",
    }
}

fn status_label(decision: &DecisionResult) -> &'static str {
    match (decision.category, decision.status) {
        (DecisionCategory::InsufficientData, _) => "waiting for data",
        (_, DecisionStatus::Continue) => "continue",
        (_, DecisionStatus::Stop) => "stop",
        (_, DecisionStatus::ActionRequired) => "action required",
    }
}

/// Plain-text block for one stage's recommendation
pub fn render_decision(stage: Stage, decision: &DecisionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} ({}) ==",
        stage.title(),
        status_label(decision)
    );
    let _ = writeln!(out, "{}{}", severity_tag(decision.severity), decision.title);
    if !decision.message.is_empty() {
        let _ = writeln!(out, "{}", decision.message);
    }
    for line in &decision.details {
        let _ = writeln!(out, "  - {line}");
    }
    out
}

pub fn render_step(step: &StepOutcome) -> String {
    let mut out = render_decision(step.stage, &step.decision);
    if let Some(next) = step.advanced_to {
        let _ = writeln!(out, "-> next stage: {}", next.title());
    }
    out
}
