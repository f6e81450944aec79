//! Scripted user actions replayed against a simulated page.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use shared::protocol::FormSubmission;
use storefront_core::{
    memory::ElementSnapshot, Browser, Document, ElementId, EventOutcome, Simulator,
};

/// Element reference: the `index`-th match of `selector` in document order.
#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    pub selector: String,
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Click {
        #[serde(flatten)]
        target: Target,
    },
    Type {
        #[serde(flatten)]
        target: Target,
        text: String,
    },
    Change {
        #[serde(flatten)]
        target: Target,
        value: String,
    },
    Submit {
        #[serde(flatten)]
        target: Target,
    },
    Scroll {
        offset_px: f64,
    },
    Wait {
        ms: u64,
    },
    Reveal {
        #[serde(flatten)]
        target: Target,
    },
    AnswerConfirm {
        accept: bool,
    },
    FinishFileReads,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Click { .. } => "click",
            Step::Type { .. } => "type",
            Step::Change { .. } => "change",
            Step::Submit { .. } => "submit",
            Step::Scroll { .. } => "scroll",
            Step::Wait { .. } => "wait",
            Step::Reveal { .. } => "reveal",
            Step::AnswerConfirm { .. } => "answer_confirm",
            Step::FinishFileReads => "finish_file_reads",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<EventOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timers_fired: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_read: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered: Option<bool>,
}

impl StepReport {
    fn new(step: usize, action: &'static str) -> Self {
        Self {
            step,
            action,
            element: None,
            outcome: None,
            timers_fired: None,
            files_read: None,
            delivered: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Inspection {
    pub selector: String,
    pub elements: Vec<ElementSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct Transcript {
    pub steps: Vec<StepReport>,
    pub dialogs: Vec<String>,
    pub submissions: Vec<FormSubmission>,
    pub history: Vec<String>,
    pub final_url: String,
    pub inspected: Vec<Inspection>,
}

fn resolve(sim: &Simulator, target: &Target) -> Result<ElementId> {
    sim.page()
        .query_all(&target.selector)
        .get(target.index)
        .copied()
        .ok_or_else(|| {
            anyhow!(
                "no element #{} matches selector '{}'",
                target.index,
                target.selector
            )
        })
}

pub fn run_step(sim: &mut Simulator, index: usize, step: &Step) -> Result<StepReport> {
    let mut report = StepReport::new(index, step.name());
    match step {
        Step::Click { target } => {
            let element = resolve(sim, target)?;
            report.element = Some(element);
            report.outcome = Some(sim.click(element).context("click default action")?);
        }
        Step::Type { target, text } => {
            let element = resolve(sim, target)?;
            report.element = Some(element);
            report.outcome = Some(sim.type_text(element, text));
        }
        Step::Change { target, value } => {
            let element = resolve(sim, target)?;
            report.element = Some(element);
            report.outcome = Some(sim.change(element, value));
        }
        Step::Submit { target } => {
            let element = resolve(sim, target)?;
            report.element = Some(element);
            report.outcome = Some(sim.submit(element).context("form submission")?);
        }
        Step::Scroll { offset_px } => {
            report.outcome = Some(sim.scroll_to(*offset_px));
        }
        Step::Wait { ms } => {
            report.timers_fired = Some(sim.advance(Duration::from_millis(*ms)));
        }
        Step::Reveal { target } => {
            let element = resolve(sim, target)?;
            report.element = Some(element);
            report.delivered = Some(sim.reveal(element));
        }
        Step::AnswerConfirm { accept } => sim.answer_confirm(*accept),
        Step::FinishFileReads => {
            report.files_read = Some(sim.finish_file_reads());
        }
    }
    Ok(report)
}

pub fn transcript(sim: &Simulator, steps: Vec<StepReport>, inspect: &[String]) -> Transcript {
    let page = sim.page();
    let inspected = inspect
        .iter()
        .map(|selector| Inspection {
            selector: selector.clone(),
            elements: page
                .query_all(selector)
                .into_iter()
                .filter_map(|element| page.snapshot(element))
                .collect(),
        })
        .collect();

    Transcript {
        steps,
        dialogs: page.dialogs().to_vec(),
        submissions: page.submissions().to_vec(),
        history: page.history().to_vec(),
        final_url: page.href(),
        inspected,
    }
}
