//! Batch evaluation of independent parameter sets.
//!
//! Every parameter set is computed on the rayon pool. A failing item is
//! reported in place and does not stop the others; output order matches
//! input order.

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::growth::compound::{compute_growth, GrowthParameters, GrowthResult};
use crate::growth::sip::{compute_sip, SipParameters, SipResult};
use crate::lending::eligibility::{compute_eligibility, EligibilityParameters, EligibilityResult};
use crate::lending::emi::{compute_emi, LoanParameters, LoanResult};
use crate::types::ComputationOutput;
use crate::FinCalcResult;

/// A scenario sweep: any mix of parameter sets for each engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub growth: Vec<GrowthParameters>,
    #[serde(default)]
    pub loans: Vec<LoanParameters>,
    #[serde(default)]
    pub eligibility: Vec<EligibilityParameters>,
    #[serde(default)]
    pub sip: Vec<SipParameters>,
}

impl BatchRequest {
    pub fn len(&self) -> usize {
        self.growth.len() + self.loans.len() + self.eligibility.len() + self.sip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem<T: Serialize> {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<ComputationOutput<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> BatchItem<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub succeeded: usize,
    pub failed: usize,
    pub growth: Vec<BatchItem<GrowthResult>>,
    pub loans: Vec<BatchItem<LoanResult>>,
    pub eligibility: Vec<BatchItem<EligibilityResult>>,
    pub sip: Vec<BatchItem<SipResult>>,
}

fn evaluate<P, T, F>(kind: &str, items: &[P], compute: F) -> Vec<BatchItem<T>>
where
    P: Sync,
    T: Serialize + Send,
    F: Fn(&P) -> FinCalcResult<ComputationOutput<T>> + Sync,
{
    items
        .par_iter()
        .enumerate()
        .map(|(index, params)| match compute(params) {
            Ok(output) => BatchItem {
                index,
                output: Some(output),
                error: None,
            },
            Err(e) => {
                warn!("{kind}[{index}] failed: {e}");
                BatchItem {
                    index,
                    output: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}

fn count_failed<T: Serialize>(items: &[BatchItem<T>]) -> usize {
    items.iter().filter(|i| !i.is_ok()).count()
}

/// Run every parameter set in the request.
pub fn run_batch(request: &BatchRequest) -> BatchOutput {
    info!("running batch of {} parameter sets", request.len());

    let growth = evaluate("growth", &request.growth, compute_growth);
    let loans = evaluate("loans", &request.loans, compute_emi);
    let eligibility = evaluate("eligibility", &request.eligibility, compute_eligibility);
    let sip = evaluate("sip", &request.sip, compute_sip);

    let failed = count_failed(&growth)
        + count_failed(&loans)
        + count_failed(&eligibility)
        + count_failed(&sip);

    BatchOutput {
        succeeded: request.len() - failed,
        failed,
        growth,
        loans,
        eligibility,
        sip,
    }
}
