//! Mandatory Access Control: system-enforced comparison of subject
//! clearance against resource classification on the shared 1-3 scale.
//!
//! Deterministic and context-free. No role is special-cased; an
//! administrator with clearance 1 is denied a Confidential resource
//! like anyone else. Only changing the label or the clearance changes
//! the outcome, and both mutations are administrator operations outside
//! this evaluator.

use crate::types::{AccessDecision, PolicyOptions, RequestContext, Resource, Subject};

pub fn evaluate(
    subject: &Subject,
    resource: &Resource,
    _context: &RequestContext,
    _options: &PolicyOptions,
) -> AccessDecision {
    let clearance = subject.clearance;
    let classification = resource.classification;

    if clearance >= classification {
        AccessDecision::allow(format!(
            "MAC: Subject clearance level ({}) sufficient for resource classification ({}). System-enforced policy.",
            clearance.level(),
            classification.level()
        ))
    } else {
        AccessDecision::deny(format!(
            "MAC: Subject clearance level ({}) insufficient for resource classification ({}). System-enforced denial.",
            clearance.level(),
            classification.level()
        ))
    }
}
