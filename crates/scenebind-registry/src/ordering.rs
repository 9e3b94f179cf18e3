//! Probe ordering.
//!
//! Recovery takes the first matching probe, so a probe for an ancestor that
//! sits before a probe for one of its descendants shadows it: the descendant's
//! objects are silently reported as the ancestor. [`OrderingPolicy`] decides
//! whether an append trusts the caller, checks the result, or restores the
//! order itself.

use std::fmt;
use std::str::FromStr;

use scenebind_core::RegistrationError;

use crate::Probe;

/// What an append does about probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderingPolicy {
    /// Keep registration order as given. Misordered probes misclassify silently.
    Unchecked,
    /// Reject an append that would leave an ancestor before a descendant.
    Verify,
    /// Move each appended probe in front of its first ancestor.
    #[default]
    Specificity,
}

impl OrderingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderingPolicy::Unchecked => "unchecked",
            OrderingPolicy::Verify => "verify",
            OrderingPolicy::Specificity => "specificity",
        }
    }

    /// Merge `incoming` after `existing` according to this policy.
    pub fn merge(
        self,
        domain: &str,
        existing: &[Probe],
        incoming: Vec<Probe>,
    ) -> Result<Vec<Probe>, RegistrationError> {
        let mut merged = existing.to_vec();
        match self {
            OrderingPolicy::Unchecked => merged.extend(incoming),
            OrderingPolicy::Verify => {
                merged.extend(incoming);
                verify(domain, &merged)?;
            }
            OrderingPolicy::Specificity => {
                for probe in incoming {
                    insert_by_specificity(&mut merged, probe);
                }
            }
        }
        Ok(merged)
    }
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unchecked" => Ok(OrderingPolicy::Unchecked),
            "verify" => Ok(OrderingPolicy::Verify),
            "specificity" => Ok(OrderingPolicy::Specificity),
            other => Err(format!("unknown ordering policy '{other}'")),
        }
    }
}

/// Check that no probe is preceded by a probe for one of its ancestors.
pub fn verify(domain: &str, probes: &[Probe]) -> Result<(), RegistrationError> {
    verify_sequence(probes.iter().map(|probe| (domain, probe)))
}

/// Like [`verify`], over probes from several domains in scan order.
///
/// A violation is reported against the descendant's domain.
pub fn verify_sequence<'a>(
    probes: impl IntoIterator<Item = (&'a str, &'a Probe)>,
) -> Result<(), RegistrationError> {
    let probes: Vec<(&str, &Probe)> = probes.into_iter().collect();
    for (i, (_, earlier)) in probes.iter().enumerate() {
        for (domain, later) in &probes[i + 1..] {
            if later.interface().is_more_specific_than(earlier.interface()) {
                return Err(RegistrationError::OrderingViolation {
                    domain: domain.to_string(),
                    ancestor: earlier.interface().name().to_string(),
                    descendant: later.interface().name().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Insert `probe` directly before the first probe it is more specific than.
///
/// If `probes` is correctly ordered, it stays correctly ordered; unrelated
/// probes keep their relative registration order.
pub fn insert_by_specificity(probes: &mut Vec<Probe>, probe: Probe) {
    let position = probes
        .iter()
        .position(|existing| probe.interface().is_more_specific_than(existing.interface()))
        .unwrap_or(probes.len());
    probes.insert(position, probe);
}
