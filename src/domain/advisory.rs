//! Static health advisories chosen from the BMI category and smoking status.

use serde::{Deserialize, Serialize};

use super::bmi::{BmiCategory, Severity};

/// What an advisory is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvisoryTopic {
    Weight,
    Smoking,
}

/// A pre-authored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub topic: AdvisoryTopic,
    pub severity: Severity,
    pub message: &'static str,
}

const UNDERWEIGHT: &str =
    "You are underweight. Consider a nutrition plan to reach a healthy weight.";
const NORMAL: &str = "Your BMI is in the normal range. Keep up the good lifestyle!";
const OVERWEIGHT: &str = "You are overweight. Consider regular exercise and a balanced diet.";
const OBESE: &str = "You are in the obese range. Medical consultation is strongly advised.";
const SMOKING: &str = "Smoking significantly increases insurance premiums and health risks. \
                       Quitting will lower future costs.";

/// Advisories for a patient: one weight message, plus a smoking message for smokers.
///
/// The three obese classes share a single message.
#[must_use]
pub fn health_advisory(category: BmiCategory, is_smoker: bool) -> Vec<Advisory> {
    let message = match category {
        BmiCategory::Underweight => UNDERWEIGHT,
        BmiCategory::Normal => NORMAL,
        BmiCategory::Overweight => OVERWEIGHT,
        BmiCategory::ObeseI | BmiCategory::ObeseII | BmiCategory::ObeseIII => OBESE,
    };

    let mut advisories = vec![Advisory {
        topic: AdvisoryTopic::Weight,
        severity: category.severity(),
        message,
    }];

    if is_smoker {
        advisories.push(Advisory {
            topic: AdvisoryTopic::Smoking,
            severity: Severity::Alert,
            message: SMOKING,
        });
    }

    advisories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_smoker_gets_single_weight_message() {
        let advisories = health_advisory(BmiCategory::Normal, false);
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].topic, AdvisoryTopic::Weight);
        assert_eq!(advisories[0].severity, Severity::Ok);
        assert!(advisories[0].message.contains("normal range"));
    }

    #[test]
    fn test_smoker_gets_smoking_message_last() {
        let advisories = health_advisory(BmiCategory::Underweight, true);
        assert_eq!(advisories.len(), 2);
        assert!(advisories[0].message.contains("underweight"));
        assert_eq!(advisories[1].topic, AdvisoryTopic::Smoking);
        assert!(advisories[1].message.starts_with("Smoking significantly"));
    }

    #[test]
    fn test_obese_classes_share_message() {
        let one = health_advisory(BmiCategory::ObeseI, false);
        let two = health_advisory(BmiCategory::ObeseII, false);
        let three = health_advisory(BmiCategory::ObeseIII, false);
        assert_eq!(one, two);
        assert_eq!(two, three);
        assert_eq!(one[0].severity, Severity::Alert);
    }

    #[test]
    fn test_advisories_are_deterministic() {
        assert_eq!(
            health_advisory(BmiCategory::Overweight, true),
            health_advisory(BmiCategory::Overweight, true)
        );
    }
}
