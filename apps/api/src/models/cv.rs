use serde::{Deserialize, Serialize};

/// Structured résumé extraction result. Produced once by the résumé parser
/// and treated as immutable input for the lifetime of a session.
///
/// Every field defaults so that partial LLM extractions still deserialize;
/// downstream consumers degrade missing values to neutral text instead of
/// erroring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

impl CandidateProfile {
    /// Candidate name with a neutral default for anonymous uploads.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Candidate"
        } else {
            &self.name
        }
    }

    /// Flat comma-separated skill list for prompt interpolation.
    pub fn skills_summary(&self) -> String {
        if self.skills.is_empty() {
            "not specified".to_string()
        } else {
            self.skills.join(", ")
        }
    }

    /// True when there is any usable signal at all in the profile.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.skills.is_empty()
            && self.experience.is_empty()
            && self.projects.is_empty()
            && self.education.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_degrades_to_candidate() {
        let profile = CandidateProfile::default();
        assert_eq!(profile.display_name(), "Candidate");

        let profile = CandidateProfile {
            name: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(profile.display_name(), "Candidate");
    }

    #[test]
    fn test_skills_summary_joins_with_commas() {
        let profile = CandidateProfile {
            skills: vec!["Go".to_string(), "SQL".to_string()],
            ..Default::default()
        };
        assert_eq!(profile.skills_summary(), "Go, SQL");
        assert_eq!(CandidateProfile::default().skills_summary(), "not specified");
    }

    #[test]
    fn test_partial_llm_output_still_deserializes() {
        // Extractors routinely omit sections; missing fields must default.
        let json = r#"{"name": "Ana", "skills": ["Go", "SQL"]}"#;
        let profile: CandidateProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "Ana");
        assert_eq!(profile.skills.len(), 2);
        assert!(profile.education.is_empty());
        assert!(profile.email.is_none());
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_is_empty_requires_no_signal_anywhere() {
        assert!(CandidateProfile::default().is_empty());
        let profile = CandidateProfile {
            experience: vec![Experience {
                title: "Engineer".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(!profile.is_empty());
    }
}
