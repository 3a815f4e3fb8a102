//! Static persona roster.

use super::{PersonaProfile, PromptTemplate};
use crate::domain::estimation::{EstimationScale, EstimationUnit};

struct TeamMember {
    key: &'static str,
    name: &'static str,
    role_title: &'static str,
    experience_years: f32,
    considerations: &'static [&'static str],
    days_only: bool,
}

const TEAM: &[TeamMember] = &[
    TeamMember {
        key: "senior_dev_lead",
        name: "Sarah Chen",
        role_title: "Senior Developer Lead",
        experience_years: 12.0,
        considerations: &[
            "Technical complexity and architecture implications",
            "Team coordination and code review time",
            "Integration points and dependencies",
            "Security considerations",
        ],
        days_only: false,
    },
    TeamMember {
        key: "senior_dev",
        name: "Alex Thompson",
        role_title: "Senior Developer",
        experience_years: 8.0,
        considerations: &[
            "Implementation complexity",
            "Required architectural changes",
            "Performance implications",
            "Testing support needed",
        ],
        days_only: false,
    },
    TeamMember {
        key: "mid_dev",
        name: "Emily Parker",
        role_title: "Mid-level Developer",
        experience_years: 4.0,
        considerations: &[
            "Code changes needed",
            "Testing and documentation updates",
            "Learning curve for new technologies",
        ],
        days_only: false,
    },
    TeamMember {
        key: "junior_dev",
        name: "Ryan Foster",
        role_title: "Junior Developer",
        experience_years: 2.0,
        considerations: &[
            "Time needed to understand requirements",
            "Research and learning time",
            "Time for questions and guidance",
        ],
        days_only: false,
    },
    TeamMember {
        key: "grad_dev",
        name: "Zoe Williams",
        role_title: "Graduate Developer",
        experience_years: 0.5,
        considerations: &[
            "Limited experience with the codebase",
            "Pair programming needs",
            "Code review iterations",
        ],
        days_only: false,
    },
    TeamMember {
        key: "senior_qa",
        name: "Michael Rodriguez",
        role_title: "Senior QA Analyst",
        experience_years: 7.0,
        considerations: &[
            "Test case design and automation",
            "Integration and performance testing",
            "Regression testing impact",
        ],
        days_only: false,
    },
    TeamMember {
        key: "junior_qa",
        name: "Jamie Lee",
        role_title: "Junior QA Analyst",
        experience_years: 1.5,
        considerations: &[
            "Manual test case creation",
            "Functional testing coverage",
            "Support needed from senior QA",
        ],
        days_only: false,
    },
    TeamMember {
        key: "ux_designer",
        name: "Alex Chen",
        role_title: "UX Designer",
        experience_years: 10.0,
        considerations: &[
            "Wireframes, mockups and prototypes",
            "User research needs",
            "Collaboration with developers",
        ],
        days_only: true,
    },
];

/// Every persona the workflow can call on.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    agile_coach: PersonaProfile,
    senior_developer: PersonaProfile,
    day_team: Vec<PersonaProfile>,
    point_team: Vec<PersonaProfile>,
}

impl PersonaRegistry {
    /// Builds the roster, using `point_scale` for story-point estimators.
    pub fn new(point_scale: EstimationScale) -> Self {
        let day_team = TEAM
            .iter()
            .map(|member| estimator(member, EstimationUnit::PersonDays, None))
            .collect();
        let point_team = TEAM
            .iter()
            .filter(|member| !member.days_only)
            .map(|member| {
                estimator(member, EstimationUnit::StoryPoints, Some(point_scale.clone()))
            })
            .collect();

        Self {
            agile_coach: PersonaProfile::new(
                "agile_coach",
                "Agile Coach",
                "Agile Coach",
                10.0,
                PromptTemplate::AgileReview,
            ),
            senior_developer: PersonaProfile::new(
                "senior_developer",
                "Senior Developer",
                "Senior Developer",
                10.0,
                PromptTemplate::TechnicalReview,
            ),
            day_team,
            point_team,
        }
    }

    pub fn agile_coach(&self) -> &PersonaProfile {
        &self.agile_coach
    }

    pub fn senior_developer(&self) -> &PersonaProfile {
        &self.senior_developer
    }

    /// Estimators for the given unit.
    pub fn team(&self, unit: EstimationUnit) -> &[PersonaProfile] {
        match unit {
            EstimationUnit::PersonDays => &self.day_team,
            EstimationUnit::StoryPoints => &self.point_team,
        }
    }

    /// Looks a persona up by key among reviewers and every team.
    pub fn find(&self, key: &str) -> Option<&PersonaProfile> {
        [&self.agile_coach, &self.senior_developer]
            .into_iter()
            .chain(self.day_team.iter())
            .find(|p| p.key == key)
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::new(EstimationScale::fibonacci())
    }
}

fn estimator(
    member: &TeamMember,
    unit: EstimationUnit,
    scale: Option<EstimationScale>,
) -> PersonaProfile {
    PersonaProfile::new(
        member.key,
        member.name,
        member.role_title,
        member.experience_years,
        PromptTemplate::Estimate {
            unit,
            scale,
            considerations: member.considerations.iter().map(|c| c.to_string()).collect(),
        },
    )
}
