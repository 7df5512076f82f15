use serde::Serialize;

use crate::error::Result;
use crate::solver;
use crate::state::SteadyState;

/// Probability vectors for case studies are shown up to this state.
pub const CASE_MAX_STATE: usize = 10;

#[derive(Clone, Copy, Debug)]
pub struct CaseStudy {
    pub name: &'static str,
    pub description: &'static str,
    pub lambda: f64,
    pub mu: f64,
    pub servers: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CaseReport {
    pub name: String,
    pub description: String,
    pub steady: SteadyState,
}

pub const CASE_STUDIES: [CaseStudy; 5] = [
    CaseStudy {
        name: "stable-mm1",
        description: "Single server, lambda 0.5/min against mu 1/min",
        lambda: 0.5,
        mu: 1.0,
        servers: 1,
    },
    CaseStudy {
        name: "loaded-mm1",
        description: "Single server near saturation, lambda 0.8/min against mu 1/min",
        lambda: 0.8,
        mu: 1.0,
        servers: 1,
    },
    CaseStudy {
        name: "efficient-mm1",
        description: "Lightly loaded single server, lambda 0.2/min against mu 2/min",
        lambda: 0.2,
        mu: 2.0,
        servers: 1,
    },
    CaseStudy {
        name: "stable-mm2",
        description: "Two servers, lambda 0.8/min against mu 0.5/min each",
        lambda: 0.8,
        mu: 0.5,
        servers: 2,
    },
    CaseStudy {
        name: "efficient-mm3",
        description: "Three servers, lambda 1.2/min against mu 0.5/min each",
        lambda: 1.2,
        mu: 0.5,
        servers: 3,
    },
];

impl CaseStudy {
    pub fn solve(&self) -> Result<CaseReport> {
        let steady = solver::solve(self.lambda, self.mu, self.servers, CASE_MAX_STATE)?;
        Ok(CaseReport {
            name: self.name.to_string(),
            description: self.description.to_string(),
            steady,
        })
    }
}

pub fn solve_all() -> Result<Vec<CaseReport>> {
    CASE_STUDIES.iter().map(CaseStudy::solve).collect()
}
