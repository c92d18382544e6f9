use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::{Runner, lines, write_report};
use crate::error::{CacheError, ReportError};

const QUERY_CRITERIA: &str = "\
Use the following criteria to define the queries of a multi-agent architecture:
1. Relevance to the system's purpose and goals.
2. Specificity, so that agents can give targeted responses.
3. Scope of the information or actions requested.
4. Which agent roles should handle the query.
5. Time constraints and priority.
6. Computational or data resources needed.
7. Whether several agents must coordinate to answer.
8. Privacy and security requirements.
9. Context the agents need to interpret the query.
10. Expected output format and how partial or failed answers are handled.";

const AGENT_CRITERIA: &str = "\
Use the following criteria to define the agents in a multi-agent architecture:
1. Autonomy: operate and decide without constant intervention.
2. Reactivity: perceive and respond to changes in a timely manner.
3. Proactivity: goal-directed behaviour, taking initiative.
4. Social ability: communicate with other agents and humans.
5. Learning and problem solving within the agent's domain.
6. Specialization: a clearly defined role and area of expertise.
7. Communication protocol and information sharing.
8. Adaptability and scalability of the agent set.
9. Interoperability with external systems.
10. Goal alignment with the overall system objectives.";

const PLAN_CRITERIA: &str = "\
List the 3 plans first, one per line, then the 3 skills, one per line.
Consider domain expertise, task decomposition and interdependencies, planning approach
(decomposition, multi-plan selection, reflection, memory), communication with other agents,
tools the agent can use, performance metrics, learning mechanisms and fail-safe behaviour.";

const ORCHESTRATION_CRITERIA: &str = "\
Use the following criteria to define the orchestration process:
- Task analysis: break complex requests into subtasks and the expertise each needs.
- Agent matching: assign subtasks by capability and current workload.
- Standardized communication protocols and feedback loops.
- Modular design and dynamic resource allocation.
- Global and agent-specific context management.
- Intelligent routing and conflict resolution over shared resources.
- Secure communication and efficient data handling.
- Monitoring of completion rates, resource use and response times.";

pub fn queries_prompt(idea: &str) -> String {
    format!(
        "Based on the SaaS idea '{idea}', what are 10 common user queries that the system would need to handle?\n{QUERY_CRITERIA}"
    )
}

pub fn agents_prompt(idea: &str) -> String {
    format!(
        "Based on the SaaS idea '{idea}', what are 5 agents that could be used to build a multi-agent architecture?\n{AGENT_CRITERIA}"
    )
}

pub fn plans_prompt(agent: &str) -> String {
    format!("For the agent '{agent}', what are its 3 main plans and 3 core skills?\n{PLAN_CRITERIA}")
}

pub fn orchestration_prompt(idea: &str) -> String {
    format!(
        "Based on the SaaS idea '{idea}' and the agents you generated, describe the orchestration process for handling user queries.\n{ORCHESTRATION_CRITERIA}"
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlansAndSkills {
    pub plans: Vec<String>,
    pub skills: Vec<String>,
}

impl PlansAndSkills {
    // First three lines are plans, the next three skills
    pub fn parse(text: &str) -> Self {
        let lines = lines(text);
        Self {
            plans: lines.iter().take(3).cloned().collect(),
            skills: lines.iter().skip(3).take(3).cloned().collect(),
        }
    }
}

#[derive(Debug)]
pub struct AgentProfile {
    pub agent: String,
    pub outcome: Result<PlansAndSkills, CacheError>,
}

#[derive(Debug)]
pub struct Architecture {
    pub queries: Vec<String>,
    pub agents: Vec<String>,
    pub profiles: Vec<AgentProfile>,
    pub orchestration: Vec<String>,
}

// Asks for queries, agents, each agent's plans and skills, and the
// orchestration. A failed section aborts the design; a failed agent
// profile is kept as a failure.
pub async fn design(runner: &Runner<'_>, idea: &str) -> Result<Architecture, CacheError> {
    info!(idea = %idea, "generating multi-agent architecture");
    let queries = lines(&runner.ask(&queries_prompt(idea)).await?);
    let agents = lines(&runner.ask(&agents_prompt(idea)).await?);

    let mut profiles = Vec::with_capacity(agents.len());
    for agent in &agents {
        let outcome = runner
            .ask(&plans_prompt(agent))
            .await
            .map(|text| PlansAndSkills::parse(&text));
        if let Err(e) = &outcome {
            error!(agent = %agent, error = %e, "failed to get plans and skills");
        }
        profiles.push(AgentProfile {
            agent: agent.clone(),
            outcome,
        });
    }

    let orchestration = lines(&runner.ask(&orchestration_prompt(idea)).await?);

    Ok(Architecture {
        queries,
        agents,
        profiles,
        orchestration,
    })
}

// Marp slide deck for the architecture.
pub fn render(idea: &str, arch: &Architecture) -> String {
    let mut md = format!(
        "---\nmarp: true\ntheme: gaia\n---\n\n# Multi-Agent Architecture for {}\n\n---\n\n## Queries to Handle\n\n",
        idea
    );
    for query in &arch.queries {
        md.push_str(&format!("{}\n", query));
    }

    md.push_str("\n---\n\n## Agents Needed\n\n");
    for agent in &arch.agents {
        md.push_str(&format!("{}\n", agent));
    }

    md.push_str("\n---\n\n## Plans and Skills\n\n");
    for profile in &arch.profiles {
        md.push_str(&format!("{}\n", profile.agent));
        match &profile.outcome {
            Ok(data) => {
                md.push_str("**Plans:**\n");
                for plan in &data.plans {
                    md.push_str(&format!(" {}\n", plan));
                }
                md.push_str("**Skills:**\n");
                for skill in &data.skills {
                    md.push_str(&format!(" {}\n", skill));
                }
            }
            Err(_) => md.push_str(&format!(" {}\n", super::ideas::ERROR_PLACEHOLDER)),
        }
    }

    md.push_str("\n---\n\n## Orchestration Operation\n\n");
    for step in &arch.orchestration {
        md.push_str(&format!("{}\n", step));
    }
    md
}

// Designs the architecture for `idea` and writes
// `<output>/ma_architecture_<timestamp>.md`.
pub async fn generate(runner: &Runner<'_>, idea: &str, output: &Path) -> Result<PathBuf, ReportError> {
    let arch = design(runner, idea).await?;
    let content = render(idea, &arch);
    let file_name = format!("ma_architecture_{}.md", Local::now().format("%Y%m%d%H%M%S"));
    write_report(output, &file_name, &content)
}
