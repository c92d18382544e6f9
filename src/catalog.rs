// Prompt patterns for the business idea catalog.

use std::fmt;

// Named value slots a template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Industry,
    BusinessIdea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Text(&'static str),
    Slot(Placeholder),
}

// Values substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub industry: String,
    pub idea: String,
}

impl Subject {
    pub fn new(industry: impl Into<String>, idea: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            idea: idea.into(),
        }
    }

    fn value(&self, slot: Placeholder) -> &str {
        match slot {
            Placeholder::Industry => &self.industry,
            Placeholder::BusinessIdea => &self.idea,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    segments: &'static [Segment],
}

impl Template {
    pub const fn new(segments: &'static [Segment]) -> Self {
        Self { segments }
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Slot(p) => Some(*p),
            Segment::Text(_) => None,
        })
    }

    pub fn render(&self, subject: &Subject) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => *text,
                Segment::Slot(slot) => subject.value(*slot),
            })
            .collect()
    }
}

use Placeholder::{BusinessIdea, Industry};
use Segment::{Slot, Text};

// Topics of a business idea generation session, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ProblemIdentification,
    MarketAnalysis,
    CustomerPersona,
    SolutionBrainstorming,
    ValueProposition,
    RevenueModel,
    CompetitiveAnalysis,
    MarketingStrategy,
    ResourceRequirements,
    ScalabilityAssessment,
}

impl Topic {
    pub const ALL: [Topic; 10] = [
        Topic::ProblemIdentification,
        Topic::MarketAnalysis,
        Topic::CustomerPersona,
        Topic::SolutionBrainstorming,
        Topic::ValueProposition,
        Topic::RevenueModel,
        Topic::CompetitiveAnalysis,
        Topic::MarketingStrategy,
        Topic::ResourceRequirements,
        Topic::ScalabilityAssessment,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Topic::ProblemIdentification => "Problem Identification",
            Topic::MarketAnalysis => "Market Analysis",
            Topic::CustomerPersona => "Customer Persona",
            Topic::SolutionBrainstorming => "Solution Brainstorming",
            Topic::ValueProposition => "Value Proposition",
            Topic::RevenueModel => "Revenue Model",
            Topic::CompetitiveAnalysis => "Competitive Analysis",
            Topic::MarketingStrategy => "Marketing Strategy",
            Topic::ResourceRequirements => "Resource Requirements",
            Topic::ScalabilityAssessment => "Scalability Assessment",
        }
    }

    pub fn template(self) -> Template {
        let segments: &'static [Segment] = match self {
            Topic::ProblemIdentification => &[
                Text("Identify 5 significant problems or pain points in the "),
                Slot(Industry),
                Text(" industry that could be addressed by innovative solutions."),
            ],
            Topic::MarketAnalysis => &[
                Text("Analyze the current market trends and opportunities in the "),
                Slot(Industry),
                Text(" sector. What are the emerging needs and gaps that new businesses could address?"),
            ],
            Topic::CustomerPersona => &[
                Text("Create a detailed customer persona for a potential user of products/services in the "),
                Slot(Industry),
                Text(" industry. Include demographics, behaviors, needs, and pain points."),
            ],
            Topic::SolutionBrainstorming => &[
                Text("Based on the identified problem in "),
                Slot(Industry),
                Text(", generate 5 innovative business ideas that could effectively address this issue. Provide a brief description for each idea."),
            ],
            Topic::ValueProposition => &[
                Text("For the business idea of "),
                Slot(BusinessIdea),
                Text(", craft a compelling value proposition that clearly communicates its unique benefits and differentiators."),
            ],
            Topic::RevenueModel => &[
                Text("Propose 3 potential revenue models for the "),
                Slot(BusinessIdea),
                Text(". Explain how each model would work and its potential advantages."),
            ],
            Topic::CompetitiveAnalysis => &[
                Text("Identify and analyze 3 potential competitors for "),
                Slot(BusinessIdea),
                Text(". What are their strengths and weaknesses, and how could the new business differentiate itself?"),
            ],
            Topic::MarketingStrategy => &[
                Text("Suggest an initial marketing strategy for "),
                Slot(BusinessIdea),
                Text(". Include target audience, key messaging, and potential marketing channels."),
            ],
            Topic::ResourceRequirements => &[
                Text("List the key resources (human, financial, technological) that would be required to launch and operate "),
                Slot(BusinessIdea),
                Text(" successfully."),
            ],
            Topic::ScalabilityAssessment => &[
                Text("Evaluate the scalability potential of "),
                Slot(BusinessIdea),
                Text(". What factors would facilitate or hinder its growth, and how could it expand into new markets or segments?"),
            ],
        };
        Template::new(segments)
    }

    pub fn prompt(self, subject: &Subject) -> String {
        self.template().render(subject)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
