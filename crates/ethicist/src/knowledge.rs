//! Static ethics knowledge base.
//!
//! Every table is a `'static` slice so lookups borrow for the life of the
//! process and ordering is the declaration order. Tables that are served
//! as resources serialize as JSON objects keyed by entry key.

use serde::ser::{Serialize, Serializer};

/// A named ethical or governance framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Framework {
    #[serde(skip)]
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub key_principles: &'static [&'static str],
}

/// One AI ethics guideline and the questions used to assess a system against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guideline {
    pub key: &'static str,
    pub title: &'static str,
    pub explanation: &'static str,
    pub questions: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiasType {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub mitigations: &'static [&'static str],
}

/// Considerations for projects whose type mentions `domain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainConsiderations {
    pub domain: &'static str,
    pub considerations: &'static [&'static str],
}

/// Explainability techniques for systems whose type mentions `family`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explainability {
    pub family: &'static str,
    pub techniques: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeholderGuidance {
    pub stakeholder: &'static str,
    pub title: &'static str,
    pub recommendation: &'static str,
}

pub static ETHICAL_FRAMEWORKS: &[Framework] = &[
    Framework {
        key: "utilitarian",
        name: "Utilitarian Ethics",
        description: "Focuses on maximizing overall happiness and well-being",
        key_principles: &[
            "Greatest good for the greatest number",
            "Consequences matter most",
            "Impartial consideration of all affected parties",
        ],
    },
    Framework {
        key: "deontological",
        name: "Deontological Ethics",
        description: "Emphasizes duties, rules, and moral obligations",
        key_principles: &[
            "Act according to universal moral laws",
            "Respect human dignity and autonomy",
            "Intentions matter more than consequences",
        ],
    },
    Framework {
        key: "virtue",
        name: "Virtue Ethics",
        description: "Focuses on character development and moral virtues",
        key_principles: &[
            "Cultivate good character traits",
            "Act as a virtuous person would",
            "Balance and moderation in all things",
        ],
    },
    Framework {
        key: "care",
        name: "Ethics of Care",
        description: "Emphasizes relationships, empathy, and contextual responses",
        key_principles: &[
            "Prioritize caring relationships",
            "Consider emotional and relational impacts",
            "Context-sensitive moral reasoning",
        ],
    },
];

/// Governance frameworks for AI systems, used as reference standards.
pub static RESPONSIBLE_AI_FRAMEWORKS: &[Framework] = &[
    Framework {
        key: "responsible_ai",
        name: "Responsible AI Principles",
        description: "Cross-industry consensus principles for building trustworthy AI systems",
        key_principles: &[
            "Fairness and non-discrimination",
            "Transparency and explainability",
            "Accountability and human oversight",
            "Privacy and data governance",
            "Robustness, safety, and security",
        ],
    },
    Framework {
        key: "nist_ai_rmf",
        name: "NIST AI Risk Management Framework",
        description: "Voluntary framework for managing risks across the AI lifecycle",
        key_principles: &[
            "Govern: cultivate a culture of risk management",
            "Map: establish context and identify risks",
            "Measure: analyze and track identified risks",
            "Manage: prioritize and act on risks",
        ],
    },
    Framework {
        key: "eu_ai_act",
        name: "EU AI Act",
        description: "Risk-based regulatory framework for AI systems placed on the EU market",
        key_principles: &[
            "Prohibit unacceptable-risk practices",
            "Impose conformity obligations on high-risk systems",
            "Require transparency for limited-risk systems such as chatbots",
            "Maintain human oversight and post-market monitoring",
        ],
    },
];

pub static AI_ETHICS_GUIDELINES: &[Guideline] = &[
    Guideline {
        key: "fairness",
        title: "Fairness",
        explanation: "Ensure AI systems treat all individuals and groups equitably without bias",
        questions: &[
            "Does the system treat all user groups equitably?",
            "Are there mechanisms to detect and mitigate bias?",
        ],
    },
    Guideline {
        key: "transparency",
        title: "Transparency",
        explanation: "Make AI decision-making processes understandable and explainable",
        questions: &[
            "Can users understand how decisions are made?",
            "Is the system's logic documented and accessible?",
        ],
    },
    Guideline {
        key: "accountability",
        title: "Accountability",
        explanation: "Establish clear responsibility for AI system outcomes",
        questions: &[
            "Who is responsible for system failures?",
            "Are there audit trails for decisions?",
        ],
    },
    Guideline {
        key: "privacy",
        title: "Privacy",
        explanation: "Protect individual data and respect privacy rights",
        questions: &[
            "How is personal data collected and protected?",
            "Are privacy-by-design principles followed?",
        ],
    },
    Guideline {
        key: "safety",
        title: "Safety",
        explanation: "Ensure AI systems are secure, reliable, and do not cause harm",
        questions: &[
            "What safeguards prevent harmful outcomes?",
            "How are edge cases and failures handled?",
        ],
    },
    Guideline {
        key: "human_autonomy",
        title: "Human Autonomy",
        explanation: "Preserve human agency and decision-making authority",
        questions: &[
            "Can people contest or override the system's decisions?",
            "Is there meaningful human oversight at critical points?",
        ],
    },
    Guideline {
        key: "beneficence",
        title: "Beneficence",
        explanation: "Design AI to benefit humanity and individual well-being",
        questions: &[
            "Who benefits from the system, and who bears its costs?",
            "Are benefits measured against the stated purpose?",
        ],
    },
    Guideline {
        key: "sustainability",
        title: "Sustainability",
        explanation: "Consider long-term environmental and social impacts",
        questions: &[
            "What is the energy and resource footprint of training and inference?",
            "What are the long-term social effects of wide deployment?",
        ],
    },
];

pub static BIAS_TYPES: &[BiasType] = &[
    BiasType {
        key: "selection",
        title: "Selection",
        description: "Occurs when the data sample is not representative of the population",
        mitigations: &[
            "Use stratified sampling to ensure representation",
            "Validate data against known population distributions",
        ],
    },
    BiasType {
        key: "confirmation",
        title: "Confirmation",
        description: "Tendency to interpret information confirming existing beliefs",
        mitigations: &[
            "Fix hypotheses and evaluation criteria before looking at results",
            "Have reviewers assess outputs blind to the expected answer",
        ],
    },
    BiasType {
        key: "algorithmic",
        title: "Algorithmic",
        description: "Systematic errors introduced by algorithm design choices",
        mitigations: &[
            "Test algorithm performance across different groups",
            "Use fairness-aware machine learning techniques",
        ],
    },
    BiasType {
        key: "representation",
        title: "Representation",
        description: "Underrepresentation or misrepresentation of certain groups",
        mitigations: &[
            "Ensure diverse data collection",
            "Include underrepresented groups in testing",
        ],
    },
    BiasType {
        key: "measurement",
        title: "Measurement",
        description: "Errors in how variables are defined and measured",
        mitigations: &[
            "Validate proxy variables against the outcomes they stand for",
            "Check that labels and instruments are equally reliable across groups",
        ],
    },
];

pub static DOMAIN_CONSIDERATIONS: &[DomainConsiderations] = &[
    DomainConsiderations {
        domain: "healthcare",
        considerations: &[
            "Patient privacy and confidentiality (HIPAA compliance)",
            "Clinical decision support transparency",
            "Doctor-patient relationship preservation",
            "Equitable access to care",
        ],
    },
    DomainConsiderations {
        domain: "finance",
        considerations: &[
            "Fair lending practices",
            "Transparent credit decisions",
            "Financial inclusion",
            "Regulatory compliance (SOX, PCI-DSS)",
        ],
    },
    DomainConsiderations {
        domain: "education",
        considerations: &[
            "Student data protection (FERPA compliance)",
            "Equal learning opportunities",
            "Educator autonomy preservation",
            "Developmental appropriateness",
        ],
    },
    DomainConsiderations {
        domain: "criminal justice",
        considerations: &[
            "Presumption of innocence",
            "Due process rights",
            "Bias prevention in risk assessment",
            "Transparency in sentencing recommendations",
        ],
    },
];

/// Advice used when no domain matches the project type.
pub static GENERIC_DOMAIN_ADVICE: &[&str] = &[
    "Identify domain-specific ethical concerns",
    "Consult with subject matter experts",
    "Review relevant industry standards",
];

pub static IMPLEMENTATION_CHECKLIST: &[&str] = &[
    "Establish ethics review board",
    "Create ethical risk assessment process",
    "Develop incident response plan",
    "Implement continuous monitoring",
    "Provide stakeholder training",
    "Document all ethical decisions",
];

/// Extra checklist items for high and critical risk projects.
pub static ESCALATED_CHECKLIST: &[&str] = &[
    "Conduct third-party ethical audit",
    "Establish public transparency reports",
    "Create external advisory board",
];

pub static EXPLAINABILITY: &[Explainability] = &[
    Explainability {
        family: "neural network",
        techniques: &[
            "LIME",
            "SHAP",
            "Attention visualization",
            "Layer-wise relevance propagation",
        ],
    },
    Explainability {
        family: "decision tree",
        techniques: &["Tree visualization", "Feature importance", "Decision paths"],
    },
    Explainability {
        family: "llm",
        techniques: &[
            "Prompt engineering",
            "Chain-of-thought",
            "Attribution methods",
            "Attention weights",
        ],
    },
    Explainability {
        family: "ensemble",
        techniques: &[
            "Feature importance",
            "Partial dependence plots",
            "Individual predictions",
        ],
    },
];

pub static STAKEHOLDER_GUIDANCE: &[StakeholderGuidance] = &[
    StakeholderGuidance {
        stakeholder: "users",
        title: "Users",
        recommendation: "Provide simple, jargon-free explanations of how the system affects them",
    },
    StakeholderGuidance {
        stakeholder: "developers",
        title: "Developers",
        recommendation: "Maintain comprehensive technical documentation and model cards",
    },
    StakeholderGuidance {
        stakeholder: "regulators",
        title: "Regulators",
        recommendation: "Ensure audit trails and compliance documentation",
    },
    StakeholderGuidance {
        stakeholder: "executives",
        title: "Executives",
        recommendation: "Create high-level summaries of system capabilities and limitations",
    },
    StakeholderGuidance {
        stakeholder: "affected parties",
        title: "Affected Parties",
        recommendation: "Offer clear information about data use and decision appeals",
    },
];

pub fn ethical_framework(key: &str) -> Option<&'static Framework> {
    ETHICAL_FRAMEWORKS.iter().find(|f| f.key == key)
}

pub fn responsible_ai_framework(key: &str) -> Option<&'static Framework> {
    RESPONSIBLE_AI_FRAMEWORKS.iter().find(|f| f.key == key)
}

pub fn bias_type(key: &str) -> Option<&'static BiasType> {
    BIAS_TYPES.iter().find(|b| b.key == key)
}

/// First domain whose name appears in the project type, case-insensitively.
pub fn domain_for(project_type: &str) -> Option<&'static DomainConsiderations> {
    let project = project_type.to_lowercase();
    DOMAIN_CONSIDERATIONS
        .iter()
        .find(|d| project.contains(d.domain))
}

/// First system family named in the system type, case-insensitively.
pub fn explainability_for(system_type: &str) -> Option<&'static Explainability> {
    let system = system_type.to_lowercase();
    EXPLAINABILITY.iter().find(|e| system.contains(e.family))
}

/// Guidance for a free-form stakeholder description such as "End users".
pub fn guidance_for(stakeholder: &str) -> Option<&'static StakeholderGuidance> {
    let stakeholder = stakeholder.to_lowercase();
    STAKEHOLDER_GUIDANCE
        .iter()
        .find(|g| stakeholder.contains(g.stakeholder))
}

/// Serializes a framework slice as `{key: {name, description, key_principles}}`.
#[derive(Debug, Clone, Copy)]
pub struct FrameworkTable(pub &'static [Framework]);

impl Serialize for FrameworkTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|f| (f.key, f)))
    }
}

/// Serializes guidelines as `{key: explanation}`.
#[derive(Debug, Clone, Copy)]
pub struct GuidelineTable(pub &'static [Guideline]);

impl Serialize for GuidelineTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|g| (g.key, g.explanation)))
    }
}
