//! Static node-definition catalog.
//!
//! Sections and templates mirror the node library panel. Drag-drop and AI
//! "add" actions both instantiate nodes from here, so defaults (style sizes,
//! requirements text, config seeds) live in one place.

use crate::id::Uid;
use crate::model::{
    Category, Node, NodeBody, NodeData, NodeStyle, Position, ShapeKind,
};
use serde_json::json;
use smallvec::SmallVec;
use std::sync::LazyLock;

/// One entry in the node library.
#[derive(Debug, Clone)]
pub struct NodeTemplate {
    /// Stable lookup key, e.g. `backend-express`. Flowchart steps share the
    /// `flowchart` key and are distinguished by name.
    pub type_key: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub tech_stack: &'static [&'static str],
    /// Default free-form config, if the template ships one.
    pub config: Option<serde_json::Value>,
    /// Body seed (shape kind, icon name, flowchart shape/text, ...).
    pub body: NodeBody,
}

/// A named group of templates, as shown in the library sidebar.
#[derive(Debug, Clone)]
pub struct CatalogSection {
    pub name: &'static str,
    pub templates: Vec<NodeTemplate>,
}

impl NodeTemplate {
    fn service(
        type_key: &'static str,
        name: &'static str,
        category: Category,
        tech_stack: &'static [&'static str],
    ) -> Self {
        Self {
            type_key,
            name,
            category,
            tech_stack,
            config: None,
            body: NodeBody::Service,
        }
    }

    fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }

    fn flowchart(name: &'static str, shape: &'static str, text: &'static str) -> Self {
        Self {
            type_key: "flowchart",
            name,
            category: Category::LogicFlow,
            tech_stack: &["Flow"],
            config: None,
            body: NodeBody::Flowchart {
                shape: shape.to_string(),
                text: text.to_string(),
            },
        }
    }

    fn shape(name: &'static str, kind: ShapeKind) -> Self {
        Self {
            type_key: "shape",
            name,
            category: Category::Annotations,
            tech_stack: &["Shape"],
            config: None,
            body: NodeBody::Shape {
                shape_type: kind,
                fill_color: None,
                stroke_color: None,
                opacity: None,
            },
        }
    }

    fn icon(name: &'static str, icon_name: &'static str) -> Self {
        Self {
            type_key: "icon",
            name,
            category: Category::Annotations,
            tech_stack: &["Icon"],
            config: None,
            body: NodeBody::Icon {
                icon_name: icon_name.to_string(),
            },
        }
    }

    /// Default style for a node created from this template.
    pub fn default_style(&self) -> NodeStyle {
        match &self.body {
            NodeBody::Icon { .. } => NodeStyle::sized(80.0, 80.0),
            NodeBody::Group => NodeStyle::sized(500.0, 400.0),
            _ if self.category == Category::Annotations => NodeStyle::sized(150.0, 100.0),
            _ => NodeStyle::sized(256.0, 160.0),
        }
    }

    /// Create a node at `position` with this template's defaults.
    pub fn instantiate(&self, position: Position) -> Node {
        let mut body = self.body.clone();
        let mut requirements = None;

        match &mut body {
            NodeBody::TextNote { text } => {
                *text = "Editable Note".to_string();
            }
            NodeBody::Service => {
                requirements = Some(format!("A standard {}.", self.name));
            }
            _ => {}
        }

        Node {
            id: Uid::generate(),
            position,
            style: self.default_style(),
            data: NodeData {
                name: self.name.to_string(),
                category: self.category,
                tech_stack: self.tech_stack.iter().map(|s| s.to_string()).collect::<SmallVec<_>>(),
                requirements,
                template: Some(self.type_key.to_string()),
                config: self.config.clone(),
                body,
                subflow: None,
            },
        }
    }
}

static CATALOG: LazyLock<Vec<CatalogSection>> = LazyLock::new(|| {
    use Category::*;
    vec![
        CatalogSection {
            name: "Frontend",
            templates: vec![
                NodeTemplate::service("frontend-vanilla", "Vanilla", Frontend, &["HTML", "Javascript", "CSS"]),
                NodeTemplate::service("frontend-react", "React", Frontend, &["React", "Vite", "TypeScript"]),
                NodeTemplate::service("frontend-nextjs", "Next.js", Frontend, &["Next.js", "React"]),
                NodeTemplate::service("frontend-vue", "Vue.js", Frontend, &["Vue", "Vite"]),
                NodeTemplate::service("frontend-angular", "Angular", Frontend, &["Angular", "TypeScript"]),
            ],
        },
        CatalogSection {
            name: "Backend",
            templates: vec![
                NodeTemplate::service("backend-express", "Express API", Backend, &["Node.js", "Express", "TypeScript"])
                    .with_config(json!({ "port": 3000, "middleware": ["cors", "json"] })),
                NodeTemplate::service("backend-nestjs", "NestJS API", Backend, &["NestJS", "TypeScript"]),
                NodeTemplate::service("backend-fastapi", "FastAPI", Backend, &["Python", "FastAPI"]),
                NodeTemplate::service("backend-django", "Django", Backend, &["Django", "Python"]),
                NodeTemplate::service("backend-spring", "Spring Boot", Backend, &["Java", "Spring Boot"]),
                NodeTemplate::service("backend-gofiber", "Go Fiber", Backend, &["Go", "Fiber"]),
                NodeTemplate::service("backend-aspnet", "ASP.NET Core", Backend, &[".NET", "C#", "ASP.NET Core"]),
            ],
        },
        CatalogSection {
            name: "Data Layer",
            templates: vec![
                NodeTemplate::service("db-postgres", "PostgreSQL", DataLayer, &["PostgreSQL", "PostgreSQL"])
                    .with_config(json!({ "databaseName": "db", "username": "user", "password": "password" })),
                NodeTemplate::service("db-sqlserver", "SQL Server", DataLayer, &["SQL", "MS SQL"])
                    .with_config(json!({ "databaseName": "db", "username": "user", "password": "password" })),
                NodeTemplate::service("db-mysql", "MySQL", DataLayer, &["MySQL", "MySQL"]),
                NodeTemplate::service("db-mongo", "MongoDB", DataLayer, &["NoSQL", "MongoDB"]),
                NodeTemplate::service("db-redis", "Redis", DataLayer, &["Cache", "Redis"]),
                NodeTemplate::service("db-indexdb", "IndexDB", DataLayer, &["DexieJS", "IndexDb"]),
            ],
        },
        CatalogSection {
            name: "Logic & Flow",
            templates: vec![
                NodeTemplate::flowchart("Start / End", "terminator", "Start"),
                NodeTemplate::flowchart("Process", "rectangle", "Do something"),
                NodeTemplate::flowchart("Decision", "diamond", "Is it valid?"),
                NodeTemplate::flowchart("Input / Output", "parallelogram", "Get Data"),
                NodeTemplate::flowchart("Subroutine", "subroutine", "Call function"),
                NodeTemplate::flowchart("Document", "document", "Generate Report"),
                NodeTemplate::flowchart("Data Storage", "dataStorage", "Save State"),
                NodeTemplate::flowchart("Delay", "delay", "Wait 1 second"),
                NodeTemplate::flowchart("Display", "display", "Show message"),
                NodeTemplate::flowchart("Merge", "merge", "Merge branches"),
                NodeTemplate::flowchart("Connector", "connector", "A"),
            ],
        },
        CatalogSection {
            name: "Gateways",
            templates: vec![
                NodeTemplate::service("gateway-kong", "Kong Gateway", Gateways, &["API Gateway", "Lua"]),
                NodeTemplate::service("gateway-azure-apim", "Azure API Mgt", Gateways, &["API Gateway", "Azure"]),
            ],
        },
        CatalogSection {
            name: "Messaging",
            templates: vec![
                NodeTemplate::service("msg-kafka", "Kafka", Messaging, &["Event Stream", "Kafka"]),
                NodeTemplate::service("msg-rabbitmq", "RabbitMQ", Messaging, &["Message Queue", "RabbitMQ"]),
            ],
        },
        CatalogSection {
            name: "Security",
            templates: vec![
                NodeTemplate::service("sec-auth", "Auth Service", Security, &["JWT", "OAuth2"]),
                NodeTemplate::service("sec-identity", "Identity Provider", Security, &["OAuth2", "OIDC", "SAML"]),
            ],
        },
        CatalogSection {
            name: "External Services",
            templates: vec![
                NodeTemplate::service("ext-ai-ml", "AI/ML Service", ExternalServices, &["Computer Vision", "NLP"]),
                NodeTemplate::service("ext-payment", "Payment Gateway", ExternalServices, &["Stripe", "PayPal"]),
                NodeTemplate::service("ext-notification", "Notification Service", ExternalServices, &["Twilio", "SendGrid", "SNS"]),
            ],
        },
        CatalogSection {
            name: "Structural",
            templates: vec![NodeTemplate {
                type_key: "group",
                name: "Service Group",
                category: Structural,
                tech_stack: &["Container"],
                config: None,
                body: NodeBody::Group,
            }],
        },
        CatalogSection {
            name: "Annotations",
            templates: vec![
                NodeTemplate {
                    type_key: "text-note",
                    name: "Text Note",
                    category: Annotations,
                    tech_stack: &["Annotation"],
                    config: None,
                    body: NodeBody::TextNote { text: String::new() },
                },
                NodeTemplate::shape("Rectangle", ShapeKind::Rectangle),
                NodeTemplate::shape("Circle", ShapeKind::Circle),
                NodeTemplate::shape("Diamond", ShapeKind::Diamond),
                NodeTemplate::shape("Arrow Right", ShapeKind::ArrowRight),
                NodeTemplate::shape("Arrow Left", ShapeKind::ArrowLeft),
                NodeTemplate::icon("CPU Icon", "Cpu"),
                NodeTemplate::icon("Server Icon", "Server"),
                NodeTemplate::icon("Database Icon", "Database"),
                NodeTemplate::icon("Users Icon", "Users"),
                NodeTemplate::icon("Cloud Icon", "Cloud"),
                NodeTemplate::icon("File Icon", "File"),
            ],
        },
    ]
});

/// All catalog sections, in sidebar order.
pub fn sections() -> &'static [CatalogSection] {
    &CATALOG
}

/// Look up a template by its type key. Returns the first match for keys
/// shared by several templates (`flowchart`, `shape`, `icon`).
pub fn find_by_type(type_key: &str) -> Option<&'static NodeTemplate> {
    CATALOG
        .iter()
        .flat_map(|s| s.templates.iter())
        .find(|t| t.type_key == type_key)
}

/// Look up a template by its display name.
pub fn find_by_name(name: &str) -> Option<&'static NodeTemplate> {
    CATALOG
        .iter()
        .flat_map(|s| s.templates.iter())
        .find(|t| t.name == name)
}
