//! Prompt Registry: a small, immutable catalog of argument-templated
//! message sequences, rendered verbatim for `prompts/get`. Dispatched from
//! [`crate::state::GatewayState::handle_custom_method`] since `prompts/*`
//! is not one of mcp-core's standard methods.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorKind, GatewayError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    #[serde(rename = "type")]
    pub type_hint: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
    #[serde(skip)]
    pub template: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: &'static str,
    pub text: String,
}

fn catalog() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: "diagnose_container",
            title: "Diagnose a misbehaving container",
            description: "Walks through inspecting state, recent logs, and a restart decision for one container",
            arguments: vec![PromptArgument {
                name: "container_id",
                description: "Container id or name to diagnose",
                required: true,
                type_hint: "string",
            }],
            template: &[
                "Inspect container ${container_id} using get_container, then review its recent output with container_logs.",
                "Decide whether the container is crash-looping, and if so, propose a lifecycle action (restart or remove) with a one-line justification.",
            ],
        },
        PromptDefinition {
            name: "plan_service_scale",
            title: "Plan a service scaling change",
            description: "Produces a scale-up or scale-down plan for one swarm service given a target replica count",
            arguments: vec![
                PromptArgument {
                    name: "service",
                    description: "Service name or id to scale",
                    required: true,
                    type_hint: "string",
                },
                PromptArgument {
                    name: "target_replicas",
                    description: "Desired replica count",
                    required: true,
                    type_hint: "integer",
                },
            ],
            template: &[
                "Look up the current replica count for service ${service} with list_services.",
                "Compare it against the requested target of ${target_replicas} and call service_scale only if they differ.",
            ],
        },
        PromptDefinition {
            name: "stack_rollout_checklist",
            title: "Pre-flight checklist for a stack rollout",
            description: "Enumerates the checks to run before deploying a stack",
            arguments: vec![PromptArgument {
                name: "stack_name",
                description: "Name of the stack about to be deployed",
                required: true,
                type_hint: "string",
            }],
            template: &[
                "Before deploying stack ${stack_name}, confirm the target images are already pulled or pull_image each one explicitly.",
                "List existing services under the ${stack_name} namespace and note which will be created versus updated by deploy_stack.",
            ],
        },
    ]
}

pub struct PromptRegistry {
    prompts: Vec<PromptDefinition>,
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self { prompts: catalog() }
    }

    pub fn list(&self) -> Vec<PromptDefinition> {
        self.prompts.clone()
    }

    pub fn get(&self, name: &str) -> Option<&PromptDefinition> {
        self.prompts.iter().find(|p| p.name == name)
    }

    pub fn render(&self, name: &str, arguments: &Value) -> Result<Vec<PromptMessage>, GatewayError> {
        let prompt = self
            .get(name)
            .ok_or_else(|| GatewayError::new(ErrorKind::NotFound, format!("no such prompt '{name}'")))?;

        for arg in &prompt.arguments {
            if arg.required && arguments.get(arg.name).is_none() {
                return Err(GatewayError::new(
                    ErrorKind::InvalidArgument,
                    format!("prompt '{name}' requires argument '{}'", arg.name),
                ));
            }
        }

        let messages = prompt
            .template
            .iter()
            .map(|part| PromptMessage {
                role: "user",
                text: substitute(part, arguments),
            })
            .collect();

        Ok(messages)
    }
}

fn substitute(template: &str, arguments: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        rest = &rest[start + 2..];

        let Some(end) = rest.find('}') else {
            out.push_str("${");
            out.push_str(rest);
            return out;
        };

        let name = &rest[..end];
        let value = arguments
            .get(name)
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        out.push_str(&value);

        rest = &rest[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let registry = PromptRegistry::new();
        let messages = registry
            .render("diagnose_container", &json!({"container_id": "web-1"}))
            .unwrap();
        assert!(messages[0].text.contains("web-1"));
    }

    #[test]
    fn test_render_missing_required_argument_errors() {
        let registry = PromptRegistry::new();
        let err = registry.render("diagnose_container", &json!({})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_render_unknown_prompt_is_not_found() {
        let registry = PromptRegistry::new();
        let err = registry.render("no_such_prompt", &json!({})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_list_returns_full_catalog() {
        let registry = PromptRegistry::new();
        assert_eq!(registry.list().len(), 3);
    }
}
