//! String template rendering utilities.

pub struct TemplateVars;

impl TemplateVars {
    pub const SERVICE_NAME: &'static str = "serviceName";
    pub const WORKING_DIR: &'static str = "workingDir";
    pub const EXEC_START: &'static str = "execStart";
    pub const USER: &'static str = "user";
    pub const DOMAIN: &'static str = "domain";
    pub const UPSTREAM_PORT: &'static str = "upstreamPort";
}

pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}
