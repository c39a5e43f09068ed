pub mod client;
pub mod types;

use clientgen_core::model::{ClientModel, GenerationOutput, PreparedType};
use clientgen_core::parse::spec::Info;
use clientgen_core::transform::ClientRenderer;
use minijinja::{Environment, context};

const TEMPLATES: [(&str, &str); 6] = [
    ("file.ts.j2", include_str!("../../templates/file.ts.j2")),
    ("client.ts.j2", include_str!("../../templates/client.ts.j2")),
    ("class.ts.j2", include_str!("../../templates/class.ts.j2")),
    ("interface.ts.j2", include_str!("../../templates/interface.ts.j2")),
    ("enum.ts.j2", include_str!("../../templates/enum.ts.j2")),
    ("helpers.ts.j2", include_str!("../../templates/helpers.ts.j2")),
];

/// Escape `*/` sequences that would prematurely close JSDoc comment blocks.
fn escape_jsdoc(value: String) -> String {
    value.replace("*/", "*\\/")
}

/// Quote a value as a double-quoted JavaScript string literal.
pub(crate) fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Renders clients, types and the output file from `minijinja` templates.
pub struct TypeScriptRenderer {
    env: Environment<'static>,
}

impl TypeScriptRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("escape_jsdoc", escape_jsdoc);
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Assemble the whole output file: preamble, clients, types and the
    /// shared helpers.
    pub fn render_file(
        &self,
        output: &GenerationOutput,
        info: &Info,
    ) -> Result<String, minijinja::Error> {
        let clients: Vec<&str> = output.clients.iter().map(|c| c.code.trim_end()).collect();
        let types: Vec<&str> = output.types.iter().map(|t| t.code.trim_end()).collect();
        let mut content = self.env.get_template("file.ts.j2")?.render(context! {
            title => info.title.clone(),
            api_version => info.version.clone(),
            generator_version => env!("CARGO_PKG_VERSION"),
            preamble => output.preamble.clone(),
            clients => clients,
            types => types,
        })?;
        if !content.ends_with('\n') {
            content.push('\n');
        }
        Ok(content)
    }
}

impl ClientRenderer for TypeScriptRenderer {
    type Error = minijinja::Error;

    fn render_client(&self, client: &ClientModel) -> Result<String, Self::Error> {
        log::debug!(
            "rendering client {} ({} operations)",
            client.class_name,
            client.operations.len()
        );
        self.env
            .get_template("client.ts.j2")?
            .render(client::client_context(client))
    }

    fn render_type(&self, ty: &PreparedType<'_>) -> Result<String, Self::Error> {
        let ctx = types::type_context(ty);
        let template = match ctx.template {
            types::TypeTemplate::Class => "class.ts.j2",
            types::TypeTemplate::Interface => "interface.ts.j2",
            types::TypeTemplate::Enum => "enum.ts.j2",
        };
        self.env.get_template(template)?.render(ctx.value)
    }
}
