use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::response::Html;
use bookings_core::forms::ValidationResult;
use bookings_core::session::{Session, SessionResult};
use minijinja::{Environment, Value};
use serde::Serialize;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

const PAGE_SUFFIX: &str = ".page.html";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Cannot read template directory {}: {source}", dir.display())]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Template '{name}' failed: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Everything a page template can see.
#[derive(Debug, Default, Serialize)]
pub struct TemplateData {
    pub string_map: HashMap<String, String>,
    pub data: HashMap<String, Value>,
    pub form: Option<ValidationResult>,
    pub flash: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
}

impl TemplateData {
    pub fn with_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.string_map.insert(key.to_string(), value.into());
        self
    }

    pub fn with_data<T: Serialize>(mut self, key: &str, value: &T) -> Self {
        self.data.insert(key.to_string(), Value::from_serialize(value));
        self
    }

    pub fn with_form(mut self, result: ValidationResult) -> Self {
        self.form = Some(result);
        self
    }

    /// One-shot notices are consumed by whichever page renders next.
    pub async fn with_notices(mut self, session: &Session) -> SessionResult<Self> {
        self.flash = session.pop_string("flash").await?;
        self.warning = session.pop_string("warning").await?;
        self.error = session.pop_string("error").await?;
        Ok(self)
    }
}

/// Renders `*.page.html` templates from a directory. With caching on, the
/// templates are parsed once up front; otherwise every render reads the
/// directory again so edits show up without a restart.
pub struct TemplateRenderer {
    dir: PathBuf,
    cached: Option<Environment<'static>>,
}

impl TemplateRenderer {
    pub fn new(dir: impl Into<PathBuf>, use_cache: bool) -> Result<Self, RenderError> {
        let dir = dir.into();
        let cached = if use_cache {
            let env = build_environment(&dir);
            for name in page_templates(&dir)? {
                env.get_template(&name)
                    .map_err(|source| RenderError::Template { name: name.clone(), source })?;
                debug!("Cached template {}", name);
            }
            Some(env)
        } else {
            None
        };

        Ok(Self { dir, cached })
    }

    pub fn render<S: Serialize>(&self, name: &str, data: &S) -> Result<String, RenderError> {
        match &self.cached {
            Some(env) => render_with(env, name, data),
            None => render_with(&build_environment(&self.dir), name, data),
        }
    }
}

fn build_environment(dir: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(dir.to_path_buf()));
    env
}

fn render_with<S: Serialize>(env: &Environment<'_>, name: &str, data: &S) -> Result<String, RenderError> {
    let wrap = |source| RenderError::Template { name: name.to_string(), source };
    env.get_template(name).map_err(wrap)?.render(data).map_err(wrap)
}

fn page_templates(dir: &Path) -> Result<Vec<String>, RenderError> {
    let io = |source| RenderError::Io { dir: dir.to_path_buf(), source };
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let name = entry.map_err(io)?.file_name().to_string_lossy().into_owned();
        if name.ends_with(PAGE_SUFFIX) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Adds the session notices to `data` and renders `name` as the response body.
pub async fn render_page(
    state: &AppState,
    session: &Session,
    name: &str,
    data: TemplateData,
) -> Result<Html<String>, AppError> {
    let data = data.with_notices(session).await?;
    let body = state.renderer.render(name, &data)?;
    Ok(Html(body))
}
